use crate::app::state::{App, FormField, Tab};
use crate::{log_debug, log_key_event};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Instant;
use tui_textarea::Input;

pub fn handle_key_event(app: &mut App, key: KeyEvent) -> Result<()> {
    if key.kind != KeyEventKind::Press {
        return Ok(());
    }
    log_key_event!(app.log_config, "{:?} ({:?}) on {:?}", key.code, key.modifiers, app.current_tab);

    // Ctrl+C always quits, even while typing
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.quit();
        return Ok(());
    }

    // Help modal swallows everything else
    if app.show_help {
        if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
            app.toggle_help();
        }
        return Ok(());
    }

    match key.code {
        KeyCode::Tab => {
            app.next_tab();
            return Ok(());
        }
        KeyCode::BackTab => {
            app.previous_tab();
            return Ok(());
        }
        _ => {}
    }

    match app.current_tab {
        Tab::Create => handle_form_keys(app, key),
        Tab::Posts => handle_posts_keys(app, key),
        Tab::Stats => handle_stats_keys(app, key),
    }
    Ok(())
}

/// Keys shared by every view when no text field has focus.
/// Returns true if the key was consumed.
fn handle_global_keys(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('?') => app.toggle_help(),
        KeyCode::Char(c) => match Tab::from_digit(c) {
            Some(tab) => app.select_tab(tab),
            None => return false,
        },
        _ => return false,
    }
    true
}

fn handle_posts_keys(app: &mut App, key: KeyEvent) {
    if handle_global_keys(app, key) {
        return;
    }
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => app.posts_state.select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.posts_state.select_previous(),
        KeyCode::Char('r') => app.refresh_all(Instant::now()),
        KeyCode::Char('d') | KeyCode::Delete => app.delete_selected_post(),
        _ => {}
    }
}

fn handle_stats_keys(app: &mut App, key: KeyEvent) {
    if handle_global_keys(app, key) {
        return;
    }
    match key.code {
        KeyCode::Down | KeyCode::Char('j') => app.stats_state.select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.stats_state.select_previous(),
        KeyCode::Char('r') => app.refresh_all(Instant::now()),
        _ => {}
    }
}

fn handle_form_keys(app: &mut App, key: KeyEvent) {
    // Field navigation works from every field
    match key.code {
        KeyCode::Down => {
            app.form.focus = app.form.focus.next();
            return;
        }
        KeyCode::Up => {
            app.form.focus = app.form.focus.previous();
            return;
        }
        _ => {}
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('s') {
        app.submit_form();
        return;
    }

    // Digits switch tabs until the focused field holds text; Alt+digit always does
    if let KeyCode::Char(c) = key.code {
        if let Some(tab) = Tab::from_digit(c) {
            if key.modifiers.contains(KeyModifiers::ALT) || !app.form.is_typing() {
                app.select_tab(tab);
                return;
            }
        }
    }

    if app.form.focus.is_text() {
        handle_text_field_keys(app, key);
        return;
    }

    if handle_global_keys(app, key) {
        return;
    }

    let form = &mut app.form;
    match (form.focus, key.code) {
        (FormField::MediaList, KeyCode::Right) => {
            if form.media_selected + 1 < form.media_paths.len() {
                form.media_selected += 1;
            }
        }
        (FormField::MediaList, KeyCode::Left) => {
            form.media_selected = form.media_selected.saturating_sub(1);
        }
        (FormField::MediaList, KeyCode::Delete | KeyCode::Backspace | KeyCode::Char('x')) => {
            form.remove_selected_media();
        }

        (FormField::Random, KeyCode::Char(' ') | KeyCode::Enter) => {
            form.is_random = !form.is_random;
        }

        (FormField::WeekDays, KeyCode::Right) => form.day_cursor = (form.day_cursor + 1) % 7,
        (FormField::WeekDays, KeyCode::Left) => form.day_cursor = (form.day_cursor + 6) % 7,
        (FormField::WeekDays, KeyCode::Char(' ') | KeyCode::Enter) => {
            let cursor = form.day_cursor;
            form.toggle_day(cursor);
        }

        (FormField::Hour, KeyCode::Right | KeyCode::Char('+')) => form.hour_up(),
        (FormField::Hour, KeyCode::Left | KeyCode::Char('-')) => form.hour_down(),
        (FormField::Minute, KeyCode::Right | KeyCode::Char('+')) => form.minute_up(),
        (FormField::Minute, KeyCode::Left | KeyCode::Char('-')) => form.minute_down(),
        (FormField::Hour | FormField::Minute, KeyCode::Enter | KeyCode::Char('a')) => {
            let time = form.picked_time();
            if form.add_time() {
                log_debug!(app.log_config, "added time {}", time);
            } else {
                app.set_error(format!("{} is already in the list", time));
            }
        }

        (FormField::Times, KeyCode::Right) => {
            if form.time_selected + 1 < form.times.len() {
                form.time_selected += 1;
            }
        }
        (FormField::Times, KeyCode::Left) => {
            form.time_selected = form.time_selected.saturating_sub(1);
        }
        (FormField::Times, KeyCode::Delete | KeyCode::Backspace | KeyCode::Char('x')) => {
            if !form.remove_selected_time() {
                app.set_error("No time selected to remove");
            }
        }

        (FormField::Submit, KeyCode::Enter) => app.submit_form(),
        _ => {}
    }
}

fn handle_text_field_keys(app: &mut App, key: KeyEvent) {
    let form = &mut app.form;
    match (form.focus, key.code) {
        (_, KeyCode::Esc) => form.focus = form.focus.next(),
        (FormField::Name, KeyCode::Enter) => form.focus = FormField::Text,
        (FormField::MediaPath, KeyCode::Enter) => {
            if form.add_media_path() {
                form.media_selected = form.media_paths.len() - 1;
            } else {
                app.set_error("Type a new file path before pressing Enter");
            }
        }
        _ => {
            if let Some(textarea) = form.focused_textarea() {
                textarea.input(Input::from(key));
            }
        }
    }
}
