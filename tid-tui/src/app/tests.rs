use super::*;
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::{Duration, Instant};
use tid_store::config::TableNames;
use tid_store::{Database, Gateway, Settings};
use tid_types::{CreatePolicy, WeekDay};

/// Helper to create a KeyEvent
fn key_event(code: KeyCode) -> KeyEvent {
    let mut event = KeyEvent::new(code, KeyModifiers::empty());
    event.kind = KeyEventKind::Press;
    event
}

fn ctrl(c: char) -> KeyEvent {
    let mut event = KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL);
    event.kind = KeyEventKind::Press;
    event
}

fn test_app_with(policy: CreatePolicy) -> App {
    let db = Database::in_memory(TableNames::default()).expect("in-memory database");
    db.initialize().expect("schema");
    App::new(Gateway::new(db, policy), &Settings::in_memory().ui)
}

fn test_app() -> App {
    test_app_with(CreatePolicy::BestEffort)
}

fn type_text(app: &mut App, text: &str) {
    for c in text.chars() {
        app.handle_key_event(key_event(KeyCode::Char(c))).unwrap();
    }
}

#[test]
fn test_escape_closes_help_modal_first() {
    let mut app = test_app();
    app.show_help = true;

    app.handle_key_event(key_event(KeyCode::Esc)).unwrap();

    assert!(!app.show_help, "Help modal should be closed");
    assert!(app.running, "App should still be running");
}

#[test]
fn test_question_mark_toggles_help_outside_text_fields() {
    let mut app = test_app();
    app.current_tab = Tab::Posts;

    app.handle_key_event(key_event(KeyCode::Char('?'))).unwrap();
    assert!(app.show_help);
    app.handle_key_event(key_event(KeyCode::Char('?'))).unwrap();
    assert!(!app.show_help);
}

#[test]
fn test_tab_cycles_and_digits_jump() {
    let mut app = test_app();
    assert_eq!(app.current_tab, Tab::Create);

    app.handle_key_event(key_event(KeyCode::Tab)).unwrap();
    assert_eq!(app.current_tab, Tab::Posts);
    app.handle_key_event(key_event(KeyCode::Tab)).unwrap();
    assert_eq!(app.current_tab, Tab::Stats);
    app.handle_key_event(key_event(KeyCode::Tab)).unwrap();
    assert_eq!(app.current_tab, Tab::Create);
    app.handle_key_event(key_event(KeyCode::BackTab)).unwrap();
    assert_eq!(app.current_tab, Tab::Stats);

    app.handle_key_event(key_event(KeyCode::Char('2'))).unwrap();
    assert_eq!(app.current_tab, Tab::Posts);
}

#[test]
fn test_q_types_into_text_field_but_quits_elsewhere() {
    let mut app = test_app();
    assert_eq!(app.form.focus, FormField::Name);

    type_text(&mut app, "q1");
    assert!(app.running, "q in the name field is text");
    assert_eq!(app.current_tab, Tab::Create);
    assert_eq!(app.form.name_value(), "q1");

    app.current_tab = Tab::Posts;
    app.handle_key_event(key_event(KeyCode::Char('q'))).unwrap();
    assert!(!app.running);
}

fn alt(c: char) -> KeyEvent {
    let mut event = KeyEvent::new(KeyCode::Char(c), KeyModifiers::ALT);
    event.kind = KeyEventKind::Press;
    event
}

#[test]
fn test_digit_in_empty_name_switches_tab() {
    let mut app = test_app();
    assert_eq!(app.form.focus, FormField::Name);

    app.handle_key_event(key_event(KeyCode::Char('3'))).unwrap();
    assert_eq!(app.current_tab, Tab::Stats);
    assert!(app.form.name_value().is_empty());
}

#[test]
fn test_digit_types_once_the_field_has_text() {
    let mut app = test_app();
    type_text(&mut app, "Top 10");

    assert_eq!(app.current_tab, Tab::Create);
    assert_eq!(app.form.name_value(), "Top 10");

    app.handle_key_event(alt('2')).unwrap();
    assert_eq!(app.current_tab, Tab::Posts);
    assert_eq!(app.form.name_value(), "Top 10");
}

#[test]
fn test_digit_switches_tab_after_submit() {
    let mut app = test_app();
    fill_form(&mut app);
    app.submit_form();
    assert_eq!(app.form.focus, FormField::Name);

    app.handle_key_event(key_event(KeyCode::Char('2'))).unwrap();
    assert_eq!(app.current_tab, Tab::Posts);
}

#[test]
fn test_ctrl_c_quits_while_typing() {
    let mut app = test_app();
    app.handle_key_event(ctrl('c')).unwrap();
    assert!(!app.running);
}

#[test]
fn test_up_down_move_between_fields() {
    let mut app = test_app();
    app.handle_key_event(key_event(KeyCode::Down)).unwrap();
    assert_eq!(app.form.focus, FormField::Text);
    app.handle_key_event(key_event(KeyCode::Up)).unwrap();
    app.handle_key_event(key_event(KeyCode::Up)).unwrap();
    assert_eq!(app.form.focus, FormField::Submit);
}

#[test]
fn test_add_time_dedups_and_sorts() {
    let mut form = FormState::new();
    form.hour = 18;
    form.minute = 30;
    assert!(form.add_time());
    form.hour = 9;
    form.minute = 0;
    assert!(form.add_time());
    assert!(!form.add_time(), "duplicate time must be rejected");

    assert_eq!(form.times, vec!["09:00", "18:30"]);
}

#[test]
fn test_remove_time_requires_membership() {
    let mut form = FormState::new();
    form.hour = 7;
    form.add_time();

    assert!(!form.remove_time("08:00"));
    assert_eq!(form.times.len(), 1);
    assert!(form.remove_time("07:00"));
    assert!(form.times.is_empty());
    assert!(!form.remove_selected_time());
}

#[test]
fn test_pickers_wrap_and_step() {
    let mut form = FormState::new();
    form.hour_down();
    assert_eq!(form.hour, 23);
    form.hour_up();
    assert_eq!(form.hour, 0);

    form.minute_down();
    assert_eq!(form.minute, 55);
    form.minute_up();
    form.minute_up();
    assert_eq!(form.minute, 5);
    assert_eq!(form.picked_time(), "00:05");
}

#[test]
fn test_media_path_input_adds_to_list_once() {
    let mut app = test_app();
    app.form.focus = FormField::MediaPath;

    type_text(&mut app, "/tmp/banner.png");
    app.handle_key_event(key_event(KeyCode::Enter)).unwrap();
    type_text(&mut app, "/tmp/banner.png");
    app.handle_key_event(key_event(KeyCode::Enter)).unwrap();

    assert_eq!(app.form.media_paths.len(), 1);
    assert!(app.form.media_input.lines().join("").is_empty());

    app.form.focus = FormField::MediaList;
    app.handle_key_event(key_event(KeyCode::Char('x'))).unwrap();
    assert!(app.form.media_paths.is_empty());
}

#[test]
fn test_week_day_checkboxes_follow_cursor() {
    let mut app = test_app();
    app.form.focus = FormField::WeekDays;

    app.handle_key_event(key_event(KeyCode::Char(' '))).unwrap();
    app.handle_key_event(key_event(KeyCode::Left)).unwrap();
    app.handle_key_event(key_event(KeyCode::Left)).unwrap();
    app.handle_key_event(key_event(KeyCode::Left)).unwrap();
    app.handle_key_event(key_event(KeyCode::Enter)).unwrap();

    assert_eq!(app.form.selected_days(), vec![WeekDay::Monday, WeekDay::Friday]);
}

fn fill_form(app: &mut App) {
    app.form.name.insert_str("Weekly digest");
    app.form.text.insert_str("What happened this week");
    app.form.week_days[0] = true;
    app.form.week_days[4] = true;
    app.form.hour = 9;
    app.form.add_time();
    app.form.hour = 18;
    app.form.minute = 30;
    app.form.add_time();
}

#[test]
fn test_submit_clears_form_and_reports_done() {
    let mut app = test_app();
    fill_form(&mut app);
    app.form.focus = FormField::Submit;

    app.handle_key_event(key_event(KeyCode::Enter)).unwrap();

    let status = app.status.clone().expect("status set after submit");
    assert_eq!(status.kind, StatusKind::Success);
    assert_eq!(status.text, "Done");
    assert!(app.form.name_value().is_empty());
    assert!(app.form.times.is_empty());

    assert_eq!(app.posts_state.posts.len(), 1);
    let post = &app.posts_state.posts[0];
    assert_eq!(post.name, "Weekly digest");
    assert_eq!(post.week_days, vec!["Monday", "Friday"]);
    assert_eq!(post.tweet_times, vec!["09:00:00", "18:30:00"]);
}

#[test]
fn test_submit_reports_skipped_media() {
    let mut app = test_app();
    fill_form(&mut app);
    app.form
        .media_paths
        .push("/nonexistent/tid/missing.png".into());

    app.handle_key_event(ctrl('s')).unwrap();

    let status = app.status.clone().unwrap();
    assert_eq!(status.kind, StatusKind::Success);
    assert_eq!(status.text, "Done (1 skipped)");
}

#[test]
fn test_failed_submit_keeps_form_and_shows_error() {
    let mut app = test_app_with(CreatePolicy::AllOrNothing);
    fill_form(&mut app);
    app.form
        .media_paths
        .push("/nonexistent/tid/missing.png".into());

    app.submit_form();

    let status = app.status.clone().unwrap();
    assert_eq!(status.kind, StatusKind::Error);
    assert!(status.text.starts_with("Error"));
    assert_eq!(app.form.name_value(), "Weekly digest", "form is kept for a retry");
    assert!(app.gateway.list_posts().unwrap().is_empty());
}

#[test]
fn test_status_expires_after_timeout() {
    let mut app = test_app();
    app.set_success("Done");
    let shown = app.status.as_ref().unwrap().shown_at;

    app.clear_expired_status(shown + Duration::from_secs(4));
    assert!(app.status.is_some());
    app.clear_expired_status(shown + app.status_timeout);
    assert!(app.status.is_none());
}

#[test]
fn test_delete_removes_selected_row() {
    let mut app = test_app();
    fill_form(&mut app);
    app.submit_form();
    fill_form(&mut app);
    app.submit_form();
    app.current_tab = Tab::Posts;
    app.load_posts();
    assert_eq!(app.posts_state.posts.len(), 2);

    app.handle_key_event(key_event(KeyCode::Down)).unwrap();
    let doomed = app.posts_state.selected_post().unwrap().id;
    app.handle_key_event(key_event(KeyCode::Char('d'))).unwrap();

    assert_eq!(app.posts_state.posts.len(), 1);
    assert!(app.posts_state.posts.iter().all(|p| p.id != doomed));
    assert_eq!(app.status.as_ref().unwrap().kind, StatusKind::Success);
    assert_eq!(app.gateway.list_posts().unwrap().len(), 1);
}

#[test]
fn test_delete_with_nothing_selected_is_noop() {
    let mut app = test_app();
    app.current_tab = Tab::Posts;
    app.handle_key_event(key_event(KeyCode::Char('d'))).unwrap();
    assert!(app.status.is_none());
}

#[test]
fn test_refresh_runs_on_start_and_after_interval() {
    let mut app = test_app();
    let start = Instant::now();

    assert!(app.refresh_if_due(start), "first tick loads data");
    assert!(!app.refresh_if_due(start + Duration::from_secs(1)));
    assert_eq!(app.until_refresh(start + Duration::from_secs(100)), Duration::from_secs(500));
    assert!(app.refresh_if_due(start + app.refresh_interval));
}

#[test]
fn test_stats_tab_refresh_loads_rows() {
    let mut app = test_app();
    fill_form(&mut app);
    app.submit_form();
    let post_id = app.posts_state.posts[0].id;
    app.gateway
        .record_stat(post_id, chrono::Utc::now(), WeekDay::Monday, "posted")
        .unwrap();

    app.current_tab = Tab::Stats;
    app.handle_key_event(key_event(KeyCode::Char('r'))).unwrap();

    assert_eq!(app.stats_state.stats.len(), 1);
    assert_eq!(app.stats_state.table_state.selected(), Some(0));
    assert_eq!(app.stats_state.stats[0].post_name, "Weekly digest");
}
