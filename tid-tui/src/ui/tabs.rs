use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};
use tid_types::WeekDay;
use tui_textarea::TextArea;

use super::formatting::*;
use super::theme::ThemeColors;
use crate::app::{App, FormField, Tab};

pub fn render_tab_header(frame: &mut Frame, app: &App, area: Rect, theme: &ThemeColors) {
    let mut spans = vec![];
    for (i, tab) in Tab::ALL.iter().enumerate() {
        let style = if *tab == app.current_tab {
            Style::default()
                .fg(theme.success)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(theme.text_dim)
        };
        spans.push(Span::styled(format!(" {} {} ", i + 1, tab.title()), style));
        if i < Tab::ALL.len() - 1 {
            spans.push(Span::raw(" | "));
        }
    }

    let header = Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border))
                .title(" tid "),
        );
    frame.render_widget(header, area);
}

pub fn render_status_line(frame: &mut Frame, app: &App, area: Rect, theme: &ThemeColors) {
    let line = match &app.status {
        Some(status) => Line::from(Span::styled(status.text.clone(), theme.status_style(status.kind))),
        None => Line::from(""),
    };
    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}

/// Context-appropriate key hints for the current view
pub fn action_bar_text(app: &App) -> &'static str {
    match app.current_tab {
        Tab::Create if app.form.focus.is_text() => {
            "Type to edit | Up/Down: Field | Enter: Next/Add | Esc: Leave field | Ctrl+S: Submit"
        }
        Tab::Create => "Up/Down: Field | Left/Right: Change | Space: Toggle | Enter: Add/Submit | ?: Help | q: Quit",
        Tab::Posts => "Up/Down: Select | r: Refresh | d: Delete | Tab: Next tab | ?: Help | q: Quit",
        Tab::Stats => "Up/Down: Select | r: Refresh | Tab: Next tab | ?: Help | q: Quit",
    }
}

pub fn render_footer(frame: &mut Frame, app: &App, area: Rect, theme: &ThemeColors) {
    let footer = Paragraph::new(action_bar_text(app))
        .style(Style::default().fg(theme.text_dim))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border)),
        );
    frame.render_widget(footer, area);
}

fn style_textarea(textarea: &mut TextArea<'static>, title: &'static str, focused: bool, theme: &ThemeColors) {
    let border = if focused { theme.success } else { theme.border };
    textarea.set_block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(title),
    );
    textarea.set_style(Style::default().fg(theme.text));
    textarea.set_cursor_line_style(Style::default());
    let cursor = if focused {
        Style::default().add_modifier(Modifier::REVERSED)
    } else {
        Style::default()
    };
    textarea.set_cursor_style(cursor);
}

fn marker(focused: bool) -> &'static str {
    if focused {
        "> "
    } else {
        "  "
    }
}

pub fn render_create_tab(frame: &mut Frame, app: &mut App, area: Rect, theme: &ThemeColors) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Name
            Constraint::Length(5), // Text
            Constraint::Length(3), // Media path input
            Constraint::Min(0),    // Pickers and lists
        ])
        .split(area);

    let focus = app.form.focus;
    style_textarea(&mut app.form.name, " Name ", focus == FormField::Name, theme);
    style_textarea(&mut app.form.text, " Text ", focus == FormField::Text, theme);
    style_textarea(
        &mut app.form.media_input,
        " Media file path (Enter to add) ",
        focus == FormField::MediaPath,
        theme,
    );
    frame.render_widget(&app.form.name, chunks[0]);
    frame.render_widget(&app.form.text, chunks[1]);
    frame.render_widget(&app.form.media_input, chunks[2]);

    let form = &app.form;
    let label = Style::default().fg(theme.primary);
    let selected = Style::default()
        .fg(theme.background)
        .bg(theme.primary)
        .add_modifier(Modifier::BOLD);
    let mut lines = vec![];

    // Media list
    let focused = focus == FormField::MediaList;
    let mut spans = vec![
        Span::styled(marker(focused), theme.field_style(focused)),
        Span::styled("Media:     ", label),
    ];
    if form.media_paths.is_empty() {
        spans.push(Span::styled("none", Style::default().fg(theme.text_dim)));
    }
    for (i, path) in form.media_paths.iter().enumerate() {
        let style = if focused && i == form.media_selected {
            selected
        } else {
            theme.field_style(false)
        };
        spans.push(Span::styled(path.display().to_string(), style));
        spans.push(Span::raw("  "));
    }
    lines.push(Line::from(spans));

    // Random flag
    let focused = focus == FormField::Random;
    lines.push(Line::from(vec![
        Span::styled(marker(focused), theme.field_style(focused)),
        Span::styled("Random:    ", label),
        Span::styled(checkbox(form.is_random), theme.field_style(focused)),
    ]));

    // Week day checkboxes
    let focused = focus == FormField::WeekDays;
    let mut spans = vec![
        Span::styled(marker(focused), theme.field_style(focused)),
        Span::styled("Week days: ", label),
    ];
    for (i, day) in WeekDay::ALL.iter().enumerate() {
        let style = if focused && i == form.day_cursor {
            selected
        } else {
            theme.field_style(false)
        };
        spans.push(Span::styled(
            format!("{} {}", checkbox(form.week_days[i]), &day.as_str()[..3]),
            style,
        ));
        spans.push(Span::raw(" "));
    }
    lines.push(Line::from(spans));

    // Hour and minute pickers
    for (field, name, value) in [
        (FormField::Hour, "Hour:      ", form.hour),
        (FormField::Minute, "Minute:    ", form.minute),
    ] {
        let focused = focus == field;
        lines.push(Line::from(vec![
            Span::styled(marker(focused), theme.field_style(focused)),
            Span::styled(name, label),
            Span::styled(format!("< {:02} >", value), theme.field_style(focused)),
            Span::styled(
                if focused { "   Enter: add time" } else { "" },
                Style::default().fg(theme.text_dim),
            ),
        ]));
    }

    // Accumulated times
    let focused = focus == FormField::Times;
    let mut spans = vec![
        Span::styled(marker(focused), theme.field_style(focused)),
        Span::styled("Times:     ", label),
    ];
    if form.times.is_empty() {
        spans.push(Span::styled("none", Style::default().fg(theme.text_dim)));
    }
    for (i, time) in form.times.iter().enumerate() {
        let style = if focused && i == form.time_selected {
            selected
        } else {
            theme.field_style(false)
        };
        spans.push(Span::styled(time.clone(), style));
        spans.push(Span::raw(" "));
    }
    lines.push(Line::from(spans));

    lines.push(Line::from(""));
    let focused = focus == FormField::Submit;
    lines.push(Line::from(vec![
        Span::styled(marker(focused), theme.field_style(focused)),
        Span::styled("[ Submit ]", if focused { selected } else { theme.field_style(false) }),
    ]));

    let pickers = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border))
            .title(" Schedule "),
    );
    frame.render_widget(pickers, chunks[3]);
}

fn message_block<'a>(text: String, style: Style, title: &'a str, theme: &ThemeColors) -> Paragraph<'a> {
    Paragraph::new(text)
        .style(style)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border))
                .title(title),
        )
}

fn header_row(titles: &[&'static str], theme: &ThemeColors) -> Row<'static> {
    Row::new(titles.iter().map(|t| Cell::from(*t)))
        .style(Style::default().fg(theme.primary).add_modifier(Modifier::BOLD))
        .bottom_margin(1)
}

pub fn render_posts_tab(frame: &mut Frame, app: &mut App, area: Rect, theme: &ThemeColors) {
    let state = &mut app.posts_state;
    if let Some(error) = &state.error {
        let msg = format!("Failed to load posts: {}\n\nPress 'r' to retry", error);
        frame.render_widget(message_block(msg, Style::default().fg(theme.error), " Posts ", theme), area);
        return;
    }
    if state.posts.is_empty() {
        let msg = "No posts scheduled yet. Create one in the Create tab.".to_string();
        frame.render_widget(message_block(msg, Style::default().fg(theme.text_dim), " Posts ", theme), area);
        return;
    }

    let rows = state.posts.iter().map(|post| {
        let times: Vec<String> = post.tweet_times.iter().map(|t| short_time(t).to_string()).collect();
        Row::new(vec![
            Cell::from(post.id.to_string()),
            Cell::from(truncate(&post.name, 24)),
            Cell::from(truncate(&post.text, 40)),
            Cell::from(join_or_dash(&post.media_files)),
            Cell::from(yes_no(post.is_random)),
            Cell::from(join_or_dash(&post.week_days)),
            Cell::from(join_or_dash(&times)),
        ])
        .style(Style::default().fg(theme.text))
    });

    let widths = [
        Constraint::Length(5),
        Constraint::Percentage(15),
        Constraint::Percentage(25),
        Constraint::Percentage(15),
        Constraint::Length(6),
        Constraint::Percentage(20),
        Constraint::Percentage(15),
    ];
    let table = Table::new(rows, widths)
        .header(header_row(
            &["ID", "Name", "Text", "Media", "Random", "Week Days", "Times"],
            theme,
        ))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border))
                .title(format!(" Posts ({}) ", state.posts.len())),
        )
        .highlight_style(Style::default().bg(theme.highlight_bg).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
    frame.render_stateful_widget(table, area, &mut state.table_state);
}

pub fn render_stats_tab(frame: &mut Frame, app: &mut App, area: Rect, theme: &ThemeColors) {
    let state = &mut app.stats_state;
    if let Some(error) = &state.error {
        let msg = format!("Failed to load stats: {}\n\nPress 'r' to retry", error);
        frame.render_widget(message_block(msg, Style::default().fg(theme.error), " Stats ", theme), area);
        return;
    }
    if state.stats.is_empty() {
        let msg = "No runs recorded yet.".to_string();
        frame.render_widget(message_block(msg, Style::default().fg(theme.text_dim), " Stats ", theme), area);
        return;
    }

    let rows = state.stats.iter().map(|stat| {
        Row::new(vec![
            Cell::from(stat.id.to_string()),
            Cell::from(truncate(&stat.post_name, 30)),
            Cell::from(stat.date.format("%Y-%m-%d").to_string()),
            Cell::from(stat.time.clone()),
            Cell::from(stat.day_name.clone()),
            Cell::from(stat.status.clone()),
        ])
        .style(Style::default().fg(theme.text))
    });

    let widths = [
        Constraint::Length(6),
        Constraint::Percentage(30),
        Constraint::Length(12),
        Constraint::Length(10),
        Constraint::Length(11),
        Constraint::Min(10),
    ];
    let table = Table::new(rows, widths)
        .header(header_row(
            &["ID", "Name", "Date", "Time", "Week Day", "Status"],
            theme,
        ))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border))
                .title(format!(" Stats ({}) ", state.stats.len())),
        )
        .highlight_style(Style::default().bg(theme.highlight_bg).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
    frame.render_stateful_widget(table, area, &mut state.table_state);
}
