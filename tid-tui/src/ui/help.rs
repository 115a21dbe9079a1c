use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use super::formatting::centered_rect;
use super::theme::ThemeColors;
use crate::app::{App, Tab};

type Shortcuts = Vec<(&'static str, Vec<(&'static str, &'static str)>)>;

fn shortcuts_for(tab: Tab) -> Shortcuts {
    let mut sections = vec![(
        "Global",
        vec![
            ("Tab / Shift+Tab", "Next / previous tab"),
            ("1 / 2 / 3", "Create / Posts / Stats"),
            ("Alt+1 / 2 / 3", "Switch tabs while typing"),
            ("?", "Toggle this help"),
            ("q", "Quit (outside text fields)"),
            ("Ctrl+C", "Quit"),
        ],
    )];

    let tab_section = match tab {
        Tab::Create => (
            "Create",
            vec![
                ("Up / Down", "Move between fields"),
                ("Enter", "Add media path / add time / submit"),
                ("Left / Right", "Change hour, minute or selection"),
                ("Space", "Toggle random or week day"),
                ("x / Delete", "Remove selected media or time"),
                ("Esc", "Leave a text field"),
                ("Ctrl+S", "Submit the form"),
            ],
        ),
        Tab::Posts => (
            "Posts",
            vec![
                ("Up / Down", "Select post"),
                ("r", "Refresh"),
                ("d", "Delete selected post"),
            ],
        ),
        Tab::Stats => (
            "Stats",
            vec![("Up / Down", "Select row"), ("r", "Refresh")],
        ),
    };
    sections.push(tab_section);
    sections
}

pub fn render_help_modal(frame: &mut Frame, app: &App, area: Rect, theme: &ThemeColors) {
    let modal_area = centered_rect(70, 80, area);
    frame.render_widget(Clear, modal_area);

    let mut lines = vec![Line::from("")];
    for (category, items) in shortcuts_for(app.current_tab) {
        lines.push(Line::from(Span::styled(
            category,
            Style::default().fg(theme.accent).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(""));
        for (key, description) in items {
            lines.push(Line::from(vec![
                Span::styled(format!("  {:<18}", key), Style::default().fg(theme.success)),
                Span::styled(description, Style::default().fg(theme.text)),
            ]));
        }
        lines.push(Line::from(""));
    }

    let help = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.accent).add_modifier(Modifier::BOLD))
                .title(" Keyboard Shortcuts ")
                .title_alignment(Alignment::Center)
                .style(Style::default().bg(theme.background)),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(help, modal_area);
}
