// UI module - split into cohesive submodules
pub mod theme;
mod formatting;
mod help;
mod tabs;

pub use self::render_main::render;

mod render_main {
    use ratatui::{
        layout::{Alignment, Constraint, Direction, Layout},
        style::{Modifier, Style},
        text::{Line, Span},
        widgets::{Block, Borders, Clear, Paragraph},
        Frame,
    };

    use super::help::render_help_modal;
    use super::tabs::{
        render_create_tab, render_footer, render_posts_tab, render_stats_tab, render_status_line,
        render_tab_header,
    };
    use super::theme::ThemeColors;
    use crate::app::{App, Tab};
    use crate::log_rendering;

    const MIN_WIDTH: u16 = 60;
    const MIN_HEIGHT: u16 = 20;

    /// Render the whole screen
    pub fn render(app: &mut App, frame: &mut Frame) {
        let area = frame.area();
        let theme = ThemeColors::default();
        log_rendering!(app.log_config, "render {:?} {}x{}", app.current_tab, area.width, area.height);

        frame.render_widget(Clear, area);
        frame.render_widget(Block::default().style(Style::default().bg(theme.background)), area);

        if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
            let warning = Paragraph::new(vec![
                Line::from(""),
                Line::from(Span::styled(
                    "Terminal Too Small",
                    Style::default().fg(theme.error).add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
                Line::from(Span::styled(
                    format!("Minimum size: {}x{}", MIN_WIDTH, MIN_HEIGHT),
                    Style::default().fg(theme.text),
                )),
                Line::from(Span::styled(
                    format!("Current size: {}x{}", area.width, area.height),
                    Style::default().fg(theme.warning),
                )),
            ])
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(theme.error)),
            );
            frame.render_widget(warning, area);
            return;
        }

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Tab header
                Constraint::Length(1), // Status line
                Constraint::Min(0),    // Content
                Constraint::Length(3), // Footer
            ])
            .split(area);

        render_tab_header(frame, app, chunks[0], &theme);
        render_status_line(frame, app, chunks[1], &theme);
        match app.current_tab {
            Tab::Create => render_create_tab(frame, app, chunks[2], &theme),
            Tab::Posts => render_posts_tab(frame, app, chunks[2], &theme),
            Tab::Stats => render_stats_tab(frame, app, chunks[2], &theme),
        }
        render_footer(frame, app, chunks[3], &theme);

        if app.show_help {
            render_help_modal(frame, app, area, &theme);
        }
    }
}
