use ratatui::style::{Color, Modifier, Style};

use crate::app::StatusKind;

pub struct ThemeColors {
    pub primary: Color,
    pub accent: Color,
    pub text: Color,
    pub text_dim: Color,
    pub background: Color,
    pub border: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub highlight_bg: Color,
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            primary: Color::Rgb(100, 200, 255),
            accent: Color::Rgb(255, 100, 200),
            text: Color::Rgb(220, 220, 220),
            text_dim: Color::Rgb(120, 120, 120),
            background: Color::Rgb(20, 20, 25),
            border: Color::Rgb(60, 60, 70),
            success: Color::Rgb(100, 255, 150),
            warning: Color::Rgb(255, 200, 100),
            error: Color::Rgb(255, 100, 100),
            highlight_bg: Color::Rgb(40, 40, 50),
        }
    }
}

impl ThemeColors {
    pub fn status_style(&self, kind: StatusKind) -> Style {
        let color = match kind {
            StatusKind::Success => self.success,
            StatusKind::Error => self.error,
        };
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }

    /// Style for a form row, brighter when it has focus
    pub fn field_style(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.success).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(self.text)
        }
    }
}
