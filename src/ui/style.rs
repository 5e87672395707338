//! Theming and color definitions.
//!
//! Semantic ANSI colors that respect the terminal's palette.

use ratatui::style::{Color, Modifier, Style};

/// Style for a heading of the given level, in the pane and the panel.
pub fn style_for_level(level: u8) -> Style {
    match level {
        1 => Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        2 => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        3 => Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
        4 => Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
        5 => Style::default()
            .fg(Color::Magenta)
            .add_modifier(Modifier::BOLD),
        _ => Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
    }
}

/// Style for ordinary document text.
pub fn text_style() -> Style {
    Style::default()
}

/// Dim style for hints and footers.
pub fn hint_style() -> Style {
    Style::default().fg(Color::Indexed(245))
}

/// The filter prompt in the panel.
pub fn filter_style() -> Style {
    Style::default().fg(Color::Yellow)
}
