//! Reusable TUI widgets.

use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Bottom status bar. Failure messages are shown in red.
pub(crate) fn status_bar(msg: &str) -> Paragraph<'_> {
    let fg = if msg.contains("failed") || msg.contains("Failed") {
        Color::LightRed
    } else {
        Color::White
    };
    Paragraph::new(Line::from(vec![
        Span::raw(format!(" {msg}")),
        Span::styled("  ·  Ctrl-C quit", Style::default().fg(Color::Gray)),
    ]))
    .style(Style::default().bg(Color::DarkGray).fg(fg))
}
