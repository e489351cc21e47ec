//! System log tail, numbered from the oldest line shown.

use ratatui::{
    layout::Rect,
    style::Style,
    text::Line,
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::ui::theme::TEXT;
use crate::view::ViewModel;

pub fn draw_logs(f: &mut ratatui::Frame<'_>, area: Rect, v: &ViewModel) {
    let lines: Vec<Line> = v
        .log_tail
        .iter()
        .enumerate()
        .map(|(i, l)| Line::styled(format!("{} - {}", i + 1, l.trim_end()), Style::default().fg(TEXT)))
        .collect();
    let p = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("System Log"))
        .wrap(Wrap { trim: false });
    f.render_widget(p, area);
}
