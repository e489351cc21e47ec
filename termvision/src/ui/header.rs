//! Top header with endpoint, connection state and key hints.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::{Block, Borders},
};

use crate::session::ConnectionState;
use crate::view::ViewModel;

fn state_color(s: ConnectionState) -> Color {
    match s {
        ConnectionState::Open => Color::Green,
        ConnectionState::Connecting => Color::Yellow,
        ConnectionState::Closed => Color::DarkGray,
        ConnectionState::Errored => Color::Red,
    }
}

pub fn draw_header(f: &mut ratatui::Frame<'_>, area: Rect, v: &ViewModel) {
    let mut title = format!("termvision — {} [{}]", v.endpoint, v.connection.label());
    if let Some(err) = v.last_error.as_deref() {
        title.push_str(&format!(" {err}"));
    }
    if v.counters.dropped > 0 {
        title.push_str(&format!(" | dropped frames: {}", v.counters.dropped));
    }
    title.push_str("  (q quit, l log, r reconnect, 1-0/- sort)");
    f.render_widget(
        Block::default()
            .title(title)
            .borders(Borders::BOTTOM)
            .style(Style::default().fg(state_color(v.connection))),
        area,
    );
}
