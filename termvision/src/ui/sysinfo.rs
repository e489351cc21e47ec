//! System information panel: process state counts, users and uptime.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph, Wrap},
};

use crate::ui::theme::{DIM, TEXT};
use crate::view::ViewModel;

pub fn draw_sysinfo(f: &mut ratatui::Frame<'_>, area: Rect, v: &ViewModel) {
    let info = &v.system_info;
    let s = &info.states;
    let heading = |t: &'static str| Line::styled(t, Style::default().fg(DIM).add_modifier(Modifier::BOLD));
    let text = |t: String| Line::styled(t, Style::default().fg(TEXT));

    let mut lines = vec![
        heading("Process Summary"),
        text(format!("Total: {}  Running: {}  Sleeping: {}", s.total, s.running, s.sleeping)),
        text(format!(
            "Stopped: {}  Zombie: {}  Idle: {}  Other: {}",
            s.stopped, s.zombie, s.idle, s.other
        )),
        Line::default(),
        heading("Current Users"),
    ];
    lines.extend(
        info.current_users
            .iter()
            .map(|u| text(format!("{} ({})", u.name, u.detail))),
    );
    lines.push(Line::default());
    lines.push(heading("Last Users"));
    lines.extend(
        info.last_users
            .iter()
            .map(|u| text(format!("{} - {}", u.name, u.detail))),
    );
    lines.push(Line::default());
    lines.push(heading("System Uptime"));
    lines.push(text(info.uptime.clone()));

    let p = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("System Information"))
        .wrap(Wrap { trim: false });
    f.render_widget(p, area);
}
