//! System metrics panel: CPU, memory and disk gauges plus load averages.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::Line,
    widgets::{Block, Borders, Gauge, Paragraph},
};

use crate::normalize::usage_ratio;
use crate::types::Usage;
use crate::ui::theme::{DIM, TEXT};
use crate::ui::util::{fmt_gb, fmt_pct, gauge_percent};
use crate::view::ViewModel;

fn usage_gauge<'a>(title: &'a str, u: &Usage) -> Gauge<'a> {
    Gauge::default()
        .block(Block::default().title(title).style(Style::default().fg(DIM)))
        .gauge_style(Style::default().fg(TEXT))
        .percent(gauge_percent(u.ratio()))
        .label(format!("{}/{}", fmt_gb(u.used_gb), fmt_gb(u.total_gb)))
}

pub fn draw_metrics(f: &mut ratatui::Frame<'_>, area: Rect, v: &ViewModel) {
    let block = Block::default().borders(Borders::ALL).title("System Metrics");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // cpu
            Constraint::Length(2), // memory
            Constraint::Length(2), // disk
            Constraint::Min(2),    // load average
        ])
        .split(inner);

    let m = &v.metrics;
    let cpu = Gauge::default()
        .block(Block::default().title("CPU Usage").style(Style::default().fg(DIM)))
        .gauge_style(Style::default().fg(TEXT))
        .percent(gauge_percent(usage_ratio(m.cpu_percent, 100.0)))
        .label(fmt_pct(m.cpu_percent));
    f.render_widget(cpu, rows[0]);
    f.render_widget(usage_gauge("Memory Usage", &m.memory), rows[1]);
    f.render_widget(usage_gauge("Disk Usage", &m.disk), rows[2]);

    let load = Paragraph::new(vec![
        Line::styled("Load Average  1min   5min   15min", Style::default().fg(DIM)),
        Line::styled(
            format!(
                "              {:<6.2} {:<6.2} {:<6.2}",
                m.load_avg.one, m.load_avg.five, m.load_avg.fifteen
            ),
            Style::default().fg(TEXT),
        ),
    ]);
    f.render_widget(load, rows[3]);
}
