//! Process table with click-to-sort headers, zebra striping and a scrollbar.

use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::style::Modifier;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
};

use crate::procs::ProcessColumn;
use crate::ui::theme::{DIM, SB_ARROW, SB_THUMB, SB_TRACK, TEXT, ZEBRA};
use crate::view::ViewModel;

// Keep header widths here so drawing and hit-testing match. Same order as ProcessColumn::ALL.
const COLS: [Constraint; 11] = [
    Constraint::Length(10), // USER
    Constraint::Length(8),  // PID
    Constraint::Length(7),  // %CPU
    Constraint::Length(7),  // %MEM
    Constraint::Length(10), // VSZ(MB)
    Constraint::Length(10), // RSS(MB)
    Constraint::Length(6),  // TTY
    Constraint::Length(7),  // STAT
    Constraint::Length(8),  // START
    Constraint::Length(8),  // TIME
    Constraint::Min(12),    // COMMAND
];

fn inner_of(area: Rect) -> Rect {
    Rect {
        x: area.x + 1,
        y: area.y + 1,
        width: area.width.saturating_sub(2),
        height: area.height.saturating_sub(2),
    }
}

// reserve 2 columns for the scrollbar
fn content_of(inner: Rect) -> Rect {
    Rect {
        x: inner.x,
        y: inner.y,
        width: inner.width.saturating_sub(2),
        height: inner.height,
    }
}

/// Rows visible below the header for a table drawn in `area`.
pub fn viewport_rows(area: Rect) -> usize {
    inner_of(area).height.saturating_sub(1) as usize
}

fn cell_text(col: ProcessColumn, p: &crate::types::ProcessRow) -> String {
    match col {
        ProcessColumn::User => p.user.clone(),
        ProcessColumn::Pid => p.pid.to_string(),
        ProcessColumn::Cpu => p.cpu_percent.clone(),
        ProcessColumn::Mem => p.mem_percent.clone(),
        ProcessColumn::Vsz => format!("{:.1}", p.virtual_size_mb),
        ProcessColumn::Rss => format!("{:.1}", p.resident_size_mb),
        ProcessColumn::Tty => p.tty.clone(),
        ProcessColumn::Stat => p.stat.clone(),
        ProcessColumn::Start => p.start.clone(),
        ProcessColumn::Time => p.cpu_time.clone(),
        ProcessColumn::Command => p.command.clone(),
    }
}

pub fn draw_processes(f: &mut ratatui::Frame<'_>, area: Rect, v: &ViewModel, scroll_offset: usize) {
    let title = match v.updated_at {
        Some(ts) => format!(
            "Process List - {} ({} shown)",
            ts.format("%Y-%m-%d %H:%M:%S"),
            v.processes.len()
        ),
        None => "Process List".to_string(),
    };
    f.render_widget(Block::default().borders(Borders::ALL).title(title), area);

    let inner = inner_of(area);
    if inner.height < 1 || inner.width < 3 {
        return;
    }
    let content = content_of(inner);

    // Scrolling
    let total_rows = v.processes.len();
    let viewport = content.height.saturating_sub(1) as usize;
    let max_off = total_rows.saturating_sub(viewport);
    let offset = scroll_offset.min(max_off);
    let show_n = total_rows.saturating_sub(offset).min(viewport);

    let rows = v
        .processes
        .iter()
        .enumerate()
        .skip(offset)
        .take(show_n)
        .map(|(i, p)| {
            let cells = ProcessColumn::ALL.iter().map(|&c| {
                let cell = Cell::from(cell_text(c, p));
                match c {
                    ProcessColumn::Pid => cell.style(Style::default().fg(Color::DarkGray)),
                    _ => cell,
                }
            });
            let style = if i % 2 == 1 {
                Style::default().fg(TEXT).bg(ZEBRA)
            } else {
                Style::default().fg(TEXT)
            };
            Row::new(cells).style(style)
        });

    // Header with sort indicator
    let header = Row::new(
        ProcessColumn::ALL
            .iter()
            .map(|&c| format!("{}{}", c.header(), v.sort.indicator(c))),
    )
    .style(Style::default().fg(DIM).add_modifier(Modifier::BOLD));

    let table = Table::new(rows, COLS.to_vec())
        .header(header)
        .column_spacing(1);
    f.render_widget(table, content);

    let scroll_area = Rect {
        x: inner.x + inner.width.saturating_sub(1),
        y: inner.y,
        width: 1,
        height: inner.height,
    };
    draw_scrollbar(f, scroll_area, total_rows, viewport, offset);
}

fn draw_scrollbar(f: &mut ratatui::Frame<'_>, area: Rect, total: usize, view: usize, offset: usize) {
    if area.height < 3 {
        return;
    }
    let track = (area.height - 2) as usize;
    let total = total.max(1);
    let view = view.clamp(1, total);
    let max_off = total.saturating_sub(view);

    let thumb_len = (track * view).div_ceil(total).max(1).min(track);
    let thumb_top = if max_off == 0 {
        0
    } else {
        ((track - thumb_len) * offset.min(max_off) + max_off / 2) / max_off
    };

    // Build lines: top arrow, track (with thumb), bottom arrow
    let mut lines: Vec<Line> = Vec::with_capacity(area.height as usize);
    lines.push(Line::from(Span::styled("▲", Style::default().fg(SB_ARROW))));
    for i in 0..track {
        if i >= thumb_top && i < thumb_top + thumb_len {
            lines.push(Line::from(Span::styled("█", Style::default().fg(SB_THUMB))));
        } else {
            lines.push(Line::from(Span::styled("│", Style::default().fg(SB_TRACK))));
        }
    }
    lines.push(Line::from(Span::styled("▼", Style::default().fg(SB_ARROW))));
    f.render_widget(Paragraph::new(lines), area);
}

pub fn clamp_offset(scroll_offset: &mut usize, total_rows: usize, page: usize) {
    let max_off = total_rows.saturating_sub(page);
    if *scroll_offset > max_off {
        *scroll_offset = max_off;
    }
}

/// Handle keyboard scrolling (Up/Down/PageUp/PageDown/Home/End)
pub fn processes_handle_key(scroll_offset: &mut usize, key: KeyEvent, page_size: usize) {
    let page = page_size.max(1);
    match key.code {
        KeyCode::Up => *scroll_offset = scroll_offset.saturating_sub(1),
        KeyCode::Down => *scroll_offset = scroll_offset.saturating_add(1),
        KeyCode::PageUp => *scroll_offset = scroll_offset.saturating_sub(page),
        KeyCode::PageDown => *scroll_offset = scroll_offset.saturating_add(page),
        KeyCode::Home => *scroll_offset = 0,
        KeyCode::End => *scroll_offset = usize::MAX,
        _ => {}
    }
}

/// Handle wheel scrolling and header clicks.
/// Returns Some(column) if a column header was clicked.
pub fn processes_handle_mouse(
    scroll_offset: &mut usize,
    mouse: MouseEvent,
    area: Rect,
) -> Option<ProcessColumn> {
    let inner = inner_of(area);
    if inner.height == 0 || inner.width <= 2 {
        return None;
    }
    let content = content_of(inner);
    let inside = |r: Rect| {
        mouse.column >= r.x && mouse.column < r.x + r.width && mouse.row >= r.y && mouse.row < r.y + r.height
    };

    match mouse.kind {
        MouseEventKind::ScrollUp if inside(content) => {
            *scroll_offset = scroll_offset.saturating_sub(1);
        }
        MouseEventKind::ScrollDown if inside(content) => {
            *scroll_offset = scroll_offset.saturating_add(1);
        }
        MouseEventKind::Down(MouseButton::Left) => {
            let header_area = Rect {
                height: 1,
                ..content
            };
            if !inside(header_area) {
                return None;
            }
            // Split header into the same columns (spacing 1, like the table)
            let cols = Layout::default()
                .direction(Direction::Horizontal)
                .constraints(COLS.to_vec())
                .spacing(1)
                .split(header_area);
            return cols
                .iter()
                .position(|c| mouse.column >= c.x && mouse.column < c.x + c.width)
                .map(|i| ProcessColumn::ALL[i]);
        }
        _ => {}
    }
    None
}
