//! App: terminal setup, input handling and drawing. Reads the published view model and
//! sends intents back to the session; it never touches the connection itself.

use std::{io, sync::Arc, time::Duration};

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyModifiers,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    Terminal,
};
use tokio::time::sleep;
use tracing::info;

use crate::config::ClientConfig;
use crate::procs::ProcessColumn;
use crate::session::{spawn_session, Intent, SessionHandle};
use crate::ui::{
    header::draw_header,
    logs::draw_logs,
    metrics::draw_metrics,
    processes::{
        clamp_offset, draw_processes, processes_handle_key, processes_handle_mouse, viewport_rows,
    },
    sysinfo::draw_sysinfo,
};
use crate::view::{ViewMode, ViewModel};

/// Sort shortcut: `1`..`9`, `0`, `-` map to the columns left to right.
pub fn sort_key(code: KeyCode) -> Option<ProcessColumn> {
    let idx = match code {
        KeyCode::Char(c @ '1'..='9') => c as usize - '1' as usize,
        KeyCode::Char('0') => 9,
        KeyCode::Char('-') => 10,
        _ => return None,
    };
    ProcessColumn::ALL.get(idx).copied()
}

#[derive(Default)]
pub struct App {
    should_quit: bool,
    procs_scroll_offset: usize,
    last_procs_area: Option<Rect>,
}

impl App {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn run(&mut self, config: ClientConfig) -> anyhow::Result<()> {
        info!(url = %config.url, interval_ms = config.poll_interval.as_millis() as u64, "starting session");
        let session = spawn_session(config);

        // Terminal setup
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        // Main loop
        let res = self.event_loop(&mut terminal, &session).await;

        // Teardown
        disable_raw_mode()?;
        let backend = terminal.backend_mut();
        execute!(backend, DisableMouseCapture, LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        session.shutdown().await;
        res
    }

    async fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
        session: &SessionHandle,
    ) -> anyhow::Result<()> {
        let view = session.view();
        loop {
            let current: Arc<ViewModel> = view.borrow().clone();

            // Input (non-blocking)
            while event::poll(Duration::from_millis(10))? {
                match event::read()? {
                    Event::Key(k) => self.on_key(k, session, &current),
                    Event::Mouse(m) => {
                        if let Some(area) = self.last_procs_area {
                            if current.view_mode == ViewMode::Processes {
                                if let Some(column) =
                                    processes_handle_mouse(&mut self.procs_scroll_offset, m, area)
                                {
                                    session.send(Intent::Sort(column));
                                }
                                clamp_offset(
                                    &mut self.procs_scroll_offset,
                                    current.processes.len(),
                                    viewport_rows(area),
                                );
                            }
                        }
                    }
                    _ => {}
                }
            }
            if self.should_quit {
                break;
            }

            // Draw the latest published view
            let current = view.borrow().clone();
            terminal.draw(|f| self.draw(f, &current))?;

            sleep(Duration::from_millis(50)).await;
        }
        Ok(())
    }

    fn on_key(&mut self, k: KeyEvent, session: &SessionHandle, v: &ViewModel) {
        match k.code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => self.should_quit = true,
            // raw mode swallows SIGINT
            KeyCode::Char('c') if k.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true
            }
            KeyCode::Char('l') | KeyCode::Char('L') | KeyCode::Tab => {
                session.send(Intent::ToggleView);
            }
            KeyCode::Char('r') | KeyCode::Char('R') => {
                session.send(Intent::Reconnect);
            }
            code => {
                if let Some(column) = sort_key(code) {
                    session.send(Intent::Sort(column));
                } else if let Some(area) = self.last_procs_area {
                    let page = viewport_rows(area);
                    processes_handle_key(&mut self.procs_scroll_offset, k, page);
                    clamp_offset(&mut self.procs_scroll_offset, v.processes.len(), page);
                }
            }
        }
    }

    pub fn draw(&mut self, f: &mut ratatui::Frame<'_>, v: &ViewModel) {
        let area = f.area();

        // Root rows: header, body
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(10)])
            .split(area);
        draw_header(f, rows[0], v);

        // Body: main pane (processes or log) on the left, panels on the right
        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(40), Constraint::Length(44)])
            .split(rows[1]);
        let side = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(14), Constraint::Min(6)])
            .split(body[1]);

        match v.view_mode {
            ViewMode::Processes => {
                // Cache for input handlers
                self.last_procs_area = Some(body[0]);
                draw_processes(f, body[0], v, self.procs_scroll_offset);
            }
            ViewMode::Log => {
                self.last_procs_area = None;
                draw_logs(f, body[0], v);
            }
        }
        draw_metrics(f, side[0], v);
        draw_sysinfo(f, side[1], v);
    }
}
