//! View model: the owned core state and the immutable view published to the UI.
//!
//! The session task owns a [`CoreState`]. After every change it publishes a fresh
//! `Arc<ViewModel>` through a `watch` channel, so a reader always sees one complete
//! snapshot: metrics, processes, system info and log tail from the same frame.

use std::sync::Arc;

use chrono::{DateTime, Local};
use tokio::sync::watch;

use crate::procs::{ProcessColumn, ProcessTable, SortSpec};
use crate::session::ConnectionState;
use crate::types::{Metrics, ProcessRow, Snapshot, SystemInfo};

/// Which pane the main area shows. UI state, kept next to the core so intents are uniform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Processes,
    Log,
}

impl ViewMode {
    pub fn toggled(self) -> Self {
        match self {
            ViewMode::Processes => ViewMode::Log,
            ViewMode::Log => ViewMode::Processes,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameCounters {
    pub applied: u64,
    pub dropped: u64,
    pub ignored: u64,
}

/// Read-only aggregate handed to the presentation layer.
#[derive(Debug, Clone, Default)]
pub struct ViewModel {
    pub endpoint: String,
    pub connection: ConnectionState,
    pub metrics: Metrics,
    /// Already sorted by `sort`.
    pub processes: Vec<ProcessRow>,
    pub system_info: SystemInfo,
    pub log_tail: Vec<String>,
    pub sort: SortSpec,
    pub view_mode: ViewMode,
    pub counters: FrameCounters,
    pub last_error: Option<String>,
    /// Local time the current snapshot was applied; `None` until the first one.
    pub updated_at: Option<DateTime<Local>>,
}

impl ViewModel {
    pub fn has_snapshot(&self) -> bool {
        self.updated_at.is_some()
    }
}

#[derive(Debug, Default)]
pub struct CoreState {
    pub(crate) endpoint: String,
    pub(crate) connection: ConnectionState,
    metrics: Metrics,
    table: ProcessTable,
    system_info: SystemInfo,
    log_tail: Vec<String>,
    view_mode: ViewMode,
    pub(crate) counters: FrameCounters,
    pub(crate) last_error: Option<String>,
    updated_at: Option<DateTime<Local>>,
}

impl CoreState {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            ..Default::default()
        }
    }

    /// Replace every snapshot-derived field at once.
    pub fn apply_snapshot(&mut self, snap: Snapshot) {
        let Snapshot {
            metrics,
            processes,
            system_info,
            log_tail,
        } = snap;
        self.metrics = metrics;
        self.table.set_rows(processes);
        self.system_info = system_info;
        self.log_tail = log_tail;
        self.updated_at = Some(Local::now());
        self.counters.applied += 1;
    }

    pub fn sort(&mut self, column: ProcessColumn) {
        self.table.sort(column);
    }

    pub fn toggle_view(&mut self) {
        self.view_mode = self.view_mode.toggled();
    }

    pub fn table(&self) -> &ProcessTable {
        &self.table
    }

    pub fn view(&self) -> ViewModel {
        ViewModel {
            endpoint: self.endpoint.clone(),
            connection: self.connection,
            metrics: self.metrics,
            processes: self.table.sorted(),
            system_info: self.system_info.clone(),
            log_tail: self.log_tail.clone(),
            sort: self.table.spec(),
            view_mode: self.view_mode,
            counters: self.counters,
            last_error: self.last_error.clone(),
            updated_at: self.updated_at,
        }
    }
}

/// Consumer side of the published view.
pub type ViewReceiver = watch::Receiver<Arc<ViewModel>>;

pub struct ViewPublisher {
    tx: watch::Sender<Arc<ViewModel>>,
}

impl ViewPublisher {
    pub fn new(initial: ViewModel) -> (Self, ViewReceiver) {
        let (tx, rx) = watch::channel(Arc::new(initial));
        (Self { tx }, rx)
    }

    /// Swap in a new view. Works with or without live receivers.
    pub fn publish(&self, state: &CoreState) {
        self.tx.send_replace(Arc::new(state.view()));
    }

    pub fn subscribe(&self) -> ViewReceiver {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ProcessRow, Usage};

    fn snap(pids: &[i64], cpu: f64) -> Snapshot {
        Snapshot {
            metrics: Metrics {
                cpu_percent: cpu,
                memory: Usage {
                    used_gb: 1.0,
                    total_gb: 2.0,
                },
                ..Default::default()
            },
            processes: pids
                .iter()
                .map(|&pid| ProcessRow {
                    pid,
                    ..Default::default()
                })
                .collect(),
            system_info: SystemInfo::default(),
            log_tail: vec![format!("cpu {cpu}")],
        }
    }

    #[test]
    fn publish_replaces_everything_together() {
        let mut core = CoreState::new("ws://x/ws");
        let (publisher, rx) = ViewPublisher::new(core.view());
        assert!(!rx.borrow().has_snapshot());

        core.apply_snapshot(snap(&[2, 1], 5.0));
        core.sort(ProcessColumn::Pid);
        publisher.publish(&core);

        let v = rx.borrow().clone();
        assert!(v.has_snapshot());
        assert_eq!(v.metrics.cpu_percent, 5.0);
        assert_eq!(v.processes.iter().map(|p| p.pid).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(v.log_tail, vec!["cpu 5".to_string()]);
        assert_eq!(v.counters.applied, 1);
        assert_eq!(v.endpoint, "ws://x/ws");
    }

    #[test]
    fn toggle_view_flips_mode() {
        let mut core = CoreState::new("");
        assert_eq!(core.view().view_mode, ViewMode::Processes);
        core.toggle_view();
        assert_eq!(core.view().view_mode, ViewMode::Log);
        core.toggle_view();
        assert_eq!(core.view().view_mode, ViewMode::Processes);
    }
}
