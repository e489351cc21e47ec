//! Process table engine: holds the latest process rows and a column sort, and produces
//! the sorted projection the table is drawn from.

use std::cmp::Ordering;

use crate::types::ProcessRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessColumn {
    User,
    Pid,
    Cpu,
    Mem,
    Vsz,
    Rss,
    Tty,
    Stat,
    Start,
    Time,
    Command,
}

impl ProcessColumn {
    /// Display order, left to right.
    pub const ALL: [ProcessColumn; 11] = [
        ProcessColumn::User,
        ProcessColumn::Pid,
        ProcessColumn::Cpu,
        ProcessColumn::Mem,
        ProcessColumn::Vsz,
        ProcessColumn::Rss,
        ProcessColumn::Tty,
        ProcessColumn::Stat,
        ProcessColumn::Start,
        ProcessColumn::Time,
        ProcessColumn::Command,
    ];

    pub fn header(self) -> &'static str {
        match self {
            ProcessColumn::User => "USER",
            ProcessColumn::Pid => "PID",
            ProcessColumn::Cpu => "%CPU",
            ProcessColumn::Mem => "%MEM",
            ProcessColumn::Vsz => "VSZ(MB)",
            ProcessColumn::Rss => "RSS(MB)",
            ProcessColumn::Tty => "TTY",
            ProcessColumn::Stat => "STAT",
            ProcessColumn::Start => "START",
            ProcessColumn::Time => "TIME",
            ProcessColumn::Command => "COMMAND",
        }
    }

    /// Numeric columns compare by value; the rest (percentages included) compare as text.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            ProcessColumn::Pid | ProcessColumn::Vsz | ProcessColumn::Rss
        )
    }

    /// Compare two rows on this column, ascending.
    pub fn compare(self, a: &ProcessRow, b: &ProcessRow) -> Ordering {
        match self {
            ProcessColumn::User => a.user.cmp(&b.user),
            ProcessColumn::Pid => a.pid.cmp(&b.pid),
            // reported strings, so "9.0" sorts after "10.0"
            ProcessColumn::Cpu => a.cpu_percent.cmp(&b.cpu_percent),
            ProcessColumn::Mem => a.mem_percent.cmp(&b.mem_percent),
            ProcessColumn::Vsz => a.virtual_size_mb.total_cmp(&b.virtual_size_mb),
            ProcessColumn::Rss => a.resident_size_mb.total_cmp(&b.resident_size_mb),
            ProcessColumn::Tty => a.tty.cmp(&b.tty),
            ProcessColumn::Stat => a.stat.cmp(&b.stat),
            ProcessColumn::Start => a.start.cmp(&b.start),
            ProcessColumn::Time => a.cpu_time.cmp(&b.cpu_time),
            ProcessColumn::Command => a.command.cmp(&b.command),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            SortDirection::Asc => " ↑",
            SortDirection::Desc => " ↓",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortSpec {
    pub column: Option<ProcessColumn>,
    pub direction: SortDirection,
}

impl SortSpec {
    /// Sort intent: a new column starts ascending, the same column flips direction.
    /// There is no way back to "unsorted".
    pub fn select(&mut self, column: ProcessColumn) {
        if self.column == Some(column) {
            self.direction = self.direction.toggled();
        } else {
            *self = SortSpec {
                column: Some(column),
                direction: SortDirection::Asc,
            };
        }
    }

    /// Header suffix for `column` (` ↑` / ` ↓`), empty if it is not the sort column.
    pub fn indicator(&self, column: ProcessColumn) -> &'static str {
        if self.column == Some(column) {
            self.direction.arrow()
        } else {
            ""
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProcessTable {
    // arrival order; never reordered in place
    rows: Vec<ProcessRow>,
    spec: SortSpec,
}

impl ProcessTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the snapshot rows. The sort selection is kept and applied on the next read.
    pub fn set_rows(&mut self, rows: Vec<ProcessRow>) {
        self.rows = rows;
    }

    pub fn sort(&mut self, column: ProcessColumn) {
        self.spec.select(column);
    }

    pub fn spec(&self) -> SortSpec {
        self.spec
    }

    pub fn rows(&self) -> &[ProcessRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sorted projection of the current rows. Stable: equal keys keep arrival order
    /// in both directions.
    pub fn sorted(&self) -> Vec<ProcessRow> {
        let mut out = self.rows.clone();
        let Some(column) = self.spec.column else {
            return out;
        };
        match self.spec.direction {
            SortDirection::Asc => out.sort_by(|a, b| column.compare(a, b)),
            SortDirection::Desc => out.sort_by(|a, b| column.compare(b, a)),
        }
        out
    }
}
