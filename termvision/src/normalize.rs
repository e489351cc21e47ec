//! Metric normalizer: pure conversions from raw wire values to display units.
//!
//! Every function here is a deterministic function of its raw input and is applied exactly
//! once, at decode time.

use tracing::debug;

use crate::types::{
    LoadAvg, Metrics, ProcessRow, ProcessStates, RawMetrics, RawProcess, RawStats,
    RawSystemInfo, RawUsage, RawUser, RawUserList, Snapshot, SystemInfo, Usage, UserEntry,
};

/// Binary gigabyte.
pub const GIB: f64 = 1_073_741_824.0;

/// Longest command shown in the process table, in characters.
pub const COMMAND_MAX_CHARS: usize = 29;

pub fn bytes_to_gib(bytes: f64) -> f64 {
    bytes / GIB
}

pub fn normalize_usage(raw: &RawUsage) -> Usage {
    Usage {
        used_gb: bytes_to_gib(raw.used),
        total_gb: bytes_to_gib(raw.total),
    }
}

impl Usage {
    /// Fill ratio for gauges, 0 when the total is zero.
    pub fn ratio(&self) -> f64 {
        usage_ratio(self.used_gb, self.total_gb)
    }
}

pub fn usage_ratio(used: f64, total: f64) -> f64 {
    if total <= 0.0 || !total.is_finite() || !used.is_finite() {
        return 0.0;
    }
    (used / total).clamp(0.0, 1.0)
}

pub fn normalize_metrics(raw: &RawMetrics) -> Metrics {
    let [one, five, fifteen] = raw.load_avg;
    Metrics {
        cpu_percent: raw.cpu,
        memory: normalize_usage(&raw.memory),
        disk: normalize_usage(&raw.disk),
        load_avg: LoadAvg { one, five, fifteen },
    }
}

/// KiB to MiB, rounded to one decimal.
pub fn kib_to_mib(kib: f64) -> f64 {
    (kib / 1024.0 * 10.0).round() / 10.0
}

/// Seconds to `MM:SS`. Minutes are not capped at 59 and no hour field is added.
pub fn format_cpu_time(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Keep the first 29 characters, no ellipsis. Shorter strings pass through untouched.
pub fn truncate_command(command: &str) -> String {
    match command.char_indices().nth(COMMAND_MAX_CHARS) {
        Some((cut, _)) => command[..cut].to_string(),
        None => command.to_string(),
    }
}

fn trimmed(s: &Option<String>) -> String {
    s.as_deref().map(str::trim).unwrap_or_default().to_string()
}

/// Returns `None` for rows the producer could not inspect (non-integer pid).
pub fn normalize_process(raw: &RawProcess) -> Option<ProcessRow> {
    let Some(pid) = raw.pid.as_i64() else {
        debug!(pid = %raw.pid.as_text(), "skipping process row without integer pid");
        return None;
    };
    // fractional seconds from the producer are floored
    let seconds = raw.time.as_f64().map(|s| s.max(0.0) as u64).unwrap_or(0);
    Some(ProcessRow {
        user: trimmed(&raw.user),
        pid,
        cpu_percent: raw.cpu.as_text(),
        mem_percent: raw.memory.as_text(),
        virtual_size_mb: raw.vsz.as_f64().map(kib_to_mib).unwrap_or(0.0),
        resident_size_mb: raw.rss.as_f64().map(kib_to_mib).unwrap_or(0.0),
        tty: trimmed(&raw.tty),
        stat: trimmed(&raw.stat),
        start: trimmed(&raw.start),
        cpu_time: format_cpu_time(seconds),
        command: truncate_command(raw.command.as_deref().unwrap_or_default()),
    })
}

fn user_entry(raw: &RawUser) -> UserEntry {
    let detail = raw
        .terminal
        .as_deref()
        .or(raw.time.as_deref())
        .unwrap_or("?");
    UserEntry {
        name: raw.name.clone(),
        detail: detail.to_string(),
    }
}

pub fn normalize_system_info(raw: &RawSystemInfo) -> SystemInfo {
    let RawSystemInfo(summary, current, last, uptime) = raw;
    let s = &summary.states;
    SystemInfo {
        states: ProcessStates {
            running: s.running,
            sleeping: s.sleeping,
            stopped: s.stopped,
            zombie: s.zombie,
            idle: s.idle,
            other: s.other,
            total: summary.total_processes,
        },
        current_users: current.iter().map(user_entry).collect(),
        last_users: match last {
            RawUserList::Users(users) => users.iter().map(user_entry).collect(),
            RawUserList::Unavailable(msg) => {
                debug!(%msg, "producer could not list last users");
                Vec::new()
            }
        },
        uptime: uptime.clone(),
    }
}

pub fn normalize_snapshot(raw: RawStats) -> Snapshot {
    Snapshot {
        metrics: normalize_metrics(&raw.metrics),
        processes: raw.processes.iter().filter_map(normalize_process).collect(),
        system_info: normalize_system_info(&raw.system_info),
        log_tail: raw.log_tail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Scalar;

    fn raw_proc(command: &str) -> RawProcess {
        RawProcess {
            user: Some("  root ".into()),
            pid: Scalar::Num(42u64.into()),
            cpu: Scalar::Str("1.5".into()),
            memory: Scalar::Str("0.3".into()),
            vsz: Scalar::Num(204800u64.into()),
            rss: Scalar::Str("1536".into()),
            tty: Some(" ? ".into()),
            stat: Some("S ".into()),
            start: Some(" 10:22".into()),
            time: Scalar::Str("125.73".into()),
            command: Some(command.into()),
        }
    }

    #[test]
    fn memory_is_converted_to_binary_gigabytes() {
        let u = normalize_usage(&RawUsage {
            used: GIB,
            total: 4.0 * GIB,
        });
        assert_eq!(u.used_gb, 1.0);
        assert_eq!(u.total_gb, 4.0);
        assert_eq!(u.ratio(), 0.25);
    }

    #[test]
    fn zero_total_ratio_is_zero() {
        let u = normalize_usage(&RawUsage { used: 5.0, total: 0.0 });
        assert_eq!(u.ratio(), 0.0);
        assert_eq!(usage_ratio(0.0, 0.0), 0.0);
    }

    #[test]
    fn ratio_stays_within_unit_range() {
        // used above total (psutil can report this briefly)
        assert_eq!(usage_ratio(6.0, 4.0), 1.0);
        assert_eq!(usage_ratio(-1.0, 4.0), 0.0);
        assert_eq!(usage_ratio(f64::NAN, 4.0), 0.0);
        assert_eq!(usage_ratio(1.0, f64::INFINITY), 0.0);
        assert_eq!(usage_ratio(f64::INFINITY, 4.0), 0.0);
    }

    #[test]
    fn load_average_keeps_source_order() {
        let m = normalize_metrics(&RawMetrics {
            cpu: 1.5,
            memory: RawUsage::default(),
            disk: RawUsage::default(),
            load_avg: [3.0, 1.0, 2.0],
        });
        assert_eq!(m.cpu_percent, 1.5);
        assert_eq!(
            m.load_avg,
            LoadAvg {
                one: 3.0,
                five: 1.0,
                fifteen: 2.0
            }
        );
    }

    #[test]
    fn sizes_are_kib_to_mib_one_decimal() {
        assert_eq!(kib_to_mib(204800.0), 200.0);
        assert_eq!(kib_to_mib(1536.0), 1.5);
        assert_eq!(kib_to_mib(1000.0), 1.0);
    }

    #[test]
    fn cpu_time_is_zero_padded_and_uncapped() {
        assert_eq!(format_cpu_time(125), "02:05");
        assert_eq!(format_cpu_time(0), "00:00");
        assert_eq!(format_cpu_time(6000), "100:00");
    }

    #[test]
    fn command_truncation_boundaries() {
        let thirty = "abcdefghijklmnopqrstuvwxyz0123";
        assert_eq!(thirty.len(), 30);
        assert_eq!(truncate_command(thirty), &thirty[..29]);
        let twenty_nine = &thirty[..29];
        assert_eq!(truncate_command(twenty_nine), twenty_nine);
        assert_eq!(truncate_command("  a  b  "), "  a  b  ");
        // multi-byte characters are counted as characters
        let wide = "é".repeat(31);
        assert_eq!(truncate_command(&wide).chars().count(), 29);
    }

    #[test]
    fn process_row_is_trimmed_and_converted() {
        let row = normalize_process(&raw_proc(" sshd: user@pts/0 ")).unwrap();
        assert_eq!(row.user, "root");
        assert_eq!(row.pid, 42);
        assert_eq!(row.cpu_percent, "1.5");
        assert_eq!(row.virtual_size_mb, 200.0);
        assert_eq!(row.resident_size_mb, 1.5);
        assert_eq!(row.tty, "?");
        assert_eq!(row.stat, "S");
        assert_eq!(row.start, "10:22");
        assert_eq!(row.cpu_time, "02:05");
        // command keeps its whitespace
        assert_eq!(row.command, " sshd: user@pts/0 ");
    }

    #[test]
    fn unreadable_process_row_is_skipped() {
        let mut raw = raw_proc("x");
        raw.pid = Scalar::Str("N/A".into());
        assert!(normalize_process(&raw).is_none());
    }
}
