//! Types that mirror the producer's JSON frames, plus the normalized display types
//! built from them.
//!
//! Raw types (`Raw*`) are only ever produced by the decoder and consumed by
//! [`crate::normalize`]. Everything downstream of decode works on the normalized types.

use serde::Deserialize;

// ---------- Wire types ----------

/// A JSON scalar that the producer may send either as a number or as a string.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum Scalar {
    Num(serde_json::Number),
    Str(String),
}

impl Scalar {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Num(n) => n.as_f64(),
            Scalar::Str(s) => s.trim().parse::<f64>().ok(),
        }
        .filter(|v| v.is_finite())
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::Num(n) => n.as_i64(),
            Scalar::Str(s) => s.trim().parse::<i64>().ok(),
        }
    }

    /// Textual form as reported by the producer.
    pub fn as_text(&self) -> String {
        match self {
            Scalar::Num(n) => n.to_string(),
            Scalar::Str(s) => s.clone(),
        }
    }
}

impl Default for Scalar {
    fn default() -> Self {
        Scalar::Str(String::new())
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct RawUsage {
    // psutil ships more keys (available, percent, free, ...); only these two matter
    pub used: f64,
    pub total: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RawMetrics {
    pub cpu: f64,
    pub memory: RawUsage,
    pub disk: RawUsage,
    pub load_avg: [f64; 3],
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct RawProcess {
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub pid: Scalar,
    #[serde(default)]
    pub cpu: Scalar,
    #[serde(default)]
    pub memory: Scalar,
    #[serde(default)]
    pub vsz: Scalar,
    #[serde(default)]
    pub rss: Scalar,
    #[serde(default)]
    pub tty: Option<String>,
    #[serde(default)]
    pub stat: Option<String>,
    #[serde(default)]
    pub start: Option<String>,
    #[serde(default)]
    pub time: Scalar,
    #[serde(default)]
    pub command: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct RawStates {
    #[serde(default)]
    pub running: u64,
    #[serde(default)]
    pub sleeping: u64,
    #[serde(default)]
    pub stopped: u64,
    #[serde(default)]
    pub zombie: u64,
    #[serde(default)]
    pub idle: u64,
    #[serde(default)]
    pub other: u64,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct RawProcessSummary {
    pub total_processes: u64,
    #[serde(default)]
    pub states: RawStates,
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct RawUser {
    pub name: String,
    #[serde(default)]
    pub terminal: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
}

/// A user list, or the message the producer sends instead when it could not read one.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum RawUserList {
    Users(Vec<RawUser>),
    Unavailable(String),
}

impl Default for RawUserList {
    fn default() -> Self {
        RawUserList::Users(Vec::new())
    }
}

/// `[summary, currentUsers, lastUsers, uptime]`
#[derive(Debug, Deserialize, Clone)]
pub struct RawSystemInfo(
    pub RawProcessSummary,
    pub Vec<RawUser>,
    pub RawUserList,
    pub String,
);

/// The four decoded elements of a `stats` payload.
#[derive(Debug, Clone)]
pub struct RawStats {
    pub metrics: RawMetrics,
    pub processes: Vec<RawProcess>,
    pub system_info: RawSystemInfo,
    pub log_tail: Vec<String>,
}

// ---------- Normalized types ----------

/// Used/total pair in binary gigabytes.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Usage {
    pub used_gb: f64,
    pub total_gb: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoadAvg {
    pub one: f64,
    pub five: f64,
    pub fifteen: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Metrics {
    pub cpu_percent: f64,
    pub memory: Usage,
    pub disk: Usage,
    pub load_avg: LoadAvg,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessRow {
    pub user: String,
    pub pid: i64,
    pub cpu_percent: String,
    pub mem_percent: String,
    pub virtual_size_mb: f64,
    pub resident_size_mb: f64,
    pub tty: String,
    pub stat: String,
    pub start: String,
    pub cpu_time: String,
    pub command: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessStates {
    pub running: u64,
    pub sleeping: u64,
    pub stopped: u64,
    pub zombie: u64,
    pub idle: u64,
    pub other: u64,
    pub total: u64,
}

/// A login entry. `detail` is the terminal for current users and the terminal or
/// login time for past ones, whichever the producer sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserEntry {
    pub name: String,
    pub detail: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SystemInfo {
    pub states: ProcessStates,
    pub current_users: Vec<UserEntry>,
    pub last_users: Vec<UserEntry>,
    pub uptime: String,
}

/// One fully normalized `stats` frame. Replaces the previous one wholesale.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub metrics: Metrics,
    pub processes: Vec<ProcessRow>,
    pub system_info: SystemInfo,
    pub log_tail: Vec<String>,
}
