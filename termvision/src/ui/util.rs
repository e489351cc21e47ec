//! Small UI helpers: gauge percentages and unit labels.

pub fn fmt_gb(v: f64) -> String {
    format!("{v:.1} GB")
}

pub fn fmt_pct(v: f64) -> String {
    format!("{v:.1}%")
}

/// Gauge fill from a ratio, clamped to 0..=100.
pub fn gauge_percent(ratio: f64) -> u16 {
    if !ratio.is_finite() {
        return 0;
    }
    (ratio * 100.0).round().clamp(0.0, 100.0) as u16
}
