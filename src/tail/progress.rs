use super::types::PROGRESS_INTERVAL;
use std::time::{Duration, Instant};

const UNITS: [&str; 4] = ["bytes", "Kb", "Mb", "Gb"];

/// Scales a byte count for display.
///
/// Each step divides by 1024 with truncation once the value exceeds 1024,
/// up to gigabytes.
pub fn scale_bytes(total: u64) -> (u64, &'static str) {
    let mut value = total;
    let mut unit = 0;
    while value > 1024 && unit < UNITS.len() - 1 {
        value /= 1024;
        unit += 1;
    }
    (value, UNITS[unit])
}

/// Single status line, prefixed with `\r` so each report overwrites the last.
pub fn render_status(total: u64, elapsed: Duration) -> String {
    let (value, unit) = scale_bytes(total);
    let rate = value as f64 / elapsed.as_secs_f64();
    format!("\r{value} {unit} read, {rate:6.2} {unit}/s          ")
}

/// Per-run timing state for progress reports.
pub struct ProgressMeter {
    started: Instant,
    last_report: Instant,
    reports: u64,
}

impl ProgressMeter {
    pub fn new(now: Instant) -> Self {
        Self {
            started: now,
            last_report: now,
            reports: 0,
        }
    }

    /// Returns a status line if at least [`PROGRESS_INTERVAL`] has passed
    /// since the previous one.
    pub fn tick(&mut self, now: Instant, total: u64) -> Option<String> {
        if now.saturating_duration_since(self.last_report) < PROGRESS_INTERVAL {
            return None;
        }
        self.last_report = now;
        self.reports += 1;
        Some(render_status(total, now.duration_since(self.started)))
    }

    pub fn has_reported(&self) -> bool {
        self.reports > 0
    }
}
