use crate::{BatteryError, Result};
use chrono::{DateTime, Utc};

const SECONDS_PER_HOUR: u64 = 3600;
const SECONDS_PER_DAY: u64 = 24 * SECONDS_PER_HOUR;
const DAYS_PER_MONTH: u64 = 30;

/// A reporting window ending "now".
#[derive(Debug, Clone, PartialEq)]
pub struct Timeframe {
    /// Machine label such as `last_6_hours` or `all`.
    pub label: String,
    /// Window length, `None` for the whole history.
    pub seconds: Option<u64>,
}

impl Timeframe {
    /// Cutoff timestamp for this window relative to `now`, `None` when unbounded.
    pub fn since_timestamp(&self, now: DateTime<Utc>) -> Option<f64> {
        let seconds = self.seconds?;
        let now_secs = now.timestamp_micros() as f64 / 1_000_000.0;
        Some(now_secs - seconds as f64)
    }

    /// Human label, `last 6 hours`.
    pub fn display_label(&self) -> String {
        self.label.replace('_', " ")
    }

    pub fn is_unbounded(&self) -> bool {
        self.seconds.is_none()
    }
}

/// Resolve a window from CLI-style units.
///
/// `all_time` wins over everything, then months (30 days each), then days,
/// then hours. Hours must be at least one when the larger units are zero.
pub fn build_timeframe(hours: u32, days: u32, months: u32, all_time: bool) -> Result<Timeframe> {
    if all_time {
        return Ok(Timeframe {
            label: "all".to_string(),
            seconds: None,
        });
    }

    let (count, unit, unit_seconds) = if months > 0 {
        (months, "month", DAYS_PER_MONTH * SECONDS_PER_DAY)
    } else if days > 0 {
        (days, "day", SECONDS_PER_DAY)
    } else if hours > 0 {
        (hours, "hour", SECONDS_PER_HOUR)
    } else {
        return Err(BatteryError::InvalidTimeframe(
            "hours must be at least 1 when days and months are zero".into(),
        ));
    };

    let plural = if count == 1 { "" } else { "s" };
    Ok(Timeframe {
        label: format!("last_{count}_{unit}{plural}"),
        seconds: Some(u64::from(count) * unit_seconds),
    })
}
