//! Fixed-width time buckets for the per-window stats table.

use battmon_core::{Sample, Timeframe};
use chrono::{DateTime, Local, TimeZone, Utc};
use std::collections::BTreeMap;

const MINUTE: i64 = 60;
const HOUR: i64 = 60 * MINUTE;
const DAY: i64 = 24 * HOUR;

/// Bucket width for a report window: coarser buckets for longer windows.
pub fn bucket_span_seconds(timeframe: &Timeframe) -> i64 {
    let Some(window) = timeframe.seconds.and_then(|s| i64::try_from(s).ok()) else {
        return 7 * DAY;
    };
    match window {
        w if w <= 6 * HOUR => 20 * MINUTE,
        w if w <= DAY => HOUR,
        w if w <= 3 * DAY => 2 * HOUR,
        w if w <= 7 * DAY => 6 * HOUR,
        w if w <= 30 * DAY => DAY,
        w if w <= 90 * DAY => 3 * DAY,
        _ => 7 * DAY,
    }
}

/// Start of the bucket containing `ts`, aligned to local wall-clock boundaries.
pub fn bucket_start(ts: f64, span_secs: i64) -> DateTime<Local> {
    let utc = DateTime::from_timestamp(ts.floor() as i64, 0).unwrap_or_default();
    let offset = f64::from(
        Local
            .offset_from_utc_datetime(&utc.naive_utc())
            .local_minus_utc(),
    );
    let span = span_secs.max(1) as f64;
    let aligned = (((ts + offset) / span).floor() * span - offset).max(0.0);

    DateTime::<Utc>::from_timestamp(aligned as i64, 0)
        .unwrap_or_default()
        .with_timezone(&Local)
}

/// Group events by bucket start, buckets and events both in time order.
pub fn group_by_bucket(events: &[Sample], span_secs: i64) -> BTreeMap<DateTime<Local>, Vec<&Sample>> {
    let mut buckets: BTreeMap<DateTime<Local>, Vec<&Sample>> = BTreeMap::new();
    for event in events {
        buckets
            .entry(bucket_start(event.ts, span_secs))
            .or_default()
            .push(event);
    }
    for members in buckets.values_mut() {
        members.sort_by(|a, b| a.ts.total_cmp(&b.ts));
    }
    buckets
}

/// Row label for a bucket, precise enough for its width.
pub fn format_bucket(start: DateTime<Local>, span_secs: i64) -> String {
    if span_secs < HOUR {
        start.format("%m-%d %H:%M").to_string()
    } else if span_secs < DAY {
        start.format("%m-%d %H:00").to_string()
    } else if span_secs == DAY {
        start.format("%Y-%m-%d").to_string()
    } else {
        format!("{} (+{}d)", start.format("%Y-%m-%d"), span_secs / DAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use battmon_core::build_timeframe;
    use chrono::Timelike;

    #[test]
    fn span_grows_with_window() {
        let span = |h, d, m, all| bucket_span_seconds(&build_timeframe(h, d, m, all).unwrap());

        assert_eq!(span(6, 0, 0, false), 20 * 60);
        assert_eq!(span(7, 0, 0, false), 3600);
        assert_eq!(span(0, 1, 0, false), 3600);
        assert_eq!(span(0, 3, 0, false), 2 * 3600);
        assert_eq!(span(0, 7, 0, false), 6 * 3600);
        assert_eq!(span(0, 0, 1, false), 24 * 3600);
        assert_eq!(span(0, 0, 3, false), 3 * 24 * 3600);
        assert_eq!(span(0, 0, 4, false), 7 * 24 * 3600);
        assert_eq!(span(0, 0, 0, true), 7 * 24 * 3600);
    }

    #[test]
    fn buckets_align_to_local_boundaries() {
        let ts = 1_700_000_000.0 + 37.0 * 60.0 + 42.0;

        let twenty = bucket_start(ts, 20 * 60);
        assert_eq!(twenty.minute() % 20, 0);
        assert_eq!(twenty.second(), 0);
        let start = twenty.timestamp() as f64;
        assert!(start <= ts && ts < start + 1200.0);

        let hour = bucket_start(ts, 3600);
        assert_eq!(hour.minute(), 0);
        assert_eq!(hour.second(), 0);
    }

    #[test]
    fn events_are_grouped_per_bucket() {
        let base = bucket_start(1_700_000_000.0, 3600).timestamp() as f64;
        let events = vec![
            Sample::empty(base + 10.0, "BAT0"),
            Sample::empty(base + 3700.0, "BAT0"),
            Sample::empty(base + 5.0, "BAT0"),
        ];

        let buckets = group_by_bucket(&events, 3600);

        assert_eq!(buckets.len(), 2);
        let first: Vec<f64> = buckets.values().next().unwrap().iter().map(|s| s.ts).collect();
        assert_eq!(first, vec![base + 5.0, base + 10.0]);
    }
}
