//! Event aggregation: one logical sample per collection tick.
//!
//! Each tick writes one [`Sample`] per battery, all sharing a single clock
//! read. Reporting works on "events" instead: every device sample with the
//! same timestamp is merged into one, with energies summed and percentages
//! recomputed from those sums.

use crate::{BatteryError, Result, Sample};
use std::collections::BTreeSet;

/// Status written when the merged devices disagree.
pub const MIXED_STATUS: &str = "mixed";

/// Merge a collection of device samples into one sample per distinct
/// timestamp, ascending by timestamp.
///
/// Timestamps are compared bit-for-bit; no tolerance is applied.
pub fn aggregate_samples_by_timestamp(samples: &[Sample]) -> Vec<Sample> {
    let mut ordered: Vec<&Sample> = samples.iter().collect();
    ordered.sort_by(|a, b| a.ts.total_cmp(&b.ts));

    ordered
        .chunk_by(|a, b| a.ts.to_bits() == b.ts.to_bits())
        // chunk_by never yields an empty slice, so the reducer cannot fail here.
        .filter_map(|group| aggregate_group(group.iter().copied()).ok())
        .collect()
}

/// Reduce samples that share one timestamp into a single sample.
///
/// Fails with [`BatteryError::EmptyGroup`] when `samples` is empty.
pub fn aggregate_group<'a, I>(samples: I) -> Result<Sample>
where
    I: IntoIterator<Item = &'a Sample>,
{
    let group: Vec<&Sample> = samples.into_iter().collect();
    let first = group.first().ok_or(BatteryError::EmptyGroup)?;

    let energy_now_wh = sum_present(group.iter().map(|s| s.energy_now_wh));
    let energy_full_wh = sum_present(group.iter().map(|s| s.energy_full_wh));
    let energy_full_design_wh = sum_present(group.iter().map(|s| s.energy_full_design_wh));
    let capacity_pct = mean_present(group.iter().map(|s| s.capacity_pct));

    let percentage = percent(energy_now_wh, energy_full_wh)
        .or_else(|| mean_present(group.iter().map(|s| s.percentage)));
    let health_pct = percent(energy_full_wh, energy_full_design_wh)
        .or_else(|| mean_present(group.iter().map(|s| s.health_pct)));

    Ok(Sample {
        ts: first.ts,
        percentage,
        capacity_pct,
        health_pct,
        energy_now_wh,
        energy_full_wh,
        energy_full_design_wh,
        status: merge_status(&group),
        source_path: combined_source(&group),
    })
}

fn sum_present(values: impl Iterator<Item = Option<f64>>) -> Option<f64> {
    values.flatten().fold(None, |acc, v| Some(acc.unwrap_or(0.0) + v))
}

fn mean_present(values: impl Iterator<Item = Option<f64>>) -> Option<f64> {
    let (total, count) = values
        .flatten()
        .fold((0.0, 0u32), |(total, count), v| (total + v, count + 1));
    (count > 0).then(|| total / f64::from(count))
}

fn percent(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    match (numerator, denominator) {
        (Some(num), Some(den)) if den != 0.0 => Some(num / den * 100.0),
        _ => None,
    }
}

fn merge_status(group: &[&Sample]) -> Option<String> {
    let statuses: BTreeSet<&str> = group
        .iter()
        .filter_map(|s| s.status.as_deref())
        .filter(|s| !s.is_empty())
        .collect();

    match statuses.len() {
        0 => None,
        1 => statuses.first().map(|s| (*s).to_string()),
        _ => Some(MIXED_STATUS.to_string()),
    }
}

fn combined_source(group: &[&Sample]) -> String {
    let names: BTreeSet<&str> = group.iter().map(|s| s.device_name()).collect();
    names.into_iter().collect::<Vec<_>>().join("+")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(
        ts: f64,
        name: &str,
        energy: (f64, f64, f64),
        capacity: f64,
        status: &str,
    ) -> Sample {
        let (now, full, design) = energy;
        Sample {
            ts,
            percentage: Some(now / full * 100.0),
            capacity_pct: Some(capacity),
            health_pct: Some(full / design * 100.0),
            energy_now_wh: Some(now),
            energy_full_wh: Some(full),
            energy_full_design_wh: Some(design),
            status: Some(status.to_string()),
            source_path: format!("/sys/class/power_supply/{name}"),
        }
    }

    #[test]
    fn combines_two_batteries_into_one_event() {
        let samples = vec![
            device(1.0, "BAT0", (10.0, 20.0, 25.0), 90.0, "Discharging"),
            device(1.0, "BAT1", (5.0, 10.0, 15.0), 95.0, "Charging"),
        ];

        let merged = aggregate_group(&samples).unwrap();

        assert_eq!(merged.ts, 1.0);
        assert_eq!(merged.energy_now_wh, Some(15.0));
        assert_eq!(merged.energy_full_wh, Some(30.0));
        assert_eq!(merged.energy_full_design_wh, Some(40.0));
        assert!((merged.percentage.unwrap() - 50.0).abs() < 1e-9);
        assert!((merged.health_pct.unwrap() - 75.0).abs() < 1e-9);
        assert_eq!(merged.capacity_pct, Some(92.5));
        assert_eq!(merged.status.as_deref(), Some(MIXED_STATUS));
        assert_eq!(merged.source_path, "BAT0+BAT1");
    }

    #[test]
    fn empty_group_is_rejected() {
        let none: Vec<Sample> = Vec::new();
        assert!(matches!(aggregate_group(&none), Err(BatteryError::EmptyGroup)));
    }

    #[test]
    fn groups_by_timestamp_in_ascending_order() {
        let samples = vec![
            device(2.0, "BAT0", (2.0, 4.0, 6.0), 90.0, "Discharging"),
            device(1.0, "BAT0", (1.0, 2.0, 3.0), 90.0, "Discharging"),
            device(1.0, "BAT1", (0.5, 1.0, 1.5), 90.0, "Discharging"),
        ];

        let events = aggregate_samples_by_timestamp(&samples);

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].ts, 1.0);
        assert_eq!(events[0].energy_now_wh, Some(1.5));
        assert_eq!(events[0].source_path, "BAT0+BAT1");
        assert_eq!(events[1].ts, 2.0);
        assert_eq!(events[1].energy_now_wh, Some(2.0));
        assert_eq!(events[1].source_path, "BAT0");
    }

    #[test]
    fn every_distinct_timestamp_yields_one_event() {
        let timestamps = [5.5, 1.25, 5.5, 3.0, 1.25, 9.0, 3.0];
        let samples: Vec<Sample> = timestamps
            .iter()
            .enumerate()
            .map(|(i, ts)| Sample::empty(*ts, format!("BAT{i}")))
            .collect();

        let events = aggregate_samples_by_timestamp(&samples);
        let event_ts: Vec<f64> = events.iter().map(|e| e.ts).collect();

        assert_eq!(event_ts, vec![1.25, 3.0, 5.5, 9.0]);
    }

    #[test]
    fn empty_input_yields_no_events() {
        assert!(aggregate_samples_by_timestamp(&[]).is_empty());
    }

    #[test]
    fn energy_sum_is_exact() {
        let samples: Vec<Sample> = [12.25, 30.5, 7.125]
            .iter()
            .enumerate()
            .map(|(i, e)| Sample {
                energy_now_wh: Some(*e),
                ..Sample::empty(10.0, format!("BAT{i}"))
            })
            .collect();

        let merged = aggregate_group(&samples).unwrap();
        assert_eq!(merged.energy_now_wh, Some(12.25 + 30.5 + 7.125));
    }

    #[test]
    fn all_absent_fields_stay_absent() {
        let samples = vec![Sample::empty(3.0, "BAT0"), Sample::empty(3.0, "BAT1")];

        let merged = aggregate_group(&samples).unwrap();

        assert_eq!(merged.energy_now_wh, None);
        assert_eq!(merged.energy_full_wh, None);
        assert_eq!(merged.energy_full_design_wh, None);
        assert_eq!(merged.capacity_pct, None);
        assert_eq!(merged.percentage, None);
        assert_eq!(merged.health_pct, None);
        assert_eq!(merged.status, None);
    }

    #[test]
    fn zero_denominator_falls_back_to_input_means() {
        let samples = vec![
            Sample {
                percentage: Some(40.0),
                health_pct: Some(80.0),
                energy_now_wh: Some(0.0),
                energy_full_wh: Some(0.0),
                energy_full_design_wh: Some(0.0),
                ..Sample::empty(4.0, "BAT0")
            },
            Sample {
                percentage: Some(60.0),
                health_pct: Some(90.0),
                ..Sample::empty(4.0, "BAT1")
            },
        ];

        let merged = aggregate_group(&samples).unwrap();

        assert_eq!(merged.percentage, Some(50.0));
        assert_eq!(merged.health_pct, Some(85.0));
    }

    #[test]
    fn identical_statuses_are_kept() {
        let samples = vec![
            device(1.0, "BAT0", (10.0, 20.0, 25.0), 90.0, "Full"),
            device(1.0, "BAT1", (5.0, 10.0, 15.0), 95.0, "Full"),
            Sample::empty(1.0, "BAT2"),
        ];

        let merged = aggregate_group(&samples).unwrap();
        assert_eq!(merged.status.as_deref(), Some("Full"));
    }

    #[test]
    fn empty_status_is_ignored_when_merging() {
        let samples = vec![
            Sample {
                status: Some(String::new()),
                ..Sample::empty(1.0, "BAT0")
            },
            Sample {
                status: Some("Charging".to_string()),
                ..Sample::empty(1.0, "BAT1")
            },
        ];
        assert_eq!(aggregate_group(&samples).unwrap().status.as_deref(), Some("Charging"));

        let only_empty = vec![Sample {
            status: Some(String::new()),
            ..Sample::empty(1.0, "BAT0")
        }];
        assert_eq!(aggregate_group(&only_empty).unwrap().status, None);
    }

    #[test]
    fn source_path_is_order_independent() {
        let forward = vec![Sample::empty(1.0, "BAT1"), Sample::empty(1.0, "BAT0")];
        let backward = vec![Sample::empty(1.0, "BAT0"), Sample::empty(1.0, "BAT1")];

        assert_eq!(aggregate_group(&forward).unwrap().source_path, "BAT0+BAT1");
        assert_eq!(aggregate_group(&backward).unwrap().source_path, "BAT0+BAT1");
    }

    #[test]
    fn duplicate_devices_are_named_once() {
        let samples = vec![
            Sample::empty(1.0, "/sys/class/power_supply/BAT0"),
            Sample::empty(1.0, "BAT0"),
        ];
        assert_eq!(aggregate_group(&samples).unwrap().source_path, "BAT0");
    }

    #[test]
    fn single_sample_group_is_identity() {
        let only = device(7.0, "BAT0", (30.0, 60.0, 80.0), 50.0, "Discharging");

        let merged = aggregate_group(std::slice::from_ref(&only)).unwrap();

        assert_eq!(merged.energy_now_wh, only.energy_now_wh);
        assert_eq!(merged.energy_full_wh, only.energy_full_wh);
        assert_eq!(merged.energy_full_design_wh, only.energy_full_design_wh);
        assert_eq!(merged.capacity_pct, only.capacity_pct);
        assert_eq!(merged.percentage, only.percentage);
        assert_eq!(merged.health_pct, only.health_pct);
        assert_eq!(merged.status, only.status);
        assert_eq!(merged.source_path, "BAT0");
    }
}
