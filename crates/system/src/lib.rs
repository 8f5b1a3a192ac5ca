//! Battery discovery and normalisation over the Linux power-supply class.

pub mod battery;

pub use battery::{find_battery_paths, read_battery, BatteryReading, DEFAULT_SYSFS_ROOT};

use battmon_core::Sample;
use std::path::Path;

/// Read every battery under `root` and stamp all readings with the same `ts`.
///
/// Returns an empty list on machines without a battery (desktop, VM).
pub fn collect_samples(root: &Path, ts: f64) -> Vec<Sample> {
    let paths = find_battery_paths(root);
    if paths.is_empty() {
        tracing::warn!("No batteries found under '{}'", root.display());
    }

    paths
        .iter()
        .map(|path| read_battery(path).into_sample(ts))
        .collect()
}
