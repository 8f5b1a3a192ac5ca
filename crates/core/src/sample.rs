use std::path::Path;

/// A point-in-time battery measurement.
///
/// Produced once per device per collection tick by the sysfs reader, or
/// synthesized by [`crate::aggregate_group`] for one timestamp across all
/// devices. Every numeric field is independently optional; absence is never
/// encoded as zero.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Seconds since the Unix epoch. Samples from one tick share this value.
    pub ts: f64,
    /// Charge level (0 – 100), derived from energy now / energy full.
    pub percentage: Option<f64>,
    /// Charge level as reported by the firmware `capacity` attribute.
    pub capacity_pct: Option<f64>,
    /// Full-charge energy relative to the design energy, as a percent.
    pub health_pct: Option<f64>,
    pub energy_now_wh: Option<f64>,
    pub energy_full_wh: Option<f64>,
    pub energy_full_design_wh: Option<f64>,
    /// Kernel charge state (`Charging`, `Discharging`, `Full`, ...) or
    /// `mixed` once merged from disagreeing devices.
    pub status: Option<String>,
    /// Device path, or `BAT0+BAT1` style names once aggregated.
    pub source_path: String,
}

impl Sample {
    /// A sample carrying only a timestamp and origin; every reading absent.
    pub fn empty(ts: f64, source_path: impl Into<String>) -> Self {
        Self {
            ts,
            percentage: None,
            capacity_pct: None,
            health_pct: None,
            energy_now_wh: None,
            energy_full_wh: None,
            energy_full_design_wh: None,
            status: None,
            source_path: source_path.into(),
        }
    }

    /// Last path segment of `source_path` (`/sys/class/power_supply/BAT0` → `BAT0`).
    pub fn device_name(&self) -> &str {
        Path::new(&self.source_path)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or(&self.source_path)
    }

    /// Status text for display, `unknown` when the device did not report one.
    pub fn status_or_unknown(&self) -> &str {
        self.status
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or("unknown")
    }
}
