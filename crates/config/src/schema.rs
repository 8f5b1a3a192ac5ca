use battmon_system::DEFAULT_SYSFS_ROOT;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure parsed from `battmon.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Database file. Overridden by `--db` and `BATTERY_MONITOR_DB`.
    pub db_path: Option<PathBuf>,
    /// Directory scanned for `BAT*` power supplies.
    pub sysfs_root: PathBuf,
    /// Seconds between collection ticks when looping.
    pub interval_secs: u64,
    pub report: ReportConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            sysfs_root: PathBuf::from(DEFAULT_SYSFS_ROOT),
            interval_secs: 60,
            report: ReportConfig::default(),
        }
    }
}

/// Defaults for `battmon report`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Window used when no `--hours/--days/--months/--all` flag is given.
    pub hours: u32,
    /// Rows in the "recent events" table.
    pub recent_events: usize,
    /// Where `--graph` writes charts when `--graph-path` is absent.
    pub graph_dir: Option<PathBuf>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            hours: 6,
            recent_events: 5,
            graph_dir: None,
        }
    }
}
