pub mod schema;
pub mod watcher;

pub use schema::{MonitorConfig, ReportConfig};
pub use watcher::ConfigWatcher;

use battmon_core::{BatteryError, Result};
use std::path::{Path, PathBuf};

/// Environment variable that overrides the configured database path.
pub const DB_ENV_VAR: &str = "BATTERY_MONITOR_DB";

/// Load configuration from a TOML file.  Returns `MonitorConfig::default()` if
/// the file doesn't exist so collection works without any setup.
pub fn load(path: impl AsRef<Path>) -> Result<MonitorConfig> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::warn!(
            "Config file not found at '{}'; using defaults.",
            path.display()
        );
        return Ok(MonitorConfig::default());
    }

    let raw = std::fs::read_to_string(path)
        .map_err(|e| BatteryError::Config(format!("cannot read '{}': {e}", path.display())))?;

    parse(&raw)
}

/// Parse configuration text.
pub fn parse(raw: &str) -> Result<MonitorConfig> {
    toml::from_str(raw).map_err(|e| BatteryError::Config(format!("TOML parse error: {e}")))
}

/// Return the default config path, honouring `$XDG_CONFIG_HOME`.
pub fn default_path() -> PathBuf {
    xdg_dir("XDG_CONFIG_HOME", ".config")
        .join("battmon")
        .join("battmon.toml")
}

/// Return the default database path, honouring `$XDG_DATA_HOME`.
pub fn default_db_path() -> PathBuf {
    xdg_dir("XDG_DATA_HOME", ".local/share")
        .join("battmon")
        .join("battery.db")
}

/// Pick the database path: CLI flag, then `BATTERY_MONITOR_DB`, then the
/// config file, then the XDG data directory.
pub fn resolve_db_path(cli: Option<&Path>, config: &MonitorConfig) -> PathBuf {
    let from_env = std::env::var(DB_ENV_VAR).ok().filter(|v| !v.is_empty());
    pick_db_path(cli, from_env.as_deref(), config)
}

fn pick_db_path(cli: Option<&Path>, from_env: Option<&str>, config: &MonitorConfig) -> PathBuf {
    if let Some(path) = cli {
        return path.to_path_buf();
    }
    if let Some(raw) = from_env {
        return expand_home(raw);
    }
    config.db_path.clone().unwrap_or_else(default_db_path)
}

/// Expand a leading `~/` to `$HOME`.
pub fn expand_home(raw: &str) -> PathBuf {
    match (raw.strip_prefix("~/"), std::env::var("HOME")) {
        (Some(rest), Ok(home)) => PathBuf::from(home).join(rest),
        _ => PathBuf::from(raw),
    }
}

fn xdg_dir(var: &str, fallback: &str) -> PathBuf {
    std::env::var(var)
        .ok()
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(fallback)
        })
}
