//! `battmon collect`: one reading per battery per tick, all sharing one clock read.

use crate::cli::CollectArgs;
use anyhow::{Context, Result};
use battmon_config::{ConfigWatcher, MonitorConfig};
use battmon_store::Store;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{info, warn};

/// Loop settings that may change when the config file is edited.
#[derive(Debug, Clone, PartialEq)]
struct Settings {
    interval: Duration,
    sysfs_root: PathBuf,
}

impl Settings {
    /// CLI flags win over the config file.
    fn resolve(args: &CollectArgs, config: &MonitorConfig) -> Self {
        let secs = args.interval.unwrap_or(config.interval_secs).max(1);
        Self {
            interval: Duration::from_secs(secs),
            sysfs_root: args
                .sysfs_root
                .clone()
                .unwrap_or_else(|| config.sysfs_root.clone()),
        }
    }
}

fn now_ts() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}

/// Read every battery under `sysfs_root` once and append the readings.
///
/// Returns the number of rows written; zero on a machine without batteries.
pub fn collect_once(store: &Store, sysfs_root: &Path) -> Result<usize> {
    let samples = battmon_system::collect_samples(sysfs_root, now_ts());
    store.insert_samples(&samples)?;

    for sample in &samples {
        info!(
            "Logged record for {}: percent={:.2} health={:.2}",
            sample.device_name(),
            sample.percentage.unwrap_or(0.0),
            sample.health_pct.unwrap_or(0.0)
        );
    }
    Ok(samples.len())
}

pub fn run(args: &CollectArgs, config_path: &Path) -> Result<()> {
    let config = battmon_config::load(config_path)?;
    let db_path = battmon_config::resolve_db_path(args.db_path.as_deref(), &config);
    let store = Store::open(&db_path)?;
    let settings = Settings::resolve(args, &config);

    if !args.is_looping() {
        collect_once(&store, &settings.sysfs_root)?;
        return Ok(());
    }

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start the collection runtime")?;
    runtime.block_on(collect_loop(store, args, config_path, settings));
    Ok(())
}

async fn collect_loop(store: Store, args: &CollectArgs, config_path: &Path, mut settings: Settings) {
    let (_watcher, mut changes) = ConfigWatcher::spawn(config_path);
    let mut ticker = schedule(Instant::now(), settings.interval);

    info!(
        "Collecting every {}s into {}; Ctrl-C to stop",
        settings.interval.as_secs(),
        store.path().display()
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(e) = collect_once(&store, &settings.sysfs_root) {
                    warn!("Collection failed: {e:#}");
                }
            }
            Some(()) = changes.recv() => {
                let next = match battmon_config::load(config_path) {
                    Ok(config) => Settings::resolve(args, &config),
                    Err(e) => {
                        warn!("Keeping previous settings: {e}");
                        continue;
                    }
                };
                if next.interval != settings.interval {
                    ticker = ticker_after(next.interval);
                }
                if next != settings {
                    info!(
                        "Config reloaded: interval={}s sysfs_root={}",
                        next.interval.as_secs(),
                        next.sysfs_root.display()
                    );
                }
                settings = next;
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted; stopping collection");
                break;
            }
        }
    }
}

fn schedule(start: Instant, period: Duration) -> time::Interval {
    let mut interval = time::interval_at(start, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

/// New schedule whose first tick is one full period away.
fn ticker_after(period: Duration) -> time::Interval {
    schedule(Instant::now() + period, period)
}
