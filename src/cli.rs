use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "battmon",
    version,
    about = "Record laptop battery readings and report charge, health and power draw"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: $XDG_CONFIG_HOME/battmon/battmon.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Take one reading of every battery (or keep going with --interval/--loop)
    Collect(CollectArgs),
    /// Summarise a time window (optionally save an SVG chart)
    Report(ReportArgs),
}

#[derive(Args, Debug, Clone, Default)]
pub struct CollectArgs {
    /// SQLite database path (or set BATTERY_MONITOR_DB)
    #[arg(long = "db")]
    pub db_path: Option<PathBuf>,

    /// Collect every SECS seconds until interrupted
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: Option<u64>,

    /// Keep collecting at the configured interval
    #[arg(long = "loop")]
    pub run_loop: bool,

    /// Power-supply directory to scan
    #[arg(long)]
    pub sysfs_root: Option<PathBuf>,
}

impl CollectArgs {
    pub fn is_looping(&self) -> bool {
        self.run_loop || self.interval.is_some()
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct ReportArgs {
    /// Window in hours, used when days and months are zero (default from config)
    #[arg(long)]
    pub hours: Option<u32>,

    /// Window in days; overrides hours when non-zero
    #[arg(long, default_value_t = 0)]
    pub days: u32,

    /// Window in 30-day months; overrides days and hours when non-zero
    #[arg(long, default_value_t = 0)]
    pub months: u32,

    /// Use the entire history
    #[arg(long = "all")]
    pub all_time: bool,

    /// SQLite database path (or set BATTERY_MONITOR_DB)
    #[arg(long = "db")]
    pub db_path: Option<PathBuf>,

    /// Save an SVG chart with an auto-generated name
    #[arg(long, short = 'g')]
    pub graph: bool,

    /// Save the SVG chart to this path instead
    #[arg(long)]
    pub graph_path: Option<PathBuf>,
}
