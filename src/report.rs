//! `battmon report`: tables, a trend line and an optional chart for one window.

use crate::cli::ReportArgs;
use anyhow::Result;
use battmon_config::MonitorConfig;
use battmon_core::{
    aggregate_group, aggregate_samples_by_timestamp, average_rates, build_timeframe,
    estimate_runtime_hours, Sample, Timeframe,
};
use battmon_report::{
    bar_graph, battery_summary_table, bucket_span_seconds, bucket_stats_table,
    database_stats_table, default_graph_path, latest_event_table, recent_events_table,
    render_chart, sparkline, DatabaseStats,
};
use battmon_store::Store;
use chrono::{Local, Utc};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

const TREND_WIDTH: usize = 60;
const GRAPH_HEIGHT: usize = 9;

/// Hint printed when the store holds no rows at all.
pub const EMPTY_STORE_HINT: &str = "No records available; collect data first.";

pub fn run(args: &ReportArgs, config_path: &Path) -> Result<ExitCode> {
    Ok(if print_report(args, config_path)? {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Print every section; `false` when there was nothing to report.
fn print_report(args: &ReportArgs, config_path: &Path) -> Result<bool> {
    let config = battmon_config::load(config_path)?;
    let timeframe = resolve_timeframe(args, &config)?;
    let db_path = battmon_config::resolve_db_path(args.db_path.as_deref(), &config);
    let store = Store::open(&db_path)?;

    let records_total = store.count_samples(None)?;
    if records_total == 0 {
        println!("{EMPTY_STORE_HINT}");
        return Ok(false);
    }

    let raw = store.fetch_samples(timeframe.since_timestamp(Utc::now()))?;
    let events = aggregate_samples_by_timestamp(&raw);
    let Some(latest) = events.last() else {
        println!(
            "No records for {}; try a broader timeframe.",
            timeframe.display_label()
        );
        return Ok(false);
    };
    tracing::debug!(rows = raw.len(), events = events.len(), "loaded report window");

    if let Some(path) = chart_path(args, &config, &timeframe) {
        if render_chart(&events, &timeframe, &path)? {
            println!("Saved chart to {}", path.display());
        } else {
            println!("Skipping chart output; no data in timeframe.");
        }
    }

    let stats = DatabaseStats {
        db_path,
        records_total,
        events_total: store.count_events(None)?,
        records_in_window: raw.len(),
        events_in_window: events.len(),
        first_ts: store.fetch_first_event()?.first().map(|s| s.ts),
        latest_ts: store.fetch_latest_event()?.first().map(|s| s.ts),
        window_label: timeframe.display_label(),
    };
    let recent: Vec<Sample> = store
        .fetch_recent_events(config.report.recent_events)?
        .iter()
        .filter_map(|group| aggregate_group(group).ok())
        .collect();

    let refs: Vec<&Sample> = events.iter().collect();
    let rates = average_rates(&refs);
    let runtime = estimate_runtime_hours(rates.discharge_w, latest);
    let label = timeframe.display_label();

    println!("\nDatabase stats\n{}", database_stats_table(&stats));
    println!(
        "\nBattery summary ({label})\n{}",
        battery_summary_table(raw.len(), events.len(), rates, runtime)
    );
    println!("\nLatest event\n{}", latest_event_table(latest));
    println!("\nRecent events\n{}", recent_events_table(&recent));
    println!(
        "\nBattery stats ({label})\n{}",
        bucket_stats_table(&events, bucket_span_seconds(&timeframe))
    );

    let charge: Vec<f64> = events.iter().filter_map(|e| e.percentage).collect();
    if let Some(line) = sparkline(&charge, TREND_WIDTH) {
        println!("\nCharge trend\n{line}");
        println!("{}", bar_graph(&charge, GRAPH_HEIGHT, TREND_WIDTH));
    }

    Ok(true)
}

fn resolve_timeframe(args: &ReportArgs, config: &MonitorConfig) -> Result<Timeframe> {
    let hours = args.hours.unwrap_or(config.report.hours);
    Ok(build_timeframe(hours, args.days, args.months, args.all_time)?)
}

/// `--graph-path` wins; `--graph` names a file in the configured graph dir.
fn chart_path(args: &ReportArgs, config: &MonitorConfig, timeframe: &Timeframe) -> Option<PathBuf> {
    match (&args.graph_path, args.graph) {
        (Some(path), _) => Some(path.clone()),
        (None, true) => Some(default_graph_path(
            &timeframe.label,
            config.report.graph_dir.as_deref(),
            Local::now(),
        )),
        (None, false) => None,
    }
}
