use crate::bucket::{format_bucket, group_by_bucket};
use crate::format::{
    format_percent, format_power, format_runtime, format_short_time, format_timestamp, format_wh,
    level_glyph, MISSING,
};
use battmon_core::{average_rates, AverageRates, Sample};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use std::path::PathBuf;

/// Whole-store and in-window counts for the header table.
#[derive(Debug, Clone, PartialEq)]
pub struct DatabaseStats {
    pub db_path: PathBuf,
    pub records_total: usize,
    pub events_total: usize,
    pub records_in_window: usize,
    pub events_in_window: usize,
    pub first_ts: Option<f64>,
    pub latest_ts: Option<f64>,
    pub window_label: String,
}

fn themed_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

fn header(labels: &[&str]) -> Vec<Cell> {
    labels
        .iter()
        .map(|label| Cell::new(label).add_attribute(Attribute::Bold).fg(Color::Cyan))
        .collect()
}

fn label_cell(text: &str) -> Cell {
    Cell::new(text).add_attribute(Attribute::Bold)
}

fn value_cell(value: impl ToString) -> Cell {
    Cell::new(value.to_string()).set_alignment(CellAlignment::Right)
}

fn status_cell(text: &str) -> Cell {
    let color = match text.to_ascii_lowercase().as_str() {
        "charging" => Color::Green,
        "discharging" => Color::Yellow,
        "full" => Color::Blue,
        "mixed" => Color::Magenta,
        _ => Color::White,
    };
    Cell::new(text).fg(color)
}

fn key_value_table(rows: Vec<(&str, Cell)>) -> Table {
    let mut table = themed_table();
    table.set_header(header(&["Metric", "Value"]));
    for (label, value) in rows {
        table.add_row(vec![label_cell(label), value]);
    }
    table
}

pub fn database_stats_table(stats: &DatabaseStats) -> Table {
    let ts = |value: Option<f64>| value.map_or_else(|| MISSING.to_string(), format_timestamp);
    key_value_table(vec![
        ("Database", Cell::new(stats.db_path.display())),
        ("Records (all)", value_cell(stats.records_total)),
        ("Events (all)", value_cell(stats.events_total)),
        ("Records (window)", value_cell(stats.records_in_window)),
        ("Events (window)", value_cell(stats.events_in_window)),
        ("First record", Cell::new(ts(stats.first_ts))),
        ("Latest record", Cell::new(ts(stats.latest_ts))),
        ("Window", Cell::new(&stats.window_label)),
    ])
}

pub fn battery_summary_table(
    records_in_window: usize,
    events_in_window: usize,
    rates: AverageRates,
    runtime_hours: Option<f64>,
) -> Table {
    key_value_table(vec![
        ("Records in window", value_cell(records_in_window)),
        ("Events in window", value_cell(events_in_window)),
        ("Avg discharge power", value_cell(format_power(rates.discharge_w))),
        ("Avg charge power", value_cell(format_power(rates.charge_w))),
        ("Est runtime (full)", value_cell(format_runtime(runtime_hours))),
    ])
}

/// Detail view of one aggregated event.
pub fn latest_event_table(event: &Sample) -> Table {
    let charge = match event.percentage {
        Some(pct) => format!("{} {pct:.1}%", level_glyph(pct, event.status.as_deref())),
        None => MISSING.to_string(),
    };
    key_value_table(vec![
        ("When", Cell::new(format_timestamp(event.ts))),
        ("Charge", value_cell(charge)),
        ("Health", value_cell(format_percent(event.health_pct))),
        ("Capacity", value_cell(format_percent(event.capacity_pct))),
        ("Energy now (Wh)", value_cell(format_wh(event.energy_now_wh))),
        ("Energy full (Wh)", value_cell(format_wh(event.energy_full_wh))),
        ("Energy design (Wh)", value_cell(format_wh(event.energy_full_design_wh))),
        ("Status", status_cell(event.status_or_unknown())),
        ("Source", Cell::new(&event.source_path)),
    ])
}

/// One row per event, in the order given (callers pass newest first).
pub fn recent_events_table(events: &[Sample]) -> Table {
    let mut table = themed_table();
    table.set_header(header(&["When", "Charge", "Health", "Status", "Source"]));
    for event in events {
        table.add_row(vec![
            Cell::new(format_short_time(event.ts)),
            value_cell(format_percent(event.percentage)),
            value_cell(format_percent(event.health_pct)),
            status_cell(event.status_or_unknown()),
            Cell::new(&event.source_path),
        ]);
    }
    table
}

fn pct_stats(values: &[f64]) -> [String; 3] {
    if values.is_empty() {
        return [MISSING.to_string(), MISSING.to_string(), MISSING.to_string()];
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let avg = values.iter().sum::<f64>() / values.len() as f64;
    [min, avg, max].map(|v| format!("{v:.1}%"))
}

/// Per-bucket charge statistics and rates over aggregated events.
pub fn bucket_stats_table(events: &[Sample], span_secs: i64) -> Table {
    let mut table = themed_table();
    table.set_header(header(&[
        "Window",
        "Records",
        "Min %",
        "Avg %",
        "Max %",
        "Avg discharge W",
        "Avg charge W",
        "Latest status",
    ]));

    for (start, members) in group_by_bucket(events, span_secs) {
        let pct: Vec<f64> = members.iter().filter_map(|s| s.percentage).collect();
        let [min, avg, max] = pct_stats(&pct);
        let rates = average_rates(&members);
        let latest_status = members.last().map_or("unknown", |s| s.status_or_unknown());

        table.add_row(vec![
            Cell::new(format_bucket(start, span_secs))
                .fg(Color::Magenta)
                .add_attribute(Attribute::Bold),
            value_cell(members.len()),
            value_cell(min),
            value_cell(avg),
            value_cell(max),
            value_cell(format_power(rates.discharge_w)),
            value_cell(format_power(rates.charge_w)),
            status_cell(latest_status),
        ]);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(ts: f64, energy_now: f64, status: &str) -> Sample {
        Sample {
            percentage: Some(energy_now / 60.0 * 100.0),
            health_pct: Some(85.0),
            energy_now_wh: Some(energy_now),
            energy_full_wh: Some(60.0),
            energy_full_design_wh: Some(70.0),
            status: Some(status.to_string()),
            ..Sample::empty(ts, "BAT0+BAT1")
        }
    }

    #[test]
    fn summary_shows_rates_and_runtime() {
        let rates = AverageRates {
            discharge_w: Some(4.8),
            charge_w: None,
        };
        let rendered = battery_summary_table(3, 3, rates, Some(12.5)).to_string();

        assert!(rendered.contains("4.80W"));
        assert!(rendered.contains("12h30m"));
        assert!(rendered.contains("--"));
    }

    #[test]
    fn latest_event_lists_energies_and_source() {
        let rendered = latest_event_table(&event(0.0, 30.0, "Discharging")).to_string();

        assert!(rendered.contains("50.0%"));
        assert!(rendered.contains("30.00"));
        assert!(rendered.contains("Discharging"));
        assert!(rendered.contains("BAT0+BAT1"));
    }

    #[test]
    fn recent_events_one_row_each() {
        let events = vec![event(600.0, 59.0, "Discharging"), event(300.0, 59.5, "Discharging")];
        let table = recent_events_table(&events);
        assert_eq!(table.row_iter().count(), 2);
    }

    #[test]
    fn bucket_table_reports_rates_per_bucket() {
        let events = vec![
            event(0.0, 60.0, "Discharging"),
            event(300.0, 59.6, "Discharging"),
            event(600.0, 59.2, "Discharging"),
        ];
        let table = bucket_stats_table(&events, 7 * 24 * 3600);

        assert_eq!(table.row_iter().count(), 1);
        let rendered = table.to_string();
        assert!(rendered.contains("4.80W"));
        assert!(rendered.contains("Discharging"));
    }

    #[test]
    fn pct_stats_handles_empty_input() {
        assert_eq!(pct_stats(&[]), ["--", "--", "--"]);
        assert_eq!(pct_stats(&[40.0, 60.0]), ["40.0%", "50.0%", "60.0%"]);
    }
}
