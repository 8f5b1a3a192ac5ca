//! SVG chart of charge and health over a report window.

use battmon_core::{BatteryError, Result, Sample, Timeframe};
use chrono::{DateTime, Local};
use plotters::prelude::*;
use std::borrow::Cow;
use std::path::{Path, PathBuf};

const SIZE: (u32, u32) = (1280, 520);
const SECS_PER_HOUR: f64 = 3600.0;

/// Draw charge % and health % of `events` against local time into an SVG at `path`.
///
/// Returns `false` (and writes nothing) when no event carries either value.
pub fn render_chart(events: &[Sample], timeframe: &Timeframe, path: &Path) -> Result<bool> {
    let Some(origin) = events.iter().map(|e| e.ts).min_by(f64::total_cmp) else {
        tracing::warn!("No values available to plot");
        return Ok(false);
    };
    let series = |value: fn(&Sample) -> Option<f64>| -> Vec<(f64, f64)> {
        events
            .iter()
            .filter_map(|e| Some(((e.ts - origin) / SECS_PER_HOUR, value(e)?)))
            .collect()
    };
    let charge = series(|e| e.percentage);
    let health = series(|e| e.health_pct);
    if charge.is_empty() && health.is_empty() {
        tracing::warn!("No values available to plot");
        return Ok(false);
    }

    let (x_range, y_range) = axis_ranges(charge.iter().chain(&health));
    let time_label = |hours: &f64| clock_label(origin + hours * SECS_PER_HOUR);

    let root = SVGBackend::new(path, SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(
            format!("Battery ({})", timeframe.display_label()),
            ("sans-serif", 20).into_font(),
        )
        .margin(12)
        .x_label_area_size(36)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, y_range)
        .map_err(chart_err)?;

    chart
        .configure_mesh()
        .x_labels(6)
        .y_labels(6)
        .x_desc("Time")
        .y_desc("Percent")
        .x_label_formatter(&time_label)
        .draw()
        .map_err(chart_err)?;

    for (label, points, color) in [("Charge %", charge, BLUE), ("Health %", health, RED)] {
        if points.is_empty() {
            continue;
        }
        chart
            .draw_series(LineSeries::new(points, &color))
            .map_err(chart_err)?
            .label(label)
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 12, y)], color));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(chart_err)?;

    root.present().map_err(chart_err)?;
    tracing::info!("Saved chart to {}", path.display());
    Ok(true)
}

fn axis_ranges<'a>(
    points: impl Iterator<Item = &'a (f64, f64)>,
) -> (std::ops::Range<f64>, std::ops::Range<f64>) {
    let (mut x_max, mut y_min, mut y_max) = (0.0_f64, f64::INFINITY, f64::NEG_INFINITY);
    for (x, y) in points {
        x_max = x_max.max(*x);
        y_min = y_min.min(*y);
        y_max = y_max.max(*y);
    }
    if x_max <= 0.0 {
        x_max = 1.0;
    }
    if (y_max - y_min).abs() < 1e-6 {
        y_min -= 1.0;
        y_max += 1.0;
    }
    let pad = (y_max - y_min) * 0.05;
    (0.0..x_max, (y_min - pad)..(y_max + pad))
}

fn clock_label(ts: f64) -> String {
    DateTime::from_timestamp(ts.round() as i64, 0)
        .map(|utc| utc.with_timezone(&Local).format("%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

fn chart_err(e: impl std::fmt::Display) -> BatteryError {
    BatteryError::Chart(e.to_string())
}

fn sanitize(value: &str) -> Cow<'_, str> {
    let keep = |ch: char| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_';
    if value.chars().all(keep) {
        Cow::Borrowed(value)
    } else {
        Cow::Owned(value.chars().map(|ch| if keep(ch) { ch } else { '_' }).collect())
    }
}

/// `<dir>/battmon_<label>_<YYYY-MM-DD_HH-MM-SS>_<TZ>.svg`; `dir` defaults to the
/// working directory.
pub fn default_graph_path(label: &str, dir: Option<&Path>, now: DateTime<Local>) -> PathBuf {
    let tz = now.format("%Z").to_string();
    let file = format!(
        "battmon_{}_{}_{}.svg",
        sanitize(&label.replace('-', "_")),
        now.format("%Y-%m-%d_%H-%M-%S"),
        sanitize(&tz),
    );
    let dir = dir
        .map(Path::to_path_buf)
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));
    dir.join(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use battmon_core::build_timeframe;
    use chrono::TimeZone;

    fn event(ts: f64, pct: Option<f64>, health: Option<f64>) -> Sample {
        Sample {
            percentage: pct,
            health_pct: health,
            ..Sample::empty(ts, "BAT0")
        }
    }

    #[test]
    fn graph_path_has_label_timestamp_and_zone() {
        let now = Local.with_ymd_and_hms(2025, 11, 28, 1, 30, 42).unwrap();
        let path = default_graph_path("last_3_hours", Some(Path::new("/tmp")), now);

        let tz = now.format("%Z").to_string();
        let expected = format!(
            "/tmp/battmon_last_3_hours_2025-11-28_01-30-42_{}.svg",
            sanitize(&tz)
        );
        assert_eq!(path, PathBuf::from(expected));
    }

    #[test]
    fn zone_labels_are_sanitized() {
        assert_eq!(sanitize("+05:30"), "_05_30");
        assert_eq!(sanitize("CET"), "CET");
    }

    #[test]
    fn writes_svg_chart() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("chart.svg");
        let timeframe = build_timeframe(6, 0, 0, false).unwrap();
        let events = vec![
            event(1_700_000_000.0, Some(80.0), Some(90.0)),
            event(1_700_000_300.0, Some(79.0), Some(90.0)),
            event(1_700_000_600.0, Some(78.5), None),
        ];

        assert!(render_chart(&events, &timeframe, &path).unwrap());

        let svg = std::fs::read_to_string(&path).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Charge %"));
    }

    #[test]
    fn nothing_to_plot_writes_nothing() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("chart.svg");
        let timeframe = build_timeframe(0, 0, 0, true).unwrap();

        assert!(!render_chart(&[], &timeframe, &path).unwrap());
        assert!(!render_chart(&[event(1.0, None, None)], &timeframe, &path).unwrap());
        assert!(!path.exists());
    }

    #[test]
    fn flat_series_gets_a_visible_range() {
        let points = [(0.0, 50.0), (2.0, 50.0)];
        let (x, y) = axis_ranges(points.iter());
        assert_eq!(x, 0.0..2.0);
        assert!(y.start < 49.0 && y.end > 51.0);
    }
}
