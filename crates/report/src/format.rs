use chrono::{DateTime, Local};

/// Placeholder shown for any missing value.
pub const MISSING: &str = "--";

/// Format hours as `"12h30m"`; `--` when absent, negative or not finite.
pub fn format_runtime(hours: Option<f64>) -> String {
    match hours {
        Some(h) if h.is_finite() && !h.is_sign_negative() => {
            let minutes = (h * 60.0).floor() as i64;
            format!("{}h{:02}m", minutes / 60, minutes % 60)
        }
        _ => MISSING.to_string(),
    }
}

pub fn format_power(watts: Option<f64>) -> String {
    watts.map_or_else(|| MISSING.to_string(), |w| format!("{w:.2}W"))
}

pub fn format_percent(pct: Option<f64>) -> String {
    pct.map_or_else(|| MISSING.to_string(), |p| format!("{p:.1}%"))
}

pub fn format_wh(wh: Option<f64>) -> String {
    wh.map_or_else(|| MISSING.to_string(), |v| format!("{v:.2}"))
}

/// Local wall-clock rendering of a stored timestamp.
pub fn format_timestamp(ts: f64) -> String {
    match DateTime::from_timestamp(ts.floor() as i64, 0) {
        Some(utc) => utc
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S %Z")
            .to_string(),
        None => MISSING.to_string(),
    }
}

/// Short local time for dense tables.
pub fn format_short_time(ts: f64) -> String {
    match DateTime::from_timestamp(ts.floor() as i64, 0) {
        Some(utc) => utc.with_timezone(&Local).format("%m-%d %H:%M").to_string(),
        None => MISSING.to_string(),
    }
}

/// Block glyph for a charge level; a bolt while charging.
pub fn level_glyph(pct: f64, status: Option<&str>) -> &'static str {
    if status.is_some_and(|s| s.eq_ignore_ascii_case("charging")) {
        return "⚡";
    }
    match pct {
        p if p >= 80.0 => "█",
        p if p >= 60.0 => "▊",
        p if p >= 40.0 => "▌",
        p if p >= 20.0 => "▎",
        _ => "▏",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runtime_formatting() {
        assert_eq!(format_runtime(Some(12.5)), "12h30m");
        assert_eq!(format_runtime(Some(0.99)), "0h59m");
        assert_eq!(format_runtime(Some(3.0)), "3h00m");
        assert_eq!(format_runtime(None), "--");
        assert_eq!(format_runtime(Some(-1.0)), "--");
        assert_eq!(format_runtime(Some(f64::INFINITY)), "--");
        assert_eq!(format_runtime(Some(f64::NAN)), "--");
    }

    #[test]
    fn missing_values_render_as_dashes() {
        assert_eq!(format_power(None), "--");
        assert_eq!(format_percent(None), "--");
        assert_eq!(format_wh(None), "--");
        assert_eq!(format_power(Some(4.8)), "4.80W");
        assert_eq!(format_percent(Some(62.26)), "62.3%");
    }

    #[test]
    fn glyph_tracks_level_and_charging() {
        assert_eq!(level_glyph(95.0, Some("Discharging")), "█");
        assert_eq!(level_glyph(45.0, None), "▌");
        assert_eq!(level_glyph(5.0, Some("Full")), "▏");
        assert_eq!(level_glyph(5.0, Some("charging")), "⚡");
    }
}
