use battmon_core::Sample;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Where the kernel exposes power supplies.
pub const DEFAULT_SYSFS_ROOT: &str = "/sys/class/power_supply";

/// µWh / µAh·µV scale factors used by the power-supply class.
const MICRO: f64 = 1_000_000.0;
const MICRO_SQUARED: f64 = MICRO * MICRO;

/// One battery's state, normalised to watt-hours and percentages.
#[derive(Debug, Clone, PartialEq)]
pub struct BatteryReading {
    pub path: PathBuf,
    pub capacity_pct: Option<f64>,
    pub percentage: Option<f64>,
    pub energy_now_wh: Option<f64>,
    pub energy_full_wh: Option<f64>,
    pub energy_full_design_wh: Option<f64>,
    pub health_pct: Option<f64>,
    pub status: Option<String>,
}

impl BatteryReading {
    /// Stamp this reading as a stored sample taken at `ts`.
    pub fn into_sample(self, ts: f64) -> Sample {
        Sample {
            ts,
            percentage: self.percentage,
            capacity_pct: self.capacity_pct,
            health_pct: self.health_pct,
            energy_now_wh: self.energy_now_wh,
            energy_full_wh: self.energy_full_wh,
            energy_full_design_wh: self.energy_full_design_wh,
            status: self.status,
            source_path: self.path.to_string_lossy().into_owned(),
        }
    }
}

/// List `BAT*` supplies under `root` whose `type` is `Battery`, sorted by name.
pub fn find_battery_paths(root: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(root) else {
        return Vec::new();
    };

    let mut batteries: Vec<PathBuf> = entries
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.starts_with("BAT"))
        })
        .filter(|path| {
            std::fs::read_to_string(path.join("type"))
                .is_ok_and(|kind| kind.trim().eq_ignore_ascii_case("battery"))
        })
        .collect();
    batteries.sort();
    batteries
}

/// Read one battery directory.
///
/// `uevent` values win over the individual attribute files. Devices that only
/// report charge (µAh) get their energy derived from charge × voltage.
pub fn read_battery(path: &Path) -> BatteryReading {
    let attrs = Attributes::load(path);

    let voltage_uv = attrs.first_number(&[
        ("POWER_SUPPLY_VOLTAGE_NOW", "voltage_now"),
        ("POWER_SUPPLY_VOLTAGE_MIN_DESIGN", "voltage_min_design"),
        ("POWER_SUPPLY_VOLTAGE_MAX_DESIGN", "voltage_max_design"),
    ]);
    let energy = |energy_key: &str, energy_file: &str, charge_key: &str, charge_file: &str| {
        attrs
            .number(energy_key, energy_file)
            .map(|uwh| uwh / MICRO)
            .or_else(|| {
                let charge_uah = attrs.number(charge_key, charge_file)?;
                Some(charge_uah * voltage_uv? / MICRO_SQUARED)
            })
    };

    let energy_now_wh = energy(
        "POWER_SUPPLY_ENERGY_NOW",
        "energy_now",
        "POWER_SUPPLY_CHARGE_NOW",
        "charge_now",
    );
    let energy_full_wh = energy(
        "POWER_SUPPLY_ENERGY_FULL",
        "energy_full",
        "POWER_SUPPLY_CHARGE_FULL",
        "charge_full",
    );
    let energy_full_design_wh = energy(
        "POWER_SUPPLY_ENERGY_FULL_DESIGN",
        "energy_full_design",
        "POWER_SUPPLY_CHARGE_FULL_DESIGN",
        "charge_full_design",
    );

    let reading = BatteryReading {
        path: path.to_path_buf(),
        capacity_pct: attrs.number("POWER_SUPPLY_CAPACITY", "capacity"),
        percentage: ratio_pct(energy_now_wh, energy_full_wh),
        energy_now_wh,
        energy_full_wh,
        energy_full_design_wh,
        health_pct: ratio_pct(energy_full_wh, energy_full_design_wh),
        status: attrs.text("POWER_SUPPLY_STATUS", "status"),
    };
    tracing::debug!(?reading, "read battery");
    reading
}

fn ratio_pct(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    match (numerator, denominator) {
        (Some(num), Some(den)) if den != 0.0 => Some(num / den * 100.0),
        _ => None,
    }
}

/// Attribute lookup for one power-supply directory.
struct Attributes<'a> {
    dir: &'a Path,
    uevent: HashMap<String, String>,
}

impl<'a> Attributes<'a> {
    fn load(dir: &'a Path) -> Self {
        let uevent = std::fs::read_to_string(dir.join("uevent"))
            .unwrap_or_default()
            .lines()
            .filter_map(|line| line.split_once('='))
            .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
            .collect();
        Self { dir, uevent }
    }

    fn text(&self, key: &str, file: &str) -> Option<String> {
        self.uevent
            .get(key)
            .cloned()
            .or_else(|| std::fs::read_to_string(self.dir.join(file)).ok())
            .map(|raw| raw.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn uevent_number(&self, key: &str) -> Option<f64> {
        self.uevent.get(key).and_then(|raw| parse_finite(raw))
    }

    fn file_number(&self, file: &str) -> Option<f64> {
        parse_finite(&std::fs::read_to_string(self.dir.join(file)).ok()?)
    }

    fn number(&self, key: &str, file: &str) -> Option<f64> {
        self.uevent_number(key).or_else(|| self.file_number(file))
    }

    /// First value found, checking every uevent key before any file.
    fn first_number(&self, candidates: &[(&str, &str)]) -> Option<f64> {
        candidates
            .iter()
            .find_map(|(key, _)| self.uevent_number(key))
            .or_else(|| candidates.iter().find_map(|(_, file)| self.file_number(file)))
    }
}

/// `inf`/`NaN` parse as `f64` but are never real readings.
fn parse_finite(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
