//! Charge/discharge power and runtime estimation from a series of events.
//!
//! Readings are noisy and gap-prone: the machine sleeps, the collector is
//! stopped, and the kernel status flips between charging and discharging.
//! Only consecutive pairs that are close in time, agree on direction and move
//! the energy the expected way contribute to an average.

use crate::Sample;

/// Largest gap between two readings that is still trusted as continuous use.
pub const MAX_TRUSTED_GAP_SECS: f64 = 5.0 * 60.0;

const SECS_PER_HOUR: f64 = 3600.0;

/// Which way energy is expected to flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Charging,
    Discharging,
}

impl Direction {
    /// Whether a sample with this status may take part in a rate for `self`.
    ///
    /// An absent status counts as discharging but never as charging.
    pub fn qualifies(self, status: Option<&str>) -> bool {
        match self {
            Direction::Discharging => {
                status.map_or(true, |s| s.eq_ignore_ascii_case("discharging"))
            }
            Direction::Charging => status.is_some_and(|s| s.eq_ignore_ascii_case("charging")),
        }
    }

    /// `true` when the stored energy must rise between two readings.
    pub fn expects_increase(self) -> bool {
        matches!(self, Direction::Charging)
    }
}

/// Average discharge and charge power over one series, both in watts.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AverageRates {
    pub discharge_w: Option<f64>,
    pub charge_w: Option<f64>,
}

#[derive(Debug, Default)]
struct RateAccumulator {
    delta_wh: f64,
    hours: f64,
}

impl RateAccumulator {
    fn record(&mut self, delta_wh: f64, hours: f64) {
        self.delta_wh += delta_wh;
        self.hours += hours;
    }

    fn average(&self) -> Option<f64> {
        if self.hours == 0.0 || self.delta_wh == 0.0 {
            return None;
        }
        Some(self.delta_wh / self.hours).filter(|rate| rate.is_finite())
    }
}

/// Average power flowing in `direction`, as a positive magnitude in watts.
///
/// `samples` need not be sorted. Returns `None` when no consecutive pair of
/// readings qualifies.
pub fn average_rate<'a, I>(samples: I, direction: Direction) -> Option<f64>
where
    I: IntoIterator<Item = &'a Sample>,
{
    let mut series: Vec<(f64, f64, Option<&str>)> = samples
        .into_iter()
        .filter_map(|s| s.energy_now_wh.map(|e| (s.ts, e, s.status.as_deref())))
        .collect();
    if series.len() < 2 {
        return None;
    }
    series.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut acc = RateAccumulator::default();
    for pair in series.windows(2) {
        let (prev_ts, prev_wh, prev_status) = pair[0];
        let (curr_ts, curr_wh, curr_status) = pair[1];

        let elapsed = curr_ts - prev_ts;
        // NaN elapsed (non-finite timestamps) fails both bounds.
        if !(elapsed > 0.0 && elapsed <= MAX_TRUSTED_GAP_SECS) {
            continue;
        }
        if !direction.qualifies(prev_status) || !direction.qualifies(curr_status) {
            continue;
        }

        let delta = curr_wh - prev_wh;
        if !delta.is_finite() {
            continue;
        }
        let moves_expected_way = if direction.expects_increase() {
            delta > 0.0
        } else {
            delta < 0.0
        };
        if moves_expected_way {
            acc.record(delta, elapsed / SECS_PER_HOUR);
        }
    }

    let signed = acc.average()?;
    Some(if direction.expects_increase() { signed } else { -signed })
}

pub fn average_discharge_w<'a, I>(samples: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a Sample>,
{
    average_rate(samples, Direction::Discharging)
}

pub fn average_charge_w<'a, I>(samples: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a Sample>,
{
    average_rate(samples, Direction::Charging)
}

/// Both averages at once, for summary rows.
pub fn average_rates(samples: &[&Sample]) -> AverageRates {
    AverageRates {
        discharge_w: average_discharge_w(samples.iter().copied()),
        charge_w: average_charge_w(samples.iter().copied()),
    }
}

/// Hours a full battery lasts at `avg_discharge_w`.
///
/// Uses the current full-charge energy, falling back to the design energy
/// only when the former was not reported.
pub fn estimate_runtime_hours(avg_discharge_w: Option<f64>, reference: &Sample) -> Option<f64> {
    let rate = avg_discharge_w.filter(|r| *r > 0.0)?;
    let capacity_wh = reference
        .energy_full_wh
        .or(reference.energy_full_design_wh)
        .filter(|c| *c > 0.0)?;
    Some(capacity_wh / rate)
}
