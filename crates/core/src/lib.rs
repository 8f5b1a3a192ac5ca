pub mod aggregate;
pub mod error;
pub mod rates;
pub mod sample;
pub mod timeframe;

pub use aggregate::{aggregate_group, aggregate_samples_by_timestamp};
pub use error::{BatteryError, Result};
pub use rates::{
    average_charge_w, average_discharge_w, average_rate, average_rates, estimate_runtime_hours,
    AverageRates, Direction, MAX_TRUSTED_GAP_SECS,
};
pub use sample::Sample;
pub use timeframe::{build_timeframe, Timeframe};
