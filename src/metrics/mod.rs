//! # Derived Environmental Metrics
//!
//! Pure functions turning decoded telegrams into comfort and efficiency figures.
//! Nothing here performs I/O or fails: physically undefined input (no humidity,
//! fan off, zero room volume) yields `None`.
//!
//! ## Usage
//!
//! ```rust
//! use vmc_rs::metrics::{comfort_index, dew_point, ComfortLevel};
//!
//! let index = comfort_index(22.0, 50.0).unwrap();
//! assert_eq!(ComfortLevel::from_index(index), ComfortLevel::Excellent);
//! assert!(dew_point(22.0, 0.0).is_none());
//! ```

pub mod air_quality;
pub mod comfort;
pub mod psychro;
pub mod ventilation;

pub use air_quality::Co2Level;
pub use comfort::{comfort_index, humidity_comfort, temperature_comfort, ComfortLevel};
pub use psychro::{
    absolute_humidity, dew_point, dew_point_delta, saturation_vapor_pressure, temperature_delta,
    DewPointRisk,
};
pub use ventilation::{
    air_exchange_time_minutes, daily_air_changes, AirChangeLevel, ExchangeEfficiency,
};

use crate::coordinator::Snapshot;
use crate::vmc::frame::{FanSpeed, SensorFrame, StatusFrame};
use serde::Serialize;

/// Airflow in m³/h for a fan speed code.
pub fn airflow_m3h(fan_speed: FanSpeed) -> f64 {
    fan_speed.airflow_m3h()
}

/// Fan percentage for a fan speed code.
pub fn fan_percentage(fan_speed: FanSpeed) -> u8 {
    fan_speed.percentage()
}

/// Every derived value for one status/sensor pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DerivedMetrics {
    pub fan_percentage: Option<u8>,
    pub airflow_m3h: Option<f64>,
    pub air_exchange_minutes: Option<f64>,
    pub exchange_efficiency: Option<ExchangeEfficiency>,
    pub daily_air_changes: Option<f64>,
    pub air_change_level: Option<AirChangeLevel>,
    pub absolute_humidity_gm3: Option<f64>,
    pub dew_point_c: Option<f64>,
    pub dew_point_delta_c: Option<f64>,
    pub dew_point_risk: Option<DewPointRisk>,
    pub temperature_delta_c: Option<f64>,
    pub comfort_index: Option<u8>,
    pub comfort_level: Option<ComfortLevel>,
    pub co2_level: Option<Co2Level>,
}

impl DerivedMetrics {
    pub fn compute(
        status: Option<&StatusFrame>,
        sensors: Option<&SensorFrame>,
        room_volume_m3: f64,
    ) -> Self {
        let mut metrics = DerivedMetrics::default();

        if let Some(status) = status {
            let speed = status.fan_speed;
            metrics.fan_percentage = Some(speed.percentage());
            metrics.airflow_m3h = Some(speed.airflow_m3h());
            metrics.air_exchange_minutes = air_exchange_time_minutes(room_volume_m3, speed);
            metrics.exchange_efficiency =
                metrics.air_exchange_minutes.map(ExchangeEfficiency::from_minutes);
            metrics.daily_air_changes = daily_air_changes(room_volume_m3, speed);
            metrics.air_change_level = metrics.daily_air_changes.map(AirChangeLevel::from_changes);
        }

        if let Some(s) = sensors {
            metrics.absolute_humidity_gm3 = absolute_humidity(s.temp_internal_c, s.humidity_pct);
            metrics.dew_point_c = dew_point(s.temp_internal_c, s.humidity_pct);
            metrics.dew_point_delta_c =
                dew_point_delta(s.temp_internal_c, s.temp_external_c, s.humidity_pct);
            metrics.dew_point_risk = metrics.dew_point_delta_c.map(DewPointRisk::from_delta);
            metrics.temperature_delta_c = temperature_delta(s.temp_internal_c, s.temp_external_c);
            metrics.comfort_index = comfort_index(s.temp_internal_c, s.humidity_pct);
            metrics.comfort_level = metrics.comfort_index.map(ComfortLevel::from_index);
            metrics.co2_level = u32::try_from(s.co2_ppm).ok().map(Co2Level::from_ppm);
        }

        metrics
    }

    pub fn from_snapshot(snapshot: &Snapshot, room_volume_m3: f64) -> Self {
        Self::compute(
            snapshot.status.as_ref(),
            snapshot.sensors.as_ref(),
            room_volume_m3,
        )
    }
}
