//! Air exchange figures derived from the fan speed and the room volume.

use crate::vmc::frame::FanSpeed;
use serde::{Deserialize, Serialize};

fn valid_volume(room_volume_m3: f64) -> bool {
    room_volume_m3.is_finite() && room_volume_m3 > 0.0
}

/// Minutes needed to move one room volume of air; `None` with the fan off.
pub fn air_exchange_time_minutes(room_volume_m3: f64, fan_speed: FanSpeed) -> Option<f64> {
    if !valid_volume(room_volume_m3) || fan_speed.is_off() {
        return None;
    }
    let airflow = fan_speed.airflow_m3h();
    if airflow <= 0.0 {
        return None;
    }
    Some(room_volume_m3 / airflow * 60.0)
}

/// Room volumes exchanged per day; zero with the fan off.
pub fn daily_air_changes(room_volume_m3: f64, fan_speed: FanSpeed) -> Option<f64> {
    if !valid_volume(room_volume_m3) {
        return None;
    }
    Some(fan_speed.airflow_m3h() / room_volume_m3 * 24.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ExchangeEfficiency {
    Poor,
    Acceptable,
    Good,
    Excellent,
}

impl ExchangeEfficiency {
    pub fn from_minutes(minutes: f64) -> Self {
        if minutes <= 120.0 {
            ExchangeEfficiency::Excellent
        } else if minutes <= 240.0 {
            ExchangeEfficiency::Good
        } else if minutes <= 480.0 {
            ExchangeEfficiency::Acceptable
        } else {
            ExchangeEfficiency::Poor
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AirChangeLevel {
    Poor,
    Adequate,
    Good,
    Excellent,
}

impl AirChangeLevel {
    pub fn from_changes(changes_per_day: f64) -> Self {
        if changes_per_day >= 12.0 {
            AirChangeLevel::Excellent
        } else if changes_per_day >= 6.0 {
            AirChangeLevel::Good
        } else if changes_per_day >= 3.0 {
            AirChangeLevel::Adequate
        } else {
            AirChangeLevel::Poor
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exchange_time_uses_airflow_table() {
        let minutes = air_exchange_time_minutes(60.0, FanSpeed(2)).unwrap();
        assert!((minutes - 60.0 / 17.0 * 60.0).abs() < 1e-9);
        assert_eq!(ExchangeEfficiency::from_minutes(minutes), ExchangeEfficiency::Good);
    }

    #[test]
    fn test_zero_volume_has_no_value() {
        assert_eq!(air_exchange_time_minutes(0.0, FanSpeed(3)), None);
        assert_eq!(daily_air_changes(0.0, FanSpeed(3)), None);
        assert_eq!(daily_air_changes(-1.0, FanSpeed(3)), None);
    }

    #[test]
    fn test_fan_off_has_zero_daily_changes() {
        assert_eq!(daily_air_changes(50.0, FanSpeed::OFF), Some(0.0));
        assert_eq!(AirChangeLevel::from_changes(0.0), AirChangeLevel::Poor);
    }
}
