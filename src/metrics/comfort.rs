//! Thermal comfort scoring.
//!
//! Temperature and humidity are each scored between 0.0 and 1.0 by a
//! piecewise-linear function: 1.0 inside the optimal band, falling linearly
//! through the acceptable and tolerable bands, then towards 0.0 at the
//! extremes. The index weights temperature 60 % and humidity 40 %.

use serde::{Deserialize, Serialize};

/// One side of a scoring curve: band edges measured as distance from the optimum.
struct Curve {
    optimal: (f64, f64),
    /// Width of the acceptable band on each side of the optimum
    acceptable: f64,
    /// Width of the tolerable band beyond the acceptable one
    tolerable: f64,
    /// Score lost per unit beyond the tolerable band
    outer_slope: f64,
}

const ACCEPTABLE_FLOOR: f64 = 0.7;
const TOLERABLE_FLOOR: f64 = 0.4;

const TEMPERATURE: Curve = Curve {
    optimal: (20.0, 24.0),
    acceptable: 2.0,
    tolerable: 2.0,
    outer_slope: 0.05,
};

const HUMIDITY: Curve = Curve {
    optimal: (40.0, 60.0),
    acceptable: 10.0,
    tolerable: 10.0,
    outer_slope: 0.02,
};

impl Curve {
    fn score(&self, value: f64) -> f64 {
        let (low, high) = self.optimal;
        let distance = if value < low {
            low - value
        } else if value > high {
            value - high
        } else {
            return 1.0;
        };

        if distance <= self.acceptable {
            1.0 - (1.0 - ACCEPTABLE_FLOOR) * distance / self.acceptable
        } else if distance <= self.acceptable + self.tolerable {
            let into = distance - self.acceptable;
            ACCEPTABLE_FLOOR - (ACCEPTABLE_FLOOR - TOLERABLE_FLOOR) * into / self.tolerable
        } else {
            let beyond = distance - self.acceptable - self.tolerable;
            (TOLERABLE_FLOOR - self.outer_slope * beyond).max(0.0)
        }
    }
}

/// Temperature comfort score in `0.0..=1.0`.
pub fn temperature_comfort(temp_c: f64) -> f64 {
    TEMPERATURE.score(temp_c)
}

/// Humidity comfort score in `0.0..=1.0`.
pub fn humidity_comfort(rh_pct: f64) -> f64 {
    HUMIDITY.score(rh_pct)
}

/// Comfort index 0..=100, `None` for non-finite input.
pub fn comfort_index(temp_c: f64, rh_pct: f64) -> Option<u8> {
    if !temp_c.is_finite() || !rh_pct.is_finite() {
        return None;
    }
    let score = 0.6 * temperature_comfort(temp_c) + 0.4 * humidity_comfort(rh_pct);
    Some((100.0 * score).round().clamp(0.0, 100.0) as u8)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ComfortLevel {
    Poor,
    Mediocre,
    Acceptable,
    Good,
    Excellent,
}

impl ComfortLevel {
    pub fn from_index(index: u8) -> Self {
        match index {
            85..=u8::MAX => ComfortLevel::Excellent,
            70..=84 => ComfortLevel::Good,
            55..=69 => ComfortLevel::Acceptable,
            40..=54 => ComfortLevel::Mediocre,
            _ => ComfortLevel::Poor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optimal_band_scores_full() {
        assert_eq!(temperature_comfort(20.0), 1.0);
        assert_eq!(temperature_comfort(24.0), 1.0);
        assert_eq!(humidity_comfort(40.0), 1.0);
        assert_eq!(humidity_comfort(60.0), 1.0);
        assert_eq!(comfort_index(22.0, 50.0), Some(100));
    }

    #[test]
    fn test_band_edges_are_continuous() {
        assert!((temperature_comfort(18.0) - 0.7).abs() < 1e-9);
        assert!((temperature_comfort(26.0) - 0.7).abs() < 1e-9);
        assert!((temperature_comfort(16.0) - 0.4).abs() < 1e-9);
        assert!((humidity_comfort(30.0) - 0.7).abs() < 1e-9);
        assert!((humidity_comfort(80.0) - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_scores_never_negative() {
        assert_eq!(temperature_comfort(-40.0), 0.0);
        assert_eq!(temperature_comfort(60.0), 0.0);
        assert!(humidity_comfort(0.0) < 1e-9);
        assert_eq!(humidity_comfort(-20.0), 0.0);
        assert_eq!(comfort_index(-40.0, 0.0), Some(0));
    }

    #[test]
    fn test_level_thresholds() {
        assert_eq!(ComfortLevel::from_index(85), ComfortLevel::Excellent);
        assert_eq!(ComfortLevel::from_index(84), ComfortLevel::Good);
        assert_eq!(ComfortLevel::from_index(70), ComfortLevel::Good);
        assert_eq!(ComfortLevel::from_index(55), ComfortLevel::Acceptable);
        assert_eq!(ComfortLevel::from_index(40), ComfortLevel::Mediocre);
        assert_eq!(ComfortLevel::from_index(39), ComfortLevel::Poor);
    }
}
