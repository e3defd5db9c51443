//! Psychrometric calculations based on the Magnus-Tetens approximation.
//!
//! Temperatures are in °C, relative humidity in percent. Every function
//! returns `None` for physically undefined input instead of failing.

use serde::{Deserialize, Serialize};

const MAGNUS_A_HPA: f64 = 6.112;
const MAGNUS_B: f64 = 17.27;
const MAGNUS_C: f64 = 237.7;
const WATER_MOLAR_MASS: f64 = 18.016;
/// Gas constant in hPa·m³/(kmol·K) scaled so the result is in g/m³
const GAS_CONSTANT: f64 = 0.08314;
const KELVIN_OFFSET: f64 = 273.15;

/// Accepts finite input with positive humidity; humidity is capped at 100 %.
fn checked(temp_c: f64, rh_pct: f64) -> Option<(f64, f64)> {
    if !temp_c.is_finite() || !rh_pct.is_finite() || rh_pct <= 0.0 || temp_c <= -MAGNUS_C {
        return None;
    }
    Some((temp_c, rh_pct.min(100.0)))
}

fn magnus_exponent(temp_c: f64) -> f64 {
    MAGNUS_B * temp_c / (MAGNUS_C + temp_c)
}

/// Saturation vapour pressure in hPa.
pub fn saturation_vapor_pressure(temp_c: f64) -> Option<f64> {
    if !temp_c.is_finite() || temp_c <= -MAGNUS_C {
        return None;
    }
    Some(MAGNUS_A_HPA * magnus_exponent(temp_c).exp())
}

/// Absolute humidity in g/m³.
pub fn absolute_humidity(temp_c: f64, rh_pct: f64) -> Option<f64> {
    let (t, rh) = checked(temp_c, rh_pct)?;
    let es = saturation_vapor_pressure(t)?;
    let e = rh / 100.0 * es;
    let ah = e * WATER_MOLAR_MASS / (GAS_CONSTANT * (t + KELVIN_OFFSET));
    ah.is_finite().then_some(ah)
}

/// Dew point in °C, never above `temp_c`.
pub fn dew_point(temp_c: f64, rh_pct: f64) -> Option<f64> {
    let (t, rh) = checked(temp_c, rh_pct)?;
    let alpha = magnus_exponent(t) + (rh / 100.0).ln();
    let td = MAGNUS_C * alpha / (MAGNUS_B - alpha);
    // At 100 % the formula returns `t` up to rounding.
    td.is_finite().then_some(td.min(t))
}

/// Internal minus external dew point.
///
/// Both dew points use the one humidity reading the unit reports; there is no
/// separate outdoor humidity sensor.
pub fn dew_point_delta(temp_internal_c: f64, temp_external_c: f64, rh_pct: f64) -> Option<f64> {
    Some(dew_point(temp_internal_c, rh_pct)? - dew_point(temp_external_c, rh_pct)?)
}

/// Internal minus external temperature.
pub fn temperature_delta(temp_internal_c: f64, temp_external_c: f64) -> Option<f64> {
    let delta = temp_internal_c - temp_external_c;
    delta.is_finite().then_some(delta)
}

/// Condensation risk derived from the dew point delta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DewPointRisk {
    Critical,
    High,
    Moderate,
    Low,
    Safe,
}

impl DewPointRisk {
    pub fn from_delta(delta_c: f64) -> Self {
        if delta_c <= -2.0 {
            DewPointRisk::Critical
        } else if delta_c <= 0.0 {
            DewPointRisk::High
        } else if delta_c <= 2.0 {
            DewPointRisk::Moderate
        } else if delta_c <= 5.0 {
            DewPointRisk::Low
        } else {
            DewPointRisk::Safe
        }
    }
}
