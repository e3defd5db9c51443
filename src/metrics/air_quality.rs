//! Indoor air quality bands for the CO₂ reading.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Co2Level {
    Unhealthy,
    Poor,
    Moderate,
    Good,
    Excellent,
}

impl Co2Level {
    pub fn from_ppm(ppm: u32) -> Self {
        match ppm {
            0..=599 => Co2Level::Excellent,
            600..=999 => Co2Level::Good,
            1000..=1499 => Co2Level::Moderate,
            1500..=1999 => Co2Level::Poor,
            _ => Co2Level::Unhealthy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_co2_bands() {
        assert_eq!(Co2Level::from_ppm(420), Co2Level::Excellent);
        assert_eq!(Co2Level::from_ppm(600), Co2Level::Good);
        assert_eq!(Co2Level::from_ppm(1000), Co2Level::Moderate);
        assert_eq!(Co2Level::from_ppm(1999), Co2Level::Poor);
        assert_eq!(Co2Level::from_ppm(2000), Co2Level::Unhealthy);
    }
}
