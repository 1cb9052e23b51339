//! Runtime configuration parameters.
//!
//! All tunable parameters for the control core. Hosts may persist them
//! (postcard wire format) and hand them back at the next attach.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::registers;

/// Core configuration, validated at attach time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HatConfig {
    /// 7-bit I2C address of the expansion MCU.
    pub i2c_addr: u8,

    // --- Timing ---
    /// Battery + shutdown monitor interval (milliseconds).
    pub status_interval_ms: u32,
    /// Button poll interval (milliseconds). This cadence stands in for an
    /// interrupt line the board does not expose.
    pub button_poll_interval_ms: u32,

    // --- Battery gauge ---
    /// Battery voltage reported as 0% (millivolts).
    pub battery_min_mv: u32,
    /// Battery voltage reported as 100% (millivolts).
    pub battery_max_mv: u32,
}

impl Default for HatConfig {
    fn default() -> Self {
        Self {
            i2c_addr: registers::DEFAULT_I2C_ADDR,
            status_interval_ms: 1000,
            button_poll_interval_ms: 20,
            battery_min_mv: registers::BATTERY_MIN_MV,
            battery_max_mv: registers::BATTERY_MAX_MV,
        }
    }
}

impl HatConfig {
    /// Range-check the configuration. Invalid values are rejected, not
    /// silently clamped.
    pub fn validate(&self) -> Result<()> {
        if self.status_interval_ms == 0 {
            return Err(Error::InvalidArgument("status interval must be nonzero"));
        }
        if self.button_poll_interval_ms == 0 {
            return Err(Error::InvalidArgument(
                "button poll interval must be nonzero",
            ));
        }
        if self.battery_min_mv >= self.battery_max_mv {
            return Err(Error::InvalidArgument(
                "battery bounds must satisfy min < max",
            ));
        }
        Ok(())
    }

    /// Serialize for persistence (postcard wire format).
    pub fn to_bytes(&self) -> core::result::Result<Vec<u8>, postcard::Error> {
        postcard::to_allocvec(self)
    }

    /// Deserialize a previously persisted configuration.
    pub fn from_bytes(bytes: &[u8]) -> core::result::Result<Self, postcard::Error> {
        postcard::from_bytes(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_sane() {
        let c = HatConfig::default();
        assert!(c.validate().is_ok());
        assert_eq!(c.i2c_addr, 0x17);
        assert!(c.battery_min_mv < c.battery_max_mv);
    }

    #[test]
    fn button_polls_faster_than_status() {
        let c = HatConfig::default();
        assert!(
            c.button_poll_interval_ms < c.status_interval_ms,
            "button polling substitutes for an interrupt and must outpace the status cadence"
        );
    }

    #[test]
    fn zero_intervals_are_rejected() {
        let mut c = HatConfig::default();
        c.status_interval_ms = 0;
        assert!(c.validate().is_err());

        let mut c = HatConfig::default();
        c.button_poll_interval_ms = 0;
        assert!(c.validate().is_err());
    }

    #[test]
    fn inverted_battery_bounds_are_rejected() {
        let mut c = HatConfig::default();
        c.battery_min_mv = c.battery_max_mv;
        assert!(c.validate().is_err());
    }

    #[test]
    fn serde_roundtrip() {
        let c = HatConfig::default();
        let json = serde_json::to_string(&c).unwrap();
        let c2: HatConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(c.i2c_addr, c2.i2c_addr);
        assert_eq!(c.status_interval_ms, c2.status_interval_ms);
        assert_eq!(c.battery_max_mv, c2.battery_max_mv);
    }

    #[test]
    fn postcard_roundtrip() {
        let c = HatConfig::default();
        let bytes = c.to_bytes().unwrap();
        let c2 = HatConfig::from_bytes(&bytes).unwrap();
        assert_eq!(c.button_poll_interval_ms, c2.button_poll_interval_ms);
        assert_eq!(c.battery_min_mv, c2.battery_min_mv);
    }
}
