//! Battery telemetry monitor.
//!
//! Samples the battery ADC and the charging flag once per slow tick,
//! inside a single critical section so voltage and charging state come
//! from the same instant, then republishes the snapshot. A failed read
//! leaves the previous snapshot untouched — consumers see stale values,
//! never wrong ones — and the next tick simply retries.

use embedded_hal::i2c::I2c;
use log::warn;

use crate::device::{BatterySnapshot, Hat};
use crate::ports::{EventSink, HatEvent};
use crate::registers as regs;

/// Pack voltage in millivolts from the raw battery ADC reading: ADC scale
/// first, then the sense-divider ratio (that operation order, matching the
/// firmware's calibration).
pub fn voltage_from_adc(raw: u16) -> u32 {
    (u32::from(raw) * regs::ADC_REFERENCE_MV / regs::ADC_MAX_VALUE) * regs::BATTERY_DIVIDER
}

/// Charge level from pack voltage: linear between the bounds, saturating
/// to 0 below and 100 above.
pub fn level_from_voltage(voltage_mv: u32, min_mv: u32, max_mv: u32) -> u8 {
    if voltage_mv < min_mv {
        0
    } else if voltage_mv > max_mv {
        100
    } else {
        ((voltage_mv - min_mv) * 100 / (max_mv - min_mv)) as u8
    }
}

/// Periodic battery sampler. Runs on the slow cadence alongside the
/// shutdown supervisor.
pub struct BatteryMonitor<I2C> {
    hat: Hat<I2C>,
    min_mv: u32,
    max_mv: u32,
}

impl<I2C: I2c> BatteryMonitor<I2C> {
    pub fn new(hat: Hat<I2C>) -> Self {
        let min_mv = hat.config().battery_min_mv;
        let max_mv = hat.config().battery_max_mv;
        Self {
            hat,
            min_mv,
            max_mv,
        }
    }

    /// One sampling tick. Never returns an error: this is a passive
    /// background task, not a request/response operation.
    pub fn tick(&self, sink: &mut impl EventSink) {
        let snapshot = {
            let mut st = self.hat.lock();
            let raw = match st.bus.read_word(regs::REG_BATTERY_ADC, false) {
                Ok(v) => v,
                Err(e) => {
                    warn!("battery voltage read failed: {e}");
                    return;
                }
            };
            let charging = match st.bus.read_byte(regs::REG_CHARGING_STATUS) {
                Ok(v) => v != 0,
                Err(e) => {
                    warn!("charging status read failed: {e}");
                    return;
                }
            };
            let voltage_mv = voltage_from_adc(raw);
            let snapshot = BatterySnapshot {
                voltage_mv,
                level_pct: level_from_voltage(voltage_mv, self.min_mv, self.max_mv),
                charging,
            };
            st.battery = snapshot;
            snapshot
        };
        sink.emit(&HatEvent::BatteryChanged(snapshot));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::{BATTERY_MAX_MV, BATTERY_MIN_MV};

    #[test]
    fn level_saturates_at_the_bounds() {
        assert_eq!(level_from_voltage(6400, BATTERY_MIN_MV, BATTERY_MAX_MV), 0);
        assert_eq!(level_from_voltage(8400, BATTERY_MIN_MV, BATTERY_MAX_MV), 100);
        assert_eq!(level_from_voltage(5000, BATTERY_MIN_MV, BATTERY_MAX_MV), 0);
        assert_eq!(level_from_voltage(9100, BATTERY_MIN_MV, BATTERY_MAX_MV), 100);
    }

    #[test]
    fn level_is_linear_between_the_bounds() {
        assert_eq!(level_from_voltage(7400, BATTERY_MIN_MV, BATTERY_MAX_MV), 50);
        assert_eq!(level_from_voltage(6900, BATTERY_MIN_MV, BATTERY_MAX_MV), 25);
        assert_eq!(level_from_voltage(7900, BATTERY_MIN_MV, BATTERY_MAX_MV), 75);
    }

    #[test]
    fn level_is_monotone_in_voltage() {
        let mut last = 0;
        for mv in (6000..=8800).step_by(50) {
            let level = level_from_voltage(mv, BATTERY_MIN_MV, BATTERY_MAX_MV);
            assert!(level >= last, "{mv} mV regressed the level");
            last = level;
        }
    }

    #[test]
    fn voltage_applies_adc_scale_then_divider() {
        // Full scale: 3300 mV at the sense pin, times the divider.
        assert_eq!(voltage_from_adc(4095), 9900);
        // 3000 counts: 3000 * 3300 / 4095 = 2417 mV, * 3 = 7251 mV.
        assert_eq!(voltage_from_adc(3000), 7251);
        assert_eq!(voltage_from_adc(0), 0);
    }
}
