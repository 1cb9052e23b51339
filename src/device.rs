//! Shared device state and the on-demand register operations.
//!
//! [`Hat`] is a cloneable handle over the one mutex that serializes every
//! register transaction and guards the cached hardware state. Monitors and
//! configuration callers are symmetric lock holders; nobody holds the lock
//! across a sleep — acquisition strictly brackets the register
//! transaction(s) of one operation plus its cache update.

use core::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use embedded_hal::i2c::I2c;
use log::{info, warn};

use crate::bus::RegisterBus;
use crate::config::HatConfig;
use crate::error::{Error, Result};
use crate::pwm;
use crate::registers as regs;

/// Battery telemetry published by the battery monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatterySnapshot {
    /// Pack voltage in millivolts.
    pub voltage_mv: u32,
    /// Charge level, 0-100.
    pub level_pct: u8,
    /// True while the charger reports an active charge.
    pub charging: bool,
}

/// Last *requested* per-channel PWM state. `duty_ms`/`period_ms` are what
/// the user asked for, not necessarily what is latched if a sibling channel
/// has since retargeted the shared timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PwmChannelState {
    pub enabled: bool,
    pub duty_ms: u32,
    pub period_ms: u32,
}

/// Last raw values written to a timer's shared registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct TimerState {
    pub period_raw: u16,
    pub prescaler_raw: u16,
}

/// Firmware version triple read from the version block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FirmwareVersion {
    pub major: u8,
    pub minor: u8,
    pub patch: u8,
}

impl fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Everything behind the device lock: the bus handle plus the cached
/// hardware state.
pub(crate) struct DeviceState<I2C> {
    pub bus: RegisterBus<I2C>,
    pub pwm: [PwmChannelState; regs::PWM_CHANNELS],
    pub timers: [TimerState; regs::PWM_TIMERS],
    pub battery: BatterySnapshot,
    pub button_last_state: bool,
    pub led_status: bool,
    pub speaker_status: bool,
}

struct HatShared<I2C> {
    state: Mutex<DeviceState<I2C>>,
    config: HatConfig,
}

/// Handle to one attached expansion board. Clones share the same lock and
/// cache; create one at attach time and pass clones to the monitors.
pub struct Hat<I2C> {
    shared: Arc<HatShared<I2C>>,
}

impl<I2C> Clone for Hat<I2C> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<I2C: I2c> Hat<I2C> {
    /// Attach to the board: validate the configuration, then bring every
    /// timer and channel to its default state. Initialization is
    /// fail-fast — the first channel that cannot be programmed aborts the
    /// attach with no partial enablement.
    pub fn open(i2c: I2C, config: HatConfig) -> Result<Self> {
        config.validate()?;
        let state = DeviceState {
            bus: RegisterBus::new(i2c, config.i2c_addr),
            pwm: [PwmChannelState {
                enabled: false,
                duty_ms: 0,
                period_ms: regs::PWM_DEFAULT_PERIOD,
            }; regs::PWM_CHANNELS],
            timers: [TimerState::default(); regs::PWM_TIMERS],
            battery: BatterySnapshot::default(),
            button_last_state: false,
            led_status: false,
            speaker_status: false,
        };
        let hat = Self {
            shared: Arc::new(HatShared {
                state: Mutex::new(state),
                config,
            }),
        };
        {
            let mut st = hat.lock();
            pwm::probe(&mut st)?;
            st.bus.write_byte(regs::REG_LED_CTRL, 0)?;
            st.led_status = false;
        }
        info!(
            "expansion board attached at 0x{:02X}, {} PWM channels ready",
            hat.shared.config.i2c_addr,
            regs::PWM_CHANNELS
        );
        Ok(hat)
    }

    /// Configuration this handle was attached with.
    pub fn config(&self) -> &HatConfig {
        &self.shared.config
    }

    // A poisoned lock only means some caller panicked mid-operation; the
    // cache still reflects the last completed write, so keep going.
    pub(crate) fn lock(&self) -> MutexGuard<'_, DeviceState<I2C>> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    // ── Battery ───────────────────────────────────────────────

    /// Latest battery snapshot published by the battery monitor. Stale (not
    /// wrong) while the bus is glitching.
    pub fn battery(&self) -> BatterySnapshot {
        self.lock().battery
    }

    // ── LED / speaker ─────────────────────────────────────────

    /// Cached LED state.
    pub fn led(&self) -> bool {
        self.lock().led_status
    }

    /// Drive the user LED. The cache is updated only after the register
    /// write succeeds.
    pub fn set_led(&self, on: bool) -> Result<()> {
        let mut st = self.lock();
        st.bus.write_byte(regs::REG_LED_CTRL, u8::from(on))?;
        st.led_status = on;
        Ok(())
    }

    /// Cached speaker state.
    pub fn speaker(&self) -> bool {
        self.lock().speaker_status
    }

    /// Drive the speaker enable line.
    pub fn set_speaker(&self, on: bool) -> Result<()> {
        let mut st = self.lock();
        st.bus.write_byte(regs::REG_SPEAKER_CTRL, u8::from(on))?;
        st.speaker_status = on;
        Ok(())
    }

    // ── Analog inputs ─────────────────────────────────────────

    /// Raw 12-bit reading of analog input `channel` (0-3).
    pub fn adc_raw(&self, channel: usize) -> Result<u16> {
        if channel >= regs::ADC_CHANNELS {
            return Err(Error::InvalidArgument("adc channel out of range"));
        }
        self.lock().bus.read_word(regs::adc_reg(channel), true)
    }

    /// Analog input `channel` converted to millivolts, using the scale the
    /// firmware reports (reference / full-scale-plus-one).
    pub fn adc_voltage_mv(&self, channel: usize) -> Result<u32> {
        let raw = self.adc_raw(channel)?;
        Ok(u32::from(raw) * regs::ADC_REFERENCE_MV / (regs::ADC_MAX_VALUE + 1))
    }

    // ── System ────────────────────────────────────────────────

    /// Firmware version of the expansion MCU, read as one 3-byte block.
    pub fn firmware_version(&self) -> Result<FirmwareVersion> {
        let block = self.lock().bus.read_block(regs::REG_FIRMWARE_VERSION, 3)?;
        Ok(FirmwareVersion {
            major: block[0],
            minor: block[1],
            patch: block[2],
        })
    }

    /// Quiesce the board before detaching: force every PWM channel off and
    /// the LED dark. Best-effort — a failing channel is logged and skipped,
    /// never aborts the teardown. Cancel the monitors first.
    pub fn teardown(&self) {
        let mut st = self.lock();
        pwm::teardown(&mut st);
        if let Err(e) = st.bus.write_byte(regs::REG_LED_CTRL, 0) {
            warn!("teardown: LED off failed: {e}");
        } else {
            st.led_status = false;
        }
        info!("expansion board quiesced");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn firmware_version_formats_as_dotted_triple() {
        let v = FirmwareVersion {
            major: 1,
            minor: 4,
            patch: 11,
        };
        assert_eq!(v.to_string(), "1.4.11");
    }

    #[test]
    fn battery_snapshot_starts_unknown() {
        let s = BatterySnapshot::default();
        assert_eq!(s.voltage_mv, 0);
        assert_eq!(s.level_pct, 0);
        assert!(!s.charging);
    }
}
