//! Shutdown-request supervisor.
//!
//! The expansion MCU decides *when* the host should power off (battery
//! critically low, or the power button held); this side only mirrors that
//! decision. Because a single read of the request register is enough to
//! trigger an irreversible host shutdown, a failed read is always treated
//! as "no request" — a bus glitch must never power the machine off.

use core::fmt;

use embedded_hal::i2c::I2c;
use log::{error, warn};

use crate::device::Hat;
use crate::ports::{EventSink, HatEvent, PowerOff};
use crate::registers as regs;

/// Firmware-asserted shutdown request, mirrored from the status register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownRequest {
    /// No request pending.
    None,
    /// Battery below the firmware's critical threshold.
    LowBattery,
    /// Power button held past the firmware's hold time.
    ButtonHeld,
    /// Nonzero code this driver does not know. Still honored — the
    /// register mirrors firmware state.
    Other(u8),
}

impl ShutdownRequest {
    /// Decode the raw status-register byte.
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Self::None,
            1 => Self::LowBattery,
            2 => Self::ButtonHeld,
            n => Self::Other(n),
        }
    }
}

impl fmt::Display for ShutdownRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "no request"),
            Self::LowBattery => write!(f, "low battery"),
            Self::ButtonHeld => write!(f, "button held"),
            Self::Other(n) => write!(f, "unrecognized code {n}"),
        }
    }
}

/// Periodic supervisor over the shutdown-request register. Co-scheduled
/// with the battery monitor on the slow cadence.
pub struct ShutdownSupervisor<I2C> {
    hat: Hat<I2C>,
    /// Last observed request; the power-off fires once per transition to a
    /// nonzero value, not once per tick while it persists.
    last: ShutdownRequest,
}

impl<I2C: I2c> ShutdownSupervisor<I2C> {
    pub fn new(hat: Hat<I2C>) -> Self {
        Self {
            hat,
            last: ShutdownRequest::None,
        }
    }

    /// One supervision tick: read the request register and, on a new
    /// nonzero value, log it, publish it, and invoke the host power-off.
    pub fn tick(&mut self, sink: &mut impl EventSink, power: &mut impl PowerOff) {
        let raw = {
            let mut st = self.hat.lock();
            match st.bus.read_byte(regs::REG_SHUTDOWN_STATUS) {
                Ok(v) => v,
                Err(e) => {
                    // Fail-safe: an unreadable register is "no request".
                    warn!("shutdown status read failed, treating as no request: {e}");
                    self.last = ShutdownRequest::None;
                    return;
                }
            }
        };

        let request = ShutdownRequest::from_raw(raw);
        if request == ShutdownRequest::None {
            self.last = ShutdownRequest::None;
            return;
        }
        if request == self.last {
            return;
        }
        self.last = request;

        error!("hardware shutdown request: {request}");
        sink.emit(&HatEvent::ShutdownRequested(request));
        power.power_off(request);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_codes_decode_per_register_map() {
        assert_eq!(ShutdownRequest::from_raw(0), ShutdownRequest::None);
        assert_eq!(ShutdownRequest::from_raw(1), ShutdownRequest::LowBattery);
        assert_eq!(ShutdownRequest::from_raw(2), ShutdownRequest::ButtonHeld);
        assert_eq!(ShutdownRequest::from_raw(9), ShutdownRequest::Other(9));
    }

    #[test]
    fn display_names_the_reason() {
        assert_eq!(ShutdownRequest::LowBattery.to_string(), "low battery");
        assert_eq!(ShutdownRequest::ButtonHeld.to_string(), "button held");
        assert_eq!(
            ShutdownRequest::Other(7).to_string(),
            "unrecognized code 7"
        );
    }
}
