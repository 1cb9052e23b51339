//! User-button poller.
//!
//! The board does not route a button interrupt line to the host, so a fast
//! poll of the status byte stands in for one. Bit 0 is the only monitored
//! signal; the firmware debounces it, and the poll interval itself is the
//! only additional filter — a transient shorter than one poll period is
//! invisible by construction.

use embedded_hal::i2c::I2c;
use log::{debug, warn};

use crate::device::Hat;
use crate::ports::{EventSink, HatEvent};
use crate::registers as regs;

/// Fast periodic poller that edge-detects the user button.
pub struct ButtonPoller<I2C> {
    hat: Hat<I2C>,
}

impl<I2C: I2c> ButtonPoller<I2C> {
    pub fn new(hat: Hat<I2C>) -> Self {
        Self { hat }
    }

    /// One poll tick: read the status byte and emit an edge when bit 0
    /// differs from the previous tick. Bus errors are logged and skipped;
    /// the stored state is left as-is so no phantom edge fires on recovery.
    pub fn tick(&self, sink: &mut impl EventSink) {
        let edge = {
            let mut st = self.hat.lock();
            let status = match st.bus.read_byte(regs::REG_BUTTON_STATUS) {
                Ok(v) => v,
                Err(e) => {
                    warn!("button status read failed: {e}");
                    return;
                }
            };
            let pressed = status & 0x01 != 0;
            if pressed == st.button_last_state {
                None
            } else {
                st.button_last_state = pressed;
                Some(pressed)
            }
        };

        match edge {
            Some(true) => {
                debug!("button pressed");
                sink.emit(&HatEvent::ButtonPressed);
            }
            Some(false) => {
                debug!("button released");
                sink.emit(&HatEvent::ButtonReleased);
            }
            None => {}
        }
    }
}
