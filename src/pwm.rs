//! PWM output control and the shared-timer arithmetic.
//!
//! Twelve channels sit on three hardware timers, four channels per timer.
//! Frequency lives in the timer's prescaler/period registers and is shared
//! by the four siblings; only the duty register is per-channel. Changing
//! one channel's period therefore retargets its siblings too — their duty
//! registers keep the old raw value and their effective ratio shifts. The
//! core does not renormalize them; callers that care re-issue `set_duty`.
//!
//! Enable/disable is host-side bookkeeping plus quiescing: disabling always
//! forces the raw duty register to 0, and enabling writes nothing — the
//! output stays at 0 raw until the next `set_duty`.

use embedded_hal::i2c::I2c;
use log::{error, warn};

use crate::device::{DeviceState, Hat, PwmChannelState};
use crate::error::{Error, Result};
use crate::registers as regs;

/// Derive the timer prescaler for a requested period.
///
/// `f = 1_000_000 / period`, `prescaler = core / f / (full_scale + 1) - 1`,
/// clamped to `1..=65535`. Periods of zero, or long enough that the derived
/// frequency underflows to zero, are rejected.
pub fn prescaler_for_period(period_ms: u32) -> Result<u16> {
    if period_ms == 0 {
        return Err(Error::InvalidArgument("period must be nonzero"));
    }
    let freq = 1_000_000 / period_ms;
    if freq == 0 {
        return Err(Error::InvalidArgument("period too long for the timer"));
    }
    let quotient = regs::PWM_CORE_CLOCK_HZ / freq / (regs::PWM_RAW_MAX + 1);
    Ok(quotient.saturating_sub(1).clamp(1, 65_535) as u16)
}

/// Convert a duty request into the raw duty-register value (truncating
/// integer math). Callers guarantee `duty_ms <= period_ms`.
pub fn duty_to_raw(duty_ms: u32, period_ms: u32) -> u16 {
    (duty_ms * regs::PWM_RAW_MAX / period_ms) as u16
}

/// Handle to one PWM output. Obtained from [`Hat::pwm`]; clones of the
/// underlying [`Hat`] may hold handles to the same channel concurrently —
/// the device lock serializes them.
pub struct PwmChannel<I2C> {
    hat: Hat<I2C>,
    index: usize,
}

impl<I2C: I2c> Hat<I2C> {
    /// Handle for PWM channel `channel` (0-11).
    pub fn pwm(&self, channel: usize) -> Result<PwmChannel<I2C>> {
        if channel >= regs::PWM_CHANNELS {
            return Err(Error::InvalidArgument("pwm channel out of range"));
        }
        Ok(PwmChannel {
            hat: self.clone(),
            index: channel,
        })
    }
}

impl<I2C: I2c> PwmChannel<I2C> {
    /// Channel number, 0-11.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Cached request state; no bus traffic.
    pub fn state(&self) -> PwmChannelState {
        self.hat.lock().pwm[self.index]
    }

    /// Set this channel's period by reprogramming the *timer* prescaler —
    /// shared with the channel's three siblings, whose duty requests are
    /// left untouched (see module docs).
    ///
    /// Cache is updated only after the register write succeeds; on failure
    /// it keeps the last known-good values.
    pub fn set_period(&self, period_ms: u32) -> Result<()> {
        let prescaler = prescaler_for_period(period_ms)?;
        let timer = regs::timer_index(self.index);
        let mut st = self.hat.lock();
        st.bus
            .write_word(regs::timer_prescaler_reg(timer), prescaler, true)?;
        st.timers[timer].prescaler_raw = prescaler;
        st.pwm[self.index].period_ms = period_ms;
        Ok(())
    }

    /// Set this channel's duty. Rejected while the channel is disabled, or
    /// when the request exceeds the cached period (the raw value would
    /// overrun the timer's full scale).
    pub fn set_duty(&self, duty_ms: u32) -> Result<()> {
        let mut st = self.hat.lock();
        let chan = st.pwm[self.index];
        if !chan.enabled {
            return Err(Error::NotEnabled);
        }
        if duty_ms > chan.period_ms {
            return Err(Error::InvalidArgument("duty longer than period"));
        }
        let raw = duty_to_raw(duty_ms, chan.period_ms);
        st.bus
            .write_word(regs::pwm_duty_reg(self.index), raw, true)?;
        st.pwm[self.index].duty_ms = duty_ms;
        Ok(())
    }

    /// Enable or disable this channel.
    ///
    /// Disable always force-writes raw duty 0 so the physical output is
    /// quiesced no matter what the cached request says; the disabled flag
    /// sticks even if that quiesce write fails (the error is still
    /// surfaced). Enable performs no register write — the output resumes
    /// only on the next `set_duty`.
    pub fn set_enabled(&self, enabled: bool) -> Result<()> {
        let mut st = self.hat.lock();
        st.pwm[self.index].enabled = enabled;
        if !enabled {
            st.bus.write_word(regs::pwm_duty_reg(self.index), 0, true)?;
        }
        Ok(())
    }
}

/// Program every timer and channel to the default state, fail-fast. Called
/// once at attach, under the device lock.
pub(crate) fn probe<I2C: I2c>(st: &mut DeviceState<I2C>) -> Result<()> {
    for channel in 0..regs::PWM_CHANNELS {
        let timer = regs::timer_index(channel);
        st.bus
            .write_word(regs::timer_period_reg(timer), regs::PWM_RAW_MAX as u16, true)
            .map_err(|e| {
                error!("PWM channel {channel} init failed: {e}");
                e
            })?;
        st.timers[timer].period_raw = regs::PWM_RAW_MAX as u16;
        st.bus
            .write_word(
                regs::timer_prescaler_reg(timer),
                regs::PWM_DEFAULT_PRESCALER,
                true,
            )
            .map_err(|e| {
                error!("PWM channel {channel} init failed: {e}");
                e
            })?;
        st.timers[timer].prescaler_raw = regs::PWM_DEFAULT_PRESCALER;
    }
    Ok(())
}

/// Force every channel off. Best-effort: a failing channel is logged and
/// the loop moves on — teardown never aborts early.
pub(crate) fn teardown<I2C: I2c>(st: &mut DeviceState<I2C>) {
    for channel in 0..regs::PWM_CHANNELS {
        if let Err(e) = st.bus.write_word(regs::pwm_duty_reg(channel), 0, true) {
            warn!("teardown: PWM channel {channel} quiesce failed: {e}");
        }
        st.pwm[channel] = PwmChannelState {
            enabled: false,
            duty_ms: 0,
            period_ms: st.pwm[channel].period_ms,
        };
    }
}
