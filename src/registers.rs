//! Command-register map of the expansion-board MCU.
//!
//! Single source of truth — every subsystem references this module rather
//! than hard-coding command bytes. 16-bit quantities occupy two consecutive
//! command addresses (high byte first on the wire when the register is
//! big-endian), so word registers step in strides of two.

/// Default 7-bit I2C address of the expansion MCU.
pub const DEFAULT_I2C_ADDR: u8 = 0x17;

// ---------------------------------------------------------------------------
// System
// ---------------------------------------------------------------------------

/// Firmware version, 3 consecutive bytes: major, minor, patch.
pub const REG_FIRMWARE_VERSION: u8 = 0x05;

// ---------------------------------------------------------------------------
// Analog inputs
// ---------------------------------------------------------------------------

/// First ADC channel, 16-bit big-endian, two registers per channel.
pub const REG_ADC_BASE: u8 = 0x10;
/// Battery ADC, 16-bit. The firmware reports this one little-endian.
pub const REG_BATTERY_ADC: u8 = 0x18;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Button status byte, bit 0 = pressed.
pub const REG_BUTTON_STATUS: u8 = 0x24;
/// Charging status byte, nonzero = charging.
pub const REG_CHARGING_STATUS: u8 = 0x25;
/// Shutdown request byte: 0 none, 1 low battery, 2 button held.
pub const REG_SHUTDOWN_STATUS: u8 = 0x26;

// ---------------------------------------------------------------------------
// Control
// ---------------------------------------------------------------------------

/// LED control byte, 0/1.
pub const REG_LED_CTRL: u8 = 0x30;
/// Speaker control byte, 0/1.
pub const REG_SPEAKER_CTRL: u8 = 0x31;

// ---------------------------------------------------------------------------
// PWM timers and channels
// ---------------------------------------------------------------------------

/// Timer 0 prescaler, 16-bit big-endian; timers step by 2.
pub const REG_TIMER_PRESCALER_BASE: u8 = 0x40;
/// Timer 0 period, 16-bit big-endian; timers step by 2.
pub const REG_TIMER_PERIOD_BASE: u8 = 0x50;
/// PWM channel 0 duty, 16-bit big-endian; channels step by 2.
pub const REG_PWM_DUTY_BASE: u8 = 0x60;

/// Number of analog input channels.
pub const ADC_CHANNELS: usize = 4;
/// Number of PWM output channels.
pub const PWM_CHANNELS: usize = 12;
/// Number of hardware timers; each serves four consecutive PWM channels.
pub const PWM_TIMERS: usize = 3;

// ---------------------------------------------------------------------------
// Hardware constants
// ---------------------------------------------------------------------------

/// ADC reference voltage in millivolts.
pub const ADC_REFERENCE_MV: u32 = 3300;
/// ADC full-scale reading (12-bit).
pub const ADC_MAX_VALUE: u32 = 4095;
/// Battery sense voltage-divider ratio.
pub const BATTERY_DIVIDER: u32 = 3;
/// Battery voltage mapped to 0%.
pub const BATTERY_MIN_MV: u32 = 6400;
/// Battery voltage mapped to 100%.
pub const BATTERY_MAX_MV: u32 = 8400;

/// Core clock feeding the PWM timers.
pub const PWM_CORE_CLOCK_HZ: u32 = 72_000_000;
/// Full-scale value of the timer period / duty registers.
pub const PWM_RAW_MAX: u32 = 4095;
/// Period each channel reports before the first `set_period` call.
pub const PWM_DEFAULT_PERIOD: u32 = 20_000;
/// Prescaler written at probe time; yields 50 Hz with the default period
/// register.
pub const PWM_DEFAULT_PRESCALER: u16 = 350;

// ---------------------------------------------------------------------------
// Addressing helpers
// ---------------------------------------------------------------------------

/// Command address of ADC channel `channel`'s 16-bit reading.
pub const fn adc_reg(channel: usize) -> u8 {
    REG_ADC_BASE + 2 * channel as u8
}

/// Timer serving PWM channel `channel` (channels 0-3 → timer 0, 4-7 → 1,
/// 8-11 → 2).
pub const fn timer_index(channel: usize) -> usize {
    channel / 4
}

/// Command address of timer `timer`'s prescaler register.
pub const fn timer_prescaler_reg(timer: usize) -> u8 {
    REG_TIMER_PRESCALER_BASE + 2 * timer as u8
}

/// Command address of timer `timer`'s period register.
pub const fn timer_period_reg(timer: usize) -> u8 {
    REG_TIMER_PERIOD_BASE + 2 * timer as u8
}

/// Command address of PWM channel `channel`'s duty register.
pub const fn pwm_duty_reg(channel: usize) -> u8 {
    REG_PWM_DUTY_BASE + 2 * channel as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adc_addresses_step_by_two() {
        assert_eq!(adc_reg(0), 0x10);
        assert_eq!(adc_reg(1), 0x12);
        assert_eq!(adc_reg(3), 0x16);
    }

    #[test]
    fn timer_addresses_match_map() {
        assert_eq!(timer_prescaler_reg(0), 0x40);
        assert_eq!(timer_prescaler_reg(1), 0x42);
        assert_eq!(timer_prescaler_reg(2), 0x44);
        assert_eq!(timer_period_reg(0), 0x50);
        assert_eq!(timer_period_reg(2), 0x54);
    }

    #[test]
    fn duty_addresses_cover_all_channels() {
        assert_eq!(pwm_duty_reg(0), 0x60);
        assert_eq!(pwm_duty_reg(11), 0x76);
    }

    #[test]
    fn channels_map_onto_three_timers() {
        assert_eq!(timer_index(0), 0);
        assert_eq!(timer_index(3), 0);
        assert_eq!(timer_index(4), 1);
        assert_eq!(timer_index(7), 1);
        assert_eq!(timer_index(8), 2);
        assert_eq!(timer_index(11), 2);
    }

    #[test]
    fn default_prescaler_matches_default_period() {
        // 72 MHz / 50 Hz / 4096 - 1
        let freq = 1_000_000 / PWM_DEFAULT_PERIOD;
        let prescaler = PWM_CORE_CLOCK_HZ / freq / (PWM_RAW_MAX + 1) - 1;
        assert_eq!(prescaler, u32::from(PWM_DEFAULT_PRESCALER));
    }

    #[test]
    fn word_regions_do_not_overlap() {
        assert!(adc_reg(ADC_CHANNELS - 1) + 1 < REG_BATTERY_ADC + 2);
        assert!(timer_prescaler_reg(PWM_TIMERS - 1) + 1 < REG_TIMER_PERIOD_BASE);
        assert!(timer_period_reg(PWM_TIMERS - 1) + 1 < REG_PWM_DUTY_BASE);
    }
}
