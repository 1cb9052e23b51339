//! Property tests for the arithmetic the hardware depends on.
//!
//! Runs on the host only; proptest explores the input spaces the unit
//! tests spot-check.

use embedded_hal::i2c::{ErrorKind, I2c, Operation};
use iohat::battery::level_from_voltage;
use iohat::bus::RegisterBus;
use iohat::pwm::{duty_to_raw, prescaler_for_period};
use iohat::registers::{BATTERY_MAX_MV, BATTERY_MIN_MV, PWM_RAW_MAX};
use iohat::ShutdownRequest;
use proptest::prelude::*;

proptest! {
    /// Every accepted period derives a prescaler the 16-bit register can
    /// hold, and never the hardware-illegal zero.
    #[test]
    fn prescaler_stays_within_register_range(period in 1u32..=1_000_000) {
        let prescaler = prescaler_for_period(period).unwrap();
        prop_assert!((1..=65_535).contains(&prescaler));
    }

    /// Periods long enough to underflow the derived frequency are rejected,
    /// not misprogrammed.
    #[test]
    fn overlong_periods_are_rejected(period in 1_000_001u32..=u32::MAX) {
        prop_assert!(prescaler_for_period(period).is_err());
    }

    /// A duty request never overruns the timer's full scale.
    #[test]
    fn raw_duty_stays_within_full_scale(
        period in 1u32..=1_000_000,
        numerator in 0u32..=1_000_000,
    ) {
        let duty = numerator % (period + 1); // duty <= period
        prop_assert!(u32::from(duty_to_raw(duty, period)) <= PWM_RAW_MAX);
    }

    /// More requested on-time never yields a smaller raw value.
    #[test]
    fn raw_duty_is_monotone(
        period in 1u32..=1_000_000,
        a in 0u32..=1_000_000,
        b in 0u32..=1_000_000,
    ) {
        let a = a % (period + 1);
        let b = b % (period + 1);
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(duty_to_raw(lo, period) <= duty_to_raw(hi, period));
    }

    /// The gauge is clamped to 0..=100 and monotone in voltage.
    #[test]
    fn battery_level_is_clamped_and_monotone(v1 in 0u32..=20_000, v2 in 0u32..=20_000) {
        let l1 = level_from_voltage(v1, BATTERY_MIN_MV, BATTERY_MAX_MV);
        let l2 = level_from_voltage(v2, BATTERY_MIN_MV, BATTERY_MAX_MV);
        prop_assert!(l1 <= 100 && l2 <= 100);
        if v1 <= v2 {
            prop_assert!(l1 <= l2);
        }
    }

    /// Writing then reading any word with the same endianness flag is the
    /// identity, and the opposite flag sees the swapped view.
    #[test]
    fn word_round_trip_preserves_value(value: u16, big_endian: bool) {
        let mut bus = RegisterBus::new(WordCell::default(), 0x17);
        bus.write_word(0x40, value, big_endian).unwrap();
        prop_assert_eq!(bus.read_word(0x40, big_endian).unwrap(), value);
        prop_assert_eq!(
            bus.read_word(0x40, !big_endian).unwrap(),
            value.swap_bytes()
        );
    }

    /// Decoding a shutdown byte is total, and only zero means idle.
    #[test]
    fn shutdown_codes_decode_totally(raw: u8) {
        let request = ShutdownRequest::from_raw(raw);
        prop_assert_eq!(request == ShutdownRequest::None, raw == 0);
    }
}

/// Two-byte register cell for the transport round-trip property.
#[derive(Default)]
struct WordCell {
    bytes: [u8; 2],
}

#[derive(Debug)]
struct NoFault;

impl embedded_hal::i2c::Error for NoFault {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

impl embedded_hal::i2c::ErrorType for WordCell {
    type Error = NoFault;
}

impl I2c for WordCell {
    fn transaction(
        &mut self,
        _address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        for op in operations.iter_mut() {
            match op {
                Operation::Write(data) => {
                    if data.len() > 1 {
                        self.bytes.copy_from_slice(&data[1..]);
                    }
                }
                Operation::Read(buf) => buf.copy_from_slice(&self.bytes),
            }
        }
        Ok(())
    }
}
