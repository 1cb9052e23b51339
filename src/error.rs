//! Unified error types for the control core.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! callers' error handling uniform. All variants are `Copy` so they can be
//! cheaply passed through the monitors without allocation.

use core::fmt;

use embedded_hal::i2c::ErrorKind;

/// Every fallible operation in the crate funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// An argument is outside the range the hardware accepts.
    /// The `&'static str` names the rejected argument.
    InvalidArgument(&'static str),
    /// The underlying bus transaction did not complete.
    Bus(ErrorKind),
    /// A duty cycle was requested on a channel that is not enabled.
    NotEnabled,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument(msg) => write!(f, "invalid argument: {msg}"),
            Self::Bus(kind) => write!(f, "bus: {kind}"),
            Self::NotEnabled => write!(f, "channel not enabled"),
        }
    }
}

impl core::error::Error for Error {}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self::Bus(kind)
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
