//! Control core for the IoHat peripheral-expansion board.
//!
//! The board's MCU exposes analog inputs, battery telemetry, a button, an
//! LED, a speaker, 12 PWM outputs on 3 shared timers, and a shutdown
//! request flag, all behind 8-bit command registers on I2C. This crate is
//! the host-side core: the serialized register transport, the cached
//! device state, the PWM timer arithmetic, and the periodic
//! battery/button/shutdown monitors. Host-framework adapters (sysfs,
//! power-supply, input events) sit outside and consume the public API.
//!
//! ```no_run
//! use iohat::{Hat, HatConfig};
//!
//! fn attach<I2C>(i2c: I2C) -> iohat::Result<()>
//! where
//!     I2C: embedded_hal::i2c::I2c + Send + 'static,
//! {
//!     let hat = Hat::open(i2c, HatConfig::default())?;
//!
//!     let servo = hat.pwm(0)?;
//!     servo.set_period(20_000)?;
//!     servo.set_enabled(true)?;
//!     servo.set_duty(1_500)?;
//!
//!     let monitor = iohat::monitor::spawn(
//!         hat.clone(),
//!         hat.config(),
//!         iohat::events::ChannelSink,
//!         HostPowerOff,
//!     );
//!
//!     // ... serve configuration calls, drain iohat::events ...
//!
//!     monitor.stop();
//!     hat.teardown();
//!     Ok(())
//! }
//!
//! struct HostPowerOff;
//! impl iohat::PowerOff for HostPowerOff {
//!     fn power_off(&mut self, reason: iohat::ShutdownRequest) {
//!         log::error!("powering off: {reason}");
//!     }
//! }
//! ```

#![deny(unused_must_use)]

pub mod battery;
pub mod bus;
pub mod button;
pub mod config;
pub mod device;
pub mod events;
pub mod monitor;
pub mod ports;
pub mod pwm;
pub mod registers;
pub mod shutdown;

mod error;

pub use config::HatConfig;
pub use device::{BatterySnapshot, FirmwareVersion, Hat, PwmChannelState};
pub use error::{Error, Result};
pub use monitor::MonitorHandle;
pub use ports::{EventSink, HatEvent, NullSink, PowerOff};
pub use pwm::PwmChannel;
pub use shutdown::ShutdownRequest;
