//! Register transport over the expansion MCU's I2C command interface.
//!
//! Every operation is exactly one bus transaction; there is no queuing,
//! batching, or retry at this layer — retry policy belongs to the caller.
//!
//! ## Endianness
//!
//! The wire primitive is little-endian (low byte at the command address).
//! Registers documented as big-endian get a pure byte swap on the way in
//! and out; the numeric value is never reinterpreted.

use embedded_hal::i2c::{Error as I2cError, I2c};
use log::error;

use crate::error::{Error, Result};

/// Largest block transfer the command interface accepts.
pub const MAX_BLOCK_LEN: usize = 32;

/// One I2C command endpoint: a bus handle bound to a 7-bit address.
pub struct RegisterBus<I2C> {
    i2c: I2C,
    addr: u8,
}

impl<I2C: I2c> RegisterBus<I2C> {
    pub fn new(i2c: I2C, addr: u8) -> Self {
        Self { i2c, addr }
    }

    /// Read a single byte register.
    pub fn read_byte(&mut self, reg: u8) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.i2c
            .write_read(self.addr, &[reg], &mut buf)
            .map_err(|e| fail("read byte", reg, &e))?;
        Ok(buf[0])
    }

    /// Write a single byte register.
    pub fn write_byte(&mut self, reg: u8, value: u8) -> Result<()> {
        self.i2c
            .write(self.addr, &[reg, value])
            .map_err(|e| fail("write byte", reg, &e))
    }

    /// Read a 16-bit register, optionally byte-swapped.
    pub fn read_word(&mut self, reg: u8, big_endian: bool) -> Result<u16> {
        let mut buf = [0u8; 2];
        self.i2c
            .write_read(self.addr, &[reg], &mut buf)
            .map_err(|e| fail("read word", reg, &e))?;
        let value = u16::from_le_bytes(buf);
        Ok(if big_endian { value.swap_bytes() } else { value })
    }

    /// Write a 16-bit register, optionally byte-swapped.
    pub fn write_word(&mut self, reg: u8, value: u16, big_endian: bool) -> Result<()> {
        let wire = if big_endian { value.swap_bytes() } else { value };
        let bytes = wire.to_le_bytes();
        self.i2c
            .write(self.addr, &[reg, bytes[0], bytes[1]])
            .map_err(|e| fail("write word", reg, &e))
    }

    /// Read `len` consecutive byte registers starting at `reg`.
    /// `len` must be in `1..=32`; the length is validated before any bus
    /// traffic.
    pub fn read_block(&mut self, reg: u8, len: usize) -> Result<heapless::Vec<u8, MAX_BLOCK_LEN>> {
        if len == 0 || len > MAX_BLOCK_LEN {
            return Err(Error::InvalidArgument("block length must be 1..=32"));
        }
        let mut buf = heapless::Vec::new();
        // Length is within capacity, checked above.
        let _ = buf.resize(len, 0);
        self.i2c
            .write_read(self.addr, &[reg], &mut buf)
            .map_err(|e| fail("read block", reg, &e))?;
        Ok(buf)
    }
}

fn fail<E: I2cError>(op: &str, reg: u8, e: &E) -> Error {
    let kind = e.kind();
    error!("I2C {op} at 0x{reg:02X} failed: {kind}");
    Error::Bus(kind)
}
