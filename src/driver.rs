//! Low-level register access.
//!
//! Implements the INA3221 register protocol on top of an async I2C bus:
//! big-endian 16-bit values, a one-byte register pointer, and the
//! repeated-register fast path that skips the pointer write when the
//! device already points at the requested register.
//!
//! This module is crate-private. Consumers interact with [`Ina3221`]
//! in `device.rs` instead.
//!
//! [`Ina3221`]: crate::Ina3221

use embedded_hal_async::i2c::I2c;

use crate::error::Ina3221Error;

/// Register-level INA3221 protocol driver.
///
/// Owns the I2C peripheral and remembers which register the device's
/// internal pointer was last set to.
pub(crate) struct RegisterDriver<I2C> {
    i2c: I2C,
    address: u8,
    /// Register the device pointer is known to hold. `None` when unknown:
    /// after construction and after any failed transfer.
    last_register: Option<u8>,
}

impl<I2C> RegisterDriver<I2C>
where
    I2C: I2c,
{
    /// Create a new register driver. No I2C traffic is generated.
    ///
    /// # Arguments
    /// * `i2c` — I2C peripheral (takes ownership for exclusive access)
    /// * `address` — 7-bit I2C device address (0x40–0x43)
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self {
            i2c,
            address,
            last_register: None,
        }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// Register the next read will reuse without re-addressing, if any.
    #[cfg(test)]
    pub fn last_register(&self) -> Option<u8> {
        self.last_register
    }

    /// Forget the cached register pointer so the next read re-addresses.
    pub fn invalidate(&mut self) {
        self.last_register = None;
    }

    /// Give back the I2C peripheral.
    pub fn release(self) -> I2C {
        self.i2c
    }

    // -----------------------------------------------------------------------
    // Core protocol primitives
    // -----------------------------------------------------------------------

    /// Read a 16-bit register.
    ///
    /// If the device pointer already holds `register`, only the two data
    /// bytes are read. Otherwise the pointer is written and the data read
    /// back behind a repeated start, without releasing the bus in between.
    pub async fn read_u16(&mut self, register: u8) -> Result<u16, Ina3221Error<I2C::Error>> {
        let mut buf = [0u8; 2];

        let result = if self.last_register == Some(register) {
            self.i2c.read(self.address, &mut buf).await
        } else {
            self.i2c.write_read(self.address, &[register], &mut buf).await
        };
        self.track(register, result)?;

        Ok(u16::from_be_bytes(buf))
    }

    /// Write a 16-bit register.
    ///
    /// Sends the register pointer and the big-endian value in a single
    /// framed transfer: `[register, msb, lsb]`.
    pub async fn write_u16(
        &mut self,
        register: u8,
        value: u16,
    ) -> Result<(), Ina3221Error<I2C::Error>> {
        let [msb, lsb] = value.to_be_bytes();
        let result = self.i2c.write(self.address, &[register, msb, lsb]).await;
        self.track(register, result)
    }

    /// Update the pointer cache after a transfer addressed at `register`.
    fn track(
        &mut self,
        register: u8,
        result: Result<(), I2C::Error>,
    ) -> Result<(), Ina3221Error<I2C::Error>> {
        match result {
            Ok(()) => {
                self.last_register = Some(register);
                Ok(())
            }
            Err(e) => {
                // The pointer may or may not have moved; force re-addressing.
                self.last_register = None;
                #[cfg(feature = "defmt")]
                defmt::debug!("INA3221: transfer at register {=u8:#x} failed", register);
                Err(Ina3221Error::I2c(e))
            }
        }
    }
}
