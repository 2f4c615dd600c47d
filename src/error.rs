//! Error types for the INA3221 driver.

use core::fmt;

/// Errors that can occur when talking to the INA3221.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ina3221Error<E> {
    /// Underlying I2C bus error. The transfer did not complete.
    I2c(E),

    /// The die ID register did not hold the INA3221 signature.
    /// Carries the value that was read.
    InvalidVendor(u16),

    /// Channel index out of valid range (must be 1–3).
    InvalidChannel,

    /// A full-scale voltage override was not finite and positive.
    InvalidScale,

    /// A register operation was attempted before
    /// [`Ina3221::init()`](crate::Ina3221::init) succeeded.
    NotInitialized,
}

// Allow ergonomic `?` propagation from raw I2C errors.
impl<E> From<E> for Ina3221Error<E> {
    fn from(error: E) -> Self {
        Ina3221Error::I2c(error)
    }
}

impl<E: fmt::Debug> fmt::Display for Ina3221Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Ina3221Error::I2c(e) => write!(f, "I2C error: {:?}", e),
            Ina3221Error::InvalidVendor(id) => {
                write!(f, "Unexpected die ID 0x{:04X} (not an INA3221)", id)
            }
            Ina3221Error::InvalidChannel => write!(f, "Invalid channel (must be 1-3)"),
            Ina3221Error::InvalidScale => write!(f, "Full-scale voltage must be positive"),
            Ina3221Error::NotInitialized => write!(f, "Device not initialized"),
        }
    }
}

#[cfg(feature = "defmt")]
impl<E: defmt::Format> defmt::Format for Ina3221Error<E> {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Ina3221Error::I2c(e) => defmt::write!(f, "I2C error: {}", e),
            Ina3221Error::InvalidVendor(id) => defmt::write!(f, "Invalid die ID {=u16:#x}", id),
            Ina3221Error::InvalidChannel => defmt::write!(f, "Invalid channel"),
            Ina3221Error::InvalidScale => defmt::write!(f, "Invalid full scale"),
            Ina3221Error::NotInitialized => defmt::write!(f, "Not initialized"),
        }
    }
}
