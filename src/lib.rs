//! Async register-level driver for the TI INA3221 three-channel shunt and
//! bus voltage monitor.
//!
//! This crate talks to the INA3221 over any `embedded-hal-async` I2C bus,
//! converts between volts and the device's fixed-point register format, and
//! sequences the transfers needed to bring the device up and read it.
//!
//! # Architecture
//!
//! - **[`codec`]** — Pure conversions between typed values ([`Config`],
//!   [`MaskEnable`], volts) and 16-bit register images. No I/O.
//! - **`driver`** (crate-private) — Register protocol primitives: big-endian
//!   values, register pointer handling, and the repeated-register fast path
//!   that skips the pointer write when the device already points at the
//!   requested register.
//! - **[`Ina3221`]** (public) — Validated, high-level API: bring-up,
//!   measurements, alert and power-valid limits.
//!
//! # Quick start
//!
//! ```no_run
//! use ina3221_driver::{Config, Ina3221, DEFAULT_ADDRESS};
//!
//! # async fn example(i2c: impl embedded_hal_async::i2c::I2c) -> Result<(), ()> {
//! let mut monitor = Ina3221::new(i2c, DEFAULT_ADDRESS);
//! monitor.init(Config::default()).await.map_err(|_| ())?;
//!
//! // Alert when channel 1 draws more than 50 mV across its shunt.
//! monitor.set_shunt_warning_limit(1, 0.050).await.map_err(|_| ())?;
//!
//! let bus = monitor.read_all_bus_voltages().await.map_err(|_| ())?;
//! # Ok(())
//! # }
//! ```
//!
//! # Concurrency
//!
//! Every method takes `&mut self` and returns only once its transfers have
//! completed. Share one device between tasks by putting the driver behind a
//! mutex; transfers of two callers must not interleave, because the driver
//! relies on the device's register pointer between calls.
//!
//! # Features
//!
//! - **`defmt`** — Enable [`defmt::Format`] implementations on public types
//!   and driver log messages for embedded logging.

#![no_std]

pub mod codec;
pub mod registers;

mod device;
mod driver;
mod error;
mod types;

pub use codec::{VoltageRegister, VoltageScale};
pub use device::Ina3221;
pub use error::Ina3221Error;
pub use registers::{CHANNEL_COUNT, DEFAULT_ADDRESS};
pub use types::{Address, AveragingMode, Config, ConversionTime, MaskEnable, OperatingMode};
