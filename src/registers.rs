//! INA3221 register map and device constants.
//!
//! Every register is 16 bits wide and transmitted MSB first. Per-channel
//! registers repeat with a period of two addresses:
//! `base + REGISTER_PERIOD * (channel - 1)`.

// ---------------------------------------------------------------------------
// Single registers
// ---------------------------------------------------------------------------

/// Configuration register (see [`Config`](crate::Config)).
pub const REG_CONFIG: u8 = 0x00;

/// Sum of the shunt voltages of every channel selected by the SCC bits.
pub const REG_SHUNT_VOLTAGE_SUM: u8 = 0x0D;

/// Limit compared against [`REG_SHUNT_VOLTAGE_SUM`].
pub const REG_SHUNT_VOLTAGE_SUM_LIMIT: u8 = 0x0E;

/// Mask/Enable register (see [`MaskEnable`](crate::MaskEnable)).
pub const REG_MASK_ENABLE: u8 = 0x0F;

/// Power-valid upper limit (bus voltage scale).
pub const REG_POWER_VALID_UPPER: u8 = 0x10;

/// Power-valid lower limit (bus voltage scale).
pub const REG_POWER_VALID_LOWER: u8 = 0x11;

/// Manufacturer ID register, reads [`MANUFACTURER_ID`].
pub const REG_MANUFACTURER_ID: u8 = 0xFE;

/// Die ID register, reads [`DIE_ID`].
pub const REG_DIE_ID: u8 = 0xFF;

// ---------------------------------------------------------------------------
// Per-channel registers (base addresses for channel 1)
// ---------------------------------------------------------------------------

pub const REG_SHUNT_VOLTAGE_BASE: u8 = 0x01;
pub const REG_BUS_VOLTAGE_BASE: u8 = 0x02;
pub const REG_CRITICAL_LIMIT_BASE: u8 = 0x07;
pub const REG_WARNING_LIMIT_BASE: u8 = 0x08;

/// Address distance between the same register of two adjacent channels.
pub const REGISTER_PERIOD: u8 = 2;

// ---------------------------------------------------------------------------
// Device constants
// ---------------------------------------------------------------------------

/// Expected content of [`REG_DIE_ID`].
pub const DIE_ID: u16 = 0x3220;

/// Expected content of [`REG_MANUFACTURER_ID`] ("TI" in ASCII).
pub const MANUFACTURER_ID: u16 = 0x5449;

/// Number of measurement channels. Channels are numbered 1 to 3.
pub const CHANNEL_COUNT: u8 = 3;

/// Default I2C address (A0 tied to GND).
pub const DEFAULT_ADDRESS: u8 = 0x40;

/// Power-on value of the power-valid upper limit, in volts.
pub const POWER_VALID_UPPER_DEFAULT_V: f32 = 10.0;

/// Power-on value of the power-valid lower limit, in volts.
pub const POWER_VALID_LOWER_DEFAULT_V: f32 = 9.0;

/// Register address of `channel` in a per-channel register family.
///
/// The caller is responsible for validating `channel` (1–3) first.
pub(crate) const fn channel_register(base: u8, channel: u8) -> u8 {
    base + REGISTER_PERIOD * (channel - 1)
}
