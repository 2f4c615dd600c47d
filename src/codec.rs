//! Register codec: pure conversions between typed values and 16-bit
//! register images.
//!
//! Nothing here touches the bus. The session in [`crate::device`] uses these
//! functions on every read and write, and they are public so that callers can
//! decode register dumps or precompute limit values offline.
//!
//! # Voltage encoding
//!
//! Voltage registers hold a 12-bit magnitude shifted left by
//! [`VoltageScale::shift()`] bits, with the low padding bits zero. The sign is
//! carried in bit 15 as `0x8000 | magnitude`, not as a bitwise complement.
//! The magnitude `full_scale_code` corresponds to `full_scale_volts`.

use crate::registers::{
    REG_BUS_VOLTAGE_BASE, REG_CRITICAL_LIMIT_BASE, REG_POWER_VALID_LOWER, REG_POWER_VALID_UPPER,
    REG_SHUNT_VOLTAGE_BASE, REG_SHUNT_VOLTAGE_SUM, REG_SHUNT_VOLTAGE_SUM_LIMIT,
    REG_WARNING_LIMIT_BASE,
};
use crate::types::{AveragingMode, Config, ConversionTime, MaskEnable, OperatingMode};

// ---------------------------------------------------------------------------
// Scaling constants
// ---------------------------------------------------------------------------

/// Largest register magnitude before the padding shift.
pub const FULL_SCALE_CODE: i16 = 0x0FFF;

/// Bus voltage at [`FULL_SCALE_CODE`] (8 mV per code).
pub const BUS_FULL_SCALE_V: f32 = 32.76;

/// Shunt voltage at [`FULL_SCALE_CODE`] (40 µV per code).
pub const SHUNT_FULL_SCALE_V: f32 = 0.1638;

/// Scaled values this close to a whole code are treated as that code, so a
/// voltage obtained from [`register_to_voltage`] encodes back to the same
/// register despite float rounding.
const CODE_SNAP_TOLERANCE: f64 = 1e-3;

/// Full-scale reference of one voltage register family.
///
/// Fields are checked on construction, so every `VoltageScale` encodes its
/// full-scale code within the 15 magnitude bits of a register.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VoltageScale {
    full_scale_volts: f32,
    full_scale_code: i16,
    shift: u8,
}

impl VoltageScale {
    pub const BUS: Self = Self {
        full_scale_volts: BUS_FULL_SCALE_V,
        full_scale_code: FULL_SCALE_CODE,
        shift: 3,
    };

    pub const SHUNT: Self = Self {
        full_scale_volts: SHUNT_FULL_SCALE_V,
        full_scale_code: FULL_SCALE_CODE,
        shift: 3,
    };

    /// Shunt-voltage sum and sum limit registers.
    pub const SHUNT_SUM: Self = Self {
        full_scale_volts: SHUNT_FULL_SCALE_V,
        full_scale_code: FULL_SCALE_CODE,
        shift: 2,
    };

    /// Build a custom scale.
    ///
    /// Returns `None` unless `full_scale_volts` is finite and positive,
    /// `full_scale_code` is positive and `full_scale_code << shift` fits in
    /// the 15 magnitude bits.
    pub fn new(full_scale_volts: f32, full_scale_code: i16, shift: u8) -> Option<Self> {
        if !full_scale_volts.is_finite() || full_scale_volts <= 0.0 {
            return None;
        }
        if full_scale_code <= 0 || shift >= 15 {
            return None;
        }
        if (full_scale_code as u16) > (0x7FFF >> shift) {
            return None;
        }
        Some(Self {
            full_scale_volts,
            full_scale_code,
            shift,
        })
    }

    /// Same code range and padding, different physical full scale.
    pub fn with_full_scale_volts(self, full_scale_volts: f32) -> Option<Self> {
        Self::new(full_scale_volts, self.full_scale_code, self.shift)
    }

    /// Physical voltage represented by [`full_scale_code()`](Self::full_scale_code).
    pub const fn full_scale_volts(&self) -> f32 {
        self.full_scale_volts
    }

    pub const fn full_scale_code(&self) -> i16 {
        self.full_scale_code
    }

    /// Number of unused low bits below the magnitude.
    pub const fn shift(&self) -> u8 {
        self.shift
    }

    /// Bits of the register that carry sign and magnitude.
    pub const fn mask(&self) -> u16 {
        0xFFFF << self.shift
    }

    /// Voltage represented by one code step.
    pub fn lsb_volts(&self) -> f32 {
        self.full_scale_volts / self.full_scale_code as f32
    }
}

/// Every register that holds a voltage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VoltageRegister {
    ShuntVoltage,
    BusVoltage,
    ShuntCriticalLimit,
    ShuntWarningLimit,
    ShuntVoltageSum,
    ShuntVoltageSumLimit,
    PowerValidUpper,
    PowerValidLower,
}

/// Scale of each [`VoltageRegister`], indexed by discriminant.
const SCALE_TABLE: [VoltageScale; 8] = [
    VoltageScale::SHUNT,     // ShuntVoltage
    VoltageScale::BUS,       // BusVoltage
    VoltageScale::SHUNT,     // ShuntCriticalLimit
    VoltageScale::SHUNT,     // ShuntWarningLimit
    VoltageScale::SHUNT_SUM, // ShuntVoltageSum
    VoltageScale::SHUNT_SUM, // ShuntVoltageSumLimit
    VoltageScale::BUS,       // PowerValidUpper
    VoltageScale::BUS,       // PowerValidLower
];

impl VoltageRegister {
    pub const fn scale(self) -> VoltageScale {
        SCALE_TABLE[self as usize]
    }

    /// Register address, or the channel 1 address for per-channel registers.
    pub const fn base_address(self) -> u8 {
        match self {
            Self::ShuntVoltage => REG_SHUNT_VOLTAGE_BASE,
            Self::BusVoltage => REG_BUS_VOLTAGE_BASE,
            Self::ShuntCriticalLimit => REG_CRITICAL_LIMIT_BASE,
            Self::ShuntWarningLimit => REG_WARNING_LIMIT_BASE,
            Self::ShuntVoltageSum => REG_SHUNT_VOLTAGE_SUM,
            Self::ShuntVoltageSumLimit => REG_SHUNT_VOLTAGE_SUM_LIMIT,
            Self::PowerValidUpper => REG_POWER_VALID_UPPER,
            Self::PowerValidLower => REG_POWER_VALID_LOWER,
        }
    }
}

// ---------------------------------------------------------------------------
// Voltage registers
// ---------------------------------------------------------------------------

/// Encode `volts` into a voltage register image.
///
/// Out-of-range inputs saturate at ± full scale; NaN encodes as zero. The
/// scaled value is truncated toward zero.
pub fn voltage_to_register(volts: f32, scale: VoltageScale) -> u16 {
    let full_scale = f64::from(scale.full_scale_volts);
    let clamped = if volts.is_nan() {
        0.0
    } else {
        f64::from(volts).max(-full_scale).min(full_scale)
    };

    let raw = truncate_to_code(clamped * f64::from(scale.full_scale_code) / full_scale);
    let magnitude = ((raw.unsigned_abs() << u32::from(scale.shift)) & 0x7FFF) as u16;
    let signed = if raw < 0 { 0x8000 | magnitude } else { magnitude };

    signed & scale.mask()
}

/// Decode a voltage register image into volts.
pub fn register_to_voltage(bits: u16, scale: VoltageScale) -> f32 {
    let masked = bits & scale.mask();
    let magnitude = i32::from(masked & 0x7FFF) >> scale.shift;
    let raw = if masked & 0x8000 != 0 { -magnitude } else { magnitude };

    (f64::from(scale.full_scale_volts) * f64::from(raw) / f64::from(scale.full_scale_code)) as f32
}

fn truncate_to_code(scaled: f64) -> i32 {
    let truncated = scaled as i32;
    let fraction = scaled - f64::from(truncated);
    if fraction > 1.0 - CODE_SNAP_TOLERANCE {
        truncated + 1
    } else if fraction < CODE_SNAP_TOLERANCE - 1.0 {
        truncated - 1
    } else {
        truncated
    }
}

// ---------------------------------------------------------------------------
// Configuration register
// ---------------------------------------------------------------------------

const CONFIG_MODE_SHIFT: u16 = 0;
const CONFIG_SHUNT_CT_SHIFT: u16 = 3;
const CONFIG_BUS_CT_SHIFT: u16 = 6;
const CONFIG_AVG_SHIFT: u16 = 9;
const CONFIG_CH3_EN: u16 = 1 << 12;
const CONFIG_CH2_EN: u16 = 1 << 13;
const CONFIG_CH1_EN: u16 = 1 << 14;
const CONFIG_RESET: u16 = 1 << 15;

pub fn pack_config(config: &Config) -> u16 {
    let mut bits = 0u16;
    bits |= (config.mode as u16) << CONFIG_MODE_SHIFT;
    bits |= (config.shunt_conversion_time as u16) << CONFIG_SHUNT_CT_SHIFT;
    bits |= (config.bus_conversion_time as u16) << CONFIG_BUS_CT_SHIFT;
    bits |= (config.averaging as u16) << CONFIG_AVG_SHIFT;
    bits |= flag(config.channel3_enable, CONFIG_CH3_EN);
    bits |= flag(config.channel2_enable, CONFIG_CH2_EN);
    bits |= flag(config.channel1_enable, CONFIG_CH1_EN);
    bits |= flag(config.reset, CONFIG_RESET);
    bits
}

pub fn unpack_config(bits: u16) -> Config {
    Config {
        mode: OperatingMode::from_bits(bits >> CONFIG_MODE_SHIFT),
        shunt_conversion_time: ConversionTime::from_bits(bits >> CONFIG_SHUNT_CT_SHIFT),
        bus_conversion_time: ConversionTime::from_bits(bits >> CONFIG_BUS_CT_SHIFT),
        averaging: AveragingMode::from_bits(bits >> CONFIG_AVG_SHIFT),
        channel3_enable: bits & CONFIG_CH3_EN != 0,
        channel2_enable: bits & CONFIG_CH2_EN != 0,
        channel1_enable: bits & CONFIG_CH1_EN != 0,
        reset: bits & CONFIG_RESET != 0,
    }
}

// ---------------------------------------------------------------------------
// Mask/Enable register
// ---------------------------------------------------------------------------

const ME_CVRF: u16 = 1 << 0;
const ME_TCF: u16 = 1 << 1;
const ME_PVF: u16 = 1 << 2;
const ME_WF3: u16 = 1 << 3;
const ME_WF2: u16 = 1 << 4;
const ME_WF1: u16 = 1 << 5;
const ME_SF: u16 = 1 << 6;
const ME_CF3: u16 = 1 << 7;
const ME_CF2: u16 = 1 << 8;
const ME_CF1: u16 = 1 << 9;
const ME_CEN: u16 = 1 << 10;
const ME_WEN: u16 = 1 << 11;
const ME_SCC3: u16 = 1 << 12;
const ME_SCC2: u16 = 1 << 13;
const ME_SCC1: u16 = 1 << 14;

pub fn pack_mask_enable(flags: &MaskEnable) -> u16 {
    flag(flags.conversion_ready_flag, ME_CVRF)
        | flag(flags.timing_control_flag, ME_TCF)
        | flag(flags.power_valid_flag, ME_PVF)
        | flag(flags.warning_flag_ch3, ME_WF3)
        | flag(flags.warning_flag_ch2, ME_WF2)
        | flag(flags.warning_flag_ch1, ME_WF1)
        | flag(flags.summation_flag, ME_SF)
        | flag(flags.critical_flag_ch3, ME_CF3)
        | flag(flags.critical_flag_ch2, ME_CF2)
        | flag(flags.critical_flag_ch1, ME_CF1)
        | flag(flags.critical_latch_enable, ME_CEN)
        | flag(flags.warning_latch_enable, ME_WEN)
        | flag(flags.summation_ch3, ME_SCC3)
        | flag(flags.summation_ch2, ME_SCC2)
        | flag(flags.summation_ch1, ME_SCC1)
}

pub fn unpack_mask_enable(bits: u16) -> MaskEnable {
    MaskEnable {
        conversion_ready_flag: bits & ME_CVRF != 0,
        timing_control_flag: bits & ME_TCF != 0,
        power_valid_flag: bits & ME_PVF != 0,
        warning_flag_ch3: bits & ME_WF3 != 0,
        warning_flag_ch2: bits & ME_WF2 != 0,
        warning_flag_ch1: bits & ME_WF1 != 0,
        summation_flag: bits & ME_SF != 0,
        critical_flag_ch3: bits & ME_CF3 != 0,
        critical_flag_ch2: bits & ME_CF2 != 0,
        critical_flag_ch1: bits & ME_CF1 != 0,
        critical_latch_enable: bits & ME_CEN != 0,
        warning_latch_enable: bits & ME_WEN != 0,
        summation_ch3: bits & ME_SCC3 != 0,
        summation_ch2: bits & ME_SCC2 != 0,
        summation_ch1: bits & ME_SCC1 != 0,
    }
}

#[inline]
fn flag(set: bool, bit: u16) -> u16 {
    if set {
        bit
    } else {
        0
    }
}

// ── Unit Tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registers::{POWER_VALID_LOWER_DEFAULT_V, POWER_VALID_UPPER_DEFAULT_V};
    use float_cmp::approx_eq;

    // ── Configuration register ───────────────────────────────────────

    #[test]
    fn default_config_matches_power_on_value() {
        assert_eq!(pack_config(&Config::default()), 0x7127);
        assert_eq!(unpack_config(0x7127), Config::default());
    }

    #[test]
    fn config_field_positions() {
        let config = Config {
            mode: OperatingMode::PowerDown,
            shunt_conversion_time: ConversionTime::Us8244,
            bus_conversion_time: ConversionTime::Us140,
            averaging: AveragingMode::Samples1,
            channel1_enable: false,
            channel2_enable: false,
            channel3_enable: true,
            reset: true,
        };
        assert_eq!(pack_config(&config), 0b1001_0000_0011_1000);
    }

    #[test]
    fn config_round_trips_every_register_value() {
        for bits in 0..=u16::MAX {
            assert_eq!(pack_config(&unpack_config(bits)), bits, "bits {:#06x}", bits);
        }
    }

    // ── Mask/Enable register ─────────────────────────────────────────

    #[test]
    fn default_mask_enable_matches_power_on_value() {
        assert_eq!(pack_mask_enable(&MaskEnable::default()), 0x0002);
    }

    #[test]
    fn mask_enable_round_trips_every_flag_pattern() {
        for bits in 0..0x8000u16 {
            assert_eq!(pack_mask_enable(&unpack_mask_enable(bits)), bits);
        }
    }

    #[test]
    fn mask_enable_ignores_reserved_bit() {
        assert_eq!(unpack_mask_enable(0x8000), unpack_mask_enable(0x0000));
        assert_eq!(pack_mask_enable(&unpack_mask_enable(0xFFFF)), 0x7FFF);
    }

    #[test]
    fn mask_enable_flag_positions() {
        let flags = unpack_mask_enable((1 << 0) | (1 << 5) | (1 << 9) | (1 << 14));
        assert!(flags.conversion_ready_flag);
        assert!(flags.warning_flag_ch1);
        assert!(flags.critical_flag_ch1);
        assert!(flags.summation_ch1);
        assert!(!flags.timing_control_flag);
        assert!(!flags.warning_flag_ch3);
        assert!(!flags.summation_ch3);
    }

    // ── Voltage registers ────────────────────────────────────────────

    #[test]
    fn full_scale_encodings() {
        assert_eq!(voltage_to_register(BUS_FULL_SCALE_V, VoltageScale::BUS), 0x7FF8);
        assert_eq!(voltage_to_register(-BUS_FULL_SCALE_V, VoltageScale::BUS), 0xFFF8);
        assert_eq!(voltage_to_register(SHUNT_FULL_SCALE_V, VoltageScale::SHUNT), 0x7FF8);
        assert_eq!(voltage_to_register(SHUNT_FULL_SCALE_V, VoltageScale::SHUNT_SUM), 0x3FFC);
        assert_eq!(voltage_to_register(0.0, VoltageScale::BUS), 0x0000);
    }

    #[test]
    fn out_of_range_input_saturates() {
        let scale = VoltageScale::BUS;
        let full = voltage_to_register(BUS_FULL_SCALE_V, scale);
        assert_eq!(voltage_to_register(BUS_FULL_SCALE_V + 1.0, scale), full);
        assert_eq!(voltage_to_register(1000.0, scale), full);
        assert_eq!(
            voltage_to_register(-BUS_FULL_SCALE_V - 1.0, scale),
            voltage_to_register(-BUS_FULL_SCALE_V, scale)
        );
    }

    #[test]
    fn nan_encodes_as_zero() {
        assert_eq!(voltage_to_register(f32::NAN, VoltageScale::SHUNT), 0x0000);
    }

    #[test]
    fn negative_values_use_sign_bit_and_magnitude() {
        // 1500 codes of 8 mV = 12 V, shifted by 3.
        assert_eq!(voltage_to_register(12.0, VoltageScale::BUS), 1500 << 3);
        assert_eq!(voltage_to_register(-12.0, VoltageScale::BUS), 0x8000 | (1500 << 3));
        assert!(approx_eq!(
            f32,
            register_to_voltage(0x8000 | (1500 << 3), VoltageScale::BUS),
            -12.0,
            epsilon = 1e-4
        ));
    }

    #[test]
    fn scaled_value_is_truncated_toward_zero() {
        // 12.0045 V is 1500.5625 codes.
        assert_eq!(voltage_to_register(12.0045, VoltageScale::BUS), 1500 << 3);
        assert_eq!(voltage_to_register(-12.0045, VoltageScale::BUS), 0x8000 | (1500 << 3));
    }

    #[test]
    fn decode_ignores_padding_bits() {
        let scale = VoltageScale::BUS;
        assert_eq!(
            register_to_voltage(0x2717, scale),
            register_to_voltage(0x2710, scale)
        );
        // Negative zero.
        assert_eq!(register_to_voltage(0x8000, scale), 0.0);
    }

    #[test]
    fn power_valid_power_on_values() {
        let upper = register_to_voltage(0x2710, VoltageRegister::PowerValidUpper.scale());
        let lower = register_to_voltage(0x2328, VoltageRegister::PowerValidLower.scale());
        assert!(approx_eq!(f32, upper, POWER_VALID_UPPER_DEFAULT_V, epsilon = 1e-4));
        assert!(approx_eq!(f32, lower, POWER_VALID_LOWER_DEFAULT_V, epsilon = 1e-4));
    }

    #[test]
    fn quantized_voltages_round_trip_exactly() {
        for scale in [VoltageScale::BUS, VoltageScale::SHUNT, VoltageScale::SHUNT_SUM] {
            for code in 0..=i32::from(FULL_SCALE_CODE) {
                for raw in [code, -code] {
                    let magnitude = (code as u16) << scale.shift();
                    let bits = if raw < 0 { 0x8000 | magnitude } else { magnitude };
                    let volts = register_to_voltage(bits, scale);
                    assert_eq!(voltage_to_register(volts, scale), bits, "code {}", raw);
                    assert_eq!(register_to_voltage(voltage_to_register(volts, scale), scale), volts);
                }
            }
        }
    }

    #[test]
    fn arbitrary_voltages_round_trip_within_one_lsb() {
        for scale in [VoltageScale::BUS, VoltageScale::SHUNT, VoltageScale::SHUNT_SUM] {
            let lsb = scale.lsb_volts();
            for step in -20..=20 {
                let volts = scale.full_scale_volts() * step as f32 / 20.3;
                let decoded = register_to_voltage(voltage_to_register(volts, scale), scale);
                assert!(
                    approx_eq!(f32, decoded, volts, epsilon = lsb),
                    "{} -> {}",
                    volts,
                    decoded
                );
            }
        }
    }

    #[test]
    fn scale_table_matches_register_families() {
        assert_eq!(VoltageRegister::BusVoltage.scale(), VoltageScale::BUS);
        assert_eq!(VoltageRegister::ShuntVoltage.scale(), VoltageScale::SHUNT);
        assert_eq!(VoltageRegister::ShuntCriticalLimit.scale(), VoltageScale::SHUNT);
        assert_eq!(VoltageRegister::ShuntWarningLimit.scale(), VoltageScale::SHUNT);
        assert_eq!(VoltageRegister::ShuntVoltageSum.scale(), VoltageScale::SHUNT_SUM);
        assert_eq!(VoltageRegister::ShuntVoltageSumLimit.scale(), VoltageScale::SHUNT_SUM);
        assert_eq!(VoltageRegister::PowerValidUpper.scale(), VoltageScale::BUS);
        assert_eq!(VoltageRegister::PowerValidLower.scale(), VoltageScale::BUS);
    }

    #[test]
    fn custom_scale_rejects_unusable_parameters() {
        assert_eq!(VoltageScale::new(32.76, 0x0FFF, 3), Some(VoltageScale::BUS));
        assert!(VoltageScale::new(1.0, 0x0FFF, 16).is_none());
        assert!(VoltageScale::new(1.0, 0x0001, 15).is_none());
        assert!(VoltageScale::new(1.0, 0x0FFF, 4).is_none());
        assert!(VoltageScale::new(1.0, 0x7FFF, 0).is_some());
        assert!(VoltageScale::new(0.0, 0x0FFF, 3).is_none());
        assert!(VoltageScale::new(-1.0, 0x0FFF, 3).is_none());
        assert!(VoltageScale::new(f32::NAN, 0x0FFF, 3).is_none());
        assert!(VoltageScale::new(f32::INFINITY, 0x0FFF, 3).is_none());
        assert!(VoltageScale::new(1.0, 0, 3).is_none());
        assert!(VoltageScale::new(1.0, -1, 3).is_none());
    }

    #[test]
    fn widest_custom_scale_encodes_without_overflow() {
        let scale = VoltageScale::new(2.0, 0x0FFF, 3).unwrap();
        assert_eq!(voltage_to_register(2.0, scale), 0x7FF8);
        assert_eq!(voltage_to_register(-2.0, scale), 0xFFF8);

        let unpadded = VoltageScale::new(1.0, 0x7FFF, 0).unwrap();
        assert_eq!(unpadded.mask(), 0xFFFF);
        assert_eq!(voltage_to_register(1.0, unpadded), 0x7FFF);
        assert_eq!(voltage_to_register(-1.0, unpadded), 0xFFFF);
        assert_eq!(register_to_voltage(0xFFFF, unpadded), -1.0);
    }

    #[test]
    fn rescaled_full_scale_keeps_code_range() {
        let divided = VoltageScale::BUS.with_full_scale_volts(65.52).unwrap();
        assert_eq!(divided.full_scale_code(), FULL_SCALE_CODE);
        assert_eq!(divided.shift(), 3);
        assert!(approx_eq!(f32, register_to_voltage(0x2710, divided), 20.0, epsilon = 1e-4));
        assert!(VoltageScale::BUS.with_full_scale_volts(0.0).is_none());
    }

    #[test]
    fn lsb_sizes() {
        assert!(approx_eq!(f32, VoltageScale::BUS.lsb_volts(), 0.008, epsilon = 1e-7));
        assert!(approx_eq!(f32, VoltageScale::SHUNT.lsb_volts(), 40e-6, epsilon = 1e-9));
    }
}
