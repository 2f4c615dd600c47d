//! Typed register contents: configuration fields, mask/enable flags and
//! address-pin selection.

/// Operating mode, configuration register bits 0–2.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OperatingMode {
    PowerDown = 0x0,
    /// Shunt voltage, single-shot (triggered).
    ShuntSingleShot = 0x1,
    /// Bus voltage, single-shot (triggered).
    BusSingleShot = 0x2,
    /// Shunt and bus voltage, single-shot (triggered).
    ShuntAndBusSingleShot = 0x3,
    /// Second power-down encoding.
    PowerDownAlt = 0x4,
    ShuntContinuous = 0x5,
    BusContinuous = 0x6,
    /// Shunt and bus voltage, continuous (power-on default).
    ShuntAndBusContinuous = 0x7,
}

impl OperatingMode {
    /// Decode the low three bits of `field`.
    pub const fn from_bits(field: u16) -> Self {
        match field & 0x7 {
            0x0 => Self::PowerDown,
            0x1 => Self::ShuntSingleShot,
            0x2 => Self::BusSingleShot,
            0x3 => Self::ShuntAndBusSingleShot,
            0x4 => Self::PowerDownAlt,
            0x5 => Self::ShuntContinuous,
            0x6 => Self::BusContinuous,
            _ => Self::ShuntAndBusContinuous,
        }
    }

    /// `true` for the two power-down encodings.
    pub const fn is_power_down(self) -> bool {
        matches!(self, Self::PowerDown | Self::PowerDownAlt)
    }

    /// `true` for the triggered (single-shot) modes.
    pub const fn is_single_shot(self) -> bool {
        matches!(
            self,
            Self::ShuntSingleShot | Self::BusSingleShot | Self::ShuntAndBusSingleShot
        )
    }
}

/// ADC conversion time, used for both the shunt (bits 3–5) and the bus
/// (bits 6–8) field of the configuration register.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConversionTime {
    Us140 = 0x0,
    Us204 = 0x1,
    Us332 = 0x2,
    Us588 = 0x3,
    /// Power-on default.
    Us1100 = 0x4,
    Us2116 = 0x5,
    Us4156 = 0x6,
    Us8244 = 0x7,
}

impl ConversionTime {
    /// Decode the low three bits of `field`.
    pub const fn from_bits(field: u16) -> Self {
        match field & 0x7 {
            0x0 => Self::Us140,
            0x1 => Self::Us204,
            0x2 => Self::Us332,
            0x3 => Self::Us588,
            0x4 => Self::Us1100,
            0x5 => Self::Us2116,
            0x6 => Self::Us4156,
            _ => Self::Us8244,
        }
    }

    /// Nominal conversion time in microseconds.
    pub const fn micros(self) -> u32 {
        match self {
            Self::Us140 => 140,
            Self::Us204 => 204,
            Self::Us332 => 332,
            Self::Us588 => 588,
            Self::Us1100 => 1100,
            Self::Us2116 => 2116,
            Self::Us4156 => 4156,
            Self::Us8244 => 8244,
        }
    }
}

/// Number of samples averaged per reported value, configuration bits 9–11.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AveragingMode {
    /// Power-on default.
    Samples1 = 0x0,
    Samples4 = 0x1,
    Samples16 = 0x2,
    Samples64 = 0x3,
    Samples128 = 0x4,
    Samples256 = 0x5,
    Samples512 = 0x6,
    Samples1024 = 0x7,
}

impl AveragingMode {
    /// Decode the low three bits of `field`.
    pub const fn from_bits(field: u16) -> Self {
        match field & 0x7 {
            0x0 => Self::Samples1,
            0x1 => Self::Samples4,
            0x2 => Self::Samples16,
            0x3 => Self::Samples64,
            0x4 => Self::Samples128,
            0x5 => Self::Samples256,
            0x6 => Self::Samples512,
            _ => Self::Samples1024,
        }
    }

    pub const fn samples(self) -> u16 {
        match self {
            Self::Samples1 => 1,
            Self::Samples4 => 4,
            Self::Samples16 => 16,
            Self::Samples64 => 64,
            Self::Samples128 => 128,
            Self::Samples256 => 256,
            Self::Samples512 => 512,
            Self::Samples1024 => 1024,
        }
    }
}

/// Contents of the configuration register (0x00).
///
/// [`Config::default()`] matches the device power-on value `0x7127`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    pub mode: OperatingMode,
    pub shunt_conversion_time: ConversionTime,
    pub bus_conversion_time: ConversionTime,
    pub averaging: AveragingMode,
    pub channel1_enable: bool,
    pub channel2_enable: bool,
    pub channel3_enable: bool,
    /// Requests a system reset. The device clears this bit itself and
    /// restores every register to its power-on value.
    pub reset: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: OperatingMode::ShuntAndBusContinuous,
            shunt_conversion_time: ConversionTime::Us1100,
            bus_conversion_time: ConversionTime::Us1100,
            averaging: AveragingMode::Samples1,
            channel1_enable: true,
            channel2_enable: true,
            channel3_enable: true,
            reset: false,
        }
    }
}

impl Config {
    /// Pack into the configuration register layout.
    pub fn bits(&self) -> u16 {
        crate::codec::pack_config(self)
    }

    /// Unpack a configuration register image. Every 16-bit value decodes.
    pub fn from_bits(bits: u16) -> Self {
        crate::codec::unpack_config(bits)
    }

    /// Whether `channel` (1–3) is enabled. Out-of-range channels read as
    /// disabled.
    pub fn channel_enabled(&self, channel: u8) -> bool {
        match channel {
            1 => self.channel1_enable,
            2 => self.channel2_enable,
            3 => self.channel3_enable,
            _ => false,
        }
    }
}

/// Contents of the Mask/Enable register (0x0F), bits 0–14.
///
/// Flag bits (`*_flag`) are reported by the device; the enable and
/// summation-control bits are written by the host. [`MaskEnable::default()`]
/// matches the power-on value `0x0002`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MaskEnable {
    /// CVRF, bit 0.
    pub conversion_ready_flag: bool,
    /// TCF, bit 1.
    pub timing_control_flag: bool,
    /// PVF, bit 2.
    pub power_valid_flag: bool,
    /// WF3, bit 3.
    pub warning_flag_ch3: bool,
    /// WF2, bit 4.
    pub warning_flag_ch2: bool,
    /// WF1, bit 5.
    pub warning_flag_ch1: bool,
    /// SF, bit 6.
    pub summation_flag: bool,
    /// CF3, bit 7.
    pub critical_flag_ch3: bool,
    /// CF2, bit 8.
    pub critical_flag_ch2: bool,
    /// CF1, bit 9.
    pub critical_flag_ch1: bool,
    /// CEN, bit 10.
    pub critical_latch_enable: bool,
    /// WEN, bit 11.
    pub warning_latch_enable: bool,
    /// SCC3, bit 12.
    pub summation_ch3: bool,
    /// SCC2, bit 13.
    pub summation_ch2: bool,
    /// SCC1, bit 14.
    pub summation_ch1: bool,
}

impl Default for MaskEnable {
    fn default() -> Self {
        Self {
            conversion_ready_flag: false,
            timing_control_flag: true,
            power_valid_flag: false,
            warning_flag_ch3: false,
            warning_flag_ch2: false,
            warning_flag_ch1: false,
            summation_flag: false,
            critical_flag_ch3: false,
            critical_flag_ch2: false,
            critical_flag_ch1: false,
            critical_latch_enable: false,
            warning_latch_enable: false,
            summation_ch3: false,
            summation_ch2: false,
            summation_ch1: false,
        }
    }
}

impl MaskEnable {
    pub fn bits(&self) -> u16 {
        crate::codec::pack_mask_enable(self)
    }

    /// Unpack a Mask/Enable register image. Bit 15 is reserved and ignored.
    pub fn from_bits(bits: u16) -> Self {
        crate::codec::unpack_mask_enable(bits)
    }
}

/// I2C address selected by the A0 pin.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Address {
    Gnd = 0x40,
    Vs = 0x41,
    Sda = 0x42,
    Scl = 0x43,
}

impl Address {
    pub const fn addr(self) -> u8 {
        self as u8
    }
}

impl From<Address> for u8 {
    fn from(address: Address) -> Self {
        address.addr()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn three_bit_fields_decode_every_code() {
        for code in 0..8u16 {
            assert_eq!(OperatingMode::from_bits(code) as u16, code);
            assert_eq!(ConversionTime::from_bits(code) as u16, code);
            assert_eq!(AveragingMode::from_bits(code) as u16, code);
        }
    }

    #[test]
    fn from_bits_ignores_upper_bits() {
        assert_eq!(OperatingMode::from_bits(0xFFF9), OperatingMode::ShuntSingleShot);
        assert_eq!(ConversionTime::from_bits(0x0C), ConversionTime::Us1100);
    }

    #[test]
    fn mode_classification() {
        assert!(OperatingMode::PowerDown.is_power_down());
        assert!(OperatingMode::PowerDownAlt.is_power_down());
        assert!(!OperatingMode::ShuntAndBusContinuous.is_power_down());
        assert!(OperatingMode::BusSingleShot.is_single_shot());
        assert!(!OperatingMode::BusContinuous.is_single_shot());
    }

    #[test]
    fn conversion_time_and_averaging_values() {
        assert_eq!(ConversionTime::Us1100.micros(), 1100);
        assert_eq!(ConversionTime::Us8244.micros(), 8244);
        assert_eq!(AveragingMode::Samples1.samples(), 1);
        assert_eq!(AveragingMode::Samples1024.samples(), 1024);
    }

    #[test]
    fn channel_enabled_lookup() {
        let config = Config {
            channel2_enable: false,
            ..Config::default()
        };
        assert!(config.channel_enabled(1));
        assert!(!config.channel_enabled(2));
        assert!(config.channel_enabled(3));
        assert!(!config.channel_enabled(0));
        assert!(!config.channel_enabled(4));
    }

    #[test]
    fn address_pins() {
        assert_eq!(Address::Gnd.addr(), crate::registers::DEFAULT_ADDRESS);
        assert_eq!(u8::from(Address::Scl), 0x43);
    }
}
