//! High-level interface for the INA3221.
//!
//! [`Ina3221`] wraps the register driver with the device bring-up sequence,
//! channel validation, per-channel register addressing and the voltage
//! codec.

use embedded_hal_async::i2c::I2c;

use crate::codec::{register_to_voltage, voltage_to_register, VoltageRegister, VoltageScale};
use crate::driver::RegisterDriver;
use crate::error::Ina3221Error;
use crate::registers::{
    channel_register, CHANNEL_COUNT, DIE_ID, REG_CONFIG, REG_DIE_ID, REG_MANUFACTURER_ID,
    REG_MASK_ENABLE,
};
use crate::types::{Config, MaskEnable};

/// Async driver for one INA3221 on an I2C bus.
///
/// # Lifecycle
///
/// 1. [`Ina3221::new()`] — constructs the driver without any I2C traffic.
/// 2. [`Ina3221::init()`] — checks the die ID, resets the device and applies
///    a [`Config`].
/// 3. Measurement and limit accessors. Calling them before a successful
///    `init()` returns [`Ina3221Error::NotInitialized`] without touching
///    the bus.
///
/// Channels are numbered 1 to 3, as on the device pinout.
///
/// # Measurement scale
///
/// Shunt, bus and shunt-sum readings are converted with a per-instance full
/// scale that defaults to the device's 163.8 mV / 32.76 V. Override it with
/// [`set_bus_full_scale()`](Self::set_bus_full_scale) or
/// [`set_shunt_full_scale()`](Self::set_shunt_full_scale), e.g. to report
/// the voltage ahead of an external divider. Limit registers always use the
/// device scale.
///
/// # Example
///
/// ```no_run
/// use ina3221_driver::{Config, Ina3221, DEFAULT_ADDRESS};
///
/// # async fn example(i2c: impl embedded_hal_async::i2c::I2c) {
/// let mut monitor = Ina3221::new(i2c, DEFAULT_ADDRESS);
/// monitor.init(Config::default()).await.unwrap();
///
/// let bus_v = monitor.bus_voltage(1).await.unwrap();
/// let shunt_v = monitor.shunt_voltage(1).await.unwrap();
/// # }
/// ```
pub struct Ina3221<I2C> {
    driver: RegisterDriver<I2C>,
    /// Set to `true` after a successful `init()` call.
    initialized: bool,
    bus_scale: VoltageScale,
    shunt_scale: VoltageScale,
    shunt_sum_scale: VoltageScale,
}

impl<I2C> Ina3221<I2C>
where
    I2C: I2c,
{
    /// Construct an uninitialised driver.
    ///
    /// No I2C traffic is generated. You **must** call [`init()`](Self::init)
    /// before any register operations.
    ///
    /// # Arguments
    /// * `i2c` — I2C peripheral (takes ownership for exclusive access)
    /// * `address` — 7-bit I2C device address (0x40–0x43, see
    ///   [`Address`](crate::Address))
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self {
            driver: RegisterDriver::new(i2c, address),
            initialized: false,
            bus_scale: VoltageScale::BUS,
            shunt_scale: VoltageScale::SHUNT,
            shunt_sum_scale: VoltageScale::SHUNT_SUM,
        }
    }

    /// 7-bit I2C address this driver talks to.
    pub fn address(&self) -> u8 {
        self.driver.address()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Bus voltage represented by a full-scale bus reading.
    pub fn bus_full_scale(&self) -> f32 {
        self.bus_scale.full_scale_volts()
    }

    /// Change the voltage reported for a full-scale bus reading.
    ///
    /// Affects [`bus_voltage()`](Self::bus_voltage) and
    /// [`read_all_bus_voltages()`](Self::read_all_bus_voltages) only. No I2C
    /// traffic.
    ///
    /// # Errors
    /// * [`Ina3221Error::InvalidScale`] unless `volts` is finite and positive
    pub fn set_bus_full_scale(&mut self, volts: f32) -> Result<(), Ina3221Error<I2C::Error>> {
        self.bus_scale = VoltageScale::BUS
            .with_full_scale_volts(volts)
            .ok_or(Ina3221Error::InvalidScale)?;
        Ok(())
    }

    /// Shunt voltage represented by a full-scale shunt reading.
    pub fn shunt_full_scale(&self) -> f32 {
        self.shunt_scale.full_scale_volts()
    }

    /// Change the voltage reported for a full-scale shunt reading.
    ///
    /// Affects the per-channel shunt readings and
    /// [`shunt_voltage_sum()`](Self::shunt_voltage_sum). No I2C traffic.
    ///
    /// # Errors
    /// * [`Ina3221Error::InvalidScale`] unless `volts` is finite and positive
    pub fn set_shunt_full_scale(&mut self, volts: f32) -> Result<(), Ina3221Error<I2C::Error>> {
        let shunt = VoltageScale::SHUNT.with_full_scale_volts(volts);
        let sum = VoltageScale::SHUNT_SUM.with_full_scale_volts(volts);
        match (shunt, sum) {
            (Some(shunt), Some(sum)) => {
                self.shunt_scale = shunt;
                self.shunt_sum_scale = sum;
                Ok(())
            }
            _ => Err(Ina3221Error::InvalidScale),
        }
    }

    /// Consume the driver and give back the I2C peripheral.
    pub fn release(self) -> I2C {
        self.driver.release()
    }

    // -----------------------------------------------------------------------
    // Bring-up
    // -----------------------------------------------------------------------

    /// Verify the device and apply `config`.
    ///
    /// 1. Reads the die ID register and checks it against `0x3220`.
    /// 2. Writes `config` with the reset bit set. Resetting restores every
    ///    register to its power-on value, configuration included.
    /// 3. Writes `config` again with the reset bit cleared.
    ///
    /// The driver is ready only after all three transfers succeed. Calling
    /// `init()` again re-runs the whole sequence.
    ///
    /// # Errors
    /// * [`Ina3221Error::I2c`] on communication failure
    /// * [`Ina3221Error::InvalidVendor`] if the die ID does not match; no
    ///   write is issued in that case
    pub async fn init(&mut self, config: Config) -> Result<(), Ina3221Error<I2C::Error>> {
        self.initialized = false;
        self.driver.invalidate();

        let die_id = self.driver.read_u16(REG_DIE_ID).await?;
        if die_id != DIE_ID {
            #[cfg(feature = "defmt")]
            defmt::warn!("INA3221: unexpected die ID {=u16:#x}", die_id);
            return Err(Ina3221Error::InvalidVendor(die_id));
        }

        self.write_reset(config).await?;
        self.initialized = true;

        #[cfg(feature = "defmt")]
        defmt::debug!("INA3221 at {=u8:#x} initialised: {}", self.driver.address(), config);

        Ok(())
    }

    /// Reset the device and re-apply `config` (reset bit set, then cleared).
    ///
    /// # Errors
    /// * [`Ina3221Error::NotInitialized`] before [`init()`](Self::init)
    /// * [`Ina3221Error::I2c`] on communication failure
    pub async fn reset(&mut self, config: Config) -> Result<(), Ina3221Error<I2C::Error>> {
        self.ensure_initialized()?;
        self.write_reset(config).await
    }

    /// Reset the device to its power-on configuration
    /// ([`Config::default()`], 0x7127).
    pub async fn reset_default(&mut self) -> Result<(), Ina3221Error<I2C::Error>> {
        self.reset(Config::default()).await
    }

    async fn write_reset(&mut self, config: Config) -> Result<(), Ina3221Error<I2C::Error>> {
        let asserted = Config { reset: true, ..config };
        self.driver.write_u16(REG_CONFIG, asserted.bits()).await?;

        let applied = Config { reset: false, ..config };
        self.driver.write_u16(REG_CONFIG, applied.bits()).await
    }

    /// Raw die ID register (0xFF). Usable before `init()`.
    pub async fn die_id(&mut self) -> Result<u16, Ina3221Error<I2C::Error>> {
        self.driver.read_u16(REG_DIE_ID).await
    }

    /// Raw manufacturer ID register (0xFE), `0x5449` on TI parts. Usable
    /// before `init()`.
    pub async fn manufacturer_id(&mut self) -> Result<u16, Ina3221Error<I2C::Error>> {
        self.driver.read_u16(REG_MANUFACTURER_ID).await
    }

    // -----------------------------------------------------------------------
    // Configuration and Mask/Enable
    // -----------------------------------------------------------------------

    pub async fn config(&mut self) -> Result<Config, Ina3221Error<I2C::Error>> {
        self.ensure_initialized()?;
        let bits = self.driver.read_u16(REG_CONFIG).await?;
        Ok(Config::from_bits(bits))
    }

    /// Write the configuration register as given. Setting
    /// [`Config::reset`] resets the device; prefer [`reset()`](Self::reset).
    pub async fn set_config(&mut self, config: Config) -> Result<(), Ina3221Error<I2C::Error>> {
        self.ensure_initialized()?;
        self.driver.write_u16(REG_CONFIG, config.bits()).await
    }

    /// Read the Mask/Enable register.
    ///
    /// Reading clears the latched flag bits on the device.
    pub async fn mask_enable(&mut self) -> Result<MaskEnable, Ina3221Error<I2C::Error>> {
        self.ensure_initialized()?;
        let bits = self.driver.read_u16(REG_MASK_ENABLE).await?;
        Ok(MaskEnable::from_bits(bits))
    }

    pub async fn set_mask_enable(
        &mut self,
        flags: MaskEnable,
    ) -> Result<(), Ina3221Error<I2C::Error>> {
        self.ensure_initialized()?;
        self.driver.write_u16(REG_MASK_ENABLE, flags.bits()).await
    }

    // -----------------------------------------------------------------------
    // Measurements
    // -----------------------------------------------------------------------

    /// Read the shunt voltage of `channel`, in volts (±163.8 mV full scale).
    ///
    /// # Arguments
    /// * `channel` — Channel number (1–3)
    ///
    /// # Errors
    /// * [`Ina3221Error::InvalidChannel`] if `channel` is not 1–3
    /// * [`Ina3221Error::NotInitialized`] before [`init()`](Self::init)
    /// * [`Ina3221Error::I2c`] on communication failure
    pub async fn shunt_voltage(&mut self, channel: u8) -> Result<f32, Ina3221Error<I2C::Error>> {
        self.read_channel_voltage(VoltageRegister::ShuntVoltage, channel).await
    }

    /// Read the bus voltage of `channel`, in volts (32.76 V full scale).
    ///
    /// # Arguments
    /// * `channel` — Channel number (1–3)
    ///
    /// # Errors
    /// Same as [`shunt_voltage()`](Self::shunt_voltage).
    pub async fn bus_voltage(&mut self, channel: u8) -> Result<f32, Ina3221Error<I2C::Error>> {
        self.read_channel_voltage(VoltageRegister::BusVoltage, channel).await
    }

    /// Read the bus voltages of all three channels in sequence.
    ///
    /// Returns the first error encountered; no partial results are returned.
    pub async fn read_all_bus_voltages(&mut self) -> Result<[f32; 3], Ina3221Error<I2C::Error>> {
        let mut voltages = [0.0f32; 3];
        for (channel, voltage) in (1..=CHANNEL_COUNT).zip(voltages.iter_mut()) {
            *voltage = self.bus_voltage(channel).await?;
        }
        Ok(voltages)
    }

    /// Read the shunt voltages of all three channels in sequence.
    ///
    /// Returns the first error encountered; no partial results are returned.
    pub async fn read_all_shunt_voltages(
        &mut self,
    ) -> Result<[f32; 3], Ina3221Error<I2C::Error>> {
        let mut voltages = [0.0f32; 3];
        for (channel, voltage) in (1..=CHANNEL_COUNT).zip(voltages.iter_mut()) {
            *voltage = self.shunt_voltage(channel).await?;
        }
        Ok(voltages)
    }

    /// Sum of the shunt voltages of the channels selected in
    /// [`MaskEnable`] (`summation_ch*`).
    pub async fn shunt_voltage_sum(&mut self) -> Result<f32, Ina3221Error<I2C::Error>> {
        self.read_voltage(VoltageRegister::ShuntVoltageSum).await
    }

    // -----------------------------------------------------------------------
    // Alert limits
    // -----------------------------------------------------------------------

    pub async fn shunt_critical_limit(
        &mut self,
        channel: u8,
    ) -> Result<f32, Ina3221Error<I2C::Error>> {
        self.read_channel_voltage(VoltageRegister::ShuntCriticalLimit, channel).await
    }

    /// Set the critical alert limit of `channel`, in shunt volts.
    ///
    /// Values beyond ±163.8 mV saturate.
    pub async fn set_shunt_critical_limit(
        &mut self,
        channel: u8,
        volts: f32,
    ) -> Result<(), Ina3221Error<I2C::Error>> {
        self.write_channel_voltage(VoltageRegister::ShuntCriticalLimit, channel, volts).await
    }

    pub async fn shunt_warning_limit(
        &mut self,
        channel: u8,
    ) -> Result<f32, Ina3221Error<I2C::Error>> {
        self.read_channel_voltage(VoltageRegister::ShuntWarningLimit, channel).await
    }

    /// Set the warning alert limit of `channel`, in shunt volts.
    ///
    /// Values beyond ±163.8 mV saturate.
    pub async fn set_shunt_warning_limit(
        &mut self,
        channel: u8,
        volts: f32,
    ) -> Result<(), Ina3221Error<I2C::Error>> {
        self.write_channel_voltage(VoltageRegister::ShuntWarningLimit, channel, volts).await
    }

    pub async fn shunt_voltage_sum_limit(&mut self) -> Result<f32, Ina3221Error<I2C::Error>> {
        self.read_voltage(VoltageRegister::ShuntVoltageSumLimit).await
    }

    pub async fn set_shunt_voltage_sum_limit(
        &mut self,
        volts: f32,
    ) -> Result<(), Ina3221Error<I2C::Error>> {
        self.write_voltage(VoltageRegister::ShuntVoltageSumLimit, volts).await
    }

    pub async fn power_valid_upper_limit(&mut self) -> Result<f32, Ina3221Error<I2C::Error>> {
        self.read_voltage(VoltageRegister::PowerValidUpper).await
    }

    /// Set the bus voltage all channels must exceed for the power-valid
    /// output to assert. Power-on value is 10 V.
    pub async fn set_power_valid_upper_limit(
        &mut self,
        volts: f32,
    ) -> Result<(), Ina3221Error<I2C::Error>> {
        self.write_voltage(VoltageRegister::PowerValidUpper, volts).await
    }

    pub async fn power_valid_lower_limit(&mut self) -> Result<f32, Ina3221Error<I2C::Error>> {
        self.read_voltage(VoltageRegister::PowerValidLower).await
    }

    /// Set the bus voltage below which the power-valid output deasserts.
    /// Power-on value is 9 V.
    pub async fn set_power_valid_lower_limit(
        &mut self,
        volts: f32,
    ) -> Result<(), Ina3221Error<I2C::Error>> {
        self.write_voltage(VoltageRegister::PowerValidLower, volts).await
    }

    // -----------------------------------------------------------------------
    // Voltage register plumbing
    // -----------------------------------------------------------------------

    fn ensure_initialized(&self) -> Result<(), Ina3221Error<I2C::Error>> {
        if self.initialized {
            Ok(())
        } else {
            Err(Ina3221Error::NotInitialized)
        }
    }

    /// Scale for decoding `register`: measurements follow the instance
    /// overrides, limits stay on the device scale.
    fn read_scale(&self, register: VoltageRegister) -> VoltageScale {
        match register {
            VoltageRegister::ShuntVoltage => self.shunt_scale,
            VoltageRegister::BusVoltage => self.bus_scale,
            VoltageRegister::ShuntVoltageSum => self.shunt_sum_scale,
            _ => register.scale(),
        }
    }

    /// Resolve the address of a per-channel register.
    fn channel_address(
        &self,
        register: VoltageRegister,
        channel: u8,
    ) -> Result<u8, Ina3221Error<I2C::Error>> {
        if channel == 0 || channel > CHANNEL_COUNT {
            return Err(Ina3221Error::InvalidChannel);
        }
        self.ensure_initialized()?;
        Ok(channel_register(register.base_address(), channel))
    }

    async fn read_channel_voltage(
        &mut self,
        register: VoltageRegister,
        channel: u8,
    ) -> Result<f32, Ina3221Error<I2C::Error>> {
        let address = self.channel_address(register, channel)?;
        let bits = self.driver.read_u16(address).await?;
        Ok(register_to_voltage(bits, self.read_scale(register)))
    }

    async fn write_channel_voltage(
        &mut self,
        register: VoltageRegister,
        channel: u8,
        volts: f32,
    ) -> Result<(), Ina3221Error<I2C::Error>> {
        let address = self.channel_address(register, channel)?;
        let bits = voltage_to_register(volts, register.scale());
        self.driver.write_u16(address, bits).await
    }

    async fn read_voltage(
        &mut self,
        register: VoltageRegister,
    ) -> Result<f32, Ina3221Error<I2C::Error>> {
        self.ensure_initialized()?;
        let bits = self.driver.read_u16(register.base_address()).await?;
        Ok(register_to_voltage(bits, self.read_scale(register)))
    }

    async fn write_voltage(
        &mut self,
        register: VoltageRegister,
        volts: f32,
    ) -> Result<(), Ina3221Error<I2C::Error>> {
        self.ensure_initialized()?;
        let bits = voltage_to_register(volts, register.scale());
        self.driver.write_u16(register.base_address(), bits).await
    }
}

// ── Unit Tests ───────────────────────────────────────────────────────
