//! Three-rail power monitor
//!
//! Demonstrates basic usage of the ina3221-driver crate on the Raspberry Pi
//! Pico 2. Brings up an INA3221, programs per-channel warning limits, and
//! logs bus and shunt voltages of all three channels once per second via
//! defmt.
//!
//! # Wiring
//!
//! | Signal    | Pico 2 Pin | Notes                        |
//! |-----------|------------|------------------------------|
//! | I2C0 SDA  | GP20       |                              |
//! | I2C0 SCL  | GP21       |                              |
//! | INA A0    | GND        | Address 0x40                 |

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp as hal;
use embassy_rp::bind_interrupts;
use embassy_rp::block::ImageDef;
use embassy_rp::i2c::{self, I2c};
use embassy_rp::peripherals::I2C0;
use embassy_time::{Duration, Timer};
use {defmt_rtt as _, panic_probe as _};

use ina3221_driver::{AveragingMode, Config, ConversionTime, Ina3221, MaskEnable, DEFAULT_ADDRESS};

/// Tell the Boot ROM about our application.
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = hal::block::ImageDef::secure_exe();

// Wire the I2C0 interrupt to Embassy's handler.
bind_interrupts!(struct Irqs {
    I2C0_IRQ => i2c::InterruptHandler<I2C0>;
});

/// Shunt voltage above which a channel raises its warning flag (50 mV,
/// 500 mA through a 0.1 Ω shunt).
const WARNING_LIMIT_V: f32 = 0.050;

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let p = embassy_rp::init(Default::default());

    // --- I2C bus (GP20 = SDA, GP21 = SCL) ---
    let i2c = I2c::new_async(
        p.I2C0,
        p.PIN_21, // SCL
        p.PIN_20, // SDA
        Irqs,
        i2c::Config::default(),
    );

    // --- INA3221 ---
    let mut monitor = Ina3221::new(i2c, DEFAULT_ADDRESS);

    // 16 samples of 1.1 ms per reading keeps the output steady at 1 Hz.
    let config = Config {
        averaging: AveragingMode::Samples16,
        shunt_conversion_time: ConversionTime::Us1100,
        bus_conversion_time: ConversionTime::Us1100,
        ..Config::default()
    };

    if let Err(e) = monitor.init(config).await {
        error!("INA3221 init failed: {}", e);
        return;
    }

    for channel in 1..=3 {
        if let Err(e) = monitor.set_shunt_warning_limit(channel, WARNING_LIMIT_V).await {
            error!("Failed to set warning limit on channel {}: {}", channel, e);
        }
    }

    // Latch warning flags until the Mask/Enable register is read.
    let flags = MaskEnable {
        warning_latch_enable: true,
        ..MaskEnable::default()
    };
    if let Err(e) = monitor.set_mask_enable(flags).await {
        error!("Failed to write Mask/Enable: {}", e);
    }

    info!("Power monitor started");

    loop {
        match monitor.read_all_bus_voltages().await {
            Ok(bus) => info!("Bus [V]:   [{}, {}, {}]", bus[0], bus[1], bus[2]),
            Err(e) => error!("Bus read failed: {}", e),
        }

        match monitor.read_all_shunt_voltages().await {
            Ok(shunt) => info!("Shunt [V]: [{}, {}, {}]", shunt[0], shunt[1], shunt[2]),
            Err(e) => error!("Shunt read failed: {}", e),
        }

        match monitor.mask_enable().await {
            Ok(status) if status.warning_flag_ch1 || status.warning_flag_ch2 || status.warning_flag_ch3 => {
                warn!(
                    "Warning limit exceeded: ch1={} ch2={} ch3={}",
                    status.warning_flag_ch1, status.warning_flag_ch2, status.warning_flag_ch3,
                );
            }
            Ok(_) => {}
            Err(e) => error!("Mask/Enable read failed: {}", e),
        }

        Timer::after(Duration::from_millis(1000)).await;
    }
}
