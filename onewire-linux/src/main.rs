use std::thread;
use std::time::Duration;

use clap::Parser;
use ds18b20_nb::Ds18b20;
use linux_embedded_hal::gpio_cdev::{Chip, LineRequestFlags};
use linux_embedded_hal::{CdevPin, Delay};
use onewire_nb::OneWireError;
use onewire_soft::{SharedTick, SoftMaster};

/// Read a DS18B20 wired to a GPIO line, one bus slot per tick.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the GPIO character device (e.g., /dev/gpiochip0)
    #[arg(short, long, default_value = "/dev/gpiochip0")]
    chip: String,
    /// Line offset of the 1-Wire data pin
    #[arg(short, long)]
    line: u32,
    /// Slot tick period in microseconds
    #[arg(short, long, default_value_t = 160)]
    tick_us: u64,
}

static TICKS: SharedTick = SharedTick::new();

fn main() {
    // Initialize the logger
    env_logger::init();
    // Parse command line arguments
    let args = Args::parse();
    // Request the data line as an open-drain output, released (high) at rest
    let mut chip = Chip::new(&args.chip).expect("Failed to open GPIO chip");
    let handle = chip
        .get_line(args.line)
        .expect("Failed to find GPIO line")
        .request(
            LineRequestFlags::OUTPUT | LineRequestFlags::OPEN_DRAIN,
            1,
            "onewire",
        )
        .expect("Failed to request GPIO line");
    let pin = CdevPin::new(handle).expect("Failed to wrap GPIO line");

    // Produce the slot tick from a plain thread. Scheduling jitter stretches
    // the gaps between slots, which the bus tolerates; the holds inside a
    // slot come from the delay provider and stay tight.
    let tick_us = args.tick_us;
    thread::spawn(move || loop {
        thread::sleep(Duration::from_micros(tick_us));
        TICKS.notify();
    });

    let mut bus =
        SoftMaster::new(pin, Delay, &TICKS).expect("Failed to initialize the 1-Wire line");
    let mut sensor = Ds18b20::new();
    loop {
        match nb::block!(sensor.poll(&mut bus)) {
            Ok(degrees) => {
                if let Some(rom) = sensor.rom() {
                    if !rom.crc_valid() {
                        log::warn!("ROM {} failed its CRC check", rom);
                    }
                    log::info!(
                        "ROM: {}, family: {:#04x}, temperature: {} C ({})",
                        rom,
                        rom.family_code,
                        degrees,
                        sensor.temperature_fine().unwrap_or_default()
                    );
                }
            }
            Err(OneWireError::NoDevicePresent) => {
                log::warn!("No device answered the reset pulse");
            }
            Err(err) => log::error!("Bus error: {:?}", err),
        }
    }
}
