//! E-paper panel plumbing. Only compiled on the Pi; everything else gets
//! the stand-in from mock_panel.rs.

use crate::{config::Config, face::FaceFrame, layout::HEIGHT};
use anyhow::{anyhow, Context};
use display_interface_spi::SPIInterface;
use embedded_graphics::{
    image::GetPixel, pixelcolor::BinaryColor, prelude::*,
    primitives::PointsIter,
};
use linux_embedded_hal::{
    spidev::{SpiModeFlags, SpidevOptions},
    sysfs_gpio::Direction,
    Delay, SpidevDevice, SysfsPin,
};
use log::{info, trace};
use std::fmt::Debug;
use weact_studio_epd::{
    blocking::WeActStudio290BlackWhiteDriver, graphics::Display290BlackWhite,
    Color,
};

const PIN_BUSY: u64 = 17; // GPIO/BCM 17, pin 11
const PIN_DC: u64 = 22; // GPIO/BCM 22, pin 15
const PIN_RESET: u64 = 27; // GPIO/BCM 27, pin 13

/// Native panel height. The face is shorter, so frames go out with a
/// vertical offset that centers them.
const PANEL_HEIGHT: usize = 296;

/// Drives the physical e-paper panel over SPI
pub struct Panel {
    driver: WeActStudio290BlackWhiteDriver<
        SPIInterface<SpidevDevice, SysfsPin>,
        SysfsPin,
        SysfsPin,
        Delay,
    >,
    display: Display290BlackWhite,
}

impl Panel {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let mut spi =
            SpidevDevice::open(&config.panel_port).context("SPI device")?;
        let options = SpidevOptions::new()
            .bits_per_word(8)
            .max_speed_hz(1_000_000)
            .mode(SpiModeFlags::SPI_MODE_0)
            .build();
        spi.configure(&options).context("SPI configuration")?;

        let reset = init_pin(PIN_RESET, Direction::Out)
            .context("Initializing pin Reset")?;
        let dc =
            init_pin(PIN_DC, Direction::Out).context("Initializing pin D/C")?;
        let busy = init_pin(PIN_BUSY, Direction::In)
            .context("Initializing pin Busy")?;

        let interface = SPIInterface::new(spi, dc);
        let mut driver =
            WeActStudio290BlackWhiteDriver::new(interface, busy, reset, Delay);
        driver.init().map_err(map_error)?;
        info!("Panel driver initialized");

        Ok(Self {
            driver,
            display: Display290BlackWhite::new(),
        })
    }

    /// Push one frame to the panel. This does a full refresh, which takes
    /// a couple seconds and flashes the panel, so only call it when the
    /// frame actually changed.
    pub fn push(&mut self, frame: &FaceFrame) -> anyhow::Result<()> {
        let offset = Point::new(0, ((PANEL_HEIGHT - HEIGHT) / 2) as i32);
        trace!("Copying frame to panel buffer");
        self.display
            .draw_iter(frame.bounding_box().points().map(|point| {
                let color = match frame.pixel(point) {
                    Some(BinaryColor::On) => Color::White,
                    _ => Color::Black,
                };
                Pixel(point + offset, color)
            }))
            .map_err(map_error)?;
        trace!("Updating panel");
        self.driver.full_update(&self.display).map_err(map_error)?;
        trace!("Done updating panel");
        Ok(())
    }
}

/// Initialize a GPIO pin
fn init_pin(pin_num: u64, direction: Direction) -> anyhow::Result<SysfsPin> {
    let pin = SysfsPin::new(pin_num);
    pin.export().context("Error exporting pin")?;
    while !pin.is_exported() {}
    pin.set_direction(direction)
        .context("Error setting pin direction")?;
    if matches!(direction, Direction::Out) {
        pin.set_value(1).context("Error enabling pin")?;
    }
    Ok(pin)
}

/// The error types from the driver don't implement Error so we have to map
/// manually
fn map_error(error: impl Debug) -> anyhow::Error {
    anyhow!("{error:?}")
}
