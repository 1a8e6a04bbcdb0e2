use anyhow::Context;
use log::info;
use serde::Deserialize;
use std::{fs::File, io::ErrorKind, path::PathBuf};

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Unix socket the companion connects to
    pub socket: PathBuf,
    /// Where display settings persist between restarts
    pub settings: PathBuf,
    /// SPI port of the e-paper panel
    pub panel_port: String,
    /// Show 24-hour time instead of 12-hour
    pub clock_24h: bool,
    /// Degrees north, for the weather and tide lookups
    pub latitude: f64,
    /// Degrees east
    pub longitude: f64,
    /// Report temperatures in Celsius
    pub units_celsius: bool,
    /// Label the footer with the nearest city instead of raw coordinates
    pub show_city: bool,
    /// Companion-side inversion switch, pushed to the face on every fetch
    pub invert: bool,
}

impl Config {
    const PATH: &'static str = "./config.json";

    pub fn load() -> anyhow::Result<Self> {
        info!("Loading config from `{}`", Self::PATH);
        match File::open(Self::PATH) {
            Ok(file) => serde_json::from_reader(file)
                .context(format!("Error parsing config file {}", Self::PATH)),
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!("No config file, using defaults");
                Ok(Self::default())
            }
            Err(err) => Err(err)
                .context(format!("Error opening config file {}", Self::PATH)),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            socket: "./spindrift.sock".into(),
            settings: "./settings.json".into(),
            panel_port: "/dev/spidev0.0".into(),
            clock_24h: false,
            // Newport RI
            latitude: 41.4901,
            longitude: -71.3128,
            units_celsius: false,
            show_city: false,
            invert: false,
        }
    }
}
