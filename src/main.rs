//! The face binary: draws the watch face and drives the e-paper panel

use log::LevelFilter;
use spindrift::{config::Config, shell::Shell};

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let config = Config::load()?;
    Shell::new(config)?.run()
}
