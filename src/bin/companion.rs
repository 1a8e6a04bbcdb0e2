//! The companion binary: fetches tide and weather data and feeds it to
//! the face whenever the face asks

use log::{error, info, LevelFilter};
use spindrift::{companion, config::Config, link::CompanionLink};
use std::{thread, time::Duration};

/// How long to wait before redialing a dead link
const RETRY_INTERVAL: Duration = Duration::from_secs(10);

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .init();

    let config = Config::load()?;
    loop {
        if let Err(err) = serve(&config) {
            error!("Link lost: {err:#}");
        }
        thread::sleep(RETRY_INTERVAL);
    }
}

/// Feed one face connection until it drops
fn serve(config: &Config) -> anyhow::Result<()> {
    let mut link = CompanionLink::connect(&config.socket)?;
    info!("Connected to face");
    // The face only asks on its half-hour boundary. Run a pass right away
    // so a freshly booted face doesn't sit on placeholders until then.
    companion::run_pass(config, &mut link)?;
    loop {
        let request = link.wait_for_request()?;
        info!("Refresh requested: {request:?}");
        companion::run_pass(config, &mut link)?;
    }
}
