//! Event loop tying the face to the link and the panel

use crate::{
    config::Config,
    face::{FaceFrame, Watchface},
    link::FaceLink,
    message::RefreshRequest,
    panel::Panel,
    prop::FRAME_DELAY,
};
use anyhow::Context;
use chrono::{DateTime, Local};
use log::{error, info, trace};
use std::{
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::{Duration, Instant},
};

/// How long the loop sleeps between polls
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Single-threaded event loop around the watch face. Everything the face
/// reacts to funnels through here: link messages, minute rollovers, and
/// the propeller's frame timer.
pub struct Shell {
    face: Watchface,
    link: FaceLink,
    panel: Panel,
    /// Frame being painted this iteration
    frame: FaceFrame,
    /// Frame currently on the panel
    shown: FaceFrame,
}

impl Shell {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        Ok(Self {
            face: Watchface::new(&config),
            link: FaceLink::bind(&config.socket)?,
            panel: Panel::new(&config)?,
            frame: FaceFrame::new(),
            shown: FaceFrame::new(),
        })
    }

    /// Run until terminated by a signal
    pub fn run(mut self) -> anyhow::Result<()> {
        let terminated = Arc::new(AtomicBool::new(false));
        {
            let terminated = Arc::clone(&terminated);
            ctrlc::set_handler(move || {
                terminated.store(true, Ordering::Relaxed)
            })
            .context("Error setting signal handler")?;
        }

        let now = Local::now();
        self.face.update_clock(now);
        let mut next_minute = next_minute_boundary(now);
        // The propeller spins on startup, so its timer starts armed
        let mut prop_deadline = Some(Instant::now() + FRAME_DELAY);

        while !terminated.load(Ordering::Relaxed) {
            for update in self.link.poll() {
                self.face.on_fields_received(&update);
            }

            let now = Local::now();
            if now >= next_minute {
                next_minute = next_minute_boundary(now);
                if self.face.on_minute_tick(now) {
                    prop_deadline = Some(Instant::now() + FRAME_DELAY);
                    match self.link.send(&RefreshRequest::default()) {
                        Ok(()) => info!("Refresh request sent"),
                        Err(err) => error!("Refresh request failed: {err:#}"),
                    }
                }
            }

            // Drain every lapsed frame deadline. A slow panel update can
            // put us several frames behind; advancing the cursor for each
            // missed deadline keeps the spin's wall-clock length right
            // even when some frames never make it to the panel.
            while let Some(deadline) = prop_deadline {
                if Instant::now() < deadline {
                    break;
                }
                prop_deadline =
                    self.face.on_timer().then(|| deadline + FRAME_DELAY);
            }

            self.face.draw(&mut self.frame)?;
            if self.frame.data() != self.shown.data() {
                trace!("Frame changed, pushing to panel");
                self.panel.push(&self.frame)?;
                self.shown.data_mut().copy_from_slice(self.frame.data());
            }

            thread::sleep(POLL_INTERVAL);
        }

        info!("Shutting down");
        Ok(())
    }
}

/// First instant of the next minute
fn next_minute_boundary(now: DateTime<Local>) -> DateTime<Local> {
    let elapsed = now.timestamp_millis().rem_euclid(60_000);
    now + chrono::Duration::milliseconds(60_000 - elapsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_next_minute_boundary() {
        let now = Local.with_ymd_and_hms(2024, 5, 24, 9, 30, 12).unwrap();
        let next = next_minute_boundary(now);
        assert_eq!(
            next,
            Local.with_ymd_and_hms(2024, 5, 24, 9, 31, 0).unwrap()
        );

        // Exactly on a boundary rolls over to the one after
        let next = next_minute_boundary(next);
        assert_eq!(
            next,
            Local.with_ymd_and_hms(2024, 5, 24, 9, 32, 0).unwrap()
        );

        // An hour rollover is nothing special
        let now = Local.with_ymd_and_hms(2024, 5, 24, 9, 59, 59).unwrap();
        assert_eq!(
            next_minute_boundary(now),
            Local.with_ymd_and_hms(2024, 5, 24, 10, 0, 0).unwrap()
        );
    }
}
