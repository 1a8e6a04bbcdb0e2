//! Pixel geometry of the face. All positions are in face coordinates,
//! origin at the top-left corner.

use crate::prop::PROP_SIZE;
use embedded_graphics::prelude::Point;

/// Face width in pixels. The panel hangs in portrait, so this is its
/// short edge.
pub const WIDTH: usize = 128;
/// Face height in pixels
pub const HEIGHT: usize = 168;

/// A horizontal band holding one label/value pair
#[derive(Copy, Clone, Debug)]
pub struct Row {
    /// Top edge of the band
    pub y: i32,
    /// Band height
    pub height: i32,
}

impl Row {
    /// Vertical midpoint of the band, where its text gets centered
    pub fn center_y(self) -> i32 {
        self.y + self.height / 2
    }
}

pub const TIDE_ROW: Row = Row { y: -2, height: 25 };
pub const SUNSET_ROW: Row = Row { y: 23, height: 25 };
pub const WIND_ROW: Row = Row { y: 48, height: 25 };
pub const TIME_ROW: Row = Row { y: 73, height: 40 };
pub const DATE_ROW: Row = Row { y: 103, height: 26 };
pub const TEMPERATURE_ROW: Row = Row { y: 128, height: 26 };

/// Footer bar fill, from below the temperature row to the bottom edge
pub const BAR_ROW: Row = Row {
    y: 157,
    height: HEIGHT as i32 - 157,
};
/// Band the location line is centered in. Sits a bit above the bar fill
/// so the text hugs the bottom edge without clipping.
pub const BAR_TEXT_ROW: Row = Row { y: 153, height: 15 };

/// Top-left corner of the propeller sprite, centered on the face
pub const PROP_ORIGIN: Point = Point::new(
    ((WIDTH - PROP_SIZE) / 2) as i32,
    ((HEIGHT - PROP_SIZE) / 2) as i32,
);
