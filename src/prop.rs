//! The propeller sprite spinning over the center of the face

use crate::palette::Palette;
use embedded_graphics::{
    framebuffer::{buffer_size, Framebuffer},
    image::GetPixel,
    pixelcolor::{
        raw::{LittleEndian, RawU1},
        BinaryColor,
    },
    prelude::*,
    primitives::{Circle, Line, PointsIter, PrimitiveStyle},
};
use std::time::Duration;

/// Frames in one revolution. The blades have threefold symmetry, so eight
/// 15 degree steps bring the sprite back to its starting pose.
pub const FRAME_COUNT: usize = 8;
/// Revolutions in one spin-up
const LOOPS: usize = 10;
/// Delay between frames
pub const FRAME_DELAY: Duration = Duration::from_millis(50);
/// Sprite edge length, in pixels
pub const PROP_SIZE: usize = 48;

/// Frame advances in one spin-up
const RUN_LENGTH: usize = FRAME_COUNT * LOOPS;

/// Hub disc diameter
const HUB_DIAMETER: u32 = 6;
/// Blade stroke width
const BLADE_WIDTH: u32 = 2;

/// Blade tip offsets from the hub, every 15 degrees around a circle of
/// radius 20
const BLADE_TIPS: [(i32, i32); 24] = [
    (20, 0),
    (19, 5),
    (17, 10),
    (14, 14),
    (10, 17),
    (5, 19),
    (0, 20),
    (-5, 19),
    (-10, 17),
    (-14, 14),
    (-17, 10),
    (-19, 5),
    (-20, 0),
    (-19, -5),
    (-17, -10),
    (-14, -14),
    (-10, -17),
    (-5, -19),
    (0, -20),
    (5, -19),
    (10, -17),
    (14, -14),
    (17, -10),
    (19, -5),
];

/// Cursor for the spin animation. Tracks where the propeller is in its
/// run and whether the frame timer should stay armed.
#[derive(Copy, Clone, Debug, Default)]
pub struct PropAnimation {
    step: usize,
    armed: bool,
}

impl PropAnimation {
    /// Start a spin-up from the first frame. Restarting mid-run snaps
    /// back to the first frame rather than carrying the old position.
    pub fn restart(&mut self) {
        self.step = 0;
        self.armed = true;
    }

    /// Advance one frame. Returns whether the timer should be re-armed;
    /// once the run is exhausted the cursor parks on the first frame.
    pub fn advance(&mut self) -> bool {
        if self.step < RUN_LENGTH {
            self.step += 1;
        } else {
            self.step = 0;
            self.armed = false;
        }
        self.armed
    }

    /// Index of the frame to show
    pub fn frame(&self) -> usize {
        self.step % FRAME_COUNT
    }

    pub fn armed(&self) -> bool {
        self.armed
    }
}

/// One baked sprite frame
type PropFrame = Framebuffer<
    BinaryColor,
    RawU1,
    LittleEndian,
    PROP_SIZE,
    PROP_SIZE,
    { buffer_size::<BinaryColor>(PROP_SIZE, PROP_SIZE) },
>;

/// The propeller's sprite sheet, one frame per blade pose. Frames get
/// rebaked whenever the palette changes, which keeps the per-frame draw
/// path down to a plain blit.
pub struct PropFrames {
    frames: [PropFrame; FRAME_COUNT],
    blade: BinaryColor,
}

impl PropFrames {
    /// Bake the full sprite sheet in the given palette
    pub fn render(palette: &Palette) -> Self {
        let blade = palette.text_fg;
        let center = Point::new(PROP_SIZE as i32 / 2, PROP_SIZE as i32 / 2);
        let stroke = PrimitiveStyle::with_stroke(blade, BLADE_WIDTH);
        let frames = std::array::from_fn(|frame_index| {
            let mut frame = PropFrame::new();
            // These draws are all infallible because they're into a buffer
            frame.clear(palette.main_bg).unwrap();
            for blade_index in 0..3 {
                let tip_index = (frame_index + blade_index * FRAME_COUNT)
                    % BLADE_TIPS.len();
                let (dx, dy) = BLADE_TIPS[tip_index];
                Line::new(center, center + Point::new(dx, dy))
                    .into_styled(stroke)
                    .draw(&mut frame)
                    .unwrap();
            }
            Circle::with_center(center, HUB_DIAMETER)
                .into_styled(PrimitiveStyle::with_fill(blade))
                .draw(&mut frame)
                .unwrap();
            frame
        });
        Self { frames, blade }
    }

    /// Blit one frame onto the face at the given origin. Background
    /// pixels are skipped so the sprite composites over whatever is
    /// already drawn underneath.
    pub fn draw<D>(
        &self,
        frame: usize,
        origin: Point,
        target: &mut D,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        let frame = &self.frames[frame % FRAME_COUNT];
        target.draw_iter(frame.bounding_box().points().filter_map(|point| {
            let color = frame.pixel(point)?;
            (color == self.blade).then_some(Pixel(point + origin, color))
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_run() {
        let mut prop = PropAnimation::default();
        prop.restart();
        assert!(prop.armed());
        assert_eq!(prop.frame(), 0);

        // Every advance through the run keeps the timer armed
        for _ in 0..RUN_LENGTH {
            assert!(prop.advance());
        }
        // The run ends on the seam between revolutions
        assert_eq!(prop.frame(), 0);

        // One more advance parks the animation
        assert!(!prop.advance());
        assert_eq!(prop.frame(), 0);
        assert!(!prop.armed());
    }

    #[test]
    fn test_restart_resets() {
        let mut prop = PropAnimation::default();
        prop.restart();
        for _ in 0..13 {
            prop.advance();
        }
        assert_eq!(prop.frame(), 13 % FRAME_COUNT);

        prop.restart();
        assert_eq!(prop.frame(), 0);
        assert!(prop.armed());
    }

    #[test]
    fn test_frames_differ() {
        let frames = PropFrames::render(&Palette::new(false));
        // Neighboring frames hold the blades in different poses, and
        // every frame has some blade to show
        assert_ne!(frames.frames[0].data(), frames.frames[1].data());
        for frame in &frames.frames {
            let lit = frame.data().iter().filter(|byte| **byte != 0).count();
            assert!(lit > 0);
        }
    }

    #[test]
    fn test_blit_skips_background() {
        let frames = PropFrames::render(&Palette::new(false));
        let mut target = PropFrame::new();
        // A lit canvas stays lit everywhere the blades aren't
        target.clear(BinaryColor::On).unwrap();
        frames.draw(0, Point::zero(), &mut target).unwrap();
        let dark = target
            .bounding_box()
            .points()
            .filter(|point| target.pixel(*point) == Some(BinaryColor::Off))
            .count();
        assert_eq!(dark, 0);
    }
}
