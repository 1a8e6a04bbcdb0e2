//! The watch face itself: widget text, refresh bookkeeping, and drawing

use crate::{
    config::Config,
    layout::{
        Row, BAR_ROW, BAR_TEXT_ROW, DATE_ROW, HEIGHT, PROP_ORIGIN, SUNSET_ROW,
        TEMPERATURE_ROW, TIDE_ROW, TIME_ROW, WIDTH, WIND_ROW,
    },
    message::FieldUpdate,
    palette::Palette,
    prop::{PropAnimation, PropFrames},
    settings::{DisplaySettings, SettingsStore},
    text::{self, WidgetText, CLOCK_LEN, DATE_LEN, FIELD_LEN, LOCATION_LEN},
};
use anyhow::anyhow;
use chrono::{DateTime, Local, Timelike};
use embedded_graphics::{
    framebuffer::{buffer_size, Framebuffer},
    pixelcolor::{
        raw::{LittleEndian, RawU1},
        BinaryColor,
    },
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle},
};
use std::fmt::Debug;
use u8g2_fonts::{
    fonts,
    types::{FontColor, HorizontalAlignment, VerticalPosition},
    FontRenderer,
};

/// Minutes between refresh requests to the companion
pub const REFRESH_MINUTES: u32 = 30;

const TIME_LABEL: &str = "now";
const TIDE_LABEL: &str = "tide";
const WIND_LABEL: &str = "wind";
const SUNSET_LABEL: &str = "sun";
const DATE_LABEL: &str = "day";

const TIME_FONT: FontRenderer =
    FontRenderer::new::<fonts::u8g2_font_helvB18_tf>();
const ROW_FONT: FontRenderer =
    FontRenderer::new::<fonts::u8g2_font_helvB14_tf>();
const BAR_FONT: FontRenderer =
    FontRenderer::new::<fonts::u8g2_font_helvR08_tf>();

/// One full frame of face pixels
pub type FaceFrame = Framebuffer<
    BinaryColor,
    RawU1,
    LittleEndian,
    WIDTH,
    HEIGHT,
    { buffer_size::<BinaryColor>(WIDTH, HEIGHT) },
>;

/// All the state behind the face: widget text, the palette, the propeller,
/// and the persisted settings. Everything here is plain data; painting a
/// frame and pushing it to the panel are the caller's problem.
pub struct Watchface {
    settings: SettingsStore,
    palette: Palette,
    prop: PropAnimation,
    prop_frames: PropFrames,
    clock_24h: bool,

    clock: WidgetText<CLOCK_LEN>,
    date: WidgetText<DATE_LEN>,
    tide: WidgetText<FIELD_LEN>,
    wind: WidgetText<FIELD_LEN>,
    sunset: WidgetText<FIELD_LEN>,
    temperature: WidgetText<FIELD_LEN>,
    /// Label next to the temperature, fed by the forecast field
    temperature_label: WidgetText<FIELD_LEN>,
    location: WidgetText<LOCATION_LEN>,
}

impl Watchface {
    pub fn new(config: &Config) -> Self {
        let settings = SettingsStore::load(&config.settings);
        let palette = Palette::new(settings.get().invert_colors);
        let mut face = Self {
            prop_frames: PropFrames::render(&palette),
            settings,
            palette,
            prop: PropAnimation::default(),
            clock_24h: config.clock_24h,
            clock: WidgetText::new(),
            date: WidgetText::new(),
            tide: WidgetText::new(),
            wind: WidgetText::new(),
            sunset: WidgetText::new(),
            temperature: WidgetText::new(),
            temperature_label: WidgetText::new(),
            location: WidgetText::new(),
        };
        face.reset_placeholders();
        face.prop.restart();
        face
    }

    /// Handle a minute rollover. Returns whether a refresh request should
    /// go out to the companion.
    pub fn on_minute_tick(&mut self, now: DateTime<Local>) -> bool {
        if now.minute() % REFRESH_MINUTES == 0 {
            // Stale values get blanked until the companion answers
            self.reset_placeholders();
            self.update_clock(now);
            self.prop.restart();
            true
        } else {
            self.update_clock(now);
            false
        }
    }

    /// Copy whatever fields the companion sent into their widgets
    pub fn on_fields_received(&mut self, update: &FieldUpdate) {
        if let Some(tide) = &update.tide {
            self.tide.set(tide);
        }
        if let Some(wind) = &update.wind {
            self.wind.set(wind);
        }
        if let Some(sunset) = &update.sunset {
            self.sunset.set(sunset);
        }
        if let Some(temperature) = &update.temperature {
            self.temperature.set(temperature);
        }
        if let Some(forecast) = &update.forecast {
            self.temperature_label.set(forecast);
        }
        if let Some(location) = &update.location {
            self.location.set(location);
        }
        if let Some(invert) = &update.invert {
            // Exact match only; anything else reads as "don't invert"
            self.apply_inversion(invert == "true");
        }
    }

    /// Advance the propeller one frame. Returns whether the frame timer
    /// should be re-armed.
    pub fn on_timer(&mut self) -> bool {
        self.prop.advance()
    }

    /// Refresh the clock and date readouts
    pub fn update_clock(&mut self, now: DateTime<Local>) {
        self.clock = text::clock_text(now, self.clock_24h);
        self.date = text::date_text(now);
    }

    /// Switch palettes if the inversion flag changed, persisting the flag
    /// and rebaking the propeller sprites. Returns whether anything
    /// actually changed.
    fn apply_inversion(&mut self, invert_colors: bool) -> bool {
        if self.settings.get().invert_colors == invert_colors {
            return false;
        }
        self.settings.set(DisplaySettings { invert_colors });
        self.palette = Palette::new(invert_colors);
        self.prop_frames = PropFrames::render(&self.palette);
        true
    }

    /// Blank every widget back to its boot value
    fn reset_placeholders(&mut self) {
        self.clock.set("...");
        self.date.set(".../...  ...");
        self.tide.set(".../...  ...");
        self.wind.set("... ...");
        self.sunset.set("...  ...");
        self.temperature.set(".../...");
        self.temperature_label.set("...");
        self.location.set("..., ...");
    }

    /// Paint the whole face onto the given target
    pub fn draw<D>(&self, target: &mut D) -> anyhow::Result<()>
    where
        D: DrawTarget<Color = BinaryColor>,
        D::Error: Debug,
    {
        target.clear(self.palette.main_bg).map_err(map_error)?;

        self.draw_row(
            TIDE_ROW,
            TIDE_LABEL,
            self.tide.as_str(),
            &ROW_FONT,
            target,
        )?;
        self.draw_row(
            SUNSET_ROW,
            SUNSET_LABEL,
            self.sunset.as_str(),
            &ROW_FONT,
            target,
        )?;
        self.draw_row(
            WIND_ROW,
            WIND_LABEL,
            self.wind.as_str(),
            &ROW_FONT,
            target,
        )?;
        self.draw_row(
            TIME_ROW,
            TIME_LABEL,
            self.clock.as_str(),
            &TIME_FONT,
            target,
        )?;
        self.draw_row(
            DATE_ROW,
            DATE_LABEL,
            self.date.as_str(),
            &ROW_FONT,
            target,
        )?;
        self.draw_row(
            TEMPERATURE_ROW,
            self.temperature_label.as_str(),
            self.temperature.as_str(),
            &ROW_FONT,
            target,
        )?;

        // Footer bar with the location line
        Rectangle::new(
            Point::new(0, BAR_ROW.y),
            Size::new(WIDTH as u32, BAR_ROW.height as u32),
        )
        .into_styled(PrimitiveStyle::with_fill(self.palette.bar_bg))
        .draw(target)
        .map_err(map_error)?;
        BAR_FONT
            .render_aligned(
                self.location.as_str(),
                Point::new(WIDTH as i32 / 2, BAR_TEXT_ROW.center_y()),
                VerticalPosition::Center,
                HorizontalAlignment::Center,
                FontColor::Transparent(self.palette.bar_fg),
                target,
            )
            .map_err(map_error)?;

        // The propeller sits over everything, parked on its first frame
        // whenever it isn't spinning
        self.prop_frames
            .draw(self.prop.frame(), PROP_ORIGIN, target)
            .map_err(map_error)?;

        Ok(())
    }

    /// Draw one label/value row, label on the left edge and value on the
    /// right
    fn draw_row<D>(
        &self,
        row: Row,
        label: &str,
        value: &str,
        font: &FontRenderer,
        target: &mut D,
    ) -> anyhow::Result<()>
    where
        D: DrawTarget<Color = BinaryColor>,
        D::Error: Debug,
    {
        font.render_aligned(
            label,
            Point::new(0, row.center_y()),
            VerticalPosition::Center,
            HorizontalAlignment::Left,
            self.text_color(),
            target,
        )
        .map_err(map_error)?;
        font.render_aligned(
            value,
            Point::new(WIDTH as i32 - 1, row.center_y()),
            VerticalPosition::Center,
            HorizontalAlignment::Right,
            self.text_color(),
            target,
        )
        .map_err(map_error)?;
        Ok(())
    }

    fn text_color(&self) -> FontColor<BinaryColor> {
        match self.palette.text_bg {
            Some(bg) => FontColor::WithBackground {
                fg: self.palette.text_fg,
                bg,
            },
            None => FontColor::Transparent(self.palette.text_fg),
        }
    }
}

/// Draw errors don't implement Error so we have to map manually
fn map_error(error: impl Debug) -> anyhow::Error {
    anyhow!("{error:?}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::{env, fs};

    /// Config pointing at a fresh settings file under the temp dir
    fn test_config(name: &str) -> Config {
        let settings =
            env::temp_dir().join(format!("spindrift-face-{name}.json"));
        let _ = fs::remove_file(&settings);
        Config {
            settings,
            ..Config::default()
        }
    }

    #[test]
    fn test_placeholders() {
        let face = Watchface::new(&test_config("placeholders"));
        assert_eq!(face.clock.as_str(), "...");
        assert_eq!(face.date.as_str(), ".../...  ...");
        assert_eq!(face.tide.as_str(), ".../...  ...");
        assert_eq!(face.wind.as_str(), "... ...");
        assert_eq!(face.sunset.as_str(), "...  ...");
        assert_eq!(face.temperature.as_str(), ".../...");
        assert_eq!(face.temperature_label.as_str(), "...");
        assert_eq!(face.location.as_str(), "..., ...");
        // The propeller spins on startup
        assert!(face.prop.armed());
    }

    #[test]
    fn test_field_dispatch() {
        let mut face = Watchface::new(&test_config("dispatch"));
        face.on_fields_received(&FieldUpdate {
            tide: Some("2/4  3:18".into()),
            temperature: Some("71/74".into()),
            forecast: Some("rain?".into()),
            ..Default::default()
        });
        assert_eq!(face.tide.as_str(), "2/4  3:18");
        assert_eq!(face.temperature.as_str(), "71/74");
        assert_eq!(face.temperature_label.as_str(), "rain?");
        // Fields the message didn't carry keep their placeholders
        assert_eq!(face.wind.as_str(), "... ...");
        assert_eq!(face.location.as_str(), "..., ...");
    }

    #[test]
    fn test_invert_field() {
        let config = test_config("invert-field");
        let mut face = Watchface::new(&config);
        face.on_fields_received(&FieldUpdate {
            tide: Some("4.2 ft".into()),
            invert: Some("true".into()),
            ..Default::default()
        });
        assert_eq!(face.tide.as_str(), "4.2 ft");
        assert_eq!(face.wind.as_str(), "... ...");
        assert_eq!(face.palette, Palette::new(true));

        // The switch lands in the settings file, same as a local toggle
        let reloaded = Watchface::new(&config);
        assert_eq!(reloaded.palette, Palette::new(true));
    }

    #[test]
    fn test_inversion() {
        let config = test_config("inversion");
        let mut face = Watchface::new(&config);
        assert_eq!(face.palette, Palette::new(false));

        assert!(face.apply_inversion(true));
        assert_eq!(face.palette, Palette::new(true));
        // Same value again is a no-op, nothing gets rewritten
        assert!(!face.apply_inversion(true));

        assert!(face.apply_inversion(false));
        assert_eq!(face.palette, Palette::new(false));

        // The flag round-trips through the settings file
        face.apply_inversion(true);
        let reloaded = Watchface::new(&config);
        assert_eq!(reloaded.palette, Palette::new(true));
    }

    #[test]
    fn test_inversion_exact_match() {
        let mut face = Watchface::new(&test_config("inversion-exact"));
        face.on_fields_received(&FieldUpdate {
            invert: Some("True".into()),
            ..Default::default()
        });
        assert_eq!(face.palette, Palette::new(false));

        // Anything other than "true" reads as an un-invert
        face.apply_inversion(true);
        face.on_fields_received(&FieldUpdate {
            invert: Some("True".into()),
            ..Default::default()
        });
        assert_eq!(face.palette, Palette::new(false));
    }

    #[test]
    fn test_minute_tick() {
        let mut face = Watchface::new(&test_config("minute-tick"));
        face.on_fields_received(&FieldUpdate {
            tide: Some("2/4  3:18".into()),
            ..Default::default()
        });
        for _ in 0..3 {
            face.on_timer();
        }
        assert_eq!(face.prop.frame(), 3);

        // An ordinary minute updates the clock and nothing else
        let now = Local.with_ymd_and_hms(2024, 5, 24, 9, 31, 0).unwrap();
        assert!(!face.on_minute_tick(now));
        assert_eq!(face.clock.as_str(), "9:31");
        assert_eq!(face.tide.as_str(), "2/4  3:18");
        assert_eq!(face.prop.frame(), 3);

        // A half-hour boundary blanks the widgets, restarts the spin, and
        // asks for a refresh
        let now = Local.with_ymd_and_hms(2024, 5, 24, 9, 30, 0).unwrap();
        assert!(face.on_minute_tick(now));
        assert_eq!(face.clock.as_str(), "9:30");
        assert_eq!(face.tide.as_str(), ".../...  ...");
        assert_eq!(face.prop.frame(), 0);
        assert!(face.prop.armed());
    }

    #[test]
    fn test_draw() {
        let mut face = Watchface::new(&test_config("draw"));
        let now = Local.with_ymd_and_hms(2024, 5, 24, 9, 31, 0).unwrap();
        face.update_clock(now);
        let mut frame = FaceFrame::new();
        face.draw(&mut frame).unwrap();
        // Normal palette lights text up on a dark background
        let lit = frame.data().iter().filter(|byte| **byte != 0).count();
        assert!(lit > 0);
    }
}
