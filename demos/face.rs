//! Render one frame of the face with canned data, without the socket or
//! the panel attached

use chrono::Local;
use embedded_graphics::{image::GetPixel, pixelcolor::BinaryColor, prelude::*};
use log::LevelFilter;
use spindrift::{
    config::Config,
    face::{FaceFrame, Watchface},
    layout::{HEIGHT, WIDTH},
    message::FieldUpdate,
};

fn main() -> anyhow::Result<()> {
    env_logger::builder()
        .filter_module("spindrift", LevelFilter::Trace)
        .parse_default_env()
        .init();

    let config = Config::load()?;
    let mut face = Watchface::new(&config);
    face.update_clock(Local::now());
    face.on_fields_received(&FieldUpdate {
        tide: Some("2/4  3:18".into()),
        wind: Some("8 sse".into()),
        sunset: Some("5:43  7:58".into()),
        temperature: Some("71/74".into()),
        location: Some("newport, ri".into()),
        forecast: Some("rain?".into()),
        ..Default::default()
    });

    let mut frame = FaceFrame::new();
    face.draw(&mut frame)?;

    // Crude terminal preview, one character per pixel
    for y in 0..HEIGHT {
        let row: String = (0..WIDTH)
            .map(|x| {
                match frame.pixel(Point::new(x as i32, y as i32)) {
                    Some(BinaryColor::On) => '#',
                    _ => ' ',
                }
            })
            .collect();
        println!("{row}");
    }
    Ok(())
}
