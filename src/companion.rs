//! Data sources for the companion process: tide, weather, sun times, and
//! location, each fetched on demand and pushed to the face over the link.

use crate::{config::Config, link::CompanionLink, message::FieldUpdate};
use anyhow::{bail, Context};
use chrono::{DateTime, FixedOffset, Local, Timelike};
use itertools::Itertools;
use log::{error, info};
use serde::Deserialize;

/// Stands in anywhere a value couldn't be fetched
const DEFAULT_VALUE: &str = "...";
/// Chance of precipitation below which an uncertain forecast gets its
/// question mark, e.g. "rain?"
const CHANCE_OF_RAIN_CUTOFF: u32 = 60;

const WEATHER_HOST: &str = "https://api.weather.gov";
const SUN_HOST: &str = "https://api.sunrise-sunset.org";
const TIDE_HOST: &str = "https://tidesandcurrents.noaa.gov";

type Source = fn(&Config) -> anyhow::Result<FieldUpdate>;

/// Data sources in send order. Each one gets its own message so the face
/// fills in as results land instead of waiting for the slowest fetch.
const SOURCES: [(&str, Source); 5] = [
    ("switches", switches),
    ("location", location),
    ("sun times", sun_times),
    ("conditions", conditions),
    ("tide", tide),
];

/// Fetch everything once and push it to the face piece by piece. A source
/// that fails is logged and skipped; the face keeps its placeholders for
/// those widgets.
pub fn run_pass(
    config: &Config,
    link: &mut CompanionLink,
) -> anyhow::Result<()> {
    for (name, source) in SOURCES {
        match source(config) {
            Ok(update) => link
                .send(&update)
                .with_context(|| format!("Error sending {name} update"))?,
            Err(err) => error!("Error fetching {name}: {err:#}"),
        }
    }
    Ok(())
}

/// Settings the face applies rather than displays, currently just the
/// inversion switch
fn switches(config: &Config) -> anyhow::Result<FieldUpdate> {
    Ok(FieldUpdate {
        invert: Some(config.invert.to_string()),
        ..Default::default()
    })
}

/// The footer line: raw coordinates, or the nearest city when configured
fn location(config: &Config) -> anyhow::Result<FieldUpdate> {
    let location = if config.show_city {
        match nearest_city(config) {
            Ok(city) => city,
            Err(err) => {
                error!("Error looking up city: {err:#}");
                format!("{DEFAULT_VALUE}, {DEFAULT_VALUE}")
            }
        }
    } else {
        format!("{:.5}, {:.5}", config.latitude, config.longitude)
    };
    Ok(FieldUpdate {
        location: Some(location),
        ..Default::default()
    })
}

fn nearest_city(config: &Config) -> anyhow::Result<String> {
    let url = format!(
        "{WEATHER_HOST}/points/{},{}",
        config.latitude, config.longitude
    );
    let response: PointsResponse = ureq::get(&url)
        .call()
        .with_context(|| {
            format!("Error fetching location from {WEATHER_HOST}")
        })?
        .into_json()
        .context("Error parsing location as JSON")?;
    let properties = response.properties.relative_location.properties;
    Ok(format!(
        "{}, {}",
        lower_or_default(properties.city),
        lower_or_default(properties.state)
    ))
}

/// Today's sunrise and sunset as "rise  set"
fn sun_times(config: &Config) -> anyhow::Result<FieldUpdate> {
    let url = format!(
        "{SUN_HOST}/json?lat={}&lng={}&date=today&formatted=0",
        config.latitude, config.longitude
    );
    let response: SunResponse = ureq::get(&url)
        .call()
        .with_context(|| format!("Error fetching sun times from {SUN_HOST}"))?
        .into_json()
        .context("Error parsing sun times as JSON")?;
    let sunrise = format_sun_time(response.results.sunrise);
    let sunset = format_sun_time(response.results.sunset);
    Ok(FieldUpdate {
        sunset: Some(format!("{sunrise}  {sunset}")),
        ..Default::default()
    })
}

/// Current conditions and today's forecast, folded into one update: the
/// temperature pair "now/hi", the forecast label, and the wind line. Each
/// piece degrades to the placeholder on its own.
fn conditions(config: &Config) -> anyhow::Result<FieldUpdate> {
    let daily = try_first_period(config, "forecast");
    let hourly = try_first_period(config, "forecast/hourly");
    if daily.is_none() && hourly.is_none() {
        bail!("No forecast data available");
    }
    let daily = daily.unwrap_or_default();
    let hourly = hourly.unwrap_or_default();

    let now = format_temperature(hourly.temperature, config.units_celsius);
    let hi = format_temperature(daily.temperature, config.units_celsius);
    let forecast = match daily.icon.as_deref() {
        Some(icon) => forecast_label(icon),
        None => DEFAULT_VALUE.into(),
    };
    let speed = match hourly.wind_speed.as_deref().and_then(leading_number) {
        Some(speed) => speed.to_string(),
        None => DEFAULT_VALUE.into(),
    };
    let direction = match hourly.wind_direction.as_deref() {
        Some(direction) => format_wind_direction(direction),
        None => DEFAULT_VALUE.into(),
    };

    Ok(FieldUpdate {
        temperature: Some(format!("{now}/{hi}")),
        forecast: Some(forecast),
        wind: Some(format!("{speed} {direction}")),
        ..Default::default()
    })
}

/// The tide readout "current/next  time": the height now, the height at
/// the coming high or low water, and when that happens
fn tide(config: &Config) -> anyhow::Result<FieldUpdate> {
    let station = nearest_station(config)?;
    info!("Using tide station {station}");
    let now = Local::now();
    let url = format!(
        "{TIDE_HOST}/api/datagetter?begin_date={}%20{}&range=7\
        &station={station}&product=predictions&datum=mllw&units=english\
        &time_zone=lst_ldt&application=web_services&format=json",
        now.format("%m/%d/%Y"),
        now.format("%H:%M"),
    );
    let response: PredictionsResponse = ureq::get(&url)
        .call()
        .with_context(|| {
            format!("Error fetching tide predictions from {TIDE_HOST}")
        })?
        .into_json()
        .context("Error parsing tide predictions as JSON")?;
    let tide = describe_tide(&response.predictions)
        .context("Not enough usable tide predictions")?;
    Ok(FieldUpdate {
        tide: Some(tide),
        ..Default::default()
    })
}

fn nearest_station(config: &Config) -> anyhow::Result<String> {
    let url = format!(
        "{TIDE_HOST}/mdapi/latest/webapi/tidepredstations.json\
        ?lat={}&lon={}&radius=50",
        config.latitude, config.longitude
    );
    let response: StationsResponse = ureq::get(&url)
        .call()
        .with_context(|| {
            format!("Error fetching tide stations from {TIDE_HOST}")
        })?
        .into_json()
        .context("Error parsing tide stations as JSON")?;
    response
        .station_list
        .into_iter()
        // Only reference stations carry their own prediction data
        .find(|station| station.station_type == "R")
        .map(|station| station.station_id)
        .context("No reference tide station within range")
}

/// Fetch the first period of a forecast feed, the one covering right now.
/// Failures are logged here so one dead feed doesn't sink the other.
fn try_first_period(config: &Config, path: &str) -> Option<ForecastPeriod> {
    match first_period(config, path) {
        Ok(period) => Some(period),
        Err(err) => {
            error!("Error fetching {path}: {err:#}");
            None
        }
    }
}

fn first_period(config: &Config, path: &str) -> anyhow::Result<ForecastPeriod> {
    let url = format!(
        "{WEATHER_HOST}/points/{},{}/{path}",
        config.latitude, config.longitude
    );
    let response: ForecastResponse = ureq::get(&url)
        .call()
        .with_context(|| {
            format!("Error fetching forecast from {WEATHER_HOST}")
        })?
        .into_json()
        .context("Error parsing forecast as JSON")?;
    response
        .properties
        .periods
        .into_iter()
        .next()
        .context("Forecast has no periods")
}

/// Describe the prediction series as "current/next  time". Returns None
/// when the series is too short or unparseable.
fn describe_tide(predictions: &[Prediction]) -> Option<String> {
    let current = predictions.first()?.height()?;
    let second = predictions.get(1)?.height()?;
    let rising = current < second;

    // The next high or low water is wherever the height stops moving the
    // way it's moving now. If it never turns, the last prediction wins.
    let mut next = predictions.last()?;
    for (trailing, traveling) in predictions.iter().tuple_windows() {
        let rising_now = trailing.height()? < traveling.height()?;
        if rising_now != rising {
            next = trailing;
            break;
        }
    }

    Some(format!(
        "{}/{}  {}",
        current.round() as i64,
        next.height()?.round() as i64,
        next.time_of_day()?,
    ))
}

/// Describe a forecast icon URL as a short label like "rain?". The
/// question mark marks uncertain precipitation under the chance cutoff.
fn forecast_label(icon_url: &str) -> String {
    let (code, chance) = parse_icon_url(icon_url);
    let Some((label, uncertain)) = icon_info(&code.to_lowercase()) else {
        return DEFAULT_VALUE.into();
    };
    let question_mark = match chance {
        Some(chance) if uncertain && chance < CHANCE_OF_RAIN_CUTOFF => "?",
        _ => "",
    };
    format!("{label}{question_mark}")
}

/// Pull the condition code and chance of precipitation out of an icon URL
/// like "https://api.weather.gov/icons/land/day/tsra,40?size=medium"
fn parse_icon_url(url: &str) -> (&str, Option<u32>) {
    let path = url.split_once('?').map_or(url, |(path, _)| path);
    let segment = path.rsplit_once('/').map_or(path, |(_, segment)| segment);
    match segment.split_once(',') {
        Some((code, chance)) => (code, chance.parse().ok()),
        None => (segment, None),
    }
}

/// Condition label for an icon code, and whether the condition is the
/// uncertain-precipitation kind that earns a question mark
/// https://api.weather.gov/icons
fn icon_info(code: &str) -> Option<(&'static str, bool)> {
    match code {
        "skc" | "few" | "wind_skc" | "wind_few" => Some(("clear", false)),
        "sct" | "wind_sct" => Some(("clouds", false)),
        "bkn" | "ovc" | "wind_bkn" | "wind_ovc" => Some(("cloudy", false)),
        "snow" | "snow_sleet" | "snow_fzra" => Some(("snow", true)),
        "rain_snow" | "rain_sleet" | "fzra" | "rain_fzra" | "rain"
        | "rain_showers" | "rain_showers_hi" => Some(("rain", true)),
        "sleet" => Some(("sleet", true)),
        "tsra" | "tsra_sct" | "tsra_hi" | "tornado" | "hurr_warn"
        | "hurr_watch" | "ts_warn" | "ts_watch" | "ts_hurr_warn"
        | "blizzard" => Some(("storms", true)),
        "dust" => Some(("dust", false)),
        "smoke" => Some(("smoke", false)),
        "haze" => Some(("haze", false)),
        "hot" => Some(("hot", false)),
        "cold" => Some(("cold", false)),
        "fog" => Some(("fog", false)),
        _ => None,
    }
}

/// Round a temperature for display, converting first if the face wants
/// Celsius. The upstream APIs report Fahrenheit.
fn format_temperature(temperature: Option<f64>, celsius: bool) -> String {
    match temperature {
        Some(temperature) => {
            let temperature = if celsius {
                fahrenheit_to_celsius(temperature)
            } else {
                temperature
            };
            (temperature.round() as i64).to_string()
        }
        None => DEFAULT_VALUE.into(),
    }
}

fn fahrenheit_to_celsius(temperature: f64) -> f64 {
    (temperature - 32.0) * 5.0 / 9.0
}

/// Leading digits of a string like "5 mph"
fn leading_number(value: &str) -> Option<i64> {
    let end = value
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(value.len());
    value[..end].parse().ok()
}

/// Lowercase a compass direction, spelling out the four cardinals
fn format_wind_direction(direction: &str) -> String {
    let lower = direction.to_lowercase();
    match lower.as_str() {
        "n" => "north".into(),
        "e" => "east".into(),
        "s" => "south".into(),
        "w" => "west".into(),
        _ => lower,
    }
}

fn format_sun_time(time: Option<DateTime<FixedOffset>>) -> String {
    match time {
        Some(time) => {
            let local = time.with_timezone(&Local);
            format!("{}:{:02}", to_twelve_hour(local.hour()), local.minute())
        }
        None => DEFAULT_VALUE.into(),
    }
}

/// Convert a 24-hour clock hour to 12-hour, where midnight reads as 12
fn to_twelve_hour(hour: u32) -> u32 {
    match hour % 12 {
        0 => 12,
        hour => hour,
    }
}

fn lower_or_default(value: Option<String>) -> String {
    match value {
        Some(value) => value.to_lowercase(),
        None => DEFAULT_VALUE.into(),
    }
}

/// https://www.weather.gov/documentation/services-web-api#/default/point
#[derive(Debug, Deserialize)]
struct PointsResponse {
    properties: PointsProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PointsProperties {
    relative_location: RelativeLocation,
}

#[derive(Debug, Deserialize)]
struct RelativeLocation {
    properties: LocationProperties,
}

#[derive(Debug, Deserialize)]
struct LocationProperties {
    city: Option<String>,
    state: Option<String>,
}

/// https://www.weather.gov/documentation/services-web-api#/default/gridpoint_forecast
#[derive(Debug, Deserialize)]
struct ForecastResponse {
    properties: ForecastProperties,
}

#[derive(Debug, Deserialize)]
struct ForecastProperties {
    periods: Vec<ForecastPeriod>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct ForecastPeriod {
    temperature: Option<f64>,
    icon: Option<String>,
    wind_speed: Option<String>,
    wind_direction: Option<String>,
}

/// https://sunrise-sunset.org/api
#[derive(Debug, Deserialize)]
struct SunResponse {
    results: SunResults,
}

#[derive(Debug, Deserialize)]
struct SunResults {
    sunrise: Option<DateTime<FixedOffset>>,
    sunset: Option<DateTime<FixedOffset>>,
}

/// https://tidesandcurrents.noaa.gov/mdapi/latest/
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StationsResponse {
    station_list: Vec<Station>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Station {
    station_id: String,
    station_type: String,
}

/// https://api.tidesandcurrents.noaa.gov/api/prod/
#[derive(Debug, Deserialize)]
struct PredictionsResponse {
    predictions: Vec<Prediction>,
}

/// One tide prediction: a local timestamp like "2024-05-24 01:18" and a
/// height in feet
#[derive(Debug, Deserialize)]
struct Prediction {
    t: String,
    v: String,
}

impl Prediction {
    fn height(&self) -> Option<f64> {
        self.v.parse().ok()
    }

    /// Clock label for the prediction, e.g. "3:18"
    fn time_of_day(&self) -> Option<String> {
        let time = self.t.split(' ').nth(1)?;
        let (hour, minutes) = time.split_once(':')?;
        let hour: u32 = hour.parse().ok()?;
        Some(format!("{}:{minutes}", to_twelve_hour(hour)))
    }
}
