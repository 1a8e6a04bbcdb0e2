//! Fixed-capacity widget text and clock/date formatting

use chrono::{DateTime, Local};

/// Capacity of the clock readout
pub const CLOCK_LEN: usize = 12;
/// Capacity of the date readout
pub const DATE_LEN: usize = 32;
/// Capacity of each field pushed over the link
pub const FIELD_LEN: usize = 32;
/// Capacity of the location line in the footer bar
pub const LOCATION_LEN: usize = 48;

/// Text for one widget on the face. Capacity is fixed so a rogue message
/// can't grow the face's memory; oversized values are truncated at the
/// nearest character boundary.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct WidgetText<const N: usize>(heapless::String<N>);

impl<const N: usize> WidgetText<N> {
    pub fn new() -> Self {
        Self(heapless::String::new())
    }

    /// Replace the contents, truncating to capacity
    pub fn set(&mut self, value: &str) {
        self.0.clear();
        let mut end = value.len().min(N);
        while !value.is_char_boundary(end) {
            end -= 1;
        }
        // Can't fail, the slice is clamped to capacity
        let _ = self.0.push_str(&value[..end]);
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<const N: usize> From<&str> for WidgetText<N> {
    fn from(value: &str) -> Self {
        let mut text = Self::new();
        text.set(value);
        text
    }
}

/// Format the time of day, e.g. "9:41". 12-hour mode drops the leading
/// zero, 24-hour mode keeps it.
pub fn clock_text(
    now: DateTime<Local>,
    clock_24h: bool,
) -> WidgetText<CLOCK_LEN> {
    if clock_24h {
        now.format("%H:%M").to_string().as_str().into()
    } else {
        let clock = now.format("%I:%M").to_string();
        clock.strip_prefix('0').unwrap_or(&clock).into()
    }
}

/// Format the date line, e.g. "3/5  tue"
pub fn date_text(now: DateTime<Local>) -> WidgetText<DATE_LEN> {
    let date = now.format("%m/%d  %a").to_string();
    let mut date = strip_date_zeros(&date);
    date.make_ascii_lowercase();
    date.as_str().into()
}

/// Drop the zero that starts each numeric segment, so "03/05" reads "3/5"
fn strip_date_zeros(date: &str) -> String {
    let mut stripped = String::with_capacity(date.len());
    let mut prev = None;
    for c in date.chars() {
        let segment_start = prev.is_none() || prev == Some('/');
        if !(segment_start && c == '0') {
            stripped.push(c);
        }
        prev = Some(c);
    }
    stripped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_clock_text() {
        let morning = Local.with_ymd_and_hms(2024, 3, 5, 9, 5, 0).unwrap();
        assert_eq!(clock_text(morning, false).as_str(), "9:05");
        assert_eq!(clock_text(morning, true).as_str(), "09:05");

        let midnight = Local.with_ymd_and_hms(2024, 3, 5, 0, 30, 0).unwrap();
        assert_eq!(clock_text(midnight, false).as_str(), "12:30");
        assert_eq!(clock_text(midnight, true).as_str(), "00:30");

        let evening = Local.with_ymd_and_hms(2024, 3, 5, 22, 15, 0).unwrap();
        assert_eq!(clock_text(evening, false).as_str(), "10:15");
        assert_eq!(clock_text(evening, true).as_str(), "22:15");
    }

    #[test]
    fn test_date_text() {
        // A Tuesday
        let day = Local.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap();
        assert_eq!(date_text(day).as_str(), "3/5  tue");
        // A Monday with nothing to strip
        let day = Local.with_ymd_and_hms(2024, 11, 25, 12, 0, 0).unwrap();
        assert_eq!(date_text(day).as_str(), "11/25  mon");
        // Zero in the day only
        let day = Local.with_ymd_and_hms(2024, 10, 4, 12, 0, 0).unwrap();
        assert_eq!(date_text(day).as_str(), "10/4  fri");
    }

    #[test]
    fn test_truncation() {
        let text = WidgetText::<8>::from("a very long value");
        assert_eq!(text.as_str(), "a very l");
        // Truncation never splits a character
        let text = WidgetText::<4>::from("aéé");
        assert_eq!(text.as_str(), "aé");
    }

    #[test]
    fn test_set_clears() {
        let mut text = WidgetText::<16>::from("12:34");
        text.set("...");
        assert_eq!(text.as_str(), "...");
    }
}
