//! Wall-clock conversions for entry timestamps.
//!
//! Entries are stamped with a 12-hour display time (`"1:05 PM"`) while time
//! pickers exchange 24-hour `HH:MM` values. Nothing here touches dates or
//! time zones: a stamp is whatever the local clock read.

use chrono::{Local, NaiveTime, Timelike};

use crate::error::ValidationError;

/// Convert a 24-hour `HH:MM` value into the canonical display form.
///
/// Hour 0 becomes `12 AM`, hour 12 stays `12 PM`, later hours wrap to PM.
/// The hour is not zero-padded; minutes always are.
pub fn to_display_time(input: &str) -> Result<String, ValidationError> {
    let malformed = || ValidationError::MalformedTime(input.to_string());

    let (hours, minutes) = input.trim().split_once(':').ok_or_else(malformed)?;
    if hours.is_empty() || hours.len() > 2 || minutes.len() != 2 {
        return Err(malformed());
    }
    let hours: u32 = parse_digits(hours).ok_or_else(malformed)?;
    let minutes: u32 = parse_digits(minutes).ok_or_else(malformed)?;

    let time = NaiveTime::from_hms_opt(hours, minutes, 0).ok_or_else(malformed)?;
    Ok(format_display(time))
}

/// Display stamp for the current local time.
pub fn now_display_time() -> String {
    format_display(Local::now().time())
}

/// Current local time as a 24-hour `HH:MM` picker value.
pub fn now_input_time() -> String {
    let now = Local::now().time();
    format!("{:02}:{:02}", now.hour(), now.minute())
}

/// Recover the 24-hour `HH:MM` picker value from a stored stamp.
///
/// Accepts the 12-hour display form (`"9:05 pm"`, `"09:05PM"`) as well as
/// legacy 24-hour stamps with optional seconds (`"21:05"`, `"21:05:30"`).
/// Returns `None` when the stamp cannot be read.
pub fn to_input_time(stamp: &str) -> Option<String> {
    let stamp = stamp.trim();
    let (hours, rest) = stamp.split_once(':')?;
    let mut hours: u32 = parse_digits(hours)?;
    if rest.len() < 2 || !rest.is_char_boundary(2) {
        return None;
    }
    let (minutes, tail) = rest.split_at(2);
    let minutes: u32 = parse_digits(minutes)?;

    let tail = tail.trim_start();
    let period = tail.get(..2).map(str::to_ascii_uppercase);
    match period.as_deref() {
        Some("PM") if hours != 12 => hours += 12,
        Some("AM") if hours == 12 => hours = 0,
        Some("AM") | Some("PM") => {}
        _ if tail.is_empty() || tail.starts_with(':') => {}
        _ => return None,
    }

    NaiveTime::from_hms_opt(hours, minutes, 0)?;
    Some(format!("{hours:02}:{minutes:02}"))
}

fn format_display(time: NaiveTime) -> String {
    time.format("%-I:%M %p").to_string()
}

fn parse_digits(s: &str) -> Option<u32> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}
