//! Renders a single instant through a token string.
//!
//! Every letter of the token alphabet maps to one field of the instant; any
//! other character is copied through, and `\` copies the character after it
//! verbatim.

use std::fmt::Display;

use chrono::{DateTime, Datelike, Offset, TimeZone, Timelike};

use crate::consts::{
    ABBREVIATION_LEN, BEATS_PER_DAY, BMT_OFFSET_SECS, CENTURY_CYCLE, DAYS_IN_MONTH, DECEMBER, ESCAPE,
    FEBRUARY, FEBRUARY_DAYS_LEAP, GREGORIAN_CYCLE, LEAP_YEAR_CYCLE, MONTH_NAMES, SECONDS_PER_DAY,
    SECONDS_PER_HOUR, SECONDS_PER_MINUTE, WEEKDAY_NAMES,
};

const ISO_8601: &str = "Y-m-d\\TH:i:sP";
const RFC_2822: &str = "D, d M Y H:i:s O";

/// Formats `instant` according to `tokens`.
pub fn render<Tz>(instant: &DateTime<Tz>, tokens: &str) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let mut out = String::with_capacity(tokens.len() * 2);
    let mut chars = tokens.chars();
    while let Some(c) = chars.next() {
        if c == ESCAPE {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
            continue;
        }
        match render_token(instant, c) {
            Some(field) => out.push_str(&field),
            None => out.push(c),
        }
    }
    out
}

fn render_token<Tz>(instant: &DateTime<Tz>, token: char) -> Option<String>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let weekday = WEEKDAY_NAMES[instant.weekday().num_days_from_monday() as usize];
    let month = MONTH_NAMES[instant.month() as usize];
    let (is_pm, hour12) = instant.hour12();

    let field = match token {
        // Day
        'd' => format!("{:02}", instant.day()),
        'D' => abbreviate(weekday).to_owned(),
        'j' => instant.day().to_string(),
        'l' => weekday.to_owned(),
        'N' => instant.weekday().number_from_monday().to_string(),
        'S' => ordinal_suffix(instant.day()).to_owned(),
        'w' => instant.weekday().num_days_from_sunday().to_string(),
        'z' => instant.ordinal0().to_string(),
        // Week
        'W' => format!("{:02}", instant.iso_week().week()),
        // Month
        'F' => month.to_owned(),
        'M' => abbreviate(month).to_owned(),
        'm' => format!("{:02}", instant.month()),
        'n' => instant.month().to_string(),
        't' => days_in_month(instant.year(), instant.month()).unwrap_or_default().to_string(),
        // Year
        'L' => u8::from(is_leap_year(instant.year())).to_string(),
        'o' => instant.iso_week().year().to_string(),
        'Y' => instant.year().to_string(),
        'y' => format!("{:02}", instant.year().rem_euclid(100)),
        // Time
        'a' => (if is_pm { "pm" } else { "am" }).to_owned(),
        'A' => (if is_pm { "PM" } else { "AM" }).to_owned(),
        'B' => format!("{:03}", swatch_beat(instant.timestamp())),
        'g' => hour12.to_string(),
        'G' => instant.hour().to_string(),
        'h' => format!("{hour12:02}"),
        'H' => format!("{:02}", instant.hour()),
        'i' => format!("{:02}", instant.minute()),
        's' => format!("{:02}", instant.second()),
        'u' => format!("{:06}", instant.nanosecond() / 1_000 % 1_000_000),
        'v' => format!("{:03}", instant.nanosecond() / 1_000_000 % 1_000),
        // Timezone
        'e' | 'T' => instant.offset().to_string(),
        'I' => "0".to_owned(),
        'O' => utc_offset(instant.offset().fix().local_minus_utc(), false),
        'P' => utc_offset(instant.offset().fix().local_minus_utc(), true),
        'Z' => instant.offset().fix().local_minus_utc().to_string(),
        // Full date/time
        'c' => render(instant, ISO_8601),
        'r' => render(instant, RFC_2822),
        'U' => instant.timestamp().to_string(),
        _ => return None,
    };
    Some(field)
}

fn abbreviate(name: &str) -> &str {
    name.get(..ABBREVIATION_LEN).unwrap_or(name)
}

/// English ordinal suffix for a day of the month
fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

fn swatch_beat(timestamp: i64) -> i64 {
    let secs = (timestamp + BMT_OFFSET_SECS).rem_euclid(SECONDS_PER_DAY);
    secs * BEATS_PER_DAY / SECONDS_PER_DAY
}

fn utc_offset(local_minus_utc: i32, colon: bool) -> String {
    let sign = if local_minus_utc < 0 { '-' } else { '+' };
    let secs = local_minus_utc.abs();
    let hours = secs / SECONDS_PER_HOUR;
    let minutes = secs % SECONDS_PER_HOUR / SECONDS_PER_MINUTE;
    if colon {
        format!("{sign}{hours:02}:{minutes:02}")
    } else {
        format!("{sign}{hours:02}{minutes:02}")
    }
}

// Helper functions

pub const fn is_leap_year(year: i32) -> bool {
    (year % LEAP_YEAR_CYCLE == 0 && year % CENTURY_CYCLE != 0) || (year % GREGORIAN_CYCLE == 0)
}

/// Days in `month` of `year`, or `None` when `month` is not 1 through 12
pub const fn days_in_month(year: i32, month: u32) -> Option<u32> {
    if month == 0 || month > DECEMBER {
        return None;
    }

    if month == FEBRUARY && is_leap_year(year) {
        Some(FEBRUARY_DAYS_LEAP)
    } else {
        Some(DAYS_IN_MONTH[month as usize])
    }
}
