use chrono::{DateTime, FixedOffset, TimeDelta, TimeZone, Utc};

use crate::DateRange;

pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, second)
        .single()
        .expect("failed to construct UTC test instant")
}

pub fn at_offset(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
    offset_secs: i32,
) -> DateTime<FixedOffset> {
    FixedOffset::east_opt(offset_secs)
        .expect("failed to construct test offset")
        .with_ymd_and_hms(year, month, day, hour, minute, second)
        .single()
        .expect("failed to construct offset test instant")
}

pub fn range(start: DateTime<Utc>, end: DateTime<Utc>) -> DateRange<Utc> {
    DateRange::new(start, end, TimeDelta::days(1)).expect("failed to construct test range")
}
