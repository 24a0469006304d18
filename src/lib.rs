//! Render a date range as one short, human-readable string.
//!
//! A [`FormatDescriptor`] is a token string (`"l, F jS g:ia"`) that knows
//! which date and time fields it describes. A [`RangeFormatter`] renders
//! both ends of a [`DateRange`] with it, leaving out of the end whatever the
//! start already established, and can then shorten the result towards a
//! length budget.
//!
//! ```
//! use chrono::{TimeDelta, TimeZone, Utc};
//! use date_range_fmt::DateRange;
//!
//! let start = Utc.with_ymd_and_hms(2021, 1, 6, 14, 20, 0).unwrap();
//! let end = Utc.with_ymd_and_hms(2021, 1, 6, 23, 32, 0).unwrap();
//! let range = DateRange::new(start, end, TimeDelta::hours(1)).unwrap();
//!
//! assert_eq!(range.format("l, F jS g:ia", "-").unwrap(), "Wednesday, January 6th 2:20pm-11:32pm");
//! assert_eq!(range.reduce("l, F jS g:ia", "-", None).unwrap(), "Wed, Jan 6th 2:20-11:32pm");
//! ```

mod consts;
mod descriptor;
mod formatter;
mod prelude;
mod range;
mod render;
#[cfg(test)]
mod test_utils;

pub use consts::*;
pub use descriptor::{FormatDescriptor, FormatError};
pub use formatter::{RangeFormatOptions, RangeFormatter, Reduction};
pub use range::{DateRange, Occurrences, RangeError};
pub use render::{days_in_month, is_leap_year, render};
