use std::{fmt::Display, sync::LazyLock};

use chrono::{DateTime, Datelike, TimeZone, Timelike};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::{
    consts::{
        DEFAULT_SEPARATOR, LONG_DAY, LONG_MONTH, MINUTE, MONTH_TOKENS, SECOND, SEPARATOR_CLASS, SHORT_DAY,
        SHORT_MONTH,
    },
    descriptor::{FormatDescriptor, FormatError, compile},
    prelude::*,
    range::DateRange,
};

/// Minutes and seconds, each with the separator in front of it
static SUB_HOUR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| compile(&format!("[{SEPARATOR_CLASS}]?[{MINUTE}{SECOND}]")));
static MERIDIEM_PATTERN: LazyLock<Regex> = LazyLock::new(|| compile(&format!("[{SEPARATOR_CLASS}]?[aA]")));
static MONTH_PREFIX_PATTERN: LazyLock<Regex> = LazyLock::new(|| compile(&format!("^.*[{MONTH_TOKENS}]")));
static LONG_MONTH_PATTERN: LazyLock<Regex> = LazyLock::new(|| compile(&LONG_MONTH.to_string()));
static LONG_DAY_PATTERN: LazyLock<Regex> = LazyLock::new(|| compile(&LONG_DAY.to_string()));

/// Separator and length budget for a formatting call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangeFormatOptions {
    /// Placed between the two ends; padded with spaces when longer than one character
    pub separator:  String,
    /// Target length in characters. `None` shortens as far as possible.
    pub max_length: Option<usize>,
}

impl Default for RangeFormatOptions {
    fn default() -> Self {
        Self {
            separator:  DEFAULT_SEPARATOR.to_owned(),
            max_length: None,
        }
    }
}

/// A structural rewrite tried when the output is still too long.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Reduction {
    /// `d`, `m`, `h` become `j`, `n`, `g`
    #[display(fmt = "leading zeros")]
    LeadingZeros,
    /// `F` becomes `M`
    #[display(fmt = "month name")]
    MonthName,
    /// `l` becomes `D`
    #[display(fmt = "weekday name")]
    WeekdayName,
}

impl Reduction {
    /// The order in which rewrites are attempted
    pub const ORDER: [Self; 3] = [Self::LeadingZeros, Self::MonthName, Self::WeekdayName];

    /// Applies the rewrite. Returns `None` when the descriptor would not change.
    ///
    /// # Errors
    /// Returns `FormatError` if the rewritten descriptor is invalid.
    pub fn apply(self, descriptor: &FormatDescriptor) -> Result<Option<FormatDescriptor>, FormatError> {
        let rewritten = match self {
            Self::LeadingZeros if descriptor.is_leading_zeros_present() => descriptor.remove_leading_zeros(),
            Self::MonthName if descriptor.is_long_month_present() => {
                descriptor.replace(&LONG_MONTH_PATTERN, SHORT_MONTH.to_string())?
            },
            Self::WeekdayName if descriptor.is_long_day_present() => {
                descriptor.replace(&LONG_DAY_PATTERN, SHORT_DAY.to_string())?
            },
            _ => return Ok(None),
        };
        Ok((rewritten != *descriptor).then_some(rewritten))
    }
}

/// Formats the two ends of a range, leaving out what the start already says.
#[derive(Debug)]
pub struct RangeFormatter<'r, Tz: TimeZone> {
    start: &'r DateTime<Tz>,
    end:   &'r DateTime<Tz>,
}

impl<'r, Tz> RangeFormatter<'r, Tz>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    /// Binds a formatter to `range`
    pub fn new(range: &'r DateRange<Tz>) -> Self {
        let (start, end) = range.instants();
        Self { start, end }
    }

    /// Renders the range without any reduction.
    ///
    /// The end omits the date when both instants fall on the same day, and
    /// omits the month when they share a month and the descriptor allows it.
    ///
    /// # Errors
    /// Returns `FormatError::InvalidFormat` if `descriptor` describes no field.
    pub fn format(&self, descriptor: &str, separator: &str) -> Result<String, FormatError> {
        let format = FormatDescriptor::new(descriptor)?;
        Ok(self.format_descriptor(&format, separator))
    }

    /// [`format`](Self::format) with a separator taken from `options`.
    ///
    /// # Errors
    /// Returns `FormatError::InvalidFormat` if `descriptor` describes no field.
    pub fn format_with(&self, descriptor: &str, options: &RangeFormatOptions) -> Result<String, FormatError> {
        self.format(descriptor, &options.separator)
    }

    /// Renders the range, then shortens it until it fits `max_length`.
    ///
    /// Time fields are reduced first. While the output is still too long
    /// (or always, without a budget) the descriptor is rewritten by the first
    /// [`Reduction`] that changes it and the whole pass starts over. The
    /// budget is a target: when no rewrite applies the output may stay longer.
    ///
    /// # Errors
    /// Returns `FormatError::InvalidFormat` if `descriptor` describes no field.
    pub fn reduce(&self, descriptor: &str, separator: &str, max_length: Option<usize>) -> Result<String, FormatError> {
        let mut format = FormatDescriptor::new(descriptor)?;
        if self.is_same_instant() {
            return Ok(self.format_descriptor(&format, separator));
        }

        loop {
            let output = self.reduce_time(&format, separator);
            let length = output.chars().count();
            if max_length.is_some_and(|max| length <= max) {
                trace!(descriptor = %format, length, "output within budget");
                return Ok(output);
            }

            match Self::next_reduction(&format)? {
                Some((reduction, next)) => {
                    debug!(%reduction, from = %format, to = %next, length, "descriptor rewritten");
                    format = next;
                },
                None => {
                    trace!(descriptor = %format, length, "no further reduction applies");
                    return Ok(output);
                },
            }
        }
    }

    /// [`reduce`](Self::reduce) with separator and budget taken from `options`.
    ///
    /// # Errors
    /// Returns `FormatError::InvalidFormat` if `descriptor` describes no field.
    pub fn reduce_with(&self, descriptor: &str, options: &RangeFormatOptions) -> Result<String, FormatError> {
        self.reduce(descriptor, &options.separator, options.max_length)
    }

    fn next_reduction(format: &FormatDescriptor) -> Result<Option<(Reduction, FormatDescriptor)>, FormatError> {
        for reduction in Reduction::ORDER {
            if let Some(next) = reduction.apply(format)? {
                return Ok(Some((reduction, next)));
            }
        }
        Ok(None)
    }

    fn format_descriptor(&self, format: &FormatDescriptor, separator: &str) -> String {
        if self.is_same_instant() {
            return format.apply(self.start);
        }

        let end_format = if self.is_same_day() {
            format.time_part().cloned()
        } else {
            self.without_implied_month(format, format)
        };

        let end_format = end_format.as_ref().unwrap_or(format);
        join(&format.apply(self.start), &end_format.apply(self.end), separator)
    }

    /// `end` without the month prefix, when `format` lets the start's month
    /// stand for both ends.
    fn without_implied_month(&self, format: &FormatDescriptor, end: &FormatDescriptor) -> Option<FormatDescriptor> {
        let month_implied = self.is_same_month()
            && !format.is_year_present()
            && !format.is_date_separated()
            && (!format.is_time_present() || self.is_same_time());
        if month_implied { strip(end, &MONTH_PREFIX_PATTERN) } else { None }
    }

    /// Drops minutes at the top of the hour and a meridiem both ends share.
    fn reduce_time(&self, format: &FormatDescriptor, separator: &str) -> String {
        if format.time_part().is_none() {
            return self.format_descriptor(format, separator);
        }

        let mut shared = format.clone();
        let mut start_format: Option<FormatDescriptor> = None;
        let mut end_format: Option<FormatDescriptor> = None;

        if format.is_minute_present() && format.is_time_separated() {
            let without_minutes = strip(format, &SUB_HOUR_PATTERN);
            let seconds = format.is_second_present();
            match (is_top_of_hour(self.start, seconds), is_top_of_hour(self.end, seconds)) {
                (true, true) => {
                    if let Some(stripped) = without_minutes {
                        shared = stripped;
                    }
                },
                (false, true) => end_format = without_minutes,
                (true, false) => start_format = without_minutes,
                (false, false) => {},
            }
        }

        if self.is_same_day() {
            if format.is_meridiem_present() && self.is_same_meridiem() {
                let base = start_format.as_ref().unwrap_or(&shared);
                if let Some(stripped) = strip(base, &MERIDIEM_PATTERN) {
                    start_format = Some(stripped);
                }
            }
            let time_only = end_format.as_ref().unwrap_or(&shared).time_part().cloned();
            if time_only.is_some() {
                end_format = time_only;
            }
        } else {
            let month_dropped = self.without_implied_month(format, end_format.as_ref().unwrap_or(&shared));
            if month_dropped.is_some() {
                end_format = month_dropped;
            }
        }

        let start = start_format.as_ref().unwrap_or(&shared).apply(self.start);
        let end = end_format.as_ref().unwrap_or(&shared).apply(self.end);
        join(&start, &end, separator)
    }

    fn is_same_instant(&self) -> bool {
        self.is_same_day() && self.is_same_time()
    }

    fn is_same_day(&self) -> bool {
        self.start.date_naive() == self.end.date_naive()
    }

    fn is_same_month(&self) -> bool {
        self.start.year() == self.end.year() && self.start.month() == self.end.month()
    }

    fn is_same_time(&self) -> bool {
        (self.start.hour(), self.start.minute(), self.start.second())
            == (self.end.hour(), self.end.minute(), self.end.second())
    }

    fn is_same_meridiem(&self) -> bool {
        self.start.hour12().0 == self.end.hour12().0
    }
}

/// Minutes read `00`, and so do seconds when `seconds` are shown
fn is_top_of_hour<Tz: TimeZone>(instant: &DateTime<Tz>, seconds: bool) -> bool {
    instant.minute() == 0 && (!seconds || instant.second() == 0)
}

/// Removes `pattern`, or `None` if nothing renderable would be left.
fn strip(format: &FormatDescriptor, pattern: &Regex) -> Option<FormatDescriptor> {
    format.replace(pattern, "").ok()
}

fn join(start: &str, end: &str, separator: &str) -> String {
    if separator.chars().count() > 1 {
        format!("{start} {separator} {end}")
    } else {
        format!("{start}{separator}{end}")
    }
}
