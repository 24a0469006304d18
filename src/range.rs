use std::fmt::Display;

use chrono::{DateTime, TimeDelta, TimeZone};

use crate::{FormatError, RangeFormatter};

/// A span between two instants (inclusive) and the step between its
/// occurrences. The start must not be after the end and the step must be
/// positive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateRange<Tz: TimeZone> {
    start: DateTime<Tz>,
    end:   DateTime<Tz>,
    step:  TimeDelta,
}

/// Error type for date range operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    /// Start instant is after end instant.
    #[error("Invalid date range: start ({start}) is after end ({end})")]
    InvalidRange { start: String, end: String },

    /// Recurrence step is zero or negative.
    #[error("Invalid recurrence step: {0} (must be positive)")]
    InvalidStep(TimeDelta),
}

impl<Tz> DateRange<Tz>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    /// Creates a new date range with validation.
    ///
    /// # Errors
    /// Returns `RangeError::InvalidRange` if start > end, and
    /// `RangeError::InvalidStep` if `step` is not positive.
    pub fn new(start: DateTime<Tz>, end: DateTime<Tz>, step: TimeDelta) -> Result<Self, RangeError> {
        if start > end {
            return Err(RangeError::InvalidRange {
                start: start.to_rfc3339(),
                end:   end.to_rfc3339(),
            });
        }
        if step <= TimeDelta::zero() {
            return Err(RangeError::InvalidStep(step));
        }
        Ok(Self { start, end, step })
    }

    /// Returns the start instant of the range
    pub const fn start(&self) -> &DateTime<Tz> {
        &self.start
    }

    /// Returns the end instant of the range
    pub const fn end(&self) -> &DateTime<Tz> {
        &self.end
    }

    /// Returns the recurrence step
    pub const fn step(&self) -> TimeDelta {
        self.step
    }

    /// Returns both instants as a tuple
    pub const fn instants(&self) -> (&DateTime<Tz>, &DateTime<Tz>) {
        (&self.start, &self.end)
    }

    /// Iterates the occurrences `start, start + step, ...` up to and including `end`
    pub fn iter(&self) -> Occurrences<'_, Tz> {
        Occurrences {
            next: Some(self.start.clone()),
            end:  &self.end,
            step: self.step,
        }
    }

    /// Returns a formatter bound to this range
    pub fn formatter(&self) -> RangeFormatter<'_, Tz> {
        RangeFormatter::new(self)
    }

    /// Shorthand for [`RangeFormatter::format`].
    ///
    /// # Errors
    /// Returns `FormatError::InvalidFormat` if `descriptor` describes no field.
    pub fn format(&self, descriptor: &str, separator: &str) -> Result<String, FormatError> {
        self.formatter().format(descriptor, separator)
    }

    /// Shorthand for [`RangeFormatter::reduce`].
    ///
    /// # Errors
    /// Returns `FormatError::InvalidFormat` if `descriptor` describes no field.
    pub fn reduce(&self, descriptor: &str, separator: &str, max_length: Option<usize>) -> Result<String, FormatError> {
        self.formatter().reduce(descriptor, separator, max_length)
    }
}

/// Iterator over the occurrences of a [`DateRange`].
#[derive(Debug)]
pub struct Occurrences<'r, Tz: TimeZone> {
    next: Option<DateTime<Tz>>,
    end:  &'r DateTime<Tz>,
    step: TimeDelta,
}

impl<Tz: TimeZone> Iterator for Occurrences<'_, Tz> {
    type Item = DateTime<Tz>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        if current > *self.end {
            return None;
        }
        // Overflow ends the iteration
        self.next = current.clone().checked_add_signed(self.step);
        Some(current)
    }
}

impl<'r, Tz> IntoIterator for &'r DateRange<Tz>
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    type Item = DateTime<Tz>;
    type IntoIter = Occurrences<'r, Tz>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
