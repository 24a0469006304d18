use std::{
    str::FromStr,
    sync::{LazyLock, OnceLock},
};

use chrono::{DateTime, TimeZone};
use regex::{Regex, Replacer};
use serde::{Deserialize, Serialize};

use crate::{
    consts::{
        DATE_TOKENS, ESCAPE, FULL_TOKENS, LEADING_ZERO_TOKENS, LONG_DAY, LONG_MONTH, MERIDIEM_LOWER,
        MERIDIEM_UPPER, MINUTE, PLACEHOLDER_BASE, SECOND, SEPARATOR_CLASS, SEPARATORS, SHORT_DAY,
        TIME_TOKENS, YEAR_TOKENS,
    },
    prelude::*,
    render::render,
};

static DATE_RUN: LazyLock<Regex> = LazyLock::new(|| token_run(DATE_TOKENS));
static TIME_RUN: LazyLock<Regex> = LazyLock::new(|| token_run(TIME_TOKENS));

/// A run starts on a token and continues through tokens and separators.
fn token_run(tokens: &str) -> Regex {
    compile(&format!("[{tokens}][{tokens}{SEPARATOR_CLASS}]*"))
}

/// Compiles one of the crate's fixed patterns
#[allow(clippy::expect_used)]
pub(crate) fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in pattern is valid")
}

/// Error raised when a token string describes no date or time field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    /// The descriptor holds no date token, time token or full-representation token.
    #[error("Invalid format descriptor {0:?}: no date, time or full-representation token")]
    InvalidFormat(String),
}

/// Field classification of a descriptor, computed on first query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Traits {
    date:           bool,
    time:           bool,
    year:           bool,
    minute:         bool,
    second:         bool,
    meridiem:       bool,
    leading_zeros:  bool,
    long_month:     bool,
    long_day:       bool,
    short_day:      bool,
    date_separated: bool,
    time_separated: bool,
}

/// A token string that renders an instant, plus the queries the range
/// formatter needs to decide which fields it may drop.
///
/// `\` escapes the character after it: an escaped letter renders literally
/// and is never classified, extracted into a part or rewritten.
///
/// Descriptors are immutable: every rewrite returns a new descriptor.
/// Classification and the date/time parts are computed lazily and at most
/// once per descriptor. A part that turned out to be absent is remembered as
/// absent and never recomputed.
#[derive(Debug, Clone, Display)]
#[display(fmt = "{raw}")]
pub struct FormatDescriptor {
    raw:       String,
    traits:    OnceLock<Traits>,
    date_part: OnceLock<Option<Box<FormatDescriptor>>>,
    time_part: OnceLock<Option<Box<FormatDescriptor>>>,
}

impl FormatDescriptor {
    /// Creates a descriptor, validating that it describes at least one field.
    ///
    /// # Errors
    /// Returns `FormatError::InvalidFormat` if `raw` contains no date token,
    /// no time token and no full-representation token.
    pub fn new(raw: impl Into<String>) -> Result<Self, FormatError> {
        let raw = raw.into();
        if !Masked::new(&raw).text.chars().any(is_field_token) {
            return Err(FormatError::InvalidFormat(raw));
        }
        Ok(Self::new_unchecked(raw))
    }

    /// Creates a descriptor without validating it.
    pub fn new_unchecked(raw: impl Into<String>) -> Self {
        Self {
            raw:       raw.into(),
            traits:    OnceLock::new(),
            date_part: OnceLock::new(),
            time_part: OnceLock::new(),
        }
    }

    /// Returns the raw token string
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Renders `instant` with this descriptor
    pub fn apply<Tz>(&self, instant: &DateTime<Tz>) -> String
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        render(instant, &self.raw)
    }

    /// The longest date run left once time runs are removed, trailing
    /// separators stripped.
    pub fn date_part(&self) -> Option<&Self> {
        self.date_part
            .get_or_init(|| extract_part(&self.raw, &TIME_RUN, &DATE_RUN))
            .as_deref()
    }

    /// The longest time run left once date runs are removed, trailing
    /// separators stripped.
    pub fn time_part(&self) -> Option<&Self> {
        self.time_part
            .get_or_init(|| extract_part(&self.raw, &DATE_RUN, &TIME_RUN))
            .as_deref()
    }

    pub fn is_date_present(&self) -> bool {
        self.traits().date
    }

    pub fn is_time_present(&self) -> bool {
        self.traits().time
    }

    /// True when a long or short weekday token is present
    pub fn is_day_present(&self) -> bool {
        self.is_long_day_present() || self.is_short_day_present()
    }

    /// True when the date part carries a year token. Always false without a date part.
    pub fn is_year_present(&self) -> bool {
        self.traits().year
    }

    pub fn is_minute_present(&self) -> bool {
        self.traits().minute
    }

    pub fn is_second_present(&self) -> bool {
        self.traits().second
    }

    pub fn is_meridiem_present(&self) -> bool {
        self.traits().meridiem
    }

    /// True when a zero-padded day, month or 12-hour token is present
    pub fn is_leading_zeros_present(&self) -> bool {
        self.traits().leading_zeros
    }

    pub fn is_long_month_present(&self) -> bool {
        self.traits().long_month
    }

    pub fn is_long_day_present(&self) -> bool {
        self.traits().long_day
    }

    pub fn is_short_day_present(&self) -> bool {
        self.traits().short_day
    }

    /// True when the date part contains a separator. False without a date part.
    pub fn is_date_separated(&self) -> bool {
        self.traits().date_separated
    }

    /// True when the time part contains a separator. False without a time part.
    pub fn is_time_separated(&self) -> bool {
        self.traits().time_separated
    }

    /// Substitutes every match of `pattern` and trims separators from both
    /// ends of the result. `replacement` may refer to capture groups.
    /// Escaped characters never match and are carried over unchanged.
    ///
    /// # Errors
    /// Returns `FormatError::InvalidFormat` if the rewritten string no longer
    /// describes any field.
    pub fn replace<R: Replacer>(&self, pattern: &Regex, replacement: R) -> Result<Self, FormatError> {
        let masked = Masked::new(&self.raw);
        let replaced = pattern.replace_all(&masked.text, replacement);
        Self::new(masked.unmask(trim_separators(&replaced)))
    }

    /// Swaps zero-padded day, month and 12-hour tokens for their unpadded forms
    pub fn remove_leading_zeros(&self) -> Self {
        let masked = Masked::new(&self.raw);
        let unpadded: String = masked
            .text
            .chars()
            .map(|c| {
                LEADING_ZERO_TOKENS
                    .iter()
                    .find(|(padded, _)| *padded == c)
                    .map_or(c, |&(_, unpadded)| unpadded)
            })
            .collect();
        Self::new_unchecked(masked.unmask(&unpadded))
    }

    fn traits(&self) -> Traits {
        *self.traits.get_or_init(|| self.classify())
    }

    fn classify(&self) -> Traits {
        let date = self.date_part();
        let time = self.time_part();
        let live = Masked::new(&self.raw).text;
        let has = |token: char| live.contains(token);
        Traits {
            date:           date.is_some(),
            time:           time.is_some(),
            year:           date.is_some_and(|d| d.raw.contains(YEAR_TOKENS)),
            minute:         has(MINUTE),
            second:         has(SECOND),
            meridiem:       has(MERIDIEM_LOWER) || has(MERIDIEM_UPPER),
            leading_zeros:  LEADING_ZERO_TOKENS.iter().any(|&(padded, _)| has(padded)),
            long_month:     has(LONG_MONTH),
            long_day:       has(LONG_DAY),
            short_day:      has(SHORT_DAY),
            date_separated: date.is_some_and(|d| d.raw.contains(SEPARATORS)),
            time_separated: time.is_some_and(|t| t.raw.contains(SEPARATORS)),
        }
    }
}

fn is_field_token(c: char) -> bool {
    DATE_TOKENS.contains(c) || TIME_TOKENS.contains(c) || FULL_TOKENS.contains(c)
}

fn is_separator(c: char) -> bool {
    c.is_whitespace() || SEPARATORS.contains(&c)
}

fn trim_separators(s: &str) -> &str {
    s.trim_matches(is_separator)
}

/// Token string with every escaped pair swapped for a private-use placeholder,
/// so patterns only ever see live tokens and separators. Characters that
/// already sit in the placeholder range are swapped too, which keeps
/// [`unmask`](Self::unmask) lossless.
struct Masked {
    text:     String,
    literals: Vec<String>,
}

impl Masked {
    fn new(raw: &str) -> Self {
        let mut masked = Self {
            text:     String::with_capacity(raw.len()),
            literals: Vec::new(),
        };
        let mut chars = raw.chars();
        while let Some(c) = chars.next() {
            let literal = if c == ESCAPE {
                // A trailing escape stands alone
                chars.next().map_or_else(|| c.to_string(), |escaped| format!("{c}{escaped}"))
            } else if c >= PLACEHOLDER_BASE {
                c.to_string()
            } else {
                masked.text.push(c);
                continue;
            };
            masked.push_literal(literal);
        }
        masked
    }

    fn push_literal(&mut self, literal: String) {
        match placeholder(self.literals.len()) {
            Some(p) => {
                self.text.push(p);
                self.literals.push(literal);
            },
            None => self.text.push_str(&literal),
        }
    }

    /// Puts the literals back into `text`, which must derive from this mask.
    fn unmask(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for c in text.chars() {
            match self.literal(c) {
                Some(literal) => out.push_str(literal),
                None => out.push(c),
            }
        }
        out
    }

    fn literal(&self, c: char) -> Option<&str> {
        let index = u32::from(c).checked_sub(u32::from(PLACEHOLDER_BASE))?;
        self.literals
            .get(usize::try_from(index).ok()?)
            .map(String::as_str)
    }
}

fn placeholder(index: usize) -> Option<char> {
    u32::try_from(index)
        .ok()
        .and_then(|i| u32::from(PLACEHOLDER_BASE).checked_add(i))
        .and_then(char::from_u32)
}

/// Runs never cross a placeholder, so a part holds no escaped literal.
fn extract_part(raw: &str, remove: &Regex, keep: &Regex) -> Option<Box<FormatDescriptor>> {
    let masked = Masked::new(raw);
    let residue = remove.replace_all(&masked.text, "");
    let longest = keep
        .find_iter(&residue)
        .map(|m| m.as_str())
        .reduce(|best, run| if run.len() > best.len() { run } else { best })?;
    let trimmed = longest.trim_end_matches(is_separator);
    if trimmed.is_empty() {
        return None;
    }
    FormatDescriptor::new(masked.unmask(trimmed)).ok().map(Box::new)
}

impl PartialEq for FormatDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl Eq for FormatDescriptor {}

impl std::hash::Hash for FormatDescriptor {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl AsRef<str> for FormatDescriptor {
    fn as_ref(&self) -> &str {
        &self.raw
    }
}

impl FromStr for FormatDescriptor {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for FormatDescriptor {
    type Error = FormatError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl Serialize for FormatDescriptor {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.raw)
    }
}

impl<'de> Deserialize<'de> for FormatDescriptor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(raw: &str) -> FormatDescriptor {
        FormatDescriptor::new(raw).expect("failed to construct descriptor")
    }

    #[test]
    fn test_new_rejects_descriptors_without_fields() {
        for raw in ["", "???", "pqx", "  --  "] {
            let result = FormatDescriptor::new(raw);
            assert!(
                matches!(result, Err(FormatError::InvalidFormat(ref s)) if s == raw),
                "Expected failure for {raw:?}"
            );
        }
    }

    #[test]
    fn test_new_accepts_full_representation_tokens() {
        for raw in ["c", "r", "U"] {
            assert!(FormatDescriptor::new(raw).is_ok(), "Expected success for {raw:?}");
        }
    }

    #[test]
    fn test_new_unchecked_skips_validation() {
        let d = FormatDescriptor::new_unchecked("pqx");
        assert_eq!(d.as_str(), "pqx");
        assert!(!d.is_date_present());
        assert!(!d.is_time_present());
    }

    #[test]
    fn test_parts_of_mixed_descriptor() {
        let d = descriptor("l, F jS g:ia");
        assert_eq!(d.date_part().map(FormatDescriptor::as_str), Some("l, F jS"));
        assert_eq!(d.time_part().map(FormatDescriptor::as_str), Some("g:ia"));
    }

    #[test]
    fn test_parts_merge_around_removed_runs() {
        // Removing the time run joins the date tokens on either side of it
        let d = descriptor("M j g:ia Y");
        assert_eq!(d.date_part().map(FormatDescriptor::as_str), Some("M j Y"));
        assert_eq!(d.time_part().map(FormatDescriptor::as_str), Some("g:ia"));
    }

    #[test]
    fn test_parts_pick_longest_run() {
        let d = descriptor("Y [H:i:s] (m)");
        assert_eq!(d.time_part().map(FormatDescriptor::as_str), Some("H:i:s"));
    }

    #[test]
    fn test_absent_parts() {
        let time_only = descriptor("g:ia");
        assert!(time_only.date_part().is_none());
        assert!(!time_only.is_date_present());
        assert!(!time_only.is_date_separated());
        assert!(!time_only.is_year_present());

        let date_only = descriptor("Y-m-d");
        assert!(date_only.time_part().is_none());
        assert!(!date_only.is_time_present());
        assert!(!date_only.is_time_separated());
    }

    #[test]
    fn test_parts_are_memoized() {
        let d = descriptor("Y-m-d H:i");
        let first = d.date_part().expect("date part");
        let second = d.date_part().expect("date part");
        assert!(std::ptr::eq(first, second));

        let first = d.time_part().expect("time part");
        let second = d.time_part().expect("time part");
        assert!(std::ptr::eq(first, second));
    }

    #[test]
    fn test_classification() {
        let d = descriptor("l, F jS g:ia");
        assert!(d.is_date_present());
        assert!(d.is_time_present());
        assert!(d.is_day_present());
        assert!(d.is_long_day_present());
        assert!(!d.is_short_day_present());
        assert!(d.is_long_month_present());
        assert!(!d.is_year_present());
        assert!(d.is_minute_present());
        assert!(d.is_meridiem_present());
        assert!(!d.is_leading_zeros_present());
        assert!(d.is_date_separated());
        assert!(d.is_time_separated());

        let d = descriptor("D Y-m-d H:i");
        assert!(d.is_short_day_present());
        assert!(d.is_day_present());
        assert!(d.is_year_present());
        assert!(d.is_leading_zeros_present());
        assert!(!d.is_meridiem_present());
    }

    #[test]
    fn test_unseparated_parts() {
        let d = descriptor("MjS Gi");
        assert!(!d.is_date_separated());
        assert!(!d.is_time_separated());
    }

    #[test]
    fn test_replace_trims_separators() {
        let minute = Regex::new(&format!("[{SEPARATOR_CLASS}]?i")).expect("valid pattern");
        let d = descriptor("g:i");
        assert_eq!(d.replace(&minute, "").expect("replace").as_str(), "g");

        let month = Regex::new("^.*[FMmn]").expect("valid pattern");
        let d = descriptor("M jS");
        assert_eq!(d.replace(&month, "").expect("replace").as_str(), "jS");
    }

    #[test]
    fn test_replace_with_capture_groups() {
        let swap = Regex::new("(F) (j)").expect("valid pattern");
        let d = descriptor("F j, Y");
        assert_eq!(d.replace(&swap, "$2 $1").expect("replace").as_str(), "j F, Y");
    }

    #[test]
    fn test_replace_fails_when_nothing_remains() {
        let meridiem = Regex::new("[aA]").expect("valid pattern");
        let d = descriptor("a");
        assert!(matches!(d.replace(&meridiem, ""), Err(FormatError::InvalidFormat(_))));
    }

    #[test]
    fn test_remove_leading_zeros() {
        let d = descriptor("d/m/Y h:i");
        let stripped = d.remove_leading_zeros();
        assert_eq!(stripped.as_str(), "j/n/Y g:i");
        assert!(!stripped.is_leading_zeros_present());
        // The receiver is untouched
        assert_eq!(d.as_str(), "d/m/Y h:i");
    }

    #[test]
    fn test_escaped_letters_are_literal() {
        struct TestCase {
            raw:         &'static str,
            date_part:   Option<&'static str>,
            time_part:   Option<&'static str>,
            description: &'static str,
        }

        let cases = [
            TestCase {
                raw:         r"l, F jS \a\t g:ia",
                date_part:   Some("l, F jS"),
                time_part:   Some("g:ia"),
                description: "escaped word between date and time",
            },
            TestCase {
                raw:         r"\Y\e\a\r Y",
                date_part:   Some("Y"),
                time_part:   None,
                description: "escaped tokens ahead of a live token",
            },
            TestCase {
                raw:         r"H\hi",
                date_part:   None,
                time_part:   Some("H"),
                description: "escape splits a run",
            },
        ];

        for case in &cases {
            let d = descriptor(case.raw);
            assert_eq!(
                d.date_part().map(FormatDescriptor::as_str),
                case.date_part,
                "date part ({})",
                case.description
            );
            assert_eq!(
                d.time_part().map(FormatDescriptor::as_str),
                case.time_part,
                "time part ({})",
                case.description
            );
        }
    }

    #[test]
    fn test_escaped_letters_are_not_classified() {
        let d = descriptor(r"\Y\i\a\F\l j");
        assert!(!d.is_year_present());
        assert!(!d.is_minute_present());
        assert!(!d.is_meridiem_present());
        assert!(!d.is_long_month_present());
        assert!(!d.is_long_day_present());
        assert!(!d.is_time_present());

        assert!(matches!(FormatDescriptor::new(r"\a\t"), Err(FormatError::InvalidFormat(_))));
    }

    #[test]
    fn test_rewrites_keep_escapes() {
        let meridiem = Regex::new(&format!("[{SEPARATOR_CLASS}]?[aA]")).expect("valid pattern");
        let d = descriptor(r"g:ia \a\t");
        assert_eq!(d.replace(&meridiem, "").expect("replace").as_str(), r"g:i \a\t");

        let d = descriptor(r"j \o\f F");
        let space = Regex::new(" ").expect("valid pattern");
        assert_eq!(d.replace(&space, "").expect("replace").as_str(), r"j\o\fF");
        // The escaped word keeps the day and month apart
        let swap = Regex::new("(j) (F)").expect("valid pattern");
        assert_eq!(d.replace(&swap, "$2 $1").expect("replace").as_str(), r"j \o\f F");

        let d = descriptor(r"\d\h d/m");
        assert_eq!(d.remove_leading_zeros().as_str(), r"\d\h j/n");
    }

    #[test]
    fn test_trailing_escape_and_private_use_survive_rewrites() {
        let d = descriptor("\u{E001} h\\");
        assert_eq!(d.remove_leading_zeros().as_str(), "\u{E001} g\\");
        assert_eq!(d.time_part().map(FormatDescriptor::as_str), Some("h"));
    }

    #[test]
    fn test_apply() {
        let instant = crate::test_utils::at(2021, 1, 6, 14, 20, 0);
        assert_eq!(descriptor("D, M jS").apply(&instant), "Wed, Jan 6th");
    }

    #[test]
    fn test_display_and_equality() {
        let d = descriptor("Y-m-d");
        assert_eq!(d.to_string(), "Y-m-d");
        assert_eq!(d, "Y-m-d".parse::<FormatDescriptor>().expect("parse"));
        assert_ne!(d, descriptor("Y-n-j"));
    }

    #[test]
    fn test_serde_string_format() {
        let d = descriptor("l, F jS");
        let json = serde_json::to_string(&d).expect("failed to serialize descriptor");
        assert_eq!(json, r#""l, F jS""#);

        let parsed: FormatDescriptor = serde_json::from_str(&json).expect("failed to deserialize descriptor");
        assert_eq!(d, parsed);
    }

    #[test]
    fn test_serde_validation() {
        let result: Result<FormatDescriptor, _> = serde_json::from_str(r#""???""#);
        assert!(result.is_err());
    }
}
