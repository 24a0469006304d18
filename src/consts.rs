/// Tokens that denote a date field (year, month, day, weekday family)
pub const DATE_TOKENS: &str = "dDjlNSwzWFmMntLoYy";

/// Tokens that denote a time field (hour, minute, second, meridiem, zone family)
pub const TIME_TOKENS: &str = "aABgGhHisuveIOPTZ";

/// Tokens that render a complete instant on their own (ISO 8601, RFC 2822, Unix seconds)
pub const FULL_TOKENS: &str = "crU";

/// Literal characters treated as field separators
pub const SEPARATORS: [char; 9] = [' ', '-', '/', '\\', ',', '.', '_', '·', ':'];

/// Regex character class body matching any of `SEPARATORS`
pub(crate) const SEPARATOR_CLASS: &str = r" \-/\\,._·:";

/// Escapes the next character when rendering
pub const ESCAPE: char = '\\';

/// First private-use code point; escaped literals are swapped for code points
/// from here on while a descriptor is classified or rewritten
pub(crate) const PLACEHOLDER_BASE: char = '\u{E000}';

/// Year tokens (full, two-digit, ISO week-numbering)
pub(crate) const YEAR_TOKENS: [char; 3] = ['Y', 'y', 'o'];
/// Month tokens (full name, short name, padded, unpadded)
pub(crate) const MONTH_TOKENS: &str = "FMmn";

/// Minute token
pub const MINUTE: char = 'i';
/// Second token
pub const SECOND: char = 's';
/// Lower-case meridiem token
pub const MERIDIEM_LOWER: char = 'a';
/// Upper-case meridiem token
pub const MERIDIEM_UPPER: char = 'A';
/// Full month name token
pub const LONG_MONTH: char = 'F';
/// Abbreviated month name token
pub const SHORT_MONTH: char = 'M';
/// Full weekday name token
pub const LONG_DAY: char = 'l';
/// Abbreviated weekday name token
pub const SHORT_DAY: char = 'D';

/// Zero-padded tokens and the unpadded token each one shortens to:
/// day of month, month number, 12-hour hour
pub const LEADING_ZERO_TOKENS: [(char, char); 3] = [('d', 'j'), ('m', 'n'), ('h', 'g')];

/// Separator used between the two ends of a range when none is given
pub const DEFAULT_SEPARATOR: &str = "-";

/// Month names (index 0 is unused, months are 1-indexed)
pub const MONTH_NAMES: [&str; 13] = [
    "",
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Weekday names, Monday first (matches `Weekday::num_days_from_monday`)
pub const WEEKDAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Length of an abbreviated month or weekday name
pub(crate) const ABBREVIATION_LEN: usize = 3;

/// Swatch beats in a day
pub(crate) const BEATS_PER_DAY: i64 = 1000;
/// Biel Mean Time offset from UTC, in seconds
pub(crate) const BMT_OFFSET_SECS: i64 = 3600;
/// Seconds in a day
pub(crate) const SECONDS_PER_DAY: i64 = 86_400;
/// Seconds in an hour
pub(crate) const SECONDS_PER_HOUR: i32 = 3600;
/// Seconds in a minute
pub(crate) const SECONDS_PER_MINUTE: i32 = 60;

/// Month number for February
pub const FEBRUARY: u32 = 2;

/// Month number for December
pub const DECEMBER: u32 = 12;

/// Days in February for leap years
pub const FEBRUARY_DAYS_LEAP: u32 = 29;

/// Maximum days in each month (index 0 is unused, months are 1-indexed)
/// February shows 28 days (non-leap year default)
pub const DAYS_IN_MONTH: [u32; 13] = [
    0,  // index 0 unused (months are 1-indexed)
    31, // January
    28, // February (non-leap, adjusted by is_leap_year check)
    31, // March
    30, // April
    31, // May
    30, // June
    31, // July
    31, // August
    30, // September
    31, // October
    30, // November
    31, // December
];

/// Leap year occurs every 4 years
pub(crate) const LEAP_YEAR_CYCLE: i32 = 4;
/// Century years are not leap years unless...
pub(crate) const CENTURY_CYCLE: i32 = 100;
/// ...they are divisible by 400 (Gregorian calendar correction)
pub(crate) const GREGORIAN_CYCLE: i32 = 400;
