//! Resolution of sar date and time tokens.
//!
//! Dates appear once per banner line and come in many locale dependent
//! shapes. They are resolved either with an explicit pattern or by trying
//! [`AUTOMATIC_PATTERNS`] in order and keeping the first that parses. Times
//! prefix every data line and use either a 24-hour clock (`23:59:59`) or a
//! 12-hour clock spread over two columns (`11:59:59 PM`).
//!
//! Patterns are written in the `yyyy/MM/dd` notation used by sar front ends
//! and translated to `chrono` format strings by [`translate_pattern`].

mod error;

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveTime};
use regex::Regex;

pub use error::{Error, Result};

/// Date patterns tried by automatic detection, in priority order.
///
/// Each pattern is only tried on tokens of its exact shape (field widths and
/// separators, see [`shape_of`]) and no two patterns share a shape, so every
/// date printed with one of them resolves back to itself. Two-digit years
/// are month first with slashes and day first otherwise.
pub const AUTOMATIC_PATTERNS: &[&str] = &[
    "yyyyMMdd",
    "dd-MM-yyyy",
    "yyyy-MM-dd",
    "MM/dd/yyyy",
    "yyyy/MM/dd",
    "dd MMM yyyy",
    "dd MMMM yyyy",
    "dd-MM-yy",
    "MM/dd/yy",
    "dd.MM.yy",
    "dd.MM.yy.",
    "dd.MM.yyyy",
    "yyyy.MM.dd",
    "yyyy.MM.dd.",
    "yy. MM. dd",
    "yy年MM月dd日",
];

static AUTOMATIC_FORMATS: LazyLock<Vec<(Regex, String)>> = LazyLock::new(|| {
    AUTOMATIC_PATTERNS
        .iter()
        .map(|pattern| {
            let shape = Regex::new(&shape_of(pattern)).expect("date pattern shapes are valid");
            (shape, translate_pattern(pattern))
        })
        .collect()
});

static TWELVE_HOUR_TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d\d:\d\d:\d\d [AP]M$").expect("twelve hour time regex is valid")
});

/// How the date of a banner is interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateFormat {
    /// Try [`AUTOMATIC_PATTERNS`] in order.
    Automatic,
    /// A `chrono` format string.
    Fixed(String),
}

impl DateFormat {
    /// Builds a fixed format from a `yyyy/MM/dd` style pattern.
    pub fn from_pattern(pattern: &str) -> Self {
        DateFormat::Fixed(translate_pattern(pattern))
    }
}

/// Clock used by the timestamp columns of data lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clock {
    /// `HH:MM:SS` in one column.
    TwentyFourHour,
    /// `hh:MM:SS AM` over two columns.
    TwelveHour,
}

impl Clock {
    /// Number of leading columns holding the time.
    pub fn columns(self) -> usize {
        match self {
            Clock::TwentyFourHour => 1,
            Clock::TwelveHour => 2,
        }
    }

    fn format(self) -> &'static str {
        match self {
            Clock::TwentyFourHour => "%H:%M:%S",
            Clock::TwelveHour => "%I:%M:%S %p",
        }
    }

    /// Chooses the clock from the first columns of a line.
    pub fn detect(columns: &[&str]) -> Self {
        match columns {
            [time, meridiem, ..] if TWELVE_HOUR_TIME.is_match(&format!("{time} {meridiem}")) => {
                Clock::TwelveHour
            }
            _ => Clock::TwentyFourHour,
        }
    }
}

/// Date and time settings derived from a Linux date format setting such as
/// `"MM/DD/YY 23:59:59"` or `"DD/MM/YYYY 11:59:59 AM|PM"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinuxFormat {
    pub date: DateFormat,
    /// `None` leaves the clock to [`Clock::detect`].
    pub clock: Option<Clock>,
}

impl LinuxFormat {
    /// Parses a Linux date format setting.
    ///
    /// An empty value or `"Automatic Detection"` selects automatic date
    /// detection and clock detection.
    pub fn parse(setting: &str) -> Self {
        let setting = setting.trim();
        if setting.is_empty() || setting == crate::config::AUTOMATIC_DETECTION {
            return Self {
                date: DateFormat::Automatic,
                clock: None,
            };
        }
        let parts: Vec<&str> = setting.splitn(3, ' ').collect();
        let clock = match parts.get(2) {
            Some(meridiem) if meridiem.contains("AM|PM") => Some(Clock::TwelveHour),
            _ => None,
        };
        Self {
            date: DateFormat::from_pattern(parts[0]),
            clock,
        }
    }
}

/// Translates a `yyyy/MM/dd HH:mm:ss` style pattern into a `chrono` format
/// string.
///
/// Supported letters: `y`/`Y` (two letters for a two-digit year, more for the
/// full year), `M` (`MM`, `MMM` short name, `MMMM` full name), `d`/`D`, `H`,
/// `h`, `m`, `s` and `a`. Text between single quotes and any other character
/// is copied literally.
pub fn translate_pattern(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\'' {
            for quoted in chars.by_ref() {
                if quoted == '\'' {
                    break;
                }
                push_literal(&mut out, quoted);
            }
            continue;
        }
        let mut run = 1;
        while chars.peek() == Some(&c) {
            chars.next();
            run += 1;
        }
        let spec = match c {
            'y' | 'Y' if run <= 2 => "%y",
            'y' | 'Y' => "%Y",
            'M' if run >= 4 => "%B",
            'M' if run == 3 => "%b",
            'M' => "%m",
            'd' | 'D' => "%d",
            'H' => "%H",
            'h' => "%I",
            'm' => "%M",
            's' => "%S",
            'a' => "%p",
            _ => {
                for _ in 0..run {
                    push_literal(&mut out, c);
                }
                continue;
            }
        };
        out.push_str(spec);
    }
    out
}

fn push_literal(out: &mut String, c: char) {
    if c == '%' {
        out.push_str("%%");
    } else {
        out.push(c);
    }
}

/// Builds the anchored regex of the tokens a date pattern can print.
///
/// Two year letters match exactly two digits, more match four. `MM` and `dd`
/// match one or two digits, `MMM` three letters and `MMMM` four or more.
pub fn shape_of(pattern: &str) -> String {
    let mut out = String::from("^");
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\'' {
            let quoted: String = chars.by_ref().take_while(|&q| q != '\'').collect();
            out.push_str(&regex::escape(&quoted));
            continue;
        }
        let mut run = 1;
        while chars.peek() == Some(&c) {
            chars.next();
            run += 1;
        }
        match c {
            'y' | 'Y' if run <= 2 => out.push_str(r"\d{2}"),
            'y' | 'Y' => out.push_str(r"\d{4}"),
            'M' if run >= 4 => out.push_str(r"\p{L}{4,}"),
            'M' if run == 3 => out.push_str(r"\p{L}{3}"),
            'M' | 'd' | 'D' => out.push_str(r"\d{1,2}"),
            _ => out.push_str(&regex::escape(&c.to_string().repeat(run))),
        }
    }
    out.push('$');
    out
}

/// Resolves a date token.
///
/// # Arguments
///
/// * `token` - The date as printed, e.g. `03/28/16`.
/// * `format` - A fixed format, or [`DateFormat::Automatic`] to take the first
///   of [`AUTOMATIC_PATTERNS`] whose shape matches and that parses.
///
/// # Errors
///
/// Returns [`Error::Date`] if a fixed format does not match and
/// [`Error::UnknownDateFormat`] if no automatic pattern does.
pub fn resolve_date(token: &str, format: &DateFormat) -> Result<NaiveDate> {
    match format {
        DateFormat::Fixed(format) => {
            NaiveDate::parse_from_str(token, format).map_err(|source| Error::Date {
                token: token.to_owned(),
                format: format.clone(),
                source,
            })
        }
        DateFormat::Automatic => {
            AUTOMATIC_FORMATS
                .iter()
                .filter(|(shape, _)| shape.is_match(token))
                .find_map(|(_, format)| NaiveDate::parse_from_str(token, format).ok())
                .ok_or_else(|| Error::UnknownDateFormat {
                    token: token.to_owned(),
                })
        }
    }
}

/// Resolves the time-of-day held by the leading columns of a line.
///
/// # Errors
///
/// Returns [`Error::MissingTimeColumn`] if there are fewer columns than the
/// clock needs and [`Error::Time`] if they do not form a time.
pub fn resolve_time(columns: &[&str], clock: Clock) -> Result<NaiveTime> {
    let needed = clock.columns();
    if columns.len() < needed {
        return Err(Error::MissingTimeColumn {
            expected: needed,
            found: columns.len(),
        });
    }
    let token = columns[..needed].join(" ");
    NaiveTime::parse_from_str(&token, clock.format()).map_err(|source| Error::Time {
        token,
        format: clock.format(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_translate_pattern() {
        assert_eq!(translate_pattern("MM/dd/yy"), "%m/%d/%y");
        assert_eq!(translate_pattern("yyyy-MM-dd"), "%Y-%m-%d");
        assert_eq!(translate_pattern("dd MMM yyyy"), "%d %b %Y");
        assert_eq!(translate_pattern("dd MMMM yyyy"), "%d %B %Y");
        assert_eq!(translate_pattern("yy年MM月dd日"), "%y年%m月%d日");
        assert_eq!(translate_pattern("hh:mm:ss a"), "%I:%M:%S %p");
        assert_eq!(translate_pattern("MM/DD/YY"), "%m/%d/%y");
        assert_eq!(translate_pattern("'at' HH%"), "at %H%%");
    }

    #[test]
    fn test_shape_of() {
        assert_eq!(shape_of("MM/dd/yy"), r"^\d{1,2}/\d{1,2}/\d{2}$");
        assert_eq!(shape_of("yyyy.MM.dd."), r"^\d{4}\.\d{1,2}\.\d{1,2}\.$");
        assert_eq!(shape_of("dd MMM yyyy"), r"^\d{1,2} \p{L}{3} \d{4}$");
        assert_eq!(shape_of("'on' dd MMMM"), r"^on \d{1,2} \p{L}{4,}$");
    }

    #[test]
    fn test_automatic_round_trip() {
        // day <= 12 and years below 32 are ambiguous for chrono alone
        let dates = [
            ymd(2016, 3, 28),
            ymd(2016, 3, 5),
            ymd(2009, 12, 1),
            ymd(2047, 5, 16),
        ];
        for known in dates {
            for pattern in AUTOMATIC_PATTERNS {
                let printed = known.format(&translate_pattern(pattern)).to_string();
                let resolved = resolve_date(&printed, &DateFormat::Automatic)
                    .unwrap_or_else(|e| panic!("{pattern} ({printed}): {e}"));
                assert_eq!(resolved, known, "pattern {pattern} printed as {printed}");
            }
        }
    }

    #[test]
    fn test_automatic_shapes_are_distinct() {
        for pattern in AUTOMATIC_PATTERNS {
            let printed = ymd(2016, 3, 5).format(&translate_pattern(pattern)).to_string();
            let matching: Vec<&str> = AUTOMATIC_PATTERNS
                .iter()
                .zip(AUTOMATIC_FORMATS.iter())
                .filter(|(_, (shape, _))| shape.is_match(&printed))
                .map(|(other, _)| *other)
                .collect();
            assert_eq!(matching, vec![*pattern], "{printed}");
        }
    }

    #[test]
    fn test_automatic_two_digit_years() {
        // month first with slashes
        assert_eq!(
            resolve_date("04/08/17", &DateFormat::Automatic).unwrap(),
            ymd(2017, 4, 8)
        );
        // day first with dashes and dots
        assert_eq!(
            resolve_date("04-08-17", &DateFormat::Automatic).unwrap(),
            ymd(2017, 8, 4)
        );
        assert_eq!(
            resolve_date("04.08.17", &DateFormat::Automatic).unwrap(),
            ymd(2017, 8, 4)
        );
        assert_eq!(
            resolve_date("16. 03. 28", &DateFormat::Automatic).unwrap(),
            ymd(2016, 3, 28)
        );
        assert!(matches!(
            resolve_date("28/03/16", &DateFormat::Automatic),
            Err(Error::UnknownDateFormat { .. })
        ));
    }

    #[test]
    fn test_automatic_four_digit_years() {
        assert_eq!(
            resolve_date("03/28/2016", &DateFormat::Automatic).unwrap(),
            ymd(2016, 3, 28)
        );
        assert_eq!(
            resolve_date("2016-03-28", &DateFormat::Automatic).unwrap(),
            ymd(2016, 3, 28)
        );
        assert_eq!(
            resolve_date("20160328", &DateFormat::Automatic).unwrap(),
            ymd(2016, 3, 28)
        );
        assert_eq!(
            resolve_date("28 Mar 2016", &DateFormat::Automatic).unwrap(),
            ymd(2016, 3, 28)
        );
    }

    #[test]
    fn test_automatic_no_match() {
        let err = resolve_date("yesterday", &DateFormat::Automatic).unwrap_err();
        assert!(matches!(err, Error::UnknownDateFormat { token } if token == "yesterday"));
    }

    #[test]
    fn test_fixed_format() {
        let format = DateFormat::from_pattern("dd/MM/yy");
        assert_eq!(resolve_date("04/08/17", &format).unwrap(), ymd(2017, 8, 4));
        assert!(matches!(
            resolve_date("2017-08-04", &format),
            Err(Error::Date { .. })
        ));
    }

    #[test]
    fn test_resolve_time_24h() {
        let time = resolve_time(&["09:10:01", "CPU"], Clock::TwentyFourHour).unwrap();
        assert_eq!(time, NaiveTime::from_hms_opt(9, 10, 1).unwrap());
        assert!(matches!(
            resolve_time(&["Average:"], Clock::TwentyFourHour),
            Err(Error::Time { .. })
        ));
    }

    #[test]
    fn test_resolve_time_12h() {
        let time = resolve_time(&["09:10:01", "PM", "all"], Clock::TwelveHour).unwrap();
        assert_eq!(time, NaiveTime::from_hms_opt(21, 10, 1).unwrap());
        let time = resolve_time(&["12:00:01", "AM"], Clock::TwelveHour).unwrap();
        assert_eq!(time, NaiveTime::from_hms_opt(0, 0, 1).unwrap());
        assert!(matches!(
            resolve_time(&["09:10:01"], Clock::TwelveHour),
            Err(Error::MissingTimeColumn {
                expected: 2,
                found: 1
            })
        ));
    }

    #[test]
    fn test_clock_detect() {
        assert_eq!(
            Clock::detect(&["09:10:01", "AM", "CPU"]),
            Clock::TwelveHour
        );
        assert_eq!(
            Clock::detect(&["09:10:01", "CPU", "%user"]),
            Clock::TwentyFourHour
        );
        assert_eq!(Clock::detect(&["09:10:01"]), Clock::TwentyFourHour);
        assert_eq!(Clock::TwelveHour.columns(), 2);
    }

    #[test]
    fn test_linux_format() {
        assert_eq!(
            LinuxFormat::parse("Automatic Detection"),
            LinuxFormat {
                date: DateFormat::Automatic,
                clock: None
            }
        );
        let format = LinuxFormat::parse("MM/DD/YY 23:59:59");
        assert_eq!(format.date, DateFormat::Fixed("%m/%d/%y".to_owned()));
        assert_eq!(format.clock, None);
        let format = LinuxFormat::parse("DD/MM/YYYY 12:59:59 AM|PM");
        assert_eq!(format.date, DateFormat::Fixed("%d/%m/%Y".to_owned()));
        assert_eq!(format.clock, Some(Clock::TwelveHour));
    }
}
