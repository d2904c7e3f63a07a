//! Normalization of the raw roster values.

use chrono::{Datelike, NaiveDate};

use crate::config::YearFormat;

// Formats with a month name, tried after the numeric forms.
const TEXT_DATE_FORMATS: [&str; 9] = [
    "%d %B %Y",
    // Spreadsheet exports (15-Jun-1990, 15-Jun-90). %y before %Y: %Y also accepts "90".
    "%d-%b-%y",
    "%d-%b-%Y",
    "%d-%B-%Y",
    "%B %d, %Y",
    "%B %d %Y",
    "%d %b %Y",
    "%b %d, %Y",
    "%b %d %Y",
];

/// Turns "Last, First" into "First Last".
///
/// Only the first comma is considered: "Last, First, Jr" becomes "First, Jr Last".
/// Names without a comma (including the empty string) are returned unchanged.
pub fn normalize_name(raw: &str) -> String {
    match raw.split_once(',') {
        Some((last, first)) => format!("{} {}", first.trim(), last.trim()),
        None => raw.to_string(),
    }
}

/// Parses a date of birth, reading ambiguous numeric dates with the day first.
///
/// Returns None for anything that is not a calendar date.
pub fn parse_day_first(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    parse_numeric(s).or_else(|| parse_text(s))
}

/// The day, month and year fields for a raw date of birth.
///
/// This never fails: the three fields are empty when the date cannot be read.
pub fn derive_dob(raw: &str, year_format: YearFormat) -> (String, String, String) {
    match parse_day_first(raw) {
        Some(d) => {
            let year = match year_format {
                YearFormat::TwoDigit => format!("{:02}", d.year().rem_euclid(100)),
                YearFormat::FourDigit => d.year().to_string(),
            };
            (format!("{:02}", d.day()), format!("{:02}", d.month()), year)
        }
        None => ("".to_string(), "".to_string(), "".to_string()),
    }
}

fn is_date_separator(c: char) -> bool {
    c == '/' || c == '-' || c == '.'
}

// "15 / 06 / 1990" -> "15/06/1990"
fn tighten_separators(s: &str) -> String {
    let mut res = String::with_capacity(s.len());
    for c in s.chars() {
        if is_date_separator(c) {
            while res.ends_with(char::is_whitespace) {
                res.pop();
            }
            res.push(c);
        } else if !(c.is_whitespace() && res.ends_with(is_date_separator)) {
            res.push(c);
        }
    }
    res
}

fn parse_numeric(s: &str) -> Option<NaiveDate> {
    let s = tighten_separators(s);
    // A time may follow the date (spreadsheet exports): 1990-06-15T00:00:00 or 15/06/1990 00:00
    let date_part = s.split(|c: char| c == 'T' || c.is_whitespace()).next()?;
    let parts: Vec<&str> = date_part.split(is_date_separator).collect();
    if parts.len() != 3
        || parts
            .iter()
            .any(|p| p.is_empty() || !p.chars().all(|c| c.is_ascii_digit()))
    {
        return None;
    }
    if parts[0].len() == 4 {
        let year: i32 = parts[0].parse().ok()?;
        let month: u32 = parts[1].parse().ok()?;
        let day: u32 = parts[2].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }
    if parts[0].len() > 2 || parts[1].len() > 2 {
        return None;
    }
    let first: u32 = parts[0].parse().ok()?;
    let second: u32 = parts[1].parse().ok()?;
    let year = expand_year(parts[2])?;
    // Day first, unless only the other reading is a valid date.
    NaiveDate::from_ymd_opt(year, second, first).or_else(|| NaiveDate::from_ymd_opt(year, first, second))
}

fn expand_year(s: &str) -> Option<i32> {
    let y: i32 = s.parse().ok()?;
    match s.len() {
        1 | 2 if y <= 68 => Some(2000 + y),
        1 | 2 => Some(1900 + y),
        4 => Some(y),
        _ => None,
    }
}

fn parse_text(s: &str) -> Option<NaiveDate> {
    TEXT_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_without_comma_is_unchanged() {
        assert_eq!(normalize_name("Jane Doe"), "Jane Doe");
        assert_eq!(normalize_name(""), "");
        assert_eq!(normalize_name("  Cher "), "  Cher ");
    }

    #[test]
    fn name_last_first_is_swapped() {
        assert_eq!(normalize_name("Doe, Jane"), "Jane Doe");
        assert_eq!(normalize_name("Ausar , Lautaro"), "Lautaro Ausar");
    }

    #[test]
    fn name_only_splits_on_first_comma() {
        assert_eq!(normalize_name("Last,  First , Extra"), "First , Extra Last");
        assert_eq!(normalize_name("Doe,"), " Doe");
    }

    #[test]
    fn dob_is_read_day_first() {
        let res = derive_dob("03/04/2010", YearFormat::TwoDigit);
        assert_eq!(
            res,
            ("03".to_string(), "04".to_string(), "10".to_string())
        );
    }

    #[test]
    fn dob_year_formats() {
        assert_eq!(derive_dob("15/06/1990", YearFormat::TwoDigit).2, "90");
        assert_eq!(derive_dob("15/06/1990", YearFormat::FourDigit).2, "1990");
        assert_eq!(derive_dob("1/2/2005", YearFormat::TwoDigit).2, "05");
    }

    #[test]
    fn dob_falls_back_to_month_first() {
        let res = derive_dob("04/13/2010", YearFormat::FourDigit);
        assert_eq!(
            res,
            ("13".to_string(), "04".to_string(), "2010".to_string())
        );
    }

    #[test]
    fn dob_other_formats() {
        let expected = ("15".to_string(), "06".to_string(), "1990".to_string());
        for raw in [
            "1990-06-15",
            "1990-06-15T00:00:00",
            "15-06-1990",
            "15.06.1990",
            "15/06/1990 00:00",
            "15/06/90",
            "15 June 1990",
            "June 15, 1990",
            "15 Jun 1990",
            "15-Jun-1990",
            "15-Jun-90",
            "15-June-1990",
            "15 / 06 / 1990",
            " 15 -06- 1990 ",
            "15 / 06 / 1990 00:00",
        ] {
            assert_eq!(derive_dob(raw, YearFormat::FourDigit), expected, "{}", raw);
        }
    }

    #[test]
    fn dob_is_total() {
        let empty = ("".to_string(), "".to_string(), "".to_string());
        for raw in [
            "",
            "   ",
            "not a date",
            "31/02/2001",
            "13/13/2013",
            "12/2001",
            "1/2/3/4",
            "123/04/2001",
            "15/06/19900",
            "--",
        ] {
            assert_eq!(derive_dob(raw, YearFormat::TwoDigit), empty, "{}", raw);
        }
    }
}
