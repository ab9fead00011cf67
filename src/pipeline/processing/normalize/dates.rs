use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::types::{Cell, RecordSet};

/// Canonical output format for calendar dates
pub const CANONICAL_DATE_FORMAT: &str = "%Y-%m-%d";

/// Timestamp layouts reduced to their calendar date.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Calendar layouts tried after commas are dropped and whitespace collapsed.
/// Order matters: month-first wins for ambiguous numeric dates. `%Y` accepts
/// any digit count, so results outside `FULL_YEARS` are rejected.
const DATE_FORMATS: &[&str] = &[
    "%B %d %Y",
    "%B %Y %d",
    "%d %B %Y",
    "%Y %B %d",
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y.%m.%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%m-%d-%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
];

/// Two-digit-year layouts, tried once no full-year layout matched
const SHORT_YEAR_FORMATS: &[&str] = &["%m/%d/%y", "%d/%m/%y", "%m-%d-%y", "%d-%m-%y"];

const FULL_YEARS: std::ops::RangeInclusive<i32> = 1000..=9999;

static ORDINAL_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(\d{1,2})(st|nd|rd|th)\b").expect("ordinal pattern is valid"));

/// Parse a cell into a calendar date.
///
/// Text is tried against the exact `YYYY-MM-DD` layout first, then against a
/// broader set of common conventions. Anything else (null, numbers, empty
/// text, impossible calendar components) yields `None`.
pub fn parse_date(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::Date(d) => Some(*d),
        Cell::Text(s) => parse_strict(s).or_else(|| parse_permissive(s)),
        _ => None,
    }
}

/// Map a cell to `Cell::Date` or the `Cell::NoDate` sentinel.
pub fn normalize_date(cell: &Cell) -> Cell {
    parse_date(cell).map_or(Cell::NoDate, Cell::Date)
}

fn parse_strict(raw: &str) -> Option<NaiveDate> {
    let bytes = raw.as_bytes();
    let shaped = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if !shaped {
        return None;
    }
    NaiveDate::parse_from_str(raw, CANONICAL_DATE_FORMAT).ok()
}

fn parse_permissive(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt.date());
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.date_naive());
    }
    if let Some(date) = parse_compact(trimmed) {
        return Some(date);
    }

    let without_ordinals = ORDINAL_SUFFIX.replace_all(trimmed, "$1");
    let cleaned = without_ordinals
        .replace(',', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    DATE_FORMATS
        .iter()
        .filter_map(|fmt| NaiveDate::parse_from_str(&cleaned, fmt).ok())
        .find(|d| FULL_YEARS.contains(&d.year()))
        .or_else(|| {
            SHORT_YEAR_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(&cleaned, fmt).ok())
        })
}

/// Digit-only `YYYYMMDD`
fn parse_compact(raw: &str) -> Option<NaiveDate> {
    if raw.len() != 8 || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year = raw[..4].parse().ok()?;
    let month = raw[4..6].parse().ok()?;
    let day = raw[6..].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Normalize `column` in place and drop every row whose value is not a date.
///
/// Survivors hold the canonical `YYYY-MM-DD` text. Returns the number of rows
/// dropped.
pub fn filter_dates(set: &mut RecordSet, column: &str) -> usize {
    set.filter_map_column(column, |cell| {
        parse_date(cell).map(|d| Cell::Text(d.format(CANONICAL_DATE_FORMAT).to_string()))
    })
}

/// Normalize `column` in place without dropping anything; unparseable values
/// become `Cell::NoDate`.
pub fn parse_dates(set: &mut RecordSet, column: &str) {
    set.map_column(column, normalize_date);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_canonical_dates_round_trip() {
        for raw in ["2005-06-01", "1999-12-31", "2020-02-29"] {
            let parsed = parse_date(&Cell::text(raw)).unwrap();
            assert_eq!(parsed.format(CANONICAL_DATE_FORMAT).to_string(), raw);
        }
    }

    #[test]
    fn test_named_month_layouts() {
        assert_eq!(parse_date(&Cell::text("July 16, 1996")), Some(date(1996, 7, 16)));
        assert_eq!(parse_date(&Cell::text("October 2012 08")), Some(date(2012, 10, 8)));
        assert_eq!(parse_date(&Cell::text("1998 May 15")), Some(date(1998, 5, 15)));
        assert_eq!(parse_date(&Cell::text("9 March 2001")), Some(date(2001, 3, 9)));
        assert_eq!(parse_date(&Cell::text("Jan 3rd, 2020")), Some(date(2020, 1, 3)));
        assert_eq!(parse_date(&Cell::text("SEPTEMBER 1, 2015")), Some(date(2015, 9, 1)));
    }

    #[test]
    fn test_slashed_and_timestamp_layouts() {
        assert_eq!(parse_date(&Cell::text("2001/10/22")), Some(date(2001, 10, 22)));
        assert_eq!(parse_date(&Cell::text("2022-05-06 13:45:00")), Some(date(2022, 5, 6)));
        assert_eq!(parse_date(&Cell::text("2022-05-06T13:45:00Z")), Some(date(2022, 5, 6)));
        assert_eq!(parse_date(&Cell::text(" 2005-06-01 ")), Some(date(2005, 6, 1)));
    }

    #[test]
    fn test_ambiguous_numeric_dates_are_month_first() {
        assert_eq!(parse_date(&Cell::text("03/04/2020")), Some(date(2020, 3, 4)));
        // Only one reading is valid here
        assert_eq!(parse_date(&Cell::text("13/04/2020")), Some(date(2020, 4, 13)));
    }

    #[test]
    fn test_two_digit_years() {
        assert_eq!(parse_date(&Cell::text("03/04/20")), Some(date(2020, 3, 4)));
        assert_eq!(parse_date(&Cell::text("12/31/99")), Some(date(1999, 12, 31)));
        assert_eq!(parse_date(&Cell::text("03-04-20")), Some(date(2020, 3, 4)));
        // Day-first only when month-first cannot be a date
        assert_eq!(parse_date(&Cell::text("31/12/99")), Some(date(1999, 12, 31)));
    }

    #[test]
    fn test_years_outside_four_digits_are_rejected() {
        assert_eq!(parse_date(&Cell::text("12/31/12345")), None);
        assert_eq!(parse_date(&Cell::text("0099/12/31")), None);
        assert_eq!(parse_date(&Cell::text("July 16, 96")), None);
    }

    #[test]
    fn test_digit_only_dates() {
        assert_eq!(parse_date(&Cell::text("20200103")), Some(date(2020, 1, 3)));
        assert_eq!(parse_date(&Cell::text("20201301")), None);
        assert_eq!(parse_date(&Cell::text("2020013")), None);
        assert_eq!(parse_date(&Cell::text("202001031")), None);
    }

    #[test]
    fn test_invalid_values_are_no_date() {
        for raw in ["", "   ", "NULL", "GTZ2SQJ8KF", "2020-13-01", "2020-01-32", "February 30, 2021"] {
            assert_eq!(normalize_date(&Cell::text(raw)), Cell::NoDate, "input {raw:?}");
        }
        assert_eq!(normalize_date(&Cell::Null), Cell::NoDate);
        assert_eq!(normalize_date(&Cell::Int(20050601)), Cell::NoDate);
    }

    #[test]
    fn test_filter_dates_drops_and_preserves_order() {
        let mut set = RecordSet::from_rows(
            vec!["id".into(), "join_date".into()],
            vec![
                vec![Cell::Int(1), Cell::text("2005-06-01")],
                vec![Cell::Int(2), Cell::text("nonsense")],
                vec![Cell::Int(3), Cell::text("July 16, 1996")],
                vec![Cell::Int(4), Cell::Null],
                vec![Cell::Int(5), Cell::text("2001/10/22")],
            ],
        );

        let dropped = filter_dates(&mut set, "join_date");

        assert_eq!(dropped, 2);
        assert_eq!(set.column_values("id"), vec![Cell::Int(1), Cell::Int(3), Cell::Int(5)]);
        assert_eq!(
            set.column_values("join_date"),
            vec![Cell::text("2005-06-01"), Cell::text("1996-07-16"), Cell::text("2001-10-22")]
        );
    }

    #[test]
    fn test_parse_dates_keeps_sentinel_rows() {
        let mut set = RecordSet::from_rows(
            vec!["opening_date".into()],
            vec![vec![Cell::text("2005-06-01")], vec![Cell::text("N/A")]],
        );

        parse_dates(&mut set, "opening_date");

        assert_eq!(set.len(), 2);
        assert_eq!(set.get(0, "opening_date"), Some(&Cell::Date(date(2005, 6, 1))));
        assert_eq!(set.get(1, "opening_date"), Some(&Cell::NoDate));
    }
}
