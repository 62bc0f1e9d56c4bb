use chrono::{Datelike, NaiveDate, NaiveDateTime};

/// Recognized date shapes, tried in order. The first one that parses wins.
///
/// Note that `03/04/2024` is accepted by both `%m/%d/%Y` and `%d/%m/%Y`.
/// Month-first is listed earlier, so it is always read as March 4.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%B %d, %Y",
    "%b %d, %Y",
];

const SHORT_DISPLAY: &str = "%b %d";
const LONG_DISPLAY: &str = "%B %d, %Y";

/// Where an undated article should land in a reverse-chronological listing.
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum Fallback {
    /// January 1 of the current year.
    StartOfYear,
    /// The smallest representable instant, so the article always sorts last.
    Minimum,
}

#[derive(PartialEq, Eq, Debug, Clone)]
pub struct NormalizedDate {
    pub year: i32,
    pub display: String,
    pub sort_key: NaiveDateTime,
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(s, format).ok())
}

/// Normalizes a raw date into the (year, "Mon DD", sort instant) triple used by
/// the article listing. Absent and malformed input are treated the same way.
pub fn normalize(raw: Option<&str>, today: NaiveDate, fallback: Fallback) -> NormalizedDate {
    match raw.and_then(parse_date) {
        Some(date) => NormalizedDate {
            year: date.year(),
            display: date.format(SHORT_DISPLAY).to_string(),
            sort_key: start_of_day(date),
        },
        None => NormalizedDate {
            year: today.year(),
            display: today.format(SHORT_DISPLAY).to_string(),
            sort_key: match fallback {
                Fallback::StartOfYear => NaiveDate::from_ymd_opt(today.year(), 1, 1)
                    .map(start_of_day)
                    .unwrap_or(NaiveDateTime::MIN),
                Fallback::Minimum => NaiveDateTime::MIN,
            },
        },
    }
}

/// "Month DD, YYYY" form shown on the article page itself.
pub fn long_display(raw: Option<&str>, today: NaiveDate) -> String {
    raw.and_then(parse_date)
        .unwrap_or(today)
        .format(LONG_DISPLAY)
        .to_string()
}

fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_opt(0, 0, 0).unwrap_or(NaiveDateTime::MIN)
}
