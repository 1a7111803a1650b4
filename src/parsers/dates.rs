//! Date parsing for imprint, conference and acquisition data.

use chrono::{Datelike, Duration, NaiveDate};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref RE_YEAR_WEEK: Regex = Regex::new(r"^([0-9]{4})([0-9]{2})$").unwrap();
    static ref RE_COMPACT: Regex = Regex::new(r"^([0-9]{4})([0-9]{2})([0-9]{2})$").unwrap();
    static ref RE_ISO: Regex =
        Regex::new(r"^([0-9]{4})(?:[-/.]([0-9]{1,2})(?:[-/.]([0-9]{1,2}))?)?$").unwrap();
    static ref RE_DAY_MONTH_YEAR: Regex =
        Regex::new(r"^([0-9]{1,2})[ .-]+([A-Za-z]+)\.?[ .-]+([0-9]{4})$").unwrap();
    static ref RE_MONTH_YEAR: Regex = Regex::new(r"^([A-Za-z]+)\.?,? +([0-9]{4})$").unwrap();
    static ref RE_BRACKETED_YEAR: Regex =
        Regex::new(r"^\[?c?(?:op\.)? ?([0-9]{4})\??\]?\.?$").unwrap();
}

const MONTHS: &[&str] = &[
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

fn month_number(name: &str) -> Option<u32> {
    let lower = name.to_lowercase();
    let prefix = lower.get(..3)?;
    MONTHS
        .iter()
        .position(|m| *m == prefix)
        .and_then(|i| u32::try_from(i + 1).ok())
}

fn ymd(year: &str, month: Option<&str>, day: Option<&str>) -> Option<NaiveDate> {
    let year: i32 = year.parse().ok()?;
    let month: u32 = month.map_or(Some(1), |m| m.parse().ok())?;
    let day: u32 = day.map_or(Some(1), |d| d.parse().ok())?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parse the date notations found in catalogue data.
///
/// Accepts `YYYYMMDD`, `YYYY-MM-DD`, `YYYY-MM`, `YYYY`, `[c1999]`,
/// `21 Jun 2004` and `December 2019`. Missing month or day default to 1.
#[must_use]
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let v = value.trim();
    if let Some(c) = RE_COMPACT.captures(v) {
        return ymd(&c[1], Some(&c[2]), Some(&c[3]));
    }
    if let Some(c) = RE_ISO.captures(v) {
        return ymd(
            &c[1],
            c.get(2).map(|m| m.as_str()),
            c.get(3).map(|m| m.as_str()),
        );
    }
    if let Some(c) = RE_DAY_MONTH_YEAR.captures(v) {
        let month = month_number(&c[2])?;
        return NaiveDate::from_ymd_opt(c[3].parse().ok()?, month, c[1].parse().ok()?);
    }
    if let Some(c) = RE_MONTH_YEAR.captures(v) {
        let month = month_number(&c[1])?;
        return NaiveDate::from_ymd_opt(c[2].parse().ok()?, month, 1);
    }
    if let Some(c) = RE_BRACKETED_YEAR.captures(v) {
        return ymd(&c[1], None, None);
    }
    None
}

/// Monday that starts `week` of `year`, in the catalogue's own numbering.
///
/// Week 1 starts on the Monday on or before 1 January unless 1 January
/// falls after Thursday, in which case it starts on the following Monday.
#[must_use]
pub fn get_week_start(year: i32, week: u32) -> Option<NaiveDate> {
    let jan1 = NaiveDate::from_ymd_opt(year, 1, 1)?;
    let weekday = i64::from(jan1.weekday().num_days_from_monday());
    let start = if weekday > 3 {
        jan1 + Duration::days(7 - weekday)
    } else {
        jan1 - Duration::days(weekday)
    };
    Some(start + Duration::days(i64::from(week.saturating_sub(1)) * 7))
}

/// Parse a `YYYYWW` week stamp into its week start.
#[must_use]
pub fn parse_year_week(value: &str) -> Option<NaiveDate> {
    let caps = RE_YEAR_WEEK.captures(value.trim())?;
    let year: i32 = caps[1].parse().ok()?;
    let week: u32 = caps[2].parse().ok()?;
    if week == 0 || week > 53 {
        return None;
    }
    get_week_start(year, week)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_week_start() {
        assert_eq!(get_week_start(2018, 29), Some(d(2018, 7, 16)));
        assert_eq!(parse_year_week("201829"), Some(d(2018, 7, 16)));
        // 1 January 2021 is a Friday: week 1 starts the following Monday
        assert_eq!(get_week_start(2021, 1), Some(d(2021, 1, 4)));
        assert_eq!(parse_year_week("201899"), None);
        assert_eq!(parse_year_week("2018-29"), None);
    }

    #[test]
    fn test_parse_date_formats() {
        assert_eq!(parse_date("20040621"), Some(d(2004, 6, 21)));
        assert_eq!(parse_date("2004-06-21"), Some(d(2004, 6, 21)));
        assert_eq!(parse_date("2013"), Some(d(2013, 1, 1)));
        assert_eq!(parse_date("2013-05"), Some(d(2013, 5, 1)));
        assert_eq!(parse_date("[c1999]"), Some(d(1999, 1, 1)));
        assert_eq!(parse_date("21 Jun 2004"), Some(d(2004, 6, 21)));
        assert_eq!(parse_date("December 2019"), Some(d(2019, 12, 1)));
    }

    #[test]
    fn test_parse_date_rejects() {
        assert_eq!(parse_date("someday"), None);
        assert_eq!(parse_date("20041321"), None);
        assert_eq!(parse_date("Smarch 2019"), None);
    }
}
