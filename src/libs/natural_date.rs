//! Natural-language date parsing.
//!
//! Turns free text such as `tomorrow`, `next friday at 3pm`, `in 2 weeks`,
//! `march 15th 2025` or `2024-01-11 14:30` into a wall-clock
//! [`NaiveDateTime`] in the zone of the reference instant.
//!
//! Parsing never fails loudly: anything that cannot be understood yields
//! `None`, and the caller decides what "not yet resolvable" means.

use chrono::{
    DateTime, Datelike, Duration, FixedOffset, Months, NaiveDate, NaiveDateTime, NaiveTime,
    Weekday,
};
use lazy_static::lazy_static;
use regex::Regex;

/// Something that can turn free text into a date-time.
///
/// `reference` is "now" for relative expressions, and its offset is the zone
/// the returned wall-clock value lives in.
pub trait DateParser: std::fmt::Debug + Send + Sync {
    fn parse(&self, text: &str, reference: DateTime<FixedOffset>) -> Option<NaiveDateTime>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NaturalDateParser;

lazy_static! {
    static ref CLOCK: Regex = Regex::new(
        r"^(?P<h>\d{1,2})(?::(?P<m>\d{2}))?(?::(?P<s>\d{2}))?\s*(?P<ampm>am|pm|a\.m\.?|p\.m\.?)?$"
    )
    .unwrap();
    static ref TIME_SUFFIX: Regex = Regex::new(
        r"^(?P<date>.+?),?\s+(?:at\s+)?(?P<time>\d{1,2}:\d{2}(?::\d{2})?(?:\s*(?:am|pm|a\.m\.?|p\.m\.?))?|\d{1,2}\s*(?:am|pm|a\.m\.?|p\.m\.?)|noon|midnight)$"
    )
    .unwrap();
    static ref AT_HOUR_SUFFIX: Regex =
        Regex::new(r"^(?P<date>.+?)\s+at\s+(?P<time>\d{1,2})$").unwrap();
    static ref RELATIVE_PERIOD: Regex =
        Regex::new(r"^(?P<dir>next|last)\s+(?P<unit>week|month|year)$").unwrap();
    static ref WEEKDAY: Regex =
        Regex::new(r"^(?:(?P<rel>next|last|this)\s+)?(?P<day>[a-z]+)\.?$").unwrap();
    static ref IN_N_UNITS: Regex = Regex::new(
        r"^in\s+(?P<n>\d+|a|an|one)\s+(?P<unit>minute|hour|day|week|month|year)s?$"
    )
    .unwrap();
    static ref N_UNITS_RELATIVE: Regex = Regex::new(
        r"^(?P<n>\d+|a|an|one)\s+(?P<unit>minute|hour|day|week|month|year)s?\s+(?P<dir>ago|from now|later)$"
    )
    .unwrap();
    static ref MONTH_DAY: Regex = Regex::new(
        r"^(?P<month>[a-z]+)\.?\s+(?P<day>\d{1,2})(?:st|nd|rd|th)?(?:,?\s+(?P<year>\d{4}))?$"
    )
    .unwrap();
    static ref DAY_MONTH: Regex = Regex::new(
        r"^(?P<day>\d{1,2})(?:st|nd|rd|th)?\s+(?:of\s+)?(?P<month>[a-z]+)\.?(?:,?\s+(?P<year>\d{4}))?$"
    )
    .unwrap();
}

impl DateParser for NaturalDateParser {
    fn parse(&self, text: &str, reference: DateTime<FixedOffset>) -> Option<NaiveDateTime> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        if let Some(dt) = parse_absolute(trimmed, reference) {
            return Some(dt);
        }

        let input = normalize(trimmed);

        if let Some(time) = parse_clock(&input, false) {
            return Some(reference.date_naive().and_time(time));
        }
        if let Some(dt) = parse_date_expr(&input, reference) {
            return Some(dt);
        }

        let (date_part, time) = split_time_suffix(&input)?;
        let date = parse_date_expr(date_part, reference)?;
        Some(date.date().and_time(time))
    }
}

fn normalize(input: &str) -> String {
    input
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end_matches(['.', ',', '!'])
        .to_string()
}

/// `utc` as read on a clock in `zone`, or `None` past the representable range.
pub fn wall_clock(utc: NaiveDateTime, zone: &FixedOffset) -> Option<NaiveDateTime> {
    utc.checked_add_signed(Duration::seconds(i64::from(zone.local_minus_utc())))
}

/// ISO 8601 as produced by machines: RFC 3339 with an offset (converted into
/// `zone`), a local date-time without offset, or a bare `YYYY-MM-DD`.
pub fn parse_iso(input: &str, zone: &FixedOffset) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return wall_clock(dt.naive_utc(), zone);
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(input, format) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .map(|date| date.and_time(NaiveTime::MIN))
}

/// ISO forms plus the looser numeric layouts people type.
fn parse_absolute(input: &str, reference: DateTime<FixedOffset>) -> Option<NaiveDateTime> {
    if let Some(dt) = parse_iso(input, reference.offset()) {
        return Some(dt);
    }
    for format in ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M", "%m/%d/%Y %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(input, format) {
            return Some(dt);
        }
    }
    for format in ["%m/%d/%Y", "%Y/%m/%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(input, format) {
            return Some(date.and_time(NaiveTime::MIN));
        }
    }
    None
}

/// Parse a clock time. A bare hour (`9`) is only a time when `allow_bare_hour`
/// is set, i.e. after an explicit `at`.
pub(crate) fn parse_clock(input: &str, allow_bare_hour: bool) -> Option<NaiveTime> {
    match input {
        "noon" => return NaiveTime::from_hms_opt(12, 0, 0),
        "midnight" => return Some(NaiveTime::MIN),
        _ => {}
    }
    let caps = CLOCK.captures(input)?;
    let mut hour: u32 = caps["h"].parse().ok()?;
    let minute: u32 = caps.name("m").map_or(Some(0), |m| m.as_str().parse().ok())?;
    let second: u32 = caps.name("s").map_or(Some(0), |s| s.as_str().parse().ok())?;

    match caps.name("ampm").map(|m| m.as_str()) {
        Some(ampm) => {
            if !(1..=12).contains(&hour) {
                return None;
            }
            let pm = ampm.starts_with('p');
            if pm && hour != 12 {
                hour += 12;
            } else if !pm && hour == 12 {
                hour = 0;
            }
        }
        None if caps.name("m").is_none() && !allow_bare_hour => return None,
        None => {}
    }
    NaiveTime::from_hms_opt(hour, minute, second)
}

fn split_time_suffix(input: &str) -> Option<(&str, NaiveTime)> {
    if let Some(caps) = TIME_SUFFIX.captures(input) {
        let time = parse_clock(caps.name("time")?.as_str(), false)?;
        return Some((caps.name("date")?.as_str(), time));
    }
    let caps = AT_HOUR_SUFFIX.captures(input)?;
    let time = parse_clock(caps.name("time")?.as_str(), true)?;
    Some((caps.name("date")?.as_str(), time))
}

fn parse_date_expr(input: &str, reference: DateTime<FixedOffset>) -> Option<NaiveDateTime> {
    let today = reference.date_naive();
    let midnight = |date: NaiveDate| date.and_time(NaiveTime::MIN);

    match input {
        "now" => return Some(reference.naive_local()),
        "today" => return Some(midnight(today)),
        "tomorrow" => return today.succ_opt().map(midnight),
        "yesterday" => return today.pred_opt().map(midnight),
        _ => {}
    }

    if let Some(dt) = parse_absolute(input, reference) {
        return Some(dt);
    }

    if let Some(caps) = RELATIVE_PERIOD.captures(input) {
        let sign = if &caps["dir"] == "next" { 1 } else { -1 };
        let date = match &caps["unit"] {
            "week" => today.checked_add_signed(Duration::weeks(sign)),
            "month" => shift_months(today, sign as i32),
            _ => shift_months(today, 12 * sign as i32),
        };
        return date.map(midnight);
    }

    if let Some(caps) = WEEKDAY.captures(input) {
        if let Some(target) = weekday_from(&caps["day"]) {
            let rel = caps.name("rel").map(|m| m.as_str());
            return weekday_relative(today, target, rel).map(midnight);
        }
    }

    if let Some(caps) = IN_N_UNITS.captures(input) {
        let n = count_from(&caps["n"])?;
        return offset(reference.naive_local(), n, &caps["unit"]);
    }
    if let Some(caps) = N_UNITS_RELATIVE.captures(input) {
        let n = count_from(&caps["n"])?;
        let n = if &caps["dir"] == "ago" { -n } else { n };
        return offset(reference.naive_local(), n, &caps["unit"]);
    }

    let caps = MONTH_DAY
        .captures(input)
        .filter(|caps| month_from(&caps["month"]).is_some())
        .or_else(|| DAY_MONTH.captures(input))?;
    let month = month_from(&caps["month"])?;
    let day: u32 = caps["day"].parse().ok()?;
    let year = match caps.name("year") {
        Some(year) => year.as_str().parse().ok()?,
        None => today.year(),
    };
    NaiveDate::from_ymd_opt(year, month, day).map(midnight)
}

fn shift_months(date: NaiveDate, months: i32) -> Option<NaiveDate> {
    let delta = Months::new(months.unsigned_abs());
    if months >= 0 {
        date.checked_add_months(delta)
    } else {
        date.checked_sub_months(delta)
    }
}

fn offset(from: NaiveDateTime, n: i64, unit: &str) -> Option<NaiveDateTime> {
    match unit {
        "minute" => from.checked_add_signed(Duration::try_minutes(n)?),
        "hour" => from.checked_add_signed(Duration::try_hours(n)?),
        "day" => from.checked_add_signed(Duration::try_days(n)?),
        "week" => from.checked_add_signed(Duration::try_weeks(n)?),
        "month" => {
            let date = shift_months(from.date(), i32::try_from(n).ok()?)?;
            Some(date.and_time(from.time()))
        }
        "year" => {
            let date = shift_months(from.date(), i32::try_from(n.checked_mul(12)?).ok()?)?;
            Some(date.and_time(from.time()))
        }
        _ => None,
    }
}

fn count_from(token: &str) -> Option<i64> {
    match token {
        "a" | "an" | "one" => Some(1),
        digits => digits.parse().ok(),
    }
}

/// `friday` is the upcoming friday (today included), `next friday` is
/// strictly after today and `last friday` strictly before.
fn weekday_relative(today: NaiveDate, target: Weekday, rel: Option<&str>) -> Option<NaiveDate> {
    let from = today.weekday().num_days_from_monday() as i64;
    let to = target.num_days_from_monday() as i64;
    let ahead = (to - from).rem_euclid(7);
    let days = match rel {
        Some("next") if ahead == 0 => 7,
        Some("last") => {
            let back = (from - to).rem_euclid(7);
            -(if back == 0 { 7 } else { back })
        }
        _ => ahead,
    };
    today.checked_add_signed(Duration::days(days))
}

fn weekday_from(token: &str) -> Option<Weekday> {
    const NAMES: [(&str, &[&str], Weekday); 7] = [
        ("monday", &["mon"], Weekday::Mon),
        ("tuesday", &["tue", "tues"], Weekday::Tue),
        ("wednesday", &["wed"], Weekday::Wed),
        ("thursday", &["thu", "thur", "thurs"], Weekday::Thu),
        ("friday", &["fri"], Weekday::Fri),
        ("saturday", &["sat"], Weekday::Sat),
        ("sunday", &["sun"], Weekday::Sun),
    ];
    NAMES
        .iter()
        .find(|(full, short, _)| *full == token || short.contains(&token))
        .map(|(_, _, day)| *day)
}

fn month_from(token: &str) -> Option<u32> {
    const NAMES: [&str; 12] = [
        "january",
        "february",
        "march",
        "april",
        "may",
        "june",
        "july",
        "august",
        "september",
        "october",
        "november",
        "december",
    ];
    if token == "sept" {
        return Some(9);
    }
    NAMES
        .iter()
        .position(|name| *name == token || (token.len() == 3 && name.starts_with(token)))
        .map(|idx| idx as u32 + 1)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    /// Wednesday 2024-01-10 09:15:30 UTC.
    fn reference() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 1, 10, 9, 15, 30)
            .unwrap()
    }

    fn parse(text: &str) -> Option<NaiveDateTime> {
        NaturalDateParser.parse(text, reference())
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(y, m, d).and_then(|date| date.and_hms_opt(h, min, s))
    }

    #[test]
    fn day_words() {
        assert_eq!(parse("tomorrow"), at(2024, 1, 11, 0, 0, 0));
        assert_eq!(parse("  Today "), at(2024, 1, 10, 0, 0, 0));
        assert_eq!(parse("yesterday"), at(2024, 1, 9, 0, 0, 0));
        assert_eq!(parse("now"), at(2024, 1, 10, 9, 15, 30));
    }

    #[test]
    fn relative_periods() {
        assert_eq!(parse("next week"), at(2024, 1, 17, 0, 0, 0));
        assert_eq!(parse("last month"), at(2023, 12, 10, 0, 0, 0));
        assert_eq!(parse("next year"), at(2025, 1, 10, 0, 0, 0));
    }

    #[test]
    fn weekdays() {
        assert_eq!(parse("friday"), at(2024, 1, 12, 0, 0, 0));
        assert_eq!(parse("wednesday"), at(2024, 1, 10, 0, 0, 0));
        assert_eq!(parse("next wed"), at(2024, 1, 17, 0, 0, 0));
        assert_eq!(parse("last monday"), at(2024, 1, 8, 0, 0, 0));
        assert_eq!(parse("last wednesday"), at(2024, 1, 3, 0, 0, 0));
    }

    #[test]
    fn offsets_keep_the_clock() {
        assert_eq!(parse("in 2 days"), at(2024, 1, 12, 9, 15, 30));
        assert_eq!(parse("3 weeks ago"), at(2023, 12, 20, 9, 15, 30));
        assert_eq!(parse("an hour ago"), at(2024, 1, 10, 8, 15, 30));
        assert_eq!(parse("a month from now"), at(2024, 2, 10, 9, 15, 30));
    }

    #[test]
    fn month_arithmetic_clamps() {
        let reference = FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2024, 1, 31, 0, 0, 0)
            .unwrap();
        assert_eq!(
            NaturalDateParser.parse("next month", reference),
            at(2024, 2, 29, 0, 0, 0)
        );
    }

    #[test]
    fn month_and_day() {
        assert_eq!(parse("march 15"), at(2024, 3, 15, 0, 0, 0));
        assert_eq!(parse("15 dec"), at(2024, 12, 15, 0, 0, 0));
        assert_eq!(parse("Dec 15th, 2025"), at(2025, 12, 15, 0, 0, 0));
        assert_eq!(parse("1st of sept"), at(2024, 9, 1, 0, 0, 0));
        assert_eq!(parse("february 30"), None);
    }

    #[test]
    fn time_suffixes() {
        assert_eq!(parse("tomorrow at 3pm"), at(2024, 1, 11, 15, 0, 0));
        assert_eq!(parse("next friday 14:30"), at(2024, 1, 12, 14, 30, 0));
        assert_eq!(parse("march 15 at 9"), at(2024, 3, 15, 9, 0, 0));
        assert_eq!(parse("tomorrow noon"), at(2024, 1, 11, 12, 0, 0));
        assert_eq!(parse("12am"), at(2024, 1, 10, 0, 0, 0));
        assert_eq!(parse("09:15:45"), at(2024, 1, 10, 9, 15, 45));
    }

    #[test]
    fn machine_formats() {
        assert_eq!(parse("2024-01-11"), at(2024, 1, 11, 0, 0, 0));
        assert_eq!(parse("2024-01-11 14:30"), at(2024, 1, 11, 14, 30, 0));
        assert_eq!(parse("2024-01-11T14:30:05"), at(2024, 1, 11, 14, 30, 5));
        assert_eq!(parse("01/11/2024"), at(2024, 1, 11, 0, 0, 0));
        assert_eq!(
            parse("2024-01-11T14:30:00+02:00"),
            at(2024, 1, 11, 12, 30, 0)
        );
    }

    #[test]
    fn wall_clock_stops_at_the_calendar_edge() {
        let east = FixedOffset::east_opt(8 * 3600).unwrap();
        let west = FixedOffset::west_opt(5 * 3600).unwrap();
        assert_eq!(
            wall_clock(at(2024, 1, 10, 20, 0, 0).unwrap(), &east),
            at(2024, 1, 11, 4, 0, 0)
        );
        assert_eq!(wall_clock(NaiveDateTime::MAX, &east), None);
        assert_eq!(wall_clock(NaiveDateTime::MIN, &west), None);
    }

    #[test]
    fn unparseable_is_none() {
        for text in [
            "",
            "   ",
            "tomorr",
            "blah blah",
            "25:00",
            "13pm",
            "9",
            "in days",
            "in 9999999999999999 days",
            "999999999999999999 minutes ago",
            "in 99999999999999 weeks",
            "in 9999999999999999999999 hours",
        ] {
            assert_eq!(parse(text), None, "{text:?} should not parse");
        }
    }
}
