//! Calendar arithmetic for the timeline.
//!
//! All operations are pure. `diff` deliberately approximates months as 30
//! days and years as 360 days; axis ticks and range padding use the
//! calendar-aware `add`/`start_of` instead.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// Granularity unit for `diff`, `add` and `start_of`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeUnit {
    Millisecond,
    Second,
    Minute,
    Hour,
    Day,
    Month,
    Year,
}

const MONTHS_EN: [&str; 12] = [
    "January", "February", "March", "April", "May", "June", "July", "August",
    "September", "October", "November", "December",
];
const MONTHS_ES: [&str; 12] = [
    "Enero", "Febrero", "Marzo", "Abril", "Mayo", "Junio", "Julio", "Agosto",
    "Septiembre", "Octubre", "Noviembre", "Diciembre",
];
const MONTHS_FR: [&str; 12] = [
    "Janvier", "Février", "Mars", "Avril", "Mai", "Juin", "Juillet", "Août",
    "Septembre", "Octobre", "Novembre", "Décembre",
];
const MONTHS_DE: [&str; 12] = [
    "Januar", "Februar", "März", "April", "Mai", "Juni", "Juli", "August",
    "September", "Oktober", "November", "Dezember",
];
const MONTHS_IT: [&str; 12] = [
    "Gennaio", "Febbraio", "Marzo", "Aprile", "Maggio", "Giugno", "Luglio",
    "Agosto", "Settembre", "Ottobre", "Novembre", "Dicembre",
];

/// Month names for a locale key; unknown keys fall back to English.
pub fn month_names(lang: &str) -> &'static [&'static str; 12] {
    match lang {
        "es" => &MONTHS_ES,
        "fr" => &MONTHS_FR,
        "de" => &MONTHS_DE,
        "it" => &MONTHS_IT,
        _ => &MONTHS_EN,
    }
}

/// Midnight of the current local calendar day.
pub fn today() -> NaiveDateTime {
    chrono::Local::now().date_naive().and_time(NaiveTime::MIN)
}

/// Parse a date string: a `YYYY-MM-DD` date part with an optional
/// `HH:MM[:SS[.mmm]]` time part separated by whitespace.
///
/// Returns `None` for anything malformed; never panics.
pub fn parse(text: &str) -> Option<NaiveDateTime> {
    let mut parts = text.split_whitespace();
    let date_part = parts.next()?;

    let mut fields = date_part.split('-');
    let year: i32 = fields.next()?.trim().parse().ok()?;
    let month: u32 = fields.next()?.trim().parse().ok()?;
    let day: u32 = fields.next()?.trim().parse().ok()?;
    if fields.next().is_some() {
        return None;
    }
    let date = NaiveDate::from_ymd_opt(year, month, day)?;

    let time = match parts.next() {
        Some(t) => parse_time(t)?,
        None => NaiveTime::MIN,
    };
    if parts.next().is_some() {
        return None;
    }
    Some(date.and_time(time))
}

fn parse_time(text: &str) -> Option<NaiveTime> {
    let mut fields = text.split(':');
    let hour: u32 = fields.next()?.parse().ok()?;
    let minute: u32 = fields.next()?.parse().ok()?;
    let (second, milli) = match fields.next() {
        None => (0, 0),
        Some(sec) => {
            let mut halves = sec.split('.');
            let s: u32 = halves.next()?.parse().ok()?;
            let ms = match halves.next() {
                None => 0,
                // "5" means 500ms, "05" means 50ms: pad to three digits
                Some(frac) => {
                    let padded = format!("{:0<3}", frac);
                    padded.get(..3)?.parse().ok()?
                }
            };
            (s, ms)
        }
    };
    if fields.next().is_some() {
        return None;
    }
    NaiveTime::from_hms_milli_opt(hour, minute, second, milli)
}

/// Format an instant using `YYYY MM DD HH mm ss SSS D MMMM MMM` tokens.
/// Longest token wins at each position; other characters pass through.
pub fn format(date: &NaiveDateTime, pattern: &str, lang: &str) -> String {
    let months = month_names(lang);
    let month_name = months[date.month0() as usize];
    let mut out = String::with_capacity(pattern.len() + 8);
    let mut rest = pattern;

    while !rest.is_empty() {
        let (text, consumed) = if rest.starts_with("YYYY") {
            (format!("{:04}", date.year()), 4)
        } else if rest.starts_with("MMMM") {
            (month_name.to_string(), 4)
        } else if rest.starts_with("MMM") {
            (month_name.chars().take(3).collect(), 3)
        } else if rest.starts_with("SSS") {
            (format!("{:03}", date.and_utc().timestamp_subsec_millis()), 3)
        } else if rest.starts_with("MM") {
            (format!("{:02}", date.month()), 2)
        } else if rest.starts_with("DD") {
            (format!("{:02}", date.day()), 2)
        } else if rest.starts_with("HH") {
            (format!("{:02}", date.hour()), 2)
        } else if rest.starts_with("mm") {
            (format!("{:02}", date.minute()), 2)
        } else if rest.starts_with("ss") {
            (format!("{:02}", date.second()), 2)
        } else if rest.starts_with('D') {
            (date.day().to_string(), 1)
        } else {
            let ch = rest.chars().next().unwrap_or('\0');
            (ch.to_string(), ch.len_utf8())
        };
        out.push_str(&text);
        rest = &rest[consumed..];
    }
    out
}

/// Floor of the whole units elapsed from `b` to `a`.
///
/// Month and year are fixed-length approximations (30 and 360 days).
pub fn diff(a: &NaiveDateTime, b: &NaiveDateTime, unit: TimeUnit) -> i64 {
    let ms = (*a - *b).num_milliseconds() as f64;
    let val = match unit {
        TimeUnit::Millisecond => ms,
        TimeUnit::Second => ms / 1000.0,
        TimeUnit::Minute => ms / 60_000.0,
        TimeUnit::Hour => ms / 3_600_000.0,
        TimeUnit::Day => ms / 86_400_000.0,
        TimeUnit::Month => ms / (30.0 * 86_400_000.0),
        TimeUnit::Year => ms / (360.0 * 86_400_000.0),
    };
    val.floor() as i64
}

/// Add `qty` units to an instant. Month and year are calendar-aware with
/// the day-of-month clamped to the target month's length; day and below
/// are fixed-length.
pub fn add(date: &NaiveDateTime, qty: i64, unit: TimeUnit) -> NaiveDateTime {
    match unit {
        TimeUnit::Millisecond => *date + Duration::milliseconds(qty),
        TimeUnit::Second => *date + Duration::seconds(qty),
        TimeUnit::Minute => *date + Duration::minutes(qty),
        TimeUnit::Hour => *date + Duration::hours(qty),
        TimeUnit::Day => *date + Duration::days(qty),
        TimeUnit::Month => add_months(date, qty),
        TimeUnit::Year => add_months(date, qty * 12),
    }
}

fn add_months(date: &NaiveDateTime, qty: i64) -> NaiveDateTime {
    let total = date.year() as i64 * 12 + date.month0() as i64 + qty;
    let year = total.div_euclid(12) as i32;
    let month = total.rem_euclid(12) as u32 + 1;
    let day = date.day().min(month_length(year, month));
    NaiveDate::from_ymd_opt(year, month, day)
        .map(|d| d.and_time(date.time()))
        .unwrap_or(*date)
}

/// Zero every component at or below `unit`.
pub fn start_of(date: &NaiveDateTime, unit: TimeUnit) -> NaiveDateTime {
    let d = date.date();
    match unit {
        TimeUnit::Year => ymd(d.year(), 1, 1, *date),
        TimeUnit::Month => ymd(d.year(), d.month(), 1, *date),
        TimeUnit::Day => d.and_time(NaiveTime::MIN),
        TimeUnit::Hour => truncate(date, 3_600_000),
        TimeUnit::Minute => truncate(date, 60_000),
        TimeUnit::Second => truncate(date, 1000),
        TimeUnit::Millisecond => truncate(date, 1),
    }
}

fn ymd(year: i32, month: u32, day: u32, fallback: NaiveDateTime) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .map(|d| d.and_time(NaiveTime::MIN))
        .unwrap_or(fallback)
}

fn truncate(date: &NaiveDateTime, unit_ms: i64) -> NaiveDateTime {
    let ms = date.and_utc().timestamp_millis();
    let floored = ms - ms.rem_euclid(unit_ms);
    chrono::DateTime::from_timestamp_millis(floored)
        .map(|d| d.naive_utc())
        .unwrap_or(*date)
}

/// Number of days in the instant's month, per the Gregorian leap rule.
pub fn days_in_month(date: &NaiveDateTime) -> u32 {
    month_length(date.year(), date.month())
}

fn month_length(year: i32, month: u32) -> u32 {
    const LENGTHS: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
    let leap = (year % 4 == 0 && year % 100 != 0) || year % 400 == 0;
    match month {
        2 if leap => 29,
        m if (1..=12).contains(&m) => LENGTHS[(m - 1) as usize],
        _ => 30,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(s: &str) -> NaiveDateTime {
        parse(s).unwrap()
    }

    #[test]
    fn parses_date_only() {
        let d = dt("2024-01-10");
        assert_eq!(format(&d, "YYYY-MM-DD HH:mm:ss", "en"), "2024-01-10 00:00:00");
    }

    #[test]
    fn parses_date_and_time() {
        let d = dt("2024-03-05 14:30:15.250");
        assert_eq!(format(&d, "YYYY-MM-DD HH:mm:ss.SSS", "en"), "2024-03-05 14:30:15.250");
    }

    #[test]
    fn rejects_malformed_input() {
        assert!(parse("").is_none());
        assert!(parse("not a date").is_none());
        assert!(parse("2024-13-01").is_none());
        assert!(parse("2024-02-30").is_none());
        assert!(parse("2024-01-10 25:00").is_none());
        assert!(parse("2024-01-10 12:00 extra").is_none());
    }

    #[test]
    fn formats_month_tokens() {
        let d = dt("2024-12-25");
        assert_eq!(format(&d, "D MMMM YYYY", "en"), "25 December 2024");
        assert_eq!(format(&d, "MMM", "en"), "Dec");
        assert_eq!(format(&d, "MMMM", "fr"), "Décembre");
        assert_eq!(format(&d, "MMMM", "nope"), "December");
    }

    #[test]
    fn diff_floors_whole_units() {
        let a = dt("2024-01-10");
        let b = dt("2024-01-12 12:00");
        assert_eq!(diff(&b, &a, TimeUnit::Day), 2);
        assert_eq!(diff(&b, &a, TimeUnit::Hour), 60);
        assert_eq!(diff(&a, &b, TimeUnit::Day), -3);
    }

    #[test]
    fn diff_month_and_year_are_approximations() {
        let a = dt("2024-01-01");
        assert_eq!(diff(&dt("2024-03-01"), &a, TimeUnit::Month), 2);
        // 360-day years: a full calendar year counts as one and a bit
        assert_eq!(diff(&dt("2025-01-01"), &a, TimeUnit::Year), 1);
        assert_eq!(diff(&dt("2024-12-26"), &a, TimeUnit::Year), 1);
    }

    #[test]
    fn add_months_clamps_day_of_month() {
        assert_eq!(add(&dt("2024-01-31"), 1, TimeUnit::Month), dt("2024-02-29"));
        assert_eq!(add(&dt("2023-01-31"), 1, TimeUnit::Month), dt("2023-02-28"));
        assert_eq!(add(&dt("2024-03-15"), -3, TimeUnit::Month), dt("2023-12-15"));
        assert_eq!(add(&dt("2024-02-29"), 1, TimeUnit::Year), dt("2025-02-28"));
    }

    #[test]
    fn add_hours_and_days() {
        assert_eq!(add(&dt("2024-01-10"), 24, TimeUnit::Hour), dt("2024-01-11"));
        assert_eq!(add(&dt("2024-01-10"), -2, TimeUnit::Day), dt("2024-01-08"));
    }

    #[test]
    fn start_of_zeroes_lower_components() {
        let d = dt("2024-05-17 13:45:30.500");
        assert_eq!(start_of(&d, TimeUnit::Year), dt("2024-01-01"));
        assert_eq!(start_of(&d, TimeUnit::Month), dt("2024-05-01"));
        assert_eq!(start_of(&d, TimeUnit::Day), dt("2024-05-17"));
        assert_eq!(start_of(&d, TimeUnit::Hour), dt("2024-05-17 13:00"));
        assert_eq!(start_of(&d, TimeUnit::Minute), dt("2024-05-17 13:45"));
        assert_eq!(start_of(&d, TimeUnit::Second), dt("2024-05-17 13:45:30"));
    }

    #[test]
    fn leap_year_rules() {
        assert_eq!(days_in_month(&dt("2024-02-01")), 29); // div 4
        assert_eq!(days_in_month(&dt("1900-02-01")), 28); // div 100
        assert_eq!(days_in_month(&dt("2000-02-01")), 29); // div 400
        assert_eq!(days_in_month(&dt("2023-02-01")), 28);
        assert_eq!(days_in_month(&dt("2023-04-01")), 30);
        assert_eq!(days_in_month(&dt("2023-12-01")), 31);
    }
}
