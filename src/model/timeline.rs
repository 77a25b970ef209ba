use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::dates::{self, TimeUnit};
use super::task::Task;

/// One of the six fixed time resolutions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViewMode {
    #[serde(rename = "Quarter Day")]
    QuarterDay,
    #[serde(rename = "Half Day")]
    HalfDay,
    Day,
    Week,
    Month,
    Year,
}

impl ViewMode {
    /// Hours represented by one grid column. Explicit table, not a formula.
    pub fn step_hours(self) -> i64 {
        match self {
            ViewMode::QuarterDay => 6,
            ViewMode::HalfDay => 12,
            ViewMode::Day => 24,
            ViewMode::Week => 168,
            ViewMode::Month => 720,
            ViewMode::Year => 8760,
        }
    }

    /// Pixels per grid column. Explicit table, not a formula.
    pub fn column_width(self) -> f64 {
        match self {
            ViewMode::QuarterDay | ViewMode::HalfDay | ViewMode::Day => 38.0,
            ViewMode::Week => 140.0,
            ViewMode::Month | ViewMode::Year => 120.0,
        }
    }
}

/// The resolved scale used by geometry and axis computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scale {
    pub mode: ViewMode,
    pub step: i64,
    pub column_width: f64,
}

impl Scale {
    pub fn new(mode: ViewMode) -> Self {
        Self {
            mode,
            step: mode.step_hours(),
            column_width: mode.column_width(),
        }
    }
}

/// Visible date range: min/max across all tasks, floored to day
/// boundaries, then padded per mode (±2 months for Day/Week/sub-day,
/// ±8 months for Month, ±6 years for Year with the start floored to the
/// calendar year).
pub fn compute_range(tasks: &[Task], mode: ViewMode) -> (NaiveDateTime, NaiveDateTime) {
    let mut start = tasks.iter().map(|t| t.start).min();
    let mut end = tasks.iter().map(|t| t.end).max();
    if start.is_none() || end.is_none() {
        let today = dates::today();
        start = Some(today);
        end = Some(dates::add(&today, 2, TimeUnit::Day));
    }
    let start = dates::start_of(&start.unwrap_or_else(dates::today), TimeUnit::Day);
    let end = dates::start_of(&end.unwrap_or_else(dates::today), TimeUnit::Day);

    match mode {
        ViewMode::Year => (
            dates::start_of(&dates::add(&start, -6, TimeUnit::Year), TimeUnit::Year),
            dates::add(&end, 6, TimeUnit::Year),
        ),
        ViewMode::Month => (
            dates::add(&start, -8, TimeUnit::Month),
            dates::add(&end, 8, TimeUnit::Month),
        ),
        _ => (
            dates::add(&start, -2, TimeUnit::Month),
            dates::add(&end, 2, TimeUnit::Month),
        ),
    }
}

/// One axis tick: an instant, its column x, and upper/lower header labels
/// with their draw positions. Labels already de-duplicated against the
/// previous tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub date: NaiveDateTime,
    pub x: f64,
    pub lower_text: String,
    pub lower_x: f64,
    pub lower_y: f64,
    pub upper_text: String,
    pub upper_x: f64,
    pub upper_y: f64,
}

/// Ordered tick instants from `start`, one scale unit apart, up to and
/// including the first instant at or past `end`.
pub fn axis_ticks(
    start: NaiveDateTime,
    end: NaiveDateTime,
    scale: &Scale,
    lang: &str,
    header_height: f64,
) -> Vec<Tick> {
    let mut instants = vec![start];
    let mut cur = start;
    while cur < end {
        cur = match scale.mode {
            ViewMode::Year => dates::add(&cur, 1, TimeUnit::Year),
            ViewMode::Month => dates::add(&cur, 1, TimeUnit::Month),
            _ => dates::add(&cur, scale.step, TimeUnit::Hour),
        };
        instants.push(cur);
    }

    let mut ticks = Vec::with_capacity(instants.len());
    for (i, date) in instants.iter().enumerate() {
        let prev = if i == 0 { None } else { Some(&instants[i - 1]) };
        ticks.push(tick_info(date, prev, i, scale, lang, header_height));
    }
    ticks
}

fn tick_info(
    date: &NaiveDateTime,
    prev: Option<&NaiveDateTime>,
    ordinal: usize,
    scale: &Scale,
    lang: &str,
    header_height: f64,
) -> Tick {
    // The first tick always shows its full labels.
    let day_changed = prev.map(|p| p.day() != date.day()).unwrap_or(true);
    let month_changed = prev.map(|p| p.month() != date.month()).unwrap_or(true);
    let year_changed = prev.map(|p| p.year() != date.year()).unwrap_or(true);

    let fmt = |pattern: &str| dates::format(date, pattern, lang);
    let when = |cond: bool, pattern: &str| if cond { fmt(pattern) } else { String::new() };

    let (lower_text, upper_text) = match scale.mode {
        ViewMode::QuarterDay => (fmt("HH"), when(day_changed, "D MMM")),
        ViewMode::HalfDay => (
            fmt("HH"),
            if !day_changed {
                String::new()
            } else if month_changed {
                fmt("D MMM")
            } else {
                fmt("D")
            },
        ),
        ViewMode::Day => (when(day_changed, "D"), when(month_changed, "MMMM")),
        ViewMode::Week => (
            if month_changed { fmt("D MMM") } else { fmt("D") },
            if !month_changed {
                String::new()
            } else if year_changed {
                fmt("MMMM YYYY")
            } else {
                fmt("MMMM")
            },
        ),
        ViewMode::Month => (fmt("MMMM"), when(year_changed, "YYYY")),
        ViewMode::Year => (fmt("YYYY"), when(year_changed, "YYYY")),
    };

    let col = scale.column_width;
    let x = ordinal as f64 * col;
    // Fixed per-mode label offsets: lower labels sit under their column,
    // upper labels are centered over the span they describe.
    let (lower_dx, upper_dx) = match scale.mode {
        ViewMode::QuarterDay => (col * 4.0 / 2.0, 0.0),
        ViewMode::HalfDay => (col * 2.0 / 2.0, 0.0),
        ViewMode::Day => (col / 2.0, col * 30.0 / 2.0),
        ViewMode::Week => (0.0, col * 4.0 / 2.0),
        ViewMode::Month => (col / 2.0, col * 12.0 / 2.0),
        ViewMode::Year => (col / 2.0, col * 30.0 / 2.0),
    };

    Tick {
        date: *date,
        x,
        lower_text,
        lower_x: x + lower_dx,
        lower_y: header_height,
        upper_text,
        upper_x: x + upper_dx,
        upper_y: header_height - 25.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::task::{normalize, RawTask};

    fn dt(s: &str) -> NaiveDateTime {
        dates::parse(s).unwrap()
    }

    fn tasks(spans: &[(&str, &str)]) -> Vec<Task> {
        let raw: Vec<RawTask> = spans
            .iter()
            .enumerate()
            .map(|(i, (s, e))| RawTask {
                name: format!("t{}", i),
                id: Some(format!("t{}", i)),
                start: Some(s.to_string()),
                end: Some(e.to_string()),
                ..Default::default()
            })
            .collect();
        normalize(&raw)
    }

    #[test]
    fn scale_table_matches_mode() {
        let day = Scale::new(ViewMode::Day);
        assert_eq!((day.step, day.column_width), (24, 38.0));
        let week = Scale::new(ViewMode::Week);
        assert_eq!((week.step, week.column_width), (168, 140.0));
        let month = Scale::new(ViewMode::Month);
        assert_eq!((month.step, month.column_width), (720, 120.0));
        assert_eq!(Scale::new(ViewMode::QuarterDay).step, 6);
        assert_eq!(Scale::new(ViewMode::HalfDay).step, 12);
        assert_eq!(Scale::new(ViewMode::Year).step, 8760);
    }

    #[test]
    fn day_range_pads_two_months() {
        let ts = tasks(&[("2024-05-10", "2024-05-20"), ("2024-05-01", "2024-06-01")]);
        let (start, end) = compute_range(&ts, ViewMode::Day);
        assert_eq!(start, dt("2024-03-01"));
        assert_eq!(end, dt("2024-08-01"));
    }

    #[test]
    fn month_range_pads_eight_months() {
        let ts = tasks(&[("2024-05-10", "2024-05-20")]);
        let (start, end) = compute_range(&ts, ViewMode::Month);
        assert_eq!(start, dt("2023-09-10"));
        assert_eq!(end, dt("2025-01-20"));
    }

    #[test]
    fn year_range_pads_six_years_and_floors_start() {
        let ts = tasks(&[("2024-05-10", "2024-05-20")]);
        let (start, end) = compute_range(&ts, ViewMode::Year);
        assert_eq!(start, dt("2018-01-01"));
        assert_eq!(end, dt("2030-05-20"));
    }

    #[test]
    fn ticks_step_one_unit_and_cover_the_range() {
        let scale = Scale::new(ViewMode::Day);
        let ticks = axis_ticks(dt("2024-01-01"), dt("2024-01-05"), &scale, "en", 50.0);
        assert_eq!(ticks.len(), 5);
        assert_eq!(ticks[1].date, dt("2024-01-02"));
        assert_eq!(ticks[1].x, 38.0);
        assert_eq!(ticks[4].date, dt("2024-01-05"));
    }

    #[test]
    fn day_ticks_show_month_only_on_change() {
        let scale = Scale::new(ViewMode::Day);
        let ticks = axis_ticks(dt("2024-01-30"), dt("2024-02-02"), &scale, "en", 50.0);
        assert_eq!(ticks[0].upper_text, "January");
        assert_eq!(ticks[1].upper_text, "");
        assert_eq!(ticks[2].upper_text, "February");
        assert_eq!(ticks[2].lower_text, "1");
        assert_eq!(ticks[3].upper_text, "");
    }

    #[test]
    fn month_ticks_show_year_only_at_boundaries() {
        let scale = Scale::new(ViewMode::Month);
        let ticks = axis_ticks(dt("2023-11-01"), dt("2024-02-01"), &scale, "en", 50.0);
        let uppers: Vec<&str> = ticks.iter().map(|t| t.upper_text.as_str()).collect();
        assert_eq!(uppers, vec!["2023", "", "2024", ""]);
        assert_eq!(ticks[0].lower_text, "November");
        assert_eq!(ticks[2].lower_text, "January");
    }

    #[test]
    fn quarter_day_ticks_label_hours_with_date_above() {
        let scale = Scale::new(ViewMode::QuarterDay);
        let ticks = axis_ticks(dt("2024-01-01"), dt("2024-01-02"), &scale, "en", 50.0);
        let lowers: Vec<&str> = ticks.iter().map(|t| t.lower_text.as_str()).collect();
        assert_eq!(lowers, vec!["00", "06", "12", "18", "00"]);
        assert_eq!(ticks[0].upper_text, "1 Jan");
        assert_eq!(ticks[1].upper_text, "");
        assert_eq!(ticks[4].upper_text, "2 Jan");
    }

    #[test]
    fn empty_task_list_ranges_around_today() {
        let (start, end) = compute_range(&[], ViewMode::Day);
        assert!(start < end);
        let today = dates::today();
        assert_eq!(start, dates::add(&today, -2, TimeUnit::Month));
    }

    #[test]
    fn view_mode_names_round_trip_through_serde() {
        let mode: ViewMode = serde_json::from_str("\"Quarter Day\"").unwrap();
        assert_eq!(mode, ViewMode::QuarterDay);
        assert_eq!(serde_json::to_string(&ViewMode::Week).unwrap(), "\"Week\"");
    }
}
