//! Bar geometry: the mapping between task dates and pixel rectangles.
//!
//! Geometry is derived, never authoritative: it is a pure function of
//! (task dates, row index, current scale) and is recomputed on every
//! render and interaction frame.

use chrono::NaiveDateTime;

use crate::dates::{self, TimeUnit};
use crate::model::task::Task;
use crate::model::timeline::{Scale, ViewMode};
use super::Rect;

/// Vertical layout constants shared by bars, arrows and the header.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowLayout {
    pub header_height: f64,
    pub bar_height: f64,
    pub padding: f64,
}

impl RowLayout {
    /// Top edge of the bar in the given row.
    pub fn row_y(&self, index: usize) -> f64 {
        self.header_height + self.padding + index as f64 * (self.bar_height + self.padding)
    }
}

/// Map a task's date span and row index into its bar rectangle.
///
/// Month view uses a day-fraction approximation (`column_width * days/30`)
/// instead of the step-based formula; everything else counts whole steps
/// of `step` hours.
pub fn to_geometry(
    task: &Task,
    scale: &Scale,
    gantt_start: &NaiveDateTime,
    layout: &RowLayout,
) -> Rect {
    let (x, width) = match scale.mode {
        ViewMode::Month => {
            let offset = dates::diff(&task.start, gantt_start, TimeUnit::Day) as f64;
            let duration = dates::diff(&task.end, &task.start, TimeUnit::Day) as f64;
            (
                offset * scale.column_width / 30.0,
                duration * scale.column_width / 30.0,
            )
        }
        _ => {
            let offset = dates::diff(&task.start, gantt_start, TimeUnit::Hour) as f64;
            let duration = dates::diff(&task.end, &task.start, TimeUnit::Hour) as f64;
            (
                offset / scale.step as f64 * scale.column_width,
                duration / scale.step as f64 * scale.column_width,
            )
        }
    };
    Rect::new(x, layout.row_y(task.index), width, layout.bar_height)
}

/// Exact inverse of `to_geometry`: pixels back to instants, used to commit
/// a finished drag.
pub fn from_geometry(
    x: f64,
    width: f64,
    scale: &Scale,
    gantt_start: &NaiveDateTime,
) -> (NaiveDateTime, NaiveDateTime) {
    let (start_hours, span_hours) = match scale.mode {
        ViewMode::Month => (
            x / scale.column_width * 30.0 * 24.0,
            width / scale.column_width * 30.0 * 24.0,
        ),
        _ => (
            x / scale.column_width * scale.step as f64,
            width / scale.column_width * scale.step as f64,
        ),
    };
    let start = add_hours(gantt_start, start_hours);
    let end = add_hours(&start, span_hours);
    (start, end)
}

fn add_hours(date: &NaiveDateTime, hours: f64) -> NaiveDateTime {
    dates::add(date, (hours * 60.0).round() as i64, TimeUnit::Minute)
}

/// Quantize a pixel delta to the scale's grid: whole columns for
/// Day/Quarter/Half-Day/Year, sevenths for Week, thirtieths for Month.
/// Rounds to the nearest unit; an exact half-unit stays put.
pub fn snap(dx: f64, scale: &Scale) -> f64 {
    let unit = match scale.mode {
        ViewMode::Week => scale.column_width / 7.0,
        ViewMode::Month => scale.column_width / 30.0,
        _ => scale.column_width,
    };
    let units = dx / unit;
    let snapped = if units.fract().abs() > 0.5 {
        units.trunc() + units.signum()
    } else {
        units.trunc()
    };
    snapped * unit
}

/// Width of the progress fill for a bar.
pub fn progress_width(bar: &Rect, progress: f64) -> f64 {
    bar.width * progress.clamp(0.0, 100.0) / 100.0
}

/// Tight horizontal envelope (x, width) over a set of bar rectangles.
/// `None` when the set is empty.
pub fn envelope(rects: &[Rect]) -> Option<(f64, f64)> {
    let first = rects.first()?;
    let mut min_x = first.x;
    let mut max_right = first.right();
    for rect in &rects[1..] {
        min_x = min_x.min(rect.x);
        max_right = max_right.max(rect.right());
    }
    Some((min_x, max_right - min_x))
}
