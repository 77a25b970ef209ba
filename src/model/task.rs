use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::dates::{self, TimeUnit};

/// Behavioral variant of a task bar.
///
/// Project and tag bars are envelopes: their geometry is derived as the
/// bounding run of their descendants instead of their own dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    #[default]
    Task,
    Project,
    Tag,
}

/// Dependency ids as hosts tend to supply them: a list, or one
/// comma-separated string.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Dependencies {
    List(Vec<String>),
    Text(String),
}

/// A raw task record as supplied by the host, before normalization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawTask {
    pub name: String,
    pub start: Option<String>,
    pub end: Option<String>,
    pub progress: f64,
    pub dependencies: Option<Dependencies>,
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub task_type: Option<TaskType>,
    pub visible: Option<bool>,
    pub collapsed: Option<bool>,
}

/// A normalized task. `start`/`end` are always present (end exclusive at
/// day granularity) and `end > start` holds.
#[derive(Debug, Clone, Serialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Progress, 0–100.
    pub progress: f64,
    pub dependencies: Vec<String>,
    pub task_type: TaskType,
    pub visible: bool,
    /// Only meaningful on tasks that root a collapsible subtree.
    pub collapsed: bool,
    /// True when the original start or end was missing or malformed.
    pub invalid: bool,
    /// Row position within the visible subset.
    pub index: usize,
}

impl Task {
    /// Whether this bar's geometry is derived from its descendants.
    pub fn is_envelope(&self) -> bool {
        matches!(self.task_type, TaskType::Project | TaskType::Tag)
    }
}

/// Convert raw records into canonical tasks and assign row indices over
/// the visible subset. Malformed dates never fail: they fall back to the
/// default-today rule with `invalid` set.
pub fn normalize(raw: &[RawTask]) -> Vec<Task> {
    let mut tasks: Vec<Task> = raw.iter().map(normalize_one).collect();
    assign_indices(&mut tasks);
    tasks
}

/// Reassign zero-based row indices to visible tasks in list order.
/// Hidden tasks keep their previous index.
pub fn assign_indices(tasks: &mut [Task]) {
    let mut row = 0;
    for task in tasks.iter_mut() {
        if task.visible {
            task.index = row;
            row += 1;
        }
    }
}

fn normalize_one(raw: &RawTask) -> Task {
    let parsed_start = raw.start.as_deref().and_then(dates::parse);
    let parsed_end = raw.end.as_deref().and_then(dates::parse);

    // A supplied but unparseable date counts as missing and flags the task.
    let bad_start = raw.start.is_some() && parsed_start.is_none();
    let bad_end = raw.end.is_some() && parsed_end.is_none();
    let invalid = raw.start.is_none() || raw.end.is_none() || bad_start || bad_end;
    if bad_start || bad_end {
        warn!(task = %raw.name, "malformed task dates, falling back to defaults");
    }

    let (start, mut end) = match (parsed_start, parsed_end) {
        (Some(s), Some(e)) => (s, e),
        (Some(s), None) => (s, dates::add(&s, 2, TimeUnit::Day)),
        (None, Some(e)) => (dates::add(&e, -2, TimeUnit::Day), e),
        (None, None) => {
            let today = dates::today();
            (today, dates::add(&today, 2, TimeUnit::Day))
        }
    };

    // A span over ten years means the end is junk; re-derive it.
    if dates::diff(&end, &start, TimeUnit::Year) > 10 {
        end = dates::add(&start, 2, TimeUnit::Day);
    }
    if end <= start {
        end = dates::add(&start, 2, TimeUnit::Day);
    }

    Task {
        id: raw
            .id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| generate_id(&raw.name)),
        name: raw.name.clone(),
        start,
        end,
        progress: raw.progress.clamp(0.0, 100.0),
        dependencies: clean_dependencies(raw.dependencies.as_ref()),
        task_type: raw.task_type.unwrap_or_default(),
        visible: raw.visible.unwrap_or(true),
        collapsed: raw.collapsed.unwrap_or(false),
        invalid,
        index: 0,
    }
}

/// Trim, drop empties, dedupe keeping the first occurrence.
fn clean_dependencies(deps: Option<&Dependencies>) -> Vec<String> {
    let items: Vec<String> = match deps {
        None => return Vec::new(),
        Some(Dependencies::List(list)) => list.clone(),
        Some(Dependencies::Text(text)) => text.split(',').map(str::to_string).collect(),
    };
    let mut out: Vec<String> = Vec::with_capacity(items.len());
    for dep in items {
        let dep = dep.trim();
        if !dep.is_empty() && !out.iter().any(|d| d == dep) {
            out.push(dep.to_string());
        }
    }
    out
}

fn generate_id(name: &str) -> String {
    format!("{}_{}", name, Uuid::new_v4().simple())
}

/// Rebuild a raw record from a normalized task, datetimes spelled out in
/// full so that re-normalizing reproduces the same instants.
pub fn to_raw(task: &Task) -> RawTask {
    let fmt = |d: &NaiveDateTime| {
        if d.num_seconds_from_midnight() == 0 {
            dates::format(d, "YYYY-MM-DD", "en")
        } else {
            dates::format(d, "YYYY-MM-DD HH:mm:ss", "en")
        }
    };
    RawTask {
        name: task.name.clone(),
        start: Some(fmt(&task.start)),
        end: Some(fmt(&task.end)),
        progress: task.progress,
        dependencies: Some(Dependencies::List(task.dependencies.clone())),
        id: Some(task.id.clone()),
        task_type: Some(task.task_type),
        visible: Some(task.visible),
        collapsed: Some(task.collapsed),
    }
}
