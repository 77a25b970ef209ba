//! The chart itself: owns the normalized tasks, the dependency graph,
//! the current scale and the bar geometry, and draws everything through
//! a [`Renderer`].

use std::collections::HashMap;
use std::time::{Duration, Instant};

use chrono::NaiveDateTime;
use tracing::{debug, warn};

use crate::dates::{self, TimeUnit};
use crate::debounce::Debouncer;
use crate::error::Error;
use crate::geometry::arrow::{self, ArrowConfig};
use crate::geometry::bar::{self, RowLayout};
use crate::geometry::Rect;
use crate::interaction::{HitTarget, State};
use crate::model::task::{self, Task};
use crate::model::timeline::{self, Scale, Tick, ViewMode};
use crate::model::{DependencyGraph, RawTask};
use crate::options::Options;
use crate::render::{Gesture, Renderer, ShapeId, ShapeKind};

/// How long the view has to sit still before a scroll position counts
/// as settled.
const SCROLL_SETTLE: Duration = Duration::from_millis(100);

/// Something the host should react to. Events are returned from the
/// calls that produce them rather than pushed through callbacks.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartEvent {
    /// A drag or resize settled on new dates.
    DateChange {
        task_id: String,
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
    /// A progress-handle drag settled on a new percentage.
    ProgressChange { task_id: String, progress: u32 },
    /// The scale changed.
    ViewChange { mode: ViewMode },
    /// A press-and-release on a bar without movement.
    Click { task_id: String },
}

/// A rendered task bar: its rectangle plus the filled progress width.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Bar {
    pub task_id: String,
    pub rect: Rect,
    pub progress_width: f64,
}

/// An interactive Gantt chart over a renderer-agnostic surface.
pub struct Gantt {
    pub(crate) options: Options,
    pub(crate) tasks: Vec<Task>,
    pub(crate) graph: DependencyGraph,
    pub(crate) scale: Scale,
    pub(crate) gantt_start: NaiveDateTime,
    pub(crate) gantt_end: NaiveDateTime,
    pub(crate) bars: Vec<Bar>,
    pub(crate) state: State,
    /// Bar whose next bare click is swallowed because a drag just ended.
    pub(crate) cooldown: Option<String>,
    hit_map: HashMap<ShapeId, HitTarget>,
    scroll_debounce: Debouncer,
    pending_scroll: f64,
    scroll_position: f64,
}

impl Gantt {
    /// Build a chart from raw task input. Invalid rows are kept (and
    /// flagged) rather than dropped.
    pub fn new(raw: &[RawTask], options: Options) -> Self {
        let tasks = task::normalize(raw);
        let graph = DependencyGraph::build(&tasks);
        let scale = Scale::new(options.view_mode);
        let (gantt_start, gantt_end) = timeline::compute_range(&tasks, scale.mode);
        let mut chart = Self {
            options,
            tasks,
            graph,
            scale,
            gantt_start,
            gantt_end,
            bars: Vec::new(),
            state: State::Idle,
            cooldown: None,
            hit_map: HashMap::new(),
            scroll_debounce: Debouncer::new(SCROLL_SETTLE),
            pending_scroll: 0.0,
            scroll_position: 0.0,
        };
        chart.rebuild_bars();
        chart
    }

    /// Replace the task list wholesale, rebuilding the graph and range.
    /// Any in-flight gesture is dropped.
    pub fn refresh(&mut self, raw: &[RawTask]) {
        debug!(tasks = raw.len(), "refreshing task list");
        self.tasks = task::normalize(raw);
        self.graph = DependencyGraph::build(&self.tasks);
        let (start, end) = timeline::compute_range(&self.tasks, self.scale.mode);
        self.gantt_start = start;
        self.gantt_end = end;
        self.state = State::Idle;
        self.cooldown = None;
        // Shape handles from the previous render no longer mean anything.
        self.hit_map.clear();
        self.rebuild_bars();
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get_task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub(crate) fn task_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }

    pub fn view_mode(&self) -> ViewMode {
        self.scale.mode
    }

    pub fn date_range(&self) -> (NaiveDateTime, NaiveDateTime) {
        (self.gantt_start, self.gantt_end)
    }

    /// Switch scale, recomputing the range and every bar. Emits
    /// [`ChartEvent::ViewChange`] only when the mode actually changed.
    pub fn change_view_mode(&mut self, mode: ViewMode) -> Vec<ChartEvent> {
        if mode == self.scale.mode {
            return Vec::new();
        }
        debug!(?mode, "changing view mode");
        self.scale = Scale::new(mode);
        let (start, end) = timeline::compute_range(&self.tasks, mode);
        self.gantt_start = start;
        self.gantt_end = end;
        self.state = State::Idle;
        self.rebuild_bars();
        vec![ChartEvent::ViewChange { mode }]
    }

    /// Step to the next finer scale in `options.view_modes`, if any.
    pub fn zoom_in(&mut self) -> Vec<ChartEvent> {
        match self.zoom_target(-1) {
            Some(mode) => self.change_view_mode(mode),
            None => Vec::new(),
        }
    }

    /// Step to the next coarser scale in `options.view_modes`, if any.
    pub fn zoom_out(&mut self) -> Vec<ChartEvent> {
        match self.zoom_target(1) {
            Some(mode) => self.change_view_mode(mode),
            None => Vec::new(),
        }
    }

    fn zoom_target(&self, step: i64) -> Option<ViewMode> {
        let ladder = &self.options.view_modes;
        let pos = ladder.iter().position(|m| *m == self.scale.mode)? as i64;
        let next = pos + step;
        if next < 0 || next >= ladder.len() as i64 {
            return None;
        }
        Some(ladder[next as usize])
    }

    /// Axis ticks for the current range and scale.
    pub fn ticks(&self) -> Vec<Tick> {
        timeline::axis_ticks(
            self.gantt_start,
            self.gantt_end,
            &self.scale,
            &self.options.language,
            self.options.header_height,
        )
    }

    pub(crate) fn layout(&self) -> RowLayout {
        RowLayout {
            header_height: self.options.header_height,
            bar_height: self.options.bar_height,
            padding: self.options.padding,
        }
    }

    pub(crate) fn bar(&self, id: &str) -> Option<&Bar> {
        self.bars.iter().find(|b| b.task_id == id)
    }

    pub(crate) fn bar_mut(&mut self, id: &str) -> Option<&mut Bar> {
        self.bars.iter_mut().find(|b| b.task_id == id)
    }

    /// Current rectangle of a task's bar, if the task is visible.
    pub fn bar_rect(&self, id: &str) -> Option<Rect> {
        self.bar(id).map(|b| b.rect)
    }

    pub(crate) fn hit_target(&self, shape: ShapeId) -> Option<HitTarget> {
        self.hit_map.get(&shape).cloned()
    }

    /// Recompute every visible bar from dates, then overlay envelope
    /// bars (projects and tags) as the tight hull of their descendants.
    pub(crate) fn rebuild_bars(&mut self) {
        let layout = self.layout();
        let mut bars: Vec<Bar> = self
            .tasks
            .iter()
            .filter(|t| t.visible)
            .map(|t| Bar {
                task_id: t.id.clone(),
                rect: bar::to_geometry(t, &self.scale, &self.gantt_start, &layout),
                progress_width: 0.0,
            })
            .collect();
        bars.sort_by_key(|b| {
            self.get_task(&b.task_id)
                .map(|t| t.index)
                .unwrap_or(usize::MAX)
        });
        for b in &mut bars {
            if let Some(t) = self.get_task(&b.task_id) {
                b.progress_width = bar::progress_width(&b.rect, t.progress);
            }
        }
        self.bars = bars;

        // Envelope pass needs the leaf rectangles in place first.
        let envelopes: Vec<String> = self
            .tasks
            .iter()
            .filter(|t| t.visible && t.is_envelope())
            .map(|t| t.id.clone())
            .collect();
        for id in envelopes {
            let members: Vec<Rect> = self
                .graph
                .descendants(&id)
                .iter()
                .filter_map(|d| self.bar_rect(d))
                .collect();
            if let Some((x, width)) = bar::envelope(&members) {
                if let Some(b) = self.bar_mut(&id) {
                    b.rect.x = x;
                    b.rect.width = width;
                    b.progress_width = b.progress_width.min(width);
                }
            }
        }
    }

    /// Toggle a task's collapsed flag and re-derive visibility for its
    /// transitive dependents, then re-pack rows.
    pub fn toggle_collapse(&mut self, id: &str) {
        let collapsing = match self.task_mut(id) {
            Some(task) => {
                task.collapsed = !task.collapsed;
                task.collapsed
            }
            None => return,
        };

        let mut updates: Vec<(String, bool)> = Vec::new();
        for desc in self.graph.descendants(id) {
            let visible = if collapsing {
                false
            } else {
                // Re-expanding only reveals rows whose nearest branch
                // point is itself open.
                match self.graph.nearest_collapsible_ancestor(&desc) {
                    Some(anc) => self.get_task(anc).map(|t| !t.collapsed).unwrap_or(true),
                    None => true,
                }
            };
            updates.push((desc, visible));
        }
        for (desc, visible) in updates {
            if let Some(task) = self.task_mut(&desc) {
                task.visible = visible;
            }
        }
        task::assign_indices(&mut self.tasks);
        self.rebuild_bars();
    }

    /// Record a horizontal scroll offset; the position only commits once
    /// scrolling has settled (see [`Self::poll_scroll`]).
    pub fn track_scroll(&mut self, x: f64, now: Instant) {
        self.pending_scroll = x;
        self.scroll_debounce.trigger(now);
    }

    /// Returns the settled scroll position exactly once per burst.
    pub fn poll_scroll(&mut self, now: Instant) -> Option<f64> {
        if self.scroll_debounce.poll(now) {
            self.scroll_position = self.pending_scroll;
            Some(self.scroll_position)
        } else {
            None
        }
    }

    pub fn scroll_position(&self) -> f64 {
        self.scroll_position
    }

    /// Pixel x of a date at the current scale, relative to the chart
    /// origin. Useful for hosts scrolling to "today".
    pub fn x_of(&self, date: &NaiveDateTime) -> f64 {
        match self.scale.mode {
            ViewMode::Month => {
                let days = dates::diff(date, &self.gantt_start, TimeUnit::Day) as f64;
                days / 30.0 * self.scale.column_width
            }
            _ => {
                let hours = dates::diff(date, &self.gantt_start, TimeUnit::Hour) as f64;
                hours / self.scale.step as f64 * self.scale.column_width
            }
        }
    }

    fn chart_width(&self, ticks: &[Tick]) -> f64 {
        ticks.len() as f64 * self.scale.column_width
    }

    fn chart_height(&self) -> f64 {
        let rows = self.bars.len() as f64;
        self.options.header_height
            + self.options.padding
            + rows * (self.options.bar_height + self.options.padding)
    }

    /// Draw the whole chart. The only failure is the surface rejecting
    /// `begin`; every other renderer call is infallible.
    pub fn render<R: Renderer>(&mut self, r: &mut R) -> Result<(), Error> {
        let ticks = self.ticks();
        let width = self.chart_width(&ticks);
        let height = self.chart_height();
        r.begin(width, height)?;
        self.hit_map.clear();

        let grid_layer = r.create_shape(ShapeKind::Group, None, &[("class", "grid".into())]);
        let date_layer = r.create_shape(ShapeKind::Group, None, &[("class", "date".into())]);
        let arrow_layer = r.create_shape(ShapeKind::Group, None, &[("class", "arrow".into())]);
        let bar_layer = r.create_shape(ShapeKind::Group, None, &[("class", "bar".into())]);

        self.draw_grid(r, grid_layer, &ticks, width, height);
        self.draw_dates(r, date_layer, &ticks);
        self.draw_arrows(r, arrow_layer);
        self.draw_bars(r, bar_layer);
        Ok(())
    }

    fn draw_grid<R: Renderer>(
        &mut self,
        r: &mut R,
        layer: ShapeId,
        ticks: &[Tick],
        width: f64,
        height: f64,
    ) {
        let background = r.create_shape(
            ShapeKind::Rect,
            Some(layer),
            &[
                ("x", 0.0.into()),
                ("y", 0.0.into()),
                ("width", width.into()),
                ("height", height.into()),
                ("class", "grid-background".into()),
            ],
        );
        // Moves and releases are tracked chart-wide so a drag survives
        // the pointer leaving its bar.
        r.listen(background, Gesture::PointerDown);
        r.listen(background, Gesture::PointerMove);
        r.listen(background, Gesture::PointerUp);
        self.hit_map.insert(background, HitTarget::Canvas);

        let layout = self.layout();
        let row_height = self.options.bar_height + self.options.padding;
        for (row, _) in self.bars.iter().enumerate() {
            r.create_shape(
                ShapeKind::Rect,
                Some(layer),
                &[
                    ("x", 0.0.into()),
                    ("y", (layout.row_y(row) - self.options.padding / 2.0).into()),
                    ("width", width.into()),
                    ("height", row_height.into()),
                    ("class", "grid-row".into()),
                ],
            );
        }

        r.create_shape(
            ShapeKind::Rect,
            Some(layer),
            &[
                ("x", 0.0.into()),
                ("y", 0.0.into()),
                ("width", width.into()),
                ("height", self.options.header_height.into()),
                ("class", "grid-header".into()),
            ],
        );

        for tick in ticks {
            r.create_shape(
                ShapeKind::Line,
                Some(layer),
                &[
                    ("x1", tick.x.into()),
                    ("y1", self.options.header_height.into()),
                    ("x2", tick.x.into()),
                    ("y2", height.into()),
                    ("class", "tick".into()),
                ],
            );
        }

        if self.scale.mode == ViewMode::Day {
            let today = dates::today();
            let x = self.x_of(&today);
            if x >= 0.0 && x < width {
                r.create_shape(
                    ShapeKind::Rect,
                    Some(layer),
                    &[
                        ("x", x.into()),
                        ("y", self.options.header_height.into()),
                        ("width", self.scale.column_width.into()),
                        ("height", (height - self.options.header_height).into()),
                        ("class", "today-highlight".into()),
                    ],
                );
            }
        }
    }

    fn draw_dates<R: Renderer>(&self, r: &mut R, layer: ShapeId, ticks: &[Tick]) {
        for tick in ticks {
            r.create_shape(
                ShapeKind::Text,
                Some(layer),
                &[
                    ("x", tick.lower_x.into()),
                    ("y", tick.lower_y.into()),
                    ("text", tick.lower_text.as_str().into()),
                    ("class", "lower-text".into()),
                ],
            );
            if !tick.upper_text.is_empty() {
                r.create_shape(
                    ShapeKind::Text,
                    Some(layer),
                    &[
                        ("x", tick.upper_x.into()),
                        ("y", tick.upper_y.into()),
                        ("text", tick.upper_text.as_str().into()),
                        ("class", "upper-text".into()),
                    ],
                );
            }
        }
    }

    fn draw_arrows<R: Renderer>(&self, r: &mut R, layer: ShapeId) {
        let cfg = ArrowConfig {
            padding: self.options.padding,
            curve: self.options.arrow_curve,
        };
        for task in self.tasks.iter().filter(|t| t.visible) {
            for dep in &task.dependencies {
                let (from, from_index) = match (self.bar_rect(dep), self.get_task(dep)) {
                    (Some(rect), Some(t)) => (rect, t.index),
                    _ => {
                        warn!(task = %task.id, dependency = %dep, "skipping arrow to unknown or hidden dependency");
                        continue;
                    }
                };
                let to = match self.bar_rect(&task.id) {
                    Some(rect) => rect,
                    None => continue,
                };
                let path = arrow::route(&from, from_index, &to, task.index, &cfg);
                r.create_shape(
                    ShapeKind::Path,
                    Some(layer),
                    &[("d", path.into()), ("class", "arrow".into())],
                );
            }
        }
    }

    fn draw_bars<R: Renderer>(&mut self, r: &mut R, layer: ShapeId) {
        let bars = self.bars.clone();
        for bar in &bars {
            let task = match self.get_task(&bar.task_id) {
                Some(t) => t.clone(),
                None => continue,
            };
            let class = if task.invalid {
                "bar-wrapper bar-invalid"
            } else {
                "bar-wrapper"
            };
            let group = r.create_shape(
                ShapeKind::Group,
                Some(layer),
                &[("class", class.into()), ("data-id", task.id.as_str().into())],
            );
            r.listen(group, Gesture::PointerDown);
            self.hit_map.insert(group, HitTarget::Bar(task.id.clone()));

            r.create_shape(
                ShapeKind::Rect,
                Some(group),
                &[
                    ("x", bar.rect.x.into()),
                    ("y", bar.rect.y.into()),
                    ("width", bar.rect.width.into()),
                    ("height", bar.rect.height.into()),
                    ("rx", self.options.bar_corner_radius.into()),
                    ("ry", self.options.bar_corner_radius.into()),
                    ("class", "bar".into()),
                ],
            );
            if !task.is_envelope() {
                r.create_shape(
                    ShapeKind::Rect,
                    Some(group),
                    &[
                        ("x", bar.rect.x.into()),
                        ("y", bar.rect.y.into()),
                        ("width", bar.progress_width.into()),
                        ("height", bar.rect.height.into()),
                        ("rx", self.options.bar_corner_radius.into()),
                        ("ry", self.options.bar_corner_radius.into()),
                        ("class", "bar-progress".into()),
                    ],
                );
            }

            let label = r.create_shape(
                ShapeKind::Text,
                Some(group),
                &[
                    ("x", bar.rect.center_x().into()),
                    ("y", bar.rect.center_y().into()),
                    ("text", task.name.as_str().into()),
                    ("class", "bar-label".into()),
                ],
            );
            // Labels wider than their bar move outside it, to the right.
            if let Some(bbox) = r.bounding_box(label) {
                if bbox.width > bar.rect.width {
                    r.set_attribute(label, "x", (bar.rect.right() + 5.0).into());
                    r.set_attribute(label, "class", "bar-label big".into());
                }
            }

            if !task.invalid {
                self.draw_handles(r, group, bar, &task);
            }
            if !self.graph.dependents_of(&task.id).is_empty() {
                let glyph = if task.collapsed { "\u{25b8}" } else { "\u{25be}" };
                let caret = r.create_shape(
                    ShapeKind::Text,
                    Some(group),
                    &[
                        ("x", (bar.rect.x - 10.0).into()),
                        ("y", bar.rect.center_y().into()),
                        ("text", glyph.into()),
                        ("class", "caret".into()),
                    ],
                );
                r.listen(caret, Gesture::PointerDown);
                self.hit_map.insert(caret, HitTarget::Caret(task.id.clone()));
            }
        }
    }

    fn draw_handles<R: Renderer>(&mut self, r: &mut R, group: ShapeId, bar: &Bar, task: &Task) {
        let handle_width = 8.0;
        let left = r.create_shape(
            ShapeKind::Rect,
            Some(group),
            &[
                ("x", (bar.rect.x + 1.0).into()),
                ("y", (bar.rect.y + 1.0).into()),
                ("width", handle_width.into()),
                ("height", (bar.rect.height - 2.0).into()),
                ("class", "handle left".into()),
            ],
        );
        r.listen(left, Gesture::PointerDown);
        self.hit_map
            .insert(left, HitTarget::HandleLeft(task.id.clone()));

        let right = r.create_shape(
            ShapeKind::Rect,
            Some(group),
            &[
                ("x", (bar.rect.right() - handle_width - 1.0).into()),
                ("y", (bar.rect.y + 1.0).into()),
                ("width", handle_width.into()),
                ("height", (bar.rect.height - 2.0).into()),
                ("class", "handle right".into()),
            ],
        );
        r.listen(right, Gesture::PointerDown);
        self.hit_map
            .insert(right, HitTarget::HandleRight(task.id.clone()));

        if !task.is_envelope() {
            let tip_x = bar.rect.x + bar.progress_width;
            let tip_y = bar.rect.bottom();
            let points = format!(
                "{},{} {},{} {},{}",
                tip_x - 5.0,
                tip_y,
                tip_x + 5.0,
                tip_y,
                tip_x,
                tip_y + 8.0
            );
            let progress = r.create_shape(
                ShapeKind::Polygon,
                Some(group),
                &[("points", points.into()), ("class", "handle progress".into())],
            );
            r.listen(progress, Gesture::PointerDown);
            self.hit_map
                .insert(progress, HitTarget::HandleProgress(task.id.clone()));
        }
    }
}
