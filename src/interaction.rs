//! Pointer-driven interaction state machine.
//!
//! One gesture is tracked at a time; a press while another gesture is in
//! flight is ignored. Releasing the pointer is the only way back to idle.
//! Geometry moves in snapped grid quanta during the gesture and is
//! committed back to dates on release.

use std::collections::HashMap;

use tracing::debug;

use crate::chart::{ChartEvent, Gantt};
use crate::geometry::bar::{self, from_geometry, snap};
use crate::geometry::Rect;
use crate::render::ShapeId;

/// Movement below this cancels nothing; beyond it, a press on a collapse
/// caret stops being a click.
const CLICK_SLOP: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Down,
    Move,
    Up,
}

/// A pointer gesture forwarded by the host. `target` is the shape the
/// press landed on; move/release events do not need one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    pub x: f64,
    pub y: f64,
    pub target: Option<ShapeId>,
}

/// What a shape stands for when the pointer lands on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HitTarget {
    Canvas,
    Bar(String),
    HandleLeft(String),
    HandleRight(String),
    HandleProgress(String),
    Caret(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum DragKind {
    Move,
    ResizeLeft,
    ResizeRight,
    Progress,
}

#[derive(Debug, Clone)]
pub(crate) struct DragState {
    kind: DragKind,
    primary: String,
    /// Bars moved by this gesture, primary first.
    set: Vec<String>,
    origin_x: f64,
    origin_y: f64,
    snapshots: HashMap<String, Rect>,
    progress_origin: f64,
    sorting: bool,
}

#[derive(Debug, Clone, Default)]
pub(crate) enum State {
    #[default]
    Idle,
    Drag(DragState),
    PendingCollapse {
        id: String,
        origin_x: f64,
        origin_y: f64,
    },
}

impl Gantt {
    /// Feed one pointer event through the state machine. Returns the
    /// chart events it produced (usually none until release).
    pub fn handle_pointer(&mut self, ev: PointerEvent) -> Vec<ChartEvent> {
        match ev.phase {
            PointerPhase::Down => self.pointer_down(ev),
            PointerPhase::Move => self.pointer_move(ev),
            PointerPhase::Up => self.pointer_up(),
        }
    }

    fn pointer_down(&mut self, ev: PointerEvent) -> Vec<ChartEvent> {
        if !matches!(self.state, State::Idle) {
            return Vec::new();
        }
        let target = match ev.target.and_then(|shape| self.hit_target(shape)) {
            Some(t) => t,
            None => return Vec::new(),
        };

        match target {
            HitTarget::Canvas => {}
            HitTarget::Bar(id) => {
                self.start_drag(DragKind::Move, id, ev.x, ev.y);
            }
            HitTarget::HandleLeft(id) => {
                if self.handles_enabled(&id) {
                    self.start_drag(DragKind::ResizeLeft, id, ev.x, ev.y);
                }
            }
            HitTarget::HandleRight(id) => {
                if self.handles_enabled(&id) {
                    self.start_drag(DragKind::ResizeRight, id, ev.x, ev.y);
                }
            }
            HitTarget::HandleProgress(id) => {
                if self.handles_enabled(&id) {
                    self.start_drag(DragKind::Progress, id, ev.x, ev.y);
                }
            }
            HitTarget::Caret(id) => {
                self.state = State::PendingCollapse {
                    id,
                    origin_x: ev.x,
                    origin_y: ev.y,
                };
            }
        }
        Vec::new()
    }

    fn handles_enabled(&self, id: &str) -> bool {
        self.get_task(id).map(|t| !t.invalid).unwrap_or(false)
    }

    fn start_drag(&mut self, kind: DragKind, primary: String, x: f64, y: f64) {
        // Move and left-resize cascade to every transitive dependent;
        // right-resize and progress stay on the primary bar.
        let mut set = vec![primary.clone()];
        if matches!(kind, DragKind::Move | DragKind::ResizeLeft) {
            set.extend(self.graph.descendants(&primary));
        }
        set.retain(|id| self.bar_rect(id).is_some());

        let snapshots: HashMap<String, Rect> = set
            .iter()
            .filter_map(|id| self.bar_rect(id).map(|r| (id.clone(), r)))
            .collect();
        // A hit target can outlive its bar (stale shape handle after a
        // refresh); without a primary snapshot there is nothing to drag.
        if !snapshots.contains_key(&primary) {
            return;
        }
        let progress_origin = self
            .bar(&primary)
            .map(|b| b.progress_width)
            .unwrap_or_default();

        self.state = State::Drag(DragState {
            kind,
            primary,
            set,
            origin_x: x,
            origin_y: y,
            snapshots,
            progress_origin,
            sorting: false,
        });
    }

    fn pointer_move(&mut self, ev: PointerEvent) -> Vec<ChartEvent> {
        match &self.state {
            State::Idle => return Vec::new(),
            State::PendingCollapse {
                origin_x, origin_y, ..
            } => {
                let (ox, oy) = (*origin_x, *origin_y);
                // Past the slop this is a stray drag, not a toggle.
                if (ev.x - ox).abs() > CLICK_SLOP || (ev.y - oy).abs() > CLICK_SLOP {
                    self.state = State::Idle;
                }
                return Vec::new();
            }
            State::Drag(_) => {}
        }
        let State::Drag(mut drag) = std::mem::take(&mut self.state) else {
            return Vec::new();
        };
        // The primary's snapshot is checked at press time; bail (back to
        // idle) rather than panic if it is somehow gone.
        let Some(primary_snapshot) = drag.snapshots.get(&drag.primary).copied() else {
            return Vec::new();
        };

        let dx = snap(ev.x - drag.origin_x, &self.scale);
        let dy = ev.y - drag.origin_y;

        match drag.kind {
            DragKind::Move => {
                for id in &drag.set {
                    let Some(snapshot) = drag.snapshots.get(id).copied() else {
                        continue;
                    };
                    if let Some(b) = self.bar_mut(id) {
                        b.rect.x = snapshot.x + dx;
                    }
                }
                if self.options.sortable {
                    if let Some(b) = self.bar_mut(&drag.primary) {
                        b.rect.y = primary_snapshot.y + dy;
                    }
                    if dy.abs() > self.options.bar_height {
                        drag.sorting = true;
                    }
                    if drag.sorting {
                        self.resort_rows(&drag.primary);
                    }
                }
            }
            DragKind::ResizeLeft => {
                let width = primary_snapshot.width - dx;
                // Never let a resize collapse the bar below one grid column.
                if width >= self.scale.column_width {
                    if let Some(b) = self.bar_mut(&drag.primary) {
                        b.rect.x = primary_snapshot.x + dx;
                        b.rect.width = width;
                    }
                    for id in drag.set.iter().skip(1) {
                        let Some(snapshot) = drag.snapshots.get(id).copied() else {
                            continue;
                        };
                        if let Some(b) = self.bar_mut(id) {
                            b.rect.x = snapshot.x + dx;
                        }
                    }
                }
            }
            DragKind::ResizeRight => {
                let width = primary_snapshot.width + dx;
                if width >= self.scale.column_width {
                    if let Some(b) = self.bar_mut(&drag.primary) {
                        b.rect.width = width;
                    }
                }
            }
            DragKind::Progress => {
                let raw_dx = ev.x - drag.origin_x;
                if let Some(b) = self.bar_mut(&drag.primary) {
                    b.progress_width = (drag.progress_origin + raw_dx).clamp(0.0, b.rect.width);
                }
            }
        }

        if !matches!(drag.kind, DragKind::Progress) {
            self.update_envelopes(&drag.primary);
        }
        self.state = State::Drag(drag);
        Vec::new()
    }

    fn pointer_up(&mut self) -> Vec<ChartEvent> {
        let state = std::mem::take(&mut self.state);
        match state {
            State::Idle => Vec::new(),
            State::PendingCollapse { id, .. } => {
                self.toggle_collapse(&id);
                Vec::new()
            }
            State::Drag(drag) => self.commit_drag(drag),
        }
    }

    fn commit_drag(&mut self, drag: DragState) -> Vec<ChartEvent> {
        let mut events = Vec::new();

        if matches!(drag.kind, DragKind::Progress) {
            let filled = self.bar(&drag.primary).map(|b| (b.progress_width, b.rect.width));
            if let Some((width, bar_width)) = filled {
                if width != drag.progress_origin && bar_width > 0.0 {
                    let progress = (width / bar_width * 100.0).round().clamp(0.0, 100.0);
                    if let Some(task) = self.task_mut(&drag.primary) {
                        task.progress = progress;
                        events.push(ChartEvent::ProgressChange {
                            task_id: drag.primary.clone(),
                            progress: progress as u32,
                        });
                    }
                    self.cooldown = Some(drag.primary.clone());
                }
            }
            self.rebuild_bars();
            return events;
        }

        let mut moved_any = false;
        for id in &drag.set {
            let Some(snapshot) = drag.snapshots.get(id).copied() else {
                continue;
            };
            let rect = match self.bar_rect(id) {
                Some(r) => r,
                None => continue,
            };
            if rect.x == snapshot.x && rect.width == snapshot.width {
                continue;
            }
            moved_any = true;
            let (start, end) = from_geometry(rect.x, rect.width, &self.scale, &self.gantt_start);
            if let Some(task) = self.task_mut(id) {
                if start != task.start || end != task.end {
                    task.start = start;
                    task.end = end;
                    debug!(task = %id, %start, %end, "drag committed");
                    events.push(ChartEvent::DateChange {
                        task_id: id.clone(),
                        start,
                        end,
                    });
                }
            }
        }

        // Envelope ancestors follow their descendants' dates.
        let ancestors = self.graph.ancestors(&drag.primary);
        for id in ancestors {
            if let Some(rect) = self.bar_rect(&id) {
                if self.get_task(&id).map(|t| t.is_envelope()).unwrap_or(false) {
                    let (start, end) =
                        from_geometry(rect.x, rect.width, &self.scale, &self.gantt_start);
                    if let Some(task) = self.task_mut(&id) {
                        if start != task.start || end != task.end {
                            task.start = start;
                            task.end = end;
                        }
                    }
                }
            }
        }

        if moved_any {
            // A drag keeps the accidental follow-up click from reopening
            // detail UI on the same bar.
            self.cooldown = Some(drag.primary.clone());
        } else if matches!(drag.kind, DragKind::Move)
            && !drag.sorting
            && self.get_task(&drag.primary).is_some()
        {
            if self.cooldown.as_deref() == Some(drag.primary.as_str()) {
                self.cooldown = None;
            } else if self.options.popup_trigger == "click" {
                events.push(ChartEvent::Click {
                    task_id: drag.primary.clone(),
                });
            }
        }

        self.rebuild_bars();
        events
    }

    /// Stable re-sort of visible rows by current bar y, reassigning row
    /// indices and re-slotting every bar except the one being dragged.
    fn resort_rows(&mut self, dragged: &str) {
        let mut order: Vec<(String, f64)> = self
            .bars
            .iter()
            .map(|b| (b.task_id.clone(), b.rect.center_y()))
            .collect();
        order.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

        for (row, (id, _)) in order.iter().enumerate() {
            if let Some(task) = self.task_mut(id) {
                task.index = row;
            }
        }
        let layout = self.layout();
        let slots: Vec<(String, usize)> = order
            .iter()
            .enumerate()
            .map(|(row, (id, _))| (id.clone(), row))
            .collect();
        for (id, row) in slots {
            if id == dragged {
                continue;
            }
            if let Some(b) = self.bar_mut(&id) {
                b.rect.y = layout.row_y(row);
            }
        }
    }

    /// Recompute every project/tag ancestor of `id` as the tight envelope
    /// over its own descendant bars.
    pub(crate) fn update_envelopes(&mut self, id: &str) {
        for ancestor in self.graph.ancestors(id) {
            let is_envelope = self
                .get_task(&ancestor)
                .map(|t| t.is_envelope())
                .unwrap_or(false);
            if !is_envelope {
                continue;
            }
            let members: Vec<Rect> = self
                .graph
                .descendants(&ancestor)
                .iter()
                .filter_map(|d| self.bar_rect(d))
                .collect();
            if let Some((x, width)) = bar::envelope(&members) {
                if let Some(b) = self.bar_mut(&ancestor) {
                    b.rect.x = x;
                    b.rect.width = width;
                }
            }
        }
    }
}
