//! A renderer that records every call, for driving the chart in tests.
#![allow(dead_code)]

use std::collections::HashMap;

use gantt_core::geometry::Rect;
use gantt_core::render::{AttrValue, Gesture, Renderer, ShapeId, ShapeKind, TargetError};

#[derive(Debug, Clone)]
pub struct Shape {
    pub id: ShapeId,
    pub kind: ShapeKind,
    pub parent: Option<ShapeId>,
    pub attrs: HashMap<String, AttrValue>,
}

impl Shape {
    pub fn class(&self) -> &str {
        match self.attrs.get("class") {
            Some(AttrValue::Text(s)) => s,
            _ => "",
        }
    }

    pub fn text_attr(&self, key: &str) -> Option<&str> {
        match self.attrs.get(key) {
            Some(AttrValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    pub fn num_attr(&self, key: &str) -> Option<f64> {
        match self.attrs.get(key) {
            Some(AttrValue::Num(n)) => Some(*n),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
pub struct RecordingRenderer {
    next_id: u64,
    pub fail_begin: bool,
    pub size: (f64, f64),
    pub shapes: Vec<Shape>,
    pub listens: Vec<(ShapeId, Gesture)>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A renderer whose surface rejects `begin`.
    pub fn failing() -> Self {
        Self {
            fail_begin: true,
            ..Self::default()
        }
    }

    pub fn with_class(&self, class: &str) -> Vec<&Shape> {
        self.shapes.iter().filter(|s| s.class() == class).collect()
    }

    /// The bar-wrapper group for a task id.
    pub fn wrapper(&self, task_id: &str) -> &Shape {
        self.shapes
            .iter()
            .find(|s| {
                s.kind == ShapeKind::Group && s.text_attr("data-id") == Some(task_id)
            })
            .unwrap_or_else(|| panic!("no bar wrapper for {task_id}"))
    }

    /// A child of the task's wrapper group with the given class.
    pub fn bar_child(&self, task_id: &str, class: &str) -> &Shape {
        let group = self.wrapper(task_id).id;
        self.shapes
            .iter()
            .find(|s| s.parent == Some(group) && s.class() == class)
            .unwrap_or_else(|| panic!("no {class} under {task_id}"))
    }

    pub fn has_bar_child(&self, task_id: &str, class: &str) -> bool {
        let group = self.wrapper(task_id).id;
        self.shapes
            .iter()
            .any(|s| s.parent == Some(group) && s.class() == class)
    }
}

impl Renderer for RecordingRenderer {
    fn begin(&mut self, width: f64, height: f64) -> Result<(), TargetError> {
        if self.fail_begin {
            return Err(TargetError("surface unavailable".to_string()));
        }
        self.shapes.clear();
        self.listens.clear();
        self.size = (width, height);
        Ok(())
    }

    fn create_shape(
        &mut self,
        kind: ShapeKind,
        parent: Option<ShapeId>,
        attrs: &[(&str, AttrValue)],
    ) -> ShapeId {
        let id = ShapeId(self.next_id);
        self.next_id += 1;
        self.shapes.push(Shape {
            id,
            kind,
            parent,
            attrs: attrs
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect(),
        });
        id
    }

    fn set_attribute(&mut self, shape: ShapeId, key: &str, value: AttrValue) {
        if let Some(s) = self.shapes.iter_mut().find(|s| s.id == shape) {
            s.attrs.insert(key.to_string(), value);
        }
    }

    fn bounding_box(&self, _shape: ShapeId) -> Option<Rect> {
        None
    }

    fn listen(&mut self, target: ShapeId, gesture: Gesture) {
        self.listens.push((target, gesture));
    }
}
