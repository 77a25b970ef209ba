//! The drawing seam.
//!
//! The chart never draws: it asks a [`Renderer`] for shapes with
//! attributes, updates attributes, measures text, and registers the
//! pointer gestures it wants forwarded back through
//! [`Gantt::handle_pointer`](crate::Gantt::handle_pointer). Styling and
//! the actual drawing primitives belong to the host.

use thiserror::Error;

use crate::geometry::Rect;

/// Opaque handle to a shape created by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShapeId(pub u64);

/// The shape vocabulary the chart uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Group,
    Rect,
    Line,
    Path,
    Polygon,
    Text,
}

/// A shape attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Num(f64),
    Text(String),
}

impl From<f64> for AttrValue {
    fn from(v: f64) -> Self {
        AttrValue::Num(v)
    }
}

impl From<&str> for AttrValue {
    fn from(v: &str) -> Self {
        AttrValue::Text(v.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(v: String) -> Self {
        AttrValue::Text(v)
    }
}

/// Pointer gestures the chart can subscribe a shape to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    PointerDown,
    PointerMove,
    PointerUp,
}

/// The drawing surface rejected the chart at setup. This is the one
/// fatal error in the engine.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct TargetError(pub String);

/// Primitive drawing capabilities consumed by the chart.
pub trait Renderer {
    /// Reset the surface to the given size. Failing here aborts the
    /// render; nothing else in the trait is fallible.
    fn begin(&mut self, width: f64, height: f64) -> Result<(), TargetError>;

    /// Create a shape, optionally nested under a group.
    fn create_shape(
        &mut self,
        kind: ShapeKind,
        parent: Option<ShapeId>,
        attrs: &[(&str, AttrValue)],
    ) -> ShapeId;

    /// Update a single attribute on an existing shape.
    fn set_attribute(&mut self, shape: ShapeId, key: &str, value: AttrValue);

    /// Rendered bounds of a shape, if the renderer can measure it.
    /// The chart uses this to move labels that overflow their bar.
    fn bounding_box(&self, shape: ShapeId) -> Option<Rect>;

    /// Ask for a gesture on a shape to be forwarded back to the chart.
    fn listen(&mut self, target: ShapeId, gesture: Gesture);
}
