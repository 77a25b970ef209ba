//! Dependency-arrow path routing.
//!
//! An arrow drops from the midpoint of the dependency bar, bends with a
//! fixed-radius quarter arc and runs to just before the dependent bar's
//! left edge. When the dependent starts at or before its dependency
//! horizontally, the path detours around the dependent's left side
//! instead. Recomputed on every geometry change of either endpoint.

use super::Rect;

/// Fixed routing inputs taken from the chart options.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowConfig {
    pub padding: f64,
    pub curve: f64,
}

/// Compute the SVG path data for an arrow from the bar of a dependency to
/// the bar of its dependent. Row indices pick the bend orientation.
pub fn route(
    from: &Rect,
    from_index: usize,
    to: &Rect,
    to_index: usize,
    cfg: &ArrowConfig,
) -> String {
    let curve = cfg.curve;
    let padding = cfg.padding;

    // Walk the drop point back from the midpoint so the bend lands before
    // the dependent's left edge, but never into the bar's own left padding.
    let mut start_x = from.center_x();
    while to.x < start_x + padding && start_x > from.x + padding {
        start_x -= 10.0;
    }
    let start_y = from.bottom();
    let end_x = to.x - padding / 2.0;
    let end_y = to.center_y();

    let from_is_below_to = from_index > to_index;
    let clockwise = if from_is_below_to { 1 } else { 0 };
    let curve_y = if from_is_below_to { -curve } else { curve };

    if to.x < from.x + padding {
        // Detour: drop, bend left, run past the dependent's left edge,
        // bend toward its row and approach it from the left.
        let down_1 = padding / 2.0 - curve;
        let down_2 = to.center_y() - curve_y;
        let left = to.x - padding;
        format!(
            "M {} {} v {} a {} {} 0 0 1 {} {} H {} a {} {} 0 0 {} {} {} V {} a {} {} 0 0 {} {} {} L {} {} m -5 -5 l 5 5 l -5 5",
            start_x, start_y, down_1,
            curve, curve, -curve, curve,
            left,
            curve, curve, clockwise, -curve, curve_y,
            down_2,
            curve, curve, clockwise, curve, curve_y,
            end_x, end_y,
        )
    } else {
        let offset = if from_is_below_to {
            end_y + curve
        } else {
            end_y - curve
        };
        format!(
            "M {} {} V {} a {} {} 0 0 {} {} {} L {} {} m -5 -5 l 5 5 l -5 5",
            start_x, start_y, offset, curve, curve, clockwise, curve, curve_y, end_x, end_y,
        )
    }
}
