//! Renderer-agnostic interactive Gantt chart engine.
//!
//! The crate owns everything between raw task records and drawing
//! primitives: calendar arithmetic, task normalization, the dependency
//! graph, the time axis, bar geometry, dependency-arrow routing, and a
//! pointer-driven interaction state machine. Actual drawing and event
//! delivery go through the [`render::Renderer`] trait, so the same chart
//! runs against SVG, a canvas, or the recording surface used in tests.
//!
//! ```no_run
//! use gantt_core::{Gantt, Options, RawTask};
//!
//! let raw = vec![RawTask {
//!     name: "Write the plan".to_string(),
//!     start: Some("2024-01-10".to_string()),
//!     end: Some("2024-01-12".to_string()),
//!     ..Default::default()
//! }];
//! let chart = Gantt::new(&raw, Options::default());
//! assert_eq!(chart.tasks().len(), 1);
//! ```

pub mod chart;
pub mod dates;
pub mod debounce;
pub mod error;
pub mod geometry;
pub mod interaction;
pub mod model;
pub mod options;
pub mod render;

pub use chart::{ChartEvent, Gantt};
pub use error::Error;
pub use interaction::{HitTarget, PointerEvent, PointerPhase};
pub use model::{RawTask, Task, TaskType, ViewMode};
pub use options::Options;
