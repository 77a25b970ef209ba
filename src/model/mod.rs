pub mod graph;
pub mod task;
pub mod timeline;

pub use graph::DependencyGraph;
pub use task::{RawTask, Task, TaskType};
pub use timeline::{Scale, Tick, ViewMode};
