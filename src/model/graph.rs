//! Dependency graph over task ids.
//!
//! Built wholesale from the task list (rebuild wins; there is no partial
//! update path). Traversals are iterative breadth-first closures with an
//! explicit visited set, so cyclic inputs terminate and never blow the
//! stack.

use std::collections::{HashMap, HashSet, VecDeque};

use super::task::Task;

/// Forward (dependents) and backward (dependencies) adjacency, id-keyed.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// id -> ids that list it as a dependency
    dependents: HashMap<String, Vec<String>>,
    /// id -> its direct dependency ids, in declared order
    dependencies: HashMap<String, Vec<String>>,
}

impl DependencyGraph {
    /// Rebuild both maps from scratch, in O(total dependency edges).
    pub fn build(tasks: &[Task]) -> Self {
        let mut dependents: HashMap<String, Vec<String>> = HashMap::new();
        let mut dependencies: HashMap<String, Vec<String>> = HashMap::new();
        for task in tasks {
            dependencies.insert(task.id.clone(), task.dependencies.clone());
            for dep in &task.dependencies {
                dependents
                    .entry(dep.clone())
                    .or_default()
                    .push(task.id.clone());
            }
        }
        Self {
            dependents,
            dependencies,
        }
    }

    /// Ids that depend directly on `id`.
    pub fn dependents_of(&self, id: &str) -> &[String] {
        self.dependents.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// All transitive dependents of `id`, in BFS order, excluding `id`.
    pub fn descendants(&self, id: &str) -> Vec<String> {
        self.closure(id, &self.dependents)
    }

    /// All transitive dependencies of `id`, in BFS order, excluding `id`.
    /// Used to find the enclosing project/tag envelope bars.
    pub fn ancestors(&self, id: &str) -> Vec<String> {
        self.closure(id, &self.dependencies)
    }

    /// The first direct dependency of `id` that has dependents of its own,
    /// i.e. the nearest ancestor rendered with a collapse caret.
    pub fn nearest_collapsible_ancestor(&self, id: &str) -> Option<&str> {
        let mut queue: VecDeque<&str> = VecDeque::new();
        let mut seen: HashSet<&str> = HashSet::new();
        queue.push_back(id);
        seen.insert(id);
        while let Some(cur) = queue.pop_front() {
            for dep in self.dependencies.get(cur).map(Vec::as_slice).unwrap_or(&[]) {
                if !seen.insert(dep.as_str()) {
                    continue;
                }
                if !self.dependents_of(dep).is_empty() {
                    return Some(dep.as_str());
                }
                queue.push_back(dep.as_str());
            }
        }
        None
    }

    fn closure(&self, id: &str, edges: &HashMap<String, Vec<String>>) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        let mut seen: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<&str> = VecDeque::new();
        seen.insert(id);
        queue.push_back(id);
        while let Some(cur) = queue.pop_front() {
            for next in edges.get(cur).map(Vec::as_slice).unwrap_or(&[]) {
                if seen.insert(next.as_str()) {
                    out.push(next.clone());
                    queue.push_back(next.as_str());
                }
            }
        }
        out
    }
}
