//! Per-branch visited lists
//!
//! Maps a tree-path key to the IDs of the entities on the path from the root
//! to that key. A child's list starts as a copy of its parent's, so siblings
//! never observe each other's visits.
//!
//! @module walker/visited

use std::collections::HashMap;

/// Path key of the traversal root
pub const ROOT_PATH: &str = "0";

/// Visited-list ledger for one traversal
#[derive(Debug, Clone, Default)]
pub struct VisitedTracker {
    lists: HashMap<String, Vec<String>>,
}

impl VisitedTracker {
    /// Start a ledger whose root path holds only the root's ID
    pub fn new(root_id: &str) -> Self {
        let mut lists = HashMap::new();
        lists.insert(ROOT_PATH.to_string(), vec![root_id.to_string()]);
        Self { lists }
    }

    /// Give `child` its own copy of `parent`'s list
    pub fn branch(&mut self, parent: &str, child: &str) {
        let inherited = self.path(parent).to_vec();
        self.lists.insert(child.to_string(), inherited);
    }

    /// Append an entity that is about to be expanded at `path`
    pub fn enter(&mut self, path: &str, id: &str) {
        self.lists
            .entry(path.to_string())
            .or_default()
            .push(id.to_string());
    }

    /// Whether `candidate` already appears on the branch ending at `parent`.
    ///
    /// Counts occurrences as if the candidate had been appended; more than one
    /// means it was seen earlier on this branch.
    pub fn is_circular(&self, parent: &str, candidate: &str) -> bool {
        let occurrences = self
            .path(parent)
            .iter()
            .filter(|id| id.as_str() == candidate)
            .count()
            + 1;
        occurrences > 1
    }

    /// IDs on the branch ending at `key` (empty for unknown keys)
    pub fn path(&self, key: &str) -> &[String] {
        self.lists.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.lists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lists.is_empty()
    }
}

/// Derive a child path key from a parent key and index segments
pub fn child_key(parent: &str, segments: &[usize]) -> String {
    let mut key = parent.to_string();
    for segment in segments {
        key.push('.');
        key.push_str(&segment.to_string());
    }
    key
}
