//! Traversal telemetry
//!
//! @module walker/telemetry

use serde::Serialize;

/// Counters accumulated over one traversal
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Telemetry {
    /// Deepest level at which a reference was visited (0 = no references)
    pub max_depth_reached: usize,
    /// `counts_per_level[n]` is the number of references visited at level `n + 1`
    pub counts_per_level: Vec<usize>,
    pub circular_reference_count: usize,
}

impl Telemetry {
    /// Count one reference at `level` (1-indexed)
    pub fn record_level(&mut self, level: usize) {
        if level == 0 {
            return;
        }
        if self.counts_per_level.len() < level {
            self.counts_per_level.resize(level, 0);
        }
        self.counts_per_level[level - 1] += 1;
        self.max_depth_reached = self.max_depth_reached.max(level);
    }

    pub fn record_circular(&mut self) {
        self.circular_reference_count += 1;
    }

    /// Fold a child traversal's counters into this one
    pub fn merge(&mut self, other: Telemetry) {
        if self.counts_per_level.len() < other.counts_per_level.len() {
            self.counts_per_level.resize(other.counts_per_level.len(), 0);
        }
        for (total, count) in self.counts_per_level.iter_mut().zip(other.counts_per_level) {
            *total += count;
        }
        self.max_depth_reached = self.max_depth_reached.max(other.max_depth_reached);
        self.circular_reference_count += other.circular_reference_count;
    }

    pub fn references_at(&self, level: usize) -> usize {
        level
            .checked_sub(1)
            .and_then(|i| self.counts_per_level.get(i))
            .copied()
            .unwrap_or(0)
    }

    pub fn total_references(&self) -> usize {
        self.counts_per_level.iter().sum()
    }
}
