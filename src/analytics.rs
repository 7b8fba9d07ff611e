//! Reference-tree analytics events
//!
//! One record per rendered tree, emitted through `tracing` under the
//! `reftree::analytics` target so a subscriber can forward it.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::walker::ReferenceTree;

/// Telemetry of one traversal in the shape the analytics sink expects
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferencesAnalytics {
    pub entity_id: String,
    pub references_depth: usize,
    pub references_per_level: Vec<usize>,
    pub circular_references_count: usize,
    pub recorded_at: DateTime<Utc>,
}

impl ReferencesAnalytics {
    pub fn from_tree(tree: &ReferenceTree) -> Self {
        Self {
            entity_id: tree.root.id.clone(),
            references_depth: tree.telemetry.max_depth_reached,
            references_per_level: tree.telemetry.counts_per_level.clone(),
            circular_references_count: tree.telemetry.circular_reference_count,
            recorded_at: Utc::now(),
        }
    }

    pub fn emit(&self) {
        info!(
            target: "reftree::analytics",
            entity_id = %self.entity_id,
            references_depth = self.references_depth,
            references_per_level = ?self.references_per_level,
            circular_references_count = self.circular_references_count,
            "references_tree"
        );
    }
}
