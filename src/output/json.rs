//! JSON output formatter
//!
//! Provides machine-readable JSON output for tooling and scripting.
//!
//! @module output/json

use serde::Serialize;

use super::{RenderedTree, TreeFormatter};
use crate::analytics::ReferencesAnalytics;
use crate::selection::SelectableEntity;

/// JSON formatter for machine-readable output
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Create a new JSON formatter with pretty printing
    pub fn new() -> Self {
        Self { pretty: true }
    }

    /// Create a compact JSON formatter (no pretty printing)
    pub fn compact() -> Self {
        Self { pretty: false }
    }

    fn to_json<T: Serialize>(&self, value: &T) -> String {
        let result = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        result.unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e))
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Serialize)]
struct SelectionOutput<'a> {
    root_id: &'a str,
    entities: &'a [SelectableEntity],
}

impl TreeFormatter for JsonFormatter {
    fn format_tree(&self, tree: &RenderedTree) -> String {
        self.to_json(tree)
    }

    fn format_stats(&self, stats: &[ReferencesAnalytics]) -> String {
        self.to_json(&stats)
    }

    fn format_selection(&self, root_id: &str, entities: &[SelectableEntity]) -> String {
        self.to_json(&SelectionOutput { root_id, entities })
    }
}
