//! Plain text output formatter
//!
//! Provides simple text output without ANSI codes for:
//! - Piping to other tools
//! - Log files
//! - Environments without color support
//!
//! @module output/plain

use super::{draw_tree, summary_line, RenderedNode, RenderedTree, TreeFormatter};
use crate::analytics::ReferencesAnalytics;
use crate::selection::SelectableEntity;
use crate::walker::NodeKind;

// =============================================================================
// PLAIN TEXT FORMATTER
// =============================================================================

/// Plain text formatter (no ANSI codes)
pub struct PlainFormatter;

impl PlainFormatter {
    /// Create a new plain text formatter
    pub fn new() -> Self {
        Self
    }

    fn node_label(node: &RenderedNode) -> String {
        let id = node.id.as_deref().unwrap_or("");
        let mut label = match node.kind {
            NodeKind::Resolved => format!("{} ({})", node.title, id),
            NodeKind::Circular => format!("{} ({}) [circular]", node.title, id),
            NodeKind::Unresolved => format!("{} ({}) [missing]", node.title, id),
            NodeKind::More => return node.title.clone(),
        };
        if let Some(field) = &node.field {
            label.push_str(" via ");
            label.push_str(field);
        }
        label
    }
}

impl Default for PlainFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeFormatter for PlainFormatter {
    fn format_tree(&self, tree: &RenderedTree) -> String {
        let mut output = String::new();

        output.push_str(&format!("REFERENCES: {} ({})\n", tree.root_title, tree.root_id));
        output.push_str(&format!("Max level: {}\n", tree.max_level));
        output.push_str(&"-".repeat(60));
        output.push('\n');

        if tree.nodes.is_empty() {
            output.push_str("No references found\n");
            return output;
        }

        output.push_str(&draw_tree(&tree.nodes, &Self::node_label));
        output.push_str(&"-".repeat(60));
        output.push('\n');
        output.push_str(&summary_line(&tree.telemetry));
        output.push('\n');

        output
    }

    fn format_stats(&self, stats: &[ReferencesAnalytics]) -> String {
        let mut output = String::new();

        for record in stats {
            let per_level: Vec<String> = record
                .references_per_level
                .iter()
                .map(usize::to_string)
                .collect();
            output.push_str(&format!(
                "{}\tdepth={}\tcircular={}\tper_level={}\n",
                record.entity_id,
                record.references_depth,
                record.circular_references_count,
                per_level.join(",")
            ));
        }

        output
    }

    fn format_selection(&self, root_id: &str, entities: &[SelectableEntity]) -> String {
        let mut output = String::new();

        for entity in entities {
            output.push_str(&format!(
                "{}\t{}\t{}\t{}\t{}\n",
                root_id,
                entity.id,
                entity.entity_type,
                entity.content_type.as_deref().unwrap_or("-"),
                entity.title
            ));
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::fixtures;
    use chrono::Utc;

    #[test]
    fn test_tree_has_no_ansi_codes() {
        let output = PlainFormatter::new().format_tree(&fixtures::rendered());

        assert!(!output.contains('\x1b'));
        assert!(output.contains("├── Hero banner (hero) via sections\n"));
        assert!(output.contains("│   └── Home (page) [circular] via page\n"));
        assert!(output.contains("└── Missing or inaccessible (gone) [missing] via sections\n"));
        assert!(output.ends_with("3 references, depth 2, 1 circular\n"));
    }

    #[test]
    fn test_stats_one_line_per_root() {
        let stats = vec![ReferencesAnalytics {
            entity_id: "page".to_string(),
            references_depth: 2,
            references_per_level: vec![2, 1],
            circular_references_count: 1,
            recorded_at: Utc::now(),
        }];

        assert_eq!(
            PlainFormatter::new().format_stats(&stats),
            "page\tdepth=2\tcircular=1\tper_level=2,1\n"
        );
    }

    #[test]
    fn test_selection_rows() {
        let entities = vec![SelectableEntity {
            id: "a".to_string(),
            entity_type: "Asset".to_string(),
            title: "logo.png".to_string(),
            content_type: None,
        }];

        assert_eq!(
            PlainFormatter::new().format_selection("root", &entities),
            "root\ta\tAsset\t-\tlogo.png\n"
        );
    }
}
