//! ASCII output formatter with colors and box-drawing
//!
//! Provides rich terminal output with:
//! - Unicode box-drawing characters
//! - ANSI color codes per node kind
//! - Terminal width detection
//!
//! @module output/ascii

use super::{draw_tree, summary_line, RenderedNode, RenderedTree, TreeFormatter};
use crate::analytics::ReferencesAnalytics;
use crate::selection::SelectableEntity;
use crate::walker::NodeKind;

// =============================================================================
// CONSTANTS
// =============================================================================

/// ANSI color codes
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";

    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const CYAN: &str = "\x1b[36m";
    pub const RED: &str = "\x1b[31m";
}

/// Box-drawing characters
mod box_chars {
    pub const TOP_LEFT: char = '╔';
    pub const TOP_RIGHT: char = '╗';
    pub const BOTTOM_LEFT: char = '╚';
    pub const BOTTOM_RIGHT: char = '╝';
    pub const HORIZONTAL: char = '═';
    pub const VERTICAL: char = '║';
    pub const THIN_HORIZONTAL: char = '━';
    pub const CIRCULAR: &str = "↺";
}

// =============================================================================
// FORMATTER IMPLEMENTATION
// =============================================================================

/// ASCII formatter with rich terminal output
pub struct AsciiFormatter {
    width: usize,
}

impl AsciiFormatter {
    /// Create a new ASCII formatter
    pub fn new() -> Self {
        Self {
            width: Self::detect_terminal_width(),
        }
    }

    /// Create a formatter with a fixed width
    pub fn with_width(width: usize) -> Self {
        Self {
            width: width.clamp(40, 200),
        }
    }

    /// Detect terminal width, defaulting to 80
    fn detect_terminal_width() -> usize {
        std::env::var("COLUMNS")
            .ok()
            .and_then(|cols| cols.parse::<usize>().ok())
            .map(|width| width.clamp(60, 200))
            .unwrap_or(80)
    }

    /// Draw a header box
    fn draw_header_box<S: AsRef<str>>(&self, lines: &[S]) -> String {
        let inner_width = self.width - 4;
        let border: String = std::iter::repeat(box_chars::HORIZONTAL)
            .take(inner_width + 2)
            .collect();
        let mut output = String::new();

        output.push(box_chars::TOP_LEFT);
        output.push_str(&border);
        output.push(box_chars::TOP_RIGHT);
        output.push('\n');

        for line in lines {
            output.push(box_chars::VERTICAL);
            output.push_str("  ");
            output.push_str(&truncate_or_pad(line.as_ref(), inner_width - 2));
            output.push_str("  ");
            output.push(box_chars::VERTICAL);
            output.push('\n');
        }

        output.push(box_chars::BOTTOM_LEFT);
        output.push_str(&border);
        output.push(box_chars::BOTTOM_RIGHT);
        output.push('\n');

        output
    }

    fn draw_rule(&self) -> String {
        let mut rule: String = std::iter::repeat(box_chars::THIN_HORIZONTAL)
            .take(self.width)
            .collect();
        rule.push('\n');
        rule
    }

    fn node_label(node: &RenderedNode) -> String {
        let field = node
            .field
            .as_deref()
            .map(|f| format!(" {}{}{}", colors::DIM, f, colors::RESET))
            .unwrap_or_default();

        match node.kind {
            NodeKind::Resolved => {
                let content_type = node
                    .content_type
                    .as_deref()
                    .or(node.entity_type.as_deref())
                    .map(|t| format!(" {}[{}]{}", colors::CYAN, t, colors::RESET))
                    .unwrap_or_default();
                format!(
                    "{}{}{}{}{}",
                    colors::BOLD,
                    node.title,
                    colors::RESET,
                    content_type,
                    field
                )
            }
            NodeKind::Circular => format!(
                "{}{} {}{} (circular){}",
                colors::YELLOW,
                box_chars::CIRCULAR,
                node.title,
                colors::RESET,
                field
            ),
            NodeKind::Unresolved => format!(
                "{}{} [{}]{}{}",
                colors::RED,
                node.title,
                node.id.as_deref().unwrap_or("?"),
                colors::RESET,
                field
            ),
            NodeKind::More => format!("{}{}{}", colors::DIM, node.title, colors::RESET),
        }
    }
}

impl Default for AsciiFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeFormatter for AsciiFormatter {
    fn format_tree(&self, tree: &RenderedTree) -> String {
        let mut output = self.draw_header_box(&[
            format!("REFERENCES: {}", tree.root_title),
            format!("Entry {} · max level {}", tree.root_id, tree.max_level),
        ]);

        if tree.nodes.is_empty() {
            output.push_str(&format!(
                "\n{}No references found{}\n",
                colors::DIM,
                colors::RESET
            ));
            return output;
        }

        output.push('\n');
        output.push_str(&format!(
            "{}{}{}\n",
            colors::BOLD,
            tree.root_title,
            colors::RESET
        ));
        output.push_str(&draw_tree(&tree.nodes, &Self::node_label));
        output.push('\n');
        output.push_str(&self.draw_rule());
        output.push_str(&format!(
            "{}{}{}\n",
            colors::GREEN,
            summary_line(&tree.telemetry),
            colors::RESET
        ));

        output
    }

    fn format_stats(&self, stats: &[ReferencesAnalytics]) -> String {
        let mut output = self.draw_header_box(&[format!("REFERENCE STATS: {} roots", stats.len())]);

        for record in stats {
            output.push('\n');
            output.push_str(&format!(
                "{}{}{}\n",
                colors::BOLD,
                record.entity_id,
                colors::RESET
            ));
            output.push_str(&format!("  Depth:    {}\n", record.references_depth));
            output.push_str(&format!(
                "  Circular: {}{}{}\n",
                if record.circular_references_count > 0 {
                    colors::YELLOW
                } else {
                    colors::GREEN
                },
                record.circular_references_count,
                colors::RESET
            ));
            for (i, count) in record.references_per_level.iter().enumerate() {
                output.push_str(&format!(
                    "  {}Level {:>2}{}  {}\n",
                    colors::DIM,
                    i + 1,
                    colors::RESET,
                    count
                ));
            }
        }

        output
    }

    fn format_selection(&self, root_id: &str, entities: &[SelectableEntity]) -> String {
        let mut output = self.draw_header_box(&[format!(
            "SELECTABLE FROM {}: {} entities",
            root_id,
            entities.len()
        )]);
        output.push('\n');

        for (i, entity) in entities.iter().enumerate() {
            output.push_str(&format!(
                "{}{:>3}.{} {}{}{} {}[{}]{} {}\n",
                colors::DIM,
                i + 1,
                colors::RESET,
                colors::BOLD,
                entity.title,
                colors::RESET,
                colors::CYAN,
                entity
                    .content_type
                    .as_deref()
                    .unwrap_or(&entity.entity_type),
                colors::RESET,
                entity.id
            ));
        }

        output
    }
}

/// Truncate to `width` characters with an ellipsis, or pad with spaces
fn truncate_or_pad(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count > width {
        let mut truncated: String = text.chars().take(width.saturating_sub(1)).collect();
        truncated.push('…');
        truncated
    } else {
        format!("{}{}", text, " ".repeat(width - count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::fixtures;

    #[test]
    fn test_tree_marks_each_kind() {
        let output = AsciiFormatter::with_width(80).format_tree(&fixtures::rendered());

        assert!(output.contains("REFERENCES: Home"));
        assert!(output.contains(&format!("{}Hero banner{}", colors::BOLD, colors::RESET)));
        assert!(output.contains("↺ Home"));
        assert!(output.contains("Missing or inaccessible [gone]"));
        assert!(output.contains("3 references, depth 2, 1 circular"));
    }

    #[test]
    fn test_header_box_fits_width() {
        let formatter = AsciiFormatter::with_width(60);
        let header = formatter.draw_header_box(&["x".repeat(100)]);

        for line in header.lines() {
            assert_eq!(line.chars().count(), 60);
        }
    }

    #[test]
    fn test_truncate_or_pad() {
        assert_eq!(truncate_or_pad("abc", 5), "abc  ");
        assert_eq!(truncate_or_pad("abcdef", 4), "abc…");
    }
}
