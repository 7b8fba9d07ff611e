//! Output formatters for reference trees
//!
//! Provides multiple output formats:
//! - ASCII: box-drawing with ANSI colors (terminal)
//! - Plain: simple text without colors (piping/logs)
//! - JSON: machine-readable format (tooling integration)
//!
//! @module output

pub mod ascii;
pub mod json;
pub mod plain;

use serde::Serialize;

use crate::analytics::ReferencesAnalytics;
use crate::graph::EntityGraph;
use crate::selection::SelectableEntity;
use crate::title::TitleResolver;
use crate::walker::{NodeKind, ReferenceNode, ReferenceTree, Telemetry};

// =============================================================================
// TYPES
// =============================================================================

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Rich ASCII with colors and box-drawing
    #[default]
    Ascii,
    /// Plain text without ANSI codes
    Plain,
    /// JSON for machine consumption
    Json,
}

/// A tree node with its display details resolved
#[derive(Debug, Clone, Serialize)]
pub struct RenderedNode {
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    pub level: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RenderedNode>,
}

/// A whole tree ready for formatting
#[derive(Debug, Clone, Serialize)]
pub struct RenderedTree {
    pub root_id: String,
    pub root_title: String,
    pub max_level: usize,
    pub nodes: Vec<RenderedNode>,
    pub telemetry: Telemetry,
}

/// Everything needed to label a walked tree
pub struct TreeView<'a> {
    pub tree: &'a ReferenceTree,
    pub graph: &'a EntityGraph,
    pub titles: &'a TitleResolver,
    pub locale: &'a str,
}

impl TreeView<'_> {
    pub fn render(&self) -> RenderedTree {
        let root_title = self
            .graph
            .resolve(&self.tree.root)
            .map(|root| self.titles.title(root, self.locale))
            .unwrap_or_else(|| self.tree.root.id.clone());

        RenderedTree {
            root_id: self.tree.root.id.clone(),
            root_title,
            max_level: self.tree.max_level,
            nodes: self.tree.nodes.iter().map(|n| self.render_node(n)).collect(),
            telemetry: self.tree.telemetry.clone(),
        }
    }

    fn render_node(&self, node: &ReferenceNode) -> RenderedNode {
        let entity = node.entity.as_ref().and_then(|link| self.graph.resolve(link));
        let field = node.source.as_ref().map(|source| match &source.node_type {
            Some(node_type) => format!("{} ({})", source.field, node_type.as_str()),
            None => source.field.clone(),
        });

        RenderedNode {
            kind: node.kind,
            id: node.entity_id().map(str::to_string),
            title: self.titles.node_label(self.graph, node, self.locale),
            entity_type: entity
                .map(|e| e.sys.entity_type.to_string())
                .or_else(|| node.entity.as_ref().and_then(|l| l.link_type.clone())),
            content_type: entity.and_then(|e| e.sys.content_type.clone()),
            field,
            level: node.level,
            children: node.children.iter().map(|n| self.render_node(n)).collect(),
        }
    }
}

// =============================================================================
// FORMATTER TRAIT
// =============================================================================

/// Trait for formatting reftree output
pub trait TreeFormatter {
    /// Format a rendered reference tree
    fn format_tree(&self, tree: &RenderedTree) -> String;

    /// Format analytics records, one per root
    fn format_stats(&self, stats: &[ReferencesAnalytics]) -> String;

    /// Format the entities selectable from one root's tree
    fn format_selection(&self, root_id: &str, entities: &[SelectableEntity]) -> String;
}

// =============================================================================
// FACTORY FUNCTION
// =============================================================================

/// Create a formatter for the given output format
pub fn create_formatter(format: OutputFormat) -> Box<dyn TreeFormatter> {
    match format {
        OutputFormat::Ascii => Box::new(ascii::AsciiFormatter::new()),
        OutputFormat::Plain => Box::new(plain::PlainFormatter::new()),
        OutputFormat::Json => Box::new(json::JsonFormatter::new()),
    }
}

// =============================================================================
// SHARED TREE DRAWING
// =============================================================================

/// Draw `nodes` as an indented tree, one line per node
pub(crate) fn draw_tree<F>(nodes: &[RenderedNode], label: &F) -> String
where
    F: Fn(&RenderedNode) -> String,
{
    let mut output = String::new();
    draw_level(nodes, "", label, &mut output);
    output
}

fn draw_level<F>(nodes: &[RenderedNode], prefix: &str, label: &F, output: &mut String)
where
    F: Fn(&RenderedNode) -> String,
{
    for (i, node) in nodes.iter().enumerate() {
        let last = i + 1 == nodes.len();
        let (branch, indent) = if last {
            ("└── ", "    ")
        } else {
            ("├── ", "│   ")
        };

        output.push_str(prefix);
        output.push_str(branch);
        output.push_str(&label(node));
        output.push('\n');

        if !node.children.is_empty() {
            draw_level(&node.children, &format!("{}{}", prefix, indent), label, output);
        }
    }
}

/// Summary line shared by the text formatters
pub(crate) fn summary_line(telemetry: &Telemetry) -> String {
    format!(
        "{} references, depth {}, {} circular",
        telemetry.total_references(),
        telemetry.max_depth_reached,
        telemetry.circular_reference_count
    )
}

// =============================================================================
// RE-EXPORTS
// =============================================================================

pub use ascii::AsciiFormatter;
pub use json::JsonFormatter;
pub use plain::PlainFormatter;
