//! Rich-Text Reference Extraction
//!
//! Scans a rich-text document for the four node types that carry an entity
//! in `data.target`:
//! - `embedded-asset-block`
//! - `embedded-entry-block`
//! - `embedded-entry-inline`
//! - `entry-hyperlink`
//!
//! Other nodes (paragraphs, text, lists, ...) are transparent: their children
//! are flattened into the result. A reference node's own children are
//! scanned before the node itself is emitted.
//!
//! @module walker/rich_text

use tracing::debug;

use super::visited::{child_key, VisitedTracker};
use crate::graph::{Link, NodeType, RichTextNode};

/// A reference found inside a rich-text field
#[derive(Debug, Clone, PartialEq)]
pub struct RichTextReference {
    pub target: Link,
    pub node_type: NodeType,
    /// Path key of the reference node itself
    pub path: String,
    /// Path key of the enclosing node
    pub parent_path: String,
}

/// Collect references in document order.
///
/// Every node visited gets a path key below
/// `{parent_path}.{field_index}.{locale_index}`, branched in `visited` so
/// nested embeds are cycle-checked like any other reference.
pub fn extract_references(
    content: &[RichTextNode],
    parent_path: &str,
    field_index: usize,
    locale_index: usize,
    visited: &mut VisitedTracker,
) -> Vec<RichTextReference> {
    let document_path = child_key(parent_path, &[field_index, locale_index]);
    visited.branch(parent_path, &document_path);

    let mut references = Vec::new();
    collect(content, &document_path, visited, &mut references);
    references
}

fn collect(
    nodes: &[RichTextNode],
    parent_path: &str,
    visited: &mut VisitedTracker,
    out: &mut Vec<RichTextReference>,
) {
    for (index, node) in nodes.iter().enumerate() {
        let path = child_key(parent_path, &[index]);
        visited.branch(parent_path, &path);

        if !node.content.is_empty() {
            collect(&node.content, &path, visited, out);
        }

        if !node.node_type.is_reference() {
            continue;
        }

        match &node.target {
            Some(target) => out.push(RichTextReference {
                target: target.clone(),
                node_type: node.node_type.clone(),
                path,
                parent_path: parent_path.to_string(),
            }),
            None => debug!(
                node_type = node.node_type.as_str(),
                path = %path,
                "Rich-text reference without target"
            ),
        }
    }
}
