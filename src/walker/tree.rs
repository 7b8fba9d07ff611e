//! Reference tree output types
//!
//! @module walker/tree

use serde::Serialize;

use super::telemetry::Telemetry;
use crate::graph::{Link, NodeType};

/// What a reference node stands for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Resolved entity, expanded below this node
    Resolved,
    /// Link whose target is missing from the graph
    Unresolved,
    /// Entity already on this branch; not expanded
    Circular,
    /// Placeholder for a branch deeper than the requested level
    More,
}

/// Where a reference was found in its parent entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldSource {
    pub field: String,
    pub field_index: usize,
    pub locale: String,
    /// Rich-text node type when found inside a document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_type: Option<NodeType>,
}

/// One discovered link (or the "more" sentinel)
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceNode {
    pub kind: NodeKind,
    /// Target entity; absent only for the sentinel
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity: Option<Link>,
    pub level: usize,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<FieldSource>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ReferenceNode>,
}

impl ReferenceNode {
    pub(crate) fn new(
        kind: NodeKind,
        entity: Link,
        level: usize,
        path: String,
        source: FieldSource,
    ) -> Self {
        Self {
            kind,
            entity: Some(entity),
            level,
            path,
            source: Some(source),
            children: Vec::new(),
        }
    }

    pub(crate) fn more(level: usize, path: String) -> Self {
        Self {
            kind: NodeKind::More,
            entity: None,
            level,
            path,
            source: None,
            children: Vec::new(),
        }
    }

    pub fn is_unresolved(&self) -> bool {
        self.kind == NodeKind::Unresolved
    }

    pub fn is_circular(&self) -> bool {
        self.kind == NodeKind::Circular
    }

    pub fn is_more_sentinel(&self) -> bool {
        self.kind == NodeKind::More
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.entity.as_ref().map(|link| link.id.as_str())
    }
}

/// Result of one `walk`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceTree {
    pub root: Link,
    pub max_level: usize,
    pub nodes: Vec<ReferenceNode>,
    pub telemetry: Telemetry,
}

impl ReferenceTree {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Pre-order iterator over every surfaced node
    pub fn iter(&self) -> TreeIter<'_> {
        TreeIter {
            stack: self.nodes.iter().rev().collect(),
        }
    }

    pub fn node_count(&self) -> usize {
        self.iter().count()
    }
}

/// Depth-first, document-order iterator over a [`ReferenceTree`]
pub struct TreeIter<'a> {
    stack: Vec<&'a ReferenceNode>,
}

impl<'a> Iterator for TreeIter<'a> {
    type Item = &'a ReferenceNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}
