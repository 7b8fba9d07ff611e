//! Reference Tree Walker
//!
//! Depth-first, field-order traversal of an [`EntityGraph`] from a root
//! entity:
//! - single references and reference arrays become one node per link
//! - rich-text fields delegate to [`rich_text::extract_references`]
//! - cycles are detected per branch through [`VisitedTracker`]
//! - branches deeper than `max_level` collapse into a single "more" sentinel,
//!   but are still walked so telemetry reflects the true shape
//! - nothing is visited beyond [`FAILSAFE_DEPTH`], whatever `max_level` says
//!
//! @module walker

pub mod rich_text;
pub mod telemetry;
pub mod tree;
pub mod visited;

use rayon::prelude::*;
use tracing::{info, warn};

use crate::core::error::{Error, Result};
use crate::graph::{Entity, EntityGraph, FieldValue, Link};

pub use rich_text::{extract_references, RichTextReference};
pub use telemetry::Telemetry;
pub use tree::{FieldSource, NodeKind, ReferenceNode, ReferenceTree, TreeIter};
pub use visited::{child_key, VisitedTracker, ROOT_PATH};

/// Absolute recursion ceiling, independent of the requested level
pub const FAILSAFE_DEPTH: usize = 10;

// =============================================================================
// TRAVERSAL CONTEXT
// =============================================================================

/// State owned by exactly one `walk` call
struct TraversalContext<'g> {
    graph: &'g EntityGraph,
    max_level: usize,
    visited: VisitedTracker,
}

// =============================================================================
// WALK
// =============================================================================

/// Build the reference tree below `root_id`.
///
/// `max_level` is the deepest level surfaced (level 1 = the root's direct
/// references). A root without fields yields an empty tree.
pub fn walk(graph: &EntityGraph, root_id: &str, max_level: usize) -> Result<ReferenceTree> {
    if max_level == 0 {
        return Err(Error::InvalidMaxLevel { level: max_level });
    }

    let root = graph.get(root_id).ok_or_else(|| Error::EntityNotFound {
        id: root_id.to_string(),
    })?;

    let mut ctx = TraversalContext {
        graph,
        max_level,
        visited: VisitedTracker::new(root.id()),
    };

    let (nodes, telemetry) = walk_entity(&mut ctx, root, ROOT_PATH, 0);

    info!(
        root = root_id,
        max_level,
        depth = telemetry.max_depth_reached,
        references = telemetry.total_references(),
        circular = telemetry.circular_reference_count,
        "Walked reference tree"
    );

    Ok(ReferenceTree {
        root: root.link(),
        max_level,
        nodes,
        telemetry,
    })
}

/// Walk every root of the graph in parallel; each traversal owns its state
pub fn walk_all(graph: &EntityGraph, max_level: usize) -> Result<Vec<ReferenceTree>> {
    graph
        .roots()
        .par_iter()
        .map(|root_id| walk(graph, root_id, max_level))
        .collect()
}

/// Expand `entity` (sitting at `level`) and return its children plus the
/// telemetry of everything visited below it.
fn walk_entity(
    ctx: &mut TraversalContext<'_>,
    entity: &Entity,
    path: &str,
    level: usize,
) -> (Vec<ReferenceNode>, Telemetry) {
    let child_level = level + 1;
    let mut telemetry = Telemetry::default();

    if child_level > FAILSAFE_DEPTH {
        if entity.has_references() {
            warn!(entity = entity.id(), path, "Failsafe depth reached, truncating");
        }
        return (Vec::new(), telemetry);
    }

    let mut children = Vec::new();

    for (field_index, field) in entity.fields.iter().enumerate() {
        for (locale_index, localized) in field.locales.iter().enumerate() {
            let source = FieldSource {
                field: field.name.clone(),
                field_index,
                locale: localized.locale.clone(),
                node_type: None,
            };

            match &localized.value {
                FieldValue::Scalar(_) => {}
                FieldValue::SingleRef(link) => {
                    let key = child_key(path, &[field_index, locale_index, 0]);
                    let (node, delta) = visit_link(ctx, link, path, key, child_level, source);
                    telemetry.merge(delta);
                    children.push(node);
                }
                FieldValue::RefArray(links) => {
                    for (index, link) in links.iter().enumerate() {
                        let key = child_key(path, &[field_index, locale_index, index]);
                        let (node, delta) =
                            visit_link(ctx, link, path, key, child_level, source.clone());
                        telemetry.merge(delta);
                        children.push(node);
                    }
                }
                FieldValue::RichText(document) => {
                    let references = extract_references(
                        &document.content,
                        path,
                        field_index,
                        locale_index,
                        &mut ctx.visited,
                    );
                    for reference in references {
                        let source = FieldSource {
                            node_type: Some(reference.node_type),
                            ..source.clone()
                        };
                        let (node, delta) = visit_link(
                            ctx,
                            &reference.target,
                            &reference.parent_path,
                            reference.path,
                            child_level,
                            source,
                        );
                        telemetry.merge(delta);
                        children.push(node);
                    }
                }
            }
        }
    }

    if child_level > ctx.max_level && !children.is_empty() {
        let sentinel = ReferenceNode::more(child_level, format!("{}.more", path));
        return (vec![sentinel], telemetry);
    }

    (children, telemetry)
}

/// Classify one link and, when it is resolved and not circular, expand it
fn visit_link(
    ctx: &mut TraversalContext<'_>,
    link: &Link,
    parent_path: &str,
    path: String,
    level: usize,
    source: FieldSource,
) -> (ReferenceNode, Telemetry) {
    let mut telemetry = Telemetry::default();
    telemetry.record_level(level);
    ctx.visited.branch(parent_path, &path);

    let graph = ctx.graph;
    let Some(entity) = graph.resolve(link) else {
        let node = ReferenceNode::new(NodeKind::Unresolved, link.clone(), level, path, source);
        return (node, telemetry);
    };

    if ctx.visited.is_circular(parent_path, entity.id()) {
        telemetry.record_circular();
        let node = ReferenceNode::new(NodeKind::Circular, entity.link(), level, path, source);
        return (node, telemetry);
    }

    ctx.visited.enter(&path, entity.id());
    let (children, delta) = walk_entity(ctx, entity, &path, level);
    telemetry.merge(delta);

    let mut node = ReferenceNode::new(NodeKind::Resolved, entity.link(), level, path, source);
    node.children = children;
    (node, telemetry)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn link(id: &str) -> Value {
        json!({ "sys": { "type": "Link", "linkType": "Entry", "id": id } })
    }

    fn entry(id: &str, fields: Value) -> Value {
        json!({ "sys": { "id": id, "type": "Entry" }, "fields": fields })
    }

    fn response(items: Vec<Value>, includes: Vec<Value>) -> EntityGraph {
        EntityGraph::from_response(&json!({
            "items": items,
            "includes": { "Entry": includes }
        }))
        .unwrap()
    }

    fn ids(nodes: &[ReferenceNode]) -> Vec<&str> {
        nodes.iter().filter_map(ReferenceNode::entity_id).collect()
    }

    /// Linear chain root -> c1 -> c2 -> ... -> c{len}
    fn chain(len: usize) -> EntityGraph {
        let root = entry("root", json!({ "next": { "en": link("c1") } }));
        let includes = (1..=len)
            .map(|i| {
                if i == len {
                    entry(&format!("c{i}"), json!({ "title": { "en": "last" } }))
                } else {
                    entry(
                        &format!("c{i}"),
                        json!({ "next": { "en": link(&format!("c{}", i + 1)) } }),
                    )
                }
            })
            .collect();
        response(vec![root], includes)
    }

    #[test]
    fn test_no_links_yields_empty_tree() {
        let graph = response(
            vec![entry("root", json!({ "title": { "en": "Hi" }, "count": { "en": 3 } }))],
            vec![],
        );

        let tree = walk(&graph, "root", 5).unwrap();
        assert!(tree.is_empty());
        assert_eq!(tree.telemetry.max_depth_reached, 0);
        assert!(tree.telemetry.counts_per_level.is_empty());
    }

    #[test]
    fn test_root_without_fields_yields_empty_tree() {
        let graph = EntityGraph::from_entity(&json!({ "sys": { "id": "root", "type": "Entry" } }))
            .unwrap();

        let tree = walk(&graph, "root", 5).unwrap();
        assert!(tree.is_empty());
        assert_eq!(tree.telemetry, Telemetry::default());
    }

    #[test]
    fn test_invalid_inputs() {
        let graph = chain(1);
        assert!(matches!(
            walk(&graph, "root", 0),
            Err(Error::InvalidMaxLevel { level: 0 })
        ));
        assert!(matches!(
            walk(&graph, "nope", 3),
            Err(Error::EntityNotFound { .. })
        ));
    }

    #[test]
    fn test_array_field_emits_one_node_per_link_in_order() {
        let graph = response(
            vec![entry(
                "root",
                json!({ "items": { "en": [link("a"), link("b"), link("c")] } }),
            )],
            vec![
                entry("c", json!({})),
                entry("a", json!({})),
                entry("b", json!({})),
            ],
        );

        let tree = walk(&graph, "root", 5).unwrap();
        assert_eq!(ids(&tree.nodes), vec!["a", "b", "c"]);
        assert!(tree.nodes.iter().all(|n| n.kind == NodeKind::Resolved));
        assert!(tree.nodes.iter().all(|n| n.level == 1));
        assert_eq!(tree.telemetry.counts_per_level, vec![3]);
        assert_eq!(tree.nodes[1].path, "0.0.0.1");
    }

    #[test]
    fn test_unresolved_link() {
        let graph = response(
            vec![entry("root", json!({ "ref": { "en": link("missing") } }))],
            vec![],
        );

        let tree = walk(&graph, "root", 5).unwrap();
        assert_eq!(tree.nodes.len(), 1);
        assert!(tree.nodes[0].is_unresolved());
        assert!(!tree.nodes[0].is_circular());
        assert_eq!(tree.telemetry.circular_reference_count, 0);
        assert_eq!(tree.telemetry.max_depth_reached, 1);
    }

    #[test]
    fn test_two_cycle_is_flagged_and_not_expanded() {
        let graph = response(
            vec![entry("root", json!({ "ref": { "en": link("A") } }))],
            vec![
                entry("A", json!({ "ref": { "en": link("B") } })),
                entry("B", json!({ "ref": { "en": link("A") } })),
            ],
        );

        let tree = walk(&graph, "root", 10).unwrap();
        let a = &tree.nodes[0];
        assert_eq!(a.kind, NodeKind::Resolved);
        let b = &a.children[0];
        assert_eq!(b.kind, NodeKind::Resolved);
        let a_again = &b.children[0];
        assert_eq!(a_again.entity_id(), Some("A"));
        assert!(a_again.is_circular());
        assert!(a_again.children.is_empty());

        assert_eq!(tree.telemetry.circular_reference_count, 1);
        assert_eq!(tree.telemetry.max_depth_reached, 3);
    }

    #[test]
    fn test_reference_back_to_root_is_circular_below_the_root() {
        // R -> A -> R: A itself is an ordinary node, the nested R is circular
        let graph = EntityGraph::from_response(&json!({
            "items": [{ "sys": { "id": "R" }, "fields": { "ref": { "en": { "sys": { "id": "A" } } } } }],
            "includes": { "Entry": [
                { "sys": { "id": "A" }, "fields": { "ref": { "en": { "sys": { "id": "R" } } } } }
            ] }
        }))
        .unwrap();

        let tree = walk(&graph, "R", 5).unwrap();
        assert_eq!(tree.nodes.len(), 1);
        let a = &tree.nodes[0];
        assert_eq!(a.entity_id(), Some("A"));
        assert!(!a.is_circular());
        assert!(!a.is_unresolved());

        assert_eq!(a.children.len(), 1);
        let r = &a.children[0];
        assert_eq!(r.entity_id(), Some("R"));
        assert!(r.is_circular());
        assert_eq!(tree.telemetry.circular_reference_count, 1);
    }

    #[test]
    fn test_self_reference_is_circular_at_level_one() {
        let graph = response(
            vec![entry("root", json!({ "me": { "en": link("root") } }))],
            vec![],
        );

        let tree = walk(&graph, "root", 5).unwrap();
        assert!(tree.nodes[0].is_circular());
        assert_eq!(tree.telemetry.circular_reference_count, 1);
    }

    #[test]
    fn test_sibling_branches_do_not_share_visited_lists() {
        let graph = response(
            vec![entry(
                "root",
                json!({
                    "left": { "en": link("L") },
                    "right": { "en": link("R") }
                }),
            )],
            vec![
                entry("L", json!({ "shared": { "en": link("X") } })),
                entry("R", json!({ "shared": { "en": link("X") } })),
                entry("X", json!({ "title": { "en": "x" } })),
            ],
        );

        let tree = walk(&graph, "root", 5).unwrap();
        let xs: Vec<_> = tree
            .iter()
            .filter(|n| n.entity_id() == Some("X"))
            .collect();
        assert_eq!(xs.len(), 2);
        assert!(xs.iter().all(|n| !n.is_circular()));
        assert_eq!(tree.telemetry.circular_reference_count, 0);
    }

    #[test]
    fn test_cycle_in_one_branch_does_not_leak_into_sibling() {
        // left: L -> X -> L (circular); right: R -> X -> L -> X (circular)
        let graph = response(
            vec![entry(
                "root",
                json!({
                    "left": { "en": link("L") },
                    "right": { "en": link("R") }
                }),
            )],
            vec![
                entry("L", json!({ "x": { "en": link("X") } })),
                entry("X", json!({ "back": { "en": link("L") } })),
                entry("R", json!({ "x": { "en": link("X") } })),
            ],
        );

        let tree = walk(&graph, "root", 5).unwrap();

        let left_x = &tree.nodes[0].children[0];
        assert_eq!(left_x.kind, NodeKind::Resolved);
        let left_l = &left_x.children[0];
        assert_eq!(left_l.entity_id(), Some("L"));
        assert!(left_l.is_circular());

        let right_x = &tree.nodes[1].children[0];
        assert_eq!(right_x.kind, NodeKind::Resolved);
        let right_l = &right_x.children[0];
        assert_eq!(right_l.entity_id(), Some("L"));
        assert_eq!(right_l.kind, NodeKind::Resolved);
        let right_x_again = &right_l.children[0];
        assert_eq!(right_x_again.entity_id(), Some("X"));
        assert!(right_x_again.is_circular());

        assert_eq!(tree.telemetry.circular_reference_count, 2);
    }

    #[test]
    fn test_included_entity_without_fields_is_unresolved() {
        let graph = EntityGraph::from_response(&json!({
            "items": [entry("root", json!({ "ref": { "en": link("A") } }))],
            "includes": { "Entry": [{ "sys": { "id": "A", "type": "Entry" } }] }
        }))
        .unwrap();

        let tree = walk(&graph, "root", 5).unwrap();
        assert_eq!(tree.nodes.len(), 1);
        assert_eq!(tree.nodes[0].entity_id(), Some("A"));
        assert!(tree.nodes[0].is_unresolved());
    }

    #[test]
    fn test_asset_link_does_not_resolve_to_entry_with_same_id() {
        let graph = response(
            vec![entry(
                "root",
                json!({ "image": { "en": {
                    "sys": { "type": "Link", "linkType": "Asset", "id": "dup" }
                } } }),
            )],
            vec![entry("dup", json!({ "title": { "en": "an entry" } }))],
        );

        let tree = walk(&graph, "root", 5).unwrap();
        assert!(tree.nodes[0].is_unresolved());
        assert_eq!(
            tree.nodes[0].entity.as_ref().and_then(|l| l.link_type.as_deref()),
            Some("Asset")
        );
    }

    #[test]
    fn test_same_entity_twice_in_one_array_is_not_circular() {
        let graph = response(
            vec![entry("root", json!({ "items": { "en": [link("X"), link("X")] } }))],
            vec![entry("X", json!({}))],
        );

        let tree = walk(&graph, "root", 5).unwrap();
        assert_eq!(tree.nodes.len(), 2);
        assert!(tree.nodes.iter().all(|n| n.kind == NodeKind::Resolved));
    }

    #[test]
    fn test_depth_limit_emits_single_sentinel_per_branch() {
        let graph = response(
            vec![entry("root", json!({ "ref": { "en": link("A") } }))],
            vec![
                entry("A", json!({ "many": { "en": [link("B"), link("C"), link("D")] } })),
                entry("B", json!({})),
                entry("C", json!({})),
                entry("D", json!({})),
            ],
        );

        let tree = walk(&graph, "root", 1).unwrap();
        let a = &tree.nodes[0];
        assert_eq!(a.level, 1);
        assert_eq!(a.children.len(), 1);
        assert!(a.children[0].is_more_sentinel());
        assert_eq!(a.children[0].entity, None);
        assert_eq!(a.children[0].level, 2);

        // Hidden nodes still count
        assert_eq!(tree.telemetry.counts_per_level, vec![1, 3]);
        assert_eq!(tree.telemetry.max_depth_reached, 2);
    }

    #[test]
    fn test_hidden_branches_are_measured() {
        let graph = chain(6);

        let tree = walk(&graph, "root", 2).unwrap();
        assert_eq!(tree.node_count(), 3);
        let sentinels: Vec<_> = tree.iter().filter(|n| n.is_more_sentinel()).collect();
        assert_eq!(sentinels.len(), 1);
        assert_eq!(sentinels[0].level, 3);

        assert_eq!(tree.telemetry.max_depth_reached, 6);
        assert_eq!(tree.telemetry.counts_per_level, vec![1; 6]);
    }

    #[test]
    fn test_leaf_at_max_level_has_no_sentinel() {
        let graph = chain(2);

        let tree = walk(&graph, "root", 2).unwrap();
        assert_eq!(tree.node_count(), 2);
        assert!(tree.iter().all(|n| !n.is_more_sentinel()));
    }

    #[test]
    fn test_failsafe_depth_bounds_traversal() {
        let graph = chain(15);

        let tree = walk(&graph, "root", 50).unwrap();
        assert_eq!(tree.telemetry.max_depth_reached, FAILSAFE_DEPTH);
        assert_eq!(tree.telemetry.counts_per_level.len(), FAILSAFE_DEPTH);
        assert_eq!(tree.node_count(), FAILSAFE_DEPTH);
        assert!(tree.iter().all(|n| !n.is_more_sentinel()));
    }

    #[test]
    fn test_rich_text_inline_attributed_to_field() {
        let graph = response(
            vec![entry(
                "root",
                json!({
                    "title": { "en": "Post" },
                    "body": { "en": {
                        "nodeType": "document",
                        "content": [{
                            "nodeType": "paragraph",
                            "content": [
                                { "nodeType": "text", "value": "see " },
                                { "nodeType": "embedded-entry-inline", "content": [], "data": { "target": link("E") } }
                            ]
                        }]
                    } }
                }),
            )],
            vec![entry("E", json!({}))],
        );

        let tree = walk(&graph, "root", 5).unwrap();
        assert_eq!(tree.nodes.len(), 1);
        let node = &tree.nodes[0];
        let source = node.source.as_ref().unwrap();
        assert_eq!(source.field, "body");
        assert_eq!(source.field_index, 1);
        assert_eq!(source.node_type, Some(crate::graph::NodeType::EmbeddedEntryInline));
        assert_eq!(node.path, "0.1.0.0.1");
    }

    #[test]
    fn test_rich_text_asset_and_entry_blocks() {
        let graph = EntityGraph::from_response(&json!({
            "items": [entry("root", json!({
                "body": { "en": {
                    "nodeType": "document",
                    "content": [
                        { "nodeType": "embedded-asset-block", "content": [],
                          "data": { "target": { "sys": { "type": "Link", "linkType": "Asset", "id": "img" } } } },
                        { "nodeType": "embedded-entry-block", "content": [], "data": { "target": link("card") } }
                    ]
                } }
            }))],
            "includes": {
                "Entry": [entry("card", json!({}))],
                "Asset": [{ "sys": { "id": "img", "type": "Asset" }, "fields": {} }]
            }
        }))
        .unwrap();

        let tree = walk(&graph, "root", 5).unwrap();
        assert_eq!(ids(&tree.nodes), vec!["img", "card"]);
        for node in &tree.nodes {
            assert!(!node.is_circular());
            assert!(!node.is_unresolved());
        }
    }

    #[test]
    fn test_rich_text_cycle_is_detected() {
        let graph = response(
            vec![entry("root", json!({ "ref": { "en": link("A") } }))],
            vec![entry(
                "A",
                json!({ "body": { "en": {
                    "nodeType": "document",
                    "content": [{ "nodeType": "embedded-entry-block", "content": [], "data": { "target": link("A") } }]
                } } }),
            )],
        );

        let tree = walk(&graph, "root", 5).unwrap();
        let nested = &tree.nodes[0].children[0];
        assert_eq!(nested.entity_id(), Some("A"));
        assert!(nested.is_circular());
    }

    #[test]
    fn test_walk_is_idempotent() {
        let graph = response(
            vec![entry(
                "root",
                json!({ "a": { "en": link("A") }, "b": { "en": [link("B"), link("missing")] } }),
            )],
            vec![
                entry("A", json!({ "back": { "en": link("root") } })),
                entry("B", json!({ "a": { "en": link("A") } })),
            ],
        );

        let first = walk(&graph, "root", 2).unwrap();
        let second = walk(&graph, "root", 2).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_walk_all_keeps_traversals_independent() {
        let graph = response(
            vec![
                entry("one", json!({ "ref": { "en": link("shared") } })),
                entry("two", json!({ "ref": { "en": link("shared") } })),
            ],
            vec![entry("shared", json!({ "back": { "en": link("one") } }))],
        );

        let trees = walk_all(&graph, 5).unwrap();
        assert_eq!(trees.len(), 2);
        assert_eq!(trees[0].root.id, "one");
        assert_eq!(trees[1].root.id, "two");
        // one -> shared -> one(circular)
        assert_eq!(trees[0].telemetry.max_depth_reached, 2);
        assert_eq!(trees[0].telemetry.circular_reference_count, 1);
        // two -> shared -> one -> shared(circular)
        assert_eq!(trees[1].telemetry.max_depth_reached, 3);
        assert_eq!(trees[1].telemetry.circular_reference_count, 1);
    }
}
