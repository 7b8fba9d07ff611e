//! Entity selection for bulk actions
//!
//! The rendered tree lets a user pick entities to validate or publish in
//! one batch. Only entities that actually exist and are visible in the tree
//! can be picked; unresolved links and "more" sentinels cannot.

use std::collections::HashSet;

use serde::Serialize;

use crate::graph::{EntityGraph, Link};
use crate::title::TitleResolver;
use crate::walker::{NodeKind, ReferenceTree};

/// An entity offered for selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectableEntity {
    pub id: String,
    pub entity_type: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

/// Deduplicated links selectable from `tree`: the root first, then every
/// visible resolved or circular node in document order
pub fn selectable_links(tree: &ReferenceTree) -> Vec<Link> {
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    if seen.insert(tree.root.id.clone()) {
        links.push(tree.root.clone());
    }

    for node in tree.iter() {
        if !matches!(node.kind, NodeKind::Resolved | NodeKind::Circular) {
            continue;
        }
        if let Some(link) = &node.entity {
            if seen.insert(link.id.clone()) {
                links.push(link.clone());
            }
        }
    }

    links
}

/// Selectable entities with display details
pub fn selectable_entities(
    tree: &ReferenceTree,
    graph: &EntityGraph,
    titles: &TitleResolver,
    locale: &str,
) -> Vec<SelectableEntity> {
    selectable_links(tree)
        .into_iter()
        .filter_map(|link| graph.resolve(&link))
        .map(|entity| SelectableEntity {
            id: entity.sys.id.clone(),
            entity_type: entity.sys.entity_type.to_string(),
            title: titles.title(entity, locale),
            content_type: entity.sys.content_type.clone(),
        })
        .collect()
}

/// Checked state over a tree's selectable entities
#[derive(Debug, Clone)]
pub struct Selection {
    available: Vec<Link>,
    checked: HashSet<String>,
}

impl Selection {
    pub fn new(tree: &ReferenceTree) -> Self {
        Self {
            available: selectable_links(tree),
            checked: HashSet::new(),
        }
    }

    /// Toggle an entity; returns whether it is now selected.
    /// IDs that are not selectable are ignored.
    pub fn toggle(&mut self, id: &str) -> bool {
        if !self.available.iter().any(|link| link.id == id) {
            return false;
        }
        if !self.checked.remove(id) {
            self.checked.insert(id.to_string());
            return true;
        }
        false
    }

    pub fn select_all(&mut self) {
        self.checked = self.available.iter().map(|link| link.id.clone()).collect();
    }

    pub fn clear(&mut self) {
        self.checked.clear();
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.checked.contains(id)
    }

    /// Selected links in tree order
    pub fn selected(&self) -> Vec<&Link> {
        self.available
            .iter()
            .filter(|link| self.checked.contains(&link.id))
            .collect()
    }

    pub fn available(&self) -> &[Link] {
        &self.available
    }
}
