//! Entity Graph Arena
//!
//! Resolved entities keyed by ID. Links are resolved by lookup, so cyclic
//! content (A -> B -> A) is representable without shared ownership.
//!
//! @module graph/index

use std::collections::HashMap;

use super::types::{Entity, EntityType, Link};

/// Arena of resolved entities plus the ordered list of traversal roots
#[derive(Debug, Clone, Default)]
pub struct EntityGraph {
    entities: HashMap<String, Entity>,
    roots: Vec<String>,
}

impl EntityGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity. The first registration of an ID wins.
    ///
    /// Returns `false` when the ID was already present.
    pub fn insert(&mut self, entity: Entity) -> bool {
        if self.entities.contains_key(entity.id()) {
            return false;
        }
        self.entities.insert(entity.sys.id.clone(), entity);
        true
    }

    /// Mark an entity as a traversal root (response `items` order)
    pub fn add_root(&mut self, id: impl Into<String>) {
        let id = id.into();
        if !self.roots.contains(&id) {
            self.roots.push(id);
        }
    }

    pub fn get(&self, id: &str) -> Option<&Entity> {
        self.entities.get(id)
    }

    /// Resolve a link; `None` means the link is unresolved.
    ///
    /// A typed link only resolves to an entity of the same type, so an
    /// `Asset` link never lands on an entry that shares its ID.
    pub fn resolve(&self, link: &Link) -> Option<&Entity> {
        let entity = self.entities.get(&link.id)?;
        match link.link_type.as_deref() {
            Some(link_type) if EntityType::parse(link_type) != entity.sys.entity_type => None,
            _ => Some(entity),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entities.contains_key(id)
    }

    pub fn roots(&self) -> &[String] {
        &self.roots
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::types::{EntityType, Sys};

    fn entity(id: &str, content_type: &str) -> Entity {
        Entity {
            sys: Sys {
                id: id.to_string(),
                entity_type: EntityType::Entry,
                content_type: Some(content_type.to_string()),
            },
            fields: Vec::new(),
        }
    }

    #[test]
    fn test_first_registration_wins() {
        let mut graph = EntityGraph::new();
        assert!(graph.insert(entity("a", "first")));
        assert!(!graph.insert(entity("a", "second")));

        assert_eq!(graph.len(), 1);
        assert_eq!(
            graph.get("a").unwrap().sys.content_type.as_deref(),
            Some("first")
        );
    }

    #[test]
    fn test_resolve_missing_link() {
        let mut graph = EntityGraph::new();
        graph.insert(entity("a", "page"));

        assert!(graph.resolve(&Link::entry("a")).is_some());
        assert!(graph.resolve(&Link::entry("missing")).is_none());
    }

    #[test]
    fn test_typed_link_must_match_entity_type() {
        let mut graph = EntityGraph::new();
        graph.insert(entity("shared", "page"));

        assert!(graph.resolve(&Link::entry("shared")).is_some());
        assert!(graph.resolve(&Link::new("shared", None)).is_some());
        assert!(graph.resolve(&Link::asset("shared")).is_none());
    }

    #[test]
    fn test_roots_are_deduplicated_in_order() {
        let mut graph = EntityGraph::new();
        graph.add_root("b");
        graph.add_root("a");
        graph.add_root("b");

        assert_eq!(graph.roots(), &["b".to_string(), "a".to_string()]);
    }
}
