//! Response Ingestion
//!
//! Turns raw API JSON into an [`EntityGraph`]:
//! - `{ items, includes: { Entry, Asset } }` responses are merged into the arena
//! - single entities may nest their references inline; nested objects that
//!   carry `fields` are registered as entities too
//! - field values are classified into [`FieldValue`] variants once, here
//!
//! Malformed shapes are never an error at this level. Anything that is not
//! recognisable as a reference is kept as a scalar.
//!
//! @module graph/ingest

use serde_json::{Map, Value};
use tracing::debug;

use super::index::EntityGraph;
use super::types::{
    Document, Entity, EntityType, Field, FieldValue, Link, LocalizedValue, NodeType,
    RichTextNode, Sys,
};
use crate::core::error::{Error, Result};

/// Include sections merged from a response, in order
const INCLUDE_SECTIONS: &[&str] = &["Entry", "Asset"];

impl EntityGraph {
    /// Parse JSON text, accepting either a collection response or a single entity
    pub fn from_json_str(source: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(source)?;
        Self::from_value(&value)
    }

    /// Build a graph from an already-parsed JSON document
    pub fn from_value(value: &Value) -> Result<Self> {
        let object = value.as_object().ok_or_else(|| Error::InvalidResponse {
            message: "expected a JSON object at the top level".to_string(),
        })?;

        if object.contains_key("items") {
            Self::from_response(value)
        } else if object.contains_key("sys") {
            Self::from_entity(value)
        } else {
            Err(Error::InvalidResponse {
                message: "expected either `items` or `sys` at the top level".to_string(),
            })
        }
    }

    /// Merge a collection response's `items` and `includes` into one graph
    pub fn from_response(value: &Value) -> Result<Self> {
        let items = value
            .get("items")
            .and_then(Value::as_array)
            .ok_or_else(|| Error::InvalidResponse {
                message: "`items` must be an array".to_string(),
            })?;

        let mut graph = EntityGraph::new();

        for item in items {
            match ingest_entity(&mut graph, item, true) {
                Some(link) => graph.add_root(link.id),
                None => debug!("Skipping item without sys.id"),
            }
        }

        if let Some(includes) = value.get("includes").and_then(Value::as_object) {
            for section in INCLUDE_SECTIONS {
                let Some(entities) = includes.get(*section).and_then(Value::as_array) else {
                    continue;
                };
                // Included entities only resolve links when they carry `fields`
                for entity in entities {
                    match ingest_entity(&mut graph, entity, false) {
                        None => debug!(section = *section, "Skipping included entity without sys.id"),
                        Some(link) if !graph.contains(&link.id) => debug!(
                            section = *section,
                            id = %link.id,
                            "Included entity has no fields, leaving it unresolved"
                        ),
                        Some(_) => {}
                    }
                }
            }
        }

        debug!(
            roots = graph.roots().len(),
            entities = graph.len(),
            "Ingested response"
        );
        Ok(graph)
    }

    /// Ingest one (possibly nested) entity and make it the only root
    pub fn from_entity(value: &Value) -> Result<Self> {
        let mut graph = EntityGraph::new();
        let link = ingest_entity(&mut graph, value, true).ok_or_else(|| Error::InvalidResponse {
            message: "root entity has no sys.id".to_string(),
        })?;
        graph.add_root(link.id);
        Ok(graph)
    }
}

// =============================================================================
// ENTITIES
// =============================================================================

/// Register `value` if it is a resolved entity and return a link to it.
///
/// Roots (response items, the single entity) are registered even without
/// `fields`; everything else only when it carries `fields`.
fn ingest_entity(graph: &mut EntityGraph, value: &Value, is_root: bool) -> Option<Link> {
    let sys = value.get("sys")?.as_object()?;
    let id = sys.get("id")?.as_str()?;
    let type_name = sys.get("type").and_then(Value::as_str);
    let fields = value.get("fields").and_then(Value::as_object);

    let entity_type = match (type_name, fields) {
        (Some(name), _) => EntityType::parse(name),
        (None, Some(_)) => EntityType::Entry,
        (None, None) if is_root => EntityType::Entry,
        (None, None) => EntityType::Link,
    };

    if entity_type == EntityType::Link || (fields.is_none() && !is_root) {
        let link_type = sys
            .get("linkType")
            .and_then(Value::as_str)
            .or_else(|| type_name.filter(|name| *name != "Link"));
        return Some(Link::new(id, link_type));
    }

    let content_type = sys
        .get("contentType")
        .and_then(|ct| ct.get("sys"))
        .and_then(|s| s.get("id"))
        .and_then(Value::as_str)
        .map(str::to_string);

    let fields = fields
        .map(|fields| ingest_fields(graph, fields))
        .unwrap_or_default();

    graph.insert(Entity {
        sys: Sys {
            id: id.to_string(),
            entity_type,
            content_type,
        },
        fields,
    });

    Some(Link::new(id, Some(entity_type.as_str())))
}

fn ingest_fields(graph: &mut EntityGraph, fields: &Map<String, Value>) -> Vec<Field> {
    fields
        .iter()
        .map(|(name, locales)| {
            let locales = match locales.as_object() {
                Some(locales) => locales
                    .iter()
                    .map(|(locale, value)| LocalizedValue {
                        locale: locale.clone(),
                        value: classify(graph, value),
                    })
                    .collect(),
                None => {
                    debug!(field = %name, "Field is not keyed by locale, skipping");
                    Vec::new()
                }
            };
            Field {
                name: name.clone(),
                locales,
            }
        })
        .collect()
}

// =============================================================================
// FIELD CLASSIFICATION
// =============================================================================

fn is_link_like(value: &Value) -> bool {
    value.get("sys").map_or(false, Value::is_object)
}

fn classify(graph: &mut EntityGraph, value: &Value) -> FieldValue {
    match value {
        Value::Object(map) if map.contains_key("sys") => match ingest_entity(graph, value, false) {
            Some(link) => FieldValue::SingleRef(link),
            None => FieldValue::Scalar(value.clone()),
        },
        Value::Object(map) if map.get("content").map_or(false, Value::is_array) => {
            FieldValue::RichText(ingest_document(graph, map))
        }
        Value::Array(items) if items.iter().any(is_link_like) => FieldValue::RefArray(
            items
                .iter()
                .filter(|item| is_link_like(item))
                .filter_map(|item| ingest_entity(graph, item, false))
                .collect(),
        ),
        other => FieldValue::Scalar(other.clone()),
    }
}

// =============================================================================
// RICH TEXT
// =============================================================================

fn ingest_document(graph: &mut EntityGraph, document: &Map<String, Value>) -> Document {
    Document {
        content: ingest_nodes(graph, document.get("content")),
    }
}

fn ingest_nodes(graph: &mut EntityGraph, content: Option<&Value>) -> Vec<RichTextNode> {
    content
        .and_then(Value::as_array)
        .map(|nodes| {
            nodes
                .iter()
                .filter_map(|node| ingest_node(graph, node))
                .collect()
        })
        .unwrap_or_default()
}

fn ingest_node(graph: &mut EntityGraph, value: &Value) -> Option<RichTextNode> {
    let node = value.as_object()?;
    let node_type = NodeType::parse(node.get("nodeType").and_then(Value::as_str).unwrap_or(""));
    let content = ingest_nodes(graph, node.get("content"));
    let target = node
        .get("data")
        .and_then(|data| data.get("target"))
        .and_then(|target| ingest_entity(graph, target, false));

    Some(RichTextNode {
        node_type,
        content,
        target,
    })
}
