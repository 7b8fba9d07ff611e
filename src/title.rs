//! Display titles for entities
//!
//! Tries the configured title fields in order, falling back from the
//! requested locale to the default locale and then to any locale present.
//! Assets without a title use their file name.

use serde_json::Value;

use crate::core::config::TitlesConfig;
use crate::graph::{Entity, EntityGraph, EntityType, FieldValue};
use crate::walker::{NodeKind, ReferenceNode};

pub const UNTITLED: &str = "Untitled";
pub const MISSING: &str = "Missing or inaccessible";
pub const MORE_REFERENCES: &str = "+ more references";

#[derive(Debug, Clone)]
pub struct TitleResolver {
    default_locale: String,
    fields: Vec<String>,
}

impl TitleResolver {
    pub fn new(default_locale: impl Into<String>, fields: Vec<String>) -> Self {
        Self {
            default_locale: default_locale.into(),
            fields,
        }
    }

    pub fn from_config(config: &TitlesConfig) -> Self {
        Self::new(config.default_locale.clone(), config.fields.clone())
    }

    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    pub fn title(&self, entity: &Entity, locale: &str) -> String {
        if let Some(title) = self
            .fields
            .iter()
            .find_map(|name| self.localized_text(entity, name, locale))
        {
            return title;
        }

        if entity.sys.entity_type == EntityType::Asset {
            if let Some(file_name) = self.asset_file_name(entity, locale) {
                return file_name;
            }
        }

        UNTITLED.to_string()
    }

    /// Label for a tree node, looking the entity up in `graph`
    pub fn node_label(&self, graph: &EntityGraph, node: &ReferenceNode, locale: &str) -> String {
        match node.kind {
            NodeKind::More => MORE_REFERENCES.to_string(),
            NodeKind::Unresolved => MISSING.to_string(),
            NodeKind::Resolved | NodeKind::Circular => node
                .entity
                .as_ref()
                .and_then(|link| graph.resolve(link))
                .map(|entity| self.title(entity, locale))
                .unwrap_or_else(|| MISSING.to_string()),
        }
    }

    fn localized_text(&self, entity: &Entity, name: &str, locale: &str) -> Option<String> {
        let field = entity.field(name)?;
        [locale, self.default_locale.as_str()]
            .iter()
            .find_map(|l| field.value(l).and_then(as_text))
            .or_else(|| field.locales.iter().find_map(|l| as_text(&l.value)))
    }

    fn asset_file_name(&self, entity: &Entity, locale: &str) -> Option<String> {
        let field = entity.field("file")?;
        let file = field
            .value(locale)
            .or_else(|| field.value(&self.default_locale))
            .or_else(|| field.locales.first().map(|l| &l.value))?;
        match file {
            FieldValue::Scalar(value) => value
                .get("fileName")
                .and_then(Value::as_str)
                .map(str::to_string),
            _ => None,
        }
    }
}

impl Default for TitleResolver {
    fn default() -> Self {
        Self::from_config(&TitlesConfig::default())
    }
}

fn as_text(value: &FieldValue) -> Option<String> {
    match value {
        FieldValue::Scalar(Value::String(s)) if !s.trim().is_empty() => Some(s.clone()),
        FieldValue::Scalar(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}
