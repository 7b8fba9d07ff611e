//! Entity Graph Data Structures
//!
//! Resolved entities, links between them, and the tagged field values the
//! walker dispatches on. Field values are classified once at ingestion so
//! traversal never has to sniff JSON shapes.
//!
//! @module graph/types

use serde::Serialize;
use serde_json::Value;

// =============================================================================
// ENTITY TYPE
// =============================================================================

/// The `sys.type` of an entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EntityType {
    Entry,
    Asset,
    /// Bare link that was never resolved
    Link,
}

impl EntityType {
    /// Parse a `sys.type` value; unknown types are treated as entries
    pub fn parse(value: &str) -> Self {
        match value {
            "Asset" => Self::Asset,
            "Link" => Self::Link,
            _ => Self::Entry,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Entry => "Entry",
            Self::Asset => "Asset",
            Self::Link => "Link",
        }
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// =============================================================================
// SYS / LINK
// =============================================================================

/// System metadata of a resolved entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sys {
    pub id: String,
    pub entity_type: EntityType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

/// A pointer to another entity, resolved through the graph arena
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Link {
    pub id: String,
    /// `Entry` or `Asset` when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_type: Option<String>,
}

impl Link {
    pub fn new(id: impl Into<String>, link_type: Option<&str>) -> Self {
        Self {
            id: id.into(),
            link_type: link_type.map(str::to_string),
        }
    }

    pub fn entry(id: impl Into<String>) -> Self {
        Self::new(id, Some("Entry"))
    }

    pub fn asset(id: impl Into<String>) -> Self {
        Self::new(id, Some("Asset"))
    }
}

// =============================================================================
// RICH TEXT
// =============================================================================

/// Rich-text node types
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeType {
    EmbeddedAssetBlock,
    EmbeddedEntryBlock,
    EmbeddedEntryInline,
    EntryHyperlink,
    Other(String),
}

impl NodeType {
    pub fn parse(value: &str) -> Self {
        match value {
            "embedded-asset-block" => Self::EmbeddedAssetBlock,
            "embedded-entry-block" => Self::EmbeddedEntryBlock,
            "embedded-entry-inline" => Self::EmbeddedEntryInline,
            "entry-hyperlink" => Self::EntryHyperlink,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::EmbeddedAssetBlock => "embedded-asset-block",
            Self::EmbeddedEntryBlock => "embedded-entry-block",
            Self::EmbeddedEntryInline => "embedded-entry-inline",
            Self::EntryHyperlink => "entry-hyperlink",
            Self::Other(other) => other,
        }
    }

    /// Only these four node types carry a reference in `data.target`
    pub fn is_reference(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl Serialize for NodeType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// A node inside a rich-text document
#[derive(Debug, Clone, PartialEq)]
pub struct RichTextNode {
    pub node_type: NodeType,
    pub content: Vec<RichTextNode>,
    /// `data.target`, kept only when it is link-like
    pub target: Option<Link>,
}

/// A rich-text field value (`nodeType: "document"`)
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub content: Vec<RichTextNode>,
}

// =============================================================================
// FIELD VALUES
// =============================================================================

/// Tagged field value
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Anything that is not a reference (strings, numbers, arrays of scalars, ...)
    Scalar(Value),
    SingleRef(Link),
    RefArray(Vec<Link>),
    RichText(Document),
}

impl FieldValue {
    pub fn is_reference(&self) -> bool {
        !matches!(self, FieldValue::Scalar(_))
    }
}

/// One locale's value of a field
#[derive(Debug, Clone, PartialEq)]
pub struct LocalizedValue {
    pub locale: String,
    pub value: FieldValue,
}

/// A named field with its per-locale values, in document order
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub locales: Vec<LocalizedValue>,
}

impl Field {
    pub fn value(&self, locale: &str) -> Option<&FieldValue> {
        self.locales
            .iter()
            .find(|l| l.locale == locale)
            .map(|l| &l.value)
    }
}

// =============================================================================
// ENTITY
// =============================================================================

/// A resolved entry or asset
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub sys: Sys,
    pub fields: Vec<Field>,
}

impl Entity {
    pub fn id(&self) -> &str {
        &self.sys.id
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Scalar value of a field in a given locale
    pub fn scalar(&self, name: &str, locale: &str) -> Option<&Value> {
        match self.field(name)?.value(locale)? {
            FieldValue::Scalar(value) => Some(value),
            _ => None,
        }
    }

    /// Link pointing at this entity
    pub fn link(&self) -> Link {
        Link::new(self.sys.id.clone(), Some(self.sys.entity_type.as_str()))
    }

    /// Whether any field holds a reference
    pub fn has_references(&self) -> bool {
        self.fields
            .iter()
            .flat_map(|f| f.locales.iter())
            .any(|l| l.value.is_reference())
    }
}
