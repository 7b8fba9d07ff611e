//! Entity Graph - resolved content entities and their links
//!
//! The walker consumes this model; it never sees raw JSON.
//!
//! @module graph

pub mod index;
pub mod ingest;
pub mod types;

pub use index::EntityGraph;
pub use types::{
    Document, Entity, EntityType, Field, FieldValue, Link, LocalizedValue, NodeType,
    RichTextNode, Sys,
};
