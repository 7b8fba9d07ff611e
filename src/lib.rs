//! reftree - Reference-tree resolution for content entries
//!
//! Turns a references response (entries, assets and the links between them)
//! into a depth-limited tree per root entry, marking circular and missing
//! links and counting references per level.

pub mod analytics;
pub mod cache;
pub mod cli;
pub mod core;
pub mod fetch;
pub mod graph;
pub mod output;
pub mod selection;
pub mod title;
pub mod walker;

pub use core::config::Config;
pub use core::error::{Error, Result};
pub use graph::EntityGraph;
pub use walker::{walk, walk_all, ReferenceTree};
