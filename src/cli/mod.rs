//! CLI command definitions and handlers

pub mod fetch;
pub mod select;
pub mod stats;
pub mod tree;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use rayon::prelude::*;
use tracing::debug;

use crate::cache::{CacheKey, TreeCache};
use crate::core::config::Config;
use crate::core::error::{Error, Result};
use crate::graph::EntityGraph;
use crate::output::OutputFormat;
use crate::walker::ReferenceTree;

const LONG_ABOUT: &str = r#"
Resolve the reference tree of content entries.

Reads a references response (the entry plus everything it links to) and
draws the tree of links below each root entry, marking circular and
missing references. Branches deeper than --max-level collapse into a
"+ more references" line.

QUICK START:
    reftree tree response.json              Draw every root's tree
    reftree tree response.json -r page-1    Draw one root
    reftree stats response.json             Depth and per-level counts
    reftree fetch <ENTRY_ID>                Fetch from the API and draw

CONFIGURATION:
    $REFTREE_HOME/config.toml (or the platform config dir) holds the
    default max level, title fields and API credentials.
    REFTREE_CMA_TOKEN overrides the configured API token.
    REFTREE_LOG controls log output (e.g. REFTREE_LOG=debug).
"#;

/// Message shown when a tree cannot be built or fetched
pub const TOO_COMPLEX_MESSAGE: &str = "The reference tree of this entry is too complex to display. \
Try again with a lower --max-level, or open the linked entries individually.";

/// Reference-tree resolution for content entries
#[derive(Parser, Debug)]
#[command(name = "reftree")]
#[command(author, version)]
#[command(about = "Reference-tree resolution for content entries")]
#[command(long_about = LONG_ABOUT)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Draw the reference tree of each root entry
    #[command(visible_alias = "t")]
    Tree(tree::TreeArgs),

    /// Print depth and per-level reference counts
    Stats(stats::StatsArgs),

    /// List the entities selectable for bulk actions
    Select(select::SelectArgs),

    /// Fetch an entry's references from the API and draw them
    #[command(visible_alias = "f")]
    Fetch(fetch::FetchArgs),
}

// =============================================================================
// SHARED ARGS
// =============================================================================

/// Where the graph comes from and how deep to walk it
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// References response (JSON) to read
    pub file: PathBuf,

    /// Walk only this root entry (default: every item in the response)
    #[arg(short, long)]
    pub root: Option<String>,

    /// Deepest level to show (default: walker.max_level from config)
    #[arg(short = 'l', long)]
    pub max_level: Option<usize>,

    /// Locale for titles (default: titles.default_locale from config)
    #[arg(long)]
    pub locale: Option<String>,
}

/// Output format flags
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct FormatArgs {
    /// JSON output
    #[arg(long, conflicts_with = "plain")]
    pub json: bool,

    /// Plain text output (no colors)
    #[arg(long)]
    pub plain: bool,
}

impl FormatArgs {
    pub fn format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else if self.plain {
            OutputFormat::Plain
        } else {
            OutputFormat::Ascii
        }
    }
}

// =============================================================================
// HELPERS
// =============================================================================

/// A parsed response, the bytes it came from, and the trees walked from it.
///
/// Every command walks through the same cache, so a tree needed twice in one
/// run (e.g. `tree --select`) is walked once.
pub(crate) struct LoadedSource {
    pub source: String,
    pub graph: EntityGraph,
    cache: TreeCache,
}

impl LoadedSource {
    pub fn from_file(path: &Path, config: &Config) -> Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Self::from_source(source, config)
    }

    pub fn from_source(source: String, config: &Config) -> Result<Self> {
        let graph = EntityGraph::from_json_str(&source)?;
        debug!(entities = graph.len(), roots = graph.roots().len(), "Loaded entity graph");
        Ok(Self {
            source,
            graph,
            cache: TreeCache::new(config.cache.capacity),
        })
    }

    /// The requested root, or every root of the response
    pub fn root_ids(&self, root: Option<&str>) -> Result<Vec<String>> {
        match root {
            Some(id) if self.graph.contains(id) => Ok(vec![id.to_string()]),
            Some(id) => Err(Error::EntityNotFound { id: id.to_string() }),
            None if self.graph.roots().is_empty() => Err(Error::InvalidResponse {
                message: "response has no root entities".to_string(),
            }),
            None => Ok(self.graph.roots().to_vec()),
        }
    }

    /// Walk one root, reusing an earlier walk of the same root and level
    pub fn walk_root(&self, root: &str, max_level: usize) -> Result<Arc<ReferenceTree>> {
        let key = CacheKey::new(self.source.as_bytes(), root, max_level);
        self.cache.get_or_walk(key, &self.graph)
    }

    /// Walk each root in parallel
    pub fn walk_roots(&self, roots: &[String], max_level: usize) -> Result<Vec<Arc<ReferenceTree>>> {
        roots
            .par_iter()
            .map(|root| self.walk_root(root, max_level))
            .collect()
    }

    pub fn cached_trees(&self) -> usize {
        self.cache.len()
    }
}

/// Requested level, falling back to the configured default
pub(crate) fn resolve_max_level(requested: Option<usize>, config: &Config) -> usize {
    requested.unwrap_or(config.walker.max_level)
}
