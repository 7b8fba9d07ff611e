//! Fetch command implementation
//!
//! Fetches an entry's references from the management API, then draws the
//! tree the same way `reftree tree` does. Timeouts and oversized responses
//! print the "too complex" message instead of failing.
//!
//! @module cli/fetch

use std::path::PathBuf;

use clap::Args;
use tracing::{info, warn};

use super::{tree, FormatArgs, LoadedSource, SourceArgs, TOO_COMPLEX_MESSAGE};
use crate::core::config::Config;
use crate::core::error::Result;
use crate::fetch::ReferencesClient;

/// Arguments for the fetch command
#[derive(Args, Debug)]
#[command(after_help = "EXAMPLES:
    reftree fetch 5KsDBWseXY6QegucYAoacS          Draw the entry's tree
    reftree fetch 5KsDBWseXY6QegucYAoacS -l 2     Collapse below level 2
    reftree fetch 5KsDBWseXY6QegucYAoacS --json   JSON output

Requires api.space_id in config.toml and a token (api.token or
REFTREE_CMA_TOKEN).")]
pub struct FetchArgs {
    /// Entry to fetch references for
    pub entry_id: String,

    /// Deepest level to show (default: walker.max_level from config)
    #[arg(short = 'l', long)]
    pub max_level: Option<usize>,

    /// Locale for titles (default: titles.default_locale from config)
    #[arg(long)]
    pub locale: Option<String>,

    #[command(flatten)]
    pub format: FormatArgs,
}

pub async fn run(args: FetchArgs, config: &Config) -> Result<()> {
    let client = ReferencesClient::new(config.api.clone())?;

    let body = match client.fetch_references(&args.entry_id).await {
        Ok(body) => body,
        Err(e) if e.is_fallback() => {
            warn!(entry_id = %args.entry_id, error = %e, "Could not fetch references");
            println!("{}", TOO_COMPLEX_MESSAGE);
            return Ok(());
        }
        Err(e) => return Err(e),
    };
    info!(entry_id = %args.entry_id, bytes = body.len(), "Fetched references");

    let loaded = LoadedSource::from_source(body, config)?;
    let source = SourceArgs {
        file: PathBuf::new(),
        root: Some(args.entry_id),
        max_level: args.max_level,
        locale: args.locale,
    };
    print!("{}", tree::render(&loaded, &source, args.format.format(), config)?);
    Ok(())
}
