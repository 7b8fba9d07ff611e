//! Stats command implementation
//!
//! @module cli/stats

use clap::Args;

use super::{resolve_max_level, FormatArgs, LoadedSource, SourceArgs};
use crate::analytics::ReferencesAnalytics;
use crate::core::config::Config;
use crate::core::error::Result;
use crate::output::create_formatter;

/// Arguments for the stats command
#[derive(Args, Debug)]
#[command(after_help = "EXAMPLES:
    reftree stats response.json            Depth and counts for every root
    reftree stats response.json -l 10      Count up to level 10
    reftree stats response.json --json     JSON output")]
pub struct StatsArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub format: FormatArgs,
}

pub fn run(args: StatsArgs, config: &Config) -> Result<()> {
    let loaded = LoadedSource::from_file(&args.source.file, config)?;
    let records = collect(&loaded, &args.source, config)?;
    print!("{}", create_formatter(args.format.format()).format_stats(&records));
    Ok(())
}

pub(crate) fn collect(
    loaded: &LoadedSource,
    source: &SourceArgs,
    config: &Config,
) -> Result<Vec<ReferencesAnalytics>> {
    let max_level = resolve_max_level(source.max_level, config);
    let roots = loaded.root_ids(source.root.as_deref())?;

    let records = loaded
        .walk_roots(&roots, max_level)?
        .iter()
        .map(|tree| ReferencesAnalytics::from_tree(tree))
        .collect();
    Ok(records)
}
