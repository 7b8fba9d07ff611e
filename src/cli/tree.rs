//! Tree command implementation
//!
//! Provides the `reftree tree` CLI command: walk each root of a references
//! response and draw its reference tree.
//!
//! @module cli/tree

use clap::Args;

use super::select::{self, CheckArgs};
use super::{resolve_max_level, FormatArgs, LoadedSource, SourceArgs};
use crate::analytics::ReferencesAnalytics;
use crate::core::config::Config;
use crate::core::error::Result;
use crate::output::{create_formatter, OutputFormat, RenderedTree, TreeView};
use crate::title::TitleResolver;

/// Arguments for the tree command
#[derive(Args, Debug)]
#[command(after_help = "EXAMPLES:
    reftree tree response.json                 Every root, configured depth
    reftree tree response.json -r page-1       One root
    reftree tree response.json -l 2            Collapse below level 2
    reftree tree response.json --locale de-DE  German titles
    reftree tree response.json --select        Tree plus selectable entities
    reftree tree response.json --json          JSON output")]
pub struct TreeArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Also list the entities selectable from each tree
    #[arg(long, conflicts_with = "json")]
    pub select: bool,

    #[command(flatten)]
    pub format: FormatArgs,
}

pub fn run(args: TreeArgs, config: &Config) -> Result<()> {
    let loaded = LoadedSource::from_file(&args.source.file, config)?;
    let format = args.format.format();
    let mut output = render(&loaded, &args.source, format, config)?;
    if args.select {
        // Same roots and level, so the trees come from the cache
        output.push('\n');
        output.push_str(&select::render(
            &loaded,
            &args.source,
            &CheckArgs::default(),
            format,
            config,
        )?);
    }
    print!("{}", output);
    Ok(())
}

/// Walk the requested roots and format every tree
pub(crate) fn render(
    loaded: &LoadedSource,
    source: &SourceArgs,
    format: OutputFormat,
    config: &Config,
) -> Result<String> {
    let max_level = resolve_max_level(source.max_level, config);
    let locale = source
        .locale
        .clone()
        .unwrap_or_else(|| config.titles.default_locale.clone());
    let titles = TitleResolver::from_config(&config.titles);

    let roots = loaded.root_ids(source.root.as_deref())?;
    let trees = loaded.walk_roots(&roots, max_level)?;

    let rendered: Vec<RenderedTree> = trees
        .iter()
        .map(|tree| {
            ReferencesAnalytics::from_tree(tree).emit();
            TreeView {
                tree: tree.as_ref(),
                graph: &loaded.graph,
                titles: &titles,
                locale: &locale,
            }
            .render()
        })
        .collect();

    let formatter = create_formatter(format);
    if format == OutputFormat::Json {
        // One JSON document for all roots
        let body: Vec<String> = rendered.iter().map(|t| formatter.format_tree(t)).collect();
        return Ok(format!("[{}]\n", body.join(",")));
    }

    Ok(rendered
        .iter()
        .map(|tree| formatter.format_tree(tree))
        .collect::<Vec<_>>()
        .join("\n"))
}
