//! Select command implementation
//!
//! Lists the entities a bulk action (validate, publish) could target from
//! each root's tree: the root itself plus every visible entity that exists.
//! With `--check` or `--all` only the checked entities are listed.
//!
//! @module cli/select

use clap::Args;
use tracing::warn;

use super::{resolve_max_level, FormatArgs, LoadedSource, SourceArgs};
use crate::core::config::Config;
use crate::core::error::Result;
use crate::output::{create_formatter, OutputFormat};
use crate::selection::{selectable_entities, Selection};
use crate::title::TitleResolver;

/// Arguments for the select command
#[derive(Args, Debug)]
#[command(after_help = "EXAMPLES:
    reftree select response.json -r page-1             Entities under page-1
    reftree select response.json --plain               Tab-separated rows
    reftree select response.json --check a --check b   Only a and b
    reftree select response.json --all --json          Everything, as JSON")]
pub struct SelectArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub checks: CheckArgs,

    #[command(flatten)]
    pub format: FormatArgs,
}

/// Which selectable entities to keep
#[derive(Args, Debug, Clone, Default)]
pub struct CheckArgs {
    /// Check this entity (repeatable)
    #[arg(long = "check", value_name = "ID")]
    pub ids: Vec<String>,

    /// Check every selectable entity
    #[arg(long, conflicts_with = "ids")]
    pub all: bool,
}

impl CheckArgs {
    fn is_active(&self) -> bool {
        self.all || !self.ids.is_empty()
    }

    /// Checked state for one tree; IDs the tree cannot select are skipped
    fn apply(&self, mut selection: Selection) -> Selection {
        if self.all {
            selection.select_all();
        }
        for id in &self.ids {
            if selection.is_selected(id) {
                continue;
            }
            if !selection.toggle(id) {
                warn!(id = %id, "Entity is not selectable from this tree");
            }
        }
        selection
    }
}

pub fn run(args: SelectArgs, config: &Config) -> Result<()> {
    let loaded = LoadedSource::from_file(&args.source.file, config)?;
    let output = render(&loaded, &args.source, &args.checks, args.format.format(), config)?;
    print!("{}", output);
    Ok(())
}

/// Selectable entities of every requested root, one block per root
pub(crate) fn render(
    loaded: &LoadedSource,
    source: &SourceArgs,
    checks: &CheckArgs,
    format: OutputFormat,
    config: &Config,
) -> Result<String> {
    let max_level = resolve_max_level(source.max_level, config);
    let locale = source
        .locale
        .clone()
        .unwrap_or_else(|| config.titles.default_locale.clone());
    let titles = TitleResolver::from_config(&config.titles);
    let formatter = create_formatter(format);

    let roots = loaded.root_ids(source.root.as_deref())?;
    let blocks: Vec<String> = loaded
        .walk_roots(&roots, max_level)?
        .iter()
        .map(|tree| {
            let mut entities = selectable_entities(tree, &loaded.graph, &titles, &locale);
            if checks.is_active() {
                let selection = checks.apply(Selection::new(tree));
                entities.retain(|entity| selection.is_selected(&entity.id));
            }
            formatter.format_selection(&tree.root.id, &entities)
        })
        .collect();

    Ok(match format {
        OutputFormat::Json => format!("[{}]\n", blocks.join(",")),
        OutputFormat::Ascii => blocks.join("\n"),
        OutputFormat::Plain => blocks.concat(),
    })
}
