//! Imports command - How often each module specifier is imported

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use ngmap_config::NgmapConfig;
use ngmap_core::count_imports;
use ngmap_core::export::markdown::import_census;

use super::{discovery_config, load_config, resolve_workspace, write_report, OutputArgs};
use crate::progress::{finish_spinner, spinner};
use crate::GlobalOptions;

/// Arguments for the imports command
#[derive(Args, Debug)]
pub struct ImportsArgs {
    #[command(flatten)]
    output: OutputArgs,
}

/// Import census text for the workspace.
pub fn generate(workspace: &Path, config: &NgmapConfig, quiet: bool) -> Result<String> {
    let pb = spinner("Counting imports...", quiet);
    let counts =
        count_imports(workspace, discovery_config(config)).context("Failed to scan workspace")?;
    finish_spinner(pb, &format!("Found {} distinct imports", counts.len()));
    Ok(import_census(workspace, &counts))
}

/// Execute the imports command
pub fn execute(args: ImportsArgs, global: GlobalOptions) -> Result<()> {
    let workspace = resolve_workspace(&global)?;
    let config = load_config(&global, &workspace)?;

    let census = generate(&workspace, &config, global.quiet)?;
    write_report(
        &args.output,
        config.output_path(&workspace, &config.output.imports),
        &census,
        global.quiet,
    )
}
