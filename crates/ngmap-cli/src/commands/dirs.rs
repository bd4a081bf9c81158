//! Dirs command - Directory listing of the workspace

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use ngmap_config::NgmapConfig;
use ngmap_core::export::markdown::directory_structure;
use ngmap_core::SourceDiscovery;

use super::{discovery_config, load_config, resolve_workspace, write_report, OutputArgs};
use crate::GlobalOptions;

/// Arguments for the dirs command
#[derive(Args, Debug)]
pub struct DirsArgs {
    #[command(flatten)]
    output: OutputArgs,
}

/// Directory listing text for the workspace.
pub fn generate(workspace: &Path, config: &NgmapConfig) -> Result<String> {
    let discovery = SourceDiscovery::new(workspace, discovery_config(config))
        .context("Failed to open workspace")?;
    Ok(directory_structure(workspace, &discovery.list_directories()))
}

/// Execute the dirs command
pub fn execute(args: DirsArgs, global: GlobalOptions) -> Result<()> {
    let workspace = resolve_workspace(&global)?;
    let config = load_config(&global, &workspace)?;

    let listing = generate(&workspace, &config)?;
    write_report(
        &args.output,
        config.output_path(&workspace, &config.output.directories),
        &listing,
        global.quiet,
    )
}
