//! Packages command - Dependency tables from every package.json

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use ngmap_config::NgmapConfig;
use ngmap_core::collect_packages;
use ngmap_core::export::markdown::packages_markdown;

use super::{discovery_config, load_config, print_info, report_issues, resolve_workspace};
use super::{write_report, OutputArgs};
use crate::progress::{finish_scan, spinner};
use crate::GlobalOptions;

/// Arguments for the packages command
#[derive(Args, Debug)]
pub struct PackagesArgs {
    #[command(flatten)]
    output: OutputArgs,
}

/// package.json tables for the workspace.
pub fn generate(workspace: &Path, config: &NgmapConfig, quiet: bool) -> Result<String> {
    let pb = spinner("Reading package.json files...", quiet);
    let summary = collect_packages(workspace, discovery_config(config))
        .context("Failed to scan workspace")?;
    finish_scan(
        pb,
        &format!(
            "Found {} dependencies, {} dev dependencies, {} peer dependencies",
            summary.dependencies.len(),
            summary.dev_dependencies.len(),
            summary.peer_dependencies.len()
        ),
        summary.issues.len(),
    );
    report_issues("package.json files", &summary.issues);
    if summary.is_empty() {
        print_info("No dependencies found", quiet);
    }
    Ok(packages_markdown(&summary))
}

/// Execute the packages command
pub fn execute(args: PackagesArgs, global: GlobalOptions) -> Result<()> {
    let workspace = resolve_workspace(&global)?;
    let config = load_config(&global, &workspace)?;

    let markdown = generate(&workspace, &config, global.quiet)?;
    write_report(
        &args.output,
        config.output_path(&workspace, &config.output.packages),
        &markdown,
        global.quiet,
    )
}
