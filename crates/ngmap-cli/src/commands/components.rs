//! Components command - Component hierarchy as a Mermaid diagram

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use ngmap_config::NgmapConfig;
use ngmap_core::export::markdown::component_hierarchy_markdown;
use ngmap_core::{scan_components, ComponentReport};

use super::{discovery_config, load_config, print_info, report_issues, resolve_workspace};
use super::{write_report, OutputArgs};
use crate::progress::{finish_scan, spinner};
use crate::GlobalOptions;

/// Arguments for the components command
#[derive(Args, Debug)]
pub struct ComponentsArgs {
    #[command(flatten)]
    output: OutputArgs,
}

/// Scan component files, templates and routing files.
pub fn scan(workspace: &Path, config: &NgmapConfig, quiet: bool) -> Result<ComponentReport> {
    let pb = spinner("Scanning components...", quiet);
    let report = scan_components(workspace, discovery_config(config))
        .context("Failed to scan workspace")?;

    let hierarchy = &report.hierarchy;
    finish_scan(
        pb,
        &format!(
            "Found {} components ({} roots)",
            hierarchy.len(),
            hierarchy.roots().count()
        ),
        report.issues.len(),
    );
    report_issues("files", &report.issues);
    Ok(report)
}

/// Execute the components command
pub fn execute(args: ComponentsArgs, global: GlobalOptions) -> Result<()> {
    let workspace = resolve_workspace(&global)?;
    let config = load_config(&global, &workspace)?;

    let report = scan(&workspace, &config, global.quiet)?;
    if report.hierarchy.is_empty() {
        print_info("No components found", global.quiet);
    }

    write_report(
        &args.output,
        config.output_path(&workspace, &config.output.component_hierarchy),
        &component_hierarchy_markdown(&report.hierarchy),
        global.quiet,
    )
}
