//! Modules command - Markdown overview of every `@NgModule`

use std::path::Path;

use anyhow::{Context, Result};
use clap::Args;
use ngmap_config::NgmapConfig;
use ngmap_core::export::markdown::modules_markdown;
use ngmap_core::{scan_project, ScanReport};

use super::{discovery_config, load_config, print_info, report_issues, resolve_workspace};
use super::{write_report, OutputArgs};
use crate::progress::{finish_scan, spinner};
use crate::GlobalOptions;

/// Arguments for the modules command
#[derive(Args, Debug)]
pub struct ModulesArgs {
    #[command(flatten)]
    output: OutputArgs,
}

/// Scan the workspace for modules and decorated classes.
pub fn scan(workspace: &Path, config: &NgmapConfig, quiet: bool) -> Result<ScanReport> {
    let pb = spinner("Scanning modules...", quiet);
    let report =
        scan_project(workspace, discovery_config(config)).context("Failed to scan workspace")?;

    let project = &report.project;
    finish_scan(
        pb,
        &format!(
            "Found {} modules, {} components, {} injectables",
            project.modules.len(),
            project.components.len(),
            project.injectables.len()
        ),
        report.issues.len(),
    );
    report_issues("modules", &report.issues);
    Ok(report)
}

/// Execute the modules command
pub fn execute(args: ModulesArgs, global: GlobalOptions) -> Result<()> {
    let workspace = resolve_workspace(&global)?;
    let config = load_config(&global, &workspace)?;

    let report = scan(&workspace, &config, global.quiet)?;
    if report.project.modules.is_empty() {
        print_info("No modules found", global.quiet);
    }

    write_report(
        &args.output,
        config.output_path(&workspace, &config.output.modules),
        &modules_markdown(&report.project),
        global.quiet,
    )
}
