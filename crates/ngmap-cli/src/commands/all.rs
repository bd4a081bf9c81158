//! All command - Every report and graph in one run
//!
//! The workspace is scanned once for modules and once for components; the
//! results feed all reports and the three graphs.

use anyhow::Result;
use clap::Args;
use ngmap_core::export::markdown::{component_hierarchy_markdown, modules_markdown};
use ngmap_core::{component_hierarchy, dependency_injection_graph, module_hierarchy};

use super::graph::{output_path, render, GraphFormat, GraphKind};
use super::{load_config, print_info, resolve_workspace, write_file};
use crate::GlobalOptions;

/// Arguments for the all command
#[derive(Args, Debug)]
pub struct AllArgs {
    /// Format of the three graphs
    #[arg(long, short = 'f', value_enum, default_value_t = GraphFormat::Dgml)]
    format: GraphFormat,
}

/// Execute the all command
pub fn execute(args: AllArgs, global: GlobalOptions) -> Result<()> {
    let workspace = resolve_workspace(&global)?;
    let config = load_config(&global, &workspace)?;
    let quiet = global.quiet;
    let path = |name: &str| config.output_path(&workspace, name);

    let scan = super::modules::scan(&workspace, &config, quiet)?;
    let components = super::components::scan(&workspace, &config, quiet)?;

    write_file(
        &path(&config.output.modules),
        &modules_markdown(&scan.project),
        quiet,
    )?;
    write_file(
        &path(&config.output.component_hierarchy),
        &component_hierarchy_markdown(&components.hierarchy),
        quiet,
    )?;

    for kind in GraphKind::ALL {
        let graph = match kind {
            GraphKind::Modules => module_hierarchy(&scan.project),
            GraphKind::Components => component_hierarchy(&components.hierarchy),
            GraphKind::Di => dependency_injection_graph(&scan.project),
        };
        let content = render(&graph, args.format, &config)?;
        write_file(
            &output_path(kind, args.format, &workspace, &config),
            &content,
            quiet,
        )?;
    }

    let census = super::imports::generate(&workspace, &config, quiet)?;
    write_file(&path(&config.output.imports), &census, quiet)?;

    let listing = super::dirs::generate(&workspace, &config)?;
    write_file(&path(&config.output.directories), &listing, quiet)?;

    let packages = super::packages::generate(&workspace, &config, quiet)?;
    write_file(&path(&config.output.packages), &packages, quiet)?;

    print_info(
        &format!("Reports written to {}", config.output_dir(&workspace).display()),
        quiet,
    );
    Ok(())
}
