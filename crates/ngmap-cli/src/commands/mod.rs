//! CLI command implementations
//!
//! This module contains all ngmap CLI command implementations and the
//! helpers they share: workspace and config resolution, conversion of the
//! config into core options, and report output.

pub mod all;
pub mod components;
pub mod config;
pub mod dirs;
pub mod graph;
pub mod imports;
pub mod modules;
pub mod packages;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use ngmap_config::{ConfigLoader, LoggingConfig, NgmapConfig};
use ngmap_core::export::markdown::issues_report;
use ngmap_core::export::write_output;
use ngmap_core::{DgmlOptions, DiscoveryConfig, GraphStyle, ScanIssue};

use crate::GlobalOptions;

/// Resolve the workspace path from options or current directory.
pub fn resolve_workspace(global: &GlobalOptions) -> Result<PathBuf> {
    if let Some(ref path) = global.workspace {
        if !path.is_dir() {
            anyhow::bail!("Workspace '{}' is not a directory", path.display());
        }
        return path
            .canonicalize()
            .with_context(|| format!("Failed to resolve workspace {}", path.display()));
    }

    std::env::current_dir().context("Failed to get current directory")
}

/// Load configuration for `workspace`, with CLI overrides applied.
///
/// `--config` replaces the global and local files.
pub fn load_config(global: &GlobalOptions, workspace: &Path) -> Result<NgmapConfig> {
    let overrides = global.to_config_overrides();
    let mut loader = ConfigLoader::new();

    if let Some(ref config_path) = global.config {
        return loader
            .load_file(config_path, Some(&overrides))
            .with_context(|| format!("Failed to load config file {}", config_path.display()));
    }

    loader
        .load(workspace, Some(&overrides))
        .context("Failed to load configuration")
}

/// Logging section of the configuration, before any command runs.
///
/// Falls back to the defaults when the workspace or config cannot be
/// loaded; the command reports that error itself.
pub fn logging_config(global: &GlobalOptions) -> LoggingConfig {
    resolve_workspace(global)
        .and_then(|workspace| load_config(global, &workspace))
        .map(|config| config.logging)
        .unwrap_or_default()
}

// ============================================================================
// Config → core options
// ============================================================================

pub fn discovery_config(config: &NgmapConfig) -> DiscoveryConfig {
    DiscoveryConfig::with_excludes(config.scan.exclude_directories.iter().cloned())
}

pub fn graph_style(config: &NgmapConfig) -> GraphStyle {
    let graph = &config.graph;
    GraphStyle {
        root_node_color: graph.node_colors.root.clone(),
        dgml_root_node_color: graph.dgml_root_color.clone(),
        component_node_color: graph.node_colors.component.clone(),
        module_node_color: graph.node_colors.module.clone(),
        pipe_node_color: graph.node_colors.pipe.clone(),
        directive_node_color: graph.node_colors.directive.clone(),
        injectable_node_color: graph.node_colors.injectable.clone(),
        import_edge_color: graph.edge_colors.import.clone(),
        export_edge_color: graph.edge_colors.export.clone(),
        injectable_edge_color: graph.edge_colors.injectable.clone(),
        uses_edge_color: graph.edge_colors.uses.clone(),
        route_edge_color: graph.edge_colors.route.clone(),
        root_node_shape: graph.node_shapes.root.clone(),
        component_node_shape: graph.node_shapes.component.clone(),
        module_node_shape: graph.node_shapes.module.clone(),
        pipe_node_shape: graph.node_shapes.pipe.clone(),
        directive_node_shape: graph.node_shapes.directive.clone(),
        injectable_node_shape: graph.node_shapes.injectable.clone(),
        edge_arrow_type: graph.edge_arrow_type.clone(),
        maximum_node_label_length: graph.maximum_node_label_length,
    }
}

pub fn dgml_options(config: &NgmapConfig) -> DgmlOptions {
    DgmlOptions {
        direction: config.dgml.direction.clone(),
        layout: config.dgml.layout.clone(),
        zoom_level: config.dgml.zoom_level.clone(),
    }
}

// ============================================================================
// Output
// ============================================================================

/// Where a report goes
#[derive(Args, Debug, Clone, Default)]
pub struct OutputArgs {
    /// Print to stdout instead of writing a file
    #[arg(long, conflicts_with = "output")]
    pub stdout: bool,

    /// Write to this file instead of the configured one
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

/// Print or write `content` according to `args`.
pub fn write_report(
    args: &OutputArgs,
    default_path: PathBuf,
    content: &str,
    quiet: bool,
) -> Result<()> {
    if args.stdout {
        print!("{}", content);
        return Ok(());
    }
    let path = args.output.clone().unwrap_or(default_path);
    write_file(&path, content, quiet)
}

/// Write `content` to `path` and say so.
pub fn write_file(path: &Path, content: &str, quiet: bool) -> Result<()> {
    write_output(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    print_info(&format!("Wrote {}", path.display()), quiet);
    Ok(())
}

/// Print the files that failed to parse to stderr.
pub fn report_issues(what: &str, issues: &[ScanIssue]) {
    let report = issues_report(what, issues);
    if !report.is_empty() {
        eprint!("{}", report);
    }
}

/// Print an info message (respects quiet flag).
pub fn print_info(message: &str, quiet: bool) {
    if !quiet {
        eprintln!("{}", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_graph_style_follows_config() {
        let mut config = NgmapConfig::default();
        config.graph.node_colors.pipe = "#000001".to_string();
        config.graph.maximum_node_label_length = Some(12);

        let style = graph_style(&config);
        assert_eq!(style.pipe_node_color, "#000001");
        assert_eq!(style.maximum_node_label_length, Some(12));
        assert_eq!(style.dgml_root_node_color, "#FF00AA00");
    }

    #[test]
    fn test_default_config_matches_core_defaults() {
        let config = NgmapConfig::default();
        assert_eq!(graph_style(&config), GraphStyle::default());

        let dgml = dgml_options(&config);
        let core = DgmlOptions::default();
        assert_eq!(dgml.direction, core.direction);
        assert_eq!(dgml.layout, core.layout);
        assert_eq!(dgml.zoom_level, core.zoom_level);
        assert_eq!(discovery_config(&config), DiscoveryConfig::default());
    }
}
