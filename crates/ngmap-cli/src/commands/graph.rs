//! Graph command - Module, component and dependency injection graphs

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use ngmap_config::NgmapConfig;
use ngmap_core::{
    apply_layout, component_hierarchy, dependency_injection_graph, load_layout, module_hierarchy,
    to_dgml, to_graphviz, to_vis_json, HierarchyGraph,
};

use super::{dgml_options, graph_style, load_config, print_info, resolve_workspace};
use super::{write_report, OutputArgs};
use crate::GlobalOptions;

/// Arguments for the graph command
#[derive(Args, Debug)]
pub struct GraphArgs {
    /// Which graph to build
    #[arg(value_enum)]
    kind: GraphKind,

    /// Output format
    #[arg(long, short = 'f', value_enum, default_value_t = GraphFormat::Dgml)]
    format: GraphFormat,

    /// Node positions saved from the graph view (JSON)
    #[arg(long)]
    layout: Option<PathBuf>,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GraphKind {
    /// Modules linked by imports and exports
    Modules,
    /// Components linked by template use and routing
    Components,
    /// Classes linked to the dependencies they inject
    Di,
}

impl GraphKind {
    pub const ALL: [GraphKind; 3] = [GraphKind::Modules, GraphKind::Components, GraphKind::Di];

    /// Configured file stem for this graph.
    fn file_stem(self, config: &NgmapConfig) -> &str {
        match self {
            GraphKind::Modules => &config.output.module_graph,
            GraphKind::Components => &config.output.component_graph,
            GraphKind::Di => &config.output.dependency_injection_graph,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum GraphFormat {
    /// Visual Studio Directed Graph Markup Language
    Dgml,
    /// GraphViz digraph
    Dot,
    /// vis-network nodes and edges
    Json,
}

impl GraphFormat {
    pub fn extension(self) -> &'static str {
        match self {
            GraphFormat::Dgml => "dgml",
            GraphFormat::Dot => "dot",
            GraphFormat::Json => "json",
        }
    }
}

/// Default output path of a graph.
pub fn output_path(
    kind: GraphKind,
    format: GraphFormat,
    workspace: &Path,
    config: &NgmapConfig,
) -> PathBuf {
    config.output_path(
        workspace,
        &format!("{}.{}", kind.file_stem(config), format.extension()),
    )
}

/// Scan the workspace and build the requested graph.
pub fn build(
    kind: GraphKind,
    workspace: &Path,
    config: &NgmapConfig,
    quiet: bool,
) -> Result<HierarchyGraph> {
    let graph = match kind {
        GraphKind::Modules => {
            module_hierarchy(&super::modules::scan(workspace, config, quiet)?.project)
        }
        GraphKind::Components => {
            component_hierarchy(&super::components::scan(workspace, config, quiet)?.hierarchy)
        }
        GraphKind::Di => {
            dependency_injection_graph(&super::modules::scan(workspace, config, quiet)?.project)
        }
    };
    Ok(graph)
}

/// Serialise `graph` in `format`.
pub fn render(graph: &HierarchyGraph, format: GraphFormat, config: &NgmapConfig) -> Result<String> {
    let style = graph_style(config);
    let content = match format {
        GraphFormat::Dgml => to_dgml(graph, &dgml_options(config), &style),
        GraphFormat::Dot => to_graphviz(graph, &style),
        GraphFormat::Json => to_vis_json(graph, &style).context("Failed to serialize graph")?,
    };
    Ok(content)
}

fn apply_layout_file(graph: &mut HierarchyGraph, path: &Path, quiet: bool) -> Result<()> {
    let layout = load_layout(path)
        .with_context(|| format!("Failed to read layout {}", path.display()))?;
    let applied = apply_layout(graph, &layout);
    print_info(
        &format!(
            "Applied layout to {} of {} nodes",
            applied,
            graph.node_count()
        ),
        quiet,
    );
    Ok(())
}

/// Execute the graph command
pub fn execute(args: GraphArgs, global: GlobalOptions) -> Result<()> {
    let workspace = resolve_workspace(&global)?;
    let config = load_config(&global, &workspace)?;

    let mut graph = build(args.kind, &workspace, &config, global.quiet)?;
    if let Some(ref layout) = args.layout {
        apply_layout_file(&mut graph, layout, global.quiet)?;
    }
    print_info(
        &format!(
            "{}: {} nodes, {} edges",
            graph.name(),
            graph.node_count(),
            graph.edge_count()
        ),
        global.quiet,
    );

    let content = render(&graph, args.format, &config)?;
    write_report(
        &args.output,
        output_path(args.kind, args.format, &workspace, &config),
        &content,
        global.quiet,
    )
}
