//! ngmap Core - Angular workspace structure analysis
//!
//! This crate provides the scanning and graph building behind `ngmap`:
//! - Regex and bracket-counting extraction of `@NgModule`, `@Component`,
//!   `@Directive`, `@Pipe` and `@Injectable` metadata
//! - Component hierarchy from templates and router configuration
//! - Module, component and dependency injection graphs on petgraph
//! - DGML, GraphViz, vis-network JSON and Markdown output

pub mod builder;
pub mod component;
pub mod discovery;
pub mod export;
pub mod graph;
pub mod imports;
pub mod module;
pub mod packages;
pub mod project;
pub mod routes;
pub mod sections;
pub mod text;

// Discovery re-exports
pub use discovery::{DiscoveryConfig, ScanError, ScanIssue, SourceDiscovery, DEFAULT_EXCLUDE_DIRS};

// Scanner re-exports
pub use component::{
    scan_components, ChildKind, Component, ComponentHierarchy, ComponentReport, ComponentScanner,
};
pub use module::{scan_project, DecoratorKind, NgClass, NgModule, ProjectScanner, ScanReport};
pub use project::Project;
pub use routes::{parse_routes, Route};

// Graph re-exports
pub use builder::{component_hierarchy, dependency_injection_graph, module_hierarchy};
pub use graph::{ArrowType, BoundingBox, Edge, HierarchyGraph, Node, NodeType, Position};

// Export re-exports
pub use export::dgml::{to_dgml, DgmlOptions};
pub use export::graphviz::to_graphviz;
pub use export::vis::{apply_layout, load_layout, to_vis_json, NetworkNode};
pub use export::{ExportError, GraphStyle};

// Report re-exports
pub use imports::count_imports;
pub use packages::{collect_packages, PackageSummary};
