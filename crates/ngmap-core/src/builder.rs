//! Graph Assembly
//!
//! Turns a scanned [`Project`] or [`ComponentHierarchy`] into a
//! [`HierarchyGraph`] ready for export.
//!
//! ## Usage
//!
//! ```ignore
//! use ngmap_core::builder::module_hierarchy;
//!
//! let report = scan_project(Path::new("my-app"), DiscoveryConfig::default())?;
//! let graph = module_hierarchy(&report.project);
//! ```

use tracing::{debug, info};

use crate::component::{ChildKind, ComponentHierarchy};
use crate::graph::{ArrowType, HierarchyGraph, Node, NodeType};
use crate::module::DecoratorKind;
use crate::project::Project;

/// Modules linked by their `imports` and `exports` arrays.
pub fn module_hierarchy(project: &Project) -> HierarchyGraph {
    let mut graph = HierarchyGraph::new("ModuleHierarchy");

    // Module nodes first so they keep their filenames
    for module in &project.modules {
        graph.append_node(
            Node::named(&module.name, NodeType::Module).with_filename(&module.filename),
        );
    }
    for module in &project.modules {
        for import in &module.imports {
            graph.append_node(Node::named(import, NodeType::classify(project, import)));
            graph.append_edge(import, &module.name, ArrowType::Import);
        }
        for export in &module.exports {
            graph.append_node(Node::named(export, NodeType::classify(project, export)));
            graph.append_edge(&module.name, export, ArrowType::Export);
        }
    }

    log_summary(&graph);
    graph
}

/// Components reachable from the root components, linked by template use
/// and routing.
pub fn component_hierarchy(hierarchy: &ComponentHierarchy) -> HierarchyGraph {
    let mut graph = HierarchyGraph::new("ComponentHierarchy");

    hierarchy.walk(|component, parent| {
        let node = Node::named(component.key(), NodeType::Component)
            .with_filename(&component.ts_filename);
        match parent {
            None => {
                graph.append_node(node.as_root());
            }
            Some((parent, kind)) => {
                graph.append_node(node);
                let arrow = match kind {
                    ChildKind::Template => ArrowType::Uses,
                    ChildKind::Route => ArrowType::Route,
                };
                graph.append_edge(parent.key(), component.key(), arrow);
            }
        }
    });

    log_summary(&graph);
    graph
}

/// Classes linked to the dependencies they request.
///
/// Edges point from the dependency to the requesting class. Unknown
/// dependencies are shown as injectables.
pub fn dependency_injection_graph(project: &Project) -> HierarchyGraph {
    let mut graph = HierarchyGraph::new("DependencyInjection");

    for class in project.requesters() {
        let node_type = match class.kind {
            DecoratorKind::Component => NodeType::Component,
            DecoratorKind::Directive => NodeType::Directive,
            DecoratorKind::Pipe => NodeType::Pipe,
            DecoratorKind::Injectable => NodeType::Injectable,
            DecoratorKind::NgModule => NodeType::Module,
        };
        let mut node = Node::named(&class.name, node_type).with_filename(&class.filename);
        for (label, members) in class.member_groups() {
            node.set_attribute(label, members.join(", "));
        }
        graph.append_node(node);
    }

    for class in project.requesters() {
        for dependency in &class.dependency_injections {
            let node_type = match NodeType::classify(project, dependency) {
                NodeType::None => NodeType::Injectable,
                other => other,
            };
            graph.append_node(Node::named(dependency, node_type));
            if graph
                .append_edge(dependency, &class.name, ArrowType::Injectable)
                .is_none()
            {
                debug!("Skipped edge {} -> {}", dependency, class.name);
            }
        }
    }

    log_summary(&graph);
    graph
}

fn log_summary(graph: &HierarchyGraph) {
    info!("Graph summary ({}):", graph.name());
    info!("  - Nodes: {}", graph.node_count());
    for arrow in ArrowType::ALL {
        let count = graph.edges().filter(|e| e.arrow_type == arrow).count();
        if count > 0 {
            info!("  - {} edges: {}", arrow.as_str(), count);
        }
    }
    info!("  - Total edges: {}", graph.edge_count());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::Component;
    use crate::module::{NgClass, NgModule};
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn edge_list(graph: &HierarchyGraph) -> Vec<(String, String, ArrowType)> {
        graph
            .edges()
            .map(|e| (e.source.clone(), e.target.clone(), e.arrow_type))
            .collect()
    }

    #[test]
    fn test_module_hierarchy() {
        let mut project = Project::new();
        project.add_module(NgModule {
            name: "AppModule".to_string(),
            filename: PathBuf::from("app.module.ts"),
            imports: strings(&["BrowserModule", "HeroesModule"]),
            ..Default::default()
        });
        project.add_module(NgModule {
            name: "HeroesModule".to_string(),
            filename: PathBuf::from("heroes.module.ts"),
            exports: strings(&["HeroListComponent"]),
            ..Default::default()
        });

        let graph = module_hierarchy(&project);
        assert_eq!(graph.node_count(), 4);
        assert_eq!(
            edge_list(&graph),
            vec![
                ("BrowserModule".into(), "AppModule".into(), ArrowType::Import),
                ("HeroesModule".into(), "AppModule".into(), ArrowType::Import),
                ("HeroesModule".into(), "HeroListComponent".into(), ArrowType::Export),
            ]
        );
        assert_eq!(
            graph.get_node("HeroesModule").unwrap().ts_filename,
            Some(PathBuf::from("heroes.module.ts"))
        );
        assert_eq!(
            graph.get_node("HeroListComponent").unwrap().node_type,
            NodeType::Component
        );
    }

    fn component(name: &str, selector: &str, is_root: bool) -> Component {
        Component {
            name: name.to_string(),
            ts_filename: PathBuf::from(format!("{}.component.ts", selector)),
            template_filename: None,
            inline_template: None,
            selector: selector.to_string(),
            sub_components: Vec::new(),
            route_children: Vec::new(),
            is_root,
            is_router_outlet: false,
        }
    }

    #[test]
    fn test_component_hierarchy() {
        let mut hierarchy = ComponentHierarchy::new();
        let mut root = component("AppComponent", "app-root", true);
        root.sub_components = strings(&["app-nav"]);
        root.route_children = strings(&["app-heroes"]);
        let mut nav = component("NavComponent", "app-nav", false);
        nav.sub_components = strings(&["app-root"]);
        hierarchy.insert(root);
        hierarchy.insert(nav);
        hierarchy.insert(component("HeroesComponent", "app-heroes", false));
        hierarchy.insert(component("UnusedComponent", "app-unused", false));

        let graph = component_hierarchy(&hierarchy);
        assert_eq!(graph.node_count(), 3);
        assert!(!graph.contains_node("app-unused"));
        assert_eq!(graph.get_node("app-root").unwrap().node_type, NodeType::RootNode);
        assert_eq!(
            edge_list(&graph),
            vec![
                ("app-root".into(), "app-nav".into(), ArrowType::Uses),
                ("app-nav".into(), "app-root".into(), ArrowType::Uses),
                ("app-root".into(), "app-heroes".into(), ArrowType::Route),
            ]
        );
    }

    #[test]
    fn test_dependency_injection_graph() {
        let mut project = Project::new();
        let mut detail = NgClass::new("HeroDetailComponent", "d.ts", DecoratorKind::Component);
        detail.dependency_injections = strings(&["HeroService", "ActivatedRoute"]);
        detail.inputs = strings(&["hero", "title"]);
        detail.outputs = strings(&["saved"]);
        project.add_class(detail);

        let mut service = NgClass::new("HeroService", "s.ts", DecoratorKind::Injectable);
        service.dependency_injections = strings(&["HttpClient"]);
        project.add_class(service);
        project.add_class(NgClass::new("IdleComponent", "i.ts", DecoratorKind::Component));

        let graph = dependency_injection_graph(&project);
        assert!(!graph.contains_node("IdleComponent"));
        assert_eq!(
            edge_list(&graph),
            vec![
                ("HeroService".into(), "HeroDetailComponent".into(), ArrowType::Injectable),
                ("ActivatedRoute".into(), "HeroDetailComponent".into(), ArrowType::Injectable),
                ("HttpClient".into(), "HeroService".into(), ArrowType::Injectable),
            ]
        );

        let detail = graph.get_node("HeroDetailComponent").unwrap();
        assert_eq!(detail.attribute("Inputs"), Some("hero, title"));
        assert_eq!(detail.attribute("Outputs"), Some("saved"));
        assert_eq!(detail.attribute("ViewChilds"), None);
        assert_eq!(
            graph.get_node("HeroService").unwrap().ts_filename,
            Some(PathBuf::from("s.ts"))
        );
        assert_eq!(
            graph.get_node("ActivatedRoute").unwrap().node_type,
            NodeType::Injectable
        );
    }
}
