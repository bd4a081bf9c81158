//! Hierarchy Graph Model
//!
//! Node and edge types shared by the module, component and dependency
//! injection graphs, and the `HierarchyGraph` container built on petgraph.
//!
//! Nodes are identified by a string id (usually the class name or
//! selector). Edges get sequential ids in insertion order, which the DGML
//! and vis writers rely on for stable output.

use std::collections::HashMap;
use std::path::PathBuf;

use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableGraph};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Deserialize, Serialize};

use crate::project::Project;

// ============================================================================
// Node Types
// ============================================================================

/// What a node stands for. Drives colours and DGML categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeType {
    None,
    RootNode,
    Component,
    Module,
    Pipe,
    Directive,
    Injectable,
}

impl NodeType {
    pub const ALL: [NodeType; 7] = [
        NodeType::None,
        NodeType::RootNode,
        NodeType::Component,
        NodeType::Module,
        NodeType::Pipe,
        NodeType::Directive,
        NodeType::Injectable,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            NodeType::None => "None",
            NodeType::RootNode => "RootNode",
            NodeType::Component => "Component",
            NodeType::Module => "Module",
            NodeType::Pipe => "Pipe",
            NodeType::Directive => "Directive",
            NodeType::Injectable => "Injectable",
        }
    }

    /// Guess the kind of a name found in module metadata or a constructor.
    ///
    /// Known classes win; otherwise the Angular naming suffixes decide.
    /// `RouterModule.forRoot(...)` style calls count as modules.
    pub fn classify(project: &Project, name: &str) -> NodeType {
        if project.is_module(name) || name.ends_with("Module") || name.contains("Module.") {
            NodeType::Module
        } else if project.components.contains_key(name) || name.ends_with("Component") {
            NodeType::Component
        } else if project.directives.contains_key(name) || name.ends_with("Directive") {
            NodeType::Directive
        } else if project.pipes.contains_key(name) || name.ends_with("Pipe") {
            NodeType::Pipe
        } else if project.injectables.contains_key(name) {
            NodeType::Injectable
        } else {
            NodeType::None
        }
    }
}

// ============================================================================
// Edge Types
// ============================================================================

/// Relationship an edge expresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ArrowType {
    None,
    /// Imported module → importing module
    Import,
    /// Exporting module → exported item
    Export,
    /// Dependency → class that requests it
    Injectable,
    /// Parent component → component used in its template
    Uses,
    /// Router host → routed component
    Route,
}

impl ArrowType {
    pub const ALL: [ArrowType; 6] = [
        ArrowType::None,
        ArrowType::Import,
        ArrowType::Export,
        ArrowType::Injectable,
        ArrowType::Uses,
        ArrowType::Route,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ArrowType::None => "None",
            ArrowType::Import => "Import",
            ArrowType::Export => "Export",
            ArrowType::Injectable => "Injectable",
            ArrowType::Uses => "Uses",
            ArrowType::Route => "Route",
        }
    }
}

// ============================================================================
// Node
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Screen extent of a node as reported by an interactive layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub top: f64,
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
}

impl BoundingBox {
    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: String,
    /// Display name
    pub name: String,
    pub ts_filename: Option<PathBuf>,
    pub is_root: bool,
    pub node_type: NodeType,
    pub position: Option<Position>,
    pub bounding_box: Option<BoundingBox>,
    /// Extra labelled values, in insertion order
    pub attributes: Vec<(String, String)>,
}

impl Node {
    pub fn new(id: impl Into<String>, name: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ts_filename: None,
            is_root: false,
            node_type,
            position: None,
            bounding_box: None,
            attributes: Vec::new(),
        }
    }

    /// Node whose id is its name.
    pub fn named(name: impl Into<String>, node_type: NodeType) -> Self {
        let name = name.into();
        Self::new(name.clone(), name, node_type)
    }

    pub fn with_filename(mut self, filename: impl Into<PathBuf>) -> Self {
        self.ts_filename = Some(filename.into());
        self
    }

    pub fn as_root(mut self) -> Self {
        self.is_root = true;
        self.node_type = NodeType::RootNode;
        self
    }

    /// Set an attribute, replacing an earlier value under the same key.
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.attributes.push((key, value)),
        }
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

// ============================================================================
// Edge
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub arrow_type: ArrowType,
}

impl Edge {
    /// Human readable description used as tooltip.
    pub fn title(&self) -> String {
        match self.arrow_type {
            ArrowType::Import => format!("{} imports {}", self.target, self.source),
            ArrowType::Export => format!("{} exports {}", self.source, self.target),
            ArrowType::Injectable => format!("{} injected into {}", self.source, self.target),
            ArrowType::Uses => format!("{} uses {}", self.source, self.target),
            ArrowType::Route => format!("{} routes to {}", self.source, self.target),
            ArrowType::None => String::new(),
        }
    }
}

// ============================================================================
// HierarchyGraph
// ============================================================================

/// Directed graph of nodes keyed by id.
///
/// - A node id is added once; later appends with the same id are ignored
/// - At most one edge per (source, target) pair
/// - Iteration follows insertion order
#[derive(Debug, Clone)]
pub struct HierarchyGraph {
    name: String,
    graph: StableGraph<Node, Edge, petgraph::Directed>,
    node_index_map: HashMap<String, NodeIndex>,
}

impl HierarchyGraph {
    /// Create an empty graph. `name` is used as the GraphViz graph name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            graph: StableGraph::new(),
            node_index_map: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // ------------------------------------------------------------------------
    // Node Operations
    // ------------------------------------------------------------------------

    /// Add a node unless one with the same id exists. Returns the index of
    /// the node stored under that id.
    pub fn append_node(&mut self, node: Node) -> NodeIndex {
        if let Some(&idx) = self.node_index_map.get(&node.id) {
            return idx;
        }
        let id = node.id.clone();
        let idx = self.graph.add_node(node);
        self.node_index_map.insert(id, idx);
        idx
    }

    pub fn get_node(&self, id: &str) -> Option<&Node> {
        self.node_index_map
            .get(id)
            .and_then(|&idx| self.graph.node_weight(idx))
    }

    pub fn get_node_mut(&mut self, id: &str) -> Option<&mut Node> {
        self.node_index_map
            .get(id)
            .copied()
            .and_then(|idx| self.graph.node_weight_mut(idx))
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node_index_map.contains_key(id)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph.node_weights()
    }

    pub fn roots(&self) -> impl Iterator<Item = &Node> {
        self.graph.node_weights().filter(|n| n.is_root)
    }

    // ------------------------------------------------------------------------
    // Edge Operations
    // ------------------------------------------------------------------------

    /// Connect two existing nodes.
    ///
    /// Returns `None` when an endpoint is missing or the pair is already
    /// connected in this direction.
    pub fn append_edge(
        &mut self,
        source_id: &str,
        target_id: &str,
        arrow_type: ArrowType,
    ) -> Option<EdgeIndex> {
        let source_idx = *self.node_index_map.get(source_id)?;
        let target_idx = *self.node_index_map.get(target_id)?;
        if self.graph.find_edge(source_idx, target_idx).is_some() {
            return None;
        }
        let edge = Edge {
            id: (self.graph.edge_count() + 1).to_string(),
            source: source_id.to_string(),
            target: target_id.to_string(),
            arrow_type,
        };
        Some(self.graph.add_edge(source_idx, target_idx, edge))
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.graph.edge_weights()
    }

    /// 2 when `edge` has a counterpart in the opposite direction, else 1.
    pub fn mutual_edge_count(&self, edge: &Edge) -> usize {
        let reverse = match (
            self.node_index_map.get(&edge.target),
            self.node_index_map.get(&edge.source),
        ) {
            (Some(&from), Some(&to)) => self.graph.find_edge(from, to).is_some(),
            _ => false,
        };
        if reverse {
            2
        } else {
            1
        }
    }

    /// Nodes with an edge pointing at `id`.
    pub fn predecessors(&self, id: &str) -> impl Iterator<Item = (&Node, &Edge)> {
        self.neighbours(id, Direction::Incoming)
    }

    /// Nodes that `id` points at.
    pub fn successors(&self, id: &str) -> impl Iterator<Item = (&Node, &Edge)> {
        self.neighbours(id, Direction::Outgoing)
    }

    fn neighbours(&self, id: &str, direction: Direction) -> impl Iterator<Item = (&Node, &Edge)> {
        let idx = self.node_index_map.get(id).copied();
        idx.into_iter().flat_map(move |idx| {
            self.graph
                .edges_directed(idx, direction)
                .filter_map(move |edge_ref| {
                    let other = match direction {
                        Direction::Incoming => edge_ref.source(),
                        Direction::Outgoing => edge_ref.target(),
                    };
                    Some((self.graph.node_weight(other)?, edge_ref.weight()))
                })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::module::{DecoratorKind, NgClass, NgModule};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_append_node_first_wins() {
        let mut graph = HierarchyGraph::new("Test");
        let first = graph.append_node(Node::named("AppModule", NodeType::Module));
        let second = graph.append_node(Node::named("AppModule", NodeType::None));
        assert_eq!(first, second);
        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.get_node("AppModule").unwrap().node_type, NodeType::Module);
    }

    #[test]
    fn test_append_edge_dedup_and_missing_nodes() {
        let mut graph = HierarchyGraph::new("Test");
        graph.append_node(Node::named("A", NodeType::Module));
        graph.append_node(Node::named("B", NodeType::Module));

        assert!(graph.append_edge("A", "B", ArrowType::Import).is_some());
        assert!(graph.append_edge("A", "B", ArrowType::Export).is_none());
        assert!(graph.append_edge("A", "Missing", ArrowType::Import).is_none());
        assert!(graph.append_edge("B", "A", ArrowType::Export).is_some());

        let ids: Vec<&str> = graph.edges().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn test_mutual_edge_count() {
        let mut graph = HierarchyGraph::new("Test");
        for name in ["A", "B", "C"] {
            graph.append_node(Node::named(name, NodeType::Component));
        }
        graph.append_edge("A", "B", ArrowType::Uses);
        graph.append_edge("B", "A", ArrowType::Uses);
        graph.append_edge("A", "C", ArrowType::Uses);

        let edges: Vec<&Edge> = graph.edges().collect();
        assert_eq!(graph.mutual_edge_count(edges[0]), 2);
        assert_eq!(graph.mutual_edge_count(edges[1]), 2);
        assert_eq!(graph.mutual_edge_count(edges[2]), 1);
    }

    #[test]
    fn test_edge_titles() {
        let edge = |arrow_type| Edge {
            id: "1".to_string(),
            source: "S".to_string(),
            target: "T".to_string(),
            arrow_type,
        };
        assert_eq!(edge(ArrowType::Import).title(), "T imports S");
        assert_eq!(edge(ArrowType::Export).title(), "S exports T");
        assert_eq!(edge(ArrowType::Injectable).title(), "S injected into T");
        assert_eq!(edge(ArrowType::Uses).title(), "S uses T");
        assert_eq!(edge(ArrowType::Route).title(), "S routes to T");
    }

    #[test]
    fn test_neighbours_and_roots() {
        let mut graph = HierarchyGraph::new("Test");
        graph.append_node(Node::named("app-root", NodeType::Component).as_root());
        graph.append_node(Node::named("app-nav", NodeType::Component));
        graph.append_edge("app-root", "app-nav", ArrowType::Uses);

        let roots: Vec<&str> = graph.roots().map(|n| n.id.as_str()).collect();
        assert_eq!(roots, vec!["app-root"]);
        assert_eq!(graph.get_node("app-root").unwrap().node_type, NodeType::RootNode);
        let succ: Vec<&str> = graph.successors("app-root").map(|(n, _)| n.id.as_str()).collect();
        assert_eq!(succ, vec!["app-nav"]);
        let pred: Vec<&str> = graph.predecessors("app-nav").map(|(n, _)| n.id.as_str()).collect();
        assert_eq!(pred, vec!["app-root"]);
        assert_eq!(graph.successors("missing").count(), 0);
    }

    #[test]
    fn test_classify() {
        let mut project = Project::new();
        project.add_module(NgModule {
            name: "SharedStuff".to_string(),
            ..Default::default()
        });
        project.add_class(NgClass::new("HeroService", "h.ts", DecoratorKind::Injectable));
        project.add_class(NgClass::new("Shell", "s.ts", DecoratorKind::Component));

        assert_eq!(NodeType::classify(&project, "SharedStuff"), NodeType::Module);
        assert_eq!(NodeType::classify(&project, "BrowserModule"), NodeType::Module);
        assert_eq!(
            NodeType::classify(&project, "RouterModule.forRoot(routes)"),
            NodeType::Module
        );
        assert_eq!(NodeType::classify(&project, "Shell"), NodeType::Component);
        assert_eq!(NodeType::classify(&project, "NavComponent"), NodeType::Component);
        assert_eq!(NodeType::classify(&project, "HighlightDirective"), NodeType::Directive);
        assert_eq!(NodeType::classify(&project, "ShoutPipe"), NodeType::Pipe);
        assert_eq!(NodeType::classify(&project, "HeroService"), NodeType::Injectable);
        assert_eq!(NodeType::classify(&project, "HttpClient"), NodeType::None);
    }

    #[test]
    fn test_node_attributes() {
        let mut node = Node::named("X", NodeType::Component);
        node.set_attribute("Inputs", "a");
        node.set_attribute("Outputs", "b");
        node.set_attribute("Inputs", "c");
        assert_eq!(node.attribute("Inputs"), Some("c"));
        assert_eq!(node.attributes.len(), 2);
    }
}
