//! GraphViz `digraph` writer.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::graph::{Edge, HierarchyGraph, Node};

use super::GraphStyle;

static RE_NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\W").expect("Invalid non-word regex"));

/// Node id usable in DOT: every non-word character becomes `_`.
pub fn sanitize_id(id: &str) -> String {
    RE_NON_WORD.replace_all(id, "_").into_owned()
}

fn node_line(node: &Node, style: &GraphStyle) -> String {
    let mut attributes = vec![
        format!("label=<{}>", html_escape(&style.label(&node.name))),
        "shape=\"box\"".to_string(),
        "style=\"filled,rounded\"".to_string(),
    ];
    let color = style.node_color(node.node_type);
    if !color.is_empty() {
        attributes.push(format!("color=\"{}\"", color));
    }
    // Screen coordinates grow downwards, GraphViz coordinates upwards
    if let Some(position) = node.position {
        attributes.push(format!("pos=\"{},{}\"", position.x, -position.y));
    }
    format!("{} [{}];", sanitize_id(&node.id), attributes.join(", "))
}

fn edge_line(edge: &Edge, style: &GraphStyle) -> String {
    let color = style.edge_color(edge.arrow_type);
    let attributes = if color.is_empty() {
        String::new()
    } else {
        format!(" [color=\"{}\"]", color)
    };
    format!(
        "{} -> {}{};",
        sanitize_id(&edge.source),
        sanitize_id(&edge.target),
        attributes
    )
}

/// Labels are HTML-like in DOT, so markup characters must be escaped.
fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Render `graph` as a GraphViz digraph named after the graph.
pub fn to_graphviz(graph: &HierarchyGraph, style: &GraphStyle) -> String {
    let nodes: Vec<String> = graph.nodes().map(|n| node_line(n, style)).collect();
    let edges: Vec<String> = graph.edges().map(|e| edge_line(e, style)).collect();
    format!(
        "digraph {} {{\n   {}\n   {}\n}}",
        sanitize_id(graph.name()),
        nodes.join("\n   "),
        edges.join("\n   ")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{ArrowType, NodeType, Position};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_sanitize_id() {
        assert_eq!(sanitize_id("app-root"), "app_root");
        assert_eq!(
            sanitize_id("RouterModule.forRoot(routes)"),
            "RouterModule_forRoot_routes_"
        );
        assert_eq!(sanitize_id("Plain_Name1"), "Plain_Name1");
    }

    #[test]
    fn test_to_graphviz() {
        let mut graph = HierarchyGraph::new("ModuleHierarchy");
        graph.append_node(Node::named("AppModule", NodeType::Module));
        let mut shared = Node::named("SharedModule", NodeType::Module);
        shared.position = Some(Position { x: 12.0, y: 30.0 });
        graph.append_node(shared);
        graph.append_node(Node::named("HTTP_TOKEN", NodeType::None));
        graph.append_edge("SharedModule", "AppModule", ArrowType::Import);
        graph.append_edge("AppModule", "HTTP_TOKEN", ArrowType::None);

        let expected = "digraph ModuleHierarchy {\n   \
AppModule [label=<AppModule>, shape=\"box\", style=\"filled,rounded\", color=\"#e040fb\"];\n   \
SharedModule [label=<SharedModule>, shape=\"box\", style=\"filled,rounded\", color=\"#e040fb\", pos=\"12,-30\"];\n   \
HTTP_TOKEN [label=<HTTP_TOKEN>, shape=\"box\", style=\"filled,rounded\"];\n   \
SharedModule -> AppModule [color=\"#43a047\"];\n   \
AppModule -> HTTP_TOKEN;\n}";
        assert_eq!(to_graphviz(&graph, &GraphStyle::default()), expected);
    }

    #[test]
    fn test_truncated_and_escaped_label() {
        let mut graph = HierarchyGraph::new("G");
        graph.append_node(Node::named("Store<AppState>", NodeType::Injectable));
        let style = GraphStyle {
            maximum_node_label_length: Some(5),
            ..GraphStyle::default()
        };
        let dot = to_graphviz(&graph, &style);
        assert!(dot.contains("Store_AppState_ [label=<Store...>"));
        let dot = to_graphviz(&graph, &GraphStyle::default());
        assert!(dot.contains("label=<Store&lt;AppState&gt;>"));
    }
}
