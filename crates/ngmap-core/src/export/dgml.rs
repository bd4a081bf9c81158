//! DGML writer.
//!
//! Produces a `DirectedGraph` document for the Visual Studio graph viewer:
//! nodes, links, one category per node and arrow type in use, and the fixed
//! property declarations the viewer expects.

use std::collections::HashSet;
use std::fmt::Write;

use crate::graph::HierarchyGraph;

use super::GraphStyle;

pub const DGML_NAMESPACE: &str = "http://schemas.microsoft.com/vs/2009/dgml";

const PROPERTIES: [(&str, &str); 11] = [
    ("ComponentFilename", "System.String"),
    ("Background", "System.Windows.Media.Brush"),
    (
        "GraphDirection",
        "Microsoft.VisualStudio.Diagrams.Layout.LayoutOrientation",
    ),
    ("GroupLabel", "System.String"),
    ("IsTag", "System.Boolean"),
    ("Label", "System.String"),
    ("Layout", "System.String"),
    ("TargetType", "System.String"),
    ("ValueLabel", "System.String"),
    ("ZoomLevel", "System.String"),
    ("Expression", "System.String"),
];

/// Root element attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DgmlOptions {
    pub direction: String,
    pub layout: String,
    pub zoom_level: String,
}

impl Default for DgmlOptions {
    fn default() -> Self {
        Self {
            direction: "LeftToRight".to_string(),
            layout: "Sugiyama".to_string(),
            zoom_level: "-1".to_string(),
        }
    }
}

struct Category {
    id: &'static str,
    background: String,
    stroke: String,
}

/// Escape text for use inside a double-quoted XML attribute.
pub fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn add_category(categories: &mut Vec<Category>, id: &'static str, background: &str, stroke: &str) {
    if !categories.iter().any(|c| c.id == id) {
        categories.push(Category {
            id,
            background: background.to_string(),
            stroke: stroke.to_string(),
        });
    }
}

fn element(out: &mut String, indent: usize, name: &str, attributes: &[(&str, String)]) {
    let _ = write!(out, "{:width$}<{}", "", name, width = indent);
    for (key, value) in attributes {
        let _ = write!(out, " {}=\"{}\"", key, escape_xml(value));
    }
    out.push_str(" />\n");
}

/// Render `graph` as an indented DGML document.
///
/// Node ids and link endpoints are deduplicated without regard to case,
/// keeping the first occurrence.
pub fn to_dgml(graph: &HierarchyGraph, options: &DgmlOptions, style: &GraphStyle) -> String {
    let mut out = String::from("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n");
    let _ = writeln!(
        out,
        "<DirectedGraph GraphDirection=\"{}\" Layout=\"{}\" ZoomLevel=\"{}\" xmlns=\"{}\">",
        escape_xml(&options.direction),
        escape_xml(&options.layout),
        escape_xml(&options.zoom_level),
        DGML_NAMESPACE
    );

    let mut categories: Vec<Category> = Vec::new();

    out.push_str("  <Nodes>\n");
    let mut seen_nodes: HashSet<String> = HashSet::new();
    for node in graph.nodes() {
        add_category(
            &mut categories,
            node.node_type.as_str(),
            style.dgml_node_color(node.node_type),
            "",
        );
        if !seen_nodes.insert(node.id.to_lowercase()) {
            continue;
        }
        let mut attributes = vec![("Label", style.label(&node.name)), ("Id", node.id.clone())];
        if let (Some(position), Some(bounds)) = (node.position, node.bounding_box) {
            attributes.push((
                "Bounds",
                format!(
                    "{},{},{},{}",
                    position.x,
                    position.y,
                    bounds.width(),
                    bounds.height()
                ),
            ));
            attributes.push(("UseManualLocation", "True".to_string()));
        }
        attributes.push(("Category", node.node_type.as_str().to_string()));
        if let Some(filename) = &node.ts_filename {
            attributes.push(("ComponentFilename", filename.display().to_string()));
        }
        for (key, value) in &node.attributes {
            attributes.push((key.as_str(), value.clone()));
        }
        element(&mut out, 4, "Node", &attributes);
    }
    out.push_str("  </Nodes>\n");

    out.push_str("  <Links>\n");
    let mut seen_links: HashSet<(String, String)> = HashSet::new();
    for edge in graph.edges() {
        add_category(
            &mut categories,
            edge.arrow_type.as_str(),
            "",
            style.edge_color(edge.arrow_type),
        );
        if !seen_links.insert((edge.source.to_lowercase(), edge.target.to_lowercase())) {
            continue;
        }
        element(
            &mut out,
            4,
            "Link",
            &[
                ("Source", edge.source.clone()),
                ("Target", edge.target.clone()),
                ("Category", edge.arrow_type.as_str().to_string()),
            ],
        );
    }
    out.push_str("  </Links>\n");

    out.push_str("  <Categories>\n");
    for category in &categories {
        if category.background.is_empty() && category.stroke.is_empty() {
            continue;
        }
        let mut attributes = vec![("Id", category.id.to_string()), ("Label", category.id.to_string())];
        if !category.background.is_empty() {
            attributes.push(("Background", category.background.clone()));
        }
        if !category.stroke.is_empty() {
            attributes.push(("Stroke", category.stroke.clone()));
        }
        attributes.push(("IsTag", "True".to_string()));
        element(&mut out, 4, "Category", &attributes);
    }
    out.push_str("  </Categories>\n");

    out.push_str("  <Properties>\n");
    for (id, data_type) in PROPERTIES {
        element(
            &mut out,
            4,
            "Property",
            &[("Id", id.to_string()), ("DataType", data_type.to_string())],
        );
    }
    out.push_str("  </Properties>\n");
    out.push_str("</DirectedGraph>\n");
    out
}
