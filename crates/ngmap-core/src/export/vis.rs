//! vis-network JSON.
//!
//! [`to_vis_data`] produces the `nodes`/`edges` arrays an HTML page can hand
//! straight to `new vis.Network(...)`. [`apply_layout`] reads positions saved
//! from such a page back onto a graph so DGML and GraphViz output can keep
//! a hand-arranged layout.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::graph::{BoundingBox, HierarchyGraph, Position};

use super::{ExportError, GraphStyle, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisNode {
    pub id: String,
    pub label: String,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisArrowHead {
    pub enabled: bool,
    #[serde(rename = "type")]
    pub arrow_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisArrows {
    pub to: VisArrowHead,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisSmooth {
    #[serde(rename = "type")]
    pub smooth_type: String,
    pub roundness: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Smooth {
    Disabled(bool),
    Curved(VisSmooth),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisEdge {
    pub from: String,
    pub to: String,
    pub arrows: VisArrows,
    pub color: String,
    pub smooth: Smooth,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisData {
    pub nodes: Vec<VisNode>,
    pub edges: Vec<VisEdge>,
}

/// Build the vis-network data for `graph`.
///
/// Edges that have a counterpart in the opposite direction are drawn
/// curved so the pair stays readable.
pub fn to_vis_data(graph: &HierarchyGraph, style: &GraphStyle) -> VisData {
    let nodes = graph
        .nodes()
        .map(|node| VisNode {
            id: node.id.clone(),
            label: style.label(&node.name),
            color: style.node_color(node.node_type).to_string(),
            shape: style.node_shape(node.node_type).map(str::to_string),
            x: node.position.map(|p| p.x),
            y: node.position.map(|p| p.y),
        })
        .collect();

    let edges = graph
        .edges()
        .map(|edge| VisEdge {
            from: edge.source.clone(),
            to: edge.target.clone(),
            arrows: VisArrows {
                to: VisArrowHead {
                    enabled: true,
                    arrow_type: style.edge_arrow_type.clone(),
                },
            },
            color: style.edge_color(edge.arrow_type).to_string(),
            smooth: if graph.mutual_edge_count(edge) > 1 {
                Smooth::Curved(VisSmooth {
                    smooth_type: "curvedCW".to_string(),
                    roundness: 0.2,
                })
            } else {
                Smooth::Disabled(false)
            },
            title: edge.title(),
        })
        .collect();

    VisData { nodes, edges }
}

/// Pretty-printed JSON for [`to_vis_data`].
pub fn to_vis_json(graph: &HierarchyGraph, style: &GraphStyle) -> Result<String> {
    Ok(serde_json::to_string_pretty(&to_vis_data(graph, style))?)
}

// ============================================================================
// Layout Import
// ============================================================================

/// Node placement saved from an interactive graph view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkNode {
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub position: Option<Position>,
    #[serde(default)]
    pub bounding_box: Option<BoundingBox>,
}

/// Parse a JSON array of [`NetworkNode`]s.
pub fn parse_layout(json: &str) -> Result<Vec<NetworkNode>> {
    Ok(serde_json::from_str(json)?)
}

/// Read a layout file written by the graph view.
pub fn load_layout(path: &Path) -> Result<Vec<NetworkNode>> {
    let json = std::fs::read_to_string(path).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_layout(&json)
}

/// Copy labels, positions and bounds from `layout` onto matching nodes.
/// Returns how many nodes were updated.
pub fn apply_layout(graph: &mut HierarchyGraph, layout: &[NetworkNode]) -> usize {
    let mut applied = 0;
    for entry in layout {
        let Some(node) = graph.get_node_mut(&entry.id) else {
            debug!("Layout entry {} has no matching node", entry.id);
            continue;
        };
        if let Some(label) = entry.label.as_ref().filter(|l| !l.is_empty()) {
            node.name = label.clone();
        }
        if entry.position.is_some() {
            node.position = entry.position;
        }
        if entry.bounding_box.is_some() {
            node.bounding_box = entry.bounding_box;
        }
        applied += 1;
    }
    applied
}
