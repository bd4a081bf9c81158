//! Graph and report writers.
//!
//! - [`dgml`]: Visual Studio Directed Graph Markup Language
//! - [`graphviz`]: GraphViz `digraph` text
//! - [`vis`]: JSON node/edge arrays for vis-network, plus layout import
//! - [`markdown`]: Markdown reports (modules, component tree, packages, ...)
//!
//! Every graph writer takes a [`GraphStyle`] for colours, shapes and label
//! length.

pub mod dgml;
pub mod graphviz;
pub mod markdown;
pub mod vis;

use std::path::PathBuf;

use thiserror::Error;

use crate::graph::{ArrowType, NodeType};

/// Errors raised while writing or reading export files.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ExportError>;

/// Write `content` to `path`, creating parent directories as needed.
pub fn write_output(path: &std::path::Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| ExportError::Io {
            path: parent.to_path_buf(),
            source,
        })?;
    }
    std::fs::write(path, content).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ============================================================================
// Style
// ============================================================================

/// Colours and shapes for graph output. Colours are CSS/DGML strings; an
/// empty string means "no colour".
#[derive(Debug, Clone, PartialEq)]
pub struct GraphStyle {
    pub root_node_color: String,
    /// Root colour in DGML, which uses `#AARRGGBB`
    pub dgml_root_node_color: String,
    pub component_node_color: String,
    pub module_node_color: String,
    pub pipe_node_color: String,
    pub directive_node_color: String,
    pub injectable_node_color: String,

    pub import_edge_color: String,
    pub export_edge_color: String,
    pub injectable_edge_color: String,
    pub uses_edge_color: String,
    pub route_edge_color: String,

    pub root_node_shape: String,
    pub component_node_shape: String,
    pub module_node_shape: String,
    pub pipe_node_shape: String,
    pub directive_node_shape: String,
    pub injectable_node_shape: String,
    /// vis-network arrow head
    pub edge_arrow_type: String,

    /// Labels longer than this are cut and suffixed with `...`
    pub maximum_node_label_length: Option<usize>,
}

impl Default for GraphStyle {
    fn default() -> Self {
        Self {
            root_node_color: "#00FF00".to_string(),
            dgml_root_node_color: "#FF00AA00".to_string(),
            component_node_color: "#0288d1".to_string(),
            module_node_color: "#e040fb".to_string(),
            pipe_node_color: "#ff9800".to_string(),
            directive_node_color: "#ffc107".to_string(),
            injectable_node_color: "#b71c1c".to_string(),
            import_edge_color: "#43a047".to_string(),
            export_edge_color: "#0288d1".to_string(),
            injectable_edge_color: "#ffc107".to_string(),
            uses_edge_color: "#ab47bc".to_string(),
            route_edge_color: "#ff0000".to_string(),
            root_node_shape: "box".to_string(),
            component_node_shape: "box".to_string(),
            module_node_shape: "box".to_string(),
            pipe_node_shape: "box".to_string(),
            directive_node_shape: "box".to_string(),
            injectable_node_shape: "box".to_string(),
            edge_arrow_type: "triangle".to_string(),
            maximum_node_label_length: None,
        }
    }
}

impl GraphStyle {
    pub fn node_color(&self, node_type: NodeType) -> &str {
        match node_type {
            NodeType::RootNode => &self.root_node_color,
            NodeType::Component => &self.component_node_color,
            NodeType::Module => &self.module_node_color,
            NodeType::Pipe => &self.pipe_node_color,
            NodeType::Directive => &self.directive_node_color,
            NodeType::Injectable => &self.injectable_node_color,
            NodeType::None => "",
        }
    }

    /// Like [`node_color`](Self::node_color) with the DGML root colour.
    pub fn dgml_node_color(&self, node_type: NodeType) -> &str {
        match node_type {
            NodeType::RootNode => &self.dgml_root_node_color,
            other => self.node_color(other),
        }
    }

    pub fn node_shape(&self, node_type: NodeType) -> Option<&str> {
        match node_type {
            NodeType::RootNode => Some(&self.root_node_shape),
            NodeType::Component => Some(&self.component_node_shape),
            NodeType::Module => Some(&self.module_node_shape),
            NodeType::Pipe => Some(&self.pipe_node_shape),
            NodeType::Directive => Some(&self.directive_node_shape),
            NodeType::Injectable => Some(&self.injectable_node_shape),
            NodeType::None => None,
        }
    }

    pub fn edge_color(&self, arrow_type: ArrowType) -> &str {
        match arrow_type {
            ArrowType::Import => &self.import_edge_color,
            ArrowType::Export => &self.export_edge_color,
            ArrowType::Injectable => &self.injectable_edge_color,
            ArrowType::Uses => &self.uses_edge_color,
            ArrowType::Route => &self.route_edge_color,
            ArrowType::None => "",
        }
    }

    /// Cut `name` to the configured maximum label length.
    pub fn label(&self, name: &str) -> String {
        match self.maximum_node_label_length {
            Some(max) if name.chars().count() > max => {
                let cut: String = name.chars().take(max).collect();
                format!("{}...", cut)
            }
            _ => name.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_truncation() {
        let mut style = GraphStyle::default();
        assert_eq!(style.label("HeroDetailComponent"), "HeroDetailComponent");
        style.maximum_node_label_length = Some(4);
        assert_eq!(style.label("HeroDetailComponent"), "Hero...");
        assert_eq!(style.label("Hero"), "Hero");
        assert_eq!(style.label("Héros"), "Héro...");
    }

    #[test]
    fn test_colors() {
        let style = GraphStyle::default();
        assert_eq!(style.node_color(NodeType::RootNode), "#00FF00");
        assert_eq!(style.dgml_node_color(NodeType::RootNode), "#FF00AA00");
        assert_eq!(style.dgml_node_color(NodeType::Module), "#e040fb");
        assert_eq!(style.node_color(NodeType::None), "");
        assert_eq!(style.edge_color(ArrowType::Route), "#ff0000");
        assert_eq!(style.node_shape(NodeType::None), None);
    }

    #[test]
    fn test_write_output_creates_directories() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("docs").join("graph.dot");
        write_output(&path, "digraph G {}").unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "digraph G {}");
    }
}
