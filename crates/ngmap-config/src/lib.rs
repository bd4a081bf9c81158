//! ngmap Configuration Management
//!
//! Provides configuration loading with support for:
//! - Global config: `~/.ngmap/config.toml`
//! - Local config: `.ngmap/config.toml` (in the Angular workspace)
//! - CLI overrides via `ConfigOverrides`
//!
//! Configuration is merged in order: global → local → CLI overrides.

mod error;
mod loader;

pub use error::ConfigError;
pub use loader::ConfigLoader;

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Directory names skipped while walking a workspace unless configured
/// otherwise.
pub const DEFAULT_EXCLUDE_DIRECTORIES: &[&str] = &[
    "bin",
    "obj",
    "node_modules",
    "dist",
    "packages",
    ".git",
    ".vs",
    ".github",
];

/// Root configuration for ngmap.
///
/// Represents the fully merged configuration from all sources.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct NgmapConfig {
    /// Workspace walking
    pub scan: ScanConfig,

    /// Colours, shapes and labels of exported graphs
    pub graph: GraphConfig,

    /// DGML document attributes
    pub dgml: DgmlConfig,

    /// Output file names
    pub output: OutputConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Workspace walking configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScanConfig {
    /// Directory names that are never entered
    pub exclude_directories: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            exclude_directories: DEFAULT_EXCLUDE_DIRECTORIES
                .iter()
                .map(|d| d.to_string())
                .collect(),
        }
    }
}

/// Graph styling.
///
/// # Example TOML
///
/// ```toml
/// [graph]
/// maximum_node_label_length = 40
///
/// [graph.node_colors]
/// component = "#1565c0"
///
/// [graph.edge_colors]
/// route = "#d50000"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GraphConfig {
    /// Labels longer than this are cut and suffixed with `...` (unset = no limit)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum_node_label_length: Option<usize>,

    /// Root colour in DGML (`#AARRGGBB`)
    pub dgml_root_color: String,

    /// vis-network arrow head
    pub edge_arrow_type: String,

    pub node_colors: NodeColors,
    pub edge_colors: EdgeColors,
    pub node_shapes: NodeShapes,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            maximum_node_label_length: None,
            dgml_root_color: "#FF00AA00".to_string(),
            edge_arrow_type: "triangle".to_string(),
            node_colors: NodeColors::default(),
            edge_colors: EdgeColors::default(),
            node_shapes: NodeShapes::default(),
        }
    }
}

/// Node colour per node type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NodeColors {
    pub root: String,
    pub component: String,
    pub module: String,
    pub pipe: String,
    pub directive: String,
    pub injectable: String,
}

impl Default for NodeColors {
    fn default() -> Self {
        Self {
            root: "#00FF00".to_string(),
            component: "#0288d1".to_string(),
            module: "#e040fb".to_string(),
            pipe: "#ff9800".to_string(),
            directive: "#ffc107".to_string(),
            injectable: "#b71c1c".to_string(),
        }
    }
}

/// Edge colour per arrow type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EdgeColors {
    pub import: String,
    pub export: String,
    pub injectable: String,
    pub uses: String,
    pub route: String,
}

impl Default for EdgeColors {
    fn default() -> Self {
        Self {
            import: "#43a047".to_string(),
            export: "#0288d1".to_string(),
            injectable: "#ffc107".to_string(),
            uses: "#ab47bc".to_string(),
            route: "#ff0000".to_string(),
        }
    }
}

/// Node shape per node type.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NodeShapes {
    pub root: String,
    pub component: String,
    pub module: String,
    pub pipe: String,
    pub directive: String,
    pub injectable: String,
}

impl Default for NodeShapes {
    fn default() -> Self {
        let shape = || "box".to_string();
        Self {
            root: shape(),
            component: shape(),
            module: shape(),
            pipe: shape(),
            directive: shape(),
            injectable: shape(),
        }
    }
}

/// Attributes of the `DirectedGraph` element.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DgmlConfig {
    pub layout: String,
    pub direction: String,
    pub zoom_level: String,
}

impl Default for DgmlConfig {
    fn default() -> Self {
        Self {
            layout: "Sugiyama".to_string(),
            direction: "LeftToRight".to_string(),
            zoom_level: "-1".to_string(),
        }
    }
}

const DGML_DIRECTIONS: &[&str] = &["TopToBottom", "BottomToTop", "LeftToRight", "RightToLeft"];

/// Report and graph file names.
///
/// Graph entries are file stems; the extension follows the chosen format.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for generated files (default: the workspace root)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,

    pub modules: String,
    pub component_hierarchy: String,
    pub module_graph: String,
    pub component_graph: String,
    pub dependency_injection_graph: String,
    pub imports: String,
    pub directories: String,
    pub packages: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: None,
            modules: "ReadMe-Modules.md".to_string(),
            component_hierarchy: "ComponentHierarchy.md".to_string(),
            module_graph: "ReadMe-ProjectStructure".to_string(),
            component_graph: "ReadMe-ComponentHierarchy".to_string(),
            dependency_injection_graph: "ReadMe-DependencyInjection".to_string(),
            imports: "ReadMe-Imports.txt".to_string(),
            directories: "ReadMe-ProjectDirectoryStructure.md".to_string(),
            packages: "ReadMe-PackagesJson.md".to_string(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::default(),
        }
    }
}

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Log output format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text format
    #[default]
    Text,
    /// JSON structured logging
    Json,
}

/// CLI overrides for configuration values.
///
/// Used to apply command-line arguments over file-based config.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Extra directory names to exclude
    pub exclude_directories: Vec<String>,

    /// Override the label length limit
    pub maximum_node_label_length: Option<usize>,

    /// Override the output directory
    pub output_directory: Option<PathBuf>,

    /// Override log level
    pub log_level: Option<String>,
}

impl NgmapConfig {
    /// Apply CLI overrides to this configuration.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        for directory in &overrides.exclude_directories {
            if !self.scan.exclude_directories.contains(directory) {
                self.scan.exclude_directories.push(directory.clone());
            }
        }

        if let Some(length) = overrides.maximum_node_label_length {
            self.graph.maximum_node_label_length = Some(length);
        }

        if let Some(ref dir) = overrides.output_directory {
            self.output.directory = Some(dir.clone());
        }

        if let Some(ref level) = overrides.log_level {
            self.logging.level = level.clone();
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.graph.maximum_node_label_length == Some(0) {
            return Err(ConfigError::invalid_value(
                "graph.maximum_node_label_length",
                "must be greater than 0",
            ));
        }
        if !DGML_DIRECTIONS.contains(&self.dgml.direction.as_str()) {
            return Err(ConfigError::invalid_value(
                "dgml.direction",
                format!(
                    "unknown direction '{}'. Valid values: {}",
                    self.dgml.direction,
                    DGML_DIRECTIONS.join(", ")
                ),
            ));
        }
        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::invalid_value(
                "logging.level",
                format!("unknown level '{}'", self.logging.level),
            ));
        }
        if let Some(entry) = self
            .scan
            .exclude_directories
            .iter()
            .find(|d| d.contains(['/', '\\']))
        {
            return Err(ConfigError::exclude_is_path(entry.as_str()));
        }
        Ok(())
    }

    /// Effective output directory for a workspace.
    pub fn output_dir(&self, workspace_root: &Path) -> PathBuf {
        match &self.output.directory {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => workspace_root.join(dir),
            None => workspace_root.to_path_buf(),
        }
    }

    /// Path of an output file for a workspace.
    pub fn output_path(&self, workspace_root: &Path, file_name: &str) -> PathBuf {
        self.output_dir(workspace_root).join(file_name)
    }

    /// Render as the TOML a config file would contain.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = NgmapConfig::default();
        assert!(config
            .scan
            .exclude_directories
            .contains(&"node_modules".to_string()));
        assert_eq!(config.scan.exclude_directories.len(), 8);
        assert_eq!(config.graph.node_colors.root, "#00FF00");
        assert_eq!(config.graph.dgml_root_color, "#FF00AA00");
        assert_eq!(config.dgml.layout, "Sugiyama");
        assert_eq!(config.output.modules, "ReadMe-Modules.md");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_apply_overrides() {
        let mut config = NgmapConfig::default();
        let overrides = ConfigOverrides {
            exclude_directories: vec!["e2e".to_string(), "node_modules".to_string()],
            maximum_node_label_length: Some(30),
            output_directory: Some(PathBuf::from("docs")),
            log_level: Some("debug".to_string()),
        };

        config.apply_overrides(&overrides);

        assert_eq!(config.scan.exclude_directories.len(), 9);
        assert!(config.scan.exclude_directories.contains(&"e2e".to_string()));
        assert_eq!(config.graph.maximum_node_label_length, Some(30));
        assert_eq!(config.output.directory, Some(PathBuf::from("docs")));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_output_dir_resolution() {
        let mut config = NgmapConfig::default();
        let workspace = PathBuf::from("/home/user/shop");
        assert_eq!(config.output_dir(&workspace), workspace);

        config.output.directory = Some(PathBuf::from("docs/generated"));
        assert_eq!(
            config.output_path(&workspace, "ReadMe-Modules.md"),
            PathBuf::from("/home/user/shop/docs/generated/ReadMe-Modules.md")
        );

        config.output.directory = Some(PathBuf::from("/tmp/out"));
        assert_eq!(config.output_dir(&workspace), PathBuf::from("/tmp/out"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = NgmapConfig::default();
        config.graph.maximum_node_label_length = Some(0);
        assert!(config
            .validate()
            .unwrap_err()
            .to_string()
            .contains("maximum_node_label_length"));

        let mut config = NgmapConfig::default();
        config.dgml.direction = "Sideways".to_string();
        assert!(config.validate().unwrap_err().to_string().contains("Sideways"));

        let mut config = NgmapConfig::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());

        let mut config = NgmapConfig::default();
        config.scan.exclude_directories.push("src/legacy".to_string());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ExcludeIsPath { ref entry }) if entry == "src/legacy"
        ));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: NgmapConfig = toml::from_str(
            r##"
            [graph.node_colors]
            component = "#123456"

            [logging]
            format = "json"
            "##,
        )
        .unwrap();

        assert_eq!(config.graph.node_colors.component, "#123456");
        assert_eq!(config.graph.node_colors.module, "#e040fb");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.dgml, DgmlConfig::default());
    }
}
