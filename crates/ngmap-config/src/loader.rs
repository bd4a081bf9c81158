//! Configuration loader with inheritance support.
//!
//! Loads configuration from multiple sources and merges them:
//! 1. Global config: `~/.ngmap/config.toml`
//! 2. Local config: `.ngmap/config.toml` (in workspace)
//! 3. CLI overrides
//!
//! Later sources override earlier ones.

use crate::error::ConfigError;
use crate::{
    ConfigOverrides, DgmlConfig, EdgeColors, GraphConfig, LoggingConfig, NgmapConfig, NodeColors,
    NodeShapes, OutputConfig, ScanConfig,
};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Global configuration directory name.
const GLOBAL_CONFIG_DIR: &str = ".ngmap";

/// Local configuration directory name.
const LOCAL_CONFIG_DIR: &str = ".ngmap";

/// Configuration loader with caching and inheritance support.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Global config directory (e.g., `~/.ngmap`)
    global_config_dir: Option<PathBuf>,

    /// Cached global config
    global_config: Option<NgmapConfig>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader.
    ///
    /// Automatically detects the global config directory (`~/.ngmap`).
    pub fn new() -> Self {
        let global_config_dir = dirs::home_dir().map(|h| h.join(GLOBAL_CONFIG_DIR));

        Self {
            global_config_dir,
            global_config: None,
        }
    }

    /// Create a loader with a custom global config directory.
    ///
    /// Useful for testing.
    pub fn with_global_dir(global_dir: impl Into<PathBuf>) -> Self {
        Self {
            global_config_dir: Some(global_dir.into()),
            global_config: None,
        }
    }

    /// Get the global config file path.
    pub fn global_config_path(&self) -> Option<PathBuf> {
        self.global_config_dir
            .as_ref()
            .map(|d| d.join(CONFIG_FILE_NAME))
    }

    /// Get the local config file path for a workspace.
    pub fn local_config_path(&self, workspace_root: &Path) -> PathBuf {
        workspace_root.join(LOCAL_CONFIG_DIR).join(CONFIG_FILE_NAME)
    }

    /// Load configuration for a workspace with optional CLI overrides.
    ///
    /// Merges config in order: global → local → overrides.
    pub fn load(
        &mut self,
        workspace_root: &Path,
        overrides: Option<&ConfigOverrides>,
    ) -> Result<NgmapConfig, ConfigError> {
        let mut config = NgmapConfig::default();

        if let Some(global_config) = self.load_global()? {
            config = merge_configs(config, global_config);
        }

        if let Some(local_config) = self.load_local(workspace_root)? {
            config = merge_configs(config, local_config);
        }

        if let Some(ovr) = overrides {
            config.apply_overrides(ovr);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load a single explicit config file on top of the defaults.
    ///
    /// Used for `--config`; global and local files are not consulted.
    pub fn load_file(
        &self,
        path: &Path,
        overrides: Option<&ConfigOverrides>,
    ) -> Result<NgmapConfig, ConfigError> {
        debug!("Loading config from {:?}", path);
        let mut config = merge_configs(NgmapConfig::default(), load_config_file(path)?);
        if let Some(ovr) = overrides {
            config.apply_overrides(ovr);
        }
        config.validate()?;
        Ok(config)
    }

    /// Load only the global configuration.
    pub fn load_global(&mut self) -> Result<Option<NgmapConfig>, ConfigError> {
        if let Some(ref config) = self.global_config {
            return Ok(Some(config.clone()));
        }

        let Some(global_path) = self.global_config_path() else {
            debug!("No home directory found, skipping global config");
            return Ok(None);
        };

        if !global_path.exists() {
            trace!("Global config not found at {:?}", global_path);
            return Ok(None);
        }

        debug!("Loading global config from {:?}", global_path);
        let config = load_config_file(&global_path)?;

        self.global_config = Some(config.clone());

        Ok(Some(config))
    }

    /// Load only the local configuration for a workspace.
    pub fn load_local(&self, workspace_root: &Path) -> Result<Option<NgmapConfig>, ConfigError> {
        let local_path = self.local_config_path(workspace_root);

        if !local_path.exists() {
            trace!("Local config not found at {:?}", local_path);
            return Ok(None);
        }

        debug!("Loading local config from {:?}", local_path);
        load_config_file(&local_path).map(Some)
    }

    /// Save configuration to the global config file.
    pub fn save_global(&self, config: &NgmapConfig) -> Result<(), ConfigError> {
        let Some(ref global_dir) = self.global_config_dir else {
            return Err(ConfigError::NoHomeDir);
        };

        let global_path = global_dir.join(CONFIG_FILE_NAME);
        save_config_file(&global_path, config)
    }

    /// Save configuration to the local config file for a workspace.
    pub fn save_local(
        &self,
        workspace_root: &Path,
        config: &NgmapConfig,
    ) -> Result<(), ConfigError> {
        let local_path = self.local_config_path(workspace_root);
        save_config_file(&local_path, config)
    }

    /// Initialize global configuration directory.
    ///
    /// Creates `~/.ngmap/config.toml` with default configuration. An existing
    /// file is left untouched.
    pub fn init_global(&self) -> Result<PathBuf, ConfigError> {
        let Some(ref global_dir) = self.global_config_dir else {
            return Err(ConfigError::NoHomeDir);
        };
        init_config_dir(global_dir)
    }

    /// Initialize local configuration for a workspace.
    ///
    /// Creates `.ngmap/config.toml` with default configuration. An existing
    /// file is left untouched.
    pub fn init_local(&self, workspace_root: &Path) -> Result<PathBuf, ConfigError> {
        init_config_dir(&workspace_root.join(LOCAL_CONFIG_DIR))
    }

    /// Clear cached global configuration.
    ///
    /// Forces reload on next `load_global()` call.
    pub fn clear_cache(&mut self) {
        self.global_config = None;
    }
}

fn init_config_dir(dir: &Path) -> Result<PathBuf, ConfigError> {
    if !dir.exists() {
        std::fs::create_dir_all(dir).map_err(|e| ConfigError::create_dir(dir, e))?;
    }

    let config_path = dir.join(CONFIG_FILE_NAME);
    if !config_path.exists() {
        save_config_file(&config_path, &NgmapConfig::default())?;
    }

    Ok(config_path)
}

/// Load a configuration file from disk.
fn load_config_file(path: &Path) -> Result<NgmapConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;

    toml::from_str(&content).map_err(|e| ConfigError::parse_toml(path, e))
}

/// Save a configuration file to disk.
fn save_config_file(path: &Path, config: &NgmapConfig) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))
}

/// `overlay` unless it still holds the default, then `base`.
fn pick<T: PartialEq>(base: T, overlay: T, default: T) -> T {
    if overlay != default {
        overlay
    } else {
        base
    }
}

/// Merge two configurations, with `overlay` taking precedence.
///
/// This performs a field-by-field merge, allowing partial configs.
fn merge_configs(base: NgmapConfig, overlay: NgmapConfig) -> NgmapConfig {
    NgmapConfig {
        scan: merge_scan(base.scan, overlay.scan),
        graph: merge_graph(base.graph, overlay.graph),
        dgml: merge_dgml(base.dgml, overlay.dgml),
        output: merge_output(base.output, overlay.output),
        logging: merge_logging(base.logging, overlay.logging),
    }
}

/// Exclude lists extend each other.
fn merge_scan(base: ScanConfig, overlay: ScanConfig) -> ScanConfig {
    let mut exclude_directories = base.exclude_directories;
    for directory in overlay.exclude_directories {
        if !exclude_directories.contains(&directory) {
            exclude_directories.push(directory);
        }
    }
    ScanConfig {
        exclude_directories,
    }
}

fn merge_graph(base: GraphConfig, overlay: GraphConfig) -> GraphConfig {
    let default = GraphConfig::default();
    GraphConfig {
        maximum_node_label_length: overlay
            .maximum_node_label_length
            .or(base.maximum_node_label_length),
        dgml_root_color: pick(
            base.dgml_root_color,
            overlay.dgml_root_color,
            default.dgml_root_color,
        ),
        edge_arrow_type: pick(
            base.edge_arrow_type,
            overlay.edge_arrow_type,
            default.edge_arrow_type,
        ),
        node_colors: merge_node_colors(base.node_colors, overlay.node_colors),
        edge_colors: merge_edge_colors(base.edge_colors, overlay.edge_colors),
        node_shapes: merge_node_shapes(base.node_shapes, overlay.node_shapes),
    }
}

fn merge_node_colors(base: NodeColors, overlay: NodeColors) -> NodeColors {
    let default = NodeColors::default();
    NodeColors {
        root: pick(base.root, overlay.root, default.root),
        component: pick(base.component, overlay.component, default.component),
        module: pick(base.module, overlay.module, default.module),
        pipe: pick(base.pipe, overlay.pipe, default.pipe),
        directive: pick(base.directive, overlay.directive, default.directive),
        injectable: pick(base.injectable, overlay.injectable, default.injectable),
    }
}

fn merge_edge_colors(base: EdgeColors, overlay: EdgeColors) -> EdgeColors {
    let default = EdgeColors::default();
    EdgeColors {
        import: pick(base.import, overlay.import, default.import),
        export: pick(base.export, overlay.export, default.export),
        injectable: pick(base.injectable, overlay.injectable, default.injectable),
        uses: pick(base.uses, overlay.uses, default.uses),
        route: pick(base.route, overlay.route, default.route),
    }
}

fn merge_node_shapes(base: NodeShapes, overlay: NodeShapes) -> NodeShapes {
    let default = NodeShapes::default();
    NodeShapes {
        root: pick(base.root, overlay.root, default.root),
        component: pick(base.component, overlay.component, default.component),
        module: pick(base.module, overlay.module, default.module),
        pipe: pick(base.pipe, overlay.pipe, default.pipe),
        directive: pick(base.directive, overlay.directive, default.directive),
        injectable: pick(base.injectable, overlay.injectable, default.injectable),
    }
}

fn merge_dgml(base: DgmlConfig, overlay: DgmlConfig) -> DgmlConfig {
    let default = DgmlConfig::default();
    DgmlConfig {
        layout: pick(base.layout, overlay.layout, default.layout),
        direction: pick(base.direction, overlay.direction, default.direction),
        zoom_level: pick(base.zoom_level, overlay.zoom_level, default.zoom_level),
    }
}

fn merge_output(base: OutputConfig, overlay: OutputConfig) -> OutputConfig {
    let default = OutputConfig::default();
    OutputConfig {
        directory: overlay.directory.or(base.directory),
        modules: pick(base.modules, overlay.modules, default.modules),
        component_hierarchy: pick(
            base.component_hierarchy,
            overlay.component_hierarchy,
            default.component_hierarchy,
        ),
        module_graph: pick(base.module_graph, overlay.module_graph, default.module_graph),
        component_graph: pick(
            base.component_graph,
            overlay.component_graph,
            default.component_graph,
        ),
        dependency_injection_graph: pick(
            base.dependency_injection_graph,
            overlay.dependency_injection_graph,
            default.dependency_injection_graph,
        ),
        imports: pick(base.imports, overlay.imports, default.imports),
        directories: pick(base.directories, overlay.directories, default.directories),
        packages: pick(base.packages, overlay.packages, default.packages),
    }
}

fn merge_logging(base: LoggingConfig, overlay: LoggingConfig) -> LoggingConfig {
    let default = LoggingConfig::default();
    LoggingConfig {
        level: pick(base.level, overlay.level, default.level),
        format: pick(base.format, overlay.format, default.format),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LogFormat;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn create_test_config(content: &str, dir: &Path) -> PathBuf {
        let config_dir = dir.join(".ngmap");
        std::fs::create_dir_all(&config_dir).unwrap();
        let path = config_dir.join("config.toml");
        std::fs::write(&path, content).unwrap();
        path
    }

    fn write_global(global_dir: &Path, content: &str) {
        std::fs::create_dir_all(global_dir).unwrap();
        std::fs::write(global_dir.join("config.toml"), content).unwrap();
    }

    #[test]
    fn test_load_default_config() {
        let temp = TempDir::new().unwrap();
        let mut loader = ConfigLoader::with_global_dir(temp.path().join("global"));

        let config = loader.load(temp.path(), None).unwrap();

        assert_eq!(config, NgmapConfig::default());
    }

    #[test]
    fn test_load_local_config() {
        let temp = TempDir::new().unwrap();
        let mut loader = ConfigLoader::with_global_dir(temp.path().join("global"));

        create_test_config(
            r##"
            [graph]
            maximum_node_label_length = 25

            [dgml]
            direction = "TopToBottom"

            [output]
            modules = "docs-modules.md"
            "##,
            temp.path(),
        );

        let config = loader.load(temp.path(), None).unwrap();

        assert_eq!(config.graph.maximum_node_label_length, Some(25));
        assert_eq!(config.dgml.direction, "TopToBottom");
        assert_eq!(config.dgml.layout, "Sugiyama");
        assert_eq!(config.output.modules, "docs-modules.md");
        assert_eq!(config.output.packages, "ReadMe-PackagesJson.md");
    }

    #[test]
    fn test_local_overrides_global() {
        let temp = TempDir::new().unwrap();
        let global_dir = temp.path().join("global");

        write_global(
            &global_dir,
            r##"
            [logging]
            level = "debug"

            [graph.node_colors]
            component = "#111111"
            module = "#222222"
            "##,
        );

        create_test_config(
            r##"
            [graph.node_colors]
            component = "#333333"
            "##,
            temp.path(),
        );

        let mut loader = ConfigLoader::with_global_dir(&global_dir);
        let config = loader.load(temp.path(), None).unwrap();

        assert_eq!(config.graph.node_colors.component, "#333333");
        // Global values the local file leaves alone survive
        assert_eq!(config.graph.node_colors.module, "#222222");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_exclude_directories_merge() {
        let temp = TempDir::new().unwrap();
        let global_dir = temp.path().join("global");
        write_global(
            &global_dir,
            r#"
            [scan]
            exclude_directories = ["coverage"]
            "#,
        );
        create_test_config(
            r#"
            [scan]
            exclude_directories = ["e2e", "coverage"]
            "#,
            temp.path(),
        );

        let mut loader = ConfigLoader::with_global_dir(&global_dir);
        let overrides = ConfigOverrides {
            exclude_directories: vec!["legacy".to_string()],
            ..Default::default()
        };
        let config = loader.load(temp.path(), Some(&overrides)).unwrap();

        let excluded = &config.scan.exclude_directories;
        assert!(excluded.contains(&"node_modules".to_string()));
        assert_eq!(
            excluded[excluded.len() - 3..].to_vec(),
            vec!["coverage", "e2e", "legacy"]
        );
    }

    #[test]
    fn test_cli_overrides_all() {
        let temp = TempDir::new().unwrap();

        create_test_config(
            r#"
            [graph]
            maximum_node_label_length = 25

            [logging]
            level = "info"
            "#,
            temp.path(),
        );

        let mut loader = ConfigLoader::with_global_dir(temp.path().join("global"));

        let overrides = ConfigOverrides {
            maximum_node_label_length: Some(10),
            log_level: Some("trace".to_string()),
            ..Default::default()
        };

        let config = loader.load(temp.path(), Some(&overrides)).unwrap();

        assert_eq!(config.graph.maximum_node_label_length, Some(10));
        assert_eq!(config.logging.level, "trace");
    }

    #[test]
    fn test_invalid_local_config_is_rejected() {
        let temp = TempDir::new().unwrap();
        create_test_config("[dgml]\ndirection = \"Diagonal\"\n", temp.path());

        let mut loader = ConfigLoader::with_global_dir(temp.path().join("global"));
        let err = loader.load(temp.path(), None).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_malformed_toml_names_file() {
        let temp = TempDir::new().unwrap();
        let path = create_test_config("[graph\nbroken", temp.path());

        let mut loader = ConfigLoader::with_global_dir(temp.path().join("global"));
        match loader.load(temp.path(), None) {
            Err(ConfigError::ParseToml { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("Expected ParseToml error, got {:?}", other),
        }
    }

    #[test]
    fn test_load_file_ignores_local() {
        let temp = TempDir::new().unwrap();
        create_test_config("[logging]\nlevel = \"error\"\n", temp.path());
        let explicit = temp.path().join("ci.toml");
        std::fs::write(&explicit, "[logging]\nformat = \"json\"\n").unwrap();

        let loader = ConfigLoader::with_global_dir(temp.path().join("global"));
        let config = loader.load_file(&explicit, None).unwrap();

        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_save_and_load_config() {
        let temp = TempDir::new().unwrap();
        let loader = ConfigLoader::with_global_dir(temp.path().join("global"));

        let mut config = NgmapConfig::default();
        config.graph.edge_colors.route = "#000000".to_string();
        config.logging.level = "error".to_string();

        loader.save_local(temp.path(), &config).unwrap();

        let mut loader = ConfigLoader::with_global_dir(temp.path().join("global"));
        let loaded = loader.load(temp.path(), None).unwrap();

        assert_eq!(loaded.graph.edge_colors.route, "#000000");
        assert_eq!(loaded.logging.level, "error");
    }

    #[test]
    fn test_init_local_creates_config() {
        let temp = TempDir::new().unwrap();
        let loader = ConfigLoader::with_global_dir(temp.path().join("global"));

        let config_path = loader.init_local(temp.path()).unwrap();

        assert!(config_path.exists());
        assert!(config_path.ends_with(".ngmap/config.toml"));

        let content = std::fs::read_to_string(&config_path).unwrap();
        let parsed: NgmapConfig = toml::from_str(&content).unwrap();
        assert_eq!(parsed, NgmapConfig::default());
    }

    #[test]
    fn test_init_keeps_existing_file() {
        let temp = TempDir::new().unwrap();
        let global_dir = temp.path().join("global");
        write_global(&global_dir, "[logging]\nlevel = \"debug\"\n");

        let loader = ConfigLoader::with_global_dir(&global_dir);
        let path = loader.init_global().unwrap();

        assert_eq!(
            std::fs::read_to_string(path).unwrap(),
            "[logging]\nlevel = \"debug\"\n"
        );
    }

    #[test]
    fn test_cache_clearing() {
        let temp = TempDir::new().unwrap();
        let global_dir = temp.path().join("global");
        write_global(&global_dir, "[logging]\nlevel = \"debug\"\n");

        let mut loader = ConfigLoader::with_global_dir(&global_dir);

        let _ = loader.load_global().unwrap();
        assert!(loader.global_config.is_some());

        loader.clear_cache();
        assert!(loader.global_config.is_none());
    }
}
