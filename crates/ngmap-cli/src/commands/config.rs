//! Config command - View and manage configuration
//!
//! Provides commands for viewing ngmap configuration:
//! - Show the effective configuration, optionally with the source of each value
//! - Get a specific configuration value
//! - Show or create the configuration files

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Subcommand;
use ngmap_config::{ConfigLoader, NgmapConfig};
use serde::Serialize;
use serde_json::Value;

use super::{load_config, resolve_workspace};
use crate::GlobalOptions;

/// Config management commands
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show configuration values with their sources
    Show(ShowArgs),

    /// Get a specific configuration value
    Get(GetArgs),

    /// Show configuration file paths
    Path(PathArgs),

    /// Create a configuration file with the defaults
    Init(InitArgs),
}

/// Arguments for the show command
#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,

    /// Show only effective values (hide sources)
    #[arg(long)]
    effective: bool,
}

/// Arguments for the get command
#[derive(clap::Args, Debug)]
pub struct GetArgs {
    /// Configuration key (e.g., "graph.node_colors.pipe")
    key: String,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Arguments for the path command
#[derive(clap::Args, Debug)]
pub struct PathArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Arguments for the init command
#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Create the global config (~/.ngmap/config.toml) instead of the local one
    #[arg(long)]
    global: bool,
}

/// Configuration value with source information
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ConfigValue {
    /// Configuration key
    pub key: String,
    /// Effective value
    pub value: Value,
    /// Source of this value (default, global, local, file, cli)
    pub source: String,
}

/// Configuration paths
#[derive(Debug, Clone, Serialize)]
pub struct ConfigPaths {
    /// Global config file path
    pub global: Option<PathBuf>,
    /// Local config file path
    pub local: PathBuf,
    /// Whether global config exists
    pub global_exists: bool,
    /// Whether local config exists
    pub local_exists: bool,
}

/// Execute the config command
pub fn execute(cmd: ConfigCommand, global: GlobalOptions) -> Result<()> {
    match cmd {
        ConfigCommand::Show(args) => execute_show(args, global),
        ConfigCommand::Get(args) => execute_get(args, global),
        ConfigCommand::Path(args) => execute_path(args, global),
        ConfigCommand::Init(args) => execute_init(args, global),
    }
}

fn execute_show(args: ShowArgs, global: GlobalOptions) -> Result<()> {
    let workspace = resolve_workspace(&global)?;
    let effective = load_config(&global, &workspace)?;

    if args.effective {
        if args.json {
            println!("{}", serde_json::to_string_pretty(&effective)?);
        } else {
            print!("{}", effective.to_toml()?);
        }
        return Ok(());
    }

    let layers = config_layers(&global, &workspace)?;
    let values = collect_config_values(&effective, &layers)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&values)?);
    } else {
        print_config_values(&values)?;
    }
    Ok(())
}

fn execute_get(args: GetArgs, global: GlobalOptions) -> Result<()> {
    let workspace = resolve_workspace(&global)?;
    let config = load_config(&global, &workspace)?;

    let value = get_config_value(&config, &args.key)?
        .ok_or_else(|| anyhow::anyhow!("Unknown configuration key: {}", args.key))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        match value {
            Value::String(s) => println!("{}", s),
            Value::Bool(b) => println!("{}", b),
            Value::Number(n) => println!("{}", n),
            Value::Null => println!("null"),
            other => println!("{}", serde_json::to_string_pretty(&other)?),
        }
    }
    Ok(())
}

fn execute_path(args: PathArgs, global: GlobalOptions) -> Result<()> {
    let workspace = resolve_workspace(&global)?;
    let loader = ConfigLoader::new();

    let global_path = loader.global_config_path();
    let local_path = loader.local_config_path(&workspace);

    let paths = ConfigPaths {
        global_exists: global_path.as_ref().is_some_and(|p| p.exists()),
        local_exists: local_path.exists(),
        global: global_path,
        local: local_path,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&paths)?);
        return Ok(());
    }

    println!("Configuration Paths");
    println!("===================\n");
    match paths.global {
        Some(ref gp) => println!("Global: {} ({})", gp.display(), status(paths.global_exists)),
        None => println!("Global: not available (no home directory)"),
    }
    println!(
        "Local:  {} ({})",
        paths.local.display(),
        status(paths.local_exists)
    );
    if let Some(ref file) = global.config {
        println!("File:   {} (--config, replaces both)", file.display());
    }
    Ok(())
}

fn execute_init(args: InitArgs, global: GlobalOptions) -> Result<()> {
    let loader = ConfigLoader::new();
    let path = if args.global {
        loader
            .init_global()
            .context("Failed to create global config")?
    } else {
        let workspace = resolve_workspace(&global)?;
        loader
            .init_local(&workspace)
            .context("Failed to create local config")?
    };

    if !global.quiet {
        println!("Config file: {}", path.display());
    }
    Ok(())
}

fn status(exists: bool) -> &'static str {
    if exists {
        "exists"
    } else {
        "not found"
    }
}

/// Configuration files that contribute to the effective config, highest
/// precedence first, plus the config without CLI overrides.
struct ConfigLayers {
    files: Vec<(&'static str, NgmapConfig)>,
    without_cli: NgmapConfig,
}

fn config_layers(global: &GlobalOptions, workspace: &Path) -> Result<ConfigLayers> {
    let mut loader = ConfigLoader::new();

    if let Some(ref path) = global.config {
        let file = loader
            .load_file(path, None)
            .with_context(|| format!("Failed to load config file {}", path.display()))?;
        return Ok(ConfigLayers {
            files: vec![("file", file.clone())],
            without_cli: file,
        });
    }

    let mut files = Vec::new();
    if let Some(local) = loader.load_local(workspace)? {
        files.push(("local", local));
    }
    if let Some(global_config) = loader.load_global()? {
        files.push(("global", global_config));
    }
    let without_cli = loader.load(workspace, None)?;
    Ok(ConfigLayers { files, without_cli })
}

/// Get a configuration value by key path
fn get_config_value(config: &NgmapConfig, key: &str) -> Result<Option<Value>> {
    let json = serde_json::to_value(config)?;

    let mut current = &json;
    for part in key.split('.') {
        match current.get(part) {
            Some(v) => current = v,
            None => return Ok(None),
        }
    }
    Ok(Some(current.clone()))
}

/// Collect effective configuration values with the layer each one came from
fn collect_config_values(effective: &NgmapConfig, layers: &ConfigLayers) -> Result<Vec<ConfigValue>> {
    let effective_json = serde_json::to_value(effective)?;
    let without_cli = serde_json::to_value(&layers.without_cli)?;
    let default_json = serde_json::to_value(NgmapConfig::default())?;
    let files = layers
        .files
        .iter()
        .map(|(name, config)| Ok((*name, serde_json::to_value(config)?)))
        .collect::<Result<Vec<_>>>()?;

    let mut values = Vec::new();
    flatten_config("", &effective_json, &mut values);

    for value in &mut values {
        let lookup = |json: &Value| lookup_path(json, &value.key).cloned().unwrap_or(Value::Null);
        let default = lookup(&default_json);

        let source = if lookup(&without_cli) != value.value {
            "cli"
        } else {
            files
                .iter()
                .find(|(_, json)| lookup(json) != default)
                .map(|(name, _)| *name)
                .unwrap_or("default")
        };
        value.source = source.to_string();
    }
    Ok(values)
}

fn lookup_path<'a>(json: &'a Value, key: &str) -> Option<&'a Value> {
    key.split('.').try_fold(json, |current, part| current.get(part))
}

/// Recursively flatten config into key-value pairs
fn flatten_config(prefix: &str, json: &Value, values: &mut Vec<ConfigValue>) {
    match json {
        Value::Object(map) => {
            for (key, value) in map {
                let new_prefix = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                flatten_config(&new_prefix, value, values);
            }
        }
        _ => values.push(ConfigValue {
            key: prefix.to_string(),
            value: json.clone(),
            source: String::new(),
        }),
    }
}

/// Print configuration values grouped by section
fn print_config_values(values: &[ConfigValue]) -> Result<()> {
    println!("ngmap Configuration");
    println!("===================");

    let mut section = "";
    for value in values {
        let (current, name) = value.key.rsplit_once('.').unwrap_or(("", value.key.as_str()));
        if current != section {
            println!("\n[{}]", current);
            section = current;
        }
        let source = if value.source == "default" {
            String::new()
        } else {
            format!(" ({})", value.source)
        };
        println!("  {} = {}{}", name, serde_json::to_string(&value.value)?, source);
    }
    Ok(())
}
