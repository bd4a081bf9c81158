//! ngmap CLI - Angular workspace structure reports and graphs
//!
//! A command-line interface that scans an Angular workspace and writes
//! module tables, component hierarchies and dependency graphs.
//!
//! # Usage
//!
//! ```bash
//! # Modules table for the workspace in the current directory
//! ngmap modules
//!
//! # Component tree as Mermaid on stdout
//! ngmap components --stdout
//!
//! # Dependency injection graph as GraphViz
//! ngmap graph di --format dot
//!
//! # Every report at once
//! ngmap -w ~/src/shop all
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use ngmap_config::{ConfigOverrides, LogFormat, LoggingConfig};
use tracing_subscriber::EnvFilter;

mod commands;
mod progress;

/// ngmap - Angular project structure analysis
#[derive(Parser, Debug)]
#[command(name = "ngmap")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOptions,
}

/// Global options available to all commands
#[derive(Args, Debug, Clone)]
struct GlobalOptions {
    /// Angular workspace root (default: current directory)
    #[arg(long, short = 'w', global = true, env = "NGMAP_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to configuration file (replaces global and local config)
    #[arg(long, short = 'c', global = true, env = "NGMAP_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Suppress non-essential output
    #[arg(long, short = 'q', global = true)]
    quiet: bool,

    /// Additional directory names to skip (comma separated)
    #[arg(long, global = true, value_delimiter = ',')]
    exclude: Vec<String>,

    /// Cut graph labels longer than this
    #[arg(long, global = true)]
    max_label_length: Option<usize>,

    /// Directory for generated files
    #[arg(long, global = true)]
    output_dir: Option<PathBuf>,
}

impl GlobalOptions {
    /// Convert global options to config overrides
    pub fn to_config_overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            exclude_directories: self.exclude.clone(),
            maximum_node_label_length: self.max_label_length,
            output_directory: self.output_dir.clone(),
            log_level: None,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write the modules overview (Markdown tables)
    Modules(commands::modules::ModulesArgs),

    /// Write the component hierarchy (Mermaid in Markdown)
    Components(commands::components::ComponentsArgs),

    /// Export a module, component or dependency injection graph
    Graph(commands::graph::GraphArgs),

    /// Count how often each module specifier is imported
    Imports(commands::imports::ImportsArgs),

    /// List the workspace directories
    Dirs(commands::dirs::DirsArgs),

    /// Summarise package.json dependencies
    Packages(commands::packages::PackagesArgs),

    /// Write every report and graph
    All(commands::all::AllArgs),

    /// View and manage configuration
    #[command(subcommand)]
    Config(commands::config::ConfigCommand),
}

fn init_tracing(global: &GlobalOptions, logging: &LoggingConfig) -> Result<()> {
    let level = if global.quiet {
        "error"
    } else if global.verbose {
        "debug"
    } else {
        logging.level.as_str()
    };

    // RUST_LOG wins over flags and config
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let installed = match logging.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Text => builder.with_ansi(true).try_init(),
    };
    installed.map_err(|e| anyhow::anyhow!("Failed to install logger: {}", e))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let logging = commands::logging_config(&cli.global);
    init_tracing(&cli.global, &logging)?;

    match cli.command {
        Commands::Modules(args) => commands::modules::execute(args, cli.global),
        Commands::Components(args) => commands::components::execute(args, cli.global),
        Commands::Graph(args) => commands::graph::execute(args, cli.global),
        Commands::Imports(args) => commands::imports::execute(args, cli.global),
        Commands::Dirs(args) => commands::dirs::execute(args, cli.global),
        Commands::Packages(args) => commands::packages::execute(args, cli.global),
        Commands::All(args) => commands::all::execute(args, cli.global),
        Commands::Config(cmd) => commands::config::execute(cmd, cli.global),
    }
}
