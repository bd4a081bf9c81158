//! Source Discovery Module
//!
//! Walks an Angular workspace and lists the directories and files the
//! scanners read. Directories whose name is in the exclude set are pruned
//! together with everything below them.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};
use walkdir::{DirEntry, WalkDir};

/// Directory names skipped by default.
pub const DEFAULT_EXCLUDE_DIRS: &[&str] = &[
    "bin",
    "obj",
    "node_modules",
    "dist",
    "packages",
    ".git",
    ".vs",
    ".github",
];

/// Errors during source discovery
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("Root path does not exist or is not a directory: {0}")]
    RootNotFound(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ScanError>;

/// A file that could not be read or parsed while scanning.
///
/// Scans keep going past these; callers decide how to report them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanIssue {
    /// File the problem was found in
    pub filename: PathBuf,
    /// Human-readable description
    pub message: String,
}

impl ScanIssue {
    pub fn new(filename: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ScanIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Filename: {}\n{}", self.filename.display(), self.message)
    }
}

/// Configuration for source discovery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryConfig {
    /// Directory names to skip, matched against the final path segment
    pub exclude_dirs: HashSet<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self::with_excludes(DEFAULT_EXCLUDE_DIRS.iter().copied())
    }
}

impl DiscoveryConfig {
    /// Build a configuration from an explicit exclude list.
    pub fn with_excludes<I, S>(exclude_dirs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            exclude_dirs: exclude_dirs.into_iter().map(Into::into).collect(),
        }
    }

    /// Check if a directory name is excluded
    pub fn is_excluded(&self, name: &str) -> bool {
        self.exclude_dirs.contains(name)
    }
}

/// Lists directories and files below a workspace root.
#[derive(Debug, Clone)]
pub struct SourceDiscovery {
    root: PathBuf,
    config: DiscoveryConfig,
}

impl SourceDiscovery {
    /// Create a discovery rooted at `root`.
    ///
    /// The root is canonicalized; it must exist and be a directory.
    pub fn new(root: &Path, config: DiscoveryConfig) -> Result<Self> {
        let canonical = root
            .canonicalize()
            .map_err(|_| ScanError::RootNotFound(root.to_path_buf()))?;
        if !canonical.is_dir() {
            return Err(ScanError::RootNotFound(root.to_path_buf()));
        }
        Ok(Self {
            root: canonical,
            config,
        })
    }

    /// Create a discovery with the default exclude set
    pub fn with_defaults(root: &Path) -> Result<Self> {
        Self::new(root, DiscoveryConfig::default())
    }

    /// The canonical workspace root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The active configuration
    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    fn root_is_excluded(&self) -> bool {
        self.root
            .file_name()
            .map(|name| self.config.is_excluded(&name.to_string_lossy()))
            .unwrap_or(false)
    }

    fn walk(&self) -> impl Iterator<Item = DirEntry> + '_ {
        WalkDir::new(&self.root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |e| {
                // The root itself is checked once up front
                if e.depth() == 0 || !e.file_type().is_dir() {
                    return true;
                }
                !self.config.is_excluded(&e.file_name().to_string_lossy())
            })
            .filter_map(|entry| match entry {
                Ok(e) => Some(e),
                Err(e) => {
                    warn!("Error walking directory: {}", e);
                    None
                }
            })
    }

    /// Every directory below the root that is not excluded.
    ///
    /// The root itself is not part of the result. Empty when the root's own
    /// name is excluded.
    pub fn list_directories(&self) -> Vec<PathBuf> {
        if self.root_is_excluded() {
            debug!("Root {:?} is excluded", self.root);
            return Vec::new();
        }

        let directories: Vec<PathBuf> = self
            .walk()
            .filter(|e| e.depth() > 0 && e.file_type().is_dir())
            .map(|e| e.into_path())
            .collect();

        info!("Found {} directories under {:?}", directories.len(), self.root);
        directories
    }

    /// Files in the root and in every listed directory accepted by `predicate`.
    pub fn list_files<F>(&self, predicate: F) -> Vec<PathBuf>
    where
        F: Fn(&Path) -> bool,
    {
        if self.root_is_excluded() {
            debug!("Root {:?} is excluded", self.root);
            return Vec::new();
        }

        let files: Vec<PathBuf> = self
            .walk()
            .filter(|e| e.file_type().is_file() && predicate(e.path()))
            .map(|e| e.into_path())
            .collect();

        debug!("Found {} matching files under {:?}", files.len(), self.root);
        files
    }

    /// Display form of `path` with the root replaced by `.`
    pub fn relative_display(&self, path: &Path) -> String {
        relative_display(&self.root, path)
    }
}

/// Display form of `path` with `root` replaced by `.`
///
/// Paths outside the root are shown unchanged. Separators are normalized
/// to `/`.
pub fn relative_display(root: &Path, path: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(rel) if rel.as_os_str().is_empty() => ".".to_string(),
        Ok(rel) => {
            let parts: Vec<String> = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            format!("./{}", parts.join("/"))
        }
        Err(_) => path.display().to_string(),
    }
}

/// Read a source file, replacing invalid UTF-8.
pub fn read_source(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|source| ScanError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

// ============================================================================
// File predicates
// ============================================================================

/// TypeScript sources worth scanning for decorators.
///
/// Barrel files, declaration files and specs are skipped.
pub fn is_typescript_file(path: &Path) -> bool {
    let name = file_name(path);
    name.ends_with(".ts")
        && name != "index.ts"
        && !name.ends_with(".d.ts")
        && !name.ends_with(".spec.ts")
}

/// Angular component classes by naming convention.
pub fn is_component_file(path: &Path) -> bool {
    file_name(path).ends_with(".component.ts")
}

/// Files that conventionally declare route tables.
pub fn is_routing_file(path: &Path) -> bool {
    let name = file_name(path);
    name.ends_with("-routing.module.ts")
        || name.ends_with(".routing.module.ts")
        || name.ends_with(".routing.ts")
        || name.ends_with(".routes.ts")
        || name == "routes.ts"
}

/// `package.json` manifests, case-insensitively.
pub fn is_package_json(path: &Path) -> bool {
    file_name(path).to_lowercase() == "package.json"
}
