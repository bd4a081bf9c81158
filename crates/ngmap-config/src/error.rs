//! Errors raised while loading, validating or writing ngmap configuration.

use std::path::PathBuf;
use thiserror::Error;

/// Why a global, local or `--config` file could not be used.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A config file exists but could not be read
    #[error("cannot read ngmap config '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A config file is not valid TOML or has a field of the wrong type
    #[error("invalid TOML in ngmap config '{path}': {source}")]
    ParseToml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("cannot render config as TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// `config init` or a save could not write the file
    #[error("cannot write ngmap config '{path}': {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `.ngmap` or `~/.ngmap` could not be created
    #[error("cannot create config directory '{path}': {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No home directory, so there is no `~/.ngmap`
    #[error("could not determine home directory")]
    NoHomeDir,

    /// A setting parsed but holds a value ngmap cannot use
    #[error("invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// `scan.exclude_directories` entries are matched against single
    /// directory names during the walk, so a path can never match
    #[error("scan.exclude_directories takes directory names, not paths: '{entry}'")]
    ExcludeIsPath { entry: String },
}

impl ConfigError {
    /// Read failure for the config file at `path`.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// TOML failure for the config file at `path`.
    pub fn parse_toml(path: impl Into<PathBuf>, source: toml::de::Error) -> Self {
        Self::ParseToml {
            path: path.into(),
            source,
        }
    }

    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::WriteFile {
            path: path.into(),
            source,
        }
    }

    pub fn create_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::CreateDir {
            path: path.into(),
            source,
        }
    }

    /// Rejected value of the dotted setting `key`, e.g. `dgml.direction`.
    pub fn invalid_value(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }

    pub fn exclude_is_path(entry: impl Into<String>) -> Self {
        Self::ExcludeIsPath {
            entry: entry.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ConfigError::NoHomeDir;
        assert_eq!(err.to_string(), "could not determine home directory");

        let err = ConfigError::invalid_value("dgml.direction", "unknown direction 'Up'");
        assert!(err.to_string().contains("dgml.direction"));
        assert!(err.to_string().contains("unknown direction"));
    }

    #[test]
    fn test_read_file_keeps_path() {
        let err = ConfigError::read_file(
            "/tmp/.ngmap/config.toml",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.to_string().starts_with("cannot read ngmap config"));
        assert!(err.to_string().contains("/tmp/.ngmap/config.toml"));
        assert!(err.to_string().contains("gone"));
    }

    #[test]
    fn test_exclude_is_path_names_entry() {
        let err = ConfigError::exclude_is_path("src/legacy");
        assert_eq!(
            err.to_string(),
            "scan.exclude_directories takes directory names, not paths: 'src/legacy'"
        );
    }
}
