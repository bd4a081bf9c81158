//! package.json dependency summary.
//!
//! Collects dependency names from every `package.json` in a workspace and
//! the local version ranges they are declared with.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::discovery::{is_package_json, read_source, DiscoveryConfig, ScanIssue, SourceDiscovery};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageJson {
    #[serde(default)]
    dependencies: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    dev_dependencies: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    peer_dependencies: BTreeMap<String, serde_json::Value>,
}

/// Union of dependencies over all package.json files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageSummary {
    pub dependencies: BTreeSet<String>,
    pub dev_dependencies: BTreeSet<String>,
    pub peer_dependencies: BTreeSet<String>,
    /// Package name to its declared versions, distinct values joined by `", "`
    pub local_versions: BTreeMap<String, String>,
    /// Files that could not be read or parsed
    pub issues: Vec<ScanIssue>,
}

impl PackageSummary {
    /// Merge one package.json document into the summary.
    pub fn add_manifest(&mut self, json: &str) -> Result<(), serde_json::Error> {
        let manifest: PackageJson = serde_json::from_str(json)?;
        // Same order as npm lists them: dev, regular, peer
        for (name, version) in &manifest.dev_dependencies {
            self.dev_dependencies.insert(name.clone());
            self.record_version(name, version);
        }
        for (name, version) in &manifest.dependencies {
            self.dependencies.insert(name.clone());
            self.record_version(name, version);
        }
        for (name, version) in &manifest.peer_dependencies {
            self.peer_dependencies.insert(name.clone());
            self.record_version(name, version);
        }
        Ok(())
    }

    fn record_version(&mut self, name: &str, version: &serde_json::Value) {
        let version = match version {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        match self.local_versions.get_mut(name) {
            Some(existing) => {
                if !existing.split(", ").any(|v| v == version) {
                    existing.push_str(", ");
                    existing.push_str(&version);
                }
            }
            None => {
                self.local_versions.insert(name.to_string(), version);
            }
        }
    }

    pub fn local_version(&self, name: &str) -> &str {
        self.local_versions.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
            && self.dev_dependencies.is_empty()
            && self.peer_dependencies.is_empty()
    }
}

/// Package names ordered as in the report: by name with any `@` removed.
pub fn sorted_package_names(names: &BTreeSet<String>) -> Vec<&str> {
    let mut sorted: Vec<&str> = names.iter().map(String::as_str).collect();
    sorted.sort_by(|a, b| a.replace('@', "").cmp(&b.replace('@', "")));
    sorted
}

/// Summarise every package.json under `discovery`'s root.
pub fn collect_packages_in(discovery: &SourceDiscovery) -> PackageSummary {
    let mut files = discovery.list_files(is_package_json);
    files.sort();
    info!("Reading {} package.json files", files.len());

    let mut summary = PackageSummary::default();
    for file in files {
        let result = read_source(&file)
            .map_err(|e| e.to_string())
            .and_then(|json| summary.add_manifest(&json).map_err(|e| e.to_string()));
        match result {
            Ok(()) => debug!("Read {}", file.display()),
            Err(message) => {
                warn!("Skipping {}: {}", file.display(), message);
                summary.issues.push(ScanIssue::new(&file, message));
            }
        }
    }
    summary
}

/// Summarise the package.json files of the workspace at `root`.
pub fn collect_packages(
    root: &Path,
    config: DiscoveryConfig,
) -> crate::discovery::Result<PackageSummary> {
    let discovery = SourceDiscovery::new(root, config)?;
    Ok(collect_packages_in(&discovery))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_add_manifest_merges_versions() {
        let mut summary = PackageSummary::default();
        summary
            .add_manifest(r#"{"dependencies": {"rxjs": "~7.8.0", "@angular/core": "^17.0.0"}}"#)
            .unwrap();
        summary
            .add_manifest(
                r#"{"devDependencies": {"rxjs": "~7.8.0", "typescript": "~5.2.0"},
                    "peerDependencies": {"@angular/core": "^16.0.0"}}"#,
            )
            .unwrap();

        assert_eq!(summary.local_version("rxjs"), "~7.8.0");
        assert_eq!(summary.local_version("@angular/core"), "^17.0.0, ^16.0.0");
        assert_eq!(summary.local_version("unknown"), "");
        assert!(summary.dev_dependencies.contains("typescript"));
        assert!(summary.peer_dependencies.contains("@angular/core"));
    }

    #[test]
    fn test_sorted_package_names_ignores_at() {
        let names: BTreeSet<String> = ["zone.js", "@angular/core", "rxjs", "@ngrx/store"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(
            sorted_package_names(&names),
            vec!["@angular/core", "@ngrx/store", "rxjs", "zone.js"]
        );
    }

    #[test]
    fn test_collect_packages_reports_bad_files() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("package.json"),
            r#"{"name": "app", "dependencies": {"rxjs": "~7.8.0"}}"#,
        )
        .unwrap();
        let lib = temp.path().join("projects").join("lib");
        fs::create_dir_all(&lib).unwrap();
        fs::write(lib.join("package.json"), "{ broken").unwrap();
        let ignored = temp.path().join("node_modules").join("rxjs");
        fs::create_dir_all(&ignored).unwrap();
        fs::write(ignored.join("package.json"), r#"{"dependencies": {"tslib": "2"}}"#).unwrap();

        let summary = collect_packages(temp.path(), DiscoveryConfig::default()).unwrap();
        assert_eq!(summary.dependencies.len(), 1);
        assert!(summary.dependencies.contains("rxjs"));
        assert_eq!(summary.issues.len(), 1);
    }
}
