//! Import census: how often each module specifier is imported.

use std::collections::HashMap;
use std::path::Path;

use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::Regex;
use tracing::{info, warn};

use crate::discovery::{is_typescript_file, read_source, DiscoveryConfig, SourceDiscovery};
use crate::text::compare_basenames;

static RE_FROM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i).*?\s+from\s+['"]([^'"]+)['"]"#).expect("Invalid import regex")
});

static RE_REQUIRE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i).*?\s+require\s*\(\s*['"]([^'"]+)['"]\s*\)"#).expect("Invalid require regex")
});

/// Specifier imported on a single line, if any. `require` wins when a line
/// has both forms.
pub fn import_on_line(line: &str) -> Option<&str> {
    RE_REQUIRE
        .captures(line)
        .or_else(|| RE_FROM.captures(line))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

/// Add the imports in `content` to `counts`.
pub fn count_in_source(content: &str, counts: &mut HashMap<String, usize>) {
    for line in content.lines() {
        if let Some(specifier) = import_on_line(line) {
            *counts.entry(specifier.to_string()).or_insert(0) += 1;
        }
    }
}

/// Sort a census by specifier basename.
pub fn sorted_counts(counts: HashMap<String, usize>) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = counts.into_iter().collect();
    // Full specifier as tiebreaker keeps the order stable across runs
    counts.sort_by(|a, b| compare_basenames(&a.0, &b.0).then_with(|| a.0.cmp(&b.0)));
    counts
}

/// Count imports over every TypeScript file under `discovery`'s root.
pub fn count_imports_in(discovery: &SourceDiscovery) -> Vec<(String, usize)> {
    let files = discovery.list_files(is_typescript_file);
    info!("Counting imports in {} files", files.len());

    let per_file: Vec<HashMap<String, usize>> = files
        .par_iter()
        .filter_map(|path| match read_source(path) {
            Ok(content) => {
                let mut counts = HashMap::new();
                count_in_source(&content, &mut counts);
                Some(counts)
            }
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                None
            }
        })
        .collect();

    let mut totals: HashMap<String, usize> = HashMap::new();
    for counts in per_file {
        for (specifier, count) in counts {
            *totals.entry(specifier).or_insert(0) += count;
        }
    }
    info!("Found {} distinct imports", totals.len());
    sorted_counts(totals)
}

/// Count imports in the workspace at `root`.
pub fn count_imports(
    root: &Path,
    config: DiscoveryConfig,
) -> crate::discovery::Result<Vec<(String, usize)>> {
    let discovery = SourceDiscovery::new(root, config)?;
    Ok(count_imports_in(&discovery))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_import_on_line() {
        assert_eq!(
            import_on_line("import { Component } from '@angular/core';"),
            Some("@angular/core")
        );
        assert_eq!(
            import_on_line(r#"import * as fs from "fs";"#),
            Some("fs")
        );
        assert_eq!(
            import_on_line("const path = require('path');"),
            Some("path")
        );
        assert_eq!(import_on_line("import './polyfills';"), None);
        assert_eq!(import_on_line("export class X {}"), None);
    }

    #[test]
    fn test_count_imports() {
        let temp = TempDir::new().unwrap();
        let app = temp.path().join("src");
        fs::create_dir_all(&app).unwrap();
        fs::write(
            app.join("a.component.ts"),
            "import { Component } from '@angular/core';\nimport { HeroService } from './hero.service';\n",
        )
        .unwrap();
        fs::write(
            app.join("hero.service.ts"),
            "import { Injectable } from '@angular/core';\nimport { HttpClient } from '@angular/common/http';\n",
        )
        .unwrap();
        // Excluded by the file predicate
        fs::write(app.join("a.spec.ts"), "import { TestBed } from '@angular/core/testing';\n").unwrap();

        let counts = count_imports(temp.path(), DiscoveryConfig::default()).unwrap();
        assert_eq!(
            counts,
            vec![
                ("@angular/core".to_string(), 2),
                ("./hero.service".to_string(), 1),
                ("@angular/common/http".to_string(), 1),
            ]
        );
    }
}
