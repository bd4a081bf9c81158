//! Markdown and plain-text reports.

use std::fmt::Write;
use std::path::Path;

use crate::component::ComponentHierarchy;
use crate::discovery::{relative_display, ScanIssue};
use crate::module::NgModule;
use crate::packages::{sorted_package_names, PackageSummary};
use crate::project::Project;
use crate::text::{array_to_markdown, escape_markdown_cell};

// ============================================================================
// Modules
// ============================================================================

/// Summary table of all modules followed by one section per module.
pub fn modules_markdown(project: &Project) -> String {
    let mut out = String::from("# Modules\n\n");
    out.push_str("## Modules in workspace\n\n");
    out.push_str("| Module | Declarations | Imports | Exports | Bootstrap | Providers | Entry points |\n");
    out.push_str("| ---| --- | --- | --- | --- | --- | --- |\n");

    let mut sections = String::new();
    for module in &project.modules {
        let stats: Vec<String> = module.stats().iter().map(|n| n.to_string()).collect();
        let _ = writeln!(out, "| {} | {} |", module.name, stats.join(" | "));
        sections.push_str(&module_section(module));
    }
    out.push('\n');
    out.push_str(&sections);
    out
}

fn module_section(module: &NgModule) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "## {}\n", module.name);
    let _ = writeln!(out, "Filename: {}\n", module.filename.display());
    out.push_str("| Section | Classes, service, modules |\n");
    out.push_str("| ---- |:-----------|\n");
    let rows: [(&str, &[String]); 6] = [
        ("Declarations", &module.declarations),
        ("Imports", &module.imports),
        ("Exports", &module.exports),
        ("Bootstrap", &module.bootstrap),
        ("Providers", &module.providers),
        ("Entry components", &module.entry_components),
    ];
    for (label, items) in rows {
        let _ = writeln!(out, "| {} | {} |", label, array_to_markdown(items));
    }
    out.push('\n');
    out
}

// ============================================================================
// Component hierarchy
// ============================================================================

/// Mermaid `graph TD` of every parent/child link reachable from a root.
pub fn component_hierarchy_markdown(hierarchy: &ComponentHierarchy) -> String {
    let mut relations = String::new();
    hierarchy.walk(|component, parent| {
        if let Some((parent, _)) = parent {
            let _ = writeln!(relations, "    {}-->{}", parent.key(), component.key());
        }
    });
    format!(
        "# Component hierarchy\n\n```mermaid\ngraph TD;\n{}```\n",
        relations
    )
}

// ============================================================================
// Directory structure
// ============================================================================

/// Listing of the workspace directories, relative to `root`.
pub fn directory_structure(root: &Path, directories: &[std::path::PathBuf]) -> String {
    let mut out = String::from("Project Directory Structure\n");
    let _ = writeln!(out, "Workspace directory: {}\n", root.display());
    out.push_str("Directories:\n");
    for directory in directories {
        let _ = writeln!(out, "{}", relative_display(root, directory));
    }
    out
}

// ============================================================================
// Import census
// ============================================================================

/// Import specifiers and how often each is imported.
pub fn import_census(root: &Path, counts: &[(String, usize)]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Imports for files in workspace: {}", root.display());
    out.push_str(
        "The number following each import in the list is the number of occurrences of the package import.\n\n",
    );
    for (specifier, count) in counts {
        let _ = writeln!(out, "{}: {}", specifier, count);
    }
    out
}

// ============================================================================
// package.json
// ============================================================================

/// Dependency, dev dependency and peer dependency tables.
pub fn packages_markdown(summary: &PackageSummary) -> String {
    let mut out = String::from("# Package.json\n\n");
    let groups = [
        ("Dependencies", &summary.dependencies),
        ("Dev dependencies", &summary.dev_dependencies),
        ("Peer dependencies", &summary.peer_dependencies),
    ];
    for (index, (title, names)) in groups.into_iter().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        let _ = writeln!(out, "## {}\n", title);
        out.push_str("| Name | Local version |\n");
        out.push_str("| ---- |:-----------|\n");
        for name in sorted_package_names(names) {
            let _ = writeln!(
                out,
                "| {} | {} |",
                escape_markdown_cell(name),
                escape_markdown_cell(summary.local_version(name))
            );
        }
    }
    out
}

// ============================================================================
// Issues
// ============================================================================

/// Report for files that failed to parse. `what` names the inputs, e.g.
/// "modules" or "files". Empty when there are no issues.
pub fn issues_report(what: &str, issues: &[ScanIssue]) -> String {
    if issues.is_empty() {
        return String::new();
    }
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Parsing of {} of the {} failed.\n",
        if issues.len() > 1 { "some" } else { "one" },
        what
    );
    out.push_str("Below is a list of the errors.\n");
    for issue in issues {
        let _ = writeln!(out, "{}\n", issue);
    }
    out
}
