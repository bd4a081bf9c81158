//! Decorator Scanning Module
//!
//! Extracts `@NgModule`, `@Component`, `@Directive`, `@Pipe` and
//! `@Injectable` classes from TypeScript sources with regular expressions
//! and bracket counting. This is a heuristic: it never builds a syntax tree
//! and accepts the occasional false positive or miss.
//!
//! ## Usage
//!
//! ```ignore
//! use ngmap_core::discovery::SourceDiscovery;
//! use ngmap_core::module::ProjectScanner;
//!
//! let discovery = SourceDiscovery::with_defaults(Path::new("my-app"))?;
//! let report = ProjectScanner::new(discovery).scan();
//! println!("{} modules", report.project.modules.len());
//! ```

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::discovery::{
    is_typescript_file, read_source, DiscoveryConfig, ScanIssue, SourceDiscovery,
};
use crate::project::Project;
use crate::sections::{
    balanced_end, extract_balanced, find_section, is_identifier, last_top_level_colon,
    split_key_value, split_top_level, strip_generics, unquote,
};
use crate::text::{compare_basenames, remove_comments};

// ============================================================================
// Patterns
// ============================================================================

static RE_NG_MODULE: Lazy<Regex> = Lazy::new(|| decorator_regex("NgModule"));
static RE_COMPONENT: Lazy<Regex> = Lazy::new(|| decorator_regex("Component"));
static RE_DIRECTIVE: Lazy<Regex> = Lazy::new(|| decorator_regex("Directive"));
static RE_PIPE: Lazy<Regex> = Lazy::new(|| decorator_regex("Pipe"));

static RE_INJECTABLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)@Injectable\s*\(\s*(\{.*?\})?\s*\)\s*export\s+(?:default\s+)?(?:abstract\s+)?class\s+(\w+)")
        .expect("Invalid injectable regex")
});

static RE_CONSTRUCTOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\bconstructor\s*\(").expect("Invalid constructor regex"));

static RE_INJECT_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"@Inject\s*\(\s*([A-Za-z_$][\w$.]*)\s*\)").expect("Invalid inject token regex")
});

static RE_INJECT_FUNCTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"=\s*inject\s*(?:<[^>]*>)?\s*\(\s*([A-Za-z_$][\w$]*)")
        .expect("Invalid inject function regex")
});

static RE_MEMBER_DECORATOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"@(Input|Output|ViewChildren|ViewChild|ContentChildren|ContentChild)\s*\(")
        .expect("Invalid member decorator regex")
});

static RE_DECORATED_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(?:@\w+\s*(?:\([^)]*\))?\s*)*(?:(?:public|private|protected|readonly|override|declare|static|accessor|set|get)\s+)*([A-Za-z_$][\w$]*)",
    )
    .expect("Invalid decorated name regex")
});

static RE_SIGNAL_MEMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"([A-Za-z_$][\w$]*)\s*=\s*(input|output|viewChildren|viewChild|contentChildren|contentChild)(?:\.required)?\s*[<(]",
    )
    .expect("Invalid signal member regex")
});

static RE_ROUTER_FOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"RouterModule\s*\.\s*for(?:Root|Child)\b").expect("Invalid router regex"));

static RE_SELECTOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)\bselector\s*:\s*(['"`])(.*?)['"`]"#).expect("Invalid selector regex")
});

static RE_TEMPLATE_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)\btemplateUrl\s*:\s*['"`](.*?)['"`]"#).expect("Invalid template url regex")
});

fn decorator_regex(decorator: &str) -> Regex {
    let pattern = format!(
        r"(?is)@{}\s*\(\s*(\{{.+?\}})\s*\)\s*export\s+(?:default\s+)?(?:abstract\s+)?class\s+(\w+)",
        decorator
    );
    Regex::new(&pattern).expect("Invalid decorator regex")
}

// ============================================================================
// Errors
// ============================================================================

/// Problems found while interpreting `@NgModule` metadata.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModuleParseError {
    /// A metadata array was opened but never closed
    #[error("unbalanced brackets in '{section}' section")]
    UnbalancedSection { section: String },
}

// ============================================================================
// Data Model
// ============================================================================

/// The metadata arrays of one `@NgModule` class.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NgModule {
    /// Class name
    pub name: String,
    /// Source file
    pub filename: PathBuf,
    pub imports: Vec<String>,
    pub exports: Vec<String>,
    pub declarations: Vec<String>,
    pub entry_components: Vec<String>,
    pub providers: Vec<String>,
    pub bootstrap: Vec<String>,
    /// Declares or imports router configuration
    pub is_routing_module: bool,
}

impl NgModule {
    /// Section sizes in summary-table order: declarations, imports,
    /// exports, bootstrap, providers, entry components.
    pub fn stats(&self) -> [usize; 6] {
        [
            self.declarations.len(),
            self.imports.len(),
            self.exports.len(),
            self.bootstrap.len(),
            self.providers.len(),
            self.entry_components.len(),
        ]
    }
}

/// Which Angular decorator a class carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecoratorKind {
    NgModule,
    Component,
    Directive,
    Pipe,
    Injectable,
}

impl DecoratorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DecoratorKind::NgModule => "NgModule",
            DecoratorKind::Component => "Component",
            DecoratorKind::Directive => "Directive",
            DecoratorKind::Pipe => "Pipe",
            DecoratorKind::Injectable => "Injectable",
        }
    }
}

/// A decorated class other than a module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NgClass {
    pub name: String,
    pub filename: PathBuf,
    pub kind: DecoratorKind,
    /// Component or directive selector, brackets kept
    pub selector: Option<String>,
    /// Raw `templateUrl` value
    pub template_url: Option<String>,
    /// Types requested through the constructor or `inject()`
    pub dependency_injections: Vec<String>,
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
    pub view_childs: Vec<String>,
    pub view_children: Vec<String>,
    pub content_childs: Vec<String>,
    pub content_children: Vec<String>,
}

impl NgClass {
    pub fn new(name: impl Into<String>, filename: impl Into<PathBuf>, kind: DecoratorKind) -> Self {
        Self {
            name: name.into(),
            filename: filename.into(),
            kind,
            selector: None,
            template_url: None,
            dependency_injections: Vec::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
            view_childs: Vec::new(),
            view_children: Vec::new(),
            content_childs: Vec::new(),
            content_children: Vec::new(),
        }
    }

    /// Labelled member lists that are not empty, in display order.
    pub fn member_groups(&self) -> Vec<(&'static str, &[String])> {
        [
            ("Inputs", self.inputs.as_slice()),
            ("Outputs", self.outputs.as_slice()),
            ("ViewChilds", self.view_childs.as_slice()),
            ("ViewChildren", self.view_children.as_slice()),
            ("ContentChilds", self.content_childs.as_slice()),
            ("ContentChildren", self.content_children.as_slice()),
        ]
        .into_iter()
        .filter(|(_, members)| !members.is_empty())
        .collect()
    }
}

/// Everything found in one source file.
#[derive(Debug, Clone, Default)]
pub struct ParsedFile {
    pub modules: Vec<NgModule>,
    pub classes: Vec<NgClass>,
    pub issues: Vec<ScanIssue>,
}

/// Result of scanning a whole workspace.
#[derive(Debug, Clone, Default)]
pub struct ScanReport {
    pub project: Project,
    /// Files that could not be read or parsed
    pub issues: Vec<ScanIssue>,
}

// ============================================================================
// Project Scanner
// ============================================================================

/// Scans every TypeScript file under a workspace for decorated classes.
pub struct ProjectScanner {
    discovery: SourceDiscovery,
}

impl ProjectScanner {
    pub fn new(discovery: SourceDiscovery) -> Self {
        Self { discovery }
    }

    pub fn discovery(&self) -> &SourceDiscovery {
        &self.discovery
    }

    /// Parse all TypeScript sources and merge them into a [`Project`].
    ///
    /// Files are processed in basename order. Parsing runs in parallel but
    /// the merge keeps that order, so results are deterministic.
    pub fn scan(&self) -> ScanReport {
        let mut files = self.discovery.list_files(is_typescript_file);
        files.sort_by(|a, b| compare_basenames(&a.to_string_lossy(), &b.to_string_lossy()));
        info!("Scanning {} TypeScript files", files.len());

        let parsed: Vec<ParsedFile> = files
            .par_iter()
            .map(|path| match read_source(path) {
                Ok(content) => parse_source(path, &content),
                Err(e) => {
                    warn!("Skipping {}: {}", path.display(), e);
                    ParsedFile {
                        issues: vec![ScanIssue::new(path, e.to_string())],
                        ..Default::default()
                    }
                }
            })
            .collect();

        let mut report = ScanReport::default();
        for file in parsed {
            for module in file.modules {
                report.project.add_module(module);
            }
            for class in file.classes {
                report.project.add_class(class);
            }
            report.issues.extend(file.issues);
        }

        info!("Project summary:");
        info!("  - Modules: {}", report.project.modules.len());
        info!("  - Components: {}", report.project.components.len());
        info!("  - Directives: {}", report.project.directives.len());
        info!("  - Pipes: {}", report.project.pipes.len());
        info!("  - Injectables: {}", report.project.injectables.len());
        if !report.issues.is_empty() {
            warn!("{} file(s) could not be parsed", report.issues.len());
        }
        report
    }
}

/// Scan the workspace at `root` with the given exclusions.
pub fn scan_project(root: &Path, config: DiscoveryConfig) -> crate::discovery::Result<ScanReport> {
    let discovery = SourceDiscovery::new(root, config)?;
    Ok(ProjectScanner::new(discovery).scan())
}

// ============================================================================
// Parsing
// ============================================================================

/// Find every decorated class in one file.
pub fn parse_source(filename: &Path, content: &str) -> ParsedFile {
    let mut parsed = ParsedFile::default();

    for caps in RE_NG_MODULE.captures_iter(content) {
        let (Some(metadata), Some(name)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        match parse_module_contents(metadata.as_str()) {
            Ok(mut module) => {
                module.name = name.as_str().to_string();
                module.is_routing_module |= module.name.ends_with("RoutingModule");
                module.filename = filename.to_path_buf();
                debug!("Found module {} in {}", module.name, filename.display());
                parsed.modules.push(module);
            }
            Err(e) => {
                warn!("Failed to parse module {} in {}: {}", name.as_str(), filename.display(), e);
                parsed.issues.push(ScanIssue::new(
                    filename,
                    format!("ModuleName: {}\nException: {}", name.as_str(), e),
                ));
            }
        }
    }

    let decorated: [(&Lazy<Regex>, DecoratorKind); 4] = [
        (&RE_COMPONENT, DecoratorKind::Component),
        (&RE_DIRECTIVE, DecoratorKind::Directive),
        (&RE_PIPE, DecoratorKind::Pipe),
        (&RE_INJECTABLE, DecoratorKind::Injectable),
    ];

    for (re, kind) in decorated {
        for caps in re.captures_iter(content) {
            let (Some(whole), Some(name)) = (caps.get(0), caps.get(2)) else {
                continue;
            };
            let mut class = NgClass::new(name.as_str(), filename, kind);
            if let Some(metadata) = caps.get(1) {
                let metadata = remove_comments(metadata.as_str());
                class.selector = RE_SELECTOR
                    .captures(&metadata)
                    .and_then(|c| c.get(2))
                    .map(|m| m.as_str().trim().to_string());
                class.template_url = RE_TEMPLATE_URL
                    .captures(&metadata)
                    .and_then(|c| c.get(1))
                    .map(|m| m.as_str().trim().to_string());
            }
            if let Some(body) = extract_class_body(content, whole.end()) {
                let body = remove_comments(body);
                class.dependency_injections = extract_constructor_dependencies(&body);
                for dependency in extract_inject_calls(&body) {
                    if !class.dependency_injections.contains(&dependency) {
                        class.dependency_injections.push(dependency);
                    }
                }
                collect_members(&body, &mut class);
            }
            debug!("Found {} {} in {}", kind.as_str(), class.name, filename.display());
            parsed.classes.push(class);
        }
    }

    parsed
}

/// Read the six metadata arrays out of an `@NgModule({...})` argument.
pub fn parse_module_contents(metadata: &str) -> Result<NgModule, ModuleParseError> {
    let metadata = remove_comments(metadata);
    let section = |name: &str| -> Result<Vec<String>, ModuleParseError> {
        match find_section(&metadata, name) {
            None => Ok(Vec::new()),
            Some(Some(text)) => Ok(split_top_level(text)),
            Some(None) => Err(ModuleParseError::UnbalancedSection {
                section: name.to_string(),
            }),
        }
    };

    let mut module = NgModule {
        imports: section("imports")?,
        exports: section("exports")?,
        declarations: section("declarations")?,
        entry_components: section("entryComponents")?,
        providers: section("providers")?
            .iter()
            .map(|p| format_provider(p))
            .collect(),
        bootstrap: section("bootstrap")?,
        ..Default::default()
    };
    module.is_routing_module = module.imports.iter().any(|i| RE_ROUTER_FOR.is_match(i));
    Ok(module)
}

/// Render a provider object literal as `X provided by Y`.
///
/// Anything that is not a `{ provide: ..., use...: ... }` literal is
/// returned unchanged.
pub fn format_provider(provider: &str) -> String {
    let trimmed = provider.trim();
    if !trimmed.starts_with('{') {
        return trimmed.to_string();
    }
    let Some(inner) = extract_balanced(trimmed, 0) else {
        return trimmed.to_string();
    };

    let mut provided = None;
    let mut provided_by = None;
    for element in split_top_level(inner) {
        let Some((key, value)) = split_key_value(&element) else {
            continue;
        };
        match key.as_str() {
            "provide" => provided = Some(unquote(&value).to_string()),
            "useClass" | "useValue" | "useFactory" | "useExisting" => {
                provided_by = Some(unquote(&value).to_string())
            }
            _ => {}
        }
    }

    match (provided, provided_by) {
        (Some(provided), Some(by)) => format!("{} provided by {}", provided, by),
        _ => trimmed.to_string(),
    }
}

/// Body of the class whose header ends at `after`, without the braces.
pub fn extract_class_body(content: &str, after: usize) -> Option<&str> {
    let open = after + content.get(after..)?.find('{')?;
    extract_balanced(content, open)
}

/// Types requested by the first constructor in a class body.
///
/// An `@Inject(TOKEN)` parameter yields `TOKEN`; otherwise the annotated
/// type is used with generic arguments, `| null` unions and array suffixes
/// removed. Parameters without a type are skipped.
pub fn extract_constructor_dependencies(body: &str) -> Vec<String> {
    let Some(m) = RE_CONSTRUCTOR.find(body) else {
        return Vec::new();
    };
    let Some(params) = extract_balanced(body, m.end() - 1) else {
        return Vec::new();
    };

    let mut dependencies = Vec::new();
    for param in split_top_level(params) {
        let dependency = if let Some(caps) = RE_INJECT_TOKEN.captures(&param) {
            caps.get(1).map(|t| t.as_str().to_string())
        } else {
            last_top_level_colon(&param).and_then(|idx| clean_type(&param[idx + 1..]))
        };
        if let Some(dependency) = dependency {
            if !dependencies.contains(&dependency) {
                dependencies.push(dependency);
            }
        }
    }
    dependencies
}

/// Types requested with the `inject()` function in field initialisers.
pub fn extract_inject_calls(body: &str) -> Vec<String> {
    let mut dependencies: Vec<String> = Vec::new();
    for caps in RE_INJECT_FUNCTION.captures_iter(body) {
        if let Some(m) = caps.get(1) {
            let name = m.as_str().to_string();
            if !dependencies.contains(&name) {
                dependencies.push(name);
            }
        }
    }
    dependencies
}

fn clean_type(raw: &str) -> Option<String> {
    let raw = raw.split('=').next().unwrap_or(raw);
    let raw = raw.split('|').next().unwrap_or(raw);
    let name = strip_generics(raw).trim_end_matches("[]").trim();
    if !name.is_empty() && name.split('.').all(is_identifier) {
        Some(name.to_string())
    } else {
        None
    }
}

/// Property names carrying `@<decorator>(...)` in a class body.
///
/// `decorator` is one of `Input`, `Output`, `ViewChild`, `ViewChildren`,
/// `ContentChild` or `ContentChildren`.
pub fn extract_decorated_members(body: &str, decorator: &str) -> Vec<String> {
    let mut members = Vec::new();
    for caps in RE_MEMBER_DECORATOR.captures_iter(body) {
        let (Some(whole), Some(kind)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if kind.as_str() != decorator {
            continue;
        }
        let Some(close) = balanced_end(body, whole.end() - 1) else {
            continue;
        };
        if let Some(name) = RE_DECORATED_NAME
            .captures(&body[close + 1..])
            .and_then(|c| c.get(1))
        {
            let name = name.as_str().to_string();
            if !members.contains(&name) {
                members.push(name);
            }
        }
    }
    members
}

/// Property names initialised with a signal query or signal input, such as
/// `name = input<string>()` or `items = viewChildren(ItemComponent)`.
pub fn extract_signal_members(body: &str, function: &str) -> Vec<String> {
    let mut members = Vec::new();
    for caps in RE_SIGNAL_MEMBER.captures_iter(body) {
        let (Some(name), Some(kind)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        if kind.as_str() == function && !members.iter().any(|m| m == name.as_str()) {
            members.push(name.as_str().to_string());
        }
    }
    members
}

fn collect_members(body: &str, class: &mut NgClass) {
    let targets: [(&str, &str, &mut Vec<String>); 6] = [
        ("Input", "input", &mut class.inputs),
        ("Output", "output", &mut class.outputs),
        ("ViewChild", "viewChild", &mut class.view_childs),
        ("ViewChildren", "viewChildren", &mut class.view_children),
        ("ContentChild", "contentChild", &mut class.content_childs),
        ("ContentChildren", "contentChildren", &mut class.content_children),
    ];
    for (decorator, function, members) in targets {
        members.extend(extract_decorated_members(body, decorator));
        for member in extract_signal_members(body, function) {
            if !members.contains(&member) {
                members.push(member);
            }
        }
    }
}
