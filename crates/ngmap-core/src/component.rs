//! Component Hierarchy Module
//!
//! Builds the parent/child tree of Angular components. A component is the
//! child of another when its selector shows up in the other's template, or
//! when a router configuration places it under a component that hosts a
//! `<router-outlet>`.
//!
//! Children are stored as selector keys into [`ComponentHierarchy`], so a
//! component used from several parents exists once and cycles are harmless.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use rayon::prelude::*;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::discovery::{
    is_component_file, is_routing_file, is_typescript_file, read_source, DiscoveryConfig,
    ScanIssue, SourceDiscovery,
};
use crate::routes::{declares_routes, parse_routes, Route};
use crate::sections::extract_balanced;
use crate::text::{compare_basenames, remove_comments};

// ============================================================================
// Patterns
// ============================================================================

static RE_COMPONENT_DECORATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@Component\s*\(").expect("Invalid component regex"));

static RE_EXPORT_CLASS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"export\s+(?:default\s+)?(?:abstract\s+)?class\s+([A-Za-z_$][\w$]*)")
        .expect("Invalid export class regex")
});

static RE_SELECTOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)\bselector\s*:\s*(['"`])(.*?)['"`]"#).expect("Invalid selector regex")
});

static RE_TEMPLATE_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)\btemplateUrl\s*:\s*['"`](.*?)['"`]"#).expect("Invalid template url regex")
});

static RE_INLINE_TEMPLATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)\btemplate\s*:\s*(?:`(.*?)`|'((?:[^'\\]|\\.)*)'|"((?:[^"\\]|\\.)*)")"#)
        .expect("Invalid inline template regex")
});

// ============================================================================
// Data Model
// ============================================================================

/// How a child was attached to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChildKind {
    /// Selector used in the parent's template
    Template,
    /// Routed into the parent's `<router-outlet>`
    Route,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    /// Class name
    pub name: String,
    pub ts_filename: PathBuf,
    /// Resolved `templateUrl`, if any
    pub template_filename: Option<PathBuf>,
    pub inline_template: Option<String>,
    /// Selector with attribute brackets removed
    pub selector: String,
    /// Selectors of components used in this component's template
    pub sub_components: Vec<String>,
    /// Selectors of components routed into this component's outlet
    pub route_children: Vec<String>,
    /// Not used by any other component
    pub is_root: bool,
    /// Template contains `<router-outlet>`
    pub is_router_outlet: bool,
}

impl Component {
    /// Key under which the component is stored in a hierarchy.
    pub fn key(&self) -> &str {
        if self.selector.is_empty() {
            &self.name
        } else {
            &self.selector
        }
    }

    /// Template and route children, template children first.
    pub fn children(&self) -> impl Iterator<Item = (&str, ChildKind)> {
        self.sub_components
            .iter()
            .map(|s| (s.as_str(), ChildKind::Template))
            .chain(
                self.route_children
                    .iter()
                    .map(|s| (s.as_str(), ChildKind::Route)),
            )
    }

    fn add_child(&mut self, key: &str, kind: ChildKind) -> bool {
        let list = match kind {
            ChildKind::Template => &mut self.sub_components,
            ChildKind::Route => &mut self.route_children,
        };
        if list.iter().any(|c| c == key) {
            return false;
        }
        list.push(key.to_string());
        true
    }
}

/// All components of a workspace keyed by selector.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComponentHierarchy {
    pub components: BTreeMap<String, Component>,
}

impl ComponentHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a component. A key already taken keeps its first component.
    pub fn insert(&mut self, component: Component) -> bool {
        let key = component.key().to_string();
        if let Some(existing) = self.components.get(&key) {
            warn!(
                "Duplicate selector '{}' in {} (already defined in {})",
                key,
                component.ts_filename.display(),
                existing.ts_filename.display()
            );
            return false;
        }
        self.components.insert(key, component);
        true
    }

    pub fn get(&self, key: &str) -> Option<&Component> {
        self.components.get(key)
    }

    pub fn find_by_class(&self, class_name: &str) -> Option<&Component> {
        self.components.values().find(|c| c.name == class_name)
    }

    pub fn roots(&self) -> impl Iterator<Item = &Component> {
        self.components.values().filter(|c| c.is_root)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Depth-first walk from every root.
    ///
    /// Roots are visited with no parent. Every parent/child link reachable
    /// from a root is visited once, but a component's own children are only
    /// expanded the first time it is reached.
    pub fn walk<F>(&self, mut visit: F)
    where
        F: FnMut(&Component, Option<(&Component, ChildKind)>),
    {
        let mut expanded: HashSet<&str> = HashSet::new();
        for root in self.roots() {
            visit(root, None);
            self.walk_from(root, &mut expanded, &mut visit);
        }
    }

    fn walk_from<'a, F>(&'a self, parent: &'a Component, expanded: &mut HashSet<&'a str>, visit: &mut F)
    where
        F: FnMut(&Component, Option<(&Component, ChildKind)>),
    {
        if !expanded.insert(parent.key()) {
            return;
        }
        for (key, kind) in parent.children() {
            let Some(child) = self.components.get(key) else {
                continue;
            };
            visit(child, Some((parent, kind)));
            self.walk_from(child, expanded, visit);
        }
    }

    /// Link components through their templates.
    pub fn enrich_from_templates(&mut self) {
        let keys: Vec<String> = self.components.keys().cloned().collect();
        let mut links: Vec<(String, String)> = Vec::new();
        let mut outlets: Vec<String> = Vec::new();

        for (key, component) in &self.components {
            let Some(template) = load_template(component) else {
                continue;
            };
            for other in &keys {
                if other != key && template_uses(&template, other) {
                    links.push((key.clone(), other.clone()));
                }
            }
            if template.contains("<router-outlet") {
                outlets.push(key.clone());
            }
        }

        for key in outlets {
            if let Some(component) = self.components.get_mut(&key) {
                component.is_router_outlet = true;
            }
        }
        for (parent, child) in links {
            self.link(&parent, &child, ChildKind::Template);
        }
    }

    /// Link components through router configurations in `routing_files`.
    pub fn enrich_from_routes(&mut self, routing_files: &[PathBuf]) -> Vec<ScanIssue> {
        let mut issues = Vec::new();
        for file in routing_files {
            let content = match read_source(file) {
                Ok(content) => content,
                Err(e) => {
                    warn!("Skipping routing file {}: {}", file.display(), e);
                    issues.push(ScanIssue::new(file, e.to_string()));
                    continue;
                }
            };
            let routes = parse_routes(&content);
            if routes.is_empty() {
                continue;
            }
            let host = file.parent().and_then(|dir| self.router_host_for(dir));
            debug!(
                "{} routes in {} (host: {})",
                routes.len(),
                file.display(),
                host.as_deref().unwrap_or("none")
            );
            self.attach_routes(host.as_deref(), &routes);
        }
        issues
    }

    fn attach_routes(&mut self, host: Option<&str>, routes: &[Route]) {
        for route in routes {
            let routed = route
                .component
                .as_deref()
                .and_then(|class| self.find_by_class(class))
                .map(|c| c.key().to_string());
            match routed {
                Some(child) => {
                    if let Some(host) = host {
                        self.link(host, &child, ChildKind::Route);
                    }
                    self.attach_routes(Some(&child), &route.children);
                }
                None => self.attach_routes(host, &route.children),
            }
        }
    }

    fn link(&mut self, parent: &str, child: &str, kind: ChildKind) {
        if parent == child {
            return;
        }
        let added = match self.components.get_mut(parent) {
            Some(component) => component.add_child(child, kind),
            None => false,
        };
        if added {
            if let Some(component) = self.components.get_mut(child) {
                component.is_root = false;
            }
        }
    }

    /// Router-outlet component in `dir` or the nearest ancestor that has one.
    fn router_host_for(&self, dir: &Path) -> Option<String> {
        let mut current = Some(dir);
        while let Some(dir) = current {
            let host = self
                .components
                .values()
                .find(|c| c.is_router_outlet && c.ts_filename.parent() == Some(dir));
            if let Some(host) = host {
                return Some(host.key().to_string());
            }
            current = dir.parent();
        }
        None
    }
}

// ============================================================================
// Scanner
// ============================================================================

/// Result of a component scan.
#[derive(Debug, Clone, Default)]
pub struct ComponentReport {
    pub hierarchy: ComponentHierarchy,
    pub issues: Vec<ScanIssue>,
}

pub struct ComponentScanner {
    discovery: SourceDiscovery,
}

impl ComponentScanner {
    pub fn new(discovery: SourceDiscovery) -> Self {
        Self { discovery }
    }

    pub fn scan(&self) -> ComponentReport {
        let mut files = self.discovery.list_files(is_component_file);
        files.sort_by(|a, b| compare_basenames(&a.to_string_lossy(), &b.to_string_lossy()));
        info!("Scanning {} component files", files.len());

        let parsed: Vec<Result<Option<Component>, ScanIssue>> = files
            .par_iter()
            .map(|path| {
                read_source(path)
                    .map(|content| parse_component(path, &content))
                    .map_err(|e| ScanIssue::new(path, e.to_string()))
            })
            .collect();

        let mut report = ComponentReport::default();
        for result in parsed {
            match result {
                Ok(Some(component)) => {
                    report.hierarchy.insert(component);
                }
                Ok(None) => {}
                Err(issue) => {
                    warn!("{}", issue);
                    report.issues.push(issue);
                }
            }
        }

        report.hierarchy.enrich_from_templates();
        let routing_files = self.routing_files();
        let issues = report.hierarchy.enrich_from_routes(&routing_files);
        report.issues.extend(issues);

        info!("Component summary:");
        info!("  - Components: {}", report.hierarchy.len());
        info!("  - Roots: {}", report.hierarchy.roots().count());
        info!("  - Routing files: {}", routing_files.len());
        report
    }

    /// Conventionally named routing files, then every other TypeScript file
    /// that declares a route table inline.
    pub fn routing_files(&self) -> Vec<PathBuf> {
        let mut files = self.discovery.list_files(is_routing_file);
        files.sort();

        let mut candidates = self
            .discovery
            .list_files(|path| is_typescript_file(path) && !is_routing_file(path));
        candidates.sort();
        let inline: Vec<PathBuf> = candidates
            .into_par_iter()
            .filter(|path| {
                read_source(path)
                    .map(|content| declares_routes(&content))
                    .unwrap_or(false)
            })
            .collect();
        if !inline.is_empty() {
            debug!("{} files declare routes inline", inline.len());
        }

        files.extend(inline);
        files
    }
}

/// Scan the workspace at `root` for components.
pub fn scan_components(
    root: &Path,
    config: DiscoveryConfig,
) -> crate::discovery::Result<ComponentReport> {
    let discovery = SourceDiscovery::new(root, config)?;
    Ok(ComponentScanner::new(discovery).scan())
}

// ============================================================================
// Parsing
// ============================================================================

/// Read the `@Component` metadata and class name from a component file.
pub fn parse_component(ts_filename: &Path, content: &str) -> Option<Component> {
    let content = remove_comments(content);
    let decorator = RE_COMPONENT_DECORATOR.find(&content)?;
    let metadata = extract_balanced(&content, decorator.end() - 1)?;
    let after = decorator.end() + metadata.len();

    let name = RE_EXPORT_CLASS
        .captures(&content[after..])
        .and_then(|c| c.get(1))?
        .as_str()
        .to_string();

    let selector = RE_SELECTOR
        .captures(metadata)
        .and_then(|c| c.get(2))
        .map(|m| m.as_str().replace(['[', ']'], "").trim().to_string())
        .unwrap_or_default();

    let template_filename = RE_TEMPLATE_URL
        .captures(metadata)
        .and_then(|c| c.get(1))
        .map(|m| resolve_template(ts_filename, m.as_str().trim()));

    let inline_template = if template_filename.is_none() {
        RE_INLINE_TEMPLATE.captures(metadata).and_then(|c| {
            c.get(1)
                .or_else(|| c.get(2))
                .or_else(|| c.get(3))
                .map(|m| m.as_str().to_string())
        })
    } else {
        None
    };

    Some(Component {
        name,
        ts_filename: ts_filename.to_path_buf(),
        template_filename,
        inline_template,
        selector,
        sub_components: Vec::new(),
        route_children: Vec::new(),
        is_root: true,
        is_router_outlet: false,
    })
}

fn resolve_template(ts_filename: &Path, template_url: &str) -> PathBuf {
    let dir = ts_filename.parent().unwrap_or_else(|| Path::new(""));
    let mut resolved = dir.to_path_buf();
    for part in template_url.split(['/', '\\']) {
        match part {
            "" | "." => {}
            ".." => {
                resolved.pop();
            }
            part => resolved.push(part),
        }
    }
    resolved
}

fn load_template(component: &Component) -> Option<String> {
    if let Some(inline) = &component.inline_template {
        return Some(inline.clone());
    }
    let path = component.template_filename.as_ref()?;
    match read_source(path) {
        Ok(template) => Some(template),
        Err(e) => {
            warn!("Template of {} not readable: {}", component.name, e);
            None
        }
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Whether `template` uses the component with `selector`.
///
/// Matches a closing tag `</selector>`, an opening tag `<selector` and an
/// attribute ` selector`, the latter two only when followed by a character
/// that cannot continue a name or by the end of the template.
pub fn template_uses(template: &str, selector: &str) -> bool {
    if selector.is_empty() {
        return false;
    }
    if template.contains(&format!("</{}>", selector)) {
        return true;
    }
    for prefix in ['<', ' '] {
        let needle = format!("{}{}", prefix, selector);
        let mut start = 0;
        while let Some(found) = template[start..].find(&needle) {
            let end = start + found + needle.len();
            match template[end..].chars().next() {
                None => return true,
                Some(c) if !is_name_char(c) => return true,
                Some(_) => {}
            }
            start = start + found + prefix.len_utf8();
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn component(name: &str, selector: &str, dir: &str, template: &str) -> Component {
        Component {
            name: name.to_string(),
            ts_filename: PathBuf::from(dir).join(format!("{}.component.ts", selector)),
            template_filename: None,
            inline_template: Some(template.to_string()),
            selector: selector.to_string(),
            sub_components: Vec::new(),
            route_children: Vec::new(),
            is_root: true,
            is_router_outlet: false,
        }
    }

    #[test]
    fn test_parse_component_with_template_url() {
        let source = r#"
import { Component } from '@angular/core';

@Component({
  selector: 'app-hero-list',
  templateUrl: '../shared/hero-list.component.html',
  styleUrls: ['./hero-list.component.css'],
})
export class HeroListComponent {}
"#;
        let component =
            parse_component(Path::new("src/app/heroes/hero-list.component.ts"), source).unwrap();
        assert_eq!(component.name, "HeroListComponent");
        assert_eq!(component.selector, "app-hero-list");
        assert_eq!(
            component.template_filename,
            Some(PathBuf::from("src/app/shared/hero-list.component.html"))
        );
        assert!(component.inline_template.is_none());
        assert!(component.is_root);
    }

    #[test]
    fn test_parse_component_inline_template_and_attribute_selector() {
        let source = r#"
@Component({
  selector: '[appTooltip]',
  template: `<span>{{ text }}</span>`,
})
export class TooltipComponent {}
"#;
        let component = parse_component(Path::new("tooltip.component.ts"), source).unwrap();
        assert_eq!(component.selector, "appTooltip");
        assert_eq!(
            component.inline_template.as_deref(),
            Some("<span>{{ text }}</span>")
        );
    }

    #[test]
    fn test_parse_component_without_decorator() {
        assert!(parse_component(Path::new("x.component.ts"), "export class X {}").is_none());
    }

    #[test]
    fn test_template_uses() {
        assert!(template_uses("<app-item></app-item>", "app-item"));
        assert!(template_uses("<app-item\n  [x]=\"1\">", "app-item"));
        assert!(template_uses("<div appTooltip>", "appTooltip"));
        assert!(template_uses("<div appTooltip", "appTooltip"));
        assert!(template_uses("<app-item", "app-item"));
        assert!(!template_uses("<div appTooltipX", "appTooltip"));
        assert!(!template_uses("<app-items></app-items>", "app-item"));
        assert!(!template_uses("<app-item-detail>", "app-item"));
        assert!(!template_uses("anything", ""));
    }

    #[test]
    fn test_enrich_from_templates() {
        let mut hierarchy = ComponentHierarchy::new();
        hierarchy.insert(component(
            "AppComponent",
            "app-root",
            "src/app",
            "<app-nav></app-nav><router-outlet></router-outlet>",
        ));
        hierarchy.insert(component("NavComponent", "app-nav", "src/app", "<app-root>"));
        hierarchy.insert(component("ItemComponent", "app-item", "src/app", "<app-item>"));
        hierarchy.enrich_from_templates();

        let root = hierarchy.get("app-root").unwrap();
        assert_eq!(root.sub_components, vec!["app-nav"]);
        assert!(root.is_router_outlet);
        // Mutual use clears both flags
        assert!(!root.is_root);
        assert!(!hierarchy.get("app-nav").unwrap().is_root);
        // Self-reference does not count
        let item = hierarchy.get("app-item").unwrap();
        assert!(item.sub_components.is_empty());
        assert!(item.is_root);
    }

    #[test]
    fn test_duplicate_selector_keeps_first() {
        let mut hierarchy = ComponentHierarchy::new();
        assert!(hierarchy.insert(component("A", "app-x", "a", "")));
        assert!(!hierarchy.insert(component("B", "app-x", "b", "")));
        assert_eq!(hierarchy.get("app-x").unwrap().name, "A");
    }

    #[test]
    fn test_enrich_from_routes_uses_nearest_outlet() {
        let temp = TempDir::new().unwrap();
        let app = temp.path().join("app");
        let heroes = app.join("heroes");
        fs::create_dir_all(&heroes).unwrap();
        let routing = heroes.join("heroes-routing.module.ts");
        fs::write(
            &routing,
            r#"
const routes: Routes = [
  { path: 'heroes', component: HeroesComponent, children: [
    { path: ':id', component: HeroDetailComponent },
  ] },
  { path: 'x', children: [{ path: 'y', component: OrphanComponent }] },
];
"#,
        )
        .unwrap();

        let mut hierarchy = ComponentHierarchy::new();
        let mut shell = component("AppComponent", "app-root", app.to_str().unwrap(), "");
        shell.is_router_outlet = true;
        hierarchy.insert(shell);
        hierarchy.insert(component("HeroesComponent", "app-heroes", heroes.to_str().unwrap(), ""));
        hierarchy.insert(component("HeroDetailComponent", "app-hero-detail", heroes.to_str().unwrap(), ""));
        hierarchy.insert(component("OrphanComponent", "app-orphan", heroes.to_str().unwrap(), ""));

        let issues = hierarchy.enrich_from_routes(&[routing]);
        assert!(issues.is_empty());

        let root = hierarchy.get("app-root").unwrap();
        assert_eq!(root.route_children, vec!["app-heroes", "app-orphan"]);
        assert_eq!(
            hierarchy.get("app-heroes").unwrap().route_children,
            vec!["app-hero-detail"]
        );
        assert!(!hierarchy.get("app-hero-detail").unwrap().is_root);
        assert!(hierarchy.get("app-root").unwrap().is_root);
    }

    #[test]
    fn test_scan_links_routes_declared_in_module() {
        let temp = TempDir::new().unwrap();
        let app = temp.path().join("src/app");
        fs::create_dir_all(&app).unwrap();
        fs::write(
            app.join("app.component.ts"),
            "@Component({ selector: 'app-root', template: '<router-outlet></router-outlet>' })\nexport class AppComponent {}\n",
        )
        .unwrap();
        fs::write(
            app.join("dash.component.ts"),
            "@Component({ selector: 'app-dash', template: '<p>dash</p>' })\nexport class DashComponent {}\n",
        )
        .unwrap();
        fs::write(
            app.join("app.module.ts"),
            r#"
@NgModule({
  declarations: [AppComponent, DashComponent],
  imports: [RouterModule.forRoot([{ path: 'dash', component: DashComponent }])],
  bootstrap: [AppComponent]
})
export class AppModule {}
"#,
        )
        .unwrap();
        fs::write(app.join("hero.ts"), "export interface Hero { id: number; }\n").unwrap();

        let report = scan_components(temp.path(), DiscoveryConfig::default()).unwrap();
        assert!(report.issues.is_empty());

        let root = report.hierarchy.get("app-root").unwrap();
        assert_eq!(root.route_children, vec!["app-dash"]);
        assert!(!report.hierarchy.get("app-dash").unwrap().is_root);

        let discovery = SourceDiscovery::with_defaults(temp.path()).unwrap();
        let files = ComponentScanner::new(discovery).routing_files();
        assert_eq!(files, vec![app.join("app.module.ts")]);
    }

    #[test]
    fn test_walk_is_cycle_safe() {
        let mut hierarchy = ComponentHierarchy::new();
        let mut root = component("AppComponent", "app-root", "a", "");
        root.sub_components = vec!["app-a".to_string()];
        let mut a = component("AComponent", "app-a", "a", "");
        a.is_root = false;
        a.sub_components = vec!["app-b".to_string()];
        let mut b = component("BComponent", "app-b", "a", "");
        b.is_root = false;
        b.route_children = vec!["app-a".to_string()];
        hierarchy.insert(root);
        hierarchy.insert(a);
        hierarchy.insert(b);

        let mut visits = Vec::new();
        hierarchy.walk(|component, parent| {
            visits.push(format!(
                "{}<-{}",
                component.key(),
                parent.map(|(p, _)| p.key()).unwrap_or("")
            ));
        });
        assert_eq!(visits, vec!["app-root<-", "app-a<-app-root", "app-b<-app-a", "app-a<-app-b"]);
    }
}
