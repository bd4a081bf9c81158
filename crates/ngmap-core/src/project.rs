//! In-memory model of a scanned Angular workspace.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::module::{DecoratorKind, NgClass, NgModule};

/// Every module and decorated class found in a workspace.
///
/// Modules keep scan order. Classes are keyed by name; the first class seen
/// under a name wins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Project {
    pub modules: Vec<NgModule>,
    pub components: BTreeMap<String, NgClass>,
    pub directives: BTreeMap<String, NgClass>,
    pub pipes: BTreeMap<String, NgClass>,
    pub injectables: BTreeMap<String, NgClass>,
}

impl Project {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_module(&mut self, module: NgModule) {
        self.modules.push(module);
    }

    /// Register a class under its decorator kind. Returns false when a class
    /// with the same name was already registered.
    pub fn add_class(&mut self, class: NgClass) -> bool {
        let map = match class.kind {
            DecoratorKind::Component => &mut self.components,
            DecoratorKind::Directive => &mut self.directives,
            DecoratorKind::Pipe => &mut self.pipes,
            DecoratorKind::Injectable => &mut self.injectables,
            DecoratorKind::NgModule => return false,
        };
        if map.contains_key(&class.name) {
            debug!(
                "Ignoring duplicate {} {} in {}",
                class.kind.as_str(),
                class.name,
                class.filename.display()
            );
            return false;
        }
        map.insert(class.name.clone(), class);
        true
    }

    pub fn module_names(&self) -> Vec<&str> {
        self.modules.iter().map(|m| m.name.as_str()).collect()
    }

    pub fn find_module(&self, name: &str) -> Option<&NgModule> {
        self.modules.iter().find(|m| m.name == name)
    }

    pub fn is_module(&self, name: &str) -> bool {
        self.modules.iter().any(|m| m.name == name)
    }

    /// Classes that request at least one dependency, in kind then name order.
    pub fn requesters(&self) -> impl Iterator<Item = &NgClass> {
        self.components
            .values()
            .chain(self.directives.values())
            .chain(self.pipes.values())
            .chain(self.injectables.values())
            .filter(|c| !c.dependency_injections.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
            && self.components.is_empty()
            && self.directives.is_empty()
            && self.pipes.is_empty()
            && self.injectables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class(name: &str, kind: DecoratorKind, deps: &[&str]) -> NgClass {
        let mut class = NgClass::new(name, format!("{}.ts", name), kind);
        class.dependency_injections = deps.iter().map(|d| d.to_string()).collect();
        class
    }

    #[test]
    fn test_add_class_first_wins() {
        let mut project = Project::new();
        assert!(project.add_class(class("HeroService", DecoratorKind::Injectable, &[])));
        assert!(!project.add_class(class(
            "HeroService",
            DecoratorKind::Injectable,
            &["HttpClient"]
        )));
        assert!(project.injectables["HeroService"].dependency_injections.is_empty());
    }

    #[test]
    fn test_requesters_order() {
        let mut project = Project::new();
        project.add_class(class("ZService", DecoratorKind::Injectable, &["HttpClient"]));
        project.add_class(class("BComponent", DecoratorKind::Component, &["ZService"]));
        project.add_class(class("AComponent", DecoratorKind::Component, &[]));
        project.add_class(class("ShoutPipe", DecoratorKind::Pipe, &["Locale"]));

        let names: Vec<&str> = project.requesters().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["BComponent", "ShoutPipe", "ZService"]);
    }

    #[test]
    fn test_module_lookup() {
        let mut project = Project::new();
        assert!(project.is_empty());
        project.add_module(NgModule {
            name: "AppModule".to_string(),
            ..Default::default()
        });
        assert!(project.is_module("AppModule"));
        assert!(!project.is_module("Other"));
        assert_eq!(project.module_names(), vec!["AppModule"]);
        assert!(project.find_module("AppModule").is_some());
    }
}
