//! Angular router configuration parsing.
//!
//! Finds `Routes` arrays and `RouterModule.forRoot/forChild` arguments in a
//! routing file and turns their object literals into [`Route`] trees.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::sections::{extract_balanced, split_key_value, split_top_level, unquote};
use crate::text::remove_comments;

static RE_ROUTES_ARRAY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\bRoutes\s*=\s*|RouterModule\s*\.\s*for(?:Root|Child)\s*\(\s*)\[")
        .expect("Invalid routes regex")
});

static RE_THEN_MEMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\.then\s*\(\s*\(?\s*\w+\s*\)?\s*=>\s*\w+\s*\.\s*([A-Za-z_$][\w$]*)")
        .expect("Invalid lazy component regex")
});

static RE_IMPORT_TARGET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"import\s*\(\s*['"`]([^'"`]+)['"`]\s*\)"#).expect("Invalid import target regex")
});

/// One entry of a router configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub path: Option<String>,
    /// Component class, eager or resolved from `loadComponent`
    pub component: Option<String>,
    pub redirect_to: Option<String>,
    /// Module specifier of a lazily loaded child configuration
    pub load_children: Option<String>,
    /// Raw `loadComponent` expression
    pub load_component: Option<String>,
    pub path_match: Option<String>,
    pub children: Vec<Route>,
}

impl Route {
    /// This route and all descendants, depth-first.
    pub fn flatten(&self) -> Vec<&Route> {
        let mut out = vec![self];
        for child in &self.children {
            out.extend(child.flatten());
        }
        out
    }
}

/// Whether `content` declares a route table outside of comments.
pub fn declares_routes(content: &str) -> bool {
    RE_ROUTES_ARRAY.is_match(&remove_comments(content))
}

/// All routes declared in a file, top-level arrays in source order.
pub fn parse_routes(content: &str) -> Vec<Route> {
    let content = remove_comments(content);
    let mut routes = Vec::new();
    for m in RE_ROUTES_ARRAY.find_iter(&content) {
        if let Some(array) = extract_balanced(&content, m.end() - 1) {
            routes.extend(parse_route_array(array));
        }
    }
    routes
}

fn parse_route_array(array: &str) -> Vec<Route> {
    split_top_level(array)
        .iter()
        .filter_map(|element| parse_route_object(element))
        .collect()
}

fn parse_route_object(element: &str) -> Option<Route> {
    let element = element.trim();
    if !element.starts_with('{') {
        return None;
    }
    let inner = extract_balanced(element, 0)?;

    let mut route = Route::default();
    for property in split_top_level(inner) {
        let Some((key, value)) = split_key_value(&property) else {
            continue;
        };
        match key.as_str() {
            "path" => route.path = Some(unquote(&value).to_string()),
            "component" => route.component = Some(value),
            "redirectTo" => route.redirect_to = Some(unquote(&value).to_string()),
            "pathMatch" => route.path_match = Some(unquote(&value).to_string()),
            "loadChildren" => {
                route.load_children = Some(
                    RE_IMPORT_TARGET
                        .captures(&value)
                        .and_then(|c| c.get(1))
                        .map(|m| m.as_str().to_string())
                        .unwrap_or_else(|| unquote(&value).to_string()),
                )
            }
            "loadComponent" => {
                if route.component.is_none() {
                    route.component = RE_THEN_MEMBER
                        .captures(&value)
                        .and_then(|c| c.get(1))
                        .map(|m| m.as_str().to_string());
                }
                route.load_component = Some(value);
            }
            "children" => {
                let value = value.trim();
                if value.starts_with('[') {
                    if let Some(array) = extract_balanced(value, 0) {
                        route.children = parse_route_array(array);
                    }
                }
            }
            _ => {}
        }
    }
    Some(route)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_routes_constant() {
        let source = r#"
const routes: Routes = [
  { path: '', redirectTo: '/dashboard', pathMatch: 'full' },
  { path: 'dashboard', component: DashboardComponent },
  {
    path: 'heroes',
    component: HeroesComponent,
    children: [
      { path: ':id', component: HeroDetailComponent }, // detail
    ],
  },
];
"#;
        let routes = parse_routes(source);
        assert_eq!(routes.len(), 3);
        assert_eq!(routes[0].redirect_to.as_deref(), Some("/dashboard"));
        assert_eq!(routes[0].path_match.as_deref(), Some("full"));
        assert_eq!(routes[1].component.as_deref(), Some("DashboardComponent"));
        assert_eq!(routes[2].children.len(), 1);
        assert_eq!(
            routes[2].children[0].component.as_deref(),
            Some("HeroDetailComponent")
        );
        assert_eq!(routes[2].flatten().len(), 2);
    }

    #[test]
    fn test_parse_router_module_for_child() {
        let source = r#"
@NgModule({
  imports: [RouterModule.forChild([
    { path: 'admin', component: AdminComponent },
    { path: 'crisis', loadChildren: () => import('./crisis/crisis.module').then(m => m.CrisisModule) },
  ])],
})
export class AdminRoutingModule {}
"#;
        let routes = parse_routes(source);
        assert_eq!(routes.len(), 2);
        assert_eq!(routes[0].component.as_deref(), Some("AdminComponent"));
        assert_eq!(
            routes[1].load_children.as_deref(),
            Some("./crisis/crisis.module")
        );
        assert_eq!(routes[1].component, None);
    }

    #[test]
    fn test_load_component_resolves_class() {
        let source = r#"
export const routes: Routes = [
  { path: 'about', loadComponent: () => import('./about.component').then((m) => m.AboutComponent) },
];
"#;
        let routes = parse_routes(source);
        assert_eq!(routes[0].component.as_deref(), Some("AboutComponent"));
        assert!(routes[0].load_component.is_some());
    }

    #[test]
    fn test_declares_routes() {
        assert!(declares_routes("export const routes: Routes = [];"));
        assert!(declares_routes(
            "imports: [RouterModule.forRoot([{ path: 'dash', component: DashComponent }])]"
        ));
        assert!(declares_routes("provideRouter(routes); const appRoutes: Routes = [\n];"));
        assert!(!declares_routes("// RouterModule.forRoot([])\nexport class AppModule {}"));
        assert!(!declares_routes("import { Routes } from '@angular/router';"));
    }

    #[test]
    fn test_no_routes() {
        assert!(parse_routes("export class Nothing {}").is_empty());
    }
}
