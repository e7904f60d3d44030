//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Store compiled routes in declaration order
//! - Resolve a path to a view, a redirect or an explicit no-match
//! - Follow redirects for full navigations
//! - Reverse lookup: route name + params to a concrete path
//!
//! # Design Decisions
//! - Immutable after construction (shared via Arc without locks)
//! - O(n) scan in declaration order (route tables are tiny)
//! - Explicit NotFound rather than silent default

use std::collections::BTreeMap;
use std::collections::HashSet;
use std::fmt;

use serde::Serialize;

use crate::routing::matcher::{PathPattern, PatternError};

/// Upper bound on redirect hops followed by [`RouteTable::navigate`].
pub const MAX_REDIRECTS: usize = 10;

/// Extracted path params, ordered by name.
pub type Params = BTreeMap<String, String>;

/// Views that a route can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum View {
    /// Product listing, optionally narrowed by `categoryId`/`slug`.
    ProductList,
}

impl View {
    pub fn name(&self) -> &'static str {
        match self {
            View::ProductList => "ProductList",
        }
    }

    /// Kebab-case identifier, identical to the serialized form.
    pub fn slug(&self) -> &'static str {
        match self {
            View::ProductList => "product-list",
        }
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

/// Routing errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error(transparent)]
    Pattern(#[from] PatternError),
    #[error("route name `{0}` is declared more than once")]
    DuplicateName(String),
    #[error("no route named `{0}`")]
    UnknownRoute(String),
    #[error("route `{route}` requires param `{param}`")]
    MissingParam { route: String, param: String },
    #[error("redirect loop while navigating to `{0}`")]
    RedirectLoop(String),
}

/// What a route does once matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteTarget {
    View { name: String, view: View },
    Redirect { to: String },
}

/// A single entry of the route table.
#[derive(Debug, Clone)]
pub struct RouteEntry {
    pattern: PathPattern,
    target: RouteTarget,
}

impl RouteEntry {
    /// A named route rendering `view`.
    pub fn view(path: &str, name: impl Into<String>, view: View) -> Result<Self, PatternError> {
        Ok(Self {
            pattern: PathPattern::parse(path)?,
            target: RouteTarget::View {
                name: name.into(),
                view,
            },
        })
    }

    /// A route that redirects to another path.
    pub fn redirect(path: &str, to: impl Into<String>) -> Result<Self, PatternError> {
        Ok(Self {
            pattern: PathPattern::parse(path)?,
            target: RouteTarget::Redirect { to: to.into() },
        })
    }

    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    pub fn target(&self) -> &RouteTarget {
        &self.target
    }

    /// Route name, if this is a view route.
    pub fn name(&self) -> Option<&str> {
        match &self.target {
            RouteTarget::View { name, .. } => Some(name),
            RouteTarget::Redirect { .. } => None,
        }
    }
}

/// A successful view match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    pub route: String,
    pub view: View,
    pub params: Params,
}

/// Outcome of resolving a single path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Resolution {
    Matched(MatchResult),
    Redirect { to: String },
    NotFound { path: String },
}

/// Outcome of a navigation, after redirects were followed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Navigation {
    pub resolution: Resolution,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirected_from: Option<String>,
}

/// Ordered, immutable route table.
#[derive(Debug, Clone)]
pub struct RouteTable {
    entries: Vec<RouteEntry>,
}

impl RouteTable {
    /// Build a table. View route names must be unique.
    pub fn new(entries: Vec<RouteEntry>) -> Result<Self, RouteError> {
        let mut names = HashSet::new();
        for name in entries.iter().filter_map(RouteEntry::name) {
            if !names.insert(name) {
                return Err(RouteError::DuplicateName(name.to_string()));
            }
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[RouteEntry] {
        &self.entries
    }

    /// Resolve a path against the table. First match wins.
    pub fn resolve(&self, path: &str) -> Resolution {
        for entry in &self.entries {
            let Some(params) = entry.pattern.matches(path) else {
                continue;
            };

            tracing::debug!(path = %path, pattern = %entry.pattern, "Route matched");

            return match &entry.target {
                RouteTarget::View { name, view } => Resolution::Matched(MatchResult {
                    route: name.clone(),
                    view: *view,
                    params,
                }),
                RouteTarget::Redirect { to } => Resolution::Redirect { to: to.clone() },
            };
        }

        tracing::debug!(path = %path, "No route matched");
        Resolution::NotFound {
            path: path.to_string(),
        }
    }

    /// Resolve a path and follow redirects until a view or a no-match.
    pub fn navigate(&self, path: &str) -> Result<Navigation, RouteError> {
        let mut current = path.to_string();
        for hop in 0..=MAX_REDIRECTS {
            match self.resolve(&current) {
                Resolution::Redirect { to } => {
                    tracing::debug!(from = %current, to = %to, hop, "Following redirect");
                    current = to;
                }
                resolution => {
                    let redirected_from = (hop > 0).then(|| path.to_string());
                    return Ok(Navigation {
                        resolution,
                        redirected_from,
                    });
                }
            }
        }
        Err(RouteError::RedirectLoop(path.to_string()))
    }

    /// Build the path of a named route.
    pub fn url_for(&self, name: &str, params: &Params) -> Result<String, RouteError> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.name() == Some(name))
            .ok_or_else(|| RouteError::UnknownRoute(name.to_string()))?;

        entry
            .pattern
            .build(params)
            .map_err(|param| RouteError::MissingParam {
                route: name.to_string(),
                param,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RouteTable {
        RouteTable::new(vec![
            RouteEntry::redirect("/", "/home").unwrap(),
            RouteEntry::view("/home", "home", View::ProductList).unwrap(),
            RouteEntry::view("/items/:id", "item", View::ProductList).unwrap(),
            RouteEntry::view("/items/:other", "shadowed", View::ProductList).unwrap(),
        ])
        .unwrap()
    }

    #[test]
    fn test_first_match_wins() {
        match table().resolve("/items/7") {
            Resolution::Matched(m) => {
                assert_eq!(m.route, "item");
                assert_eq!(m.params.get("id").map(String::as_str), Some("7"));
            }
            other => panic!("unexpected resolution: {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let result = RouteTable::new(vec![
            RouteEntry::view("/a", "same", View::ProductList).unwrap(),
            RouteEntry::view("/b", "same", View::ProductList).unwrap(),
        ]);
        assert_eq!(result.unwrap_err(), RouteError::DuplicateName("same".into()));
    }

    #[test]
    fn test_redirect_entries_are_unnamed() {
        let result = RouteTable::new(vec![
            RouteEntry::redirect("/", "/a").unwrap(),
            RouteEntry::redirect("/old", "/a").unwrap(),
            RouteEntry::view("/a", "a", View::ProductList).unwrap(),
        ]);
        assert!(result.is_ok());
    }

    #[test]
    fn test_not_found() {
        assert_eq!(
            table().resolve("/missing"),
            Resolution::NotFound {
                path: "/missing".into()
            }
        );
    }

    #[test]
    fn test_navigate_follows_redirect() {
        let nav = table().navigate("/").unwrap();
        assert_eq!(nav.redirected_from.as_deref(), Some("/"));
        assert!(matches!(nav.resolution, Resolution::Matched(ref m) if m.route == "home"));

        let direct = table().navigate("/home").unwrap();
        assert_eq!(direct.redirected_from, None);
    }

    #[test]
    fn test_navigate_detects_loop() {
        let looping = RouteTable::new(vec![
            RouteEntry::redirect("/a", "/b").unwrap(),
            RouteEntry::redirect("/b", "/a").unwrap(),
        ])
        .unwrap();
        assert_eq!(
            looping.navigate("/a").unwrap_err(),
            RouteError::RedirectLoop("/a".into())
        );
    }

    #[test]
    fn test_url_for() {
        let table = table();
        let mut params = Params::new();
        params.insert("id".into(), "42".into());
        assert_eq!(table.url_for("item", &params).unwrap(), "/items/42");
        assert_eq!(
            table.url_for("item", &Params::new()).unwrap_err(),
            RouteError::MissingParam {
                route: "item".into(),
                param: "id".into()
            }
        );
        assert_eq!(
            table.url_for("nope", &params).unwrap_err(),
            RouteError::UnknownRoute("nope".into())
        );
    }

    #[test]
    fn test_view_slug_matches_serialized_name() {
        let json = serde_json::to_value(View::ProductList).unwrap();
        assert_eq!(json, serde_json::json!(View::ProductList.slug()));
        assert_eq!(View::ProductList.slug(), "product-list");
    }

    #[test]
    fn test_resolution_serializes_with_kind_tag() {
        let json = serde_json::to_value(Resolution::Redirect { to: "/x".into() }).unwrap();
        assert_eq!(json, serde_json::json!({"kind": "redirect", "to": "/x"}));
    }
}
