//! Route lookup.
//!
//! # Responsibilities
//! - Store compiled definitions in registration order
//! - Resolve the single active definition for a location
//! - Derive the basename handed to the resolved app
//!
//! # Design Decisions
//! - Immutable after construction; updates build a new table
//! - O(n) scan, first match wins
//! - Explicit `None` rather than a silent default route
//! - The basename travels with the match instead of living in a global slot

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::location::Location;
use crate::routing::definition::{AppKey, PathSpec, RouteDefinition};
use crate::routing::matcher::{join_paths, AnyMatcher, Matcher, PathPattern, PredicateMatcher};

/// The resolved definition for a location.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    /// Active key of the definition.
    pub key: AppKey,
    /// Registration index within the table.
    pub index: usize,
    pub definition: Arc<RouteDefinition>,
    /// Captured path parameters.
    pub params: BTreeMap<String, String>,
    /// Matched portion of the pathname.
    pub url: String,
    pub is_exact: bool,
    /// Base path the app should resolve its own routes against.
    pub basename: String,
}

impl PartialEq for RouteMatch {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
            && self.index == other.index
            && self.params == other.params
            && self.url == other.url
            && self.is_exact == other.is_exact
            && self.basename == other.basename
    }
}

impl Serialize for RouteMatch {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Repr<'a> {
            key: &'a AppKey,
            index: usize,
            #[serde(skip_serializing_if = "Option::is_none")]
            name: Option<&'a str>,
            params: &'a BTreeMap<String, String>,
            url: &'a str,
            is_exact: bool,
            basename: &'a str,
            content: &'a crate::routing::definition::AppContent,
        }

        Repr {
            key: &self.key,
            index: self.index,
            name: self.definition.name(),
            params: &self.params,
            url: &self.url,
            is_exact: self.is_exact,
            basename: &self.basename,
            content: self.definition.content(),
        }
        .serialize(serializer)
    }
}

#[derive(Debug, Clone)]
struct CompiledRoute {
    key: AppKey,
    definition: Arc<RouteDefinition>,
    matcher: Arc<dyn Matcher>,
}

/// An ordered, compiled set of route definitions.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<CompiledRoute>,
    basename: Option<String>,
}

impl RouteTable {
    /// Compile definitions without a router basename.
    pub fn new(definitions: Vec<RouteDefinition>) -> Self {
        Self::with_basename(None, definitions)
    }

    /// Compile definitions below a router-level basename.
    pub fn with_basename(basename: Option<String>, definitions: Vec<RouteDefinition>) -> Self {
        let basename = basename.filter(|b| !b.trim_matches('/').is_empty());
        let routes = definitions
            .into_iter()
            .map(|definition| {
                let matcher: Arc<dyn Matcher> = match definition.spec() {
                    PathSpec::Rules(rules) => Arc::new(AnyMatcher::new(
                        rules
                            .iter()
                            .map(|rule| {
                                Box::new(PathPattern::compile_under(rule, basename.as_deref()))
                                    as Box<dyn Matcher>
                            })
                            .collect(),
                    )),
                    PathSpec::Predicate(predicate) => {
                        Arc::new(PredicateMatcher::new(predicate.clone()))
                    }
                };
                CompiledRoute {
                    key: definition.key(),
                    definition: Arc::new(definition),
                    matcher,
                }
            })
            .collect();

        Self { routes, basename }
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn basename(&self) -> Option<&str> {
        self.basename.as_deref()
    }

    /// Keys in registration order.
    pub fn keys(&self) -> impl Iterator<Item = &AppKey> {
        self.routes.iter().map(|r| &r.key)
    }

    /// Look up a definition by its active key.
    pub fn find_by_key(&self, key: &AppKey) -> Option<&Arc<RouteDefinition>> {
        self.routes
            .iter()
            .find(|r| &r.key == key)
            .map(|r| &r.definition)
    }

    /// Resolve the first definition matching `location`.
    pub fn resolve(&self, location: &Location) -> Option<RouteMatch> {
        self.routes.iter().enumerate().find_map(|(index, route)| {
            let matched = route.matcher.matches(location)?;
            let basename = self.basename_for(&route.definition, &matched.url);
            Some(RouteMatch {
                key: route.key.clone(),
                index,
                definition: route.definition.clone(),
                params: matched.params,
                url: matched.url,
                is_exact: matched.is_exact,
                basename,
            })
        })
    }

    fn basename_for(&self, definition: &RouteDefinition, matched_url: &str) -> String {
        let router_base = self.basename.as_deref().unwrap_or("");
        match (definition.basename(), definition.spec()) {
            (Some(own), _) => join_paths(router_base, own),
            (None, PathSpec::Rules(_)) => matched_url.to_string(),
            (None, PathSpec::Predicate(_)) => join_paths(router_base, "/"),
        }
    }
}

/// Resolve `location` against an ordered list of definitions.
pub fn match_route(location: &Location, definitions: &[RouteDefinition]) -> Option<RouteMatch> {
    RouteTable::new(definitions.to_vec()).resolve(location)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::definition::PathRule;

    fn loc(path: &str) -> Location {
        Location::parse(path).unwrap()
    }

    #[test]
    fn test_first_match_wins() {
        let table = RouteTable::new(vec![
            RouteDefinition::path("/a").named("first"),
            RouteDefinition::path("/a/b").named("second"),
        ]);
        let m = table.resolve(&loc("/a/b")).unwrap();
        assert_eq!(m.key.as_str(), "first");
        assert_eq!(m.index, 0);
    }

    #[test]
    fn test_no_match() {
        let table = RouteTable::new(vec![RouteDefinition::path("/a")]);
        assert!(table.resolve(&loc("/z")).is_none());
        assert!(RouteTable::default().resolve(&loc("/")).is_none());
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let table = RouteTable::new(vec![RouteDefinition::path("/users/:id")]);
        let location = loc("/users/3");
        assert_eq!(table.resolve(&location), table.resolve(&location));
    }

    #[test]
    fn test_array_paths_and_object_rules() {
        let table = RouteTable::new(vec![RouteDefinition::paths([
            PathRule::new("/x").exact(true),
            PathRule::new("/y"),
        ])
        .named("multi")]);
        assert!(table.resolve(&loc("/x/deep")).is_none());
        assert_eq!(table.resolve(&loc("/y/deep")).unwrap().url, "/y");
    }

    #[test]
    fn test_predicate_definition() {
        let table = RouteTable::new(vec![
            RouteDefinition::predicate("beta", |l| l.query.contains_key("beta")),
            RouteDefinition::path("/"),
        ]);
        assert_eq!(table.resolve(&loc("/a?beta=1")).unwrap().key.as_str(), "beta");
        assert_eq!(table.resolve(&loc("/a")).unwrap().key.as_str(), "/");
    }

    #[test]
    fn test_basename_resolution() {
        let table = RouteTable::with_basename(
            Some("/portal".into()),
            vec![
                RouteDefinition::path("/seller/:id").named("seller"),
                RouteDefinition::path("/buyer").with_basename("/b"),
                RouteDefinition::predicate("any", |_| true),
            ],
        );
        let seller = table.resolve(&loc("/portal/seller/9/orders")).unwrap();
        assert_eq!(seller.basename, "/portal/seller/9");

        let buyer = table.resolve(&loc("/portal/buyer/cart")).unwrap();
        assert_eq!(buyer.basename, "/portal/b");

        let any = table.resolve(&loc("/elsewhere")).unwrap();
        assert_eq!(any.basename, "/portal");
    }

    #[test]
    fn test_find_by_key() {
        let table = RouteTable::new(vec![RouteDefinition::path("/a"), RouteDefinition::path("/b")]);
        assert!(table.find_by_key(&AppKey::from("/b")).is_some());
        assert!(table.find_by_key(&AppKey::from("/c")).is_none());
        assert_eq!(table.keys().count(), 2);
    }

    #[test]
    fn test_match_route_function() {
        let defs = vec![RouteDefinition::path("/a"), RouteDefinition::path("/b")];
        let m = match_route(&loc("/b"), &defs).unwrap();
        assert_eq!(m.key.as_str(), "/b");
    }
}
