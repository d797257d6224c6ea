//! Route definitions.
//!
//! A [`RouteDefinition`] binds a path specification to the content of one
//! micro application. Definitions are plain data supplied by the host; the
//! router only reads them.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::location::Location;

/// Identifier of a resolved definition.
///
/// The explicit name when one is given, otherwise the path element values
/// joined with `,`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppKey(String);

impl AppKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AppKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AppKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

impl From<String> for AppKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl Borrow<str> for AppKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// One element of a path specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathRule {
    /// Pattern, e.g. `/users/:id`.
    pub value: String,
    /// The whole pathname must be consumed.
    #[serde(default)]
    pub exact: bool,
    /// Trailing slashes are significant.
    #[serde(default)]
    pub strict: bool,
    /// Literal segments compare case-sensitively.
    #[serde(default)]
    pub sensitive: bool,
}

impl PathRule {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            exact: false,
            strict: false,
            sensitive: false,
        }
    }

    pub fn exact(mut self, exact: bool) -> Self {
        self.exact = exact;
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn sensitive(mut self, sensitive: bool) -> Self {
        self.sensitive = sensitive;
        self
    }
}

impl From<&str> for PathRule {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for PathRule {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// User-supplied activation check.
pub type LocationPredicate = Arc<dyn Fn(&Location) -> bool + Send + Sync>;

/// What a definition matches against.
#[derive(Clone)]
pub enum PathSpec {
    /// Path elements, any of which may match.
    Rules(Vec<PathRule>),
    /// Custom predicate evaluated against the whole location.
    Predicate(LocationPredicate),
}

impl fmt::Debug for PathSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Rules(rules) => f.debug_tuple("Rules").field(rules).finish(),
            Self::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// Content handle of a micro application.
///
/// Opaque to the router; consumed by the asset collaborator and the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppContent {
    /// HTML entry the assets are discovered from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry: Option<String>,
    pub scripts: Vec<String>,
    pub styles: Vec<String>,
    /// Document title while the app is active.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Props handed to the app on mount.
    #[serde(skip_serializing_if = "serde_json::Value::is_null")]
    pub props: serde_json::Value,
}

/// A single route registration.
#[derive(Debug, Clone)]
pub struct RouteDefinition {
    spec: PathSpec,
    name: Option<String>,
    basename: Option<String>,
    content: AppContent,
}

impl RouteDefinition {
    /// Definition matching a single path.
    pub fn path(value: impl Into<String>) -> Self {
        Self::paths([PathRule::new(value)])
    }

    /// Definition matching any of several path elements.
    pub fn paths<I, R>(rules: I) -> Self
    where
        I: IntoIterator<Item = R>,
        R: Into<PathRule>,
    {
        Self {
            spec: PathSpec::Rules(rules.into_iter().map(Into::into).collect()),
            name: None,
            basename: None,
            content: AppContent::default(),
        }
    }

    /// Definition activated by a custom predicate. Predicates cannot be
    /// serialised into a key, so a name is required.
    pub fn predicate<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Location) -> bool + Send + Sync + 'static,
    {
        Self {
            spec: PathSpec::Predicate(Arc::new(predicate)),
            name: Some(name.into()),
            basename: None,
            content: AppContent::default(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Override the basename handed to the app.
    pub fn with_basename(mut self, basename: impl Into<String>) -> Self {
        self.basename = Some(basename.into());
        self
    }

    pub fn with_content(mut self, content: AppContent) -> Self {
        self.content = content;
        self
    }

    /// Set `exact` on every path element registered so far.
    pub fn exact(self) -> Self {
        self.map_rules(|rule| rule.exact = true)
    }

    /// Set `strict` on every path element registered so far.
    pub fn strict(self) -> Self {
        self.map_rules(|rule| rule.strict = true)
    }

    /// Set `sensitive` on every path element registered so far.
    pub fn sensitive(self) -> Self {
        self.map_rules(|rule| rule.sensitive = true)
    }

    fn map_rules(mut self, f: impl Fn(&mut PathRule)) -> Self {
        if let PathSpec::Rules(rules) = &mut self.spec {
            rules.iter_mut().for_each(f);
        }
        self
    }

    pub fn spec(&self) -> &PathSpec {
        &self.spec
    }

    /// Path elements; empty for predicate definitions.
    pub fn rules(&self) -> &[PathRule] {
        match &self.spec {
            PathSpec::Rules(rules) => rules,
            PathSpec::Predicate(_) => &[],
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn basename(&self) -> Option<&str> {
        self.basename.as_deref()
    }

    pub fn content(&self) -> &AppContent {
        &self.content
    }

    /// The key identifying this definition while it is active.
    pub fn key(&self) -> AppKey {
        if let Some(name) = &self.name {
            return AppKey::new(name.clone());
        }
        let values: Vec<&str> = self.rules().iter().map(|r| r.value.as_str()).collect();
        AppKey::new(values.join(","))
    }
}
