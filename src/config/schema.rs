//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the router.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::location::{HashType, LocationError, LocationParser};
use crate::location::parse::DEFAULT_BASE_URL;
use crate::routing::{AppContent, PathRule, RouteDefinition, RouteTable};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RouterConfig {
    /// Router-wide options.
    pub router: RouterOptions,

    /// Logging settings.
    pub observability: ObservabilityConfig,

    /// Route definitions in registration order.
    pub routes: Vec<RouteConfig>,
}

impl RouterConfig {
    /// Compile the routes into a table.
    pub fn route_table(&self) -> RouteTable {
        RouteTable::with_basename(
            self.router.basename.clone(),
            self.routes.iter().map(RouteConfig::to_definition).collect(),
        )
    }

    /// Parser honouring `base_url` and `hash_type`.
    pub fn location_parser(&self) -> Result<LocationParser, LocationError> {
        LocationParser::new(&self.router.base_url, self.router.hash_type)
    }
}

/// Router-wide options.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RouterOptions {
    /// Prefix joined in front of every route path.
    pub basename: Option<String>,

    /// Enables hash routing.
    pub hash_type: Option<HashType>,

    /// Origin relative location strings resolve against.
    pub base_url: String,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            basename: None,
            hash_type: None,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter directive.
    pub log_level: String,

    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

/// A route path: one string or a list of elements.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum PathConfig {
    Single(String),
    Many(Vec<PathElementConfig>),
}

impl Default for PathConfig {
    fn default() -> Self {
        Self::Single("/".to_string())
    }
}

/// One element of a path list. Unset flags fall back to the route's.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum PathElementConfig {
    Literal(String),
    Rule {
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        exact: Option<bool>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        strict: Option<bool>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sensitive: Option<bool>,
    },
}

/// Route configuration mapping paths to a micro application.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RouteConfig {
    /// Explicit app name; doubles as the active key.
    pub name: Option<String>,

    pub path: PathConfig,

    /// Defaults for string path elements.
    pub exact: bool,
    pub strict: bool,
    pub sensitive: bool,

    /// Basename override handed to the app.
    pub basename: Option<String>,

    pub title: Option<String>,

    /// HTML entry of the app.
    pub entry: Option<String>,

    pub scripts: Vec<String>,

    pub styles: Vec<String>,

    /// Props passed to the app on mount.
    #[serde(skip_serializing_if = "serde_json::Value::is_null")]
    pub props: serde_json::Value,
}

impl RouteConfig {
    /// Path elements with route-level flags applied.
    pub fn rules(&self) -> Vec<PathRule> {
        let base = |value: &str| {
            PathRule::new(value)
                .exact(self.exact)
                .strict(self.strict)
                .sensitive(self.sensitive)
        };
        match &self.path {
            PathConfig::Single(value) => vec![base(value)],
            PathConfig::Many(elements) => elements
                .iter()
                .map(|element| match element {
                    PathElementConfig::Literal(value) => base(value),
                    PathElementConfig::Rule {
                        value,
                        exact,
                        strict,
                        sensitive,
                    } => PathRule::new(value.as_str())
                        .exact(exact.unwrap_or(self.exact))
                        .strict(strict.unwrap_or(self.strict))
                        .sensitive(sensitive.unwrap_or(self.sensitive)),
                })
                .collect(),
        }
    }

    pub fn content(&self) -> AppContent {
        AppContent {
            entry: self.entry.clone(),
            scripts: self.scripts.clone(),
            styles: self.styles.clone(),
            title: self.title.clone(),
            props: self.props.clone(),
        }
    }

    pub fn to_definition(&self) -> RouteDefinition {
        let mut definition = RouteDefinition::paths(self.rules()).with_content(self.content());
        if let Some(name) = &self.name {
            definition = definition.named(name.clone());
        }
        if let Some(basename) = &self.basename {
            definition = definition.with_basename(basename.clone());
        }
        definition
    }

    /// Label for diagnostics: the name, or the registration index.
    pub fn label(&self, index: usize) -> String {
        self.name.clone().unwrap_or_else(|| format!("#{index}"))
    }
}
