//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check path and basename shapes
//! - Detect duplicate names and active keys
//! - Detect routes shadowed by an identical earlier pattern
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashMap;

use crate::config::schema::RouterConfig;
use crate::location::LocationParser;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("route {route}: path '{path}' must start with '/'")]
    InvalidPath { route: String, path: String },

    #[error("route {route}: empty path")]
    EmptyPath { route: String },

    #[error("route {route}: basename '{basename}' must start with '/'")]
    InvalidBasename { route: String, basename: String },

    #[error("router basename '{0}' must start with '/'")]
    InvalidRouterBasename(String),

    #[error("invalid base_url '{0}'")]
    InvalidBaseUrl(String),

    #[error("duplicate route name '{0}'")]
    DuplicateName(String),

    #[error("duplicate route key '{0}'")]
    DuplicateKey(String),

    #[error("route {route}: path '{path}' is unreachable, shadowed by route {shadowed_by}")]
    Unreachable {
        route: String,
        path: String,
        shadowed_by: String,
    },
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &RouterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Some(basename) = &config.router.basename {
        if !basename.starts_with('/') {
            errors.push(ValidationError::InvalidRouterBasename(basename.clone()));
        }
    }
    if LocationParser::new(&config.router.base_url, None).is_err() {
        errors.push(ValidationError::InvalidBaseUrl(config.router.base_url.clone()));
    }

    let mut names: HashMap<&str, usize> = HashMap::new();
    let mut keys: HashMap<String, usize> = HashMap::new();
    // Non-exact patterns seen so far, keyed by (value, sensitive).
    let mut prefixes: HashMap<(String, bool), String> = HashMap::new();

    for (index, route) in config.routes.iter().enumerate() {
        let label = route.label(index);
        let rules = route.rules();

        if rules.is_empty() {
            errors.push(ValidationError::EmptyPath { route: label.clone() });
        }

        for rule in &rules {
            if rule.value.is_empty() {
                errors.push(ValidationError::EmptyPath { route: label.clone() });
                continue;
            }
            if !rule.value.starts_with('/') {
                errors.push(ValidationError::InvalidPath {
                    route: label.clone(),
                    path: rule.value.clone(),
                });
                continue;
            }

            let normalized = if rule.sensitive {
                rule.value.clone()
            } else {
                rule.value.to_ascii_lowercase()
            };
            let pattern = (normalized, rule.sensitive);
            if let Some(owner) = prefixes.get(&pattern) {
                errors.push(ValidationError::Unreachable {
                    route: label.clone(),
                    path: rule.value.clone(),
                    shadowed_by: owner.clone(),
                });
            } else if !rule.exact && !rule.strict {
                prefixes.insert(pattern, label.clone());
            }
        }

        if let Some(basename) = &route.basename {
            if !basename.starts_with('/') {
                errors.push(ValidationError::InvalidBasename {
                    route: label.clone(),
                    basename: basename.clone(),
                });
            }
        }

        if let Some(name) = route.name.as_deref() {
            if names.insert(name, index).is_some() {
                errors.push(ValidationError::DuplicateName(name.to_string()));
                continue;
            }
        }

        let key = route.to_definition().key().to_string();
        if keys.insert(key.clone(), index).is_some() {
            errors.push(ValidationError::DuplicateKey(key));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
