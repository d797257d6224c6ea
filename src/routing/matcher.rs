//! Route matching logic.
//!
//! # Responsibilities
//! - Compile path elements into segment patterns
//! - Match a pathname segment by segment, capturing parameters
//! - Honour the `exact`, `strict` and `sensitive` options
//! - Evaluate predicate specs against the whole location
//!
//! # Pattern Syntax
//! - `/users` literal segment
//! - `/users/:id` named parameter (one segment)
//! - `/users/:id?` optional parameter
//! - `/files/*` splat, captures the remainder under `*`
//!
//! # Design Decisions
//! - Non-exact patterns match on segment boundaries (`/a` matches `/a/b`,
//!   never `/ab`)
//! - Literal segments are case-insensitive unless `sensitive`
//! - Trailing slashes are ignored unless `strict`
//! - No regex to guarantee O(n) matching

use std::collections::BTreeMap;

use crate::location::Location;
use crate::routing::definition::{LocationPredicate, PathRule};

/// Outcome of a successful match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathMatch {
    /// Captured parameters, percent-decoded.
    pub params: BTreeMap<String, String>,
    /// The portion of the pathname that matched.
    pub url: String,
    /// Whether the whole pathname was consumed.
    pub is_exact: bool,
}

/// Trait for matching locations against a condition.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns the match if the location satisfies this condition.
    fn matches(&self, location: &Location) -> Option<PathMatch>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param { name: String, optional: bool },
    Splat,
}

/// A compiled path element.
#[derive(Debug, Clone)]
pub struct PathPattern {
    source: String,
    segments: Vec<Segment>,
    trailing_slash: bool,
    exact: bool,
    strict: bool,
    sensitive: bool,
}

impl PathPattern {
    /// Compile a path element.
    pub fn compile(rule: &PathRule) -> Self {
        Self::compile_under(rule, None)
    }

    /// Compile a path element below a router-level basename.
    pub fn compile_under(rule: &PathRule, basename: Option<&str>) -> Self {
        let source = match basename {
            Some(base) => join_paths(base, &rule.value),
            None => normalize(&rule.value),
        };

        let segments = split(&source)
            .map(|part| {
                if part == "*" {
                    Segment::Splat
                } else if let Some(name) = part.strip_prefix(':') {
                    match name.strip_suffix('?') {
                        Some(name) => Segment::Param {
                            name: name.to_string(),
                            optional: true,
                        },
                        None => Segment::Param {
                            name: name.to_string(),
                            optional: false,
                        },
                    }
                } else {
                    Segment::Literal(part.to_string())
                }
            })
            .collect();

        Self {
            trailing_slash: has_trailing_slash(&source),
            source,
            segments,
            exact: rule.exact,
            strict: rule.strict,
            sensitive: rule.sensitive,
        }
    }

    /// The normalised pattern, basename included.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Match a raw pathname.
    pub fn match_path(&self, pathname: &str) -> Option<PathMatch> {
        let parts: Vec<&str> = split(pathname).collect();
        let mut params = BTreeMap::new();
        let mut consumed = 0;

        for segment in &self.segments {
            match segment {
                Segment::Literal(expected) => {
                    let part = decode(parts.get(consumed)?);
                    let equal = if self.sensitive {
                        part == *expected
                    } else {
                        part.eq_ignore_ascii_case(expected)
                    };
                    if !equal {
                        return None;
                    }
                    consumed += 1;
                }
                Segment::Param { name, optional } => match parts.get(consumed) {
                    Some(part) => {
                        params.insert(name.clone(), decode(part));
                        consumed += 1;
                    }
                    None if *optional => {}
                    None => return None,
                },
                Segment::Splat => {
                    let rest = parts[consumed..].join("/");
                    params.insert("*".to_string(), decode(&rest));
                    consumed = parts.len();
                }
            }
        }

        let is_exact = consumed == parts.len();
        if self.exact && !is_exact {
            return None;
        }

        if self.strict && is_exact {
            let path_trailing = has_trailing_slash(pathname);
            if self.trailing_slash && !path_trailing {
                return None;
            }
            if self.exact && !self.trailing_slash && path_trailing {
                return None;
            }
        }

        let url = if consumed == 0 {
            "/".to_string()
        } else {
            format!("/{}", parts[..consumed].join("/"))
        };

        Some(PathMatch {
            params,
            url,
            is_exact,
        })
    }
}

impl Matcher for PathPattern {
    fn matches(&self, location: &Location) -> Option<PathMatch> {
        self.match_path(&location.pathname)
    }
}

/// Matches through a user-supplied predicate.
pub struct PredicateMatcher {
    predicate: LocationPredicate,
}

impl PredicateMatcher {
    pub fn new(predicate: LocationPredicate) -> Self {
        Self { predicate }
    }
}

impl std::fmt::Debug for PredicateMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("PredicateMatcher")
    }
}

impl Matcher for PredicateMatcher {
    fn matches(&self, location: &Location) -> Option<PathMatch> {
        (self.predicate)(location).then(|| PathMatch {
            params: BTreeMap::new(),
            url: location.pathname.clone(),
            is_exact: true,
        })
    }
}

/// Combines matchers with OR semantics; the first matching element wins.
#[derive(Debug)]
pub struct AnyMatcher {
    matchers: Vec<Box<dyn Matcher>>,
}

impl AnyMatcher {
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }
}

impl Matcher for AnyMatcher {
    fn matches(&self, location: &Location) -> Option<PathMatch> {
        self.matchers.iter().find_map(|m| m.matches(location))
    }
}

/// Join a basename and a path, collapsing the slash between them.
pub fn join_paths(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = normalize(path);
    if base.is_empty() {
        return path;
    }
    let base = normalize(base);
    if path == "/" {
        base
    } else {
        format!("{base}{path}")
    }
}

fn normalize(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}

fn split(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|part| !part.is_empty())
}

fn has_trailing_slash(path: &str) -> bool {
    path.len() > 1 && path.ends_with('/')
}

fn decode(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(|decoded| decoded.into_owned())
        .unwrap_or_else(|_| raw.to_string())
}
