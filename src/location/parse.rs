//! Location parsing.
//!
//! Turns the location strings delivered by a navigation source into
//! [`Location`] values. Parsing is delegated to the `url` crate; the only
//! router-specific part is hash routing, where the route lives in the
//! fragment (`/#/users/1?tab=a`).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use url::{Position, Url};

/// Origin used to resolve root-relative location strings.
pub const DEFAULT_BASE_URL: &str = "http://localhost";

/// Error type for location parsing.
#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    #[error("invalid base url '{input}': {source}")]
    InvalidBase {
        input: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid location '{input}': {source}")]
    Invalid {
        input: String,
        #[source]
        source: url::ParseError,
    },
}

/// How the navigation was triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationKind {
    /// Initial location delivered on subscription.
    Init,
    Push,
    Replace,
    /// Back/forward traversal.
    #[serde(rename = "popstate")]
    PopState,
}

impl NavigationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Push => "push",
            Self::Replace => "replace",
            Self::PopState => "popstate",
        }
    }
}

impl fmt::Display for NavigationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fragment layout used for hash routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashType {
    /// `#/users/1`
    Slash,
    /// `#users/1`
    NoSlash,
    /// `#!/users/1`
    HashBang,
}

impl HashType {
    /// Extracts the route part (always starting with `/`) from a fragment.
    fn route_from_fragment(&self, fragment: &str) -> String {
        let route = match self {
            Self::HashBang => fragment.strip_prefix('!').unwrap_or(fragment),
            Self::Slash | Self::NoSlash => fragment,
        };
        if route.starts_with('/') {
            route.to_string()
        } else {
            format!("/{route}")
        }
    }
}

/// A parsed location.
///
/// `href` is the serialised path, query and hash of the input string and
/// is what navigation de-duplication compares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    /// Pathname used for route matching.
    pub pathname: String,
    /// Query parameters. Later duplicates win.
    pub query: BTreeMap<String, String>,
    /// Fragment including the leading `#`, or empty.
    pub hash: String,
    /// Path + query + hash of the full URL.
    pub href: String,
}

impl Location {
    /// Parses a location with the default parser.
    pub fn parse(input: &str) -> Result<Self, LocationError> {
        LocationParser::default().parse(input)
    }
}

/// Parses location strings relative to a base URL.
#[derive(Debug, Clone)]
pub struct LocationParser {
    /// `None` resolves against [`DEFAULT_BASE_URL`].
    base: Option<Url>,
    hash_type: Option<HashType>,
}

impl Default for LocationParser {
    fn default() -> Self {
        Self {
            base: None,
            hash_type: None,
        }
    }
}

impl LocationParser {
    /// Create a parser resolving relative strings against `base_url`.
    pub fn new(base_url: &str, hash_type: Option<HashType>) -> Result<Self, LocationError> {
        let base = parse_base(base_url)?;
        Ok(Self {
            base: Some(base),
            hash_type,
        })
    }

    /// Switch to hash routing.
    pub fn with_hash_type(mut self, hash_type: Option<HashType>) -> Self {
        self.hash_type = hash_type;
        self
    }

    pub fn hash_type(&self) -> Option<HashType> {
        self.hash_type
    }

    /// Parse a location string into a [`Location`].
    pub fn parse(&self, input: &str) -> Result<Location, LocationError> {
        let url = self.join(input)?;
        let href = url[Position::BeforePath..].to_string();

        let Some(hash_type) = self.hash_type else {
            return Ok(Location {
                pathname: url.path().to_string(),
                query: collect_query(&url),
                hash: fragment_of(&url),
                href,
            });
        };

        // Hash routing: the fragment carries its own path, query and hash.
        let route = hash_type.route_from_fragment(url.fragment().unwrap_or_default());
        let inner = self.join(&route)?;
        Ok(Location {
            pathname: inner.path().to_string(),
            query: collect_query(&inner),
            hash: fragment_of(&inner),
            href,
        })
    }

    fn join(&self, input: &str) -> Result<Url, LocationError> {
        let joined = match &self.base {
            Some(base) => base.join(input),
            None => parse_base(DEFAULT_BASE_URL)?.join(input),
        };
        joined.map_err(|source| LocationError::Invalid {
            input: input.to_string(),
            source,
        })
    }
}

fn parse_base(base_url: &str) -> Result<Url, LocationError> {
    Url::parse(base_url).map_err(|source| LocationError::InvalidBase {
        input: base_url.to_string(),
        source,
    })
}

fn collect_query(url: &Url) -> BTreeMap<String, String> {
    url.query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect()
}

fn fragment_of(url: &Url) -> String {
    url.fragment()
        .map(|f| format!("#{f}"))
        .unwrap_or_default()
}
