//! Request and response types flowing through the interception layer
//!
//! A [`Request`] lives only for the duration of one interception. A
//! [`Response`] is either produced by the network, replayed from a cache
//! partition, or synthesized by the fallback generator.

use crate::error::{WardenError, WardenResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use url::Url;
use uuid::Uuid;

/// Header used to tell the application where a response came from
pub const FROM_CACHE_HEADER: &str = "x-from-cache";

/// Rendering role the application declared for a request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Destination {
    Document,
    Style,
    Script,
    Font,
    Image,
    /// No declared role (fetch/XHR)
    #[default]
    Empty,
}

impl FromStr for Destination {
    type Err = WardenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "document" => Ok(Self::Document),
            "style" => Ok(Self::Style),
            "script" => Ok(Self::Script),
            "font" => Ok(Self::Font),
            "image" => Ok(Self::Image),
            "" | "empty" => Ok(Self::Empty),
            other => Err(WardenError::User(format!(
                "Unknown destination '{}'. Valid: document, style, script, font, image, empty",
                other
            ))),
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Document => "document",
            Self::Style => "style",
            Self::Script => "script",
            Self::Font => "font",
            Self::Image => "image",
            Self::Empty => "empty",
        };
        write!(f, "{}", name)
    }
}

/// Resource category resolved by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Document,
    StyleScript,
    Image,
    Api,
    Other,
}

impl Category {
    /// All categories in routing table order
    pub fn all() -> &'static [Self] {
        &[
            Self::Document,
            Self::StyleScript,
            Self::Image,
            Self::Api,
            Self::Other,
        ]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Document => "document",
            Self::StyleScript => "style-script",
            Self::Image => "image",
            Self::Api => "api",
            Self::Other => "other",
        };
        write!(f, "{}", name)
    }
}

/// Normalized request identity used as the cache key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CacheKey {
    /// Upper-cased method
    pub method: String,
    /// Absolute URL without fragment
    pub url: String,
}

impl CacheKey {
    /// Build a key from a method and URL, dropping the fragment
    pub fn new(method: &str, url: &Url) -> Self {
        let mut url = url.clone();
        url.set_fragment(None);
        Self {
            method: method.to_ascii_uppercase(),
            url: url.to_string(),
        }
    }

    /// Stable hex digest of the key, used for on-disk file names
    pub fn digest(&self) -> String {
        use sha2::{Digest, Sha256};

        let mut hasher = Sha256::new();
        hasher.update(self.method.as_bytes());
        hasher.update(b" ");
        hasher.update(self.url.as_bytes());
        hex::encode(hasher.finalize())
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

/// Per-interception request context
#[derive(Debug, Clone)]
pub struct Request {
    /// Correlation id for log lines belonging to this request
    pub id: Uuid,
    /// HTTP method, upper-cased
    pub method: String,
    /// Absolute request URL
    pub url: Url,
    /// Declared rendering role
    pub destination: Destination,
    /// Category, filled in by the router after classification
    pub category: Option<Category>,
    /// Headers forwarded to the network, keyed by lower-cased name
    pub headers: BTreeMap<String, String>,
    /// Payload forwarded to the network; empty for GET/HEAD
    pub body: Vec<u8>,
}

impl Request {
    /// Create a request from a method and an absolute URL string
    pub fn new(method: &str, url: &str) -> WardenResult<Self> {
        let url = Url::parse(url).map_err(|e| WardenError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            id: Uuid::new_v4(),
            method: method.to_ascii_uppercase(),
            url,
            destination: Destination::Empty,
            category: None,
            headers: BTreeMap::new(),
            body: Vec::new(),
        })
    }

    /// Shorthand for a GET request
    pub fn get(url: &str) -> WardenResult<Self> {
        Self::new("GET", url)
    }

    /// Set the declared rendering role
    pub fn with_destination(mut self, destination: Destination) -> Self {
        self.destination = destination;
        self
    }

    /// Add a header to forward, replacing any previous value
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// Set the payload to forward
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Look up a forwarded header case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Resolve a path against an origin into a GET request
    pub fn for_path(origin: &Url, path: &str) -> WardenResult<Self> {
        let url = origin.join(path).map_err(|e| WardenError::InvalidUrl {
            url: path.to_string(),
            reason: e.to_string(),
        })?;
        Self::get(url.as_str())
    }

    /// Cache key for this request
    pub fn key(&self) -> CacheKey {
        CacheKey::new(&self.method, &self.url)
    }

    /// URL path component
    pub fn path(&self) -> &str {
        self.url.path()
    }

    /// Only safe methods are read from or written to a partition
    pub fn is_cacheable(&self) -> bool {
        matches!(self.method.as_str(), "GET" | "HEAD")
    }
}

/// A replayable HTTP response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    /// Status code
    pub status: u16,
    /// Headers, keyed by lower-cased name
    pub headers: BTreeMap<String, String>,
    /// Body bytes, stored verbatim
    #[serde(skip)]
    pub body: Vec<u8>,
}

impl Response {
    /// Create an empty response with the given status
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            body: Vec::new(),
        }
    }

    /// Set a header, replacing any previous value
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    /// Set the body
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Set a header in place
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
    }

    /// Look up a header case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// The content-type header, if any
    pub fn content_type(&self) -> Option<&str> {
        self.header("content-type")
    }

    /// 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as lossy UTF-8, for display
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}
