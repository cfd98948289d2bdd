//! Resource classification
//!
//! Maps each intercepted request to exactly one [`Category`]. Rules are
//! checked in priority order; anything that matches nothing is `Other`.

use crate::config::schema::ManifestConfig;
use crate::request::{Category, Destination, Request};

/// URL schemes the interception layer handles
const NETWORK_SCHEMES: &[&str] = &["http", "https"];

/// Pure request classifier built from the build manifest
#[derive(Debug, Clone)]
pub struct Classifier {
    asset_prefixes: Vec<String>,
    api_prefixes: Vec<String>,
}

impl Classifier {
    pub fn new(manifest: &ManifestConfig) -> Self {
        Self {
            asset_prefixes: manifest.asset_prefixes.clone(),
            api_prefixes: manifest.api_prefixes.clone(),
        }
    }

    /// Whether the request can be intercepted at all
    ///
    /// Extension-internal and other non-network schemes are passed through.
    pub fn accepts(&self, request: &Request) -> bool {
        NETWORK_SCHEMES.contains(&request.url.scheme())
    }

    /// Whether a path matches one of the API prefixes
    pub fn is_api_path(&self, path: &str) -> bool {
        self.api_prefixes.iter().any(|p| path.starts_with(p.as_str()))
    }

    fn is_first_party_asset(&self, path: &str) -> bool {
        self.asset_prefixes
            .iter()
            .any(|p| path.starts_with(p.as_str()))
    }

    /// Resolve the category of a request
    pub fn classify(&self, request: &Request) -> Category {
        let path = request.path();

        match request.destination {
            Destination::Document => Category::Document,
            Destination::Style | Destination::Script | Destination::Font => Category::StyleScript,
            _ if self.is_first_party_asset(path) => Category::StyleScript,
            Destination::Image => Category::Image,
            _ if self.is_api_path(path) => Category::Api,
            _ => Category::Other,
        }
    }
}
