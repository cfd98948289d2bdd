//! Error types for Warden
//!
//! All modules use `WardenResult<T>` as their return type.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for Warden operations
pub type WardenResult<T> = Result<T, WardenError>;

/// All errors that can occur in Warden
#[derive(Error, Debug)]
pub enum WardenError {
    // Request errors
    #[error("Invalid request URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    // Network errors
    #[error("Network unavailable for {url}: {reason}")]
    NetworkUnavailable { url: String, reason: String },

    #[error("Upstream returned status {status} for {url}")]
    UpstreamStatus { url: String, status: u16 },

    #[error("Network request for {url} timed out after {timeout:?}")]
    NetworkTimeout { url: String, timeout: Duration },

    // Cache errors
    #[error("Cache partition {partition} is corrupt: {reason}")]
    PartitionCorrupt { partition: String, reason: String },

    // Lifecycle errors
    #[error("Invalid lifecycle transition from {from} to {to}")]
    LifecycleTransition { from: String, to: String },

    // Control channel errors
    #[error("Unknown control message: {0}")]
    UnknownMessage(String),

    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl WardenError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a network unavailable error
    pub fn network(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::NetworkUnavailable {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Create a partition corruption error
    pub fn corrupt(partition: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::PartitionCorrupt {
            partition: partition.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error came from the network side of a fetch
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            Self::NetworkUnavailable { .. } | Self::UpstreamStatus { .. } | Self::NetworkTimeout { .. }
        )
    }

    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::NetworkUnavailable { .. } | Self::NetworkTimeout { .. }
        ) || matches!(self, Self::UpstreamStatus { status, .. } if *status >= 500)
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::NetworkUnavailable { .. } => Some("Check connectivity, or set network.timeout_secs higher"),
            Self::UnsupportedScheme(_) => Some("Only http and https requests are intercepted"),
            Self::ConfigInvalid { .. } => Some("Run: warden config init --force"),
            Self::LifecycleTransition { .. } => Some("Run: warden install"),
            Self::UnknownMessage(_) => {
                Some("Known types: GET_CACHE_STATS, CLEAR_CACHE, SKIP_WAITING, GET_VERSION")
            }
            _ => None,
        }
    }
}
