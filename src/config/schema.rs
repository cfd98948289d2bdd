//! Configuration schema for Warden
//!
//! Configuration is stored at `~/.config/warden/config.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Engine and lifecycle settings
    pub engine: EngineConfig,

    /// Build manifest: pre-warmed assets and path patterns
    pub manifest: ManifestConfig,

    /// Cache store backend
    pub store: StoreConfig,

    /// Outbound HTTP settings
    pub network: NetworkConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Enable verbose logging
    pub verbose: bool,

    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            log_format: "text".to_string(),
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Build version tag applied to every partition
    pub version: String,

    /// Origin the application is served from
    pub origin: String,

    /// Timeout applied to the api route, in milliseconds
    pub api_timeout_ms: u64,

    /// Upper bound on concurrent background refreshes
    pub max_concurrent_refreshes: usize,

    /// Move straight from Waiting to Activating after install
    pub skip_waiting_on_install: bool,

    /// Entries sampled per partition when estimating size
    pub stats_sample_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            version: "v1".to_string(),
            origin: "http://localhost:5173".to_string(),
            api_timeout_ms: 3000,
            max_concurrent_refreshes: 4,
            skip_waiting_on_install: true,
            stats_sample_size: 10,
        }
    }
}

/// Asset manifest and routing patterns
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestConfig {
    /// Core assets pre-warmed into the static partition on install
    pub core_assets: Vec<String>,

    /// First-party asset path prefixes (classified as style-script)
    pub asset_prefixes: Vec<String>,

    /// API path prefixes
    pub api_prefixes: Vec<String>,

    /// Resources refreshed by the revalidator
    pub important_resources: Vec<String>,
}

impl Default for ManifestConfig {
    fn default() -> Self {
        Self {
            core_assets: [
                "/",
                "/index.html",
                "/manifest.json",
                "/favicon.ico",
                "/assets/index.js",
                "/assets/index.css",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            asset_prefixes: vec!["/assets/".to_string()],
            api_prefixes: ["/api/", "/divine/", "/bazi/", "/nfc/", "/sutra/"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            important_resources: vec![
                "/".to_string(),
                "/index.html".to_string(),
                "/manifest.json".to_string(),
            ],
        }
    }
}

/// Cache store backend selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// In-process only, lost on exit
    Memory,
    /// One directory per partition
    #[default]
    Disk,
}

/// Cache store configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Backend to use
    pub backend: StoreBackend,

    /// Root directory for the disk backend (defaults to the data dir)
    pub path: Option<PathBuf>,
}

/// Outbound HTTP configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Global per-request timeout in seconds (0 = none)
    pub timeout_secs: u64,

    /// User-Agent header sent upstream
    pub user_agent: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: format!("warden/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}
