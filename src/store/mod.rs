//! Partitioned response cache
//!
//! Responses are kept in named, versioned partitions. A partition is
//! identified by a logical name and a build version tag and is stored
//! under the combined name `{name}-{version}` (e.g. `static-v1`).
//!
//! # Invariants
//!
//! - A partition's version tag never changes; a new build gets new partitions
//! - Entries are replaced wholesale, never patched
//! - Body bytes are stored verbatim
//! - Same-key writes are last-write-wins
//!
//! | Partition | Filled by | Routed categories |
//! |-----------|-----------|-------------------|
//! | static | install, document, style-script | document, style-script |
//! | dynamic | lazily | image, other |
//! | api | lazily | api |

pub mod disk;
pub mod memory;

pub use disk::DiskStore;
pub use memory::MemoryStore;

use crate::config::{Config, ConfigManager, StoreBackend};
use crate::error::WardenResult;
use crate::request::{CacheKey, Response};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Logical partition names
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartitionName {
    Static,
    Dynamic,
    Api,
}

impl PartitionName {
    /// All logical partitions
    pub fn all() -> &'static [Self] {
        &[Self::Static, Self::Dynamic, Self::Api]
    }

    /// Name as used in stored partition names and stats
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Static => "static",
            Self::Dynamic => "dynamic",
            Self::Api => "api",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "static" => Some(Self::Static),
            "dynamic" => Some(Self::Dynamic),
            "api" => Some(Self::Api),
            _ => None,
        }
    }
}

impl fmt::Display for PartitionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A partition at a specific build version
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PartitionId {
    pub name: PartitionName,
    pub version: String,
}

impl PartitionId {
    pub fn new(name: PartitionName, version: impl Into<String>) -> Self {
        Self {
            name,
            version: version.into(),
        }
    }

    /// Parse a stored partition name back into its parts
    ///
    /// Returns `None` for names this engine did not create.
    pub fn parse(stored: &str) -> Option<Self> {
        let (name, version) = stored.split_once('-')?;
        if version.is_empty() {
            return None;
        }
        Some(Self::new(PartitionName::parse(name)?, version))
    }

    /// Full set of partitions a build expects to exist
    pub fn expected_set(version: &str) -> Vec<Self> {
        PartitionName::all()
            .iter()
            .map(|name| Self::new(*name, version))
            .collect()
    }
}

impl fmt::Display for PartitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.name, self.version)
    }
}

/// A stored response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub key: CacheKey,
    pub response: Response,
    pub inserted_at: DateTime<Utc>,
}

impl CacheEntry {
    /// Create an entry stamped with the current time
    pub fn new(key: CacheKey, response: Response) -> Self {
        Self {
            key,
            response,
            inserted_at: Utc::now(),
        }
    }

    /// Body size in bytes
    pub fn size_bytes(&self) -> u64 {
        self.response.body.len() as u64
    }
}

/// Storage backend for cache partitions
///
/// Implementations must allow concurrent reads and concurrent writes to
/// different keys. Reads of a damaged entry return
/// [`WardenError::PartitionCorrupt`](crate::error::WardenError::PartitionCorrupt);
/// callers on the request path treat that as a miss.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Create the partition if it does not exist
    async fn open(&self, partition: &PartitionId) -> WardenResult<()>;

    /// Look up an entry
    async fn get(&self, partition: &PartitionId, key: &CacheKey)
        -> WardenResult<Option<CacheEntry>>;

    /// Insert or replace an entry, creating the partition lazily
    async fn put(&self, partition: &PartitionId, entry: CacheEntry) -> WardenResult<()>;

    /// Number of entries in a partition (0 if absent)
    async fn count(&self, partition: &PartitionId) -> WardenResult<usize>;

    /// Up to `limit` entries, for sampling
    ///
    /// Backends read no more than they return. Memory yields insertion
    /// order; disk yields directory order.
    async fn entries(&self, partition: &PartitionId, limit: usize)
        -> WardenResult<Vec<CacheEntry>>;

    /// Stored names of every partition, including ones from other builds
    async fn partitions(&self) -> WardenResult<Vec<String>>;

    /// Drop a partition by stored name; returns whether it existed
    async fn delete_partition(&self, stored_name: &str) -> WardenResult<bool>;

    /// Human-readable backend name
    fn backend_name(&self) -> &'static str;
}

/// Build the store selected by configuration
pub fn open_store(config: &Config) -> Arc<dyn CacheStore> {
    match config.store.backend {
        StoreBackend::Memory => Arc::new(MemoryStore::new()),
        StoreBackend::Disk => Arc::new(DiskStore::new(ConfigManager::store_path(config))),
    }
}
