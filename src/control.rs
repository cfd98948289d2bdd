//! Control channel
//!
//! Out-of-band messages from the host application. Messages are JSON objects
//! tagged by `type`:
//!
//! | Type | Reply |
//! |------|-------|
//! | `GET_CACHE_STATS` | `{partition: {count, approximateSizeBytes}}` |
//! | `CLEAR_CACHE` | `{success: true}` |
//! | `SKIP_WAITING` | none |
//! | `GET_VERSION` | `{version}` |

use crate::error::{WardenError, WardenResult};
use crate::store::{CacheStore, PartitionId, PartitionName};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

/// A parsed control message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControlMessage {
    GetCacheStats,
    ClearCache,
    SkipWaiting,
    GetVersion,
}

impl ControlMessage {
    /// Parse a JSON message, naming the offending type when it is not known
    pub fn parse(json: &str) -> WardenResult<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let kind = value
            .get("type")
            .and_then(|t| t.as_str())
            .map(str::to_string);

        serde_json::from_value(value).map_err(|_| {
            let kind = kind.unwrap_or_else(|| "<missing type>".to_string());
            warn!("Unknown control message: {}", kind);
            WardenError::UnknownMessage(kind)
        })
    }
}

/// Entry count and sampled size of one partition
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionStats {
    pub count: usize,
    /// Body bytes of the sampled entries only; not extrapolated
    pub approximate_size_bytes: u64,
}

/// Stats keyed by logical partition name
pub type CacheStats = BTreeMap<String, PartitionStats>;

/// Reply to a control message
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ControlReply {
    Stats(CacheStats),
    Cleared { success: bool },
    Version { version: String },
    /// Messages with no reply payload
    Ack,
}

/// Stats and invalidation over the shared store
pub struct ControlChannel {
    store: Arc<dyn CacheStore>,
    version: String,
    sample_size: usize,
}

impl ControlChannel {
    pub fn new(store: Arc<dyn CacheStore>, version: impl Into<String>, sample_size: usize) -> Self {
        Self {
            store,
            version: version.into(),
            sample_size,
        }
    }

    /// Count and approximate size of each current partition
    ///
    /// Every logical name is reported, with zeros when the partition does
    /// not exist.
    pub async fn stats(&self) -> WardenResult<CacheStats> {
        let mut stats = CacheStats::new();
        for name in PartitionName::all() {
            let partition = PartitionId::new(*name, self.version.as_str());
            let count = self.store.count(&partition).await?;
            let approximate_size_bytes = self
                .store
                .entries(&partition, self.sample_size)
                .await?
                .iter()
                .map(|e| e.size_bytes())
                .sum();

            stats.insert(
                name.as_str().to_string(),
                PartitionStats {
                    count,
                    approximate_size_bytes,
                },
            );
        }
        Ok(stats)
    }

    /// Delete every partition in the store, whatever its version
    pub async fn clear_all(&self) -> WardenResult<Vec<String>> {
        let mut deleted = Vec::new();
        for name in self.store.partitions().await? {
            if self.store.delete_partition(&name).await? {
                deleted.push(name);
            }
        }
        info!("Cleared {} partition(s)", deleted.len());
        Ok(deleted)
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}
