//! In-process cache store

use super::{CacheEntry, CacheStore, PartitionId};
use crate::error::WardenResult;
use crate::request::CacheKey;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Partition {
    entries: HashMap<CacheKey, CacheEntry>,
    /// Keys in insertion order; a replaced key moves to the end
    order: Vec<CacheKey>,
}

impl Partition {
    fn insert(&mut self, entry: CacheEntry) {
        if self.entries.contains_key(&entry.key) {
            self.order.retain(|k| k != &entry.key);
        }
        self.order.push(entry.key.clone());
        self.entries.insert(entry.key.clone(), entry);
    }
}

/// Cache store held entirely in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    partitions: RwLock<HashMap<String, Partition>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty partition under an arbitrary stored name
    #[cfg(test)]
    pub(crate) async fn open_named(&self, stored_name: &str) {
        self.partitions
            .write()
            .await
            .entry(stored_name.to_string())
            .or_default();
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn open(&self, partition: &PartitionId) -> WardenResult<()> {
        self.partitions
            .write()
            .await
            .entry(partition.to_string())
            .or_default();
        Ok(())
    }

    async fn get(
        &self,
        partition: &PartitionId,
        key: &CacheKey,
    ) -> WardenResult<Option<CacheEntry>> {
        let partitions = self.partitions.read().await;
        Ok(partitions
            .get(&partition.to_string())
            .and_then(|p| p.entries.get(key))
            .cloned())
    }

    async fn put(&self, partition: &PartitionId, entry: CacheEntry) -> WardenResult<()> {
        self.partitions
            .write()
            .await
            .entry(partition.to_string())
            .or_default()
            .insert(entry);
        Ok(())
    }

    async fn count(&self, partition: &PartitionId) -> WardenResult<usize> {
        let partitions = self.partitions.read().await;
        Ok(partitions
            .get(&partition.to_string())
            .map_or(0, |p| p.order.len()))
    }

    async fn entries(
        &self,
        partition: &PartitionId,
        limit: usize,
    ) -> WardenResult<Vec<CacheEntry>> {
        let partitions = self.partitions.read().await;
        let Some(p) = partitions.get(&partition.to_string()) else {
            return Ok(vec![]);
        };

        Ok(p.order
            .iter()
            .take(limit)
            .filter_map(|k| p.entries.get(k).cloned())
            .collect())
    }

    async fn partitions(&self) -> WardenResult<Vec<String>> {
        let mut names: Vec<String> = self.partitions.read().await.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn delete_partition(&self, stored_name: &str) -> WardenResult<bool> {
        Ok(self.partitions.write().await.remove(stored_name).is_some())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
