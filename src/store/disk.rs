//! On-disk cache store
//!
//! Layout under the store root:
//!
//! ```text
//! <root>/<partition>/<key-digest>.json           entry metadata (commit record)
//! <root>/<partition>/<key-digest>-<write>.body   body bytes, verbatim
//! ```
//!
//! The body is written first and the metadata renamed into place last, so
//! an entry becomes visible only once it is complete. A replaced entry's old
//! body file is removed after the new metadata lands. Writes to the same key
//! are serialized within a process, so no body file is left behind.

use super::{CacheEntry, CacheStore, PartitionId};
use crate::error::{WardenError, WardenResult};
use crate::request::{CacheKey, Response};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

/// Metadata record stored next to each body
#[derive(Debug, Serialize, Deserialize)]
struct EntryMeta {
    key: CacheKey,
    response: Response,
    inserted_at: DateTime<Utc>,
    body_file: String,
    body_len: u64,
}

/// Number of write locks keys are spread over
const WRITE_STRIPES: usize = 64;

/// Cache store backed by a directory tree
///
/// Clones share the write locks.
#[derive(Debug, Clone)]
pub struct DiskStore {
    root: PathBuf,
    write_locks: Arc<Vec<Mutex<()>>>,
}

impl DiskStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            write_locks: Arc::new((0..WRITE_STRIPES).map(|_| Mutex::new(())).collect()),
        }
    }

    /// Write lock guarding every key with this digest
    fn write_lock(&self, digest: &str) -> &Mutex<()> {
        let stripe = u8::from_str_radix(digest.get(..2).unwrap_or("0"), 16).unwrap_or(0);
        &self.write_locks[usize::from(stripe) % WRITE_STRIPES]
    }

    /// Store root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn partition_dir(&self, partition: &PartitionId) -> PathBuf {
        self.root.join(partition.to_string())
    }

    async fn write_atomic(path: &Path, contents: &[u8]) -> std::io::Result<()> {
        let tmp = path.with_extension(format!("tmp-{}", Uuid::new_v4().simple()));
        fs::write(&tmp, contents).await?;
        if let Err(e) = fs::rename(&tmp, path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e);
        }
        Ok(())
    }

    async fn read_meta(path: &Path, partition: &str) -> WardenResult<Option<EntryMeta>> {
        let content = match fs::read_to_string(path).await {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(WardenError::corrupt(partition, e.to_string())),
        };

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|e| WardenError::corrupt(partition, format!("{}: {}", path.display(), e)))
    }

    async fn load_entry(dir: &Path, meta: EntryMeta, partition: &str) -> WardenResult<CacheEntry> {
        let body = fs::read(dir.join(&meta.body_file))
            .await
            .map_err(|e| WardenError::corrupt(partition, format!("{}: {}", meta.body_file, e)))?;

        if body.len() as u64 != meta.body_len {
            return Err(WardenError::corrupt(
                partition,
                format!(
                    "{}: expected {} bytes, found {}",
                    meta.body_file,
                    meta.body_len,
                    body.len()
                ),
            ));
        }

        Ok(CacheEntry {
            key: meta.key,
            response: meta.response.with_body(body),
            inserted_at: meta.inserted_at,
        })
    }

    /// Up to `limit` metadata records of a partition, in directory order
    ///
    /// Stops reading once `limit` records parsed, so sampling a large
    /// partition stays cheap.
    async fn list_meta(&self, partition: &PartitionId, limit: usize) -> WardenResult<Vec<EntryMeta>> {
        let dir = self.partition_dir(partition);
        let name = partition.to_string();

        let mut read_dir = match fs::read_dir(&dir).await {
            Ok(rd) => rd,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => return Err(WardenError::io(format!("reading {}", dir.display()), e)),
        };

        let mut metas = vec![];
        while metas.len() < limit {
            let Some(item) = read_dir
                .next_entry()
                .await
                .map_err(|e| WardenError::io(format!("reading {}", dir.display()), e))?
            else {
                break;
            };
            let path = item.path();
            if !path.extension().is_some_and(|ext| ext == "json") {
                continue;
            }
            match Self::read_meta(&path, &name).await {
                Ok(Some(meta)) => metas.push(meta),
                Ok(None) => {}
                Err(e) => warn!("Skipping unreadable cache entry: {}", e),
            }
        }
        Ok(metas)
    }
}

#[async_trait]
impl CacheStore for DiskStore {
    async fn open(&self, partition: &PartitionId) -> WardenResult<()> {
        let dir = self.partition_dir(partition);
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| WardenError::io(format!("creating partition {}", dir.display()), e))
    }

    async fn get(
        &self,
        partition: &PartitionId,
        key: &CacheKey,
    ) -> WardenResult<Option<CacheEntry>> {
        let dir = self.partition_dir(partition);
        let name = partition.to_string();
        let meta_path = dir.join(format!("{}.json", key.digest()));

        let Some(meta) = Self::read_meta(&meta_path, &name).await? else {
            return Ok(None);
        };

        if &meta.key != key {
            return Err(WardenError::corrupt(
                name,
                format!("digest collision for {}", key),
            ));
        }

        Self::load_entry(&dir, meta, &name).await.map(Some)
    }

    async fn put(&self, partition: &PartitionId, entry: CacheEntry) -> WardenResult<()> {
        self.open(partition).await?;

        let dir = self.partition_dir(partition);
        let name = partition.to_string();
        let digest = entry.key.digest();
        let meta_path = dir.join(format!("{}.json", digest));
        let body_file = format!("{}-{}.body", digest, Uuid::new_v4().simple());

        let _write = self.write_lock(&digest).lock().await;
        let previous = Self::read_meta(&meta_path, &name).await.ok().flatten();

        let CacheEntry {
            key,
            mut response,
            inserted_at,
        } = entry;
        let body = std::mem::take(&mut response.body);

        Self::write_atomic(&dir.join(&body_file), &body)
            .await
            .map_err(|e| WardenError::corrupt(&name, format!("writing body: {}", e)))?;

        let meta = EntryMeta {
            key,
            response,
            inserted_at,
            body_file,
            body_len: body.len() as u64,
        };
        let json = serde_json::to_vec(&meta)?;
        if let Err(e) = Self::write_atomic(&meta_path, &json).await {
            let _ = fs::remove_file(dir.join(&meta.body_file)).await;
            return Err(WardenError::corrupt(&name, format!("writing metadata: {}", e)));
        }

        if let Some(old) = previous {
            if old.body_file != meta.body_file {
                let _ = fs::remove_file(dir.join(&old.body_file)).await;
            }
        }

        debug!("Stored {} in {}", meta.key, name);
        Ok(())
    }

    async fn count(&self, partition: &PartitionId) -> WardenResult<usize> {
        let dir = self.partition_dir(partition);
        let mut read_dir = match fs::read_dir(&dir).await {
            Ok(rd) => rd,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(WardenError::io(format!("reading {}", dir.display()), e)),
        };

        let mut count = 0;
        while let Some(item) = read_dir
            .next_entry()
            .await
            .map_err(|e| WardenError::io(format!("reading {}", dir.display()), e))?
        {
            if item.path().extension().is_some_and(|ext| ext == "json") {
                count += 1;
            }
        }
        Ok(count)
    }

    async fn entries(
        &self,
        partition: &PartitionId,
        limit: usize,
    ) -> WardenResult<Vec<CacheEntry>> {
        let dir = self.partition_dir(partition);
        let name = partition.to_string();

        let mut entries = vec![];
        for meta in self.list_meta(partition, limit).await? {
            match Self::load_entry(&dir, meta, &name).await {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!("Skipping unreadable cache entry: {}", e),
            }
        }
        Ok(entries)
    }

    async fn partitions(&self) -> WardenResult<Vec<String>> {
        let mut read_dir = match fs::read_dir(&self.root).await {
            Ok(rd) => rd,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(vec![]),
            Err(e) => {
                return Err(WardenError::io(
                    format!("reading store root {}", self.root.display()),
                    e,
                ))
            }
        };

        let mut names = vec![];
        while let Some(item) = read_dir
            .next_entry()
            .await
            .map_err(|e| WardenError::io("reading store root entry", e))?
        {
            let is_dir = item.file_type().await.is_ok_and(|t| t.is_dir());
            if is_dir {
                names.push(item.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }

    async fn delete_partition(&self, stored_name: &str) -> WardenResult<bool> {
        let dir = self.root.join(stored_name);
        match fs::remove_dir_all(&dir).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(WardenError::io(
                format!("deleting partition {}", dir.display()),
                e,
            )),
        }
    }

    fn backend_name(&self) -> &'static str {
        "disk"
    }
}
