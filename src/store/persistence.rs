//! Persistence layer for tree snapshots

use crate::error::StorageError;
use crate::store::{SnapshotStore, TreeSnapshot};
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, instrument};

/// Sled-based implementation of SnapshotStore
pub struct SledSnapshotStore {
    db: sled::Db,
}

impl SledSnapshotStore {
    /// Create a new SledSnapshotStore at the given path
    ///
    /// The path is a directory; sled creates its database files there.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let db = sled::open(path).map_err(|e| {
            StorageError::IoError(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Failed to open sled database: {}", e),
            ))
        })?;
        Ok(Self { db })
    }

    /// Wrap an already opened database
    pub fn from_db(db: sled::Db) -> Self {
        Self { db }
    }

    /// Ids of every stored snapshot
    pub fn ids(&self) -> Result<Vec<String>, StorageError> {
        let mut ids = Vec::new();
        for entry in self.db.scan_prefix(KEY_PREFIX) {
            let (key, _) = entry.map_err(sled_error)?;
            let key = String::from_utf8_lossy(&key);
            if let Some(id) = key.strip_prefix(KEY_PREFIX) {
                ids.push(id.to_string());
            }
        }
        Ok(ids)
    }

    /// When the snapshot under `id` was last saved
    pub fn saved_at(&self, id: &str) -> Result<Option<DateTime<Utc>>, StorageError> {
        let Some(value) = self.db.get(Self::saved_key(id)).map_err(sled_error)? else {
            return Ok(None);
        };
        let saved = DateTime::parse_from_rfc3339(&String::from_utf8_lossy(&value))
            .map(|ts| ts.with_timezone(&Utc))
            .ok();
        Ok(saved)
    }

    fn key(id: &str) -> String {
        format!("{}{}", KEY_PREFIX, id)
    }

    fn saved_key(id: &str) -> String {
        format!("{}{}", SAVED_PREFIX, id)
    }
}

const KEY_PREFIX: &str = "snapshot:";
const SAVED_PREFIX: &str = "saved:";

fn sled_error(e: sled::Error) -> StorageError {
    StorageError::IoError(std::io::Error::new(
        std::io::ErrorKind::Other,
        format!("Sled operation failed: {}", e),
    ))
}

impl SnapshotStore for SledSnapshotStore {
    #[instrument(skip(self))]
    fn load(&self, id: &str) -> Result<Option<TreeSnapshot>, StorageError> {
        match self.db.get(Self::key(id)).map_err(sled_error)? {
            Some(value) => {
                let snapshot: TreeSnapshot = bincode::deserialize(&value).map_err(|e| {
                    StorageError::Serialization(format!("Failed to deserialize snapshot: {}", e))
                })?;
                debug!(bytes = value.len(), "Loaded snapshot");
                Ok(Some(snapshot))
            }
            None => Ok(None),
        }
    }

    #[instrument(skip(self, snapshot))]
    fn save(&self, id: &str, snapshot: &TreeSnapshot) -> Result<(), StorageError> {
        let value = bincode::serialize(snapshot).map_err(|e| {
            StorageError::Serialization(format!("Failed to serialize snapshot: {}", e))
        })?;
        let bytes = value.len();
        let mut batch = sled::Batch::default();
        batch.insert(Self::key(id).as_bytes(), value);
        batch.insert(Self::saved_key(id).as_bytes(), Utc::now().to_rfc3339().as_bytes());
        self.db.apply_batch(batch).map_err(sled_error)?;
        self.db.flush().map_err(sled_error)?;
        debug!(bytes, "Saved snapshot");
        Ok(())
    }
}

/// In-memory SnapshotStore, for tests and ephemeral sessions
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    snapshots: RwLock<HashMap<String, TreeSnapshot>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn load(&self, id: &str) -> Result<Option<TreeSnapshot>, StorageError> {
        Ok(self.snapshots.read().get(id).cloned())
    }

    fn save(&self, id: &str, snapshot: &TreeSnapshot) -> Result<(), StorageError> {
        self.snapshots
            .write()
            .insert(id.to_string(), snapshot.clone());
        Ok(())
    }
}
