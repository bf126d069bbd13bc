use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use savekeep_core::{persistence::StorageBackend, Result};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Simple in-memory storage backend.
///
/// Entries live in a shared map, so clones of the backend see the same
/// data. It's suitable for testing and for hosts that don't need saves to
/// survive process restarts.
#[derive(Debug, Clone)]
pub struct InMemoryBackend {
    entries: Arc<RwLock<BTreeMap<String, Bytes>>>,
}

impl InMemoryBackend {
    /// Create a new, empty in-memory backend.
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    /// Overwrite an entry directly, bypassing the store.
    ///
    /// Used to plant damaged files in tests.
    pub fn insert_raw(&self, name: impl Into<String>, bytes: impl Into<Bytes>) {
        self.entries.write().insert(name.into(), bytes.into());
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.read().contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageBackend for InMemoryBackend {
    async fn write(&self, name: &str, bytes: &[u8]) -> Result<()> {
        let mut entries = self.entries.write();
        entries.insert(name.to_string(), Bytes::copy_from_slice(bytes));
        Ok(())
    }

    async fn read(&self, name: &str) -> Result<Option<Bytes>> {
        let entries = self.entries.read();
        Ok(entries.get(name).cloned())
    }

    async fn remove(&self, name: &str) -> Result<()> {
        self.entries.write().remove(name);
        Ok(())
    }

    async fn list(&self) -> Result<Vec<String>> {
        Ok(self.entries.read().keys().cloned().collect())
    }
}
