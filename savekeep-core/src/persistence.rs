use async_trait::async_trait;
use bytes::Bytes;

use crate::Result;

/// Byte-level storage addressed by entry name.
///
/// Entry names are plain file names (no directory components). The profile
/// layout, codec and cipher all live above this trait in the store, so a
/// backend only moves opaque bytes.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Write an entry, replacing any previous content.
    ///
    /// Implementations must not leave a partially written entry behind: a
    /// failed write keeps the previous content intact.
    ///
    /// # Returns
    /// * `Ok(())` if the entry was fully written
    /// * `Err(SaveError)` if the write failed
    async fn write(&self, name: &str, bytes: &[u8]) -> Result<()>;

    /// Read an entry.
    ///
    /// # Returns
    /// * `Ok(Some(bytes))` if the entry exists
    /// * `Ok(None)` if no entry with that name exists
    /// * `Err(SaveError)` if the entry exists but could not be read
    async fn read(&self, name: &str) -> Result<Option<Bytes>>;

    /// Remove an entry. Removing a missing entry succeeds.
    async fn remove(&self, name: &str) -> Result<()>;

    /// Names of every entry currently stored.
    async fn list(&self) -> Result<Vec<String>>;
}
