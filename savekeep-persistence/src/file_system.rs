//! Directory-backed storage with atomic writes.

use async_trait::async_trait;
use bytes::Bytes;
use savekeep_core::{persistence::StorageBackend, Result, SaveError};
use std::ffi::OsStr;
use std::fs::FileType;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

const TEMP_SUFFIX: &str = "tmp";

/// Name of a directory entry if it should be listed: plain files with UTF-8
/// names only. An entry whose type cannot be read is skipped on its own.
fn listed_file_name(file_name: &OsStr, file_type: std::io::Result<FileType>) -> Option<String> {
    match file_type {
        Ok(file_type) if file_type.is_file() => file_name.to_str().map(str::to_string),
        Ok(_) => None,
        Err(e) => {
            warn!("Skipping unreadable entry {:?}: {}", file_name, e);
            None
        }
    }
}

/// Directory-backed storage.
///
/// Each entry is one file directly under the storage root. Writes go to a
/// sibling temporary file which is synced and then renamed over the target,
/// so a crash or a full disk mid-write leaves the previous file untouched.
#[derive(Debug, Clone)]
pub struct FileSystemBackend {
    root: PathBuf,
}

impl FileSystemBackend {
    /// Create a new file-based backend.
    ///
    /// # Arguments
    /// * `root` - Directory where entry files will be stored
    ///
    /// # Errors
    /// * Returns error if the root directory cannot be created
    pub async fn new<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref();

        if !root.exists() {
            fs::create_dir_all(root).await.map_err(|e| {
                SaveError::persistence(format!(
                    "Failed to create storage directory {}: {}",
                    root.display(),
                    e
                ))
            })?;
        }

        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    /// Create a new file-based backend (synchronous).
    ///
    /// Hosts that construct the coordinator before any runtime exists use
    /// this; it creates the root directory with blocking I/O.
    ///
    /// # Errors
    /// * Returns error if the root directory cannot be created
    pub fn new_blocking<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref();
        std::fs::create_dir_all(root).map_err(|e| {
            SaveError::persistence(format!(
                "Failed to create storage directory {}: {}",
                root.display(),
                e
            ))
        })?;

        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    /// Create a backend over `root` without touching the disk.
    ///
    /// The directory is not created; writes fail until it exists. Hosts use
    /// this when nothing is going to be stored.
    pub fn unopened<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of the file backing `name`.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    async fn write_temp(&self, temp_path: &Path, bytes: &[u8]) -> std::io::Result<()> {
        let mut file = fs::File::create(temp_path).await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for FileSystemBackend {
    async fn write(&self, name: &str, bytes: &[u8]) -> Result<()> {
        let target = self.path_for(name);
        let temp_path = self.path_for(&format!("{}.{}", name, TEMP_SUFFIX));

        if let Err(e) = self.write_temp(&temp_path, bytes).await {
            if let Err(cleanup) = fs::remove_file(&temp_path).await {
                if cleanup.kind() != std::io::ErrorKind::NotFound {
                    warn!("Failed to remove temp file {}: {}", temp_path.display(), cleanup);
                }
            }
            return Err(SaveError::persistence(format!(
                "Failed to write {} to temp file: {}",
                name, e
            )));
        }

        // Atomically replace the old file with the new one
        fs::rename(&temp_path, &target).await.map_err(|e| {
            SaveError::persistence(format!(
                "Failed to rename temp file to {}: {}",
                target.display(),
                e
            ))
        })?;

        debug!(entry = name, bytes = bytes.len(), "Entry written");
        Ok(())
    }

    async fn read(&self, name: &str) -> Result<Option<Bytes>> {
        match fs::read(self.path_for(name)).await {
            Ok(data) => Ok(Some(Bytes::from(data))),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(SaveError::persistence(format!(
                "Failed to read {}: {}",
                name, e
            ))),
        }
    }

    async fn remove(&self, name: &str) -> Result<()> {
        match fs::remove_file(self.path_for(name)).await {
            Ok(()) => {
                debug!(entry = name, "Entry removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SaveError::persistence(format!(
                "Failed to remove {}: {}",
                name, e
            ))),
        }
    }

    async fn list(&self) -> Result<Vec<String>> {
        let mut entries = match fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(SaveError::persistence(format!(
                    "Failed to read directory {}: {}",
                    self.root.display(),
                    e
                )))
            }
        };

        let mut names = Vec::new();
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(e) => {
                    // The directory stream ends after a read error
                    warn!("Stopped listing {} early: {}", self.root.display(), e);
                    break;
                }
            };
            let file_name = entry.file_name();
            if let Some(name) = listed_file_name(&file_name, entry.file_type().await) {
                names.push(name);
            }
        }

        names.sort();
        Ok(names)
    }
}
