//! # Savekeep Persistence
//!
//! Storage for the savekeep persistence engine.
//!
//! ## Backends
//!
//! - [`FileSystemBackend`] - One file per entry under a root directory, written
//!   via temp file + rename
//! - [`InMemoryBackend`] - Entries kept in a shared map (testing/non-persistent)
//!
//! ## Store
//!
//! [`FileStore`] sits on top of a backend and knows about profiles: it names
//! entries from the configured template, runs records through the codec and
//! optional cipher, enumerates profiles, picks the most recently updated one,
//! and degrades unreadable entries to "no data".
//!
//! ## Example
//!
//! ```rust
//! use savekeep_core::{GameData, ProfileId};
//! use savekeep_persistence::{FileStore, InMemoryBackend, StoreConfig};
//!
//! # tokio_test::block_on(async {
//! let store = FileStore::new(InMemoryBackend::new(), &StoreConfig::default()).unwrap();
//! let slot = ProfileId::new("slot1").unwrap();
//!
//! assert!(store.load(&slot).await.is_none());
//!
//! store.save(&GameData::new("Alice"), &slot).await.unwrap();
//! let loaded = store.load(&slot).await.unwrap();
//! assert_eq!(loaded.player_saved_name(), "Alice");
//! # });
//! ```

pub mod file_system;
pub mod in_memory;
pub mod store;

pub use file_system::FileSystemBackend;
pub use in_memory::InMemoryBackend;
pub use store::{select_most_recent, FileStore, ProfileFileLayout, StoreConfig};
