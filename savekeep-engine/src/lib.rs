//! # Savekeep Engine
//!
//! The persistence coordinator for the savekeep engine.
//!
//! This crate ties the store and the registered participants together. The
//! host builds one [`PersistenceCoordinator`] at startup, lets subsystems
//! register with the shared [`ParticipantRegistry`], and then either calls
//! the coordinator directly or moves it into [`PersistenceCoordinator::run`]
//! and drives it with [`CoordinatorCommand`]s.
//!
//! ## Key Components
//!
//! - **PersistenceCoordinator**: Owns the active profile and in-memory records,
//!   orchestrates load/save across both participant channels
//! - **ParticipantRegistry**: Explicitly registered game and player participants
//! - **PersistenceConfig**: Construction-time configuration
//! - **CoordinatorCommand**: Lifecycle signals and profile requests for the
//!   command loop
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use savekeep_engine::{CoordinatorCommand, ParticipantRegistry, PersistenceConfig, PersistenceCoordinator};
//! use std::sync::Arc;
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() {
//!     let registry = Arc::new(ParticipantRegistry::new());
//!     let config = PersistenceConfig::new().with_storage_root("./saves");
//!
//!     let coordinator = PersistenceCoordinator::open(config, registry.clone())
//!         .await
//!         .unwrap();
//!     let (cmd_tx, cmd_rx) = mpsc::unbounded_channel();
//!
//!     let handle = tokio::spawn(async move { coordinator.run(cmd_rx).await });
//!
//!     // Subsystems register with `registry`, then the host signals transitions
//!     cmd_tx.send(CoordinatorCommand::StartNewGame("Alice".into())).unwrap();
//!     cmd_tx.send(CoordinatorCommand::SessionBoundary).unwrap();
//!     cmd_tx.send(CoordinatorCommand::Shutdown).unwrap();
//!
//!     handle.await.unwrap().unwrap();
//! }
//! ```

pub mod config;
pub mod coordinator;
pub mod registry;
pub mod service;

pub use config::*;
pub use coordinator::*;
pub use registry::*;
pub use service::*;
