//! Testing utilities for the savekeep persistence engine.
//!
//! - [`RecordingParticipant`] and [`CallLog`] observe fan-out order
//! - [`InstrumentedBackend`] counts storage operations and injects write failures
//! - [`TestHarness`] wires a coordinator over an instrumented in-memory backend

pub mod fault_injection;
pub mod participants;

pub use fault_injection::{BackendStats, InstrumentedBackend};
pub use participants::{CallLog, RecordingParticipant};

use std::sync::Arc;

use savekeep_engine::{ParticipantRegistry, PersistenceConfig, PersistenceCoordinator};
use savekeep_persistence::{FileStore, InMemoryBackend};

/// Install a compact tracing subscriber for tests; repeated calls are ignored.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

pub type TestCoordinator = PersistenceCoordinator<InstrumentedBackend<InMemoryBackend>>;

/// A coordinator over an instrumented in-memory backend, plus handles to
/// everything a test wants to inspect.
pub struct TestHarness {
    pub coordinator: TestCoordinator,
    pub backend: InstrumentedBackend<InMemoryBackend>,
    pub registry: Arc<ParticipantRegistry>,
    pub log: CallLog,
}

impl TestHarness {
    pub fn new(config: PersistenceConfig) -> anyhow::Result<Self> {
        Self::with_backend(config, InMemoryBackend::new())
    }

    /// Build a harness over an existing in-memory backend, e.g. to simulate a
    /// second process sharing the same storage.
    pub fn with_backend(config: PersistenceConfig, memory: InMemoryBackend) -> anyhow::Result<Self> {
        init_test_logging();

        let log = CallLog::new();
        let backend = InstrumentedBackend::new(memory).with_log(log.clone());
        let store = FileStore::new(backend.clone(), &config.store)?;
        let registry = Arc::new(ParticipantRegistry::new());
        let coordinator = PersistenceCoordinator::new(config, store, registry.clone())?;

        Ok(Self {
            coordinator,
            backend,
            registry,
            log,
        })
    }

    pub fn participant(&self, name: &str) -> RecordingParticipant {
        RecordingParticipant::new(name, self.log.clone())
    }
}
