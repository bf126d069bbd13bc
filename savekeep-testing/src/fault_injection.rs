use async_trait::async_trait;
use bytes::Bytes;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use savekeep_core::{persistence::StorageBackend, Result, SaveError};

use crate::CallLog;

/// Operation counters for an [`InstrumentedBackend`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackendStats {
    pub reads: u64,
    pub writes: u64,
    pub removes: u64,
    pub lists: u64,
}

impl BackendStats {
    pub fn total(&self) -> u64 {
        self.reads + self.writes + self.removes + self.lists
    }
}

#[derive(Debug, Default)]
struct Counters {
    reads: AtomicU64,
    writes: AtomicU64,
    removes: AtomicU64,
    lists: AtomicU64,
    fail_writes: AtomicBool,
}

/// Wraps another backend, counting every operation and optionally failing
/// writes the way a full disk would.
///
/// Writes are also appended to an optional [`CallLog`] as `write:<entry>`,
/// so tests can check their order against participant calls.
#[derive(Debug, Clone)]
pub struct InstrumentedBackend<B> {
    inner: B,
    counters: Arc<Counters>,
    log: Option<CallLog>,
}

impl<B: StorageBackend> InstrumentedBackend<B> {
    pub fn new(inner: B) -> Self {
        Self {
            inner,
            counters: Arc::new(Counters::default()),
            log: None,
        }
    }

    pub fn with_log(mut self, log: CallLog) -> Self {
        self.log = Some(log);
        self
    }

    pub fn inner(&self) -> &B {
        &self.inner
    }

    /// Make every subsequent write fail until turned off again.
    pub fn set_fail_writes(&self, fail: bool) {
        self.counters.fail_writes.store(fail, Ordering::Release);
    }

    pub fn stats(&self) -> BackendStats {
        BackendStats {
            reads: self.counters.reads.load(Ordering::Acquire),
            writes: self.counters.writes.load(Ordering::Acquire),
            removes: self.counters.removes.load(Ordering::Acquire),
            lists: self.counters.lists.load(Ordering::Acquire),
        }
    }
}

#[async_trait]
impl<B: StorageBackend> StorageBackend for InstrumentedBackend<B> {
    async fn write(&self, name: &str, bytes: &[u8]) -> Result<()> {
        self.counters.writes.fetch_add(1, Ordering::AcqRel);
        if let Some(log) = &self.log {
            log.push(format!("write:{}", name));
        }

        if self.counters.fail_writes.load(Ordering::Acquire) {
            return Err(SaveError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "injected write failure: no space left on device",
            )));
        }
        self.inner.write(name, bytes).await
    }

    async fn read(&self, name: &str) -> Result<Option<Bytes>> {
        self.counters.reads.fetch_add(1, Ordering::AcqRel);
        self.inner.read(name).await
    }

    async fn remove(&self, name: &str) -> Result<()> {
        self.counters.removes.fetch_add(1, Ordering::AcqRel);
        self.inner.remove(name).await
    }

    async fn list(&self) -> Result<Vec<String>> {
        self.counters.lists.fetch_add(1, Ordering::AcqRel);
        self.inner.list().await
    }
}
