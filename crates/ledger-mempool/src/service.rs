//! Shared mempool service.
//!
//! Wraps the domain pool in a single `parking_lot::RwLock`: admissions and
//! removals take the write lock, selection and stats take the read lock.
//! Selection and removal are infrequent relative to admission, so one lock
//! around the whole structure is sufficient; no finer-grained locking is
//! needed.

use crate::domain::{
    AdmissionError, MempoolConfig, MempoolStats, Timestamp, Transaction, TransactionPool, TxId,
    TxSubmission,
};
use crate::ports::MempoolApi;
use parking_lot::RwLock;
use std::sync::Arc;

/// Thread-safe handle to the transaction pool.
///
/// Cheap to clone; all clones share the same pool.
#[derive(Clone)]
pub struct SharedMempool {
    pool: Arc<RwLock<TransactionPool>>,
}

impl SharedMempool {
    /// Creates a shared pool with the given configuration.
    pub fn new(config: MempoolConfig) -> Self {
        Self {
            pool: Arc::new(RwLock::new(TransactionPool::new(config))),
        }
    }

    /// Creates a shared pool with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(MempoolConfig::default())
    }

    /// Evicts using the configured default horizon.
    pub fn evict_default(&self, now: Timestamp) -> Vec<TxId> {
        let mut pool = self.pool.write();
        let evicted = pool.evict_default(now);
        if !evicted.is_empty() {
            tracing::info!(count = evicted.len(), "evicted expired transactions");
        }
        evicted
    }
}

impl MempoolApi for SharedMempool {
    fn admit(&self, submission: TxSubmission, now: Timestamp) -> Result<TxId, AdmissionError> {
        let result = self.pool.write().admit(submission, now);
        match &result {
            Ok(id) => tracing::debug!(tx = %ledger_types::hex_prefix(id), "transaction admitted"),
            Err(err) => tracing::debug!(%err, "transaction rejected"),
        }
        result
    }

    fn select(&self, limit: usize, now: Timestamp) -> Vec<Transaction> {
        self.pool.read().select(limit, now)
    }

    fn remove(&self, ids: &[TxId]) -> Vec<TxId> {
        self.pool.write().remove(ids)
    }

    fn evict(&self, max_age_ms: u64, now: Timestamp) -> Vec<TxId> {
        self.pool.write().evict(max_age_ms, now)
    }

    fn stats(&self) -> MempoolStats {
        self.pool.read().stats()
    }

    fn contains(&self, id: &TxId) -> bool {
        self.pool.read().contains(id)
    }

    fn len(&self) -> usize {
        self.pool.read().len()
    }
}
