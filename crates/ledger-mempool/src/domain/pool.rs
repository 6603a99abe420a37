//! # Transaction Pool - Admission Control and Priority Selection
//!
//! Implements the core mempool data structure.
//!
//! ## Invariants Enforced
//!
//! - Validation is ordered and short-circuiting: payload presence, then
//!   minimum fee, then size bounds. A rejected submission is never stored.
//! - No duplicate content: the content-derived id is checked in `admit()`.
//! - Priority is monotone in fee density and in age, recomputed lazily at
//!   selection time.
//! - Eviction removes only transactions whose age has reached the horizon.

use super::entities::{MempoolConfig, Timestamp, Transaction, TxId, TxSubmission};
use super::errors::AdmissionError;
use super::value_objects::MempoolStats;
use std::collections::HashMap;

/// Admission-controlled transaction pool.
///
/// Single-threaded domain structure; concurrent access is serialized by the
/// owning [`crate::service::SharedMempool`].
#[derive(Debug)]
pub struct TransactionPool {
    /// Configuration.
    config: MempoolConfig,

    /// All pooled transactions indexed by content id.
    by_id: HashMap<TxId, Transaction>,
}

impl TransactionPool {
    /// Creates a new empty pool.
    pub fn new(config: MempoolConfig) -> Self {
        Self {
            config,
            by_id: HashMap::new(),
        }
    }

    /// Creates a pool with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(MempoolConfig::default())
    }

    /// Returns the current configuration.
    pub fn config(&self) -> &MempoolConfig {
        &self.config
    }

    /// Returns the number of pooled transactions.
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Returns true if the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }

    /// Checks if a transaction is pooled.
    pub fn contains(&self, id: &TxId) -> bool {
        self.by_id.contains_key(id)
    }

    /// Gets a pooled transaction by id.
    pub fn get(&self, id: &TxId) -> Option<&Transaction> {
        self.by_id.get(id)
    }

    /// Validates and admits a submission.
    ///
    /// Validation order is fixed and short-circuiting:
    /// 1. payload must be present (`malformed-payload`)
    /// 2. fee must reach the minimum (`fee-too-low`)
    /// 3. size must lie in `(0, max]` (`invalid-size`)
    ///
    /// # Errors
    /// - `MalformedPayload`, `FeeTooLow`, `InvalidSize` per the rules above
    /// - `DuplicateTransaction` if identical content is already pooled
    /// - `PoolFull` at capacity when the newcomer does not outrank the
    ///   lowest-priority entry
    pub fn admit(
        &mut self,
        submission: TxSubmission,
        now: Timestamp,
    ) -> Result<TxId, AdmissionError> {
        if submission.payload.is_empty() {
            return Err(AdmissionError::MalformedPayload);
        }

        if submission.fee < self.config.min_fee {
            return Err(AdmissionError::FeeTooLow {
                fee: submission.fee,
                minimum: self.config.min_fee,
            });
        }

        if submission.size_bytes == 0 || submission.size_bytes > self.config.max_tx_size {
            return Err(AdmissionError::InvalidSize {
                size: submission.size_bytes,
                maximum: self.config.max_tx_size,
            });
        }

        let id = Transaction::content_id(
            &submission.payload,
            submission.fee,
            submission.size_bytes,
            submission.sender.as_deref(),
        );
        if self.by_id.contains_key(&id) {
            return Err(AdmissionError::DuplicateTransaction(id));
        }

        if self.by_id.len() >= self.config.max_transactions && !self.try_evict_for(&submission, now)
        {
            return Err(AdmissionError::PoolFull {
                capacity: self.config.max_transactions,
            });
        }

        let tx = Transaction::new(
            submission.payload,
            submission.fee,
            submission.size_bytes,
            submission.sender,
            now,
        );
        self.by_id.insert(id, tx);
        Ok(id)
    }

    /// Priority score of a transaction at `now`.
    ///
    /// Fee density plus a linear age bonus. The exact blend is a policy
    /// knob; what the pool guarantees is monotonicity in both terms.
    pub fn priority_score(&self, tx: &Transaction, now: Timestamp) -> f64 {
        let age_secs = tx.age_ms(now) as f64 / 1000.0;
        tx.fee_density() + age_secs * self.config.age_weight
    }

    /// Tries to evict the lowest-priority entry to make room.
    ///
    /// Only evicts when the newcomer's score (age zero, so fee density
    /// alone) strictly outranks the current lowest. An equal score never
    /// justifies eviction, keeping admission deterministic.
    fn try_evict_for(&mut self, submission: &TxSubmission, now: Timestamp) -> bool {
        let lowest = self
            .by_id
            .values()
            .min_by(|a, b| {
                self.priority_score(a, now)
                    .total_cmp(&self.priority_score(b, now))
                    .then_with(|| b.admitted_at.cmp(&a.admitted_at))
            })
            .map(|tx| (tx.id, self.priority_score(tx, now)));

        let Some((lowest_id, lowest_score)) = lowest else {
            return false;
        };

        let newcomer_score = submission.fee as f64 / submission.size_bytes as f64;
        if newcomer_score <= lowest_score {
            return false;
        }

        self.by_id.remove(&lowest_id);
        true
    }

    /// Selects up to `limit` transactions, highest priority first.
    ///
    /// Scores are recomputed at `now`; ties break toward the earlier
    /// admission time, then the lower id for full determinism.
    pub fn select(&self, limit: usize, now: Timestamp) -> Vec<Transaction> {
        let mut ranked: Vec<&Transaction> = self.by_id.values().collect();
        ranked.sort_by(|a, b| {
            self.priority_score(b, now)
                .total_cmp(&self.priority_score(a, now))
                .then_with(|| a.admitted_at.cmp(&b.admitted_at))
                .then_with(|| a.id.cmp(&b.id))
        });
        ranked.into_iter().take(limit).cloned().collect()
    }

    /// Removes the given transactions, returning the ids actually removed.
    ///
    /// Unknown ids are skipped; removal after block finalization must not
    /// fail because another path already dropped an entry.
    pub fn remove(&mut self, ids: &[TxId]) -> Vec<TxId> {
        ids.iter()
            .filter(|id| self.by_id.remove(*id).is_some())
            .copied()
            .collect()
    }

    /// Evicts transactions whose age at `now` has reached `max_age_ms`.
    ///
    /// Never removes a transaction younger than the horizon.
    pub fn evict(&mut self, max_age_ms: u64, now: Timestamp) -> Vec<TxId> {
        let expired: Vec<TxId> = self
            .by_id
            .values()
            .filter(|tx| tx.age_ms(now) >= max_age_ms)
            .map(|tx| tx.id)
            .collect();
        self.remove(&expired)
    }

    /// Evicts using the configured default horizon.
    pub fn evict_default(&mut self, now: Timestamp) -> Vec<TxId> {
        self.evict(self.config.max_age_ms, now)
    }

    /// Gets the pool statistics.
    pub fn stats(&self) -> MempoolStats {
        let pending_count = self.by_id.len();
        let total_fees: u128 = self.by_id.values().map(|tx| tx.fee as u128).sum();
        let total_bytes: u64 = self.by_id.values().map(|tx| tx.size_bytes).sum();
        let average_fee = if pending_count == 0 {
            0.0
        } else {
            total_fees as f64 / pending_count as f64
        };

        MempoolStats {
            pending_count,
            total_fees,
            average_fee,
            total_bytes,
        }
    }
}
