//! Core domain entities for the mempool subsystem.

// Re-export from ledger-types for convenience
pub use ledger_types::{Timestamp, Transaction, TxId};

/// A transaction submission as received at the admission boundary.
///
/// Carries everything the pool validates; the admission timestamp and the
/// content-derived id are attached by the pool itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxSubmission {
    /// Opaque payload bytes.
    pub payload: Vec<u8>,
    /// Offered fee in smallest units.
    pub fee: u64,
    /// Declared size in bytes.
    pub size_bytes: u64,
    /// Optional submitting principal.
    pub sender: Option<String>,
}

impl TxSubmission {
    /// Convenience constructor for senderless submissions.
    pub fn new(payload: Vec<u8>, fee: u64, size_bytes: u64) -> Self {
        Self {
            payload,
            fee,
            size_bytes,
            sender: None,
        }
    }

    /// Attaches a sender identifier.
    pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }
}

/// Mempool configuration.
#[derive(Clone, Debug)]
pub struct MempoolConfig {
    /// Maximum transactions held in the pool.
    pub max_transactions: usize,
    /// Minimum admissible fee (smallest units).
    pub min_fee: u64,
    /// Maximum admissible transaction size in bytes.
    pub max_tx_size: u64,
    /// Linear age bonus added to the priority score, per second of age.
    pub age_weight: f64,
    /// Default eviction horizon (milliseconds).
    pub max_age_ms: u64,
}

impl Default for MempoolConfig {
    fn default() -> Self {
        Self {
            max_transactions: 5_000,
            min_fee: 1,
            max_tx_size: 65_536,
            age_weight: 0.01,
            max_age_ms: 24 * 60 * 60 * 1000, // 24 hours
        }
    }
}

impl MempoolConfig {
    /// Creates a minimal config for testing.
    pub fn for_testing() -> Self {
        Self {
            max_transactions: 100,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = MempoolConfig::default();
        assert_eq!(config.max_transactions, 5_000);
        assert_eq!(config.min_fee, 1);
        assert_eq!(config.max_tx_size, 65_536);
        assert_eq!(config.max_age_ms, 86_400_000);
    }

    #[test]
    fn test_submission_builder() {
        let sub = TxSubmission::new(vec![1, 2], 10, 2).with_sender("svc-idp");
        assert_eq!(sub.sender.as_deref(), Some("svc-idp"));
    }
}
