//! In-memory implementations of the finality checker's outbound ports.
//!
//! The production deployment backs these with the platform's database
//! client; these adapters serve the demo binary and the integration suite.

use async_trait::async_trait;
use ledger_finality::{
    AlertCounts, AppendRequest, FinalityError, FinalityResult, LedgerGateway, ThreatSignalSource,
    ValidatorSet, ValidatorSetProvider,
};
use ledger_types::{FinalizedRecord, Hash};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

/// Append-only in-memory ledger sink.
///
/// Carries an outage switch so failure handling at the append boundary can
/// be exercised end to end.
#[derive(Default)]
pub struct InMemoryLedger {
    records: RwLock<Vec<FinalizedRecord>>,
    offline: AtomicBool,
}

impl InMemoryLedger {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates a sink outage: appends fail while set.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of appended records.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Returns true if nothing was appended yet.
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    /// Whether a block hash was appended.
    pub fn contains(&self, hash: &Hash) -> bool {
        self.records.read().iter().any(|r| &r.hash == hash)
    }

    /// Snapshot of all appended records.
    pub fn records(&self) -> Vec<FinalizedRecord> {
        self.records.read().clone()
    }

    /// Hash of the most recently appended block, if any.
    pub fn tip(&self) -> Option<Hash> {
        self.records.read().last().map(|r| r.hash)
    }
}

#[async_trait]
impl LedgerGateway for InMemoryLedger {
    async fn append(&self, request: AppendRequest) -> FinalityResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(FinalityError::LedgerAppend {
                reason: "ledger sink offline".to_string(),
            });
        }
        let mut records = self.records.write();
        if records.iter().any(|r| r.hash == request.record.hash) {
            return Err(FinalityError::LedgerAppend {
                reason: format!(
                    "record {} already appended",
                    ledger_types::hex_prefix(&request.record.hash)
                ),
            });
        }
        records.push(request.record);
        Ok(())
    }
}

/// Threat feed serving a fixed snapshot of alert counts.
pub struct StaticThreatFeed {
    counts: RwLock<AlertCounts>,
}

impl StaticThreatFeed {
    /// Creates a feed with the given counts.
    pub fn new(counts: AlertCounts) -> Self {
        Self {
            counts: RwLock::new(counts),
        }
    }

    /// A quiet feed (no alerts).
    pub fn quiet() -> Self {
        Self::new(AlertCounts::default())
    }

    /// Replaces the served counts.
    pub fn set(&self, counts: AlertCounts) {
        *self.counts.write() = counts;
    }
}

#[async_trait]
impl ThreatSignalSource for StaticThreatFeed {
    async fn alert_counts(&self) -> FinalityResult<AlertCounts> {
        Ok(*self.counts.read())
    }
}

/// Validator registry serving a fixed active set.
pub struct StaticValidatorRegistry {
    set: ValidatorSet,
}

impl StaticValidatorRegistry {
    /// Creates a registry with the given set.
    pub fn new(set: ValidatorSet) -> Self {
        Self { set }
    }
}

#[async_trait]
impl ValidatorSetProvider for StaticValidatorRegistry {
    async fn active_validators(&self) -> FinalityResult<ValidatorSet> {
        Ok(self.set.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(index: u64, hash_byte: u8) -> FinalizedRecord {
        FinalizedRecord {
            index,
            hash: [hash_byte; 32],
            previous_hash: [0u8; 32],
            merkle_root: [0u8; 32],
            nonce: 7,
            difficulty: 2,
            transaction_count: 1,
        }
    }

    #[tokio::test]
    async fn test_ledger_appends_and_tracks_tip() {
        let ledger = InMemoryLedger::new();
        ledger.append(AppendRequest::new(record(0, 0xAA))).await.unwrap();
        ledger.append(AppendRequest::new(record(1, 0xBB))).await.unwrap();

        assert_eq!(ledger.len(), 2);
        assert!(ledger.contains(&[0xAA; 32]));
        assert_eq!(ledger.tip(), Some([0xBB; 32]));
    }

    #[tokio::test]
    async fn test_ledger_refuses_double_append() {
        let ledger = InMemoryLedger::new();
        ledger.append(AppendRequest::new(record(0, 0xAA))).await.unwrap();

        let result = ledger.append(AppendRequest::new(record(0, 0xAA))).await;
        assert!(matches!(result, Err(FinalityError::LedgerAppend { .. })));
        assert_eq!(ledger.len(), 1);
    }

    #[tokio::test]
    async fn test_threat_feed_updates() {
        let feed = StaticThreatFeed::quiet();
        assert_eq!(feed.alert_counts().await.unwrap(), AlertCounts::default());

        let elevated = AlertCounts {
            critical_alerts: 2,
            high_alerts: 1,
            unblocked_attacks: 0,
        };
        feed.set(elevated);
        assert_eq!(feed.alert_counts().await.unwrap(), elevated);
    }
}
