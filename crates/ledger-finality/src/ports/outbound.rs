//! Driven ports: outbound dependencies of the finality checker.
//!
//! The ledger sink, the validator registry and the threat-signal feed are
//! external collaborators; the checker only sees these traits.

use crate::domain::{AlertCounts, ValidatorSet};
use crate::error::FinalityResult;
use async_trait::async_trait;
use ledger_types::FinalizedRecord;
use uuid::Uuid;

/// Correlation ID for tracking request/response pairs across the boundary.
pub type CorrelationId = Uuid;

/// Append request handed to the ledger sink.
#[derive(Clone, Debug)]
pub struct AppendRequest {
    /// Correlation id for the collaborator's audit trail.
    pub correlation_id: CorrelationId,
    /// The finalized block record.
    pub record: FinalizedRecord,
}

impl AppendRequest {
    /// Wraps a record with a fresh correlation id.
    pub fn new(record: FinalizedRecord) -> Self {
        Self {
            correlation_id: Uuid::new_v4(),
            record,
        }
    }
}

/// Durable append-only store for finalized blocks.
///
/// Append is the only operation the engine needs; replication and
/// compaction are the sink's own business.
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Appends a finalized record.
    ///
    /// # Errors
    /// Any error is fatal to the finalization attempt that issued it: the
    /// caller must leave the qualifying transactions in the mempool and
    /// retry later.
    async fn append(&self, request: AppendRequest) -> FinalityResult<()>;
}

/// Live security-alert feed.
///
/// Failures here are expected and tolerated: the threat adapter degrades to
/// the minimum factor rather than blocking consensus.
#[async_trait]
pub trait ThreatSignalSource: Send + Sync {
    /// Alert counts within the provider's rolling window (default one hour).
    async fn alert_counts(&self) -> FinalityResult<AlertCounts>;
}

/// Registry of the active validator population.
#[async_trait]
pub trait ValidatorSetProvider: Send + Sync {
    /// The current active validator set.
    ///
    /// Quorum thresholds are derived from this set's size; stale data
    /// shifts the bar, so providers should serve point-in-time reads.
    async fn active_validators(&self) -> FinalityResult<ValidatorSet>;
}
