//! Value objects exposed by the mempool.

use serde::{Deserialize, Serialize};

/// Aggregate view of the pool's working set.
///
/// Consumed by the dashboard layers; produced on demand, never cached.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MempoolStats {
    /// Number of pooled transactions.
    pub pending_count: usize,
    /// Sum of pooled fees (smallest units).
    pub total_fees: u128,
    /// Mean fee across the pool, zero when empty.
    pub average_fee: f64,
    /// Sum of declared transaction sizes in bytes.
    pub total_bytes: u64,
}
