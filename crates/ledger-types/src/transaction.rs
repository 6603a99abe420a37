//! Transaction entity shared by the mempool and block assembly.

use crate::hashing::sha256;
use crate::{Hash, Timestamp, TxId};
use serde::{Deserialize, Serialize};

/// A ledger transaction awaiting (or included in) finalization.
///
/// The payload is opaque to the engine; admission policy only looks at the
/// fee, the declared size and the presence of a payload. The identifier is
/// content-derived, so submitting identical content twice yields the same id
/// and the pool can detect the duplicate.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Content-derived identifier.
    pub id: TxId,
    /// Opaque payload bytes.
    pub payload: Vec<u8>,
    /// Fee in smallest units.
    pub fee: u64,
    /// Declared size in bytes.
    pub size_bytes: u64,
    /// Optional submitting principal (platform user or service id).
    pub sender: Option<String>,
    /// Timestamp when the pool admitted the transaction (ms).
    pub admitted_at: Timestamp,
}

impl Transaction {
    /// Creates a transaction, deriving its id from the content fields.
    pub fn new(
        payload: Vec<u8>,
        fee: u64,
        size_bytes: u64,
        sender: Option<String>,
        admitted_at: Timestamp,
    ) -> Self {
        let id = Self::content_id(&payload, fee, size_bytes, sender.as_deref());
        Self {
            id,
            payload,
            fee,
            size_bytes,
            sender,
            admitted_at,
        }
    }

    /// Derives the content-addressed identifier.
    ///
    /// The admission timestamp is deliberately excluded: re-submitting the
    /// same content later must map to the same id.
    pub fn content_id(payload: &[u8], fee: u64, size_bytes: u64, sender: Option<&str>) -> TxId {
        let mut bytes = Vec::with_capacity(payload.len() + 32);
        bytes.extend_from_slice(payload);
        bytes.extend_from_slice(&fee.to_le_bytes());
        bytes.extend_from_slice(&size_bytes.to_le_bytes());
        if let Some(sender) = sender {
            bytes.extend_from_slice(&(sender.len() as u64).to_le_bytes());
            bytes.extend_from_slice(sender.as_bytes());
        }
        sha256(&bytes)
    }

    /// Fee per byte, the base of the priority score.
    pub fn fee_density(&self) -> f64 {
        self.fee as f64 / self.size_bytes as f64
    }

    /// Age in milliseconds at `now`. Saturates at zero for clock skew.
    pub fn age_ms(&self, now: Timestamp) -> u64 {
        now.saturating_sub(self.admitted_at)
    }

    /// Leaf hash for the payload merkle tree.
    ///
    /// Recomputed from the content fields rather than read from `id`, so a
    /// payload mutated after assembly changes the committed root even if the
    /// stored id was left untouched.
    pub fn leaf_hash(&self) -> Hash {
        Self::content_id(&self.payload, self.fee, self.size_bytes, self.sender.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_id_stable_across_admission_time() {
        let a = Transaction::new(vec![1, 2, 3], 50, 3, Some("svc-auth".into()), 1_000);
        let b = Transaction::new(vec![1, 2, 3], 50, 3, Some("svc-auth".into()), 9_999);
        assert_eq!(a.id, b.id);
    }

    #[test]
    fn test_content_id_varies_with_fields() {
        let base = Transaction::new(vec![1, 2, 3], 50, 3, None, 0);
        let other_fee = Transaction::new(vec![1, 2, 3], 51, 3, None, 0);
        let other_payload = Transaction::new(vec![9, 9, 9], 50, 3, None, 0);
        let other_sender = Transaction::new(vec![1, 2, 3], 50, 3, Some("u-1".into()), 0);

        assert_ne!(base.id, other_fee.id);
        assert_ne!(base.id, other_payload.id);
        assert_ne!(base.id, other_sender.id);
    }

    #[test]
    fn test_fee_density() {
        let tx = Transaction::new(vec![0; 4], 100, 200, None, 0);
        assert!((tx.fee_density() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_age_saturates_on_clock_skew() {
        let tx = Transaction::new(vec![1], 10, 1, None, 5_000);
        assert_eq!(tx.age_ms(4_000), 0);
        assert_eq!(tx.age_ms(6_500), 1_500);
    }
}
