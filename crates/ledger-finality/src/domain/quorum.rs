//! Layer 2 vote accumulation: per-block signature records with signer
//! deduplication.

use ledger_sigverify::{PublicKeyBytes, SignatureBytes};
use ledger_types::{Hash, SignerId, Timestamp};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use std::collections::HashSet;

/// Verification status of a recorded signature.
///
/// Verification happens once, at submission; the cached verdict is never
/// re-derived for counting. The finality checker re-derives *Layer 1* from
/// scratch because miner and checker may sit in different trust domains;
/// signature records never cross such a boundary, so their cache is safe.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerificationStatus {
    /// Not yet checked.
    #[default]
    Unverified,
    /// Checked and valid; counts toward quorum.
    Valid,
    /// Checked and invalid; kept for audit, never counted.
    Invalid,
}

/// A single recorded vote over a block's canonical identifier.
#[serde_as]
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureRecord {
    /// Stable signer identifier (the deduplication dimension).
    pub signer_id: SignerId,
    /// Public key the signature was verified against.
    pub public_key: PublicKeyBytes,
    /// Detached Ed25519 signature bytes.
    #[serde_as(as = "Bytes")]
    pub signature: SignatureBytes,
    /// Timestamp the vote was submitted (ms).
    pub signed_at: Timestamp,
    /// Cached verification verdict.
    pub status: VerificationStatus,
}

/// The active validator population, as reported by the platform.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidatorSet {
    /// Signer ids of the active validators.
    pub validators: Vec<SignerId>,
}

impl ValidatorSet {
    /// Creates a set from signer ids.
    pub fn new(validators: Vec<SignerId>) -> Self {
        Self { validators }
    }

    /// Number of active validators.
    pub fn len(&self) -> usize {
        self.validators.len()
    }

    /// Returns true if no validators are registered.
    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// Membership check.
    pub fn contains(&self, signer_id: &SignerId) -> bool {
        self.validators.contains(signer_id)
    }
}

/// Accumulated votes for one candidate block.
///
/// Counting deduplicates by signer id, not by public key: a signer rotating
/// keys mid-session still counts once. Invalid submissions are kept for the
/// audit trail but never enter the seen-signer set, so a signer whose first
/// attempt was invalid may still submit a correct vote.
#[derive(Clone, Debug)]
pub struct BlockVotes {
    /// Hash of the block being voted on.
    block_hash: Hash,
    /// Every submission, valid or not, in arrival order.
    records: Vec<SignatureRecord>,
    /// Signers with a counted (valid) vote.
    seen_signers: HashSet<SignerId>,
}

impl BlockVotes {
    /// Creates an empty vote set for a block.
    pub fn new(block_hash: Hash) -> Self {
        Self {
            block_hash,
            records: Vec::new(),
            seen_signers: HashSet::new(),
        }
    }

    /// The block these votes refer to.
    pub fn block_hash(&self) -> Hash {
        self.block_hash
    }

    /// Records a verified-valid vote.
    ///
    /// Returns `false` without storing anything if this signer already has
    /// a counted vote.
    pub fn record_valid(&mut self, record: SignatureRecord) -> bool {
        debug_assert_eq!(record.status, VerificationStatus::Valid);
        if !self.seen_signers.insert(record.signer_id) {
            return false;
        }
        self.records.push(record);
        true
    }

    /// Records a verified-invalid vote for the audit trail.
    pub fn record_invalid(&mut self, record: SignatureRecord) {
        debug_assert_eq!(record.status, VerificationStatus::Invalid);
        self.records.push(record);
    }

    /// Number of distinct signers with a valid vote.
    pub fn valid_signer_count(&self) -> usize {
        self.seen_signers.len()
    }

    /// Whether this signer already has a counted vote.
    pub fn has_signer(&self, signer_id: &SignerId) -> bool {
        self.seen_signers.contains(signer_id)
    }

    /// All recorded submissions, valid and invalid, in arrival order.
    pub fn records(&self) -> &[SignatureRecord] {
        &self.records
    }
}
