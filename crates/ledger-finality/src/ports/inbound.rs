//! Driving port: the finality API offered to the block production pipeline
//! and to validator submission tasks.

use crate::domain::{FinalityOutcome, ThreatLevel};
use crate::error::FinalityResult;
use async_trait::async_trait;
use ledger_sigverify::{PublicKeyBytes, SignatureBytes};
use ledger_types::{CandidateBlock, Hash, SignerId, Timestamp};

/// A validator's vote over a mined block.
#[derive(Clone, Debug)]
pub struct VoteSubmission {
    /// Stable signer identifier.
    pub signer_id: SignerId,
    /// Public key to verify against.
    pub public_key: PublicKeyBytes,
    /// Detached signature over the block's canonical signing message.
    pub signature: SignatureBytes,
    /// Submission timestamp (ms).
    pub signed_at: Timestamp,
}

/// Receipt for an accepted vote.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmissionReceipt {
    /// Block the vote was recorded against.
    pub block_hash: Hash,
    /// True when this signer already had a counted vote; the count is
    /// unchanged in that case.
    pub duplicate: bool,
    /// Distinct valid signers after this submission.
    pub valid_count: usize,
}

/// Primary API of the finality subsystem.
#[async_trait]
pub trait FinalityApi: Send + Sync {
    /// Verifies and records a vote for a mined block.
    ///
    /// Verification happens immediately, against the block's canonical
    /// identifier. Invalid signatures are rejected without affecting other
    /// signers' votes; duplicate signers are absorbed without double
    /// counting.
    ///
    /// # Errors
    /// - `UnminedBlock` if the block has no hash yet
    /// - `UnknownValidator` if the signer is not in the active set
    /// - `InvalidSignature` if verification fails
    /// - `AlreadyFinalized` if the block is past finality
    async fn submit_signature(
        &self,
        block: &CandidateBlock,
        submission: VoteSubmission,
    ) -> FinalityResult<SubmissionReceipt>;

    /// Runs the two-layer finality evaluation for a mined block.
    ///
    /// Layer 1 is re-derived from the block contents; Layer 2 compares the
    /// deduplicated valid-vote count against `ceil(validators × threat
    /// factor)`. Rejections are returned as outcomes, not errors.
    ///
    /// # Errors
    /// - `UnminedBlock`, `AlreadyFinalized`, `EvaluationInFlight`
    /// - `ValidatorSetUnavailable` if the registry cannot be read
    /// - `LedgerAppend` if the sink refuses the finalized record
    async fn finalize(&self, block: &CandidateBlock) -> FinalityResult<FinalityOutcome>;

    /// The current threat assessment (degrades to minimum on source failure).
    async fn current_threat(&self) -> ThreatLevel;

    /// Whether a block hash has been finalized by this service.
    fn is_finalized(&self, block_hash: &Hash) -> bool;
}
