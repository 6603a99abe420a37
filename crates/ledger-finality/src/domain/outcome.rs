//! Finality outcome: the auditable verdict of one finalization attempt.

use ledger_types::Hash;
use serde::{Deserialize, Serialize};

/// Terminal verdict of a finalization attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinalityVerdict {
    /// The recomputed proof-of-work does not meet the declared difficulty.
    RejectedLayer1,
    /// The valid signature count fell short of the adaptive threshold.
    RejectedLayer2,
    /// Both layers succeeded; the block was appended to the ledger sink.
    Finalized,
}

/// Auditable record of one finalization attempt.
///
/// Produced once per `finalize()` call and immutable afterwards. Rejection
/// is an outcome, not an error: callers re-mine or gather more signatures
/// and try again, which yields a fresh outcome.
///
/// The threshold fields are absent on a Layer 1 rejection: the threat
/// factor is only fetched once the proof-of-work holds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FinalityOutcome {
    /// The verdict.
    pub verdict: FinalityVerdict,
    /// Hash of the evaluated block.
    pub block_hash: Hash,
    /// Distinct valid signers observed at evaluation time.
    pub quorum_achieved: usize,
    /// Threshold that applied, when Layer 2 was reached.
    pub quorum_required: Option<usize>,
    /// Threat factor the threshold was derived from, when Layer 2 was reached.
    pub threat_factor: Option<f64>,
    /// Wall-clock duration of the whole check (ms).
    pub elapsed_ms: u64,
    /// Human-readable reason, present on rejections.
    pub reason: Option<String>,
}

impl FinalityOutcome {
    /// Layer 1 rejection: the proof-of-work did not re-validate.
    pub fn rejected_layer1(block_hash: Hash, quorum_achieved: usize, elapsed_ms: u64) -> Self {
        Self {
            verdict: FinalityVerdict::RejectedLayer1,
            block_hash,
            quorum_achieved,
            quorum_required: None,
            threat_factor: None,
            elapsed_ms,
            reason: Some("pow-invalid".to_string()),
        }
    }

    /// Layer 2 rejection: quorum not reached under the current threshold.
    pub fn rejected_layer2(
        block_hash: Hash,
        quorum_achieved: usize,
        quorum_required: usize,
        threat_factor: f64,
        elapsed_ms: u64,
    ) -> Self {
        Self {
            verdict: FinalityVerdict::RejectedLayer2,
            block_hash,
            quorum_achieved,
            quorum_required: Some(quorum_required),
            threat_factor: Some(threat_factor),
            elapsed_ms,
            reason: Some(format!(
                "quorum-insufficient: {}/{} valid signatures at threat factor {:.2}",
                quorum_achieved, quorum_required, threat_factor
            )),
        }
    }

    /// Both layers succeeded and the append completed.
    pub fn finalized(
        block_hash: Hash,
        quorum_achieved: usize,
        quorum_required: usize,
        threat_factor: f64,
        elapsed_ms: u64,
    ) -> Self {
        Self {
            verdict: FinalityVerdict::Finalized,
            block_hash,
            quorum_achieved,
            quorum_required: Some(quorum_required),
            threat_factor: Some(threat_factor),
            elapsed_ms,
            reason: None,
        }
    }

    /// Returns true for the finalized verdict.
    pub fn is_finalized(&self) -> bool {
        self.verdict == FinalityVerdict::Finalized
    }
}
