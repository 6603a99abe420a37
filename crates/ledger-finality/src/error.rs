//! Error types for the finality subsystem.
//!
//! Note the split between errors and outcomes: a finality *rejection*
//! (invalid proof-of-work, insufficient quorum) is a first-class
//! [`crate::domain::FinalityOutcome`] value, not an error. Errors cover the
//! conditions under which no outcome could be produced at all.

use ledger_sigverify::SignatureError;
use thiserror::Error;

/// Finality subsystem errors.
#[derive(Debug, Error)]
pub enum FinalityError {
    /// The block was never mined; there is no hash to evaluate or sign.
    #[error("block {index} has no proof-of-work hash")]
    UnminedBlock {
        /// Sequence index of the offending block.
        index: u64,
    },

    /// A submitted signature failed verification.
    #[error("invalid signature from signer {signer}: {source}")]
    InvalidSignature {
        /// Hex prefix of the signer id.
        signer: String,
        /// Underlying verification failure.
        source: SignatureError,
    },

    /// The signer is not in the active validator set.
    #[error("unknown validator: {signer}")]
    UnknownValidator {
        /// Hex prefix of the signer id.
        signer: String,
    },

    /// Another finality evaluation is already running for this block.
    #[error("finality evaluation already in flight for block {block}")]
    EvaluationInFlight {
        /// Hex prefix of the block hash.
        block: String,
    },

    /// The block was already finalized and appended.
    #[error("block {block} already finalized")]
    AlreadyFinalized {
        /// Hex prefix of the block hash.
        block: String,
    },

    /// The ledger sink refused the append. Fatal to this attempt; the
    /// qualifying transactions stay in the mempool for retry.
    #[error("ledger append failed: {reason}")]
    LedgerAppend {
        /// Collaborator-reported reason.
        reason: String,
    },

    /// The validator set could not be queried.
    #[error("validator set unavailable: {reason}")]
    ValidatorSetUnavailable {
        /// Collaborator-reported reason.
        reason: String,
    },

    /// The threat signal source failed. Never surfaced from finalization;
    /// the adapter degrades to the minimum factor instead.
    #[error("threat signal unavailable: {reason}")]
    ThreatSignalUnavailable {
        /// Collaborator-reported reason.
        reason: String,
    },
}

/// Result type for finality operations.
pub type FinalityResult<T> = Result<T, FinalityError>;
