//! # ledger-finality
//!
//! Layer 2 quorum collection and the two-layer finality checker.
//!
//! ## Overview
//!
//! This subsystem provides:
//! - **Adaptive quorum**: the required vote count scales with a live threat
//!   factor in [0.51, 0.90]
//! - **Zero-trust Layer 1**: proof-of-work is re-derived at evaluation
//!   time, never taken from the miner's claim
//! - **Signer deduplication**: quorum counts distinct signer ids, tolerant
//!   of key rotation
//! - **Auditable outcomes**: every attempt yields an immutable
//!   [`FinalityOutcome`] with counts, factor and timing
//!
//! ## Finality state machine
//!
//! ```text
//! [PENDING] ──layer 1 invalid──→ [REJECTED "pow-invalid"]
//!     │
//!     └─ layer 1 valid ──quorum short──→ [REJECTED "quorum-insufficient a/r"]
//!                │
//!                └─ quorum met ──append ok──→ [FINALIZED]
//!                       │
//!                       └── append failed ──→ error, attempt retryable
//! ```
//!
//! Terminal verdicts are never left: a finalized block reports
//! `AlreadyFinalized` on re-evaluation, and a rejection is closed: callers
//! re-mine or gather more votes and start a fresh attempt.
//!
//! ## Why two independent layers
//!
//! An adversary who can out-compute the hash puzzle still needs the
//! signature quorum, and colluding signers still need a valid proof-of-work.
//! The failure domains are assumed independent; compromising one is not
//! enough to finalize a block. The adaptive threshold additionally raises
//! the signature bar during elevated threat periods without any protocol
//! change.
//!
//! ## Example
//!
//! ```rust,ignore
//! use ledger_finality::{FinalityConfig, FinalityService};
//! use ledger_finality::ports::FinalityApi;
//!
//! let service = FinalityService::new(
//!     FinalityConfig::default(),
//!     ledger_gateway,
//!     threat_source,
//!     validator_provider,
//! );
//!
//! service.submit_signature(&block, vote).await?;
//! let outcome = service.finalize(&block).await?;
//! ```

pub mod domain;
pub mod error;
pub mod ports;
pub mod service;

pub use domain::{
    AlertCounts, BlockVotes, FinalityOutcome, FinalityVerdict, SignatureRecord, ThreatClass,
    ThreatLevel, ThreatWeights, ValidatorSet, VerificationStatus, FACTOR_MAX, FACTOR_MIN,
};
pub use error::{FinalityError, FinalityResult};
pub use ports::{
    AppendRequest, CorrelationId, FinalityApi, LedgerGateway, SubmissionReceipt,
    ThreatSignalSource, ValidatorSetProvider, VoteSubmission,
};
pub use service::{FinalityConfig, FinalityService};
