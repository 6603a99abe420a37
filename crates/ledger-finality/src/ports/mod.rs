//! Ports layer: driving API and driven collaborator traits.

pub mod inbound;
pub mod outbound;

pub use inbound::{FinalityApi, SubmissionReceipt, VoteSubmission};
pub use outbound::{
    AppendRequest, CorrelationId, LedgerGateway, ThreatSignalSource, ValidatorSetProvider,
};
