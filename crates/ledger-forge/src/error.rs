//! Error types for the forge subsystem.

use thiserror::Error;

/// Result type alias for forge operations.
pub type Result<T> = std::result::Result<T, ForgeError>;

/// Errors that can occur during block assembly.
///
/// Mining itself has no failure mode: the relaxation guard keeps the nonce
/// search live at any difficulty.
#[derive(Debug, Error)]
pub enum ForgeError {
    /// More transactions offered than a block may carry.
    #[error("batch of {offered} transactions exceeds block capacity {capacity}")]
    BatchTooLarge {
        /// Transactions offered to the assembler.
        offered: usize,
        /// Configured per-block capacity.
        capacity: usize,
    },

    /// A non-genesis block was assembled without a predecessor reference.
    #[error("block {index} requires a previous hash (only index 0 may use the genesis sentinel)")]
    MissingPredecessor {
        /// Sequence index of the offending block.
        index: u64,
    },
}
