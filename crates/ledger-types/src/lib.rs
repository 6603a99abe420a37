//! # ledger-types
//!
//! Shared domain types for the Aegis ledger finality engine.
//!
//! ## Purpose
//!
//! Holds the primitives every subsystem agrees on: hash and identifier
//! aliases, the hashing helpers (SHA-256, double SHA-256, difficulty
//! targets, merkle roots), and the two entities that cross subsystem
//! boundaries: [`Transaction`] and [`CandidateBlock`].
//!
//! Keeping these here gives the workspace a single canonical byte encoding
//! for everything that gets hashed or signed. The proof-of-work check
//! ([`validate_pow`]) lives next to the encoding it re-derives, so the miner
//! and the finality checker validate against the same bytes without
//! depending on each other.

pub mod block;
pub mod hashing;
pub mod transaction;

/// 32-byte SHA-256 digest.
pub type Hash = [u8; 32];

/// Content-derived transaction identifier.
pub type TxId = [u8; 32];

/// Opaque validator/signer identifier.
///
/// Deduplication of quorum votes happens on this dimension, not on public
/// keys; a signer may rotate keys within a session.
pub type SignerId = [u8; 32];

/// Timestamp in milliseconds since UNIX epoch.
pub type Timestamp = u64;

pub use block::{validate_pow, BlockError, CandidateBlock, FinalizedRecord, GENESIS_HASH};
pub use hashing::{leading_zero_hex_digits, meets_difficulty, merkle_root, sha256, sha256d};
pub use transaction::Transaction;

/// Short hex prefix of a hash for log lines.
pub fn hex_prefix(hash: &Hash) -> String {
    hex::encode(&hash[..4])
}
