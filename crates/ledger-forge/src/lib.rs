//! # ledger-forge
//!
//! Block assembly and Layer 1 (proof-of-work) mining for the finality
//! engine.
//!
//! ## Overview
//!
//! - [`BlockAssembler`] packages a mempool batch plus metadata into a
//!   [`ledger_types::CandidateBlock`] with its payload commitment computed.
//! - [`ProofOfWorkMiner`] runs the synchronous nonce search until the
//!   candidate's hash shows the required number of leading zero hex digits.
//!
//! ## Liveness over difficulty
//!
//! The miner's stuck-search guard bounds every difficulty level to a
//! configured attempt budget and relaxes the target by one when the budget
//! runs out (floor 1). Difficulty is therefore a *target*, not a guarantee:
//! the mined block records the level its hash actually met, and the
//! finality checker re-derives the proof from scratch; nothing downstream
//! trusts the miner's claim.
//!
//! ```text
//! assemble(batch) ──→ mine(candidate) ──→ (nonce, hash, met difficulty)
//!                        │    ▲
//!                        └────┘ budget exhausted: difficulty - 1, retry
//! ```

pub mod config;
pub mod domain;
pub mod error;

pub use config::ForgeConfig;
pub use domain::{BlockAssembler, MiningOutcome, ProofOfWorkMiner};
pub use error::{ForgeError, Result};
