//! # Transaction Pool (Mempool) Subsystem
//!
//! Queues, validates and prioritizes transactions awaiting inclusion in a
//! finalized ledger block.
//!
//! ## Admission Contract
//!
//! Validation is ordered and short-circuiting; a rejected submission is
//! never stored and every rejection is safe to retry:
//!
//! | Check | Rejection |
//! |-------|-----------|
//! | payload present | `malformed-payload` |
//! | fee ≥ minimum | `fee-too-low` |
//! | 0 < size ≤ maximum | `invalid-size` |
//! | content not already pooled | `duplicate` |
//!
//! ## Priority Model
//!
//! Score = fee density (fee / size) + linear age bonus. The blend is a
//! policy knob; the pool guarantees monotonicity in both inputs and a
//! deterministic tie-break (earlier admission, then id). Scores are
//! recomputed lazily at selection time, never stored.
//!
//! ## Concurrency
//!
//! [`SharedMempool`] serializes all access through one `RwLock`; see the
//! service module for the reader/writer split.
//!
//! ## Module Structure
//!
//! ```text
//! ports/inbound.rs       - MempoolApi trait
//!         ↑ implemented by
//! service.rs             - SharedMempool (locking wrapper)
//!         ↑ owns
//! domain/pool.rs         - TransactionPool (admission, selection, eviction)
//! domain/entities.rs     - TxSubmission, MempoolConfig
//! domain/value_objects.rs - MempoolStats
//! domain/errors.rs       - AdmissionError
//! ```

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::{
    AdmissionError, MempoolConfig, MempoolStats, TransactionPool, TxSubmission,
};
pub use ports::MempoolApi;
pub use service::SharedMempool;
