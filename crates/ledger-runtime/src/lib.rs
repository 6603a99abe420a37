//! # ledger-runtime
//!
//! Wires the finality engine's subsystems into one synchronous pipeline:
//!
//! ```text
//! admit ──→ [Mempool] ──select──→ [Assembler] ──→ [Miner]        (Layer 1)
//!                                                    │
//! validators ──votes──→ [Finality Service] ←─ mined block
//!                              │                                 (Layer 2)
//!                   finalize: re-check PoW, adaptive quorum
//!                              │
//!                    append ──→ [Ledger Sink] ──→ remove from mempool
//! ```
//!
//! The mempool removal strictly follows a successful append, so a sink
//! failure leaves the batch intact for the next attempt.

pub mod adapters;
pub mod pipeline;

pub use adapters::{InMemoryLedger, StaticThreatFeed, StaticValidatorRegistry};
pub use pipeline::FinalityPipeline;

use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time in milliseconds since the UNIX epoch.
///
/// The domain layers take timestamps as arguments; this is the single place
/// the runtime reads the ambient clock.
pub fn now_ms() -> ledger_types::Timestamp {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
