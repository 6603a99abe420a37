//! # Integration Tests Crate
//!
//! Cross-subsystem tests exercising the full admission → assembly → mining
//! → quorum → finality pipeline against in-memory collaborators.
//!
//! ## Structure
//!
//! ```text
//! integration-tests/
//! └── src/
//!     ├── lib.rs           # This file + the TestNet harness
//!     └── pipeline_flow.rs # End-to-end pipeline scenarios
//! ```
//!
//! ## Covered flows
//!
//! 1. **Full round**: admitted transactions finalize and drain from the pool
//! 2. **Chain growth**: consecutive blocks link through the ledger tip
//! 3. **Retry safety**: a sink outage keeps the batch in the mempool
//! 4. **Adaptive quorum**: a threat spike raises the bar between rounds
//! 5. **Vote binding**: a vote for one block does not verify for another

pub mod pipeline_flow;

use ed25519_dalek::{Signer, SigningKey};
use ledger_finality::{FinalityConfig, FinalityService, ValidatorSet, VoteSubmission};
use ledger_forge::ForgeConfig;
use ledger_mempool::{MempoolConfig, SharedMempool};
use ledger_runtime::{FinalityPipeline, InMemoryLedger, StaticThreatFeed, StaticValidatorRegistry};
use ledger_sigverify::signing_message;
use ledger_types::{CandidateBlock, SignerId};
use rand::rngs::OsRng;
use std::sync::Arc;

/// A validator fixture holding its signing key.
pub struct TestValidator {
    /// Stable signer id.
    pub id: SignerId,
    /// Ed25519 signing key.
    pub key: SigningKey,
}

impl TestValidator {
    /// Creates a validator with a deterministic id and a fresh key.
    pub fn new(id_byte: u8) -> Self {
        Self {
            id: [id_byte; 32],
            key: SigningKey::generate(&mut OsRng),
        }
    }

    /// Signs a mined block's canonical identifier.
    pub fn vote(&self, block: &CandidateBlock) -> VoteSubmission {
        let message = signing_message(
            &block.hash.expect("block must be mined before voting"),
            block.index,
            block.created_at,
        );
        VoteSubmission {
            signer_id: self.id,
            public_key: self.key.verifying_key().to_bytes(),
            signature: self.key.sign(&message).to_bytes(),
            signed_at: 5_000,
        }
    }
}

/// Concrete finality service type used across the suite.
pub type TestFinality = FinalityService<InMemoryLedger, StaticThreatFeed, StaticValidatorRegistry>;

/// One fully wired engine instance with in-memory collaborators.
pub struct TestNet {
    /// Shared transaction pool.
    pub mempool: Arc<SharedMempool>,
    /// In-memory ledger sink with an outage switch.
    pub ledger: Arc<InMemoryLedger>,
    /// Mutable threat feed.
    pub threat: Arc<StaticThreatFeed>,
    /// The finality service under test.
    pub finality: Arc<TestFinality>,
    /// The production pipeline.
    pub pipeline: FinalityPipeline<SharedMempool, TestFinality>,
    /// Registered validators.
    pub validators: Vec<TestValidator>,
}

impl TestNet {
    /// Wires an engine with `validator_count` registered validators.
    pub fn new(validator_count: u8) -> Self {
        let validators: Vec<TestValidator> = (1..=validator_count).map(TestValidator::new).collect();
        let set = ValidatorSet::new(validators.iter().map(|v| v.id).collect());

        let ledger = Arc::new(InMemoryLedger::new());
        let threat = Arc::new(StaticThreatFeed::quiet());
        let finality = Arc::new(FinalityService::new(
            FinalityConfig::default(),
            Arc::clone(&ledger),
            Arc::clone(&threat),
            Arc::new(StaticValidatorRegistry::new(set)),
        ));
        let mempool = Arc::new(SharedMempool::new(MempoolConfig::for_testing()));
        let pipeline = FinalityPipeline::new(
            Arc::clone(&mempool),
            Arc::clone(&finality),
            ForgeConfig::for_testing(),
        );

        Self {
            mempool,
            ledger,
            threat,
            finality,
            pipeline,
            validators,
        }
    }
}
