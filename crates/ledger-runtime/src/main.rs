//! Demo entry point: runs one full admission → finality round against
//! in-memory collaborators.

use anyhow::{Context, Result};
use ed25519_dalek::{Signer, SigningKey};
use ledger_finality::{
    FinalityApi, FinalityConfig, FinalityService, ValidatorSet, VoteSubmission,
};
use ledger_forge::ForgeConfig;
use ledger_mempool::{MempoolApi, MempoolConfig, SharedMempool, TxSubmission};
use ledger_runtime::{
    now_ms, FinalityPipeline, InMemoryLedger, StaticThreatFeed, StaticValidatorRegistry,
};
use ledger_sigverify::signing_message;
use ledger_types::{SignerId, GENESIS_HASH};
use rand::rngs::OsRng;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

struct DemoValidator {
    id: SignerId,
    key: SigningKey,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Three registered validators; at the quiet factor 0.51 two must vote.
    let validators: Vec<DemoValidator> = (1u8..=3)
        .map(|byte| DemoValidator {
            id: [byte; 32],
            key: SigningKey::generate(&mut OsRng),
        })
        .collect();
    let validator_set = ValidatorSet::new(validators.iter().map(|v| v.id).collect());

    let ledger = Arc::new(InMemoryLedger::new());
    let finality = Arc::new(FinalityService::new(
        FinalityConfig::default(),
        Arc::clone(&ledger),
        Arc::new(StaticThreatFeed::quiet()),
        Arc::new(StaticValidatorRegistry::new(validator_set)),
    ));

    let mempool = Arc::new(SharedMempool::new(MempoolConfig::default()));
    let pipeline = FinalityPipeline::new(
        Arc::clone(&mempool),
        Arc::clone(&finality),
        ForgeConfig::default(),
    );

    // Admit a handful of identity-platform events.
    let now = now_ms();
    for (payload, fee) in [
        (&b"grant:analyst:report-viewer"[..], 40u64),
        (&b"revoke:contractor:db-admin"[..], 55),
        (&b"rotate:svc-gateway:key-7"[..], 25),
    ] {
        let size = payload.len() as u64;
        mempool
            .admit(TxSubmission::new(payload.to_vec(), fee, size), now)
            .context("admission failed")?;
    }
    info!(stats = ?mempool.stats(), "mempool primed");

    // Layer 1: assemble and mine the genesis block.
    let mut metadata = BTreeMap::new();
    metadata.insert("origin".to_string(), "demo".to_string());
    let (block, mining) = pipeline
        .produce_block(0, GENESIS_HASH, metadata, now_ms())
        .context("block production failed")?;
    info!(
        nonce = mining.nonce,
        difficulty = mining.difficulty,
        attempts = mining.attempts,
        "candidate mined"
    );

    // Layer 2: two of three validators vote.
    let block_hash = block.hash.expect("mined block has a hash");
    let message = signing_message(&block_hash, block.index, block.created_at);
    for validator in validators.iter().take(2) {
        let receipt = finality
            .submit_signature(
                &block,
                VoteSubmission {
                    signer_id: validator.id,
                    public_key: validator.key.verifying_key().to_bytes(),
                    signature: validator.key.sign(&message).to_bytes(),
                    signed_at: now_ms(),
                },
            )
            .await
            .context("vote submission failed")?;
        info!(valid_count = receipt.valid_count, "vote recorded");
    }

    // Finality: both layers evaluated, block appended, mempool drained.
    let outcome = pipeline.commit(&block).await.context("finalization failed")?;
    info!(
        verdict = ?outcome.verdict,
        quorum = %format!("{}/{:?}", outcome.quorum_achieved, outcome.quorum_required),
        threat_factor = ?outcome.threat_factor,
        elapsed_ms = outcome.elapsed_ms,
        "finality outcome"
    );
    info!(
        ledger_len = ledger.len(),
        mempool_len = mempool.len(),
        "round complete"
    );

    Ok(())
}
