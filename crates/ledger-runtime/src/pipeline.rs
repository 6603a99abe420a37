//! The finality pipeline: select → assemble → mine → collect → finalize.
//!
//! The source platform drove these stages through chained events; here the
//! pipeline is an explicit owner composing them as plain calls. The only
//! suspension points are the I/O boundaries inside the finality service
//! (threat lookup, ledger append); the hashing loop runs synchronously on
//! the calling thread.

use ledger_finality::{FinalityApi, FinalityOutcome, FinalityResult};
use ledger_forge::{BlockAssembler, ForgeConfig, MiningOutcome, ProofOfWorkMiner};
use ledger_mempool::MempoolApi;
use ledger_types::{CandidateBlock, Hash, Timestamp, TxId};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Owns the production-side subsystems and the ordering between them.
pub struct FinalityPipeline<M, F>
where
    M: MempoolApi,
    F: FinalityApi,
{
    mempool: Arc<M>,
    finality: Arc<F>,
    assembler: BlockAssembler,
    miner: ProofOfWorkMiner,
    batch_limit: usize,
}

impl<M, F> FinalityPipeline<M, F>
where
    M: MempoolApi,
    F: FinalityApi,
{
    /// Wires a pipeline over a mempool and a finality service.
    pub fn new(mempool: Arc<M>, finality: Arc<F>, forge_config: ForgeConfig) -> Self {
        let batch_limit = forge_config.max_block_transactions;
        Self {
            mempool,
            finality,
            assembler: BlockAssembler::new(forge_config.clone()),
            miner: ProofOfWorkMiner::new(forge_config),
            batch_limit,
        }
    }

    /// Selects the highest-priority batch, assembles a candidate on top of
    /// `previous_hash` and mines it.
    ///
    /// Blocks the calling thread for the duration of the nonce search.
    pub fn produce_block(
        &self,
        index: u64,
        previous_hash: Hash,
        metadata: BTreeMap<String, String>,
        now: Timestamp,
    ) -> ledger_forge::Result<(CandidateBlock, MiningOutcome)> {
        let batch = self.mempool.select(self.batch_limit, now);
        tracing::debug!(index, batch_len = batch.len(), "selected batch for block");

        let mut block = self
            .assembler
            .assemble(index, previous_hash, batch, metadata, now)?;
        let outcome = self.miner.mine(&mut block);
        Ok((block, outcome))
    }

    /// Runs the finality evaluation and, only after the append succeeded,
    /// removes the included transactions from the mempool.
    ///
    /// Ordering is the retry-safety guarantee: a ledger failure propagates
    /// as an error before any transaction is dropped, so the same batch can
    /// be re-attempted.
    pub async fn commit(&self, block: &CandidateBlock) -> FinalityResult<FinalityOutcome> {
        let outcome = self.finality.finalize(block).await?;

        if outcome.is_finalized() {
            let ids: Vec<TxId> = block.transactions.iter().map(|tx| tx.id).collect();
            let removed = self.mempool.remove(&ids);
            tracing::info!(
                block = %ledger_types::hex_prefix(&outcome.block_hash),
                removed = removed.len(),
                "cleared finalized transactions from mempool"
            );
        }

        Ok(outcome)
    }

    /// The mempool handle this pipeline drains.
    pub fn mempool(&self) -> &Arc<M> {
        &self.mempool
    }

    /// The finality service votes are submitted to.
    pub fn finality(&self) -> &Arc<F> {
        &self.finality
    }
}
