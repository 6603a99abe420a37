//! Block assembly: packaging a mempool batch into a mining candidate.

use crate::config::ForgeConfig;
use crate::error::{ForgeError, Result};
use ledger_types::{CandidateBlock, Hash, Timestamp, Transaction, GENESIS_HASH};
use std::collections::BTreeMap;

/// Packages transaction batches plus metadata into candidate blocks.
///
/// The assembler fixes the candidate's declared difficulty from config and
/// computes the payload commitment; the nonce stays zero until the miner
/// takes over.
pub struct BlockAssembler {
    config: ForgeConfig,
}

impl BlockAssembler {
    /// Creates an assembler with the given configuration.
    pub fn new(config: ForgeConfig) -> Self {
        Self { config }
    }

    /// Assembles a candidate block at `index` on top of `previous_hash`.
    ///
    /// # Errors
    /// - `BatchTooLarge` if the batch exceeds the per-block capacity
    /// - `MissingPredecessor` if a non-genesis index uses the genesis sentinel
    pub fn assemble(
        &self,
        index: u64,
        previous_hash: Hash,
        transactions: Vec<Transaction>,
        metadata: BTreeMap<String, String>,
        now: Timestamp,
    ) -> Result<CandidateBlock> {
        if transactions.len() > self.config.max_block_transactions {
            return Err(ForgeError::BatchTooLarge {
                offered: transactions.len(),
                capacity: self.config.max_block_transactions,
            });
        }

        if index > 0 && previous_hash == GENESIS_HASH {
            return Err(ForgeError::MissingPredecessor { index });
        }

        let block = CandidateBlock::new(
            index,
            previous_hash,
            transactions,
            metadata,
            self.config.difficulty,
            now,
        );
        tracing::debug!(
            index,
            tx_count = block.transactions.len(),
            difficulty = block.difficulty,
            "assembled candidate block"
        );
        Ok(block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_batch(count: usize) -> Vec<Transaction> {
        (0..count)
            .map(|i| Transaction::new((i as u64).to_le_bytes().to_vec(), 10, 8, None, 1_000))
            .collect()
    }

    #[test]
    fn test_assemble_sets_linkage_and_commitment() {
        let assembler = BlockAssembler::new(ForgeConfig::for_testing());
        let batch = create_batch(3);
        let block = assembler
            .assemble(5, [0xAB; 32], batch.clone(), BTreeMap::new(), 9_000)
            .unwrap();

        assert_eq!(block.index, 5);
        assert_eq!(block.previous_hash, [0xAB; 32]);
        assert_eq!(block.created_at, 9_000);
        assert_eq!(block.nonce, 0);
        assert!(block.hash.is_none());
        assert_eq!(block.merkle_root, block.payload_root());
    }

    #[test]
    fn test_assemble_rejects_oversized_batch() {
        let assembler = BlockAssembler::new(ForgeConfig::for_testing());
        let result = assembler.assemble(1, [0xAB; 32], create_batch(11), BTreeMap::new(), 0);
        assert!(matches!(
            result,
            Err(ForgeError::BatchTooLarge { offered: 11, capacity: 10 })
        ));
    }

    #[test]
    fn test_assemble_rejects_orphan_non_genesis() {
        let assembler = BlockAssembler::new(ForgeConfig::for_testing());
        let result = assembler.assemble(3, GENESIS_HASH, create_batch(1), BTreeMap::new(), 0);
        assert!(matches!(result, Err(ForgeError::MissingPredecessor { index: 3 })));
    }

    #[test]
    fn test_assemble_allows_genesis() {
        let assembler = BlockAssembler::new(ForgeConfig::for_testing());
        let block = assembler
            .assemble(0, GENESIS_HASH, vec![], BTreeMap::new(), 0)
            .unwrap();
        assert!(block.is_genesis());
    }
}
