//! Proof-of-work nonce search with a bounded-search liveness guard.

use crate::config::ForgeConfig;
use ledger_types::{meets_difficulty, sha256d, CandidateBlock, Hash};

/// Result of a completed nonce search.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MiningOutcome {
    /// Winning nonce.
    pub nonce: u64,
    /// Hash produced by the winning nonce.
    pub hash: Hash,
    /// Difficulty actually achieved (≤ the requested target when the guard
    /// relaxed a stuck search).
    pub difficulty: u32,
    /// Total hash attempts across all difficulty levels.
    pub attempts: u64,
}

/// CPU-bound nonce search over a candidate block.
///
/// The search is synchronous and owns all of its state: it performs no I/O
/// and shares nothing, so independent candidates may be mined from separate
/// threads without coordination.
///
/// ## Stuck-search guard
///
/// If no satisfying nonce appears within `attempt_budget` tries, the target
/// difficulty is decremented (floor 1) and the nonce counter resets. This
/// trades difficulty-as-guarantee for liveness: the declared difficulty on
/// the mined block is whatever level the hash actually met, and the
/// finality checker re-validates it independently. At the floor the search
/// keeps advancing the nonce instead of resetting, so it cannot rescan the
/// same exhausted range.
pub struct ProofOfWorkMiner {
    config: ForgeConfig,
}

impl ProofOfWorkMiner {
    /// Creates a miner with the given configuration.
    pub fn new(config: ForgeConfig) -> Self {
        Self { config }
    }

    /// Searches for a nonce satisfying the block's declared difficulty.
    ///
    /// On return the block carries the winning nonce, its hash and the
    /// difficulty that was actually met. The search always terminates.
    #[tracing::instrument(skip(self, block), fields(index = block.index, target = block.difficulty))]
    pub fn mine(&self, block: &mut CandidateBlock) -> MiningOutcome {
        let budget = self.config.attempt_budget.max(1);
        let mut difficulty = block.difficulty.max(1);
        let mut total_attempts = 0u64;

        loop {
            block.difficulty = difficulty;
            // The declared difficulty is part of the header, so the prefix
            // is rebuilt once per level and reused across the hot loop.
            let prefix = block.header_prefix();
            let mut bytes = prefix.clone();

            let mut nonce = 0u64;
            let mut level_attempts = 0u64;
            while level_attempts < budget || difficulty == 1 {
                bytes.truncate(prefix.len());
                bytes.extend_from_slice(&nonce.to_le_bytes());
                let hash = sha256d(&bytes);
                total_attempts += 1;
                level_attempts += 1;

                if meets_difficulty(&hash, difficulty) {
                    block.nonce = nonce;
                    block.hash = Some(hash);
                    tracing::info!(
                        nonce,
                        difficulty,
                        attempts = total_attempts,
                        "proof-of-work found"
                    );
                    return MiningOutcome {
                        nonce,
                        hash,
                        difficulty,
                        attempts: total_attempts,
                    };
                }
                nonce = nonce.wrapping_add(1);
            }

            difficulty -= 1;
            tracing::warn!(
                relaxed_to = difficulty,
                attempts = total_attempts,
                "nonce search exhausted budget, relaxing difficulty"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledger_types::{leading_zero_hex_digits, validate_pow, Transaction};
    use std::collections::BTreeMap;

    fn create_candidate(difficulty: u32) -> CandidateBlock {
        let txs = vec![Transaction::new(b"session-revoke".to_vec(), 25, 14, None, 1_000)];
        CandidateBlock::new(1, [0xAB; 32], txs, BTreeMap::new(), difficulty, 2_000)
    }

    #[test]
    fn test_mine_meets_declared_difficulty() {
        let miner = ProofOfWorkMiner::new(ForgeConfig::default());
        let mut block = create_candidate(2);
        let outcome = miner.mine(&mut block);

        assert_eq!(outcome.difficulty, 2);
        assert!(leading_zero_hex_digits(&outcome.hash) >= 2);
        assert_eq!(block.hash, Some(outcome.hash));
        assert_eq!(block.nonce, outcome.nonce);
    }

    #[test]
    fn test_mined_block_revalidates() {
        let miner = ProofOfWorkMiner::new(ForgeConfig::default());
        let mut block = create_candidate(2);
        miner.mine(&mut block);

        assert!(validate_pow(&block));
        assert!(validate_pow(&block)); // deterministic
    }

    #[test]
    fn test_stuck_guard_relaxes_and_terminates() {
        // An unreachable target with a tiny budget must still terminate.
        let config = ForgeConfig {
            attempt_budget: 32,
            ..ForgeConfig::for_testing()
        };
        let miner = ProofOfWorkMiner::new(config);
        let mut block = create_candidate(60);
        let outcome = miner.mine(&mut block);

        assert!(outcome.difficulty < 60);
        assert!(outcome.difficulty >= 1);
        // The recorded difficulty matches the achieved level and the block
        // still re-validates against it.
        assert_eq!(block.difficulty, outcome.difficulty);
        assert!(validate_pow(&block));
    }

    #[test]
    fn test_independent_candidates_mine_in_parallel() {
        let handles: Vec<_> = (0..4u64)
            .map(|i| {
                std::thread::spawn(move || {
                    let miner = ProofOfWorkMiner::new(ForgeConfig::for_testing());
                    let txs =
                        vec![Transaction::new(i.to_le_bytes().to_vec(), 10, 8, None, 1_000)];
                    let mut block =
                        CandidateBlock::new(i, [0xCD; 32], txs, BTreeMap::new(), 1, 2_000);
                    miner.mine(&mut block);
                    assert!(validate_pow(&block));
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
    }
}
