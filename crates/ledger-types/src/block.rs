//! Candidate block entity and the proof-of-work validation it anchors.
//!
//! The canonical header encoding lives here so that the miner and the
//! finality checker hash the exact same bytes. The finality checker never
//! trusts a recorded hash: [`validate_pow`] re-derives everything from the
//! block contents, including the payload commitment.

use crate::hashing::{meets_difficulty, merkle_root, sha256d};
use crate::transaction::Transaction;
use crate::{Hash, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Previous-block reference of the genesis block.
pub const GENESIS_HASH: Hash = [0u8; 32];

/// Errors raised when reading a candidate block as a finalized artifact.
#[derive(Debug, Error)]
pub enum BlockError {
    /// The block was never mined (Layer 1 incomplete).
    #[error("candidate block {index} has no proof-of-work hash")]
    MissingPowHash {
        /// Sequence index of the offending block.
        index: u64,
    },
}

/// A block candidate moving through the two-layer finalization protocol.
///
/// Created by the assembler, mutated only by the miner (nonce search) and
/// becomes immutable the moment a finalized outcome is produced for it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateBlock {
    /// Strictly increasing, gapless sequence index.
    pub index: u64,
    /// Hash of the predecessor ([`GENESIS_HASH`] for the first block).
    pub previous_hash: Hash,
    /// Ordered transaction batch.
    pub transactions: Vec<Transaction>,
    /// Arbitrary string metadata, hashed in sorted key order.
    pub metadata: BTreeMap<String, String>,
    /// Creation timestamp (ms).
    pub created_at: Timestamp,
    /// Nonce found by the miner (search variable until Layer 1 succeeds).
    pub nonce: u64,
    /// Declared difficulty: required leading zero hex digits of the hash.
    pub difficulty: u32,
    /// Merkle root of the payload, cached at assembly time.
    pub merkle_root: Hash,
    /// Proof-of-work hash, set only once Layer 1 succeeds.
    pub hash: Option<Hash>,
}

impl CandidateBlock {
    /// Creates an unmined candidate with the payload commitment computed.
    pub fn new(
        index: u64,
        previous_hash: Hash,
        transactions: Vec<Transaction>,
        metadata: BTreeMap<String, String>,
        difficulty: u32,
        created_at: Timestamp,
    ) -> Self {
        let mut block = Self {
            index,
            previous_hash,
            transactions,
            metadata,
            created_at,
            nonce: 0,
            difficulty,
            merkle_root: [0u8; 32],
            hash: None,
        };
        block.merkle_root = block.payload_root();
        block
    }

    /// Recomputes the merkle root over the current payload.
    ///
    /// Always derived from the transactions themselves, never read from the
    /// cached field, so post-assembly mutation is detectable.
    pub fn payload_root(&self) -> Hash {
        let leaves: Vec<Hash> = self.transactions.iter().map(|tx| tx.leaf_hash()).collect();
        merkle_root(&leaves)
    }

    /// Canonical header bytes without the nonce.
    ///
    /// Commits to the sequence index, the chain linkage, the recomputed
    /// payload root, the creation time, the declared difficulty and the
    /// metadata in sorted key order.
    pub fn header_prefix(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(128);
        bytes.extend_from_slice(&self.index.to_le_bytes());
        bytes.extend_from_slice(&self.previous_hash);
        bytes.extend_from_slice(&self.payload_root());
        bytes.extend_from_slice(&self.created_at.to_le_bytes());
        bytes.extend_from_slice(&self.difficulty.to_le_bytes());
        for (key, value) in &self.metadata {
            bytes.extend_from_slice(&(key.len() as u64).to_le_bytes());
            bytes.extend_from_slice(key.as_bytes());
            bytes.extend_from_slice(&(value.len() as u64).to_le_bytes());
            bytes.extend_from_slice(value.as_bytes());
        }
        bytes
    }

    /// Proof-of-work hash for a given nonce: `sha256d(header_prefix ‖ nonce)`.
    pub fn pow_hash(&self, nonce: u64) -> Hash {
        let mut bytes = self.header_prefix();
        bytes.extend_from_slice(&nonce.to_le_bytes());
        sha256d(&bytes)
    }

    /// Returns true if this candidate claims the genesis position.
    pub fn is_genesis(&self) -> bool {
        self.index == 0 && self.previous_hash == GENESIS_HASH
    }
}

/// Re-validate a mined block's Layer 1 proof from first principles.
///
/// Recomputes the hash from the recorded nonce over the recomputed header
/// bytes and checks both that it matches the recorded hash and that it meets
/// the declared difficulty. Any mutation of payload, metadata, linkage or
/// difficulty after mining fails this check.
pub fn validate_pow(block: &CandidateBlock) -> bool {
    let Some(recorded) = block.hash else {
        return false;
    };
    let recomputed = block.pow_hash(block.nonce);
    recomputed == recorded && meets_difficulty(&recomputed, block.difficulty)
}

/// The durable record appended to the ledger sink on finalization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizedRecord {
    /// Sequence index.
    pub index: u64,
    /// Proof-of-work hash.
    pub hash: Hash,
    /// Predecessor hash.
    pub previous_hash: Hash,
    /// Merkle root of the included payload.
    pub merkle_root: Hash,
    /// Winning nonce.
    pub nonce: u64,
    /// Difficulty the hash was validated against.
    pub difficulty: u32,
    /// Number of included transactions.
    pub transaction_count: usize,
}

impl FinalizedRecord {
    /// Projects a mined candidate into its durable form.
    ///
    /// # Errors
    /// Returns [`BlockError::MissingPowHash`] if Layer 1 never completed.
    pub fn from_block(block: &CandidateBlock) -> Result<Self, BlockError> {
        let hash = block
            .hash
            .ok_or(BlockError::MissingPowHash { index: block.index })?;
        Ok(Self {
            index: block.index,
            hash,
            previous_hash: block.previous_hash,
            merkle_root: block.merkle_root,
            nonce: block.nonce,
            difficulty: block.difficulty,
            transaction_count: block.transactions.len(),
        })
    }
}
