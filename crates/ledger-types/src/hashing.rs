//! Hashing utilities shared across the finality engine.
//!
//! Provides the single hashing vocabulary used by mining, validation and
//! payload commitment so every subsystem recomputes identical digests.

use crate::Hash;
use sha2::{Digest, Sha256};

/// Compute SHA-256 hash of data.
#[inline]
pub fn sha256(data: &[u8]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Compute double SHA-256 hash (Bitcoin-style).
///
/// Used for the proof-of-work hash to prevent length extension attacks.
#[inline]
pub fn sha256d(data: &[u8]) -> Hash {
    let first_hash = sha256(data);
    sha256(&first_hash)
}

/// Count the leading zero hex digits of a hash.
///
/// Each byte contributes two hex digits; a byte below 0x10 contributes one
/// leading zero digit before terminating the count.
#[inline]
pub fn leading_zero_hex_digits(hash: &Hash) -> u32 {
    let mut count = 0u32;
    for byte in hash {
        if *byte == 0 {
            count += 2;
        } else if *byte < 0x10 {
            count += 1;
            break;
        } else {
            break;
        }
    }
    count
}

/// Check whether a hash meets a difficulty target.
///
/// Difficulty is the number of leading zero hex digits required.
#[inline]
pub fn meets_difficulty(hash: &Hash, difficulty: u32) -> bool {
    leading_zero_hex_digits(hash) >= difficulty
}

/// Compute the merkle root of a list of leaf hashes.
///
/// An odd level duplicates its last node; an empty list commits to the
/// all-zero hash.
pub fn merkle_root(leaves: &[Hash]) -> Hash {
    if leaves.is_empty() {
        return [0u8; 32];
    }

    let mut level: Vec<Hash> = leaves.to_vec();
    while level.len() > 1 {
        if level.len() % 2 != 0 {
            let last = *level.last().expect("level is non-empty");
            level.push(last);
        }

        level = level
            .chunks(2)
            .map(|pair| {
                let mut combined = [0u8; 64];
                combined[..32].copy_from_slice(&pair[0]);
                combined[32..].copy_from_slice(&pair[1]);
                sha256(&combined)
            })
            .collect();
    }

    level[0]
}
