//! # Ed25519 Verification
//!
//! Pure domain logic for quorum vote verification: no state, no I/O, no
//! caching. Verification uses `verify_strict` to reject the malleable and
//! small-order edge cases that plain verification tolerates.

use crate::errors::SignatureError;
use ed25519_dalek::{Signature, VerifyingKey};
use ledger_types::{Hash, Timestamp};
use rayon::prelude::*;

/// Raw Ed25519 public key bytes.
pub type PublicKeyBytes = [u8; 32];

/// Raw Ed25519 signature bytes.
pub type SignatureBytes = [u8; 64];

/// Domain separation tag for block quorum votes.
const QUORUM_VOTE_TAG: &[u8] = b"AEGIS-QUORUM-V1";

/// Canonical message a validator signs to vote for a block.
///
/// A composite of the block hash, sequence index and creation timestamp,
/// not the raw payload, so signing cost is independent of payload size.
pub fn signing_message(block_hash: &Hash, index: u64, created_at: Timestamp) -> Vec<u8> {
    let mut message = Vec::with_capacity(QUORUM_VOTE_TAG.len() + 48);
    message.extend_from_slice(QUORUM_VOTE_TAG);
    message.extend_from_slice(block_hash);
    message.extend_from_slice(&index.to_le_bytes());
    message.extend_from_slice(&created_at.to_le_bytes());
    message
}

/// Verify a single detached signature.
///
/// # Errors
/// - `MalformedPublicKey` if the key bytes do not decode
/// - `VerificationFailed` if the signature does not match
pub fn verify_signature(
    message: &[u8],
    public_key: &PublicKeyBytes,
    signature: &SignatureBytes,
) -> Result<(), SignatureError> {
    let key =
        VerifyingKey::from_bytes(public_key).map_err(|_| SignatureError::MalformedPublicKey)?;
    let signature = Signature::from_bytes(signature);
    key.verify_strict(message, &signature)
        .map_err(|_| SignatureError::VerificationFailed)
}

/// Stateless verifier handle.
///
/// Exists so callers can depend on a verification seam rather than free
/// functions; construction is free.
#[derive(Clone, Copy, Debug, Default)]
pub struct SignatureVerifier;

impl SignatureVerifier {
    /// Creates a new verifier.
    pub fn new() -> Self {
        Self
    }

    /// Verify a single detached signature.
    pub fn verify(
        &self,
        message: &[u8],
        public_key: &PublicKeyBytes,
        signature: &SignatureBytes,
    ) -> Result<(), SignatureError> {
        verify_signature(message, public_key, signature)
    }

    /// Returns true if the signature verifies.
    pub fn is_valid(
        &self,
        message: &[u8],
        public_key: &PublicKeyBytes,
        signature: &SignatureBytes,
    ) -> bool {
        self.verify(message, public_key, signature).is_ok()
    }

    /// Verify a batch of independent requests in parallel.
    pub fn batch_verify(&self, requests: &[VerificationRequest]) -> BatchVerificationResult {
        let results: Vec<Result<(), SignatureError>> = requests
            .par_iter()
            .map(|req| verify_signature(&req.message, &req.public_key, &req.signature))
            .collect();
        BatchVerificationResult::from_results(results)
    }
}

/// One signature to verify in a batch.
#[derive(Clone, Debug)]
pub struct VerificationRequest {
    /// Message bytes that were signed.
    pub message: Vec<u8>,
    /// Signer's public key.
    pub public_key: PublicKeyBytes,
    /// Detached signature.
    pub signature: SignatureBytes,
}

/// Result of batch verification.
#[derive(Clone, Debug)]
pub struct BatchVerificationResult {
    /// Per-request outcomes, in request order.
    pub results: Vec<Result<(), SignatureError>>,
    /// Whether every request verified.
    pub all_valid: bool,
    /// Count of valid signatures.
    pub valid_count: usize,
    /// Count of invalid signatures.
    pub invalid_count: usize,
}

impl BatchVerificationResult {
    fn from_results(results: Vec<Result<(), SignatureError>>) -> Self {
        let valid_count = results.iter().filter(|r| r.is_ok()).count();
        let invalid_count = results.len() - valid_count;
        Self {
            all_valid: invalid_count == 0,
            valid_count,
            invalid_count,
            results,
        }
    }
}
