//! Signature verification error types.

use thiserror::Error;

/// Reasons a single signature fails verification.
///
/// Each failure is local to its signature: rejecting one vote never affects
/// the verdict on any other.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SignatureError {
    /// The public key bytes do not decode to a curve point.
    #[error("malformed Ed25519 public key")]
    MalformedPublicKey,

    /// The signature does not verify against the message and key.
    #[error("signature verification failed")]
    VerificationFailed,
}
