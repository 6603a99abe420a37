//! # ledger-sigverify
//!
//! Ed25519 verification for Layer 2 quorum votes.
//!
//! A deliberately small crate: one pure verification function, the
//! canonical [`signing_message`] encoding validators vote over, and a
//! rayon-parallel batch path. Verification is stateless and side-effect
//! free, so it can run concurrently from any number of submission tasks;
//! callers own any caching of verdicts.

pub mod errors;
pub mod verify;

pub use errors::SignatureError;
pub use verify::{
    signing_message, verify_signature, BatchVerificationResult, PublicKeyBytes, SignatureBytes,
    SignatureVerifier, VerificationRequest,
};
