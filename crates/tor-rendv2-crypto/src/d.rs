//! Digests used to implement v2 onion services.
//!
//! rend-spec-v2 uses SHA-1 everywhere: for identities, for identifier
//! derivation, and for the digest that a descriptor's signature covers.  We
//! also offer SHA-256 for the signed digest, for callers that need it.
//!
//! Other code should access these digests via the traits in the
//! [`digest`] crate.

use digest::Digest;
use serde::{Deserialize, Serialize};

pub use sha1::Sha1;
pub use sha2::Sha256;

/// Length of a SHA-1 output, in bytes.
pub const SHA1_LEN: usize = 20;

/// Length of a SHA-256 output, in bytes.
pub const SHA256_LEN: usize = 32;

/// An algorithm for computing the digest that a descriptor signature covers.
#[derive(
    Clone, Copy, Debug, Default, Eq, PartialEq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum DigestAlgorithm {
    /// SHA-1, as rend-spec-v2 requires.
    #[default]
    #[display("sha1")]
    Sha1,
    /// SHA-256.
    #[display("sha256")]
    Sha256,
}

impl DigestAlgorithm {
    /// Return the length of this algorithm's output, in bytes.
    pub fn output_len(self) -> usize {
        match self {
            DigestAlgorithm::Sha1 => SHA1_LEN,
            DigestAlgorithm::Sha256 => SHA256_LEN,
        }
    }

    /// Compute the digest of `input` with this algorithm.
    pub fn digest(self, input: &[u8]) -> Vec<u8> {
        match self {
            DigestAlgorithm::Sha1 => Sha1::digest(input).to_vec(),
            DigestAlgorithm::Sha256 => Sha256::digest(input).to_vec(),
        }
    }
}
