//! Public key handling for v2 onion services.
//!
//! The descriptor codec never touches RSA directly.  It encodes and decodes
//! keys through the [`KeyMaterial`] trait, and asks that trait for the
//! [`PermanentId`] of a key.  [`rsa::PublicKey`] is the implementation used
//! in practice.

pub mod rsa;

use digest::Digest;
use thiserror::Error;

use crate::d::Sha1;
use crate::PermanentId;

/// Error returned when a key can't be encoded as DER.
#[derive(Error, Clone, Debug)]
#[non_exhaustive]
pub enum KeyEncodeError {
    /// The underlying PKCS#1 encoder failed.
    #[error("Unable to encode key as PKCS#1 DER")]
    Der(#[source] ::rsa::pkcs1::Error),
}

/// A public key that can be carried in a v2 descriptor.
///
/// Keys appear in descriptors as the DER encoding of a PKCS#1
/// `RSAPublicKey`, wrapped in a PEM-style object.
pub trait KeyMaterial: Sized {
    /// Decode an alleged DER byte string into a key.
    ///
    /// Return None if the DER string does not hold a valid key.
    fn from_der(der: &[u8]) -> Option<Self>;

    /// Encode this key as DER.
    fn to_der(&self) -> Result<Vec<u8>, KeyEncodeError>;

    /// Compute the permanent identity of this key: the SHA-1 digest of its
    /// DER encoding.
    fn permanent_id(&self) -> Result<PermanentId, KeyEncodeError> {
        let id: [u8; crate::id::ID_LEN] = Sha1::digest(self.to_der()?).into();
        Ok(id.into())
    }
}
