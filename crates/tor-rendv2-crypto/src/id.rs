//! Identifiers used by version 2 onion services.
//!
//! All of these are 20-byte values, written in descriptors as lowercase
//! base32 without padding (32 characters).  The one exception is the
//! [`OnionAddressV2`], which is the first half of a [`PermanentId`].

use std::fmt::{self, Display};
use std::str::FromStr;

use thiserror::Error;

use crate::macros::define_id_bytes;

/// Length of every 20-byte identifier in this module.
pub const ID_LEN: usize = 20;

/// Length of the part of a [`PermanentId`] that makes up an onion address.
pub const ONION_ADDRESS_ID_LEN: usize = 10;

/// The fixed string `.onion`
pub const ONION_SUFFIX: &str = ".onion";

define_id_bytes! {
/// The permanent identity of a v2 onion service.
///
/// This is the SHA-1 digest of the DER encoding of the service's permanent
/// key.  It never changes; every rotating identifier is derived from it.
pub struct PermanentId;
}

define_id_bytes! {
/// The rotating "secret-id-part" of a v2 descriptor.
///
/// Derived from the current time period and a replica number.  (Despite the
/// name, it is not secret unless the service uses a descriptor cookie,
/// which we don't support.)
pub struct SecretIdPart;
}

define_id_bytes! {
/// The identifier under which a v2 descriptor is stored and looked up.
///
/// Derived from a [`PermanentId`] and a [`SecretIdPart`].
pub struct DescriptorId;
}

define_id_bytes! {
/// The identity of a relay acting as an introduction point.
///
/// This is the relay's RSA identity fingerprint.
pub struct IntroPointId;
}

/// Encode `bytes` as lowercase unpadded base32.
pub fn b32_encode(bytes: &[u8]) -> String {
    let mut b32 = data_encoding::BASE32_NOPAD.encode(bytes);
    b32.make_ascii_lowercase();
    b32
}

/// Decode unpadded base32 in either case.
pub fn b32_decode(s: &str) -> Result<Vec<u8>, data_encoding::DecodeError> {
    // RFC4648 (and data_encoding) only accept uppercase.
    let mut s = s.to_owned();
    s.make_ascii_uppercase();
    data_encoding::BASE32_NOPAD.decode(s.as_bytes())
}

/// Error that can occur parsing an identifier from base32.
#[derive(Error, Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum IdParseError {
    /// Base32 decoding failed
    #[error("Invalid base32 in identifier")]
    InvalidBase32(#[from] data_encoding::DecodeError),

    /// Decoded to the wrong number of bytes
    #[error("Identifier has wrong length ({0} bytes)")]
    WrongLength(usize),

    /// Supplied name does not end in `.onion`
    #[error("Domain name does not end in .onion")]
    NotOnionDomain,
}

/// The `.onion` name of a v2 onion service, such as
/// `expyuzz4wqqyqhjn.onion`.
///
/// This is the base32 encoding of the first 10 bytes of the service's
/// [`PermanentId`].  Its `Display` and `FromStr` representations include
/// the `.onion` suffix.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, derive_more::Debug)]
#[debug("OnionAddressV2({self})")]
pub struct OnionAddressV2([u8; ONION_ADDRESS_ID_LEN]);

impl OnionAddressV2 {
    /// Expose the address as a slice of bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0[..]
    }

    /// Return true if `id` is the permanent id of the service named by this
    /// address.
    pub fn matches(&self, id: &PermanentId) -> bool {
        id.as_bytes().starts_with(&self.0)
    }
}

impl From<&PermanentId> for OnionAddressV2 {
    fn from(id: &PermanentId) -> Self {
        let mut bytes = [0_u8; ONION_ADDRESS_ID_LEN];
        bytes.copy_from_slice(&id.as_bytes()[..ONION_ADDRESS_ID_LEN]);
        OnionAddressV2(bytes)
    }
}

impl Display for OnionAddressV2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", b32_encode(&self.0), ONION_SUFFIX)
    }
}

impl FromStr for OnionAddressV2 {
    type Err = IdParseError;
    fn from_str(s: &str) -> Result<Self, IdParseError> {
        let lower = s.to_ascii_lowercase();
        let s = lower
            .strip_suffix(ONION_SUFFIX)
            .ok_or(IdParseError::NotOnionDomain)?;
        let bytes = b32_decode(s)?;
        let bytes: [u8; ONION_ADDRESS_ID_LEN] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| IdParseError::WrongLength(bytes.len()))?;
        Ok(OnionAddressV2(bytes))
    }
}
