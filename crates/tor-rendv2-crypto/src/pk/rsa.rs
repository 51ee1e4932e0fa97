//! RSA public keys, as used for v2 onion service keys.
//!
//! Every key in a v2 descriptor is a 1024-bit RSA key: the service's
//! permanent key, and each introduction point's onion key and service key.
//!
//! # Limitations
//!
//! We never generate or hold private keys here.  Signing a descriptor is
//! up to the caller.

use rsa::pkcs1::{DecodeRsaPublicKey, EncodeRsaPublicKey};
use rsa::traits::PublicKeyParts;

use super::{KeyEncodeError, KeyMaterial};
use crate::{OnionAddressV2, PermanentId};

/// An RSA public key.
///
/// This implementation is a simple wrapper so that we can define new
/// methods and traits on the type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey(rsa::RsaPublicKey);

impl PublicKey {
    /// Return true iff the exponent for this key is the same
    /// number as 'e'.
    pub fn exponent_is(&self, e: u32) -> bool {
        *self.0.e() == rsa::BigUint::new(vec![e])
    }

    /// Return the number of bits in the modulus for this key.
    pub fn bits(&self) -> usize {
        self.0.n().bits()
    }

    /// Try to check a signature (as used in Tor.)  The signed hash
    /// should be in 'hashed', and the alleged signature in 'sig'.
    ///
    /// Tor uses RSA-PKCSv1 signatures, with hash algorithm OIDs
    /// omitted.
    pub fn verify(&self, hashed: &[u8], sig: &[u8]) -> Result<(), rsa::Error> {
        let padding = rsa::pkcs1v15::Pkcs1v15Sign::new_unprefixed();
        self.0.verify(padding, hashed, sig)
    }

    /// Return the `.onion` name of the service whose permanent key this is.
    pub fn onion_address(&self) -> Result<OnionAddressV2, KeyEncodeError> {
        let id: PermanentId = self.permanent_id()?;
        Ok(OnionAddressV2::from(&id))
    }
}

impl From<rsa::RsaPublicKey> for PublicKey {
    fn from(key: rsa::RsaPublicKey) -> Self {
        PublicKey(key)
    }
}

impl AsRef<rsa::RsaPublicKey> for PublicKey {
    fn as_ref(&self) -> &rsa::RsaPublicKey {
        &self.0
    }
}

impl KeyMaterial for PublicKey {
    /// (This function expects an RsaPublicKey, as used by Tor.  It
    /// does not expect or accept a PublicKeyInfo.)
    fn from_der(der: &[u8]) -> Option<Self> {
        Some(PublicKey(rsa::RsaPublicKey::from_pkcs1_der(der).ok()?))
    }

    /// The result is an RsaPublicKey, not a PublicKeyInfo.
    fn to_der(&self) -> Result<Vec<u8>, KeyEncodeError> {
        let doc = self.0.to_pkcs1_der().map_err(KeyEncodeError::Der)?;
        Ok(doc.as_bytes().to_vec())
    }
}

#[cfg(test)]
mod test {
    // @@ begin test lint list maintained by maint/add_warning @@
    #![allow(clippy::bool_assert_comparison)]
    #![allow(clippy::clone_on_copy)]
    #![allow(clippy::dbg_macro)]
    #![allow(clippy::mixed_attributes_style)]
    #![allow(clippy::print_stderr)]
    #![allow(clippy::print_stdout)]
    #![allow(clippy::single_char_pattern)]
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::unchecked_duration_subtraction)]
    #![allow(clippy::useless_vec)]
    #![allow(clippy::needless_pass_by_value)]
    //! <!-- @@ end test lint list maintained by maint/add_warning @@ -->

    use super::*;
    use hex_literal::hex;

    const PERMANENT_KEY: &str = include_str!("../../testdata/permanent-key.pem");

    fn permanent_key() -> PublicKey {
        rsa::RsaPublicKey::from_pkcs1_pem(PERMANENT_KEY).unwrap().into()
    }

    #[test]
    fn der_roundtrip() {
        let key = permanent_key();
        assert_eq!(key.bits(), 1024);
        assert!(key.exponent_is(65537));
        assert!(!key.exponent_is(3));

        let der = key.to_der().unwrap();
        let key2 = PublicKey::from_der(&der).unwrap();
        assert_eq!(key, key2);
        assert_eq!(key2.to_der().unwrap(), der);
    }

    #[test]
    fn bad_der() {
        assert!(PublicKey::from_der(b"").is_none());
        assert!(PublicKey::from_der(b"certainly not a key").is_none());
    }

    #[test]
    fn identity() {
        let key = permanent_key();
        assert_eq!(
            key.permanent_id().unwrap(),
            PermanentId::from(hex!("71916e9d305aceb921839cfda14690eb4730d73b"))
        );
        assert_eq!(
            key.onion_address().unwrap().to_string(),
            "ogiw5hjqllhlsimd.onion"
        );
    }
}
