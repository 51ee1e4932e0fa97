//! Introduction points, as listed in a v2 descriptor.
//!
//! A v2 descriptor carries its introduction points as a nested document
//! (inside the `introduction-points` object).  That document is a run of
//! records, each of which begins with an `introduction-point` item:
//!
//! ```text
//! introduction-point <base32 identity>
//! ip-address <address>
//! onion-port <port>
//! onion-key
//! -----BEGIN RSA PUBLIC KEY-----
//! ...
//! -----END RSA PUBLIC KEY-----
//! service-key
//! -----BEGIN RSA PUBLIC KEY-----
//! ...
//! -----END RSA PUBLIC KEY-----
//! ```
//!
//! We don't handle encrypted introduction-point lists, or the
//! `intro-authentication` item.

use std::net::IpAddr;

use tor_rendv2_crypto::pk::{rsa::PublicKey, KeyMaterial};
use tor_rendv2_crypto::IntroPointId;
use tracing::trace;

use crate::doc::{parse_records, ParseOutcome};
use crate::encode::NetdocEncoder;
use crate::parse::record::Record;
use crate::types::misc::KeyObject;
use crate::{EncodeResult, Result};

/// The tag for a PEM-encoded PKCS#1 public key object.
pub(crate) const RSA_KEY_TAG: &str = "RSA PUBLIC KEY";

decl_keyword! {
    /// Keywords that can appear in an introduction-point record.
    pub(crate) IntroPointKwd {
        "introduction-point" => INTRODUCTION_POINT,
        "ip-address" => IP_ADDRESS,
        "onion-port" => ONION_PORT,
        "onion-key" => ONION_KEY,
        "service-key" => SERVICE_KEY,
    }
}

/// A single introduction point for a v2 onion service.
///
/// Every field is required: a record that lacks one of them, or has one
/// that we can't decode, is skipped when parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntroPointDesc<K = PublicKey> {
    /// The identity fingerprint of the relay.
    identity: IntroPointId,
    /// The address at which to reach the relay.
    address: IpAddr,
    /// The OR port at which to reach the relay.
    port: u16,
    /// The relay's onion key, used to extend circuits to it.
    onion_key: K,
    /// The key that the service uses for this introduction point.
    service_key: K,
}

impl<K> IntroPointDesc<K> {
    /// Construct a new introduction point.
    pub fn new(
        identity: IntroPointId,
        address: IpAddr,
        port: u16,
        onion_key: K,
        service_key: K,
    ) -> Self {
        IntroPointDesc {
            identity,
            address,
            port,
            onion_key,
            service_key,
        }
    }
    /// Return the identity of the relay.
    pub fn identity(&self) -> &IntroPointId {
        &self.identity
    }
    /// Return the address of the relay.
    pub fn address(&self) -> IpAddr {
        self.address
    }
    /// Return the OR port of the relay.
    pub fn port(&self) -> u16 {
        self.port
    }
    /// Return the relay's onion key.
    pub fn onion_key(&self) -> &K {
        &self.onion_key
    }
    /// Return the service key for this introduction point.
    pub fn service_key(&self) -> &K {
        &self.service_key
    }
}

impl<K: KeyMaterial> IntroPointDesc<K> {
    /// Parse every introduction point in `s`.
    ///
    /// Records that can't be decoded are skipped; the returned
    /// [`ParseOutcome`] says why.
    pub fn parse_all(s: &str) -> ParseOutcome<'_, Self> {
        parse_records(s, IntroPointKwd::INTRODUCTION_POINT, "introduction point", |rec, _| {
            Self::from_record(rec)
        })
    }

    /// Decode one record, which must start with `introduction-point`.
    fn from_record(rec: &Record<'_, IntroPointKwd>) -> Result<Self> {
        use IntroPointKwd::*;

        let identity = rec.required(INTRODUCTION_POINT)?.parse_arg(0)?;
        let address = rec.required(IP_ADDRESS)?.parse_arg(0)?;
        let port = rec.required(ONION_PORT)?.parse_arg(0)?;
        let KeyObject(onion_key) = rec.required(ONION_KEY)?.parse_obj(RSA_KEY_TAG)?;
        let KeyObject(service_key) = rec.required(SERVICE_KEY)?.parse_obj(RSA_KEY_TAG)?;

        Ok(IntroPointDesc {
            identity,
            address,
            port,
            onion_key,
            service_key,
        })
    }

    /// Encode this introduction point as a record.
    pub fn encode(&self) -> EncodeResult<String> {
        let mut enc = NetdocEncoder::new();
        self.encode_onto(&mut enc)?;
        enc.finish()
    }

    /// Encode every introduction point in `ips`, one after another.
    pub fn encode_all(ips: &[Self]) -> EncodeResult<String> {
        let mut enc = NetdocEncoder::new();
        for ip in ips {
            ip.encode_onto(&mut enc)?;
        }
        enc.finish()
    }

    /// Append this introduction point to `enc`.
    fn encode_onto(&self, enc: &mut NetdocEncoder) -> EncodeResult<()> {
        use IntroPointKwd::*;

        trace!("Encoding introduction point {}", self.identity);
        let onion_key = self.onion_key.to_der()?;
        let service_key = self.service_key.to_der()?;

        enc.item(INTRODUCTION_POINT).arg(&self.identity);
        enc.item(IP_ADDRESS).arg(&self.address);
        enc.item(ONION_PORT).arg(&self.port);
        enc.item(ONION_KEY).object(RSA_KEY_TAG, &onion_key);
        enc.item(SERVICE_KEY).object(RSA_KEY_TAG, &service_key);
        Ok(())
    }
}
