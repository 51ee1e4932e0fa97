//! Version 2 onion service descriptors.
//!
//! A v2 descriptor advertises an onion service's permanent key and its
//! introduction points, under a [`DescriptorId`] that rotates once a day.
//! Its layout is given in rend-spec-v2 section 1.3:
//!
//! ```text
//! rendezvous-service-descriptor <descriptor-id>
//! version 2
//! permanent-key
//! <PEM RSA PUBLIC KEY>
//! secret-id-part <secret-id-part>
//! publication-time YYYY-MM-DD HH:MM:SS
//! protocol-versions 2,3
//! introduction-points
//! <PEM MESSAGE>
//! signature
//! <PEM SIGNATURE>
//! ```
//!
//! Everything up to and including the `signature` line is the _body_; the
//! signature covers a digest of the body.  We can construct, encode and sign
//! descriptors, and parse them; we don't check signatures.

use std::collections::BTreeSet;
use std::time::SystemTime;

use tor_rendv2_crypto::pk::{rsa::PublicKey, KeyMaterial};
use tor_rendv2_crypto::{ops, DescriptorId, SecretIdPart};
use tracing::{debug, trace};

use crate::config::DescriptorConfig;
use crate::doc::intropt::{IntroPointDesc, RSA_KEY_TAG};
use crate::doc::{parse_records, ParseOutcome};
use crate::encode::{pem_block, NetdocEncoder};
use crate::parse::record::Record;
use crate::types::misc::{floor_to_hour, Iso8601TimeSp, KeyObject, ProtocolVersions};
use crate::{EncodeError, EncodeResult, Error, NetdocErrorKind as EK, Result};

/// The tag for the object that holds the introduction points.
const MESSAGE_TAG: &str = "MESSAGE";

/// The tag for the object that holds the signature.
const SIGNATURE_TAG: &str = "SIGNATURE";

/// The only descriptor version that we construct.
const DESC_VERSION: u32 = 2;

/// The introduction protocol versions that we advertise.
const ADVERTISED_PROTOCOLS: [u32; 2] = [2, 3];

decl_keyword! {
    /// Keywords that can appear in a v2 descriptor.
    pub(crate) RendDescKwd {
        "rendezvous-service-descriptor" => RENDEZVOUS_SERVICE_DESCRIPTOR,
        "version" => VERSION,
        "permanent-key" => PERMANENT_KEY,
        "secret-id-part" => SECRET_ID_PART,
        "publication-time" => PUBLICATION_TIME,
        "protocol-versions" => PROTOCOL_VERSIONS,
        "introduction-points" => INTRODUCTION_POINTS,
        "signature" => SIGNATURE,
    }
}

/// A version 2 onion service descriptor.
///
/// Either built with [`RendDescV2::new`], in which case every identifier is
/// derived from the permanent key and the current time, or parsed with
/// [`RendDescV2::parse_all`], in which case the identifiers are taken from
/// the document as they are.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RendDescV2<K = PublicKey> {
    /// The identifier under which this descriptor is stored.
    desc_id: DescriptorId,
    /// The descriptor format version.
    version: u32,
    /// The service's permanent key.
    permanent_key: K,
    /// The rotating part of the descriptor identifier.
    ///
    /// Only `None` for a parsed descriptor that had no usable value.
    secret_id_part: Option<SecretIdPart>,
    /// When this descriptor was published, rounded down to the hour.
    ///
    /// Only `None` for a parsed descriptor that had no usable value.
    publication_time: Option<SystemTime>,
    /// The introduction protocol versions that the service supports.
    protocol_versions: BTreeSet<u32>,
    /// The service's introduction points.
    intro_points: Vec<IntroPointDesc<K>>,
    /// The signature, if this descriptor was parsed.
    signature: Option<Vec<u8>>,
}

impl<K> RendDescV2<K> {
    /// Return the identifier under which this descriptor is stored.
    pub fn desc_id(&self) -> &DescriptorId {
        &self.desc_id
    }
    /// Return the descriptor format version.
    pub fn version(&self) -> u32 {
        self.version
    }
    /// Return the service's permanent key.
    pub fn permanent_key(&self) -> &K {
        &self.permanent_key
    }
    /// Return the secret-id-part, if we know it.
    pub fn secret_id_part(&self) -> Option<&SecretIdPart> {
        self.secret_id_part.as_ref()
    }
    /// Return the publication time, if we know it.
    pub fn publication_time(&self) -> Option<SystemTime> {
        self.publication_time
    }
    /// Return the supported introduction protocol versions.
    pub fn protocol_versions(&self) -> &BTreeSet<u32> {
        &self.protocol_versions
    }
    /// Return the introduction points.
    pub fn intro_points(&self) -> &[IntroPointDesc<K>] {
        &self.intro_points[..]
    }
    /// Return the signature, if this descriptor was parsed from a document.
    pub fn signature(&self) -> Option<&[u8]> {
        self.signature.as_deref()
    }
}

impl<K: KeyMaterial> RendDescV2<K> {
    /// Construct the descriptor that a service with `permanent_key` should
    /// publish at `now` for `replica`.
    ///
    /// The publication time is `now` rounded down to the hour, but the
    /// identifiers are derived from `now` itself.
    pub fn new(
        permanent_key: K,
        intro_points: Vec<IntroPointDesc<K>>,
        replica: u8,
        now: SystemTime,
    ) -> EncodeResult<Self> {
        let permanent_id = permanent_key.permanent_id()?;
        let secret_id_part = ops::secret_id_part(&permanent_id, now, replica)?;
        let desc_id = ops::descriptor_id(&permanent_id, &secret_id_part);
        trace!("Constructed descriptor {} for replica {}", desc_id, replica);

        Ok(RendDescV2 {
            desc_id,
            version: DESC_VERSION,
            permanent_key,
            secret_id_part: Some(secret_id_part),
            publication_time: Some(floor_to_hour(now)),
            protocol_versions: ADVERTISED_PROTOCOLS.into(),
            intro_points,
            signature: None,
        })
    }

    /// Construct a descriptor for every replica in `cfg`.
    pub fn for_replicas(
        cfg: &DescriptorConfig,
        permanent_key: K,
        intro_points: Vec<IntroPointDesc<K>>,
        now: SystemTime,
    ) -> EncodeResult<Vec<Self>>
    where
        K: Clone,
    {
        (0..cfg.replicas())
            .map(|replica| Self::new(permanent_key.clone(), intro_points.clone(), replica, now))
            .collect()
    }

    /// Parse every descriptor in `s`.
    ///
    /// Records that can't be decoded are skipped; the returned
    /// [`ParseOutcome`] says why.  Problems with the introduction points of
    /// a descriptor that we accepted are reported there too; their
    /// positions are relative to the decoded `introduction-points` object.
    pub fn parse_all(s: &str) -> ParseOutcome<'_, Self> {
        parse_records(
            s,
            RendDescKwd::RENDEZVOUS_SERVICE_DESCRIPTOR,
            "descriptor",
            Self::from_record,
        )
    }

    /// Decode one record, which must start with
    /// `rendezvous-service-descriptor`.
    fn from_record(rec: &Record<'_, RendDescKwd>, warnings: &mut Vec<Error>) -> Result<Self> {
        use RendDescKwd::*;

        let desc_id = rec
            .required(RENDEZVOUS_SERVICE_DESCRIPTOR)?
            .parse_arg(0)?;
        let version = rec.required(VERSION)?.parse_arg(0)?;
        let KeyObject(permanent_key) = rec.required(PERMANENT_KEY)?.parse_obj(RSA_KEY_TAG)?;

        let mut inner_warnings = Vec::new();
        let intro_points = match rec.get(INTRODUCTION_POINTS)? {
            Some(item) => {
                let decoded = item.obj(MESSAGE_TAG).and_then(|bytes| {
                    String::from_utf8(bytes).map_err(|_| {
                        EK::BadObjectVal
                            .with_msg("introduction-points is not UTF-8")
                            .at_pos(item.pos())
                    })
                });
                match decoded {
                    Ok(text) => {
                        let inner = IntroPointDesc::<K>::parse_all(&text);
                        inner_warnings.extend(inner.warnings);
                        inner.items
                    }
                    Err(e) => {
                        inner_warnings.push(e);
                        Vec::new()
                    }
                }
            }
            None => Vec::new(),
        };

        let sig_item = rec.required(SIGNATURE)?;
        let signature = sig_item.obj(SIGNATURE_TAG)?;
        if signature.is_empty() {
            return Err(EK::BadObjectVal
                .with_msg("empty signature")
                .at_pos(sig_item.pos()));
        }

        let secret_id_part = match rec.get(SECRET_ID_PART)? {
            Some(item) => item
                .parse_arg::<SecretIdPart>(0)
                .map_err(|e| debug!("Ignoring secret-id-part: {}", e))
                .ok(),
            None => None,
        };
        let publication_time = match rec.get(PUBLICATION_TIME)? {
            Some(item) => item
                .args_as_str()
                .parse::<Iso8601TimeSp>()
                .map(SystemTime::from)
                .map_err(|e| debug!("Ignoring publication-time: {}", e))
                .ok(),
            None => None,
        };
        let protocol_versions = match rec.get(PROTOCOL_VERSIONS)? {
            Some(item) => item
                .parse_arg::<ProtocolVersions>(0)
                .map(BTreeSet::from)
                .map_err(|e| debug!("Ignoring protocol-versions: {}", e))
                .unwrap_or_default(),
            None => BTreeSet::new(),
        };

        warnings.extend(inner_warnings);
        Ok(RendDescV2 {
            desc_id,
            version,
            permanent_key,
            secret_id_part,
            publication_time,
            protocol_versions,
            intro_points,
            signature: Some(signature),
        })
    }

    /// Return the body of this descriptor: the exact text that its
    /// signature covers.
    ///
    /// The body ends with the `signature` keyword line.  A descriptor with
    /// no introduction points has no `introduction-points` item.
    pub fn body(&self) -> EncodeResult<String> {
        use RendDescKwd::*;

        let secret_id_part = self
            .secret_id_part
            .as_ref()
            .ok_or(EncodeError::MissingField("secret-id-part"))?;
        let publication_time = self
            .publication_time
            .ok_or(EncodeError::MissingField("publication-time"))?;
        if self.protocol_versions.is_empty() {
            return Err(EncodeError::MissingField("protocol-versions"));
        }
        let permanent_key = self.permanent_key.to_der()?;

        let mut enc = NetdocEncoder::new();
        enc.item(RENDEZVOUS_SERVICE_DESCRIPTOR).arg(&self.desc_id);
        enc.item(VERSION).arg(&self.version);
        enc.item(PERMANENT_KEY).object(RSA_KEY_TAG, &permanent_key);
        enc.item(SECRET_ID_PART).arg(secret_id_part);
        enc.item(PUBLICATION_TIME)
            .arg(&Iso8601TimeSp(publication_time));
        enc.item(PROTOCOL_VERSIONS)
            .arg(&ProtocolVersions(self.protocol_versions.clone()));
        if !self.intro_points.is_empty() {
            let intro_points = IntroPointDesc::encode_all(&self.intro_points)?;
            enc.item(INTRODUCTION_POINTS)
                .object(MESSAGE_TAG, intro_points.as_bytes());
        }
        enc.item(SIGNATURE);
        enc.finish()
    }

    /// Sign this descriptor, and return the signed document.
    ///
    /// `sign_fn` receives the digest of the [body](Self::body), computed
    /// with the algorithm in `cfg`, and returns a signature over it.
    pub fn sign<F, E>(&self, cfg: &DescriptorConfig, sign_fn: F) -> EncodeResult<String>
    where
        F: FnOnce(&[u8]) -> std::result::Result<Vec<u8>, E>,
        E: std::error::Error + Send + Sync + 'static,
    {
        let mut doc = self.body()?;
        let digest = ops::body_digest(cfg.digest(), doc.as_bytes());
        let signature = sign_fn(&digest).map_err(|e| EncodeError::Signing(Box::new(e)))?;
        if signature.is_empty() {
            return Err(EncodeError::EmptySignature);
        }
        doc.push_str(&pem_block(SIGNATURE_TAG, &signature)?);
        doc.push('\n');
        debug!(
            "Signed descriptor {} ({} digest, {} byte signature)",
            self.desc_id,
            cfg.digest(),
            signature.len()
        );
        Ok(doc)
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
    use crate::NetdocErrorKind;
    use humantime::parse_rfc3339;
    use rsa::pkcs1::DecodeRsaPublicKey;

    const BODY: &str = include_str!("../../testdata/rendv2-body.txt");
    const INTRO_POINT: &str = include_str!("../../testdata/intro-point.txt");

    /// A short, fake signature.
    const SIG_PEM: &str = "-----BEGIN SIGNATURE-----\nAAEC\n-----END SIGNATURE-----\n";

    fn permanent_key() -> PublicKey {
        rsa::RsaPublicKey::from_pkcs1_pem(include_str!("../../testdata/permanent-key.pem"))
            .unwrap()
            .into()
    }

    fn golden() -> RendDescV2 {
        let ips = IntroPointDesc::<PublicKey>::parse_all(INTRO_POINT).items;
        let now = parse_rfc3339("2017-07-14T02:40:00Z").unwrap();
        RendDescV2::new(permanent_key(), ips, 0, now).unwrap()
    }

    /// Return the golden body, with everything from `introduction-points`
    /// on replaced by `tail`.
    fn body_with_tail(tail: &str) -> String {
        let head = BODY.split("introduction-points\n").next().unwrap();
        format!("{}{}", head, tail)
    }

    #[test]
    fn construct() {
        let d = golden();
        assert_eq!(d.version(), 2);
        assert_eq!(d.desc_id().to_string(), "2vc2x7dcifccbct4wwuoczyxm4pavu6q");
        assert_eq!(
            d.secret_id_part().unwrap().to_string(),
            "kwwnugz5hibhpq2hv2tt45u4d43glj6s"
        );
        assert_eq!(
            d.publication_time(),
            Some(parse_rfc3339("2017-07-14T02:00:00Z").unwrap())
        );
        assert_eq!(d.protocol_versions().iter().copied().collect::<Vec<_>>(), vec![2, 3]);
        assert_eq!(d.intro_points().len(), 1);
        assert!(d.signature().is_none());
    }

    #[test]
    fn golden_body() {
        assert_eq!(golden().body().unwrap(), BODY);
    }

    #[test]
    fn replicas() {
        let now = parse_rfc3339("2017-07-14T02:40:00Z").unwrap();
        let cfg = DescriptorConfig::default();
        let descs = RendDescV2::for_replicas(&cfg, permanent_key(), vec![], now).unwrap();
        assert_eq!(descs.len(), 2);
        assert_eq!(descs[0].desc_id().to_string(), "2vc2x7dcifccbct4wwuoczyxm4pavu6q");
        assert_eq!(descs[1].desc_id().to_string(), "i3ow4yd5m2cvk5zobu3upxae2c7yx4iy");
        assert!(!descs[0].body().unwrap().contains("introduction-points"));
    }

    #[test]
    fn unwritable_publication_time() {
        let far = SystemTime::UNIX_EPOCH + std::time::Duration::from_secs(300_000_000_000);
        let d = RendDescV2::new(permanent_key(), vec![], 0, far).unwrap();
        assert!(matches!(d.body(), Err(EncodeError::BadArgument(_))));

        let cfg = DescriptorConfig::default();
        let mut called = false;
        let err = d
            .sign(&cfg, |digest: &[u8]| {
                called = true;
                Ok::<_, std::io::Error>(digest.to_vec())
            })
            .unwrap_err();
        assert!(matches!(err, EncodeError::BadArgument(_)));
        assert!(!called);
    }

    #[test]
    fn parse_signed() {
        let text = format!("{}{}", BODY, SIG_PEM);
        let out = RendDescV2::<PublicKey>::parse_all(&text);
        assert!(out.is_clean());
        assert_eq!(out.items.len(), 1);
        let d = &out.items[0];
        assert_eq!(d.signature(), Some(&[0, 1, 2][..]));

        let mut expected = golden();
        expected.signature = Some(vec![0, 1, 2]);
        assert_eq!(d, &expected);
        assert_eq!(d.body().unwrap(), BODY);
    }

    #[test]
    fn bad_signatures() {
        let check = |sig: &str, kind: NetdocErrorKind| {
            let text = format!("{}{}", BODY, sig);
            let out = RendDescV2::<PublicKey>::parse_all(&text);
            assert!(out.items.is_empty(), "{:?}", sig);
            assert_eq!(out.warnings.len(), 1);
            assert_eq!(out.warnings[0].netdoc_error_kind(), kind);
        };
        check("", NetdocErrorKind::MissingObject);
        check(
            "-----BEGIN SIGNATURE-----\n-----END SIGNATURE-----\n",
            NetdocErrorKind::BadObjectVal,
        );
        check(
            "-----BEGIN MESSAGE-----\nAAEC\n-----END MESSAGE-----\n",
            NetdocErrorKind::WrongObject,
        );

        let text = BODY.replacen("signature\n", "", 1);
        let out = RendDescV2::<PublicKey>::parse_all(&text);
        assert_eq!(
            out.warnings[0].netdoc_error_kind(),
            NetdocErrorKind::MissingToken
        );
    }

    #[test]
    fn optional_fields() {
        let text = format!("{}{}", BODY, SIG_PEM)
            .replacen("publication-time 2017-07-14 02:00:00", "publication-time yesterday", 1)
            .replacen("protocol-versions 2,3\n", "", 1)
            .replacen(
                "secret-id-part kwwnugz5hibhpq2hv2tt45u4d43glj6s",
                "secret-id-part kwwnugz5",
                1,
            );
        let out = RendDescV2::<PublicKey>::parse_all(&text);
        assert!(out.is_clean());
        let d = &out.items[0];
        assert!(d.secret_id_part().is_none());
        assert!(d.publication_time().is_none());
        assert!(d.protocol_versions().is_empty());
        assert_eq!(d.intro_points().len(), 1);
        assert!(matches!(
            d.body(),
            Err(EncodeError::MissingField("secret-id-part"))
        ));
    }

    #[test]
    fn unreadable_intro_points() {
        // Not UTF-8.
        let text = body_with_tail(&format!(
            "introduction-points\n-----BEGIN MESSAGE-----\n//4=\n-----END MESSAGE-----\nsignature\n{}",
            SIG_PEM
        ));
        let out = RendDescV2::<PublicKey>::parse_all(&text);
        assert_eq!(out.items.len(), 1);
        assert!(out.items[0].intro_points().is_empty());
        assert_eq!(out.warnings.len(), 1);
        assert_eq!(
            out.warnings[0].netdoc_error_kind(),
            NetdocErrorKind::BadObjectVal
        );

        // UTF-8, but not an introduction point list.
        let text = body_with_tail(&format!(
            "introduction-points\n-----BEGIN MESSAGE-----\naGVsbG8K\n-----END MESSAGE-----\nsignature\n{}",
            SIG_PEM
        ));
        let out = RendDescV2::<PublicKey>::parse_all(&text);
        assert_eq!(out.items.len(), 1);
        assert!(out.items[0].intro_points().is_empty());
        assert_eq!(
            out.warnings[0].netdoc_error_kind(),
            NetdocErrorKind::WrongStartingToken
        );
    }

    #[test]
    fn no_intro_points() {
        let text = body_with_tail(&format!("signature\n{}", SIG_PEM));
        let out = RendDescV2::<PublicKey>::parse_all(&text);
        assert!(out.is_clean());
        assert!(out.items[0].intro_points().is_empty());
        assert_eq!(out.items[0].body().unwrap(), body_with_tail("signature\n"));
    }
}
