//! Tests for building, signing, and parsing whole v2 descriptors.

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

use std::time::SystemTime;

use base64ct::{Base64, Encoding};
use hex_literal::hex;
use humantime::parse_rfc3339;
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey};
use rsa::Pkcs1v15Sign;

use tor_rendv2_crypto::d::DigestAlgorithm;
use tor_rendv2_crypto::ops;
use tor_rendv2_crypto::pk::rsa::PublicKey;
use tor_rendv2_netdoc::{
    DescriptorConfig, EncodeError, IntroPointDesc, NetdocErrorKind, Pos, RendDescV2,
};

const BODY: &str = include_str!("../testdata/rendv2-body.txt");
const INTRO_POINT: &str = include_str!("../testdata/intro-point.txt");

fn public_key(pem: &str) -> PublicKey {
    rsa::RsaPublicKey::from_pkcs1_pem(pem).unwrap().into()
}

fn permanent_key() -> PublicKey {
    public_key(include_str!("../testdata/permanent-key.pem"))
}

fn private_key() -> rsa::RsaPrivateKey {
    rsa::RsaPrivateKey::from_pkcs1_pem(include_str!("../testdata/permanent-key-private.pem"))
        .unwrap()
}

fn when() -> SystemTime {
    parse_rfc3339("2017-07-14T02:40:00Z").unwrap()
}

fn intro_points() -> Vec<IntroPointDesc> {
    IntroPointDesc::<PublicKey>::parse_all(INTRO_POINT).items
}

/// Wrap `data` the way the encoder would.
fn pem(tag: &str, data: &[u8]) -> String {
    let b64 = Base64::encode_string(data);
    let mut out = format!("-----BEGIN {}-----\n", tag);
    for chunk in b64.as_bytes().chunks(64) {
        out.push_str(std::str::from_utf8(chunk).unwrap());
        out.push('\n');
    }
    out.push_str(&format!("-----END {}-----\n", tag));
    out
}

/// Sign `digest` with the permanent key.
fn rsa_sign(digest: &[u8]) -> Result<Vec<u8>, rsa::Error> {
    private_key().sign(Pkcs1v15Sign::new_unprefixed(), digest)
}

#[test]
fn golden_body_digest() {
    let desc = RendDescV2::new(permanent_key(), intro_points(), 0, when()).unwrap();
    let body = desc.body().unwrap();
    assert_eq!(body, BODY);
    assert_eq!(
        ops::body_digest(DigestAlgorithm::Sha1, body.as_bytes()),
        hex!("6629a00ec5cde89722d53b10334732b05f48967e")
    );
    assert_eq!(
        ops::body_digest(DigestAlgorithm::Sha256, body.as_bytes()),
        hex!("91f1f322a5157532cb69bdae7783db13f7bf65051c4dd50202362843320fb5a5")
    );
}

#[test]
fn deterministic() {
    let a = RendDescV2::new(permanent_key(), intro_points(), 1, when()).unwrap();
    let b = RendDescV2::new(permanent_key(), intro_points(), 1, when()).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.body().unwrap(), b.body().unwrap());

    let cfg = DescriptorConfig::default();
    let sign = |d: &[u8]| Ok::<_, std::io::Error>(d.to_vec());
    assert_eq!(a.sign(&cfg, sign).unwrap(), b.sign(&cfg, sign).unwrap());
}

#[test]
fn rotation_boundary() {
    let last = parse_rfc3339("2017-07-14T13:24:22Z").unwrap();
    let first = parse_rfc3339("2017-07-14T13:24:23Z").unwrap();
    let old = RendDescV2::new(permanent_key(), vec![], 0, last).unwrap();
    let new = RendDescV2::new(permanent_key(), vec![], 0, first).unwrap();

    assert_eq!(old.desc_id().to_string(), "2vc2x7dcifccbct4wwuoczyxm4pavu6q");
    assert_ne!(old.desc_id(), new.desc_id());
    assert_ne!(old.secret_id_part(), new.secret_id_part());
    // Both were published in the same hour.
    assert_eq!(old.publication_time(), new.publication_time());
}

#[test]
fn end_to_end_rsa() {
    let cfg = DescriptorConfig::default();
    let descs =
        RendDescV2::for_replicas(&cfg, permanent_key(), intro_points(), when()).unwrap();
    assert_eq!(descs.len(), 2);

    let signed: String = descs
        .iter()
        .map(|d| d.sign(&cfg, rsa_sign).unwrap())
        .collect();
    assert!(signed.starts_with(BODY));

    let out = RendDescV2::<PublicKey>::parse_all(&signed);
    assert!(out.is_clean());
    assert_eq!(out.items.len(), 2);

    for (parsed, orig) in out.items.iter().zip(&descs) {
        assert_eq!(parsed.desc_id(), orig.desc_id());
        assert_eq!(parsed.permanent_key(), orig.permanent_key());
        assert_eq!(parsed.intro_points(), orig.intro_points());

        let body = parsed.body().unwrap();
        assert_eq!(body, orig.body().unwrap());
        let digest = ops::body_digest(cfg.digest(), body.as_bytes());
        let sig = parsed.signature().unwrap();
        assert_eq!(sig.len(), 128);
        parsed.permanent_key().verify(&digest, sig).unwrap();
    }

    // The two replicas differ only in their identifiers.
    assert_ne!(out.items[0].desc_id(), out.items[1].desc_id());
}

#[test]
fn sha256_digest() {
    let cfg = DescriptorConfig::builder()
        .digest(DigestAlgorithm::Sha256)
        .build()
        .unwrap();
    let desc = RendDescV2::new(permanent_key(), intro_points(), 0, when()).unwrap();
    let mut seen = Vec::new();
    let doc = desc
        .sign(&cfg, |d: &[u8]| {
            seen = d.to_vec();
            Ok::<_, std::io::Error>(vec![1; 16])
        })
        .unwrap();
    assert_eq!(
        seen,
        hex!("91f1f322a5157532cb69bdae7783db13f7bf65051c4dd50202362843320fb5a5")
    );
    assert_eq!(doc, format!("{}{}", BODY, pem("SIGNATURE", &[1; 16])));
}

#[test]
fn signing_failures() {
    let cfg = DescriptorConfig::default();
    let desc = RendDescV2::new(permanent_key(), intro_points(), 0, when()).unwrap();

    let err = desc
        .sign(&cfg, |_: &[u8]| {
            Err(std::io::Error::new(std::io::ErrorKind::Other, "no key"))
        })
        .unwrap_err();
    assert!(matches!(err, EncodeError::Signing(_)));
    let source = std::error::Error::source(&err).unwrap();
    assert_eq!(source.to_string(), "no key");

    let err = desc
        .sign(&cfg, |_: &[u8]| Ok::<_, std::io::Error>(vec![]))
        .unwrap_err();
    assert!(matches!(err, EncodeError::EmptySignature));
}

#[test]
fn bad_intro_point_is_isolated() {
    let bad = INTRO_POINT.replacen("onion-port 9001", "onion-port 65536", 1);
    let ips = format!("{}{}{}", INTRO_POINT, bad, INTRO_POINT);
    let head = BODY.split("introduction-points\n").next().unwrap();
    let doc = format!(
        "{}introduction-points\n{}signature\n{}",
        head,
        pem("MESSAGE", ips.as_bytes()),
        pem("SIGNATURE", &[9; 128])
    );

    let out = RendDescV2::<PublicKey>::parse_all(&doc);
    assert_eq!(out.items.len(), 1);
    assert_eq!(out.remainder, "");
    assert_eq!(out.items[0].intro_points().len(), 2);
    assert_eq!(out.items[0].intro_points()[0], intro_points()[0]);

    assert_eq!(out.warnings.len(), 1);
    let w = &out.warnings[0];
    assert_eq!(w.netdoc_error_kind(), NetdocErrorKind::BadArgument);
    assert_eq!(w.pos(), Pos::from_line(18, 12));
}

#[test]
fn truncated_record_is_remainder() {
    let cfg = DescriptorConfig::default();
    let descs = RendDescV2::for_replicas(&cfg, permanent_key(), vec![], when()).unwrap();
    let first = descs[0].sign(&cfg, rsa_sign).unwrap();
    let second = descs[1].sign(&cfg, rsa_sign).unwrap();
    let truncated = &second[..second.len() - 1];
    let doc = format!("{}{}", first, truncated);

    let out = RendDescV2::<PublicKey>::parse_all(&doc);
    assert_eq!(out.items.len(), 1);
    assert_eq!(out.items[0].desc_id(), descs[0].desc_id());
    assert_eq!(out.remainder, truncated);
    assert_eq!(out.warnings.len(), 1);
    assert_eq!(
        out.warnings[0].netdoc_error_kind(),
        NetdocErrorKind::TruncatedLine
    );
}

#[test]
fn mismatched_tags() {
    let signed = format!("{}{}", BODY, pem("SIGNATURE", &[9; 128]))
        .replace("-----END SIGNATURE-----", "-----END MESSAGE-----");
    let out = RendDescV2::<PublicKey>::parse_all(&signed);
    assert!(out.items.is_empty());
    assert_eq!(out.remainder, signed);
    assert_eq!(
        out.warnings[0].netdoc_error_kind(),
        NetdocErrorKind::BadObjectMismatchedTag
    );
}

#[test]
fn batch_with_garbage() {
    let sig = pem("SIGNATURE", &[9; 128]);
    let good = format!("{}{}", BODY, sig);
    let no_version = good.replacen("version 2\n", "", 1);
    let doc = format!(
        "router-status nothing to see\n{}{}\n{}",
        good, no_version, good
    );

    let out = RendDescV2::<PublicKey>::parse_all(&doc);
    assert_eq!(out.items.len(), 2);
    assert_eq!(out.remainder, "");
    let kinds: Vec<_> = out.warnings.iter().map(|w| w.netdoc_error_kind()).collect();
    assert_eq!(
        kinds,
        vec![
            NetdocErrorKind::WrongStartingToken,
            NetdocErrorKind::MissingToken
        ]
    );
}
