//! Types used to parse arguments and objects of entries in a v2 descriptor.
//!
//! These types shouldn't be exposed outside of the netdoc crate, except for
//! [`Iso8601TimeSp`].

pub use timeimpl::*;
pub(crate) use keyimpl::*;
pub(crate) use protoimpl::*;

/// A value that can be decoded from the bytes of an object.
///
/// Used for decoding the objects between BEGIN and END tags.
pub(crate) trait FromBytes: Sized {
    /// Try to parse a value of this type from a byte slice
    fn from_bytes(b: &[u8], p: crate::Pos) -> crate::Result<Self>;
    /// Try to parse a value of this type from a vector of bytes,
    /// and consume that value
    fn from_vec(v: Vec<u8>, p: crate::Pos) -> crate::Result<Self> {
        Self::from_bytes(&v[..], p)
    }
}

/// The `publication-time` format
mod timeimpl {
    use crate::{EncodeError, EncodeResult, Error, NetdocErrorKind as EK, Result};
    use std::time::{Duration, SystemTime};
    use time::{
        format_description::FormatItem, macros::format_description, OffsetDateTime,
        PrimitiveDateTime,
    };

    /// A UTC time with one-second precision, written as a date and a time
    /// separated by a single space.
    ///
    /// (Example: "2017-07-14 02:00:00")
    #[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)] //
    #[derive(derive_more::Into, derive_more::From, derive_more::Deref)]
    #[allow(clippy::exhaustive_structs)]
    pub struct Iso8601TimeSp(pub SystemTime);

    /// `YYYY-MM-DD HH:MM:SS`
    const PUBLICATION_TIME_FMT: &[FormatItem] =
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

    impl std::str::FromStr for Iso8601TimeSp {
        type Err = Error;
        fn from_str(s: &str) -> Result<Iso8601TimeSp> {
            let d = PrimitiveDateTime::parse(s, &PUBLICATION_TIME_FMT).map_err(|e| {
                EK::BadArgument.with_msg(format!("invalid time: {}", e))
            })?;
            Ok(Iso8601TimeSp(d.assume_utc().into()))
        }
    }

    /// Convert `t` to a calendar time, if it falls within the years that
    /// `time` can represent.
    fn to_datetime(t: SystemTime) -> Option<OffsetDateTime> {
        match t.duration_since(SystemTime::UNIX_EPOCH) {
            Ok(after) => OffsetDateTime::UNIX_EPOCH.checked_add(after.try_into().ok()?),
            Err(e) => OffsetDateTime::UNIX_EPOCH.checked_sub(e.duration().try_into().ok()?),
        }
    }

    impl Iso8601TimeSp {
        /// Format this time, or return an error if it is outside the years
        /// that we can write.
        pub(crate) fn try_format(&self) -> EncodeResult<String> {
            let when = to_datetime(self.0).ok_or_else(|| {
                EncodeError::BadArgument(format!("time out of range: {:?}", self.0))
            })?;
            when.format(&PUBLICATION_TIME_FMT)
                .map_err(|e| EncodeError::BadArgument(format!("unrepresentable time: {}", e)))
        }
    }

    impl std::fmt::Display for Iso8601TimeSp {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            match self.try_format() {
                Ok(s) => write!(f, "{}", s),
                Err(_) => write!(f, "{:?}", self.0),
            }
        }
    }

    /// The length of an hour, in seconds.
    const HOUR_SEC: u64 = 60 * 60;

    /// Round `t` down to the start of its hour.
    ///
    /// Times before the epoch are returned unchanged.
    pub(crate) fn floor_to_hour(t: SystemTime) -> SystemTime {
        match t.duration_since(SystemTime::UNIX_EPOCH) {
            Ok(d) => {
                let secs = d.as_secs();
                SystemTime::UNIX_EPOCH + Duration::from_secs(secs - secs % HOUR_SEC)
            }
            Err(_) => t,
        }
    }
}

/// Types for decoding public keys
mod keyimpl {
    use crate::{NetdocErrorKind as EK, Pos, Result};
    use tor_rendv2_crypto::pk::KeyMaterial;

    /// A public key, as parsed from a base64-encoded object.
    #[derive(Clone, Debug)]
    pub(crate) struct KeyObject<K>(pub(crate) K);

    impl<K: KeyMaterial> super::FromBytes for KeyObject<K> {
        fn from_bytes(b: &[u8], pos: Pos) -> Result<Self> {
            let key = K::from_der(b).ok_or_else(|| {
                EK::BadObjectVal
                    .with_msg("unable to decode public key")
                    .at_pos(pos)
            })?;
            Ok(KeyObject(key))
        }
    }
}

/// Types for the `protocol-versions` list
mod protoimpl {
    use crate::{Error, Result};
    use itertools::Itertools;
    use std::collections::BTreeSet;

    /// A set of protocol versions, encoded as a comma-separated list of
    /// integers.
    ///
    /// (Example: "2,3")
    #[derive(Debug, Clone, Eq, PartialEq, Default)]
    #[derive(derive_more::Into, derive_more::From, derive_more::Deref)]
    pub(crate) struct ProtocolVersions(pub(crate) BTreeSet<u32>);

    impl std::str::FromStr for ProtocolVersions {
        type Err = Error;
        fn from_str(s: &str) -> Result<ProtocolVersions> {
            let versions = s
                .split(',')
                .map(str::parse::<u32>)
                .collect::<std::result::Result<_, _>>()?;
            Ok(ProtocolVersions(versions))
        }
    }

    impl std::fmt::Display for ProtocolVersions {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{}", self.0.iter().join(","))
        }
    }
}
