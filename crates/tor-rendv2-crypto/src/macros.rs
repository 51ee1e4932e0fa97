//! Macros that we use to define other types in this crate.
//!
//! (These macros are not likely to work outside of the context used in this
//! crate without additional help.)

/// Define a wrapper type around a 20-byte identifier.
///
/// The resulting type is `Display`ed as lowercase unpadded base32 (the way
/// these identifiers appear in v2 descriptors), can be parsed back from
/// base32 in either case, and is `Debug`ged as hex.
macro_rules! define_id_bytes {
{ $(#[$meta:meta])* pub struct $name:ident; } =>
{
    $(#[$meta])*
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
    pub struct $name([u8; $crate::id::ID_LEN]);

    impl $name {
        /// Construct this identifier from a slice of bytes.
        ///
        /// Returns None if the input is not of the correct length.
        pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
            Some(Self(bytes.try_into().ok()?))
        }
        /// Expose this identifier as a slice of bytes.
        pub fn as_bytes(&self) -> &[u8] {
            &self.0[..]
        }
    }
    impl AsRef<[u8; $crate::id::ID_LEN]> for $name {
        fn as_ref(&self) -> &[u8; $crate::id::ID_LEN] {
            &self.0
        }
    }
    impl From<[u8; $crate::id::ID_LEN]> for $name {
        fn from(inp: [u8; $crate::id::ID_LEN]) -> Self {
            Self(inp)
        }
    }
    impl From<$name> for [u8; $crate::id::ID_LEN] {
        fn from(inp: $name) -> [u8; $crate::id::ID_LEN] {
            inp.0
        }
    }
    impl std::fmt::Display for $name {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(&$crate::id::b32_encode(&self.0))
        }
    }
    impl std::fmt::Debug for $name {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, concat!(stringify!($name), "({})"), hex::encode(self.0))
        }
    }
    impl std::str::FromStr for $name {
        type Err = $crate::id::IdParseError;
        fn from_str(s: &str) -> Result<Self, Self::Err> {
            let bytes = $crate::id::b32_decode(s)?;
            Self::from_bytes(&bytes).ok_or($crate::id::IdParseError::WrongLength(bytes.len()))
        }
    }
}
}

pub(crate) use define_id_bytes;
