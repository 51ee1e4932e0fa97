//! Declaration for the Keyword trait.

use std::fmt::Debug;
use std::hash::Hash;

/// A Keyword identifies the possible types of an entry in a record.
///
/// Each kind of record has its own keyword type, declared with
/// `decl_keyword!`.  An item whose keyword string
/// isn't one we know is mapped to that type's `UNRECOGNIZED` value, and is
/// ignored.
pub(crate) trait Keyword: Hash + Eq + PartialEq + Copy + Clone + Debug {
    /// Find a Keyword corresponding to a string that appears in a
    /// document.
    fn from_str(s: &str) -> Self;
    /// Convert this keyword into the string that appears in documents.
    ///
    /// Returns a placeholder for the unrecognized-keyword value.
    fn to_str(self) -> &'static str;
}

/// Declare an enumeration of the keywords that can appear in one kind of
/// record.
///
/// Every generated enumeration also has an `UNRECOGNIZED` member, for
/// keywords that we don't handle.
macro_rules! decl_keyword {
    { $(#[$meta:meta])* $v:vis $name:ident {
           $( $s:literal => $i:ident ),* $(,)?
       } } => {
        #[derive(Copy, Clone, Eq, PartialEq, Debug, Hash)]
        #[allow(non_camel_case_types)]
        $(#[$meta])*
        $v enum $name {
            $(
                #[doc = concat!("`", $s, "`")]
                $i,
            )*
            /// An unrecognized keyword.
            UNRECOGNIZED,
        }
        impl $crate::parse::keyword::Keyword for $name {
            fn from_str(s: &str) -> Self {
                match s {
                    $( $s => $name::$i, )*
                    _ => $name::UNRECOGNIZED,
                }
            }
            fn to_str(self) -> &'static str {
                match self {
                    $( $name::$i => $s, )*
                    $name::UNRECOGNIZED => "<unrecognized>",
                }
            }
        }
    }
}
