//! Parsing support for the network document meta-format
//!
//! The meta-format used by Tor network documents evolved over time
//! from a legacy line-oriented format.  It's described more fully
//! in Tor's
//! [dir-spec.txt](https://spec.torproject.org/dir-spec).
//!
//! In brief, a network document is a sequence of
//! [tokenize::Item]s.  Each Item starts with a
//! [keyword::Keyword], takes a number of _arguments_ on the same
//! line, and is optionally followed by a PEM-like base64-encoded
//! _object_.
//!
//! A v2 descriptor batch, or an introduction-point list, is a run of
//! _records_: each begins with a marker item and continues until the next
//! marker or the end of the input.  [record] splits a document that way.

#[macro_use]
pub(crate) mod keyword;
pub(crate) mod record;
pub(crate) mod tokenize;
