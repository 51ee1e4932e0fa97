//! Support for encoding the network document meta-format
//!
//! Writes keyword lines and PEM-wrapped objects, as described in
//! `dir-spec.txt` section 1.2.
//!
//! No checks are done on keyword presence/absence, multiplicity, or ordering:
//! it is the caller's responsibility to call `.item()` in the right order,
//! with the right keywords and arguments.

use base64ct::{Base64, Encoding};

use crate::parse::keyword::Keyword;
use crate::parse::tokenize::object::{BASE64_PEM_MAX_LINE, BEGIN_STR, END_STR, TAG_END};
use crate::parse::tokenize::tag_keywords_ok;
use crate::types::misc::{Iso8601TimeSp, ProtocolVersions};
use crate::{EncodeError, EncodeResult};

/// Encoder, representing a partially-built document.
#[derive(Debug)]
pub(crate) struct NetdocEncoder {
    /// The being-built document, with everything accumulated so far
    ///
    /// If an [`ItemEncoder`] exists, it will add a newline when it's dropped.
    ///
    /// `Err` means that a bad value was passed to some builder function.
    built: EncodeResult<String>,
}

/// Encoder for an individual item within a being-built document
///
/// Returned by [`NetdocEncoder::item()`].
#[derive(Debug)]
pub(crate) struct ItemEncoder<'n> {
    /// The document including the partial item that we're building
    ///
    /// We will always add a newline when we're dropped
    doc: &'n mut NetdocEncoder,
}

/// Types that can be added as argument(s) to item keyword lines
///
/// Implemented for strings, and various other types.
pub(crate) trait ItemArgument {
    /// Format as a string suitable for including as a netdoc keyword line argument
    ///
    /// The implementation is responsible for checking that the syntax is legal.
    fn write_arg_onto(&self, out: &mut ItemEncoder<'_>) -> EncodeResult<()>;
}

impl NetdocEncoder {
    /// Start encoding a document
    pub(crate) fn new() -> Self {
        NetdocEncoder {
            built: Ok(String::new()),
        }
    }

    /// Adds an item to the being-built document
    ///
    /// The item can be further extended with arguments or an object,
    /// using the returned `ItemEncoder`.
    pub(crate) fn item<K: Keyword>(&mut self, keyword: K) -> ItemEncoder<'_> {
        self.raw(keyword.to_str());
        ItemEncoder { doc: self }
    }

    /// Append `s` to the document, unless building has already failed.
    fn raw(&mut self, s: &str) {
        if let Ok(b) = &mut self.built {
            b.push_str(s);
        }
    }

    /// Record a failure.  The first failure wins.
    fn fail(&mut self, e: EncodeError) {
        if self.built.is_ok() {
            self.built = Err(e);
        }
    }

    /// Build the document into textual form
    pub(crate) fn finish(self) -> EncodeResult<String> {
        self.built
    }
}

/// Return `data` as a PEM block labelled with `tag`.
///
/// The result runs from the BEGIN line through the END tag, with no final
/// newline.  Base64 lines are wrapped at 64 columns.
pub(crate) fn pem_block(tag: &str, data: &[u8]) -> EncodeResult<String> {
    if tag.is_empty() || !tag_keywords_ok(tag) {
        return Err(EncodeError::BadArgument(format!(
            "bad object keywords string {:?}",
            tag
        )));
    }
    let encoded = Base64::encode_string(data);
    let mut out = String::with_capacity(encoded.len() * 65 / 64 + 2 * (tag.len() + 16));
    out.push_str(BEGIN_STR);
    out.push_str(tag);
    out.push_str(TAG_END);
    out.push('\n');
    let mut rest = &encoded[..];
    while !rest.is_empty() {
        let (l, r) = rest.split_at(rest.len().min(BASE64_PEM_MAX_LINE));
        out.push_str(l);
        out.push('\n');
        rest = r;
    }
    out.push_str(END_STR);
    out.push_str(tag);
    out.push_str(TAG_END);
    Ok(out)
}

impl ItemArgument for str {
    fn write_arg_onto(&self, out: &mut ItemEncoder<'_>) -> EncodeResult<()> {
        if self.is_empty() || self.chars().any(|c| !c.is_ascii_graphic()) {
            return Err(EncodeError::BadArgument(format!(
                "invalid keyword line argument {:?}",
                self
            )));
        }
        out.args_raw_nonempty(self);
        Ok(())
    }
}

impl ItemArgument for &str {
    fn write_arg_onto(&self, out: &mut ItemEncoder<'_>) -> EncodeResult<()> {
        <str as ItemArgument>::write_arg_onto(self, out)
    }
}

impl<T: crate::NormalItemArgument> ItemArgument for T {
    fn write_arg_onto(&self, out: &mut ItemEncoder<'_>) -> EncodeResult<()> {
        (*self.to_string()).write_arg_onto(out)
    }
}

impl ItemArgument for Iso8601TimeSp {
    // Contains a space while still being one argument
    fn write_arg_onto(&self, out: &mut ItemEncoder<'_>) -> EncodeResult<()> {
        let arg = self.try_format()?;
        out.args_raw_nonempty(&arg);
        Ok(())
    }
}

impl ItemArgument for ProtocolVersions {
    fn write_arg_onto(&self, out: &mut ItemEncoder<'_>) -> EncodeResult<()> {
        if self.is_empty() {
            return Err(EncodeError::BadArgument(
                "empty protocol-versions list".into(),
            ));
        }
        out.args_raw_nonempty(&self.to_string());
        Ok(())
    }
}

impl<'n> ItemEncoder<'n> {
    /// Add a single argument.
    ///
    /// If the argument is not in the correct syntax, an error
    /// will be reported (later).
    pub(crate) fn arg(mut self, arg: &dyn ItemArgument) -> Self {
        self.add_arg(arg);
        self
    }

    /// Add a single argument, to a borrowed `ItemEncoder`
    pub(crate) fn add_arg(&mut self, arg: &dyn ItemArgument) {
        if let Err(e) = arg.write_arg_onto(self) {
            self.doc.fail(e);
        }
    }

    /// Add one or more arguments, supplied as a single string, without any checking
    fn args_raw_nonempty(&mut self, args: &str) {
        self.doc.raw(" ");
        self.doc.raw(args);
    }

    /// Add an object to the item
    ///
    /// `data` will be PEM (base64) encoded, with `tag` in the BEGIN and
    /// END lines.
    pub(crate) fn object(self, tag: &str, data: &[u8]) {
        match pem_block(tag, data) {
            Ok(block) => {
                self.doc.raw("\n");
                self.doc.raw(&block);
            }
            Err(e) => self.doc.fail(e),
        }
        // final newline will be written by Drop impl
    }
}

impl Drop for ItemEncoder<'_> {
    fn drop(&mut self) {
        self.doc.raw("\n");
    }
}
