//! Break a string into a set of Items.
//!
//! This module defines Item, which represents a basic entry in a
//! record, and NetDocReader, which is used to break a string into Items.

use crate::parse::keyword::Keyword;
use crate::types::misc::FromBytes;
use crate::{NetdocErrorKind as EK, Pos, Result};
use base64ct::{Base64, Encoding};
use std::str::FromStr;

/// Useful constants for netdoc object syntax
pub(crate) mod object {
    /// indicates the start of an object
    pub(crate) const BEGIN_STR: &str = "-----BEGIN ";
    /// indicates the end of an object
    pub(crate) const END_STR: &str = "-----END ";
    /// indicates the end of a begin or end tag.
    pub(crate) const TAG_END: &str = "-----";
    /// Maximum PEM base64 line length (not enforced during parsing)
    pub(crate) const BASE64_PEM_MAX_LINE: usize = 64;
}

/// Return true iff a given character is "space" according to the rules
/// of dir-spec.txt
pub(crate) fn is_sp(c: char) -> bool {
    c == ' ' || c == '\t'
}

/// Return the byte offset of `part` within `whole`.
///
/// `part` must be a subslice of `whole`.
fn offset_of(whole: &str, part: &str) -> usize {
    (part.as_ptr() as usize).saturating_sub(whole.as_ptr() as usize)
}

/// Check that all the characters in `s` are valid base64.
///
/// This is not a perfect check for base64ness -- it is mainly meant
/// to help us recover after unterminated base64.
fn b64check(s: &str, off: usize) -> Result<()> {
    for b in s.bytes() {
        match b {
            b'=' => (),
            b'a'..=b'z' => (),
            b'A'..=b'Z' => (),
            b'0'..=b'9' => (),
            b'/' | b'+' => (),
            _ => {
                return Err(EK::BadObjectBase64.at_pos(Pos::from_byte(off)));
            }
        };
    }
    Ok(())
}

/// A tagged object that is part of an Item.
///
/// This represents a single blob within a pair of "-----BEGIN
/// FOO-----" and "-----END FOO-----".  The data is not guaranteed to
/// be actual base64 when this object is created.
#[derive(Clone, Copy, Debug)]
struct Object<'a> {
    /// Reference to the "tag" string (the 'foo') in the BEGIN line.
    tag: &'a str,
    /// Offset of the tag within the document.
    tag_off: usize,
    /// Reference to the allegedly base64-encoded data.
    data: &'a str,
    /// Offset of the data within the document.
    data_off: usize,
}

/// A single entry of a record.
///
/// Each Item has a keyword, a (possibly empty) set of arguments, and an
/// optional object.
///
/// This is a zero-copy implementation that points to slices within a
/// containing string.
#[derive(Clone, Debug)]
pub(crate) struct Item<'a, K: Keyword> {
    /// The keyword that determines the type of this item.
    kwd: K,
    /// A reference to the actual string that defines the keyword for
    /// this item.
    kwd_str: &'a str,
    /// Offset of the keyword within the document.
    off: usize,
    /// Reference to the arguments that appear in the same line after the
    /// keyword.  Does not include the terminating newline or the
    /// space that separates the keyword for its arguments.
    args: &'a str,
    /// Offset of the arguments within the document.
    args_off: usize,
    /// If present, a base-64-encoded object that appeared at the end
    /// of this item.
    object: Option<Object<'a>>,
}

/// A cursor into a string that returns Items one by one.
#[derive(Debug)]
pub(crate) struct NetDocReader<'a, K: Keyword> {
    /// The string we're parsing.
    s: &'a str,
    /// Our position within the string.
    off: usize,
    /// Tells Rust it's okay that we are parameterizing on K.
    _k: std::marker::PhantomData<K>,
}

impl<'a, K: Keyword> NetDocReader<'a, K> {
    /// Create a new NetDocReader to split a string into tokens.
    pub(crate) fn new(s: &'a str) -> Self {
        NetDocReader {
            s,
            off: 0,
            _k: std::marker::PhantomData,
        }
    }
    /// Return the offset of the next item this reader will try to read.
    pub(crate) fn offset(&self) -> usize {
        self.off
    }
    /// Return the remaining number of bytes in this reader.
    fn remaining(&self) -> usize {
        self.s.len() - self.off
    }
    /// Return true if the next characters in this reader are `s`
    fn starts_with(&self, s: &str) -> bool {
        self.s[self.off..].starts_with(s)
    }
    /// Try to extract a NL-terminated line from this reader.  Always
    /// remove data if the reader is nonempty.
    fn line(&mut self) -> Result<&'a str> {
        let remainder = &self.s[self.off..];
        if let Some(nl_pos) = remainder.find('\n') {
            self.off += nl_pos + 1;
            Ok(&remainder[..nl_pos])
        } else {
            self.off = self.s.len(); // drain everything.
            Err(EK::TruncatedLine.at_pos(Pos::from_byte(self.s.len())))
        }
    }

    /// Try to extract a line that begins with a keyword from this reader.
    ///
    /// Returns a (kwd, args) tuple on success.
    fn kwdline(&mut self) -> Result<(&'a str, &'a str)> {
        let pos = self.off;
        let line = self.line()?;
        if line.is_empty() {
            return Err(EK::EmptyLine.at_pos(Pos::from_byte(pos)));
        }
        let mut parts_iter = line.splitn(2, is_sp);
        let kwd = parts_iter.next().unwrap_or(line);
        if !keyword_ok(kwd) {
            return Err(EK::BadKeyword.at_pos(Pos::from_byte(pos)));
        }
        let args = match parts_iter.next() {
            Some(a) => a,
            // take a zero-length slice, so it will be within the string.
            None => &kwd[kwd.len()..],
        };
        Ok((kwd, args))
    }

    /// Try to extract an Object beginning wrapped within BEGIN/END tags.
    ///
    /// Returns Ok(Some(Object(...))) on success if an object is
    /// found, Ok(None) if no object is found, and Err only if a
    /// corrupt object is found.
    fn object(&mut self) -> Result<Option<Object<'a>>> {
        use object::*;

        let pos = self.off;
        if !self.starts_with(BEGIN_STR) {
            return Ok(None);
        }
        let line = self.line()?;
        if !line.ends_with(TAG_END) || line.len() < BEGIN_STR.len() + TAG_END.len() {
            return Err(EK::BadObjectBeginTag.at_pos(Pos::from_byte(pos)));
        }
        let tag = &line[BEGIN_STR.len()..(line.len() - TAG_END.len())];
        if !tag_keywords_ok(tag) {
            return Err(EK::BadObjectBeginTag.at_pos(Pos::from_byte(pos)));
        }
        let datapos = self.off;
        let (endlinepos, endline) = loop {
            let p = self.off;
            let line = self.line()?;
            if line.starts_with(END_STR) {
                break (p, line);
            }
            // Exit if this line isn't plausible base64.  Otherwise,
            // an unterminated base64 block could potentially
            // "consume" all the rest of the string.
            b64check(line, p)?;
        };
        let data = &self.s[datapos..endlinepos];
        if !endline.ends_with(TAG_END) || endline.len() < END_STR.len() + TAG_END.len() {
            return Err(EK::BadObjectEndTag.at_pos(Pos::from_byte(endlinepos)));
        }
        let endtag = &endline[END_STR.len()..(endline.len() - TAG_END.len())];
        if endtag != tag {
            return Err(EK::BadObjectMismatchedTag.at_pos(Pos::from_byte(endlinepos)));
        }
        Ok(Some(Object {
            tag,
            tag_off: pos + BEGIN_STR.len(),
            data,
            data_off: datapos,
        }))
    }

    /// Read the next Item from this NetDocReader.
    ///
    /// If successful, returns Ok(Some(Item)), or Ok(None) if exhausted.
    /// Returns Err on failure.
    ///
    /// Always consumes at least one line if possible; always ends on a
    /// line boundary if one exists.
    fn item(&mut self) -> Result<Option<Item<'a, K>>> {
        if self.remaining() == 0 {
            return Ok(None);
        }
        let off = self.off;
        let (kwd_str, args) = self.kwdline()?;
        let object = self.object()?;
        Ok(Some(Item {
            kwd: K::from_str(kwd_str),
            kwd_str,
            off,
            args,
            args_off: offset_of(self.s, args),
            object,
        }))
    }
}

/// Return true iff 's' is a valid keyword.
fn keyword_ok(s: &str) -> bool {
    /// Helper: return true if this character can appear in keywords.
    fn kwd_char_ok(c: char) -> bool {
        matches!(c,'A'..='Z' | 'a'..='z' |'0'..='9' | '-')
    }

    if s.is_empty() || s.starts_with('-') {
        return false;
    }
    s.chars().all(kwd_char_ok)
}

/// Return true iff 's' is a valid keywords string for a BEGIN/END tag.
pub(crate) fn tag_keywords_ok(s: &str) -> bool {
    s.split(' ').all(keyword_ok)
}

/// When used as an Iterator, returns a sequence of `Result<Item>`.
impl<'a, K: Keyword> Iterator for NetDocReader<'a, K> {
    type Item = Result<Item<'a, K>>;
    fn next(&mut self) -> Option<Self::Item> {
        self.item().transpose()
    }
}

/// Helper: as base64::decode(), but allows newlines in the middle of the
/// encoded object.
fn base64_decode_multiline(s: &str) -> std::result::Result<Vec<u8>, base64ct::Error> {
    // base64 module hates whitespace.
    let mut s = s.to_string();
    s.retain(|ch| ch != '\n');
    let v = Base64::decode_vec(&s)?;
    Ok(v)
}

impl<'a, K: Keyword> Item<'a, K> {
    /// Return the parsed keyword part of this item.
    pub(crate) fn kwd(&self) -> K {
        self.kwd
    }
    /// Return the keyword part of this item, as a string.
    pub(crate) fn kwd_str(&self) -> &'a str {
        self.kwd_str
    }
    /// Return the arguments of this item, as a single string.
    pub(crate) fn args_as_str(&self) -> &'a str {
        self.args
    }
    /// Return an iterator over the arguments of this item.
    pub(crate) fn args(&self) -> impl Iterator<Item = &'a str> {
        self.args.split(is_sp).filter(|s| !s.is_empty())
    }
    /// Return the nth argument of this item, if there is one.
    pub(crate) fn arg(&self, idx: usize) -> Option<&'a str> {
        self.args().nth(idx)
    }
    /// Return the nth argument of this item, or an error if it isn't there.
    pub(crate) fn required_arg(&self, idx: usize) -> Result<&'a str> {
        self.arg(idx).ok_or_else(|| {
            EK::MissingArgument
                .with_msg(self.kwd.to_str())
                .at_pos(self.arg_pos(idx))
        })
    }
    /// Try to parse the nth argument into some type that supports FromStr.
    ///
    /// Return an error if the argument doesn't exist.
    pub(crate) fn parse_arg<V: FromStr>(&self, idx: usize) -> Result<V>
    where
        crate::Error: From<V::Err>,
    {
        let s = self.required_arg(idx)?;
        s.parse::<V>().map_err(|e| {
            let e: crate::Error = e.into();
            e.or_at_pos(self.arg_pos(idx))
        })
    }
    /// Try to decode the base64 contents of this Item's associated object,
    /// and make sure that its tag matches 'want_tag'.
    pub(crate) fn obj(&self, want_tag: &str) -> Result<Vec<u8>> {
        match self.object {
            None => Err(EK::MissingObject
                .with_msg(self.kwd.to_str())
                .at_pos(self.pos())),
            Some(obj) if obj.tag != want_tag => Err(EK::WrongObject
                .with_msg(format!("expected {}, found {}", want_tag, obj.tag))
                .at_pos(Pos::from_byte(obj.tag_off))),
            Some(obj) => base64_decode_multiline(obj.data)
                .map_err(|_| EK::BadObjectBase64.at_pos(Pos::from_byte(obj.data_off))),
        }
    }
    /// Try to decode the base64 contents of this item's associated object
    /// as a given type that implements FromBytes.
    pub(crate) fn parse_obj<V: FromBytes>(&self, want_tag: &str) -> Result<V> {
        let bytes = self.obj(want_tag)?;
        let p = self
            .object
            .map_or(self.pos(), |o| Pos::from_byte(o.data_off));
        V::from_vec(bytes, p).map_err(|e| e.or_at_pos(p))
    }
    /// Return the position of this item.
    pub(crate) fn pos(&self) -> Pos {
        Pos::from_byte(self.off)
    }
    /// Return the offset of this item within its document.
    pub(crate) fn offset(&self) -> usize {
        self.off
    }
    /// Return the position of the n'th argument of this item.
    ///
    /// If this item does not have a n'th argument, return the
    /// position of the end of the arguments.
    pub(crate) fn arg_pos(&self, n: usize) -> Pos {
        match self.args().nth(n) {
            Some(a) => Pos::from_byte(self.args_off + offset_of(self.args, a)),
            None => Pos::from_byte(self.args_off + self.args.len()),
        }
    }
}
