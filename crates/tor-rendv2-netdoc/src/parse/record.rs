//! Split a document into marker-delimited records.

use crate::parse::keyword::Keyword;
use crate::parse::tokenize::{Item, NetDocReader};
use crate::{Error, NetdocErrorKind as EK, Pos, Result};

/// A run of items that begins (if well-formed) with a marker item.
#[derive(Debug)]
pub(crate) struct Record<'a, K: Keyword> {
    /// Offset of the first item of this record within its document.
    off: usize,
    /// The items of this record, in order.
    items: Vec<Item<'a, K>>,
}

impl<'a, K: Keyword> Record<'a, K> {
    /// Return the position of this record.
    pub(crate) fn pos(&self) -> Pos {
        Pos::from_byte(self.off)
    }

    /// Return the first item in this record.
    pub(crate) fn first_item(&self) -> Option<&Item<'a, K>> {
        self.items.first()
    }

    /// Return the keyword of the first item in this record.
    pub(crate) fn first_keyword(&self) -> Option<K> {
        self.first_item().map(Item::kwd)
    }

    /// Return the item with keyword `k`, if there is one.
    ///
    /// Return an error if there is more than one.
    pub(crate) fn get(&self, k: K) -> Result<Option<&Item<'a, K>>> {
        let mut found = self.items.iter().filter(|item| item.kwd() == k);
        let first = found.next();
        if let Some(dup) = found.next() {
            return Err(EK::DuplicateToken
                .with_msg(k.to_str())
                .at_pos(dup.pos()));
        }
        Ok(first)
    }

    /// Return the item with keyword `k`.
    ///
    /// Return an error if there isn't exactly one.
    pub(crate) fn required(&self, k: K) -> Result<&Item<'a, K>> {
        self.get(k)?.ok_or_else(|| {
            EK::MissingToken
                .with_msg(k.to_str())
                .at_pos(self.pos())
        })
    }
}

/// A document, split into records.
#[derive(Debug)]
pub(crate) struct Split<'a, K: Keyword> {
    /// Every record that the tokenizer read in full.
    pub(crate) records: Vec<Record<'a, K>>,
    /// The text that we did not split into records.
    ///
    /// Empty unless `error` is set.
    pub(crate) remainder: &'a str,
    /// The tokenizer error that stopped us, if any.
    pub(crate) error: Option<Error>,
}

/// Split `s` into records, each beginning at an item whose keyword is
/// `marker`.
///
/// Any items that come before the first marker form a record of their own,
/// which does not begin with the marker.  Empty lines between items are
/// ignored.
///
/// If the tokenizer fails, we stop: the record in progress is not returned,
/// and the remainder runs from the start of that record to the end of `s`.
pub(crate) fn split_records<K: Keyword>(s: &str, marker: K) -> Split<'_, K> {
    let mut reader = NetDocReader::<K>::new(s);
    let mut records = Vec::new();
    let mut current: Option<Record<'_, K>> = None;

    loop {
        let start = reader.offset();
        match reader.next() {
            None => break,
            Some(Err(e)) if e.netdoc_error_kind() == EK::EmptyLine => continue,
            Some(Err(e)) => {
                let rec_start = current.as_ref().map_or(start, |r| r.off);
                return Split {
                    records,
                    remainder: &s[rec_start..],
                    error: Some(e.within(s)),
                };
            }
            Some(Ok(item)) => {
                let starts_record = item.kwd() == marker;
                match current.as_mut() {
                    Some(rec) if !starts_record => rec.items.push(item),
                    _ => {
                        records.extend(current.take());
                        current = Some(Record {
                            off: item.offset(),
                            items: vec![item],
                        });
                    }
                }
            }
        }
    }
    records.extend(current);

    Split {
        records,
        remainder: &s[s.len()..],
        error: None,
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

    decl_keyword! {
        /// Keywords for testing.
        TestKwd {
            "start" => START,
            "body" => BODY,
        }
    }

    #[test]
    fn split() {
        use TestKwd::*;
        let s = "body 0
start 1
body 1

start 2
start 3
body 3
body 3
";
        let split = split_records(s, START);
        assert!(split.error.is_none());
        assert_eq!(split.remainder, "");
        assert_eq!(split.records.len(), 4);

        assert_eq!(split.records[0].first_keyword(), Some(BODY));
        assert_eq!(split.records[1].first_keyword(), Some(START));
        assert_eq!(
            split.records[1].required(BODY).unwrap().arg(0),
            Some("1")
        );
        assert_eq!(split.records[1].pos().within(s), Pos::from_line(2, 1));

        let r2 = &split.records[2];
        assert!(r2.get(BODY).unwrap().is_none());
        let err = r2.required(BODY).unwrap_err();
        assert_eq!(err.netdoc_error_kind(), NetdocErrorKind::MissingToken);
        assert_eq!(err.pos().within(s), Pos::from_line(5, 1));

        let err = split.records[3].get(BODY).unwrap_err();
        assert_eq!(err.netdoc_error_kind(), NetdocErrorKind::DuplicateToken);
        assert_eq!(err.pos().within(s), Pos::from_line(8, 1));
    }

    #[test]
    fn split_truncated() {
        use TestKwd::*;
        let s = "start 1\nbody 1\nstart 2\nbody 2";
        let split = split_records(s, START);
        assert_eq!(split.records.len(), 1);
        assert_eq!(split.remainder, "start 2\nbody 2");
        let err = split.error.unwrap();
        assert_eq!(err.netdoc_error_kind(), NetdocErrorKind::TruncatedLine);
        assert_eq!(err.pos(), Pos::from_line(4, 7));
    }

    #[test]
    fn split_empty() {
        let split = split_records("", TestKwd::START);
        assert!(split.records.is_empty());
        assert!(split.error.is_none());
        assert_eq!(split.remainder, "");
    }
}
