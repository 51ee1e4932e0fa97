//! Individual document types that we can parse or encode.
//!
//! Both document types here are parsed in batches: the input is split into
//! records at a marker keyword, and each record is decoded on its own.  A
//! record that fails to decode is dropped, and the rest of the batch is
//! unaffected.  See [`ParseOutcome`].

pub mod intropt;
pub mod rendv2;

use tracing::{debug, warn};

use crate::parse::keyword::Keyword;
use crate::parse::record::{split_records, Record};
use crate::{Error, NetdocErrorKind as EK, Result};

/// The result of parsing a batch of records.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct ParseOutcome<'a, T> {
    /// Every record that decoded successfully, in the order it appeared.
    pub items: Vec<T>,
    /// The text that we could not split into records.
    ///
    /// This is empty unless the input ended in the middle of a record, or
    /// contained text that isn't well-formed netdoc syntax.  In that case
    /// it runs from the start of the record that we couldn't read to the end
    /// of the input.
    pub remainder: &'a str,
    /// A problem for every record that we skipped, and for the text (if any)
    /// in `remainder`.
    pub warnings: Vec<Error>,
}

impl<'a, T> ParseOutcome<'a, T> {
    /// Return true if every record decoded and all the input was consumed.
    pub fn is_clean(&self) -> bool {
        self.remainder.is_empty() && self.warnings.is_empty()
    }
}

/// Split `s` at `marker`, and decode each record with `decode`.
///
/// `decode` may push warnings of its own about a record it accepted.
/// `what` names the kind of record, for logging.
pub(crate) fn parse_records<'a, K, T, F>(
    s: &'a str,
    marker: K,
    what: &str,
    mut decode: F,
) -> ParseOutcome<'a, T>
where
    K: Keyword,
    F: FnMut(&Record<'a, K>, &mut Vec<Error>) -> Result<T>,
{
    let split = split_records(s, marker);
    let mut items = Vec::with_capacity(split.records.len());
    let mut warnings = Vec::new();

    for rec in &split.records {
        let decoded = if rec.first_keyword() == Some(marker) {
            let n_before = warnings.len();
            let decoded = decode(rec, &mut warnings);
            for w in &mut warnings[n_before..] {
                *w = w.clone().within(s);
            }
            decoded
        } else {
            Err(EK::WrongStartingToken
                .with_msg(format!(
                    "expected {}, found {}",
                    marker.to_str(),
                    rec.first_item().map_or("nothing", |item| item.kwd_str())
                ))
                .at_pos(rec.pos()))
        };
        match decoded {
            Ok(item) => {
                debug!("Decoded {}{}", what, rec.pos().within(s));
                items.push(item);
            }
            Err(e) => {
                let e = e.within(s);
                warn!("Skipping {}: {}", what, e);
                warnings.push(e);
            }
        }
    }

    if let Some(e) = split.error {
        warn!(
            "Stopped parsing {} records, {} bytes left over: {}",
            what,
            split.remainder.len(),
            e
        );
        warnings.push(e);
    }

    ParseOutcome {
        items,
        remainder: split.remainder,
        warnings,
    }
}
