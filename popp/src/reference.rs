//! Scanning `{id:...}` references inside msgstr values.
//!
//! A reference is `{id:` followed by a msgid (optionally `msgid-msgctxt`) and a
//! closing `}`. A backslash directly before the opening brace escapes it:
//! `\{id:name}` is left alone and never counted. A PO-escaped backslash does
//! not: `\\{id:name}` is a literal backslash followed by a reference.

use std::ops::Range;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref REFERENCE_REGEX: Regex = Regex::new(r"\{id:([^{}]*)\}").unwrap();
}

/// A reference found in a string. Offsets are byte offsets into that string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub start: usize,
    /// Length of the whole `{id:...}` token.
    pub len: usize,
    /// The referenced msgid as written (not case-folded).
    pub id: String,
}

impl Reference {
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end()
    }
}

/// Finds the first unescaped reference starting at or after byte offset `from`.
pub fn find_reference(text: &str, from: usize) -> Option<Reference> {
    let mut position = from;
    while position <= text.len() {
        let captures = REFERENCE_REGEX.captures_at(text, position)?;
        let whole = captures.get(0)?;
        if is_escaped(text, whole.start()) {
            position = whole.start() + 1;
            continue;
        }
        return Some(Reference {
            start: whole.start(),
            len: whole.len(),
            id: captures[1].to_string(),
        });
    }
    None
}

/// A reference is escaped by an odd run of backslashes before it. An even run
/// is PO-escaped literal backslashes, as in `C:\\{id:x}`, which splicing in a
/// value such as `C:\\` also produces.
fn is_escaped(text: &str, start: usize) -> bool {
    let backslashes = text.as_bytes()[..start]
        .iter()
        .rev()
        .take_while(|&&byte| byte == b'\\')
        .count();
    backslashes % 2 == 1
}

/// Iterates over the unescaped references of a string, left to right.
pub fn references(text: &str) -> References<'_> {
    References { text, position: 0 }
}

pub struct References<'a> {
    text: &'a str,
    position: usize,
}

impl Iterator for References<'_> {
    type Item = Reference;

    fn next(&mut self) -> Option<Self::Item> {
        let reference = find_reference(self.text, self.position)?;
        self.position = reference.end();
        Some(reference)
    }
}

/// Number of unescaped references in a string.
pub fn count_references(text: &str) -> usize {
    references(text).count()
}
