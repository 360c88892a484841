//! Line classification for PO sources.
//!
//! Every physical line is tagged by inspecting its first characters only; the
//! entry builder later works purely on these tags.

use std::fmt::Display;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // `# $include "file"` and `#.$include "file"`, usable where the source must
    // stay readable by other PO tools.
    static ref COMMENTED_INCLUDE_REGEX: Regex = Regex::new(r#"^#\.?\s*\$include\s+""#).unwrap();
}

/// Bare include directive prefix.
pub const INCLUDE_KEYWORD: &str = "$include ";

/// The category of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineKind {
    Whitespace,
    Comment,
    /// An `$include "file"` directive, bare or comment-wrapped.
    Include,
    Msgctxt,
    /// `msgid` and `msgid_plural` headers.
    Msgid,
    /// `msgstr` and `msgstr[n]` headers.
    Msgstr,
    /// A line holding only a quoted string, continuing the previous header.
    Continuation,
}

/// Index of a file in the session's [`crate::include::IncludedFiles`] table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(pub usize);

impl Display for FileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The file a line came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Origin {
    #[default]
    Main,
    Included(FileId),
}

/// One classified physical line. Line numbers are 1-based within the line's
/// own file; 0 is reserved for the synthetic end-of-input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineRecord {
    pub kind: LineKind,
    pub number: usize,
    pub origin: Origin,
    pub text: String,
}

impl LineRecord {
    pub fn new(kind: LineKind, number: usize, origin: Origin, text: impl Into<String>) -> Self {
        LineRecord {
            kind,
            number,
            origin,
            text: text.into(),
        }
    }

    /// The blank line appended after the last real line, so that every entry
    /// is terminated by whitespace.
    pub fn terminator() -> Self {
        LineRecord::new(LineKind::Whitespace, 0, Origin::Main, "")
    }
}

/// Classifies a line. Returns `None` when the line type can't be determined;
/// callers keep such lines verbatim as comments.
pub fn classify(line: &str) -> Option<LineKind> {
    if line.trim().is_empty() {
        Some(LineKind::Whitespace)
    } else if line.starts_with('#') {
        if COMMENTED_INCLUDE_REGEX.is_match(line) {
            Some(LineKind::Include)
        } else {
            Some(LineKind::Comment)
        }
    } else if line.starts_with('"') {
        Some(LineKind::Continuation)
    } else if starts_with_keyword(line, "msgstr") {
        Some(LineKind::Msgstr)
    } else if starts_with_keyword(line, "msgid") {
        Some(LineKind::Msgid)
    } else if starts_with_keyword(line, "msgctxt") {
        Some(LineKind::Msgctxt)
    } else if line.starts_with(INCLUDE_KEYWORD) {
        Some(LineKind::Include)
    } else {
        None
    }
}

/// Case-insensitive (ASCII) prefix test.
pub fn starts_with_keyword(line: &str, keyword: &str) -> bool {
    line.get(..keyword.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(keyword))
}

/// Returns the text strictly between the first and the last `"` of the line,
/// without unescaping anything. `None` if there are fewer than two quotes.
pub fn extract_quoted(line: &str) -> Option<&str> {
    let left = line.find('"')?;
    let right = line.rfind('"')?;
    if right > left {
        Some(&line[left + 1..right])
    } else {
        None
    }
}

/// The file named by an include line, if it has a non-empty quoted name.
pub fn include_target(line: &str) -> Option<&str> {
    extract_quoted(line).filter(|name| !name.trim().is_empty())
}
