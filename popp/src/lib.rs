#![forbid(unsafe_code)]
//! PO preprocessor.
//!
//! Expands cross-references between entries of gettext `.po` files, and
//! assembles files from fragments with `$include` directives.
//!
//! A `msgstr` may refer to the `msgstr` of another entry with a curly-brace
//! reference:
//!
//! ```text
//! msgid "ProductName"
//! msgstr "Popp"
//!
//! msgid "Welcome"
//! msgstr "Welcome to {id:ProductName}!"
//! ```
//!
//! References are `{id:msgid}` or `{id:msgid-msgctxt}`, matched
//! case-insensitively unless [`Options::case_sensitive_ids`] is set, and
//! resolved transitively. `\{id:msgid}` is left alone.
//!
//! Includes are written `$include "file.po"`, or wrapped in a comment
//! (`# $include "file.po"`, `#.$include "file.po"`) so that the source stays
//! valid for other PO tools.
//!
//! Only the `msgstr` lines that change are rewritten; comments, blank lines and
//! formatting are preserved exactly.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use popp::{Options, Preprocessor, error_level, source::read_source};
//!
//! let input = read_source("en.popp")?;
//! let mut output = Vec::new();
//!
//! let mut preprocessor = Preprocessor::new(Options::default());
//! let result = preprocessor.process(&input, Some(std::path::Path::new(".")), &mut output);
//! for diagnostic in preprocessor.diagnostics() {
//!     eprintln!("{}", diagnostic);
//! }
//! std::fs::write("en.po", output)?;
//! std::process::exit(error_level(&result));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Limitations
//!
//! - Plural forms (`msgid_plural`, `msgstr[n]`) are passed through untouched;
//!   they cannot contain or be the target of references.

pub mod diagnostics;
pub mod entry;
pub mod error;
pub mod include;
pub mod line;
pub mod options;
pub mod output;
pub mod preprocessor;
pub mod reference;
pub mod resolve;
pub mod source;
pub mod traits;

mod session;

// Re-export most used types for easy consumption
pub use crate::{
    diagnostics::{
        COUNT_FAILED, CountReport, Diagnostic, ErrorLevel, Location, Report, Severity,
        count_result, error_level,
    },
    entry::{Entry, EntryMap},
    error::Error,
    options::{NewlinePolicy, Options, PluralPolicy},
    preprocessor::Preprocessor,
    reference::Reference,
    source::probe_case_sensitive_filesystem,
};
