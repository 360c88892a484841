//! Options controlling a preprocessing session.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const NEWLINE_LF: &str = "\n";
pub const NEWLINE_CRLF: &str = "\r\n";
/// Used when the newline style of the source cannot be detected.
pub const NEWLINE_DEFAULT: &str = NEWLINE_CRLF;

/// Which line terminator the output uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum NewlinePolicy {
    /// Use whatever the first line break of the source uses.
    #[default]
    SameAsSource,
    Lf,
    Crlf,
}

impl NewlinePolicy {
    /// Returns the terminator to write for a given source text.
    pub fn newline_for(self, source: &str) -> &'static str {
        match self {
            NewlinePolicy::SameAsSource => detect_newline(source).unwrap_or(NEWLINE_DEFAULT),
            NewlinePolicy::Lf => NEWLINE_LF,
            NewlinePolicy::Crlf => NEWLINE_CRLF,
        }
    }
}

/// Looks at the first line break in `source`: a bare LF means LF, a CR means CRLF.
pub fn detect_newline(source: &str) -> Option<&'static str> {
    source.chars().find_map(|c| match c {
        '\n' => Some(NEWLINE_LF),
        '\r' => Some(NEWLINE_CRLF),
        _ => None,
    })
}

/// What to do with `{id:...}` references found inside plural-form values
/// (`msgid_plural` entries and `msgstr[n]` lines), which are never expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PluralPolicy {
    /// Report each one as a warning and leave it out of every count.
    #[default]
    Ignore,
    /// Treat the first one as a fatal error.
    Abort,
}

/// Options for [`crate::Preprocessor`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Options {
    pub newline: NewlinePolicy,
    /// Suppresses diagnostic output. The library never prints, so this is for
    /// the front end reading [`crate::Preprocessor::options`]; severity
    /// classification is unaffected.
    pub quiet: bool,
    /// Count references instead of expanding them. Read by the front end to
    /// choose between `process` and `count_references`.
    pub count_only: bool,
    /// Match `{id:...}` references against msgids case-sensitively.
    pub case_sensitive_ids: bool,
    /// Extra directories searched for `$include` targets, in order.
    pub include_dirs: Vec<PathBuf>,
    pub plural_policy: PluralPolicy,
    /// Whether file paths differing only by case name different files. Used to
    /// recognize an already-included file. See
    /// [`crate::source::probe_case_sensitive_filesystem`].
    pub case_sensitive_paths: bool,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            newline: NewlinePolicy::default(),
            quiet: false,
            count_only: false,
            case_sensitive_ids: false,
            include_dirs: Vec::new(),
            plural_policy: PluralPolicy::default(),
            case_sensitive_paths: !cfg!(any(windows, target_os = "macos")),
        }
    }
}

impl Options {
    /// Creates default options.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_newline(mut self, newline: NewlinePolicy) -> Self {
        self.newline = newline;
        self
    }

    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn with_count_only(mut self, count_only: bool) -> Self {
        self.count_only = count_only;
        self
    }

    pub fn with_case_sensitive_ids(mut self, case_sensitive_ids: bool) -> Self {
        self.case_sensitive_ids = case_sensitive_ids;
        self
    }

    /// Appends a directory to the end of the `$include` search path.
    pub fn with_include_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.include_dirs.push(dir.into());
        self
    }

    pub fn with_plural_policy(mut self, plural_policy: PluralPolicy) -> Self {
        self.plural_policy = plural_policy;
        self
    }

    pub fn with_case_sensitive_paths(mut self, case_sensitive_paths: bool) -> Self {
        self.case_sensitive_paths = case_sensitive_paths;
        self
    }
}
