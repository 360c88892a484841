//! Diagnostics collected during a preprocessing session, and the mapping of a
//! session's outcome onto the integer result shared with the command line.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational, never changes the result (e.g. a reference that could
    /// not be expanded; those are reported through the negative result).
    Info,
    /// Recoverable problem. The session continues, but the result becomes
    /// [`ErrorLevel::NonFatalError`].
    Warning,
    /// The session was aborted.
    Fatal,
}

impl Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Fatal => write!(f, "fatal"),
        }
    }
}

/// Where a diagnostic was raised: a 1-based line number, plus the included
/// file it belongs to (`None` for the main source).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub file: Option<String>,
    pub line: usize,
}

impl Location {
    pub fn main(line: usize) -> Self {
        Location { file: None, line }
    }

    pub fn included(file: impl Into<String>, line: usize) -> Self {
        Location {
            file: Some(file.into()),
            line,
        }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.file {
            Some(file) => write!(f, "line {} of {}", self.line, file),
            None => write!(f, "line {}", self.line),
        }
    }
}

/// A single message produced while preprocessing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    /// `None` when the problem is not tied to a line (or the line is unknown).
    #[serde(skip_serializing_if = "Option::is_none")]
    #[serde(default)]
    pub location: Option<Location>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(severity: Severity, location: Option<Location>, message: impl Into<String>) -> Self {
        Diagnostic {
            severity,
            location,
            message: message.into(),
        }
    }

    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }
}

impl Display for Diagnostic {
    /// Formats the diagnostic the way the command line prints it, e.g.
    /// `Error on line 7: Unexpected msgid`.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self.severity {
            Severity::Info => "Warning",
            Severity::Warning | Severity::Fatal => "Error",
        };
        match (&self.location, self.severity) {
            (Some(location), _) if location.line > 0 => {
                write!(f, "{} on {}: {}", label, location, self.message)
            }
            _ => write!(f, "{}: {}", label, self.message),
        }
    }
}

/// Result values shared with the command line. Negative results are not
/// listed here: `-N` means success with `N` unexpandable references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorLevel {
    Success = 0,
    FatalErrorInvalidArgs = 1,
    FatalErrorInternal = 2,
    NonFatalError = 3,
}

impl ErrorLevel {
    pub fn code(self) -> i32 {
        self as i32
    }
}

/// Sentinel returned by count mode when the source could not be parsed.
pub const COUNT_FAILED: i32 = -1;

/// Outcome of a successful [`crate::Preprocessor::process`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Report {
    /// References replaced by the value they named.
    pub expanded: usize,
    /// References still present after resolution (dangling or cyclic).
    pub unexpandable: usize,
    /// Non-fatal problems reported during the session.
    pub warnings: usize,
}

impl Report {
    /// Encodes the report as the integer result: warnings take precedence,
    /// then the negated unexpandable-reference count.
    pub fn error_level(&self) -> i32 {
        if self.warnings > 0 {
            ErrorLevel::NonFatalError.code()
        } else {
            -(i32::try_from(self.unexpandable).unwrap_or(i32::MAX))
        }
    }
}

/// Outcome of a successful [`crate::Preprocessor::count_references`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CountReport {
    /// Every recognizable reference found in entry values.
    pub references: usize,
    pub warnings: usize,
}

/// Maps the outcome of `process` onto the shared integer result.
pub fn error_level(result: &Result<Report, Error>) -> i32 {
    match result {
        Ok(report) => report.error_level(),
        Err(_) => ErrorLevel::FatalErrorInternal.code(),
    }
}

/// Maps the outcome of `count_references` onto the integer result: the count
/// itself, or [`COUNT_FAILED`].
pub fn count_result(result: &Result<CountReport, Error>) -> i32 {
    match result {
        Ok(report) => i32::try_from(report.references).unwrap_or(i32::MAX),
        Err(_) => COUNT_FAILED,
    }
}
