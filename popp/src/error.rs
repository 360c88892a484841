//! Fatal error types for the popp crate.
//!
//! A fatal error aborts the whole preprocessing session. Recoverable problems
//! are reported as [`crate::diagnostics::Diagnostic`]s instead and never show
//! up here.

use thiserror::Error;

use crate::diagnostics::Location;

#[derive(Error, Debug)]
pub enum Error {
    /// A fatal condition tied to a specific line of the source or of an
    /// included file.
    #[error("{location}: {message}")]
    Line { location: Location, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Creates a new line-scoped fatal error.
    pub fn line(location: Location, message: impl Into<String>) -> Self {
        Error::Line {
            location,
            message: message.into(),
        }
    }

    /// The location of the offending line, if the error has one.
    pub fn location(&self) -> Option<&Location> {
        match self {
            Error::Line { location, .. } => Some(location),
            Error::Io(_) => None,
        }
    }
}
