use tracing::debug;

use crate::{
    diagnostics::{Diagnostic, Location, Severity},
    error::Error,
    include::IncludedFiles,
    line::{LineRecord, Origin},
    options::Options,
    traits::SourceLoader,
};

/// State owned by one `process`/`count_references` call. Nothing in here
/// outlives the call except the diagnostics handed back to the caller.
pub(crate) struct Session<'a> {
    pub(crate) options: &'a Options,
    pub(crate) loader: &'a dyn SourceLoader,
    pub(crate) files: IncludedFiles,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Session<'a> {
    pub(crate) fn new(options: &'a Options, loader: &'a dyn SourceLoader) -> Self {
        Session {
            options,
            loader,
            files: IncludedFiles::new(options.case_sensitive_paths),
            diagnostics: Vec::new(),
        }
    }

    pub(crate) fn location(&self, line: &LineRecord) -> Location {
        match line.origin {
            Origin::Main => Location::main(line.number),
            Origin::Included(id) => match self.files.path(id) {
                Some(path) => Location::included(path.display().to_string(), line.number),
                None => Location::main(line.number),
            },
        }
    }

    /// Records a non-fatal problem.
    pub(crate) fn warn(&mut self, line: &LineRecord, message: impl Into<String>) {
        self.push(Severity::Warning, line, message.into());
    }

    /// Records a message that never affects the result.
    pub(crate) fn info(&mut self, line: &LineRecord, message: impl Into<String>) {
        self.push(Severity::Info, line, message.into());
    }

    /// Records a fatal problem and returns the error that aborts the session.
    pub(crate) fn fatal(&mut self, line: &LineRecord, message: impl Into<String>) -> Error {
        let message = message.into();
        self.push(Severity::Fatal, line, message.clone());
        Error::line(self.location(line), message)
    }

    /// Records an error that is not tied to a line (typically I/O).
    pub(crate) fn record_error(&mut self, error: &Error) {
        if !self
            .diagnostics
            .iter()
            .any(|d| d.severity == Severity::Fatal)
        {
            self.diagnostics
                .push(Diagnostic::new(Severity::Fatal, None, error.to_string()));
        }
    }

    pub(crate) fn warning_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_warning()).count()
    }

    pub(crate) fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    fn push(&mut self, severity: Severity, line: &LineRecord, message: String) {
        let location = (line.number > 0).then(|| self.location(line));
        debug!(%severity, line = line.number, message = %message, "diagnostic");
        self.diagnostics
            .push(Diagnostic::new(severity, location, message));
    }
}
