//! The `Preprocessor` façade: runs the whole pipeline for one source.

use std::{io::Write, path::Path};

use tracing::{debug, info};

use crate::{
    diagnostics::{CountReport, Diagnostic, Report},
    entry::build_entries,
    error::Error,
    include::expand,
    options::Options,
    output::reconstruct,
    reference::count_references,
    resolve::resolve,
    session::Session,
    source::FsLoader,
    traits::SourceLoader,
};

/// Expands `{id:...}` references and `$include` directives in PO sources.
///
/// Each call to [`process`](Self::process) or
/// [`count_references`](Self::count_references) is an independent session; the
/// diagnostics of the most recent one stay available through
/// [`diagnostics`](Self::diagnostics), whether it succeeded or not.
///
/// # Example
///
/// ```rust
/// use popp::{Options, Preprocessor};
///
/// let source = "msgid \"a\"\nmsgstr \"{id:b}\"\n\nmsgid \"b\"\nmsgstr \"B\"\n";
/// let mut output = Vec::new();
///
/// let mut preprocessor = Preprocessor::new(Options::default());
/// let report = preprocessor.process(source, None, &mut output)?;
///
/// assert_eq!(report.expanded, 1);
/// assert_eq!(
///     String::from_utf8(output)?,
///     "msgid \"a\"\nmsgstr \"B\"\n\nmsgid \"b\"\nmsgstr \"B\"\n"
/// );
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Preprocessor {
    options: Options,
    loader: Box<dyn SourceLoader>,
    diagnostics: Vec<Diagnostic>,
}

impl Preprocessor {
    /// Creates a preprocessor that reads `$include` targets from disk.
    pub fn new(options: Options) -> Self {
        Self::with_loader(options, FsLoader)
    }

    /// Creates a preprocessor with a custom include loader.
    pub fn with_loader(options: Options, loader: impl SourceLoader + 'static) -> Self {
        Preprocessor {
            options,
            loader: Box::new(loader),
            diagnostics: Vec::new(),
        }
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Diagnostics of the most recent session.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Preprocesses `input` and writes the result to `output`.
    ///
    /// `source_dir` is the directory of the input file, searched first for
    /// `$include` targets. Nothing is written if the session fails.
    pub fn process<W: Write>(
        &mut self,
        input: &str,
        source_dir: Option<&Path>,
        mut output: W,
    ) -> Result<Report, Error> {
        let mut session = Session::new(&self.options, self.loader.as_ref());
        let result = run_process(&mut session, input, source_dir).and_then(|(report, text)| {
            output.write_all(text.as_bytes())?;
            output.flush()?;
            Ok(report)
        });
        if let Err(e) = &result {
            session.record_error(e);
        }
        self.diagnostics = session.into_diagnostics();
        result
    }

    /// Counts the references in `input` (after include expansion) without
    /// expanding them.
    pub fn count_references(
        &mut self,
        input: &str,
        source_dir: Option<&Path>,
    ) -> Result<CountReport, Error> {
        let mut session = Session::new(&self.options, self.loader.as_ref());
        let result = run_count(&mut session, input, source_dir);
        if let Err(e) = &result {
            session.record_error(e);
        }
        self.diagnostics = session.into_diagnostics();
        result
    }
}

fn run_process(
    session: &mut Session<'_>,
    input: &str,
    source_dir: Option<&Path>,
) -> Result<(Report, String), Error> {
    let lines = expand(session, input, source_dir)?;
    let mut entries = build_entries(session, &lines)?;

    let resolution = resolve(&mut entries);
    for unexpanded in &resolution.unexpanded {
        let origin = &entries[unexpanded.entry].origin;
        session.info(
            origin,
            format!("Could not resolve reference \"{}\"", unexpanded.id),
        );
    }

    let newline = session.options.newline.newline_for(input);
    let text = reconstruct(&lines, &entries, newline);

    let report = Report {
        expanded: resolution.expanded,
        unexpandable: resolution.unexpanded.len(),
        warnings: session.warning_count(),
    };
    info!(
        expanded = report.expanded,
        unexpandable = report.unexpandable,
        warnings = report.warnings,
        "preprocessing finished"
    );
    Ok((report, text))
}

fn run_count(
    session: &mut Session<'_>,
    input: &str,
    source_dir: Option<&Path>,
) -> Result<CountReport, Error> {
    let lines = expand(session, input, source_dir)?;
    let entries = build_entries(session, &lines)?;

    let references = entries
        .iter()
        .map(|entry| count_references(&entry.value))
        .sum();
    debug!(references, "counted references");

    Ok(CountReport {
        references,
        warnings: session.warning_count(),
    })
}
