//! `$include` expansion.
//!
//! The main source and every file it includes are classified line by line, and
//! each include directive is replaced by the classified lines of the file it
//! names. The result is one flat sequence in which every line still knows the
//! file it came from.

use std::path::{Path, PathBuf};

use tracing::{debug, trace};

use crate::{
    error::Error,
    line::{FileId, LineKind, LineRecord, Origin, classify, include_target},
    session::Session,
};

/// Nesting limit for includes. Cycles are detected separately, so this only
/// bounds pathological but acyclic include chains. Directives past the limit
/// are kept verbatim.
pub const MAX_INCLUDE_DEPTH: usize = 30;

/// Append-only table of the files included during one session.
#[derive(Debug, Clone, Default)]
pub struct IncludedFiles {
    paths: Vec<PathBuf>,
    case_sensitive: bool,
}

impl IncludedFiles {
    pub fn new(case_sensitive: bool) -> Self {
        IncludedFiles {
            paths: Vec::new(),
            case_sensitive,
        }
    }

    /// Returns the id of `path`, adding it to the table if it is new.
    pub fn id_of(&mut self, path: &Path) -> FileId {
        match self.find(path) {
            Some(id) => id,
            None => {
                self.paths.push(path.to_path_buf());
                FileId(self.paths.len() - 1)
            }
        }
    }

    /// Looks a path up without adding it.
    pub fn find(&self, path: &Path) -> Option<FileId> {
        // Normally only a handful of entries, so a linear scan is fine.
        self.paths
            .iter()
            .position(|known| self.same_path(known, path))
            .map(FileId)
    }

    pub fn path(&self, id: FileId) -> Option<&Path> {
        self.paths.get(id.0).map(PathBuf::as_path)
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.paths.iter().map(PathBuf::as_path)
    }

    fn same_path(&self, a: &Path, b: &Path) -> bool {
        if self.case_sensitive {
            a == b
        } else {
            a.to_string_lossy().to_lowercase() == b.to_string_lossy().to_lowercase()
        }
    }
}

/// Classifies `text` (the main source) and expands its includes.
///
/// `source_dir` is the directory of the main source, when it came from a file.
pub(crate) fn expand(
    session: &mut Session<'_>,
    text: &str,
    source_dir: Option<&Path>,
) -> Result<Vec<LineRecord>, Error> {
    let mut lines = Vec::new();
    let mut stack = Vec::new();
    expand_into(
        session,
        text,
        Origin::Main,
        source_dir,
        None,
        &mut stack,
        &mut lines,
    )?;
    debug!(
        lines = lines.len(),
        included_files = session.files.len(),
        "include expansion finished"
    );
    Ok(lines)
}

fn expand_into(
    session: &mut Session<'_>,
    text: &str,
    origin: Origin,
    source_dir: Option<&Path>,
    current_dir: Option<&Path>,
    stack: &mut Vec<FileId>,
    out: &mut Vec<LineRecord>,
) -> Result<(), Error> {
    for (index, raw) in text.lines().enumerate() {
        let mut record = LineRecord::new(LineKind::Comment, index + 1, origin, raw);
        match classify(raw) {
            Some(kind) => record.kind = kind,
            None => session.warn(&record, "Could not determine the line type"),
        }

        if record.kind != LineKind::Include {
            out.push(record);
            continue;
        }

        if stack.len() >= MAX_INCLUDE_DEPTH {
            debug!(
                line = record.number,
                depth = stack.len(),
                "include depth limit reached, leaving directive unexpanded"
            );
            out.push(record);
            continue;
        }

        let Some(name) = include_target(&record.text) else {
            return Err(session.fatal(
                &record,
                "Malformed $include directive, expected a quoted file name",
            ));
        };

        let Some(path) = locate(session, name, source_dir, current_dir) else {
            return Err(session.fatal(
                &record,
                format!("Could not find the $include file \"{}\"", name),
            ));
        };

        let id = session.files.id_of(&path);
        if stack.contains(&id) {
            return Err(session.fatal(
                &record,
                format!("Recursive $include of \"{}\"", path.display()),
            ));
        }

        let included = match session.loader.load(&path) {
            Ok(included) => included,
            Err(e) => {
                return Err(session.fatal(
                    &record,
                    format!("Could not read the $include file \"{}\": {}", path.display(), e),
                ));
            }
        };

        debug!(file = %path.display(), id = %id, depth = stack.len() + 1, "including file");
        stack.push(id);
        let result = expand_into(
            session,
            &included,
            Origin::Included(id),
            source_dir,
            path.parent(),
            stack,
            out,
        );
        stack.pop();
        result?;
    }
    Ok(())
}

/// Search order: the main source's directory, the including file's directory
/// (for nested includes), the working directory, then the configured include
/// directories.
fn locate(
    session: &Session<'_>,
    name: &str,
    source_dir: Option<&Path>,
    current_dir: Option<&Path>,
) -> Option<PathBuf> {
    let mut candidates: Vec<PathBuf> = Vec::new();
    if let Some(dir) = source_dir {
        candidates.push(dir.join(name));
    }
    if let Some(dir) = current_dir {
        candidates.push(dir.join(name));
    }
    candidates.push(PathBuf::from(name));
    candidates.extend(session.options.include_dirs.iter().map(|dir| dir.join(name)));

    candidates.into_iter().find_map(|candidate| {
        trace!(candidate = %candidate.display(), "probing include candidate");
        session.loader.locate(&candidate)
    })
}
