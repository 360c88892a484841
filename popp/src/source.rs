//! Reading source files from disk.

use std::{
    fs::File,
    io::{self, Read},
    path::{Path, PathBuf},
};

use tracing::debug;

use crate::traits::SourceLoader;

/// Loads `$include` targets from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLoader;

impl SourceLoader for FsLoader {
    fn locate(&self, candidate: &Path) -> Option<PathBuf> {
        if candidate.is_file() {
            std::fs::canonicalize(candidate).ok()
        } else {
            None
        }
    }

    fn load(&self, path: &Path) -> io::Result<String> {
        read_source(path)
    }
}

/// Reads a source file, honoring a UTF-8 or UTF-16 byte-order mark. Files
/// without a BOM must be UTF-8.
///
/// The file handle is dropped before this returns, on success or failure.
pub fn read_source<P: AsRef<Path>>(path: P) -> io::Result<String> {
    let file = File::open(path)?;
    let mut decoder = encoding_rs_io::DecodeReaderBytesBuilder::new()
        .bom_override(true)
        .build(file);

    let mut decoded = String::new();
    decoder.read_to_string(&mut decoded)?;
    Ok(decoded)
}

/// Decodes bytes that were already read (e.g. from stdin), stripping any BOM.
/// Invalid sequences are replaced rather than rejected.
pub fn decode_source(bytes: &[u8]) -> String {
    let (text, encoding, had_errors) = encoding_rs::UTF_8.decode(bytes);
    if had_errors {
        debug!(encoding = encoding.name(), "source contained malformed sequences");
    }
    text.into_owned()
}

/// Finds out whether file names that differ only by case name different
/// files, by creating a temporary file and checking for its case-flipped name.
///
/// Meant to run once at start-up; the answer goes into
/// [`crate::Options::case_sensitive_paths`]. Falls back to `false` if the
/// probe file can't be created.
pub fn probe_case_sensitive_filesystem() -> bool {
    let probe = match tempfile::Builder::new()
        .prefix("popp-case-probe-")
        .suffix("a")
        .tempfile()
    {
        Ok(probe) => probe,
        Err(e) => {
            debug!(error = %e, "could not create case-sensitivity probe file");
            return false;
        }
    };

    let Some(name) = probe.path().file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    let flipped = probe.path().with_file_name(name.to_uppercase());
    let case_sensitive = !flipped.exists();
    debug!(case_sensitive, "probed filesystem case sensitivity");
    case_sensitive
}
