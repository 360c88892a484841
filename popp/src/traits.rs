//! Traits at the boundary between the preprocessor and the filesystem.

use std::{
    io,
    path::{Path, PathBuf},
};

/// Finds and reads the files named by `$include` directives.
///
/// The default implementation is [`crate::source::FsLoader`]; tests or
/// embedders can supply their own.
///
/// # Example
///
/// ```rust,no_run
/// use popp::traits::SourceLoader;
/// use popp::source::FsLoader;
///
/// let loader = FsLoader;
/// if let Some(path) = loader.locate(std::path::Path::new("shared/names.po")) {
///     let text = loader.load(&path)?;
///     println!("{} bytes", text.len());
/// }
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub trait SourceLoader {
    /// Returns the canonical absolute path of `candidate` if it names an
    /// existing file.
    fn locate(&self, candidate: &Path) -> Option<PathBuf>;

    /// Reads a located file as text.
    fn load(&self, path: &Path) -> io::Result<String>;
}
