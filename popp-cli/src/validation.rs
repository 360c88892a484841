use std::path::{Path, PathBuf};

/// Where the source text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Stdin,
    File(PathBuf),
}

/// Where the preprocessed text goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Stdout,
    File(PathBuf),
    /// Counting references writes nothing.
    Discard,
}

/// One source/destination pair, after the defaults have been applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub input: Input,
    pub output: Output,
}

impl Task {
    /// The directory `$include` targets are searched in first.
    pub fn source_dir(&self) -> Option<PathBuf> {
        match &self.input {
            Input::Stdin => None,
            Input::File(path) => path.parent().map(Path::to_path_buf),
        }
    }
}

/// Validate file path exists and is readable
pub fn validate_file_path(path: &str) -> Result<(), String> {
    let path_obj = Path::new(path);

    if !path_obj.exists() {
        return Err(format!("File does not exist: {}", path));
    }

    if !path_obj.is_file() {
        return Err(format!("Path is not a file: {}", path));
    }

    Ok(())
}

/// Validate an `--include-directory` argument, returning its absolute form.
pub fn validate_include_directory(directory: &str) -> Result<PathBuf, String> {
    let path = Path::new(directory);
    if !path.is_dir() {
        return Err(format!(
            "Argument error, could not find directory \"{}\"",
            directory
        ));
    }

    std::fs::canonicalize(path).map_err(|e| {
        format!(
            "Argument error, could not find directory \"{}\": {}",
            directory, e
        )
    })
}

/// Validate the directory an output file would be created in
pub fn validate_output_path(path: &Path) -> Result<(), String> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !parent.is_dir() => Err(format!(
            "Output directory does not exist: {}",
            parent.display()
        )),
        _ => Ok(()),
    }
}

/// The destination used when only a source is given: the source with a `.po`
/// extension.
pub fn default_destination(source: &Path) -> PathBuf {
    source.with_extension("po")
}

/// Apply the positional-argument rules:
///
/// - no source: stdin to stdout
/// - no destination: the source with a `.po` extension, which must differ from
///   the source unless only counting
/// - destination `-`: stdout
pub fn plan_task(
    source: Option<&str>,
    dest: Option<&str>,
    count_only: bool,
) -> Result<Task, String> {
    let Some(source) = source else {
        let output = if count_only {
            Output::Discard
        } else {
            Output::Stdout
        };
        return Ok(Task {
            input: Input::Stdin,
            output,
        });
    };

    validate_file_path(source)?;
    let input_path = absolute(Path::new(source))?;

    if count_only {
        return Ok(Task {
            input: Input::File(input_path),
            output: Output::Discard,
        });
    }

    let output = match dest {
        Some("-") => Output::Stdout,
        Some(dest) => {
            let dest_path = absolute(Path::new(dest))?;
            validate_output_path(&dest_path)?;
            Output::File(dest_path)
        }
        None => {
            let dest_path = default_destination(&input_path);
            if dest_path == input_path {
                return Err(concat!(
                    "When only a source file is provided, popp will assume a .po extension\n",
                    "for the output file, but this input file already has a .po extension.\n\n",
                    "If you want the output sent to stdout instead, then specify a hyphen (-)\n",
                    "as the output file."
                )
                .to_string());
            }
            Output::File(dest_path)
        }
    };

    if output == Output::File(input_path.clone()) {
        return Err(format!(
            "The output file would overwrite the source file: {}",
            input_path.display()
        ));
    }

    Ok(Task {
        input: Input::File(input_path),
        output,
    })
}

fn absolute(path: &Path) -> Result<PathBuf, String> {
    std::path::absolute(path).map_err(|e| format!("Invalid path {}: {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_validate_file_path() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("en.popp");
        fs::write(&file, "").unwrap();

        assert!(validate_file_path(file.to_str().unwrap()).is_ok());
        assert!(
            validate_file_path(temp_dir.path().to_str().unwrap())
                .unwrap_err()
                .starts_with("Path is not a file")
        );
        assert!(
            validate_file_path("/definitely/not/here.popp")
                .unwrap_err()
                .starts_with("File does not exist")
        );
    }

    #[test]
    fn test_validate_include_directory() {
        let temp_dir = TempDir::new().unwrap();
        let dir = validate_include_directory(temp_dir.path().to_str().unwrap()).unwrap();
        assert!(dir.is_absolute());

        let err = validate_include_directory("/definitely/not/here").unwrap_err();
        assert_eq!(
            err,
            "Argument error, could not find directory \"/definitely/not/here\""
        );
    }

    #[test]
    fn test_plan_without_source_uses_stdio() {
        let task = plan_task(None, None, false).unwrap();
        assert_eq!(task.input, Input::Stdin);
        assert_eq!(task.output, Output::Stdout);
        assert_eq!(task.source_dir(), None);

        assert_eq!(plan_task(None, None, true).unwrap().output, Output::Discard);
    }

    #[test]
    fn test_plan_default_destination() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("en.popp");
        fs::write(&source, "").unwrap();

        let task = plan_task(source.to_str(), None, false).unwrap();
        assert_eq!(task.output, Output::File(temp_dir.path().join("en.po")));
        assert_eq!(task.source_dir().as_deref(), Some(temp_dir.path()));
    }

    #[test]
    fn test_plan_rejects_po_source_without_destination() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("en.po");
        fs::write(&source, "").unwrap();

        assert!(plan_task(source.to_str(), None, false).is_err());
        // Counting never writes, so the same name is fine.
        assert!(plan_task(source.to_str(), None, true).is_ok());
        // A hyphen sends the output to stdout.
        let task = plan_task(source.to_str(), Some("-"), false).unwrap();
        assert_eq!(task.output, Output::Stdout);
    }

    #[test]
    fn test_plan_rejects_missing_output_directory() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("en.popp");
        fs::write(&source, "").unwrap();
        let dest = temp_dir.path().join("missing").join("en.po");

        let err = plan_task(source.to_str(), dest.to_str(), false).unwrap_err();
        assert!(err.starts_with("Output directory does not exist"));
    }

    #[test]
    fn test_plan_rejects_overwriting_source() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("en.popp");
        fs::write(&source, "").unwrap();

        assert!(plan_task(source.to_str(), source.to_str(), false).is_err());
    }
}
