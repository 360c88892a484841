use indoc::indoc;
use std::fs;
use std::path::Path;
use std::process::{Command, Output, Stdio};
use tempfile::TempDir;

fn popp_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("popp"))
}

/// The status a process exiting with `code` reports on this platform.
fn status_of(code: i32) -> i32 {
    if cfg!(windows) { code } else { code & 0xff }
}

fn run(dir: &Path, args: &[&str]) -> Output {
    popp_cmd()
        .current_dir(dir)
        .args(args)
        .stdin(Stdio::null())
        .output()
        .unwrap()
}

const SOURCE: &str = indoc! {r#"
    msgid "product"
    msgstr "Popp"

    msgid "title"
    msgstr "Welcome to {id:product}"
"#};

const EXPANDED: &str = indoc! {r#"
    msgid "product"
    msgstr "Popp"

    msgid "title"
    msgstr "Welcome to Popp"
"#};

#[test]
fn test_expand_to_default_destination() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("en.popp"), SOURCE).unwrap();

    let output = run(temp_dir.path(), &["en.popp"]);

    assert!(
        output.status.success(),
        "CLI failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let written = fs::read_to_string(temp_dir.path().join("en.po")).unwrap();
    assert_eq!(written, EXPANDED);

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Done - Expanded 1 references"));
}

#[test]
fn test_expand_to_named_destination() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("en.popp"), SOURCE).unwrap();

    let output = run(temp_dir.path(), &["en.popp", "out.po"]);

    assert!(output.status.success());
    assert_eq!(
        fs::read_to_string(temp_dir.path().join("out.po")).unwrap(),
        EXPANDED
    );
    assert!(!temp_dir.path().join("en.po").exists());
}

#[test]
fn test_hyphen_destination_writes_stdout() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("en.po"), SOURCE).unwrap();

    let output = run(temp_dir.path(), &["en.po", "-"]);

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), EXPANDED);
}

#[test]
fn test_po_source_without_destination_is_invalid() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("en.po"), SOURCE).unwrap();

    let output = run(temp_dir.path(), &["en.po"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("specify a hyphen (-)"));
}

#[test]
fn test_stdin_to_stdout() {
    let mut child = popp_cmd()
        .args(["--nlf"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    {
        use std::io::Write;
        let mut stdin = child.stdin.take().unwrap();
        stdin.write_all(SOURCE.as_bytes()).unwrap();
    }
    let output = child.wait_with_output().unwrap();

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), EXPANDED);
}

#[test]
fn test_unexpandable_reference_exit_code() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("en.popp"),
        "msgid \"a\"\nmsgstr \"{id:B}\"\n\nmsgid \"b\"\nmsgstr \"B\"\n",
    )
    .unwrap();

    let output = run(temp_dir.path(), &["--sensitive", "en.popp"]);
    assert_eq!(output.status.code(), Some(status_of(-1)));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Warning on line 2: Could not resolve reference \"B\""));
    assert!(stderr.contains("Failed to expand 1 references"));
    // Unexpandable references still produce output.
    assert!(temp_dir.path().join("en.po").exists());
}

#[test]
fn test_fatal_error_writes_no_destination() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("en.popp"),
        "msgid \"a\"\nmsgstr \"b\"\n\n$include \"missing.po\"\n",
    )
    .unwrap();

    let output = run(temp_dir.path(), &["en.popp"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(!temp_dir.path().join("en.po").exists());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Error on line 4: Could not find the $include file \"missing.po\""));
}

#[test]
fn test_warnings_exit_code_and_quiet() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("en.popp"),
        "msgid \"a\"\nmsgid \"b\"\nmsgstr \"B\"\n",
    )
    .unwrap();

    let output = run(temp_dir.path(), &["en.popp"]);
    assert_eq!(output.status.code(), Some(3));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error on line 2: Unexpected msgid"));

    let output = run(temp_dir.path(), &["-q", "en.popp", "quiet.po"]);
    assert_eq!(output.status.code(), Some(3));
    assert!(output.stderr.is_empty());
    assert!(temp_dir.path().join("quiet.po").exists());
}

#[test]
fn test_count_references() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("en.po"),
        "msgid \"a\"\nmsgstr \"{id:b} {id:c} \\{id:d}\"\n",
    )
    .unwrap();

    let output = run(temp_dir.path(), &["--count", "en.po"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&output.stderr).contains("2 references were found."));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_silent_count_prints_nothing() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("en.po"),
        "msgid \"a\"\nmsgstr \"{id:b}\"\nstray line\n",
    )
    .unwrap();

    let output = run(temp_dir.path(), &["--silent", "--count", "en.po"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stderr.is_empty());
    assert!(output.stdout.is_empty());
}

#[test]
fn test_count_with_plural_abort() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("en.po"),
        indoc! {r#"
            msgid "file"
            msgid_plural "files"
            msgstr[0] "{id:one}"
            msgstr[1] "{id:many}"
        "#},
    )
    .unwrap();

    let output = run(temp_dir.path(), &["-c", "en.po"]);
    assert_eq!(output.status.code(), Some(0));

    let output = run(
        temp_dir.path(),
        &["-c", "--plural-references", "abort", "en.po"],
    );
    assert_eq!(output.status.code(), Some(status_of(-1)));
}

#[test]
fn test_include_directory_option() {
    let temp_dir = TempDir::new().unwrap();
    let shared = temp_dir.path().join("shared");
    fs::create_dir(&shared).unwrap();
    fs::write(shared.join("names.po"), "msgid \"product\"\nmsgstr \"Popp\"\n").unwrap();

    let src = temp_dir.path().join("src");
    fs::create_dir(&src).unwrap();
    fs::write(
        src.join("en.popp"),
        "$include \"names.po\"\n\nmsgid \"t\"\nmsgstr \"{id:product}\"\n",
    )
    .unwrap();

    let output = run(
        temp_dir.path(),
        &["-i", "shared", "src/en.popp", "-"],
    );

    assert!(
        output.status.success(),
        "CLI failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "msgid \"product\"\nmsgstr \"Popp\"\n\nmsgid \"t\"\nmsgstr \"Popp\"\n"
    );
}

#[test]
fn test_missing_include_directory_is_invalid() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("en.popp"), SOURCE).unwrap();

    let output = run(temp_dir.path(), &["-i", "nowhere", "en.popp"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(
        String::from_utf8_lossy(&output.stderr)
            .contains("Argument error, could not find directory \"nowhere\"")
    );
}

#[test]
fn test_newline_options() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("en.popp"), SOURCE).unwrap();

    let output = run(temp_dir.path(), &["--ncrlf", "en.popp", "-"]);
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        EXPANDED.replace('\n', "\r\n")
    );

    // The last newline option wins.
    let output = run(temp_dir.path(), &["--nc", "--ns", "en.popp", "-"]);
    assert_eq!(String::from_utf8_lossy(&output.stdout), EXPANDED);
}

#[test]
fn test_json_report() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("en.popp"), SOURCE).unwrap();

    let output = run(temp_dir.path(), &["--json", "-q", "en.popp"]);
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stderr).unwrap();
    assert_eq!(value["result"], 0);
    assert_eq!(value["expanded"], 1);
    assert_eq!(value["diagnostics"].as_array().unwrap().len(), 0);
}

#[test]
fn test_unknown_option_is_invalid() {
    let temp_dir = TempDir::new().unwrap();
    let output = run(temp_dir.path(), &["--bogus"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_help_and_version_succeed() {
    let temp_dir = TempDir::new().unwrap();

    let output = run(temp_dir.path(), &["--help"]);
    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("{id:msgid-msgctxt}"));
    assert!(stdout.contains("--include-directory"));

    let output = run(temp_dir.path(), &["--version"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).starts_with("popp "));
}
