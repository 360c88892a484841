use std::{
    fs,
    io::{self, IsTerminal, Read, Write},
};

use clap::{CommandFactory, Parser, ValueEnum, error::ErrorKind};
use popp::{
    ErrorLevel, NewlinePolicy, Options, PluralPolicy, Preprocessor, count_result, error_level,
    probe_case_sensitive_filesystem,
    source::{decode_source, read_source},
};
use popp_cli::{
    report::{JsonReport, count_summary, print_diagnostics, process_summary},
    validation::{Input, Output, Task, plan_task, validate_include_directory},
};
use tracing::debug;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const AFTER_HELP: &str = r#"Brace notation:
    {id:msgid}
    {id:msgid-msgctxt}
    References can be escaped with a backslash, e.g. \{id:msgid} is ignored.

Include directives:
    $include "fileName.po"
    # $include "fileName.po"
    #.$include "fileName.po"

Plural forms are not supported: msgstr[n] lines cannot contain references, and
plural entries cannot be referenced.

Returns:
    0   success
    1   invalid arguments
    2   fatal error while preprocessing
    3   non-fatal errors were reported
    -N  success, but N references could not be expanded
With --count, the number of references found, or -1 on failure."#;

/// Expands .po msgstrs that reference other msgstr values via a curly brace
/// notation, for example {id:ProductName_short} is replaced with the msgstr
/// whose msgid is "ProductName_short".
#[derive(Parser, Debug)]
#[command(name = "popp", author, version, about, long_about = None, after_help = AFTER_HELP)]
struct Args {
    /// Source file. Reads stdin when omitted
    source: Option<String>,

    /// Destination file. Defaults to the source with a .po extension; `-` writes to stdout
    dest: Option<String>,

    /// Use LF for newlines
    #[arg(long = "nlf", visible_alias = "nl", overrides_with_all = ["crlf", "same_as_source"])]
    lf: bool,

    /// Use CRLF for newlines
    #[arg(long = "ncrlf", visible_alias = "nc", overrides_with_all = ["lf", "same_as_source"])]
    crlf: bool,

    /// [Default] Use the newlines of the source file
    #[arg(long = "nsource", visible_alias = "ns", overrides_with_all = ["lf", "crlf"])]
    same_as_source: bool,

    /// Match msgids inside references case-sensitively
    #[arg(short, long, visible_alias = "casesensitive")]
    sensitive: bool,

    /// Count the references in the source instead of expanding them. No output
    /// file is written and the count is the exit code
    #[arg(short, long)]
    count: bool,

    /// Add a directory to the end of the $include search path
    #[arg(
        short = 'i',
        long = "include-directory",
        visible_alias = "includedirectory",
        value_name = "DIR"
    )]
    include_directories: Vec<String>,

    /// What to do with references inside plural forms
    #[arg(long, value_enum, default_value_t = PluralReferences::Ignore)]
    plural_references: PluralReferences,

    /// Suppress error and info messages
    #[arg(short, long, visible_alias = "silent")]
    quiet: bool,

    /// Print a JSON report of the run to stderr
    #[arg(long)]
    json: bool,

    /// Log pipeline details to stderr (RUST_LOG overrides)
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PluralReferences {
    /// Report them as errors and leave them out of counts
    Ignore,
    /// Stop preprocessing
    Abort,
}

impl From<PluralReferences> for PluralPolicy {
    fn from(value: PluralReferences) -> Self {
        match value {
            PluralReferences::Ignore => PluralPolicy::Ignore,
            PluralReferences::Abort => PluralPolicy::Abort,
        }
    }
}

fn main() {
    std::process::exit(run());
}

fn run() -> i32 {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ErrorLevel::Success.code(),
                _ => ErrorLevel::FatalErrorInvalidArgs.code(),
            };
        }
    };

    init_tracing(args.verbose);

    let options = match build_options(&args) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("{}", e);
            return ErrorLevel::FatalErrorInvalidArgs.code();
        }
    };

    if args.source.is_none() && io::stdin().is_terminal() {
        // Nothing piped in and nothing named; there is nothing to do.
        let _ = Args::command().print_help();
        return ErrorLevel::FatalErrorInvalidArgs.code();
    }

    let task = match plan_task(
        args.source.as_deref(),
        args.dest.as_deref(),
        options.count_only,
    ) {
        Ok(task) => task,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ErrorLevel::FatalErrorInvalidArgs.code();
        }
    };
    debug!(?task, "planned task");

    let input = match read_input(&task.input) {
        Ok(input) => input,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ErrorLevel::FatalErrorInvalidArgs.code();
        }
    };

    if options.count_only {
        count(&args, options, &task, &input)
    } else {
        process(&args, options, &task, &input)
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn build_options(args: &Args) -> Result<Options, String> {
    let newline = if args.lf {
        NewlinePolicy::Lf
    } else if args.crlf {
        NewlinePolicy::Crlf
    } else {
        NewlinePolicy::SameAsSource
    };

    let mut options = Options::new()
        .with_newline(newline)
        .with_quiet(args.quiet)
        .with_count_only(args.count)
        .with_case_sensitive_ids(args.sensitive)
        .with_plural_policy(args.plural_references.into())
        .with_case_sensitive_paths(probe_case_sensitive_filesystem());

    for directory in &args.include_directories {
        options = options.with_include_dir(validate_include_directory(directory)?);
    }
    Ok(options)
}

fn read_input(input: &Input) -> io::Result<String> {
    match input {
        Input::Stdin => {
            let mut bytes = Vec::new();
            io::stdin().lock().read_to_end(&mut bytes)?;
            Ok(decode_source(&bytes))
        }
        Input::File(path) => read_source(path),
    }
}

fn process(args: &Args, options: Options, task: &Task, input: &str) -> i32 {
    let mut preprocessor = Preprocessor::new(options);
    let source_dir = task.source_dir();

    let mut buffer = Vec::new();
    let result = preprocessor.process(input, source_dir.as_deref(), &mut buffer);
    let mut code = error_level(&result);

    if !preprocessor.options().quiet {
        print_diagnostics(preprocessor.diagnostics());
        if let Ok(report) = &result {
            for line in process_summary(report) {
                eprintln!("{}", line);
            }
        }
    }

    // Only a successful session produces a destination file.
    if result.is_ok() {
        if let Err(e) = write_output(&task.output, &buffer) {
            eprintln!("Error: {}", e);
            code = ErrorLevel::FatalErrorInternal.code();
        }
    }

    if args.json {
        let report = result.as_ref().ok();
        eprintln!(
            "{}",
            JsonReport::from_process(code, report, preprocessor.diagnostics()).to_json()
        );
    }
    code
}

fn count(args: &Args, options: Options, task: &Task, input: &str) -> i32 {
    let mut preprocessor = Preprocessor::new(options);
    let source_dir = task.source_dir();

    let result = preprocessor.count_references(input, source_dir.as_deref());
    let code = count_result(&result);

    if !preprocessor.options().quiet {
        print_diagnostics(preprocessor.diagnostics());
        if let Ok(report) = &result {
            eprintln!("{}", count_summary(report));
        }
    }

    if args.json {
        let report = result.as_ref().ok();
        eprintln!(
            "{}",
            JsonReport::from_count(code, report, preprocessor.diagnostics()).to_json()
        );
    }
    code
}

fn write_output(output: &Output, text: &[u8]) -> io::Result<()> {
    match output {
        Output::Stdout => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(text)?;
            stdout.flush()
        }
        Output::File(path) => fs::write(path, text),
        Output::Discard => Ok(()),
    }
}
