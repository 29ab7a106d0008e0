use std::io::IsTerminal as _;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

use oas_combine::Document;
use oas_combine::Error;
use oas_combine::config::ProjectConfig;

/// Command-line arguments.
#[derive(Parser)]
#[command(
    name = "oas-combine",
    version,
    about = "Resolve $ref references and combine a multi-file OpenAPI YAML document"
)]
struct Cli {
    /// Replace local refs with the content they point at.
    #[arg(long)]
    inline_local: bool,

    /// Input YAML file. Its directory becomes the base for relative refs.
    /// Reads standard input when omitted.
    #[arg(short, long, value_name = "FILE")]
    input_file: Option<PathBuf>,

    /// Keep the original objects of inlined local refs. Only meaningful
    /// together with --inline-local.
    #[arg(long)]
    keep_local: bool,

    /// Output YAML file. Writes standard output when omitted.
    #[arg(short, long, value_name = "FILE")]
    output_file: Option<PathBuf>,

    /// Base directory for relative refs when reading standard input.
    /// Defaults to the current working directory.
    #[arg(long, value_name = "DIR")]
    ref_dir: Option<PathBuf>,
}

/// Which step of a run failed. Each maps to its own exit code.
#[derive(Debug, Clone, Copy)]
enum Stage {
    /// Loading `.oas-combine.toml`.
    Config,
    /// Reading the input file.
    InputFile,
    /// Reading standard input.
    InputStdin,
    /// Turning the output path into an absolute path.
    OutputFile,
    /// Writing standard output.
    OutputStdout,
    /// Writing the output file.
    OutputWrite,
    /// Finding the working directory.
    RefDir,
    /// Resolving references.
    Resolve,
    /// Parsing the root document.
    RootDocument,
}

impl Stage {
    /// Process exit code reported for a failure at this stage.
    const fn exit_code(self) -> u8 {
        return match self {
            Stage::InputFile => 11,
            Stage::InputStdin => 12,
            Stage::RefDir => 13,
            Stage::Config => 14,
            Stage::OutputFile => 21,
            Stage::OutputWrite => 22,
            Stage::OutputStdout => 23,
            Stage::RootDocument => 31,
            Stage::Resolve => 32,
        };
    }

    /// Stage for a failed read: parse errors belong to the root document,
    /// everything else to the input source.
    const fn reading(error: &Error, source: Self) -> Self {
        return if matches!(error, Error::Deserialize { .. }) { Stage::RootDocument } else { source };
    }
}

/// A failed run: the stage plus the error that stopped it.
struct Failure {
    /// What went wrong.
    error: Error,
    /// Where it went wrong.
    stage: Stage,
}

/// Attach a stage to a fallible step.
trait AtStage<T> {
    /// Tag the error, if any, with `stage`.
    fn at(self, stage: Stage) -> Result<T, Failure>;
}

impl<T> AtStage<T> for Result<T, Error> {
    fn at(self, stage: Stage) -> Result<T, Failure> {
        return self.map_err(|error| return Failure { error, stage });
    }
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| return "oas_combine=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(std::io::stderr().is_terminal()),
        )
        .init();

    let cli = Cli::parse();

    return match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(failure) => {
            eprintln!("error: {}", failure.error);
            ExitCode::from(failure.stage.exit_code())
        },
    };
}

/// Read, resolve, and write one document.
fn run(cli: &Cli) -> Result<(), Failure> {
    let cwd = std::env::current_dir().map_err(Error::Io).at(Stage::RefDir)?;
    let project = ProjectConfig::load(&cwd).at(Stage::Config)?;
    let config = project.resolve_config(cli.inline_local, cli.keep_local);
    if config.keep_local && !config.inline_local {
        tracing::warn!("--keep-local has no effect without --inline-local");
    }

    let mut document = match &cli.input_file {
        Some(path) => read_input_file(path)?,
        None => {
            let ref_dir = cli.ref_dir.clone().or(project.ref_dir).unwrap_or(cwd);
            Document::read(std::io::stdin().lock(), ref_dir).map_err(|error| {
                let stage = Stage::reading(&error, Stage::InputStdin);
                return Failure { error, stage };
            })?
        },
    };

    oas_combine::resolve(&mut document, &config).at(Stage::Resolve)?;

    match &cli.output_file {
        Some(path) => {
            let absolute = std::path::absolute(path).map_err(Error::Io).at(Stage::OutputFile)?;
            document.write_file(&absolute).at(Stage::OutputWrite)?;
            eprintln!("Wrote output YAML file to {}", absolute.display());
        },
        None => document.write(std::io::stdout().lock()).at(Stage::OutputStdout)?,
    }

    return Ok(());
}

/// Read the root document from a file, separating path problems from parse problems.
fn read_input_file(path: &Path) -> Result<Document, Failure> {
    return Document::read_file(path).map_err(|error| {
        let stage = Stage::reading(&error, Stage::InputFile);
        return Failure { error, stage };
    });
}
