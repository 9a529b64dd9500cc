use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info};

use lector_batch::{BatchDriver, ConsoleProgress, Extractor, LogContext, NoProgress, Progress};
use lector_core::{tool_version, Capabilities, Settings};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunStatus {
    /// Normal completion, including batches with per-file failures.
    Completed,
    InputNotFound,
    MissingDependency,
}

impl RunStatus {
    fn exit_code(self) -> ExitCode {
        match self {
            RunStatus::Completed => ExitCode::SUCCESS,
            RunStatus::InputNotFound => ExitCode::from(1),
            RunStatus::MissingDependency => ExitCode::from(2),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "lector")]
#[command(about = "Extract text from images and PDFs into sibling .txt files")]
#[command(version)]
struct Cli {
    /// Input file or folder path
    input: PathBuf,
    /// Also write log lines to this file (appended)
    #[arg(long, value_name = "PATH")]
    log: Option<PathBuf>,
    /// Disable the progress bar
    #[arg(long)]
    no_progress: bool,
    /// Settings file (TOML)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Tesseract language code(s), e.g. `eng+deu`
    #[arg(long)]
    lang: Option<String>,
    /// Log debug detail
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let mut log = LogContext::builder().filter(if cli.verbose { "debug" } else { "info" });
    if let Some(path) = &cli.log {
        log = log.file(path);
    }
    let log = log.build().context("failed to set up logging")?;

    let settings = load_settings(&cli)?;
    Ok(run(&cli, &settings, &log).exit_code())
}

fn load_settings(cli: &Cli) -> Result<Settings> {
    let mut settings = match &cli.config {
        Some(path) => Settings::load(path)
            .with_context(|| format!("failed to load settings from {}", path.display()))?,
        None => Settings::default(),
    };
    if let Some(lang) = &cli.lang {
        settings.ocr.language = lang.clone();
    }
    Ok(settings)
}

fn run(cli: &Cli, settings: &Settings, log: &LogContext) -> RunStatus {
    let caps = Capabilities::probe(settings);
    let extractor = match Extractor::from_capabilities(&caps, settings) {
        Ok(extractor) => extractor,
        Err(e) => {
            log.scope(|| error!("{e}"));
            return RunStatus::MissingDependency;
        }
    };
    if let Some(version) = caps.tesseract.path().and_then(tool_version) {
        log.scope(|| info!("Using {version}"));
    }
    run_with(cli, extractor, log)
}

/// Everything after the dependency check: dispatch on the input path.
fn run_with(cli: &Cli, extractor: Extractor, log: &LogContext) -> RunStatus {
    let driver = BatchDriver::new(extractor);
    let input = &cli.input;

    if input.is_file() {
        driver.process_path(input, log);
    } else if input.is_dir() {
        let mut quiet = NoProgress;
        let mut console;
        let progress: &mut dyn Progress = if cli.no_progress {
            &mut quiet
        } else {
            console = ConsoleProgress::stderr();
            &mut console
        };
        // Per-file failures stay in the log. An error here means the folder
        // vanished or could not be listed, which the driver already logged.
        if driver.run(input, log, progress).is_err() {
            return RunStatus::InputNotFound;
        }
    } else {
        log.scope(|| error!("Input path not found: {}", input.display()));
        return RunStatus::InputNotFound;
    }

    RunStatus::Completed
}
