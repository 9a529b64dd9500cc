use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{error, info, warn};

use lector_core::{ExtractError, SupportedFile};

use crate::extract::Extractor;
use crate::logging::LogContext;
use crate::output::write_output;
use crate::progress::Progress;

/// What happened to one file: the written `.txt` path, or why it failed.
#[derive(Debug)]
pub struct FileOutcome {
    pub source: PathBuf,
    pub result: Result<PathBuf, ExtractError>,
}

impl FileOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailedFile {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failures: Vec<FailedFile>,
}

impl BatchSummary {
    pub fn record(&mut self, outcome: &FileOutcome) {
        self.total += 1;
        match &outcome.result {
            Ok(_) => self.succeeded += 1,
            Err(e) => self.failures.push(FailedFile { path: outcome.source.clone(), reason: e.to_string() }),
        }
    }

    pub fn all_succeeded(&self) -> bool {
        self.succeeded == self.total
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} succeeded", self.succeeded, self.total)
    }
}

/// Immediate children of `dir` that are regular files with a supported
/// extension, sorted by file name. Nothing is read beyond directory metadata.
pub fn discover(dir: &Path) -> Result<Vec<SupportedFile>, ExtractError> {
    if !dir.exists() {
        return Err(ExtractError::PathNotFound(dir.to_path_buf()));
    }
    if !dir.is_dir() {
        return Err(ExtractError::NotADirectory(dir.to_path_buf()));
    }
    let unreadable = |source| ExtractError::DirectoryUnreadable { path: dir.to_path_buf(), source };

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(unreadable)? {
        let path = entry.map_err(unreadable)?.path();
        // `is_file` follows symlinks, so a link to a scan is processed like the scan.
        if !path.is_file() {
            continue;
        }
        if let Ok(file) = SupportedFile::new(path) {
            files.push(file);
        }
    }
    files.sort_by(|a, b| a.path().file_name().cmp(&b.path().file_name()));
    Ok(files)
}

/// Sequential driver: one file at a time, failures recorded and skipped.
pub struct BatchDriver {
    extractor: Extractor,
}

impl BatchDriver {
    pub fn new(extractor: Extractor) -> Self {
        Self { extractor }
    }

    /// Process every supported file directly inside `dir`.
    ///
    /// Only run-level problems (missing or unreadable directory) are returned
    /// as `Err`; per-file failures end up in the summary and the log.
    pub fn run(
        &self,
        dir: &Path,
        log: &LogContext,
        progress: &mut dyn Progress,
    ) -> Result<BatchSummary, ExtractError> {
        log.scope(|| {
            info!("Processing folder: {}", dir.display());
            let files = discover(dir).inspect_err(|e| error!("{e}"))?;
            if files.is_empty() {
                warn!("No supported files found in {}", dir.display());
            } else {
                info!("Found {} file(s) to process", files.len());
            }

            let total = files.len();
            let mut summary = BatchSummary::default();
            for (i, file) in files.iter().enumerate() {
                let index = i + 1;
                progress.started(index, total, file);
                info!("[{index}/{total}] Processing: {}", file.file_name());
                let outcome = self.process_logged(file);
                progress.finished(index, total, file, outcome.is_success());
                summary.record(&outcome);
            }

            info!("Completed: {summary}");
            Ok(summary)
        })
    }

    /// Extract and write a single file.
    pub fn process_file(&self, file: &SupportedFile, log: &LogContext) -> FileOutcome {
        log.scope(|| {
            info!("Processing file: {}", file.path().display());
            self.process_logged(file)
        })
    }

    /// Like [`process_file`](Self::process_file) for an arbitrary path; an
    /// unsupported extension becomes a logged, failed outcome.
    pub fn process_path(&self, path: &Path, log: &LogContext) -> FileOutcome {
        match SupportedFile::new(path) {
            Ok(file) => self.process_file(&file, log),
            Err(e) => {
                log.scope(|| error!("Failed: {} - {e}", path.display()));
                FileOutcome { source: path.to_path_buf(), result: Err(e) }
            }
        }
    }

    fn process_logged(&self, file: &SupportedFile) -> FileOutcome {
        let result = self
            .extractor
            .extract(file)
            .and_then(|text| write_output(file, &text));
        match &result {
            Ok(out) => info!("Success: {} -> {}", file.file_name(), out.display()),
            Err(e) => error!("Failed: {} - {e}", file.file_name()),
        }
        FileOutcome { source: file.path().to_path_buf(), result }
    }
}
