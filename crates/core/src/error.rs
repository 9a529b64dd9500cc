use std::path::PathBuf;
use thiserror::Error;

use crate::capability::MissingTool;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Required tools are unavailable: {}", format_missing(.0))]
    DependencyUnavailable(Vec<MissingTool>),
    #[error("Input path not found: {}", .0.display())]
    PathNotFound(PathBuf),
    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),
    #[error("Cannot read directory {}: {source}", path.display())]
    DirectoryUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Unsupported file type: {}", .0.display())]
    UnsupportedType(PathBuf),
    #[error("Extraction failed for {}: {source}", path.display())]
    ExtractionFailed {
        path: PathBuf,
        #[source]
        source: BoxError,
    },
    #[error("Could not write {}: {source}", path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ExtractError {
    pub fn extraction(path: impl Into<PathBuf>, source: impl Into<BoxError>) -> Self {
        ExtractError::ExtractionFailed { path: path.into(), source: source.into() }
    }
}

fn format_missing(tools: &[MissingTool]) -> String {
    tools.iter().map(|t| t.to_string()).collect::<Vec<_>>().join("; ")
}
