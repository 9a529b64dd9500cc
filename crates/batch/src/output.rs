use std::path::PathBuf;

use lector_core::{ExtractError, SupportedFile};

/// Write `text` beside the source as `<stem>.txt`, replacing any previous run's output.
pub fn write_output(file: &SupportedFile, text: &str) -> Result<PathBuf, ExtractError> {
    let path = file.output_path();
    std::fs::write(&path, text.as_bytes())
        .map_err(|source| ExtractError::WriteFailed { path: path.clone(), source })?;
    Ok(path)
}
