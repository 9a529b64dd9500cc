use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::ExtractError;

/// Extensions routed to OCR. Matched case-insensitively.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff"];

pub const PDF_EXTENSION: &str = "pdf";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    Image,
    Pdf,
}

impl FileKind {
    /// Classify a path by its extension. `None` for anything unsupported.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        if ext == PDF_EXTENSION {
            Some(FileKind::Pdf)
        } else if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Some(FileKind::Image)
        } else {
            None
        }
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileKind::Image => write!(f, "image"),
            FileKind::Pdf => write!(f, "pdf"),
        }
    }
}

/// A path whose extension has been recognized. Only constructible through
/// [`SupportedFile::new`], so holding one means the kind is settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportedFile {
    path: PathBuf,
    kind: FileKind,
}

impl SupportedFile {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self, ExtractError> {
        let path = path.into();
        match FileKind::from_path(&path) {
            Some(kind) => Ok(Self { path, kind }),
            None => Err(ExtractError::UnsupportedType(path)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> FileKind {
        self.kind
    }

    /// Final path component for log lines; falls back to the full path.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// Sibling `.txt` file the extracted text is written to.
    pub fn output_path(&self) -> PathBuf {
        self.path.with_extension("txt")
    }
}

impl fmt::Display for SupportedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}
