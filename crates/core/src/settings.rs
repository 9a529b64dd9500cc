use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read settings file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid setting: {0}")]
    Invalid(String),
}

/// Runtime knobs. Every field has a default so an empty file is valid.
///
/// ```toml
/// [ocr]
/// language = "eng+deu"
/// tesseract = "/opt/homebrew/bin/tesseract"
///
/// [render]
/// dpi = 200
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub ocr: OcrSettings,
    pub render: RenderSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcrSettings {
    /// Tesseract language code(s), `+`-separated.
    pub language: String,
    /// Program name looked up on `PATH`, or an explicit path.
    pub tesseract: PathBuf,
}

impl Default for OcrSettings {
    fn default() -> Self {
        Self { language: "eng".to_string(), tesseract: PathBuf::from("tesseract") }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Resolution scanned PDF pages are rasterized at before OCR.
    pub dpi: u32,
    pub pdftoppm: PathBuf,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self { dpi: 150, pdftoppm: PathBuf::from("pdftoppm") }
    }
}

impl Settings {
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path)
            .map_err(|source| SettingsError::Io { path: path.to_path_buf(), source })?;
        Self::from_toml(&content)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.ocr.language.trim().is_empty() {
            return Err(SettingsError::Invalid("ocr.language must not be empty".into()));
        }
        if !(36..=1200).contains(&self.render.dpi) {
            return Err(SettingsError::Invalid(format!(
                "render.dpi must be between 36 and 1200, got {}",
                self.render.dpi
            )));
        }
        Ok(())
    }
}
