pub mod capability;
pub mod error;
pub mod file;
pub mod settings;

pub use capability::{locate, tool_version, Availability, Capabilities, MissingTool, Tool};
pub use error::ExtractError;
pub use file::{FileKind, SupportedFile, IMAGE_EXTENSIONS, PDF_EXTENSION};
pub use settings::{OcrSettings, RenderSettings, Settings, SettingsError};
