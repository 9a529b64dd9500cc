use std::path::PathBuf;

use lector_batch::Extractor;
use lector_core::{IMAGE_EXTENSIONS, PDF_EXTENSION};
use serde::Serialize;
use tauri::{AppHandle, Emitter, State};
use tauri_plugin_dialog::{DialogExt, MessageDialogKind};

use crate::{worker, AppState};

#[derive(Debug, Serialize)]
pub struct CommandError {
    pub message: String,
}

impl From<lector_core::ExtractError> for CommandError {
    fn from(e: lector_core::ExtractError) -> Self {
        CommandError { message: e.to_string() }
    }
}

impl CommandError {
    fn rejected(message: impl Into<String>) -> Self {
        CommandError { message: message.into() }
    }
}

fn notify(app: &AppHandle, kind: MessageDialogKind, title: &str, message: impl Into<String>) {
    app.dialog().message(message).kind(kind).title(title).show(|_| {});
}

/// Native file picker filtered to supported formats. `None` when cancelled.
#[tauri::command]
pub async fn pick_file(app: AppHandle) -> Option<String> {
    let all: Vec<&str> = IMAGE_EXTENSIONS.iter().copied().chain([PDF_EXTENSION]).collect();
    app.dialog()
        .file()
        .set_title("Select a file")
        .add_filter("All Supported", &all)
        .add_filter("PDF files", &[PDF_EXTENSION])
        .add_filter("Image files", IMAGE_EXTENSIONS)
        .blocking_pick_file()
        .and_then(|p| p.into_path().ok())
        .map(|p| p.display().to_string())
}

#[tauri::command]
pub async fn pick_folder(app: AppHandle) -> Option<String> {
    app.dialog()
        .file()
        .set_title("Select a folder")
        .blocking_pick_folder()
        .and_then(|p| p.into_path().ok())
        .map(|p| p.display().to_string())
}

#[tauri::command]
pub fn is_processing(state: State<'_, AppState>) -> bool {
    state.slot.is_busy()
}

/// Start processing `path` on a background thread and return immediately.
/// Progress arrives as `log-line`, `status` and `processing-changed` events.
#[tauri::command]
pub async fn process(
    app: AppHandle,
    state: State<'_, AppState>,
    path: String,
) -> Result<(), CommandError> {
    let path = path.trim();
    if path.is_empty() {
        notify(&app, MessageDialogKind::Warning, "No Input", "Please select a file or folder first.");
        return Err(CommandError::rejected("no input selected"));
    }
    let input = PathBuf::from(path);
    if !input.exists() {
        let message = format!("Path does not exist: {path}");
        notify(&app, MessageDialogKind::Error, "Error", message.clone());
        return Err(CommandError::rejected(message));
    }

    let Some(guard) = state.slot.try_acquire(path) else {
        let running = state.slot.current().unwrap_or_default();
        notify(&app, MessageDialogKind::Warning, "Processing", "Already processing. Please wait.");
        return Err(CommandError::rejected(format!("already processing {running}")));
    };
    let extractor = Extractor::from_capabilities(&state.capabilities, &state.settings)?;

    let _ = app.emit("processing-changed", true);
    let worker_app = app.clone();
    let task = tokio::task::spawn_blocking(move || worker::run(worker_app, input, extractor, guard));
    tokio::spawn(async move {
        if let Err(e) = task.await {
            let _ = app.emit("log-line", format!("Processing stopped unexpectedly: {e}"));
            notify(&app, MessageDialogKind::Error, "Error", format!("Processing stopped unexpectedly: {e}"));
        }
    });
    Ok(())
}
