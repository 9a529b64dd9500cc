use std::path::{Path, PathBuf};

use lector_batch::{BatchDriver, Extractor, LogContext, Progress, SlotGuard};
use lector_core::SupportedFile;
use tauri::{AppHandle, Emitter};
use tauri_plugin_dialog::{DialogExt, MessageDialogKind};
use tracing::{error, info};

/// Mirrors the batch driver's progress into the window's status line.
struct StatusProgress {
    app: AppHandle,
}

impl Progress for StatusProgress {
    fn started(&mut self, index: usize, total: usize, file: &SupportedFile) {
        set_status(&self.app, format!("Processing {index}/{total}: {}", file.file_name()));
    }
}

fn set_status(app: &AppHandle, status: impl Into<String>) {
    let _ = app.emit("status", status.into());
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Body of the background task. Holds `guard` until the closing dialog is
/// dismissed, so the Process button stays disabled for the whole run. The
/// window is told the run is over when the guard drops, even on a panic.
pub fn run(app: AppHandle, input: PathBuf, extractor: Extractor, guard: SlotGuard) {
    let release_app = app.clone();
    let _guard = guard.on_release(move || {
        let _ = release_app.emit("processing-changed", false);
    });

    let sink_app = app.clone();
    let log = LogContext::builder()
        .sink(move |line| {
            let _ = sink_app.emit("log-line", line);
        })
        .build()
        .unwrap_or_else(|_| LogContext::disabled());
    let driver = BatchDriver::new(extractor);

    log.scope(|| info!("{}", "=".repeat(60)));
    let outcome = if input.is_dir() {
        set_status(&app, format!("Processing folder: {}", display_name(&input)));
        let mut progress = StatusProgress { app: app.clone() };
        match driver.run(&input, &log, &mut progress) {
            Ok(summary) => {
                let _ = app.emit("batch-summary", &summary);
                Ok("Folder processing completed!")
            }
            Err(e) => {
                log.scope(|| error!("Error: {e}"));
                Err(e.to_string())
            }
        }
    } else {
        set_status(&app, format!("Processing file: {}", display_name(&input)));
        if driver.process_path(&input, &log).is_success() {
            Ok("Completed successfully!")
        } else {
            Ok("Processing failed. Check log for details.")
        }
    };
    drop(log);

    let dialog = app.dialog();
    match outcome {
        Ok(status) => {
            set_status(&app, status);
            dialog
                .message("Processing completed! Check the log for details.")
                .kind(MessageDialogKind::Info)
                .title("Complete")
                .blocking_show();
        }
        Err(message) => {
            set_status(&app, "Error occurred during processing");
            dialog
                .message(format!("An error occurred: {message}"))
                .kind(MessageDialogKind::Error)
                .title("Error")
                .blocking_show();
        }
    }
}
