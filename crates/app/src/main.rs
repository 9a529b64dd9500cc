use std::path::PathBuf;

use lector_batch::{LogContext, TaskSlot};
use lector_core::{Capabilities, Settings};
use tauri::{AppHandle, Manager};
use tauri_plugin_dialog::{DialogExt, MessageDialogKind};

mod commands;
mod worker;

pub struct AppState {
    pub settings: Settings,
    pub capabilities: Capabilities,
    /// Guards against overlapping runs from this window.
    pub slot: TaskSlot,
}

fn main() {
    tauri::Builder::default()
        .plugin(tauri_plugin_dialog::init())
        .setup(|app| {
            let shell_log = LogContext::builder().build()?;
            let settings = load_settings(app.handle(), &shell_log);
            let capabilities = Capabilities::probe(&settings);

            // A missing tool is fatal for the whole window: explain, then quit.
            if let Err(e) = capabilities.require() {
                shell_log.scope(|| tracing::error!("{e}"));
                let handle = app.handle().clone();
                app.dialog()
                    .message(e.to_string())
                    .kind(MessageDialogKind::Error)
                    .title("Dependency Error")
                    .show(move |_| handle.exit(1));
            }

            app.manage(AppState { settings, capabilities, slot: TaskSlot::new() });
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::pick_file,
            commands::pick_folder,
            commands::process,
            commands::is_processing,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}

/// `lector.toml` in the platform config dir, when present.
fn load_settings(app: &AppHandle, log: &LogContext) -> Settings {
    let Some(path) = config_path(app) else {
        return Settings::default();
    };
    if !path.exists() {
        return Settings::default();
    }
    match Settings::load(&path) {
        Ok(settings) => {
            log.scope(|| tracing::info!("Loaded settings from {}", path.display()));
            settings
        }
        Err(e) => {
            log.scope(|| tracing::warn!("Ignoring {}: {e}", path.display()));
            Settings::default()
        }
    }
}

fn config_path(app: &AppHandle) -> Option<PathBuf> {
    app.path().app_config_dir().ok().map(|dir| dir.join("lector.toml"))
}
