use crate::core::app_log;
use crate::core::app_state::AppState;
use crate::core::quote_channel::DEFAULT_JOIN_TIMEOUT;
use tauri::{AppHandle, Manager};

/// Stops the quote worker (bounded wait) off the UI thread, then exits.
pub fn shutdown_and_exit(app_handle: &AppHandle) {
    let app = app_handle.clone();
    tauri::async_runtime::spawn_blocking(move || {
        if let Some(state) = app.try_state::<AppState>() {
            if state.stop_quote_channel(DEFAULT_JOIN_TIMEOUT) == Some(false) {
                let _ = app_log::warn(&app, "quote", "worker_join_timeout", None);
            }
        }
        let _ = app_log::info(&app, "app", "exit");
        app.exit(0);
    });
}

#[tauri::command]
pub async fn quit_app(app_handle: AppHandle) -> Result<(), String> {
    shutdown_and_exit(&app_handle);
    Ok(())
}
