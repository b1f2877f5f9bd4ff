use crate::core::app_log;
use crate::core::app_state::AppState;
use crate::core::badge_controller::SettingsSnapshot;
use crate::core::drag::WindowKind;
use crate::core::ui_emit::{self, SETTINGS_OPENED};
use crate::core::window_placement;
use crate::models::BadgeStyle;
use tauri::{AppHandle, State};

#[tauri::command]
pub async fn open_settings(app_handle: AppHandle, state: State<'_, AppState>) -> Result<(), String> {
    let window = window_placement::window_for(&app_handle, WindowKind::Settings)?;
    let already_visible = window.is_visible().unwrap_or(false);

    let snapshot = {
        let mut controller = state.controller.lock();
        controller.open_settings();
        controller.settings_snapshot()
    };
    if !already_visible {
        window_placement::place_settings(&app_handle, &state)?;
    }

    window
        .show()
        .map_err(|e| format!("Failed to show settings: {}", e))?;
    window
        .set_focus()
        .map_err(|e| format!("Failed to focus settings: {}", e))?;

    ui_emit::emit_to_window(&app_handle, WindowKind::Settings.label(), SETTINGS_OPENED, &snapshot);
    Ok(())
}

#[tauri::command]
pub async fn get_settings_state(state: State<'_, AppState>) -> Result<Option<SettingsSnapshot>, String> {
    Ok(state.controller.lock().settings_snapshot())
}

/// Returns the normalized draft, or `None` when no settings session is open.
#[tauri::command]
pub async fn update_settings_draft(
    state: State<'_, AppState>,
    draft: BadgeStyle,
) -> Result<Option<BadgeStyle>, String> {
    Ok(state.controller.lock().update_settings_draft(draft))
}

fn hide_settings_window(app_handle: &AppHandle) -> Result<(), String> {
    window_placement::window_for(app_handle, WindowKind::Settings)?
        .hide()
        .map_err(|e| format!("Failed to hide settings: {}", e))
}

#[tauri::command]
pub async fn accept_settings(app_handle: AppHandle, state: State<'_, AppState>) -> Result<(), String> {
    let (result, snapshot) = {
        let mut controller = state.controller.lock();
        let result = controller.accept_settings();
        (result, controller.snapshot())
    };

    match result {
        Ok(true) => {
            let _ = app_log::info(&app_handle, "settings", "accepted");
        }
        Ok(false) => {}
        // The in-memory layout already holds the accepted values.
        Err(e) => {
            let _ = app_log::error(
                &app_handle,
                "layout",
                "write_failed",
                Some(serde_json::json!({ "error": e.to_string() })),
            );
        }
    }

    hide_settings_window(&app_handle)?;
    super::badge::publish_layout(&app_handle, &snapshot);
    Ok(())
}

#[tauri::command]
pub async fn cancel_settings(app_handle: AppHandle, state: State<'_, AppState>) -> Result<(), String> {
    state.controller.lock().cancel_settings();
    hide_settings_window(&app_handle)
}
