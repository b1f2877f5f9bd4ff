use crate::core::app_state::AppState;
use crate::core::badge_controller::BadgeSnapshot;
use crate::core::badge_layout::ElementSizes;
use crate::core::drag::{Surface, WindowKind};
use crate::core::ui_emit::{self, LAYOUT_APPLIED, LOCK_CHANGED};
use crate::core::window_placement;
use crate::models::ElementLayout;
use tauri::{AppHandle, State};

#[tauri::command]
pub async fn get_badge_state(state: State<'_, AppState>) -> Result<BadgeSnapshot, String> {
    Ok(state.controller.lock().snapshot())
}

/// The frontend reports rendered element sizes after every relayout.
#[tauri::command]
pub async fn report_element_sizes(
    app_handle: AppHandle,
    state: State<'_, AppState>,
    surface: Surface,
    sizes: ElementSizes,
) -> Result<ElementLayout, String> {
    match surface {
        Surface::Live => {
            let (client, positions) = {
                let mut controller = state.controller.lock();
                let client = controller.set_live_sizes(sizes);
                (client, controller.snapshot().positions)
            };
            let window = window_placement::window_for(&app_handle, WindowKind::Badge)?;
            window_placement::resize_window(&window, client);
            window_placement::reclamp_badge(&app_handle, &state, Some(client))?;
            Ok(positions)
        }
        Surface::Preview => {
            let mut controller = state.controller.lock();
            controller.set_preview_sizes(sizes);
            Ok(controller
                .settings_snapshot()
                .map(|s| s.positions)
                .unwrap_or_default())
        }
    }
}

/// Pushes the committed layout and style to the badge.
pub(crate) fn publish_layout(app_handle: &AppHandle, snapshot: &BadgeSnapshot) {
    ui_emit::emit_to_window(app_handle, WindowKind::Badge.label(), LAYOUT_APPLIED, snapshot);
}

pub(crate) fn apply_badge_visibility(app_handle: &AppHandle, visible: bool) -> Result<(), String> {
    let window = window_placement::window_for(app_handle, WindowKind::Badge)?;
    if visible {
        window
            .show()
            .map_err(|e| format!("Failed to show badge: {}", e))?;
    } else {
        window
            .hide()
            .map_err(|e| format!("Failed to hide badge: {}", e))?;
    }
    let _ = crate::tray_menu::refresh_tray_menu(app_handle);
    Ok(())
}

#[tauri::command]
pub async fn toggle_badge(app_handle: AppHandle, state: State<'_, AppState>) -> Result<bool, String> {
    let visible = {
        let mut controller = state.controller.lock();
        let visible = !controller.is_visible();
        controller.set_visible(visible);
        visible
    };
    apply_badge_visibility(&app_handle, visible)?;
    Ok(visible)
}

#[tauri::command]
pub async fn toggle_lock(app_handle: AppHandle, state: State<'_, AppState>) -> Result<bool, String> {
    let locked = state.controller.lock().toggle_lock();
    ui_emit::emit_to_window(&app_handle, WindowKind::Badge.label(), LOCK_CHANGED, &locked);
    let _ = crate::tray_menu::refresh_tray_menu(&app_handle);
    Ok(locked)
}
