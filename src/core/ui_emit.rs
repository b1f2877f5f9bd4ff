use serde::Serialize;
use tauri::{AppHandle, Emitter, Manager};

pub const PRICE_UPDATED: &str = "price-updated";
pub const QUOTE_STATUS: &str = "quote-status";
pub const LAYOUT_APPLIED: &str = "layout-applied";
pub const LOCK_CHANGED: &str = "lock-changed";
pub const ELEMENT_MOVED: &str = "element-moved";
pub const SETTINGS_OPENED: &str = "settings-opened";

pub fn emit_to_window_if_visible<T: Serialize>(
    app_handle: &AppHandle,
    label: &str,
    event: &str,
    payload: &T,
) -> bool {
    let Some(window) = app_handle.get_webview_window(label) else {
        return false;
    };

    // Prefer emitting (no suppression) if visibility can't be determined.
    if !window.is_visible().unwrap_or(true) {
        return false;
    }

    let _ = window.emit(event, payload);
    true
}

/// Hidden windows still get the event so they are current when shown again.
pub fn emit_to_window<T: Serialize>(app_handle: &AppHandle, label: &str, event: &str, payload: &T) -> bool {
    let Some(window) = app_handle.get_webview_window(label) else {
        return false;
    };
    window.emit(event, payload).is_ok()
}

pub fn emit_to_windows<T: Serialize>(app_handle: &AppHandle, labels: &[&str], event: &str, payload: &T) -> usize {
    labels
        .iter()
        .filter(|label| emit_to_window(app_handle, label, event, payload))
        .count()
}
