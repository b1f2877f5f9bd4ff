use crate::core::app_log;
use crate::core::app_state::AppState;
use crate::core::drag::WindowKind;
use crate::core::geometry::{MonitorArea, Rect};
use crate::models::{Point, Size};
use tauri::{AppHandle, Manager, Monitor, PhysicalPosition, PhysicalSize, Position, WebviewWindow};

fn to_area(monitor: &Monitor, primary: Option<&Monitor>) -> MonitorArea {
    let pos = monitor.position();
    let size = monitor.size();
    let work = monitor.work_area();
    MonitorArea {
        bounds: Rect::new(pos.x, pos.y, size.width, size.height),
        available: Rect::new(
            work.position.x,
            work.position.y,
            work.size.width,
            work.size.height,
        ),
        primary: primary.is_some_and(|p| p.position() == pos && p.size() == size),
    }
}

/// Monitors as seen from `window`, physical pixels. Empty when enumeration fails, which
/// makes every clamp a no-op.
pub fn monitor_areas(window: &WebviewWindow) -> Vec<MonitorArea> {
    let Ok(monitors) = window.available_monitors() else {
        return Vec::new();
    };
    let primary = window.primary_monitor().ok().flatten();
    let mut areas: Vec<MonitorArea> = monitors.iter().map(|m| to_area(m, primary.as_ref())).collect();
    // some platforms report no primary; the first one stands in for it
    if !areas.iter().any(|a| a.primary) {
        if let Some(first) = areas.first_mut() {
            first.primary = true;
        }
    }
    areas
}

pub fn outer_frame(window: &WebviewWindow) -> Option<Rect> {
    let position = window.outer_position().ok()?;
    let size = window.outer_size().ok()?;
    Some(Rect::new(position.x, position.y, size.width, size.height))
}

pub fn window_for(app_handle: &AppHandle, kind: WindowKind) -> Result<WebviewWindow, String> {
    app_handle
        .get_webview_window(kind.label())
        .ok_or_else(|| format!("{} window not found", kind.label()))
}

pub fn move_window(window: &WebviewWindow, point: Point) {
    let _ = window.set_position(Position::Physical(PhysicalPosition {
        x: point.x,
        y: point.y,
    }));
}

pub fn resize_window(window: &WebviewWindow, size: Size) {
    if size.width == 0 || size.height == 0 {
        return;
    }
    let _ = window.set_size(tauri::Size::Physical(PhysicalSize {
        width: size.width,
        height: size.height,
    }));
}

/// Puts the badge at its persisted spot (clamped to the current screens) or the first-launch default.
pub fn restore_badge(app_handle: &AppHandle, state: &AppState) -> Result<(), String> {
    let window = window_for(app_handle, WindowKind::Badge)?;
    let size = window
        .outer_size()
        .map(|s| Size::new(s.width, s.height))
        .map_err(|e| format!("Failed to read badge size: {}", e))?;
    let monitors = monitor_areas(&window);

    let (position, write) = state.controller.lock().restore_badge(size, &monitors);
    if let Err(e) = write {
        let _ = app_log::error(
            app_handle,
            "layout",
            "write_failed",
            Some(serde_json::json!({ "error": e.to_string() })),
        );
    }
    move_window(&window, position);
    Ok(())
}

/// Pulls the badge back on screen after it was resized to `size` or the displays changed.
pub fn reclamp_badge(
    app_handle: &AppHandle,
    state: &AppState,
    size: Option<Size>,
) -> Result<(), String> {
    let window = window_for(app_handle, WindowKind::Badge)?;
    let Some(mut frame) = outer_frame(&window) else {
        return Ok(());
    };
    // set_size may not be reflected by outer_size yet
    if let Some(size) = size.filter(|s| s.width > 0 && s.height > 0) {
        frame.width = size.width;
        frame.height = size.height;
    }
    let monitors = monitor_areas(&window);

    let position = state.controller.lock().reclamp_badge(frame, &monitors);
    if let Some(position) = position {
        move_window(&window, position);
    }
    Ok(())
}

pub fn place_settings(app_handle: &AppHandle, state: &AppState) -> Result<(), String> {
    let window = window_for(app_handle, WindowKind::Settings)?;
    let size = window
        .outer_size()
        .map(|s| Size::new(s.width, s.height))
        .map_err(|e| format!("Failed to read settings size: {}", e))?;
    let badge_frame = app_handle
        .get_webview_window(WindowKind::Badge.label())
        .filter(|w| w.is_visible().unwrap_or(false))
        .and_then(|w| outer_frame(&w));
    let monitors = monitor_areas(&window);

    let position = state
        .controller
        .lock()
        .settings_placement(size, badge_frame, &monitors);
    move_window(&window, position);
    Ok(())
}
