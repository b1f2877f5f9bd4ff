use crate::core::app_log;
use crate::core::app_state::AppState;
use crate::core::drag::{DragStep, DragTarget, PointerButton, PressOutcome, Surface, WindowKind};
use crate::core::ui_emit::{self, ELEMENT_MOVED};
use crate::core::window_placement;
use crate::models::Point;
use serde::Deserialize;
use std::time::Instant;
use tauri::{AppHandle, State};

/// Pointer in physical screen pixels (`screenX * devicePixelRatio`).
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PointerInput {
    pub x: i32,
    pub y: i32,
    #[serde(default)]
    pub button: PointerButton,
}

impl PointerInput {
    fn point(self) -> Point {
        Point::new(self.x, self.y)
    }
}

#[tauri::command]
pub async fn drag_press(
    app_handle: AppHandle,
    state: State<'_, AppState>,
    target: DragTarget,
    pointer: PointerInput,
) -> Result<PressOutcome, String> {
    let at = Instant::now();
    match target {
        DragTarget::Window { window } => {
            let handle = window_placement::window_for(&app_handle, window)?;
            let frame = window_placement::outer_frame(&handle)
                .ok_or_else(|| format!("Failed to read {} frame", window.label()))?;
            let monitors = window_placement::monitor_areas(&handle);

            let (outcome, visible) = {
                let mut controller = state.controller.lock();
                let outcome =
                    controller.press_window(window, frame, monitors, pointer.point(), pointer.button, at);
                (outcome, controller.is_visible())
            };
            if outcome == PressOutcome::DoublePress {
                super::badge::apply_badge_visibility(&app_handle, visible)?;
            }
            Ok(outcome)
        }
        DragTarget::Element { surface, id } => Ok(state.controller.lock().press_element(
            surface,
            id,
            pointer.point(),
            pointer.button,
            at,
        )),
    }
}

#[tauri::command]
pub async fn drag_move(
    app_handle: AppHandle,
    state: State<'_, AppState>,
    pointer: PointerInput,
) -> Result<Option<DragStep>, String> {
    let step = state.controller.lock().drag_move(pointer.point());
    if let Some(DragStep {
        target: DragTarget::Window { window },
        position,
    }) = step
    {
        let handle = window_placement::window_for(&app_handle, window)?;
        window_placement::move_window(&handle, position);
    }
    Ok(step)
}

fn owning_window(target: DragTarget) -> Option<WindowKind> {
    match target {
        DragTarget::Window { .. } => None,
        DragTarget::Element {
            surface: Surface::Live,
            ..
        } => Some(WindowKind::Badge),
        DragTarget::Element {
            surface: Surface::Preview,
            ..
        } => Some(WindowKind::Settings),
    }
}

#[tauri::command]
pub async fn drag_release(
    app_handle: AppHandle,
    state: State<'_, AppState>,
) -> Result<Option<DragStep>, String> {
    let (committed, snapshot, client) = {
        let mut controller = state.controller.lock();
        let Some(committed) = controller.drag_release() else {
            return Ok(None);
        };
        (committed, controller.snapshot(), controller.badge_client_size())
    };

    if let Some(e) = committed.write_error.as_ref() {
        let _ = app_log::error(
            &app_handle,
            "layout",
            "write_failed",
            Some(serde_json::json!({ "error": e.to_string() })),
        );
    }

    let step = committed.step;
    match step.target {
        DragTarget::Window { window } => {
            let handle = window_placement::window_for(&app_handle, window)?;
            window_placement::move_window(&handle, step.position);
        }
        DragTarget::Element {
            surface: Surface::Live,
            ..
        } => {
            let handle = window_placement::window_for(&app_handle, WindowKind::Badge)?;
            window_placement::resize_window(&handle, client);
            super::badge::publish_layout(&app_handle, &snapshot);
        }
        DragTarget::Element {
            surface: Surface::Preview,
            ..
        } => {}
    }

    if let Some(owner) = owning_window(step.target) {
        ui_emit::emit_to_window_if_visible(&app_handle, owner.label(), ELEMENT_MOVED, &step);
    }
    Ok(Some(step))
}
