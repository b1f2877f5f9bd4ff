mod commands;
mod core;
mod models;
mod quote_bridge;
mod tray_menu;

use core::app_state::AppState;
use core::badge_controller::{BadgeController, PENDING_PRICE_TEXT};
use core::drag::WindowKind;
use core::persistence::{LayoutStore, LAYOUT_FILE_NAME};
use tauri::{Manager, WindowEvent};

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    // Credentials are checked before any window exists.
    let launch = match core::launch::from_env() {
        Ok(launch) => launch,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };

    tauri::Builder::default()
        .on_menu_event(|app, event| {
            tray_menu::handle_menu_event(app, event);
        })
        .setup(move |app| {
            let app_handle = app.handle().clone();
            core::app_log::install_panic_hook(app_handle.clone());
            let _ = core::app_log::append(
                &app_handle,
                core::app_log::AppLogRecord::now(
                    "info",
                    "app",
                    "startup",
                    Some(serde_json::json!({
                        "instrument": launch.instrument,
                        "feed_url": launch.feed_url,
                    })),
                ),
            );

            let layout_path = app_handle
                .path()
                .app_data_dir()
                .map_err(|e| Box::new(std::io::Error::new(std::io::ErrorKind::Other, e)))?
                .join(LAYOUT_FILE_NAME);
            let (store, read_error) = LayoutStore::open(layout_path);
            if let Some(e) = read_error {
                let _ = core::app_log::warn(
                    &app_handle,
                    "layout",
                    "read_failed",
                    Some(serde_json::json!({ "error": e.to_string() })),
                );
            }

            app.manage(AppState::new(BadgeController::new(
                launch.instrument.clone(),
                store,
            )));
            tray_menu::create_tray(&app_handle, &launch.instrument, PENDING_PRICE_TEXT)?;

            core::window_placement::restore_badge(&app_handle, &app_handle.state::<AppState>())?;
            commands::badge::apply_badge_visibility(&app_handle, true)?;

            let channel = quote_bridge::start(&app_handle, &launch)?;
            app_handle.state::<AppState>().attach_quote_channel(channel);

            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::badge::get_badge_state,
            commands::badge::report_element_sizes,
            commands::badge::toggle_badge,
            commands::badge::toggle_lock,
            commands::drag::drag_press,
            commands::drag::drag_move,
            commands::drag::drag_release,
            commands::settings::open_settings,
            commands::settings::get_settings_state,
            commands::settings::update_settings_draft,
            commands::settings::accept_settings,
            commands::settings::cancel_settings,
            commands::window::quit_app,
        ])
        .on_window_event(|window, event| match event {
            WindowEvent::CloseRequested { api, .. } => {
                let app_handle = window.app_handle();
                api.prevent_close();
                let _ = window.hide();

                // Closing the settings window discards its pending edits.
                if window.label() == WindowKind::Settings.label() {
                    app_handle.state::<AppState>().controller.lock().cancel_settings();
                } else if window.label() == WindowKind::Badge.label() {
                    app_handle.state::<AppState>().controller.lock().set_visible(false);
                    let _ = tray_menu::refresh_tray_menu(app_handle);
                }
            }
            // DPI or display layout changed under the badge.
            WindowEvent::ScaleFactorChanged { .. } | WindowEvent::Moved(_)
                if window.label() == WindowKind::Badge.label() =>
            {
                let app_handle = window.app_handle();
                let _ = core::window_placement::reclamp_badge(
                    app_handle,
                    &app_handle.state::<AppState>(),
                    None,
                );
            }
            _ => {}
        })
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
