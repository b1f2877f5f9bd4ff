use crate::commands;
use crate::core::app_state::AppState;
use tauri::{
    menu::{MenuBuilder, MenuItemBuilder},
    AppHandle, Manager, Wry,
};

const TRAY_ID: &str = "main";
pub const TITLE_PREFIX: &str = "期货最新价";

fn badge_state(app: &AppHandle) -> (bool, bool) {
    let Some(state) = app.try_state::<AppState>() else {
        return (true, false);
    };
    let controller = state.controller.lock();
    (controller.is_visible(), controller.is_locked())
}

fn build_tray_menu(app: &AppHandle<Wry>) -> tauri::Result<tauri::menu::Menu<Wry>> {
    let (visible, locked) = badge_state(app);

    let toggle_badge = MenuItemBuilder::with_id(
        "toggle_badge",
        if visible { "隐藏大号价格" } else { "显示大号价格" },
    )
    .build(app)?;
    let lock = MenuItemBuilder::with_id("lock", if locked { "解锁悬浮牌" } else { "锁定悬浮牌" })
        .build(app)?;
    let settings_item = MenuItemBuilder::with_id("settings", "设置").build(app)?;
    let quit = MenuItemBuilder::with_id("quit", "退出").build(app)?;

    MenuBuilder::new(app)
        .item(&toggle_badge)
        .item(&lock)
        .separator()
        .item(&settings_item)
        .separator()
        .item(&quit)
        .build()
}

pub fn refresh_tray_menu(app: &AppHandle<Wry>) -> tauri::Result<()> {
    let Some(tray) = app.tray_by_id(TRAY_ID) else {
        return Ok(());
    };
    let menu = build_tray_menu(app)?;
    tray.set_menu(Some(menu))?;
    Ok(())
}

pub fn price_tooltip(instrument: &str, text: &str) -> String {
    format!("{} {}: {}", instrument, TITLE_PREFIX, text)
}

pub fn failure_tooltip(instrument: &str, message: &str) -> String {
    format!("{} 出错: {}", instrument, message)
}

pub fn set_tooltip(app: &AppHandle<Wry>, text: &str) {
    if let Some(tray) = app.tray_by_id(TRAY_ID) {
        let _ = tray.set_tooltip(Some(text));
    }
}

/// Tray icon itself is created via `tauri.conf.json` (`app.trayIcon`).
/// This function attaches the menu and the initial tooltip.
pub fn create_tray(app: &AppHandle<Wry>, instrument: &str, price_text: &str) -> tauri::Result<()> {
    refresh_tray_menu(app)?;
    set_tooltip(app, &price_tooltip(instrument, price_text));
    Ok(())
}

pub fn handle_menu_event(app: &AppHandle<Wry>, event: tauri::menu::MenuEvent) {
    match event.id().as_ref() {
        "toggle_badge" => {
            let app = app.clone();
            tauri::async_runtime::spawn(async move {
                let _ = commands::badge::toggle_badge(app.clone(), app.state::<AppState>()).await;
            });
        }
        "lock" => {
            let app = app.clone();
            tauri::async_runtime::spawn(async move {
                let _ = commands::badge::toggle_lock(app.clone(), app.state::<AppState>()).await;
            });
        }
        "settings" => {
            let app = app.clone();
            tauri::async_runtime::spawn(async move {
                let _ = commands::settings::open_settings(app.clone(), app.state::<AppState>()).await;
            });
        }
        "quit" => commands::window::shutdown_and_exit(app),
        _ => {}
    }
}
