use crate::core::app_log;
use crate::core::app_state::AppState;
use crate::core::drag::WindowKind;
use crate::core::launch::LaunchConfig;
use crate::core::quote_channel::{ChannelOptions, QuoteChannel, QuoteEvent};
use crate::core::quote_feed::HttpQuoteSource;
use crate::core::ui_emit::{self, PRICE_UPDATED, QUOTE_STATUS};
use crate::tray_menu;
use anyhow::{Context, Result};
use tauri::{AppHandle, Manager};

const QUOTE_WINDOWS: [&str; 2] = ["badge", "settings"];

/// Runs on the UI thread, in emission order.
fn deliver(app: &AppHandle, instrument: &str, event: QuoteEvent) {
    if let Some(state) = app.try_state::<AppState>() {
        let mut controller = state.controller.lock();
        match &event {
            QuoteEvent::Price(text) => {
                controller.set_price_text(text.clone());
                controller.set_status(None);
            }
            QuoteEvent::Failed(message) => controller.set_status(Some(message.clone())),
        }
    }

    match &event {
        QuoteEvent::Price(text) => {
            ui_emit::emit_to_windows(app, &QUOTE_WINDOWS, PRICE_UPDATED, text);
            tray_menu::set_tooltip(app, &tray_menu::price_tooltip(instrument, text));
        }
        QuoteEvent::Failed(message) => {
            let _ = app_log::error(
                app,
                "quote",
                "worker_failed",
                Some(serde_json::json!({ "instrument": instrument, "error": message })),
            );
            ui_emit::emit_to_window(app, WindowKind::Badge.label(), QUOTE_STATUS, &event);
            tray_menu::set_tooltip(app, &tray_menu::failure_tooltip(instrument, message));
        }
    }
}

pub fn start(app_handle: &AppHandle, launch: &LaunchConfig) -> Result<QuoteChannel> {
    let source = HttpQuoteSource::new(
        launch.feed_url.clone(),
        launch.instrument.clone(),
        launch.credentials.clone(),
    )?;

    let app = app_handle.clone();
    let instrument = launch.instrument.clone();
    QuoteChannel::spawn(source, ChannelOptions::default(), move |event| {
        let handle = app.clone();
        let instrument = instrument.clone();
        let _ = app.run_on_main_thread(move || deliver(&handle, &instrument, event));
    })
    .context("failed to start quote worker thread")
}
