use crate::core::badge_controller::BadgeController;
use crate::core::quote_channel::QuoteChannel;
use parking_lot::Mutex;
use std::time::Duration;

/// Managed Tauri state. The quote worker never touches the controller.
pub struct AppState {
    pub controller: Mutex<BadgeController>,
    quote: Mutex<Option<QuoteChannel>>,
}

impl AppState {
    pub fn new(controller: BadgeController) -> Self {
        Self {
            controller: Mutex::new(controller),
            quote: Mutex::new(None),
        }
    }

    pub fn attach_quote_channel(&self, channel: QuoteChannel) {
        *self.quote.lock() = Some(channel);
    }

    /// Stops the worker once. Returns `None` when no worker was running.
    pub fn stop_quote_channel(&self, timeout: Duration) -> Option<bool> {
        let channel = self.quote.lock().take()?;
        Some(channel.shutdown(timeout))
    }
}
