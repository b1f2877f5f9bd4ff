pub mod app_log;
pub mod app_state;
pub mod badge_controller;
pub mod badge_layout;
pub mod drag;
pub mod errors;
pub mod geometry;
pub mod launch;
pub mod persistence;
pub mod preview;
pub mod quote_channel;
pub mod quote_feed;
pub mod style;
pub mod ui_emit;
pub mod window_placement;
