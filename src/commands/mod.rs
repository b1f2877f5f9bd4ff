pub mod badge;
pub mod drag;
pub mod settings;
pub mod window;
