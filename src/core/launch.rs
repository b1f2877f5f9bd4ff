use crate::core::errors::StartupConfigError;
use crate::core::quote_feed::{FeedCredentials, DEFAULT_FEED_URL};
use clap::Parser;

pub const DEFAULT_INSTRUMENT: &str = "SHFE.cu2401";
pub const USER_ENV: &str = "TQ_USER";
pub const PASSWORD_ENV: &str = "TQ_PASS";
pub const FEED_URL_ENV: &str = "QUOTE_FEED_URL";

#[derive(Debug, Parser)]
#[command(name = "quote-badge", about = "Always-on-top badge showing a live quote")]
struct Cli {
    /// Instrument identifier, e.g. SHFE.cu2401
    instrument: Option<String>,
}

/// Everything resolved before the first window exists.
#[derive(Debug, Clone)]
pub struct LaunchConfig {
    pub instrument: String,
    pub credentials: FeedCredentials,
    pub feed_url: String,
}

fn required(lookup: &impl Fn(&str) -> Option<String>, key: &'static str) -> Result<String, StartupConfigError> {
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or(StartupConfigError::MissingCredential(key))
}

fn resolve<I, T>(args: I, lookup: impl Fn(&str) -> Option<String>) -> Result<LaunchConfig, StartupConfigError>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let user = required(&lookup, USER_ENV)?;
    let password = required(&lookup, PASSWORD_ENV)?;

    // A malformed command line is not fatal; it falls back to the default instrument.
    let instrument = Cli::try_parse_from(args)
        .ok()
        .and_then(|cli| cli.instrument)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_INSTRUMENT.to_string());

    let feed_url = lookup(FEED_URL_ENV)
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_FEED_URL.to_string());

    Ok(LaunchConfig {
        instrument,
        credentials: FeedCredentials { user, password },
        feed_url,
    })
}

pub fn from_env() -> Result<LaunchConfig, StartupConfigError> {
    resolve(std::env::args_os(), |key| std::env::var(key).ok())
}
