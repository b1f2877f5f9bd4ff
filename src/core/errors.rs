use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StartupConfigError {
    #[error("missing required environment variable {0}")]
    MissingCredential(&'static str),
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to read layout file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("layout file {path} is not valid: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to write layout file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct QuoteSourceError(pub String);

impl QuoteSourceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
