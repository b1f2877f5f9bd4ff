use crate::core::errors::PersistenceError;
use crate::core::style;
use crate::models::LayoutConfig;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub const LAYOUT_FILE_NAME: &str = "layout.json";

/// Reads the layout record. `Ok(None)` means no file yet.
pub fn load(path: &Path) -> Result<Option<LayoutConfig>, PersistenceError> {
    if !path.exists() {
        return Ok(None);
    }

    let bytes = fs::read(path).map_err(|source| PersistenceError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let mut config: LayoutConfig =
        serde_json::from_slice(&bytes).map_err(|source| PersistenceError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    config.migrate_legacy_header();
    style::normalize_loaded(&mut config);
    Ok(Some(config))
}

fn write_atomically(path: &Path, config: &LayoutConfig) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let tmp = path.with_extension("tmp");
    let mut file = fs::File::create(&tmp)?;
    serde_json::to_writer_pretty(&mut file, config)
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
    file.write_all(b"\n")?;
    file.sync_all()?;

    fs::rename(tmp, path)?;
    Ok(())
}

pub fn save(path: &Path, config: &LayoutConfig) -> Result<(), PersistenceError> {
    write_atomically(path, config).map_err(|source| PersistenceError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Owns the live `LayoutConfig` and flushes it synchronously after every mutation.
#[derive(Debug)]
pub struct LayoutStore {
    path: PathBuf,
    config: LayoutConfig,
}

impl LayoutStore {
    /// Opens the store. A corrupt or unreadable file yields defaults plus the error for logging.
    pub fn open(path: PathBuf) -> (Self, Option<PersistenceError>) {
        let (config, error) = match load(&path) {
            Ok(Some(config)) => (config, None),
            Ok(None) => (LayoutConfig::default(), None),
            Err(e) => (LayoutConfig::default(), Some(e)),
        };
        (Self { path, config }, error)
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Applies `f` and writes the whole record. On write failure the in-memory change stays.
    pub fn update<F>(&mut self, f: F) -> Result<(), PersistenceError>
    where
        F: FnOnce(&mut LayoutConfig),
    {
        f(&mut self.config);
        save(&self.path, &self.config)
    }
}
