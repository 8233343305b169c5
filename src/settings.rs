//! Connection settings and their persistence.
//!
//! Settings live in a small JSON key-value file, one file per installation,
//! playing the role that origin-scoped local storage plays in a browser.

use crate::error::{Result, SyncError};
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Base URL used when nothing has been saved yet.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

const BASE_URL_KEY: &str = "BASE_URL";
const API_KEY_KEY: &str = "API_KEY";

/// Connection settings for the remote service.
#[derive(Clone, PartialEq, Eq)]
pub struct Settings {
    /// Root URL of the inventory service.
    pub base_url: String,
    /// Value sent in the `X-API-KEY` header.
    pub api_key: String,
}

impl Settings {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Copy with surrounding whitespace removed from both values.
    pub fn trimmed(&self) -> Self {
        Self {
            base_url: self.base_url.trim().to_string(),
            api_key: self.api_key.trim().to_string(),
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: String::new(),
        }
    }
}

// Keep the key out of logs.
impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("base_url", &self.base_url)
            .field("api_key", &if self.api_key.is_empty() { "" } else { "***" })
            .finish()
    }
}

/// File-backed settings store.
#[derive(Clone, Debug)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the saved settings. A missing file or missing keys fall back to
    /// the defaults.
    pub fn load(&self) -> Result<Settings> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Settings::default()),
            Err(e) => return Err(e.into()),
        };

        let entries: BTreeMap<String, String> = serde_json::from_slice(&bytes)
            .map_err(|e| SyncError::InvalidConfig(format!("{}: {}", self.path.display(), e)))?;

        let mut settings = Settings::default();
        if let Some(base_url) = entries.get(BASE_URL_KEY).filter(|v| !v.trim().is_empty()) {
            settings.base_url = base_url.clone();
        }
        if let Some(api_key) = entries.get(API_KEY_KEY) {
            settings.api_key = api_key.clone();
        }

        Ok(settings)
    }

    /// Persist settings (trimmed). The file is replaced atomically.
    pub fn save(&self, settings: &Settings) -> Result<Settings> {
        let settings = settings.trimmed();

        let mut entries = BTreeMap::new();
        entries.insert(BASE_URL_KEY, settings.base_url.as_str());
        entries.insert(API_KEY_KEY, settings.api_key.as_str());
        let encoded = serde_json::to_vec_pretty(&entries)
            .map_err(|e| SyncError::Serialization(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let tmp_path = self.path.with_extension("tmp");
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&tmp_path)?;
        file.write_all(&encoded)?;
        file.sync_all()?;
        fs::rename(&tmp_path, &self.path)?;

        tracing::debug!(path = %self.path.display(), "saved connection settings");
        Ok(settings)
    }
}
