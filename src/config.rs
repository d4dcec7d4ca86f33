//! Configuration file parser for ~/.config/tickerfeed/config.toml.
//!
//! The config file is optional — a missing file yields `Config::default()`.
//! Unknown keys are silently ignored by serde, though we log a warning when
//! the file contains potential typos.
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use crate::news::CategoryKey;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file exceeds the maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),
}

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be
/// specified. Missing keys fall back to `Default::default()`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the news service. The `/api` prefix is appended when
    /// missing, so both forms are accepted.
    pub base_url: String,

    /// Quiet period in milliseconds before a search suggestion request
    /// fires after the last keystroke.
    pub debounce_ms: u64,

    /// Per-request timeout for the HTTP client, in seconds.
    pub request_timeout_secs: u64,

    /// Category tab labels, in display order. Labels are resolved through
    /// [`CategoryKey::from_label`]; unrecognized ones browse the generic
    /// "all" endpoint.
    pub tabs: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            debounce_ms: 260,
            request_timeout_secs: 15,
            tabs: vec![
                "ALL".to_string(),
                "RESULTS".to_string(),
                "PENNY".to_string(),
                "LARGE CAP".to_string(),
                "MIDCAP".to_string(),
                "SMALLCAP".to_string(),
                "FMCG".to_string(),
                "IT".to_string(),
                "BANKING".to_string(),
                "AUTO".to_string(),
                "ENERGY".to_string(),
                "PSU".to_string(),
                "TELECOM".to_string(),
            ],
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → silently accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Race: file deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        // Parse as a raw table first to detect unknown keys
        if let Ok(raw) = content.parse::<toml::Table>() {
            let known_keys = ["base_url", "debounce_ms", "request_timeout_secs", "tabs"];
            for key in raw.keys() {
                if !known_keys.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(path = %path.display(), base_url = %config.base_url, "Loaded configuration");
        Ok(config)
    }

    /// Configured tab labels resolved to category keys, in display order.
    pub fn categories(&self) -> Vec<CategoryKey> {
        self.tabs.iter().map(|l| CategoryKey::from_label(l)).collect()
    }
}
