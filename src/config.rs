//! Configuration file parser for ~/.config/tgrss-dash/config.toml.
//!
//! The config file is optional; a missing file yields `Config::default()`.
//! Unknown keys are accepted by serde but logged as a warning so typos are
//! visible in the log file.
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("HOME environment variable not set")]
    NoHome,
}

// ============================================================================
// Configuration
// ============================================================================

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_POST_LINK_TEMPLATE: &str = "https://www.nodeseek.com/post-{post_id}-1";

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be given.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Backend origin, e.g. `https://push.example.com`. `--base-url` wins.
    pub base_url: Option<String>,

    /// Posts per page sent as `limit`.
    pub page_size: u32,

    /// Quiet period before filter edits trigger a fetch.
    pub search_debounce_ms: u64,

    /// Per-request timeout, covering the body read.
    pub request_timeout_secs: u64,

    /// Link opened for a post; `{post_id}` is substituted.
    pub post_link_template: String,

    /// Keybinding overrides. Keys are action names, values are key strings.
    pub keybindings: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: None,
            page_size: DEFAULT_PAGE_SIZE,
            search_debounce_ms: DEFAULT_DEBOUNCE_MS,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            post_link_template: DEFAULT_POST_LINK_TEMPLATE.to_string(),
            keybindings: HashMap::new(),
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 6] = [
        "base_url",
        "page_size",
        "search_debounce_ms",
        "request_timeout_secs",
        "post_link_template",
        "keybindings",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing or blank file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Out-of-range numbers are clamped with a warning
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
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let mut config: Config = toml::from_str(&content)?;
        config.normalize();
        tracing::info!(
            path = %path.display(),
            page_size = config.page_size,
            has_base_url = config.base_url.is_some(),
            "Loaded configuration"
        );
        Ok(config)
    }

    fn normalize(&mut self) {
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            tracing::warn!(
                page_size = self.page_size,
                "page_size out of range (1-{}), using {}",
                MAX_PAGE_SIZE,
                DEFAULT_PAGE_SIZE
            );
            self.page_size = DEFAULT_PAGE_SIZE;
        }
        if self.request_timeout_secs == 0 {
            tracing::warn!("request_timeout_secs must be positive, using default");
            self.request_timeout_secs = DEFAULT_TIMEOUT_SECS;
        }
        if !self.post_link_template.contains("{post_id}") {
            tracing::warn!(
                template = %self.post_link_template,
                "post_link_template lacks {{post_id}}, using default"
            );
            self.post_link_template = DEFAULT_POST_LINK_TEMPLATE.to_string();
        }
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn post_link(&self, post_id: i64) -> String {
        self.post_link_template
            .replace("{post_id}", &post_id.to_string())
    }
}

/// `~/.config/tgrss-dash/`
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    let home = std::env::var_os("HOME").ok_or(ConfigError::NoHome)?;
    Ok(PathBuf::from(home).join(".config").join("tgrss-dash"))
}

// ============================================================================
// Tests
// ============================================================================
