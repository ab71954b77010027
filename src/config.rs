//! Application configuration loaded from environment variables.

use std::path::PathBuf;

use reqwest::header::{HeaderName, HeaderValue};
use serde::Deserialize;
use url::Url;

/// Filter used when verbose logging is requested.
pub const VERBOSE_LOG_FILTER: &str = "medtrack_client=debug,info";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // === Backend ===
    /// Base origin every endpoint path is composed with.
    #[serde(default = "default_api_url")]
    pub medtrack_api_url: String,

    /// Name of the fixed diagnostic bypass header sent on every call.
    #[serde(default = "default_bypass_header")]
    pub medtrack_bypass_header: String,

    /// Value of the bypass header.
    #[serde(default = "default_bypass_value")]
    pub medtrack_bypass_value: String,

    /// Header carrying the signed-in user's identifier.
    #[serde(default = "default_identity_header")]
    pub medtrack_identity_header: String,

    // === Session Storage ===
    /// Directory holding the persisted identity record.
    #[serde(default)]
    pub medtrack_session_dir: Option<PathBuf>,

    /// Storage key of the identity record (file stem on disk).
    #[serde(default = "default_storage_key")]
    pub medtrack_storage_key: String,

    // === Logging ===
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub rust_log: String,

    /// Enable verbose logging.
    #[serde(default)]
    pub verbose: bool,
}

fn default_api_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_bypass_header() -> String {
    "ngrok-skip-browser-warning".to_string()
}

fn default_bypass_value() -> String {
    "true".to_string()
}

fn default_identity_header() -> String {
    "X-User-ID".to_string()
}

fn default_storage_key() -> String {
    "user".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from environment, reading .env file first.
    pub fn load() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env()
    }

    /// Configuration pointing at `api_url` with every other field defaulted.
    pub fn with_api_url(api_url: impl Into<String>) -> Self {
        Self {
            medtrack_api_url: api_url.into(),
            medtrack_bypass_header: default_bypass_header(),
            medtrack_bypass_value: default_bypass_value(),
            medtrack_identity_header: default_identity_header(),
            medtrack_session_dir: None,
            medtrack_storage_key: default_storage_key(),
            rust_log: default_log_level(),
            verbose: false,
        }
    }

    /// Check if the configuration is valid.
    pub fn validate(&self) -> Result<(), String> {
        let url = Url::parse(&self.medtrack_api_url)
            .map_err(|e| format!("MEDTRACK_API_URL is not a valid URL: {}", e))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err("MEDTRACK_API_URL must use http or https".to_string());
        }

        if url.cannot_be_a_base() {
            return Err("MEDTRACK_API_URL cannot be used as a base address".to_string());
        }

        HeaderName::from_bytes(self.medtrack_bypass_header.as_bytes())
            .map_err(|_| "MEDTRACK_BYPASS_HEADER is not a valid header name".to_string())?;

        HeaderValue::from_str(&self.medtrack_bypass_value)
            .map_err(|_| "MEDTRACK_BYPASS_VALUE is not a valid header value".to_string())?;

        HeaderName::from_bytes(self.medtrack_identity_header.as_bytes())
            .map_err(|_| "MEDTRACK_IDENTITY_HEADER is not a valid header name".to_string())?;

        if self.medtrack_storage_key.trim().is_empty() {
            return Err("MEDTRACK_STORAGE_KEY must not be empty".to_string());
        }

        Ok(())
    }

    /// Log filter directives: verbose when either the `--verbose` flag or
    /// `VERBOSE` asks for it, otherwise `RUST_LOG`.
    pub fn log_filter(&self, verbose_flag: bool) -> &str {
        if verbose_flag || self.verbose {
            VERBOSE_LOG_FILTER
        } else {
            &self.rust_log
        }
    }

    /// Parsed base URL.
    pub fn api_url(&self) -> Result<Url, url::ParseError> {
        Url::parse(&self.medtrack_api_url)
    }

    /// Either the configured or the platform data directory. Falls back to
    /// the current directory when no home directory can be found.
    pub fn session_dir(&self) -> PathBuf {
        self.medtrack_session_dir
            .clone()
            .or_else(|| {
                directories::ProjectDirs::from("", "", "medtrack")
                    .map(|dirs| dirs.data_local_dir().to_owned())
            })
            .unwrap_or_else(|| PathBuf::from("."))
    }
}
