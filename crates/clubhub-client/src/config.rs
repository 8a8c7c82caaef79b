//! Client configuration.

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{ClientError, ClientResult};

/// Client configuration loaded from environment variables.
///
/// Environment variables are prefixed with `CLUBHUB_`:
/// - `CLUBHUB_API_URL`: REST base endpoint (default: "http://localhost:5000/api")
/// - `CLUBHUB_REQUEST_TIMEOUT_SECS`: per-request timeout (default: none)
/// - `CLUBHUB_SESSION_FILE`: durable session file (default: `~/.clubhub/session.json`)
#[derive(Debug, Clone, Deserialize)]
pub struct ClientConfig {
    /// REST base endpoint
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Optional per-request timeout in seconds
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Location of the durable session file
    #[serde(default)]
    pub session_file: Option<PathBuf>,
}

fn default_api_url() -> String {
    "http://localhost:5000/api".to_string()
}

impl ClientConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> ClientResult<Self> {
        let config = envy::prefixed("CLUBHUB_").from_env::<ClientConfig>()?;
        config.validate()?;
        Ok(config)
    }

    /// Replace the API endpoint, validating it like one read from the
    /// environment.
    pub fn with_api_url(self, api_url: impl Into<String>) -> ClientResult<Self> {
        let config = Self {
            api_url: api_url.into(),
            ..self
        };
        config.validate()?;
        Ok(config)
    }

    /// Base endpoint without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.api_url.trim_end_matches('/')
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Session file, falling back to `~/.clubhub/session.json`.
    pub fn session_path(&self) -> ClientResult<PathBuf> {
        if let Some(path) = &self.session_file {
            return Ok(path.clone());
        }
        let home = dirs::home_dir()
            .ok_or_else(|| ClientError::Config("Could not find home directory".to_string()))?;
        Ok(home.join(".clubhub").join("session.json"))
    }

    pub fn validate(&self) -> ClientResult<()> {
        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(ClientError::Config(format!(
                "api_url must be an http(s) URL, got '{}'",
                self.api_url
            )));
        }
        Ok(())
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            request_timeout_secs: None,
            session_file: None,
        }
    }
}
