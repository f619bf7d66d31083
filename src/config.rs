//! Remote API client configuration

use crate::error::Result;
use url::Url;

/// Base address used when nothing else is configured
pub const DEFAULT_BASE_URL: &str = "https://api.convertkr.com";

/// Environment variable that overrides [`DEFAULT_BASE_URL`]
pub const BASE_URL_ENV: &str = "FILE_API_BASE_URL";

/// Configuration for the shared remote API client.
///
/// Only the base address varies per deployment. Requests always carry a JSON
/// content type and are never retried or timed out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base address of the remote API (default: https://api.convertkr.com)
    pub base_url: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Default configuration, with the base address taken from
    /// `FILE_API_BASE_URL` when that variable is set and non-empty.
    pub fn from_env() -> Self {
        match std::env::var(BASE_URL_ENV) {
            Ok(value) if !value.trim().is_empty() => Self::new(value.trim()),
            _ => Self::default(),
        }
    }

    /// Resolve `path` (e.g. `/merges`) against the base address.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        let base = Url::parse(self.base_url.trim_end_matches('/'))?;
        let mut joined = base.clone();
        let prefix = base.path().trim_end_matches('/');
        joined.set_path(&format!("{}/{}", prefix, path.trim_start_matches('/')));
        Ok(joined)
    }
}
