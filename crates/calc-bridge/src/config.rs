//! Endpoint configuration
//!
//! Configuration is assembled from layers, later layers winning: a TOML
//! file, then the environment, then explicit overrides (CLI flags). The
//! result is validated once into an immutable [`BridgeConfig`].

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{BridgeError, Result};

/// Environment variable overriding the calculation service URL
pub const CALC_URL_ENV: &str = "CALC_BRIDGE_CALC_URL";

/// Environment variable overriding the batch service URL
pub const BATCH_URL_ENV: &str = "CALC_BRIDGE_BATCH_URL";

/// Which remote service family a call goes to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Single-call service (`/calc`)
    Calc,
    /// Batch service (`/eval_sheet`, `/batch_calc`)
    Batch,
}

/// Validated endpoint configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BridgeConfig {
    calc_url: String,
    batch_url: String,
    timeout_secs: Option<u64>,
}

impl BridgeConfig {
    /// Build a configuration from two base URLs
    pub fn new(calc_url: &str, batch_url: &str) -> Result<Self> {
        ConfigLayer {
            calc_url: Some(calc_url.to_string()),
            batch_url: Some(batch_url.to_string()),
            timeout_secs: None,
        }
        .build()
    }

    /// Parse a TOML document and validate it
    pub fn from_toml(input: &str) -> Result<Self> {
        ConfigLayer::from_toml(input)?.build()
    }

    /// Load the full layered configuration
    ///
    /// `path` is optional; the environment and `overrides` are applied on top.
    pub fn load(path: Option<&Path>, overrides: ConfigLayer) -> Result<Self> {
        let file = match path {
            Some(path) => ConfigLayer::read(path)?,
            None => ConfigLayer::default(),
        };
        file.merge(ConfigLayer::from_env()).merge(overrides).build()
    }

    /// Set a request timeout
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Base URL of an endpoint family, without trailing slash
    pub fn base_url(&self, endpoint: Endpoint) -> &str {
        match endpoint {
            Endpoint::Calc => &self.calc_url,
            Endpoint::Batch => &self.batch_url,
        }
    }

    /// Full URL of a route on an endpoint family
    pub fn url(&self, endpoint: Endpoint, route: &str) -> String {
        format!("{}/{}", self.base_url(endpoint), route.trim_start_matches('/'))
    }

    /// Request timeout, if one is configured
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

/// One partial layer of configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigLayer {
    pub calc_url: Option<String>,
    pub batch_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl ConfigLayer {
    /// Parse a TOML document
    pub fn from_toml(input: &str) -> Result<Self> {
        toml::from_str(input).map_err(|e| BridgeError::config(e.to_string()))
    }

    /// Read a TOML file
    pub fn read(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "loading config file");
        let text = std::fs::read_to_string(path)
            .map_err(|e| BridgeError::config(format!("cannot read '{}': {}", path.display(), e)))?;
        Self::from_toml(&text)
    }

    /// Layer taken from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Layer taken from an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            calc_url: lookup(CALC_URL_ENV).filter(|v| !v.trim().is_empty()),
            batch_url: lookup(BATCH_URL_ENV).filter(|v| !v.trim().is_empty()),
            timeout_secs: None,
        }
    }

    /// Stack `other` on top of `self`
    pub fn merge(self, other: ConfigLayer) -> Self {
        Self {
            calc_url: other.calc_url.or(self.calc_url),
            batch_url: other.batch_url.or(self.batch_url),
            timeout_secs: other.timeout_secs.or(self.timeout_secs),
        }
    }

    /// Validate into a final configuration
    pub fn build(self) -> Result<BridgeConfig> {
        let calc_url = validate_url("calc_url", self.calc_url)?;
        let batch_url = validate_url("batch_url", self.batch_url)?;
        if self.timeout_secs == Some(0) {
            return Err(BridgeError::config("timeout_secs must be positive"));
        }
        debug!(%calc_url, %batch_url, "configuration ready");
        Ok(BridgeConfig {
            calc_url,
            batch_url,
            timeout_secs: self.timeout_secs,
        })
    }
}

fn validate_url(field: &str, url: Option<String>) -> Result<String> {
    let url = url.unwrap_or_default();
    let url = url.trim().trim_end_matches('/');
    if url.is_empty() {
        return Err(BridgeError::config(format!("{} is not set", field)));
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(BridgeError::config(format!(
            "{} must start with http:// or https://, got '{}'",
            field, url
        )));
    }
    Ok(url.to_string())
}
