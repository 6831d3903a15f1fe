//! Portal configuration
//!
//! Everything has a default, so an empty file (or no file) describes the
//! public portal. Files are read as YAML unless they end in `.json`.

use crate::auth::{default_user_agent, LoginConfig};
use crate::error::{Error, Result};
use crate::http::{GatewayConfig, Pace};
use crate::pagination::{NextPageConfig, NextPageMarker};
use crate::resource::Endpoints;
use crate::types::BackoffType;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Default portal address
pub const DEFAULT_BASE_URL: &str = "https://pss.txffp.com";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete portal configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    /// Portal address all paths are resolved against
    pub base_url: String,

    /// Listing paths
    pub endpoints: Endpoints,

    /// Login form
    pub login: LoginConfig,

    /// Transport settings
    pub http: HttpConfig,

    /// Pager "next" link
    pub pagination: NextPageConfig,

    /// Stored credentials
    pub credentials: Credentials,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            endpoints: Endpoints::default(),
            login: LoginConfig::default(),
            http: HttpConfig::default(),
            pagination: NextPageConfig::default(),
            credentials: Credentials::default(),
        }
    }
}

impl PortalConfig {
    /// Load and validate a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::FileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                Error::config(format!(
                    "Failed to read config file '{}': {e}",
                    path.display()
                ))
            }
        })?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json_str(&content)
        } else {
            Self::from_yaml_str(&content)
        }
    }

    /// Parse and validate YAML
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        // An empty document deserializes to unit, not to a map.
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate JSON
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that would only fail later, mid-run
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.base_url)
            .map_err(|e| Error::invalid_value("base_url", format!("{}: {e}", self.base_url)))?;

        let endpoints = [
            ("endpoints.card_list", &self.endpoints.card_list),
            ("endpoints.card_binding", &self.endpoints.card_binding),
            ("endpoints.invoice_apply", &self.endpoints.invoice_apply),
            ("endpoints.invoice_trade", &self.endpoints.invoice_trade),
            ("login.path", &self.login.path),
        ];
        for (field, path) in endpoints {
            if path.is_empty() {
                return Err(Error::invalid_value(field, "path cannot be empty"));
            }
        }

        if self.http.timeout_seconds == 0 {
            return Err(Error::invalid_value("http.timeout_seconds", "must be positive"));
        }
        self.http.rate_limit.pace()?;

        NextPageMarker::new(self.pagination.clone())?;
        Ok(())
    }

    /// Gateway settings for [`crate::http::HttpGateway`]
    pub fn gateway_config(&self) -> Result<GatewayConfig> {
        let http = &self.http;
        let builder = GatewayConfig::builder()
            .timeout(self.timeout())
            .max_retries(http.max_retries)
            .backoff(
                http.backoff.backoff_type,
                Duration::from_millis(http.backoff.initial_ms),
                Duration::from_millis(http.backoff.max_ms),
            );
        let builder = match http.rate_limit.pace()? {
            Some(pace) => builder.pace(pace),
            None => builder.unpaced(),
        };
        Ok(builder.build())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_seconds)
    }

    pub fn user_agent(&self) -> String {
        self.http
            .user_agent
            .clone()
            .unwrap_or_else(default_user_agent)
    }

    /// Pager inspector built from `pagination`
    pub fn next_page_marker(&self) -> Result<NextPageMarker> {
        NextPageMarker::new(self.pagination.clone())
    }
}

// ============================================================================
// HTTP Config
// ============================================================================

/// Transport settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Request timeout in seconds
    pub timeout_seconds: u64,

    /// User agent; defaults to `pss-extract/<version>`
    pub user_agent: Option<String>,

    /// Gateway retries per request (0 = single attempt)
    pub max_retries: u32,

    /// Retry backoff
    pub backoff: BackoffConfig,

    /// Request pacing
    pub rate_limit: RateLimitConfig,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
            user_agent: None,
            max_retries: 0,
            backoff: BackoffConfig::default(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

/// Backoff configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackoffConfig {
    /// Type of backoff
    #[serde(rename = "type")]
    pub backoff_type: BackoffType,

    /// Initial delay in milliseconds
    pub initial_ms: u64,

    /// Maximum delay in milliseconds
    pub max_ms: u64,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            backoff_type: BackoffType::Exponential,
            initial_ms: 500,
            max_ms: 30_000,
        }
    }
}

/// Rate limiting configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub requests_per_second: u32,
    pub burst_size: u32,
}

impl RateLimitConfig {
    /// The pace to send at, or `None` when disabled
    pub fn pace(&self) -> Result<Option<Pace>> {
        if !self.enabled {
            return Ok(None);
        }
        Pace::new(self.requests_per_second, self.burst_size).map(Some)
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        let pace = Pace::default();
        Self {
            enabled: true,
            requests_per_second: pace.per_second(),
            burst_size: pace.burst(),
        }
    }
}

// ============================================================================
// Credentials
// ============================================================================

/// Portal login, usually supplied through the environment instead
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Credentials {
    /// Overlay explicitly given values and require both parts
    pub fn resolve(
        &self,
        username: Option<String>,
        password: Option<String>,
    ) -> Result<(String, String)> {
        let username = username
            .or_else(|| self.username.clone())
            .ok_or_else(|| Error::missing_field("credentials.username"))?;
        let password = password
            .or_else(|| self.password.clone())
            .ok_or_else(|| Error::missing_field("credentials.password"))?;
        Ok((username, password))
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}
