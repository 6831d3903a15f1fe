//! HTTP gateway with optional retry and pacing
//!
//! Sends form-encoded requests over the session's cookie-carrying client.
//! Timeouts, pacing and retries are gateway configuration; callers above
//! this layer never retry.

use super::pacing::{Pace, Pacer};
use super::types::{FormParams, RawPage, RequestGateway};
use crate::auth::Session;
use crate::error::{is_retryable_status, Error, Result};
use crate::types::{BackoffType, HttpMethod};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

/// Configuration for the HTTP gateway
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Request timeout
    pub timeout: Duration,
    /// Maximum number of retries (0 = one attempt only)
    pub max_retries: u32,
    /// Initial delay for backoff
    pub initial_backoff: Duration,
    /// Maximum delay for backoff
    pub max_backoff: Duration,
    /// Type of backoff strategy
    pub backoff_type: BackoffType,
    /// Request pacing (`None` sends as fast as the portal answers)
    pub pace: Option<Pace>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 0,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(30),
            backoff_type: BackoffType::Exponential,
            pace: Some(Pace::default()),
        }
    }
}

impl GatewayConfig {
    /// Create a new config builder
    pub fn builder() -> GatewayConfigBuilder {
        GatewayConfigBuilder::default()
    }
}

/// Builder for gateway config
#[derive(Debug, Default)]
pub struct GatewayConfigBuilder {
    config: GatewayConfig,
}

impl GatewayConfigBuilder {
    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set max retries
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    /// Set backoff configuration
    pub fn backoff(mut self, backoff_type: BackoffType, initial: Duration, max: Duration) -> Self {
        self.config.backoff_type = backoff_type;
        self.config.initial_backoff = initial;
        self.config.max_backoff = max;
        self
    }

    /// Pace requests
    pub fn pace(mut self, pace: Pace) -> Self {
        self.config.pace = Some(pace);
        self
    }

    /// Send without pacing
    pub fn unpaced(mut self) -> Self {
        self.config.pace = None;
        self
    }

    /// Build the config
    pub fn build(self) -> GatewayConfig {
        self.config
    }
}

/// Production gateway over reqwest
pub struct HttpGateway {
    config: GatewayConfig,
    pacer: Option<Pacer>,
}

impl HttpGateway {
    /// Create a gateway with default configuration
    pub fn new() -> Self {
        Self::with_config(GatewayConfig::default())
    }

    /// Create a gateway with custom configuration
    pub fn with_config(config: GatewayConfig) -> Self {
        let pacer = config.pace.map(Pacer::new);
        Self { config, pacer }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn is_paced(&self) -> bool {
        self.pacer.is_some()
    }

    /// Send one request, retrying per config, and return the page whatever its status
    async fn send_raw(
        &self,
        session: &Session,
        url: &str,
        method: HttpMethod,
        params: &FormParams,
    ) -> Result<RawPage> {
        let full_url = session.resolve(url)?;
        let max_retries = self.config.max_retries;
        let mut attempt = 0;

        loop {
            if let Some(pacer) = &self.pacer {
                pacer.acquire().await;
            }

            let mut req = session
                .client()
                .request(method.into(), full_url.clone())
                .timeout(self.config.timeout);
            req = match method {
                HttpMethod::Get => req.query(params),
                HttpMethod::Post => req.form(params),
            };

            let result = match req.send().await {
                Ok(response) => {
                    let status = response.status().as_u16();
                    response
                        .bytes()
                        .await
                        .map(|body| RawPage::new(status, body))
                        .map_err(Error::Http)
                }
                Err(e) if e.is_timeout() => Err(Error::Timeout {
                    timeout_ms: self.config.timeout.as_millis() as u64,
                }),
                Err(e) => Err(Error::Http(e)),
            };

            let retry = match &result {
                Ok(page) => is_retryable_status(page.status),
                Err(e) => e.is_retryable(),
            };
            if !retry || attempt >= max_retries {
                if let Ok(page) = &result {
                    debug!(
                        "{} {} -> {} ({} bytes)",
                        method_name(method),
                        full_url,
                        page.status,
                        page.body.len()
                    );
                }
                return result;
            }

            let delay = self.calculate_backoff(attempt);
            warn!(
                "Request to {} failed, attempt {}/{}, retrying in {:?}",
                full_url,
                attempt + 1,
                max_retries + 1,
                delay
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// Calculate backoff delay for a given attempt
    pub fn calculate_backoff(&self, attempt: u32) -> Duration {
        let delay = match self.config.backoff_type {
            BackoffType::Constant => self.config.initial_backoff,
            BackoffType::Linear => self.config.initial_backoff * (attempt + 1),
            BackoffType::Exponential => {
                let factor = 2u32.saturating_pow(attempt);
                self.config.initial_backoff * factor
            }
        };

        std::cmp::min(delay, self.config.max_backoff)
    }
}

#[async_trait]
impl RequestGateway for HttpGateway {
    async fn request(
        &self,
        session: &Session,
        url: &str,
        method: HttpMethod,
        params: &FormParams,
    ) -> Result<RawPage> {
        let page = self.send_raw(session, url, method, params).await?;
        // Bodiless responses go to the caller whatever the status; the
        // driver turns them into `EmptyResponse`.
        if !page.is_success() && !page.is_empty() {
            return Err(Error::http_status(page.status, page.text));
        }
        Ok(page)
    }

    async fn download(
        &self,
        session: &Session,
        url: &str,
        method: HttpMethod,
        params: &FormParams,
    ) -> Result<RawPage> {
        self.send_raw(session, url, method, params).await
    }
}

impl Default for HttpGateway {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for HttpGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGateway")
            .field("config", &self.config)
            .field("pacer", &self.pacer)
            .finish()
    }
}

fn method_name(method: HttpMethod) -> &'static str {
    match method {
        HttpMethod::Get => "GET",
        HttpMethod::Post => "POST",
    }
}
