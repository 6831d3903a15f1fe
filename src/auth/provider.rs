//! Session providers
//!
//! Turns credentials into an authenticated [`Session`]. A rejected login is
//! reported as `AuthFailed` and never retried.

use super::types::{build_client, default_user_agent, LoginConfig, Session};
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, info};

/// Authenticates credentials and returns a session handle
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn authenticate(&self, username: &str, password: &str) -> Result<Session>;
}

/// Logs in by posting the portal's login form
#[derive(Debug, Clone)]
pub struct FormLoginProvider {
    base_url: String,
    login: LoginConfig,
    user_agent: String,
    timeout: Duration,
}

impl FormLoginProvider {
    pub fn new(base_url: impl Into<String>, login: LoginConfig) -> Self {
        Self {
            base_url: base_url.into(),
            login,
            user_agent: default_user_agent(),
            timeout: Duration::from_secs(30),
        }
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn login_config(&self) -> &LoginConfig {
        &self.login
    }
}

#[async_trait]
impl SessionProvider for FormLoginProvider {
    async fn authenticate(&self, username: &str, password: &str) -> Result<Session> {
        let session = Session::new(
            build_client(&self.user_agent, Some(self.timeout))?,
            &self.base_url,
        )?;
        let url = session.resolve(&self.login.path)?;

        let mut form: Vec<(&str, &str)> = vec![
            (self.login.username_field.as_str(), username),
            (self.login.password_field.as_str(), password),
        ];
        for (key, value) in &self.login.extra_fields {
            form.push((key.as_str(), value.as_str()));
        }

        debug!("Logging in as {username} at {url}");
        let response = session
            .client()
            .post(url)
            .form(&form)
            .send()
            .await
            .map_err(Error::Http)?;

        let status = response.status();
        let body = response.text().await.map_err(Error::Http)?;

        if !status.is_success() {
            return Err(Error::auth_failed(format!(
                "login request returned status {}",
                status.as_u16()
            )));
        }
        if body.is_empty() {
            return Err(Error::auth_failed("login response was empty"));
        }
        if !self.login.failure_marker.is_empty() && body.contains(&self.login.failure_marker) {
            return Err(Error::auth_failed("credentials rejected"));
        }

        info!("Logged in as {username}");
        Ok(session)
    }
}

/// Log in with the form provider and return the session
pub async fn authenticated_session(
    base_url: &str,
    login: LoginConfig,
    username: &str,
    password: &str,
) -> Result<Session> {
    FormLoginProvider::new(base_url, login)
        .authenticate(username, password)
        .await
}
