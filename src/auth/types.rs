//! Session and login configuration types

use crate::error::{Error, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use url::Url;

/// Default user agent for portal requests
pub fn default_user_agent() -> String {
    format!("pss-extract/{}", env!("CARGO_PKG_VERSION"))
}

/// Authenticated transport handle.
///
/// Wraps a cookie-carrying client and the portal base URL. Cloning shares the
/// underlying connection pool and cookie jar; nothing in the extraction
/// pipeline mutates it.
#[derive(Clone)]
pub struct Session {
    client: Client,
    base_url: Url,
}

impl Session {
    /// Wrap an existing client
    pub fn new(client: Client, base_url: &str) -> Result<Self> {
        Ok(Self {
            client,
            base_url: Url::parse(base_url)?,
        })
    }

    /// A session with an empty cookie jar, no login performed
    pub fn anonymous(base_url: &str) -> Result<Self> {
        Self::new(build_client(&default_user_agent(), None)?, base_url)
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve a path against the base URL; absolute URLs pass through
    pub fn resolve(&self, path: &str) -> Result<Url> {
        if path.starts_with("http://") || path.starts_with("https://") {
            return Ok(Url::parse(path)?);
        }
        Ok(self.base_url.join(path)?)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

/// Build a client with a cookie store, as the portal tracks logins by cookie
pub(crate) fn build_client(user_agent: &str, timeout: Option<Duration>) -> Result<Client> {
    let mut builder = Client::builder().cookie_store(true).user_agent(user_agent);
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }
    builder.build().map_err(Error::Http)
}

/// Login form description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginConfig {
    /// Path (or absolute URL) the login form posts to
    pub path: String,
    /// Form field carrying the username
    pub username_field: String,
    /// Form field carrying the password
    pub password_field: String,
    /// Static fields sent with every login
    pub extra_fields: BTreeMap<String, String>,
    /// Text that only appears on a rejected login
    pub failure_marker: String,
}

impl Default for LoginConfig {
    fn default() -> Self {
        Self {
            path: "/pss/app/login/login".to_string(),
            username_field: "loginName".to_string(),
            password_field: "password".to_string(),
            extra_fields: BTreeMap::new(),
            failure_marker: "用户名或密码错误".to_string(),
        }
    }
}
