//! Request gateway types
//!
//! The gateway is the only component that talks to the network. The
//! extraction pipeline sees it through [`RequestGateway`] and receives
//! [`RawPage`] values back.

use crate::auth::Session;
use crate::error::Result;
use crate::types::HttpMethod;
use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;

/// Form field carrying the 1-based page number
pub const PAGE_FIELD: &str = "pageNo";

/// A fetched page: status, raw body and decoded text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawPage {
    /// HTTP status code
    pub status: u16,
    /// Raw response bytes
    pub body: Bytes,
    /// Body decoded as text (lossy UTF-8)
    pub text: String,
}

impl RawPage {
    /// Build a page from a status and raw body
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        let body = body.into();
        let text = String::from_utf8_lossy(&body).into_owned();
        Self { status, body, text }
    }

    /// True when the body has no bytes at all
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Check for a 2xx status
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Ordered form (or query) parameters for one request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FormParams(Vec<(String, String)>);

impl FormParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field, replacing any earlier value under the same name
    #[must_use]
    pub fn field(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.set(key, value);
        self
    }

    /// Set a field in place
    pub fn set(&mut self, key: impl Into<String>, value: impl ToString) {
        let key = key.into();
        let value = value.to_string();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
    }

    /// Copy of these params carrying the given page number
    #[must_use]
    pub fn with_page(&self, page: u32) -> Self {
        self.clone().field(PAGE_FIELD, page)
    }

    /// Look up a field value
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Issues one parameterized call against an authenticated session
#[async_trait]
pub trait RequestGateway: Send + Sync {
    /// Send a request and return the page.
    ///
    /// Non-success statuses are errors.
    async fn request(
        &self,
        session: &Session,
        url: &str,
        method: HttpMethod,
        params: &FormParams,
    ) -> Result<RawPage>;

    /// Fetch a binary resource as-is, whatever the status
    async fn download(
        &self,
        session: &Session,
        url: &str,
        method: HttpMethod,
        params: &FormParams,
    ) -> Result<RawPage> {
        self.request(session, url, method, params).await
    }
}
