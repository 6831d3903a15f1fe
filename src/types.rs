//! Common types used throughout pss-extract
//!
//! This module contains shared type definitions used across multiple modules.

use crate::error::{Error, Result};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// HTTP Types
// ============================================================================

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    #[default]
    Post,
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        }
    }
}

/// Backoff strategy for gateway retries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffType {
    Constant,
    Linear,
    #[default]
    Exponential,
}

// ============================================================================
// Portal Vocabulary
// ============================================================================

/// Account type the listing is requested for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserType {
    #[default]
    Company,
    Personal,
}

impl UserType {
    /// Value sent in the `userType` form field
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Company => "COMPANY",
            Self::Personal => "PERSONAL",
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "COMPANY" => Ok(Self::Company),
            "PERSONAL" => Ok(Self::Personal),
            other => Err(Error::invalid_value(
                "user_type",
                format!("expected COMPANY or PERSONAL, got '{other}'"),
            )),
        }
    }
}

/// Listing endpoints served by the portal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    CardList,
    CardBinding,
    InvoiceApply,
    InvoiceTrade,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CardList => "card-list",
            Self::CardBinding => "card-binding",
            Self::InvoiceApply => "invoice-apply",
            Self::InvoiceTrade => "invoice-trade",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Period
// ============================================================================

/// Invoice month, written `YYYYMM` on the wire (e.g. `201805`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Period {
    year: i32,
    month: u32,
}

impl Period {
    /// Create a period, validating the month
    pub fn new(year: i32, month: u32) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|d| Self {
                year: d.year(),
                month: d.month(),
            })
            .ok_or_else(|| Error::invalid_value("period", format!("{year}-{month} is not a month")))
    }

    /// The month containing the given date
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}{:02}", self.year, self.month)
    }
}

impl FromStr for Period {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.len() != 6 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(Error::invalid_value(
                "period",
                format!("expected YYYYMM, got '{s}'"),
            ));
        }
        let date = NaiveDate::parse_from_str(&format!("{s}01"), "%Y%m%d")
            .map_err(|e| Error::invalid_value("period", format!("'{s}': {e}")))?;
        Ok(Self::from_date(date))
    }
}

impl Serialize for Period {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Period {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(u32),
        }

        let text = match Raw::deserialize(deserializer)? {
            Raw::Text(s) => s,
            Raw::Number(n) => n.to_string(),
        };
        text.parse().map_err(serde::de::Error::custom)
    }
}
