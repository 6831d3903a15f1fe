//! Pagination types and traits
//!
//! Defines the page-number state machine and the end-of-listing probe.

use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a pagination run stands.
///
/// ```text
/// Init -> Requesting(1) -> Extracting -> HasNext(true)  -> Requesting(n+1)
///                      \-> Failed                \-> HasNext(false) -> Terminated
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageState {
    /// Nothing requested yet
    #[default]
    Init,
    /// Waiting for the response to `page`
    Requesting { page: u32 },
    /// Response received, records are being prepared
    Extracting { page: u32 },
    /// Page yielded; `more` tells whether the pager offers another page
    HasNext { page: u32, more: bool },
    /// The run stopped on an error at `page`
    Failed { page: u32 },
    /// The listing ended normally after `pages` pages
    Terminated { pages: u32 },
}

impl PageState {
    /// `Init` moves to the first request; other states are unchanged
    #[must_use]
    pub fn start(self) -> Self {
        match self {
            Self::Init => Self::Requesting { page: 1 },
            other => other,
        }
    }

    /// A response arrived; an empty body fails the run
    #[must_use]
    pub fn received(self, empty_body: bool) -> Self {
        match self {
            Self::Requesting { page } if empty_body => Self::Failed { page },
            Self::Requesting { page } => Self::Extracting { page },
            other => other,
        }
    }

    /// The page was handed out and its pager inspected
    #[must_use]
    pub fn inspected(self, more: bool) -> Self {
        match self {
            Self::Extracting { page } => Self::HasNext { page, more },
            other => other,
        }
    }

    /// Follow the pager to the next page or finish
    #[must_use]
    pub fn advance(self) -> Self {
        match self {
            Self::HasNext { page, more: true } => Self::Requesting { page: page + 1 },
            Self::HasNext { page, more: false } => Self::Terminated { pages: page },
            other => other,
        }
    }

    /// Stop the run on an error
    #[must_use]
    pub fn fail(self) -> Self {
        match self.page() {
            Some(page) if !self.is_terminal() => Self::Failed { page },
            _ => self,
        }
    }

    /// Page the state refers to, if any
    pub fn page(&self) -> Option<u32> {
        match *self {
            Self::Init | Self::Terminated { .. } => None,
            Self::Requesting { page }
            | Self::Extracting { page }
            | Self::HasNext { page, .. }
            | Self::Failed { page } => Some(page),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Failed { .. } | Self::Terminated { .. })
    }
}

/// Probes a page's markup for a "more pages" affordance
pub trait PageInspector: Send + Sync {
    fn has_next_page(&self, page_text: &str) -> bool;
}

/// How the pager's "next" link looks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NextPageConfig {
    /// CSS selector for candidate elements
    pub selector: String,
    /// Text the element must contain
    pub text: String,
    /// Class marking the link as unavailable; empty disables the check
    pub disabled_class: String,
}

impl Default for NextPageConfig {
    fn default() -> Self {
        Self {
            selector: "a".to_string(),
            text: "下一页".to_string(),
            disabled_class: "disabled".to_string(),
        }
    }
}

static DEFAULT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a").expect("valid selector"));

/// Finds an enabled "next page" element in the pager
#[derive(Clone)]
pub struct NextPageMarker {
    config: NextPageConfig,
    selector: Selector,
}

impl NextPageMarker {
    /// Build a marker from its configuration
    pub fn new(config: NextPageConfig) -> Result<Self> {
        let selector = Selector::parse(&config.selector).map_err(|e| {
            Error::invalid_value("pagination.selector", format!("{}: {e:?}", config.selector))
        })?;
        Ok(Self { config, selector })
    }

    /// Match any `<a>` containing `text`
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            config: NextPageConfig {
                text: text.into(),
                ..NextPageConfig::default()
            },
            selector: DEFAULT_SELECTOR.clone(),
        }
    }

    pub fn config(&self) -> &NextPageConfig {
        &self.config
    }

    fn is_disabled(&self, class: Option<&str>) -> bool {
        let marker = self.config.disabled_class.as_str();
        !marker.is_empty()
            && class.is_some_and(|class| class.split_whitespace().any(|c| c == marker))
    }
}

impl Default for NextPageMarker {
    fn default() -> Self {
        Self {
            config: NextPageConfig::default(),
            selector: DEFAULT_SELECTOR.clone(),
        }
    }
}

impl PageInspector for NextPageMarker {
    fn has_next_page(&self, page_text: &str) -> bool {
        let document = Html::parse_document(page_text);
        document.select(&self.selector).any(|el| {
            !self.is_disabled(el.value().attr("class"))
                && el.text().collect::<String>().contains(&self.config.text)
        })
    }
}

impl fmt::Debug for NextPageMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NextPageMarker")
            .field("config", &self.config)
            .finish()
    }
}
