// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # pss-extract
//!
//! Paginated record extraction for the toll-card service portal
//! (`pss.txffp.com`): toll cards, card bindings and invoice applications,
//! pulled page by page from the logged-in HTML listings.
//!
//! ## Features
//!
//! - **Form Login**: cookie-backed sessions from a username and password
//! - **Lazy Pagination**: one request per pulled page, stops at the last page
//! - **Structural Extraction**: fixed record layouts with strict shape checks
//! - **Audit Observer**: every record rendered to a log target, or captured
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use futures::StreamExt;
//! use pss_extract::auth::authenticated_session;
//! use pss_extract::http::HttpGateway;
//! use pss_extract::resource::{CardHandler, CardListParams, PortalContext};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> pss_extract::Result<()> {
//!     let session = authenticated_session(
//!         "https://pss.txffp.com",
//!         Default::default(),
//!         "user",
//!         "secret",
//!     )
//!     .await?;
//!
//!     let portal = PortalContext::new(Arc::new(HttpGateway::new()));
//!     let mut pages = CardHandler::new(portal).card_list(&session, &CardListParams::default());
//!     while let Some(page) = pages.next().await {
//!         for card in page?.records() {
//!             println!("{:?}", card?);
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  Resource facades: CardHandler, InvoiceRecordHandler          │
//! └──────────────────────────────┬───────────────────────────────┘
//!                                │ Stream<PageRecords>
//! ┌──────────────┬───────────────┴───────────┬──────────────────┐
//! │     Auth     │       Pagination          │     Extract      │
//! ├──────────────┼───────────────────────────┼──────────────────┤
//! │ Form login   │ Page-number state machine │ Card list        │
//! │ Cookie jar   │ Next-page marker          │ Card binding     │
//! │              │ HTTP gateway, pacing      │ Invoice apply    │
//! └──────────────┴───────────────────────────┴──────────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Common types and type aliases
pub mod types;

/// Login and session handles
pub mod auth;

/// HTTP gateway with retry and pacing
pub mod http;

/// Page-number pagination driver
pub mod pagination;

/// Page markup to records
pub mod extract;

/// Card and invoice facades
pub mod resource;

/// Portal configuration
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

// Re-export commonly used types
pub use auth::{authenticated_session, Session};
pub use config::PortalConfig;
pub use extract::{CardRecord, InvoiceRecord};
pub use resource::{CardHandler, InvoiceRecordHandler, PortalContext};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
