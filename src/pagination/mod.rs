//! Pagination module
//!
//! Walks a page-numbered HTML listing of unknown length.
//!
//! # Overview
//!
//! A [`PageDriver`] requests page 1, hands the parsed page to the caller,
//! asks a [`PageInspector`] whether the pager offers another page, and only
//! then (on the next pull) requests page 2. An empty response body ends the
//! run with `EmptyResponse`; pages already handed out stay valid.

mod driver;
mod types;

pub use driver::{PageDriver, PageStream};
pub use types::{NextPageConfig, NextPageMarker, PageInspector, PageState};
