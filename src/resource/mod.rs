//! Resource facades
//!
//! One handler per portal area. Each binds its endpoint's default parameters,
//! pairs the pagination driver with the matching extractor, and returns the
//! page stream. Building a stream does no I/O; requests happen as the caller
//! pulls pages.

mod handlers;
mod params;

pub use handlers::{CardHandler, InvoiceRecordHandler, PortalContext};
pub use params::{
    CardBindingParams, CardListParams, Endpoints, InvoiceQueryParams, DEFAULT_INVOICE_PAGE_SIZE,
};
