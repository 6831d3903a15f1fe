//! Record extraction module
//!
//! Maps one page of portal markup to structured records.
//!
//! # Overview
//!
//! An [`Extractor`] names the node groups that hold one record each and turns
//! a single group into a record. [`PageRecords`] owns a parsed page and hands
//! records out lazily, in document order, notifying a [`RecordObserver`] for
//! each one.
//!
//! Any missing node is an `ExtractionShape` error; no field is ever defaulted.

mod cards;
pub mod dom;
mod invoices;
mod observer;
mod types;

pub use cards::{CardBindingExtractor, CardListExtractor};
pub use invoices::InvoiceApplyExtractor;
pub use observer::{render_audit, AuditLog, AuditRender, MemoryObserver, NoopObserver, RecordObserver};
pub use types::{CardRecord, Extractor, InvoiceRecord, PageContext, PageRecords, Records};

use std::sync::Arc;

/// Parse a page and prepare its records.
///
/// Pure in `(text, context)`: the same input always yields the same records.
pub fn extract_page<E: Extractor>(
    extractor: Arc<E>,
    text: &str,
    context: PageContext,
    observer: Arc<dyn RecordObserver>,
) -> PageRecords<E> {
    PageRecords::parse(text, context, extractor, observer)
}

#[cfg(test)]
mod tests;
