//! Record types and the extractor abstraction

use super::observer::{AuditRender, RecordObserver};
use crate::error::Result;
use crate::types::{Period, ResourceKind, UserType};
use scraper::html::Select;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// What the extractor knows about the page besides its markup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContext {
    /// Listing the page belongs to
    pub resource: ResourceKind,
    /// 1-based page number
    pub page: u32,
    /// Account type the listing was requested for
    pub user_type: UserType,
    /// Invoice month, for invoice listings
    pub period: Option<Period>,
}

impl PageContext {
    pub fn new(resource: ResourceKind, page: u32, user_type: UserType) -> Self {
        Self {
            resource,
            page,
            user_type,
            period: None,
        }
    }

    #[must_use]
    pub fn with_period(mut self, period: Period) -> Self {
        self.period = Some(period);
        self
    }

    /// Same context, another page
    #[must_use]
    pub fn for_page(&self, page: u32) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }
}

/// One toll card, from the card list or card binding page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardRecord {
    pub region: String,
    /// Trailing 20 characters of the IC card text
    pub ic_card_id: String,
    pub plate_number: String,
    pub card_id: String,
    pub card_type: UserType,
}

/// One invoice application, from the invoice query-apply page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceRecord {
    pub taxpayer_id: String,
    pub apply_date: String,
    pub record_count: String,
    pub invoice_type: String,
    pub company: String,
    pub amount: String,
    pub invoice_id: String,
    pub status: String,
}

/// Maps one page's markup to records
pub trait Extractor: Send + Sync {
    type Record: AuditRender + Send + 'static;

    /// Listing this extractor understands
    fn resource(&self) -> ResourceKind;

    /// Selector for the node group holding one record
    fn groups(&self) -> &Selector;

    /// Build a record from one node group
    fn extract(&self, group: ElementRef<'_>, ctx: &PageContext) -> Result<Self::Record>;
}

/// One parsed page, ready to yield its records.
///
/// Records are extracted one at a time as [`Records`] is pulled. The
/// observer sees every successfully extracted record.
pub struct PageRecords<E: Extractor> {
    context: PageContext,
    document: Html,
    extractor: Arc<E>,
    observer: Arc<dyn RecordObserver>,
}

impl<E: Extractor> PageRecords<E> {
    /// Parse a page's text
    pub fn parse(
        text: &str,
        context: PageContext,
        extractor: Arc<E>,
        observer: Arc<dyn RecordObserver>,
    ) -> Self {
        Self {
            context,
            document: Html::parse_document(text),
            extractor,
            observer,
        }
    }

    /// 1-based page number
    pub fn page(&self) -> u32 {
        self.context.page
    }

    pub fn context(&self) -> &PageContext {
        &self.context
    }

    /// Number of record node groups on the page
    pub fn group_count(&self) -> usize {
        self.document.select(self.extractor.groups()).count()
    }

    /// Records in document order; stops after the first error
    pub fn records(&self) -> Records<'_, E> {
        Records {
            page: self,
            groups: self.document.select(self.extractor.groups()),
            failed: false,
        }
    }
}

impl<E: Extractor> fmt::Debug for PageRecords<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PageRecords")
            .field("context", &self.context)
            .finish_non_exhaustive()
    }
}

impl<'p, E: Extractor> IntoIterator for &'p PageRecords<E> {
    type Item = Result<E::Record>;
    type IntoIter = Records<'p, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.records()
    }
}

/// Lazy record iterator over one page
pub struct Records<'p, E: Extractor> {
    page: &'p PageRecords<E>,
    groups: Select<'p, 'p>,
    failed: bool,
}

impl<E: Extractor> Iterator for Records<'_, E> {
    type Item = Result<E::Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let group = self.groups.next()?;
        let page = self.page;
        match page.extractor.extract(group, &page.context) {
            Ok(record) => {
                page.observer.on_record(&page.context, &record);
                Some(Ok(record))
            }
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}
