//! Page-number driver
//!
//! Requests pages 1, 2, 3, ... one at a time as the caller pulls, parses
//! each into [`PageRecords`], and stops when the pager no longer offers a
//! next page.

use super::types::{NextPageMarker, PageInspector, PageState};
use crate::auth::Session;
use crate::error::{Error, Result};
use crate::extract::{AuditLog, Extractor, PageContext, PageRecords, RecordObserver};
use crate::http::{FormParams, RequestGateway};
use crate::types::HttpMethod;
use futures::stream::{self, LocalBoxStream, StreamExt};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Outer lazy sequence: one item per page
pub type PageStream<'a, E> = LocalBoxStream<'a, Result<PageRecords<E>>>;

/// Walks one paginated listing
pub struct PageDriver<'a, E: Extractor> {
    gateway: Arc<dyn RequestGateway>,
    session: &'a Session,
    endpoint: String,
    method: HttpMethod,
    params: FormParams,
    context: PageContext,
    extractor: Arc<E>,
    inspector: Arc<dyn PageInspector>,
    observer: Arc<dyn RecordObserver>,
}

impl<'a, E: Extractor + 'a> PageDriver<'a, E> {
    /// Create a driver posting `params` to `endpoint`.
    ///
    /// Uses [`NextPageMarker::default`] and the [`AuditLog`] observer until
    /// told otherwise.
    pub fn new(
        gateway: Arc<dyn RequestGateway>,
        session: &'a Session,
        endpoint: impl Into<String>,
        params: FormParams,
        extractor: Arc<E>,
        context: PageContext,
    ) -> Self {
        Self {
            gateway,
            session,
            endpoint: endpoint.into(),
            method: HttpMethod::Post,
            params,
            context,
            extractor,
            inspector: Arc::new(NextPageMarker::default()),
            observer: Arc::new(AuditLog),
        }
    }

    #[must_use]
    pub fn with_method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    #[must_use]
    pub fn with_inspector(mut self, inspector: Arc<dyn PageInspector>) -> Self {
        self.inspector = inspector;
        self
    }

    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn RecordObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Turn the driver into a pull-based page stream.
    ///
    /// Nothing is requested until the first item is polled. Dropping the
    /// stream between pages leaves no request in flight.
    pub fn into_stream(self) -> PageStream<'a, E> {
        stream::unfold((self, PageState::Init.start()), |(driver, state)| async move {
            let PageState::Requesting { page } = state else {
                return None;
            };
            match driver.fetch(state).await {
                Ok((records, next)) => Some((Ok(records), (driver, next))),
                Err(e) => {
                    warn!(
                        resource = %driver.context.resource,
                        page,
                        error = %e,
                        "Pagination stopped"
                    );
                    Some((Err(e), (driver, state.fail())))
                }
            }
        })
        .boxed_local()
    }

    /// Request one page and work out the state after it
    async fn fetch(&self, state: PageState) -> Result<(PageRecords<E>, PageState)> {
        let page = state.page().unwrap_or(1);
        let params = self.params.with_page(page);
        debug!(
            resource = %self.context.resource,
            page,
            endpoint = %self.endpoint,
            "Requesting page"
        );

        let raw = self
            .gateway
            .request(self.session, &self.endpoint, self.method, &params)
            .await?;

        let state = state.received(raw.is_empty());
        if let PageState::Failed { page } = state {
            return Err(Error::empty_response(self.context.resource, page));
        }

        let more = self.inspector.has_next_page(&raw.text);
        let records = PageRecords::parse(
            &raw.text,
            self.context.for_page(page),
            self.extractor.clone(),
            self.observer.clone(),
        );
        info!(
            resource = %self.context.resource,
            page,
            groups = records.group_count(),
            has_next = more,
            "Fetched page"
        );

        let next = state.inspected(more).advance();
        if let PageState::Terminated { pages } = next {
            info!(resource = %self.context.resource, pages, "Listing complete");
        }
        Ok((records, next))
    }
}
