//! Card and invoice handlers

use super::params::{CardBindingParams, CardListParams, Endpoints, InvoiceQueryParams};
use crate::auth::Session;
use crate::error::Result;
use crate::extract::{
    AuditLog, CardBindingExtractor, CardListExtractor, Extractor, InvoiceApplyExtractor,
    PageContext, RecordObserver,
};
use crate::http::{FormParams, RawPage, RequestGateway};
use crate::pagination::{NextPageMarker, PageDriver, PageInspector, PageStream};
use crate::types::{HttpMethod, ResourceKind};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Collaborators shared by every handler
#[derive(Clone)]
pub struct PortalContext {
    gateway: Arc<dyn RequestGateway>,
    endpoints: Endpoints,
    inspector: Arc<dyn PageInspector>,
    observer: Arc<dyn RecordObserver>,
}

impl PortalContext {
    /// Default endpoints, pager marker and audit log
    pub fn new(gateway: Arc<dyn RequestGateway>) -> Self {
        Self {
            gateway,
            endpoints: Endpoints::default(),
            inspector: Arc::new(NextPageMarker::default()),
            observer: Arc::new(AuditLog),
        }
    }

    #[must_use]
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
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

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    fn stream<'a, E: Extractor + 'a>(
        &self,
        session: &'a Session,
        endpoint: &str,
        form: FormParams,
        extractor: E,
        context: PageContext,
    ) -> PageStream<'a, E> {
        PageDriver::new(
            self.gateway.clone(),
            session,
            endpoint,
            form,
            Arc::new(extractor),
            context,
        )
        .with_inspector(self.inspector.clone())
        .with_observer(self.observer.clone())
        .into_stream()
    }
}

impl fmt::Debug for PortalContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PortalContext")
            .field("endpoints", &self.endpoints)
            .finish_non_exhaustive()
    }
}

/// Toll card listings
#[derive(Debug, Clone)]
pub struct CardHandler {
    portal: PortalContext,
}

impl CardHandler {
    pub fn new(portal: PortalContext) -> Self {
        Self { portal }
    }

    /// Cards registered to the account, page by page
    pub fn card_list<'a>(
        &self,
        session: &'a Session,
        params: &CardListParams,
    ) -> PageStream<'a, CardListExtractor> {
        self.portal.stream(
            session,
            &self.portal.endpoints.card_list,
            params.to_form(),
            CardListExtractor,
            PageContext::new(ResourceKind::CardList, 1, params.user_type),
        )
    }

    /// Cards bound for invoicing, page by page
    pub fn card_bindings<'a>(
        &self,
        session: &'a Session,
        params: &CardBindingParams,
    ) -> PageStream<'a, CardBindingExtractor> {
        self.portal.stream(
            session,
            &self.portal.endpoints.card_binding,
            params.to_form(),
            CardBindingExtractor,
            PageContext::new(ResourceKind::CardBinding, 1, params.user_type),
        )
    }
}

/// Invoice records for a card and month
#[derive(Debug, Clone)]
pub struct InvoiceRecordHandler {
    portal: PortalContext,
}

impl InvoiceRecordHandler {
    pub fn new(portal: PortalContext) -> Self {
        Self { portal }
    }

    /// Invoice applications, page by page
    pub fn records<'a>(
        &self,
        session: &'a Session,
        params: &InvoiceQueryParams,
    ) -> PageStream<'a, InvoiceApplyExtractor> {
        self.portal.stream(
            session,
            &self.portal.endpoints.invoice_apply,
            params.to_form(),
            InvoiceApplyExtractor,
            PageContext::new(ResourceKind::InvoiceApply, 1, params.user_type)
                .with_period(params.period),
        )
    }

    /// One raw page of the trade listing, unparsed
    pub async fn query_trade_page(
        &self,
        session: &Session,
        params: &InvoiceQueryParams,
        page: u32,
    ) -> Result<RawPage> {
        debug!(
            resource = %ResourceKind::InvoiceTrade,
            page,
            card_id = %params.card_id,
            "Requesting trade page"
        );
        self.portal
            .gateway
            .request(
                session,
                &self.portal.endpoints.invoice_trade,
                HttpMethod::Post,
                &params.to_form().with_page(page),
            )
            .await
    }

    /// Fetch an invoice PDF bundle as-is; the status is passed through
    pub async fn download_bundle(
        &self,
        session: &Session,
        path: &str,
        query: &FormParams,
    ) -> Result<RawPage> {
        debug!(path, "Downloading invoice bundle");
        self.portal
            .gateway
            .download(session, path, HttpMethod::Get, query)
            .await
    }
}

