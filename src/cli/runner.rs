//! CLI runner - executes commands

use crate::auth::{FormLoginProvider, Session, SessionProvider};
use crate::cli::commands::{Cli, Commands, InvoiceFilter, OutputFormat};
use crate::config::PortalConfig;
use crate::error::{Error, Result, ResultExt};
use crate::extract::{render_audit, AuditRender, Extractor, PageContext};
use crate::http::{FormParams, HttpGateway};
use crate::pagination::PageStream;
use crate::resource::{
    CardBindingParams, CardHandler, CardListParams, InvoiceQueryParams, InvoiceRecordHandler,
    PortalContext,
};
use futures::StreamExt;
use serde::Serialize;
use serde_json::{json, Value};
use std::fs;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Totals for one command
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Pages pulled
    pub pages: usize,
    /// Records printed
    pub records: usize,
}

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        self.execute().await.map(|_| ())
    }

    /// Run the CLI command and report what was pulled
    pub async fn execute(&self) -> Result<RunStats> {
        let start = Instant::now();
        let config = self.load_config()?;
        let session = self.login(&config).await?;
        let portal = Self::portal(&config)?;

        let stats = match &self.cli.command {
            Commands::Cards { query } => {
                let params = CardListParams::new(self.cli.user_type).with_query(query.clone());
                let pages = CardHandler::new(portal).card_list(&session, &params);
                self.drain(pages).await?
            }
            Commands::Bindings { query } => {
                let params = CardBindingParams::new(self.cli.user_type).with_query(query.clone());
                let pages = CardHandler::new(portal).card_bindings(&session, &params);
                self.drain(pages).await?
            }
            Commands::Invoices { filter } => {
                let params = self.invoice_params(filter);
                let pages = InvoiceRecordHandler::new(portal).records(&session, &params);
                self.drain(pages).await?
            }
            Commands::Trade { filter, page } => {
                let params = self.invoice_params(filter);
                let raw = InvoiceRecordHandler::new(portal)
                    .query_trade_page(&session, &params, *page)
                    .await?;
                println!("{}", raw.text);
                RunStats {
                    pages: 1,
                    records: 0,
                }
            }
            Commands::Download { path, output } => {
                let raw = InvoiceRecordHandler::new(portal)
                    .download_bundle(&session, path, &FormParams::new())
                    .await?;
                if !raw.is_success() {
                    return Err(Error::http_status(raw.status, raw.text));
                }
                fs::write(output, &raw.body)
                    .with_context(|| format!("Failed to write '{}'", output.display()))?;
                info!(
                    path = %path,
                    bytes = raw.body.len(),
                    output = %output.display(),
                    "Saved bundle"
                );
                RunStats::default()
            }
        };

        self.output_message(&json!({
            "type": "SUMMARY",
            "pages": stats.pages,
            "records": stats.records,
            "elapsed_ms": start.elapsed().as_millis() as u64,
        }));
        Ok(stats)
    }

    /// Load the config file, or the defaults when none is given
    fn load_config(&self) -> Result<PortalConfig> {
        match &self.cli.config {
            Some(path) => PortalConfig::load(path),
            None => Ok(PortalConfig::default()),
        }
    }

    async fn login(&self, config: &PortalConfig) -> Result<Session> {
        let (username, password) = config
            .credentials
            .resolve(self.cli.username.clone(), self.cli.password.clone())?;
        FormLoginProvider::new(&config.base_url, config.login.clone())
            .with_user_agent(config.user_agent())
            .with_timeout(config.timeout())
            .authenticate(&username, &password)
            .await
    }

    fn portal(config: &PortalConfig) -> Result<PortalContext> {
        let gateway = HttpGateway::with_config(config.gateway_config()?);
        Ok(PortalContext::new(Arc::new(gateway))
            .with_endpoints(config.endpoints.clone())
            .with_inspector(Arc::new(config.next_page_marker()?)))
    }

    fn invoice_params(&self, filter: &InvoiceFilter) -> InvoiceQueryParams {
        InvoiceQueryParams::new(filter.card_id.clone(), filter.month)
            .with_page_size(filter.page_size)
            .with_user_type(self.cli.user_type)
            .with_title(filter.title.clone())
            .with_station(filter.station.clone())
    }

    /// Pull pages until the listing ends or `--max-pages` is reached
    async fn drain<E>(&self, pages: PageStream<'_, E>) -> Result<RunStats>
    where
        E: Extractor + 'static,
        E::Record: Serialize,
    {
        let mut pages = match self.cli.max_pages {
            Some(max) => pages.take(max).boxed_local(),
            None => pages,
        };

        let mut stats = RunStats::default();
        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| Self::aborted(e, stats))?;
            stats.pages += 1;
            for record in page.records() {
                let record = record.map_err(|e| Self::aborted(e, stats))?;
                self.output_record(page.context(), &record);
                stats.records += 1;
            }
        }

        info!(pages = stats.pages, records = stats.records, "Run complete");
        Ok(stats)
    }

    fn aborted(e: Error, stats: RunStats) -> Error {
        if e.is_fatal_for_listing() {
            warn!(
                pages = stats.pages,
                records = stats.records,
                "Listing aborted after partial output"
            );
        }
        e
    }

    fn output_record<R>(&self, ctx: &PageContext, record: &R)
    where
        R: Serialize + AuditRender,
    {
        match self.cli.format {
            OutputFormat::Json => self.output_message(&json!({
                "type": "RECORD",
                "resource": ctx.resource,
                "page": ctx.page,
                "record": record,
            })),
            OutputFormat::Pretty => println!("{}", render_audit(ctx, record)),
        }
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}
