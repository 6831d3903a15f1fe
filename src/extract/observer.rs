//! Record observers
//!
//! Every extracted record is handed to a [`RecordObserver`] right after it is
//! produced. The default [`AuditLog`] renders it through a fixed template and
//! writes it to the `pss_extract::audit` tracing target.

use super::types::{CardRecord, InvoiceRecord, PageContext};
use crate::types::ResourceKind;
use std::fmt::Write as _;
use std::sync::Mutex;
use tracing::info;

/// Labelled fields of a record, in template order
pub trait AuditRender {
    fn audit_fields(&self) -> Vec<(&'static str, &str)>;
}

impl AuditRender for CardRecord {
    fn audit_fields(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("ETC ID", self.card_id.as_str()),
            ("IC CARD", self.ic_card_id.as_str()),
            ("PLATE NUMBER", self.plate_number.as_str()),
            ("REGION", self.region.as_str()),
            ("TYPE", self.card_type.as_str()),
        ]
    }
}

impl AuditRender for InvoiceRecord {
    fn audit_fields(&self) -> Vec<(&'static str, &str)> {
        vec![
            ("RECORD ID", self.invoice_id.as_str()),
            ("APPLY DATETIME", self.apply_date.as_str()),
            ("AMOUNT", self.amount.as_str()),
            ("TYPE", self.invoice_type.as_str()),
            ("COMPANY", self.company.as_str()),
            ("TAXPAYER ID", self.taxpayer_id.as_str()),
            ("COUNT", self.record_count.as_str()),
            ("STATUS", self.status.as_str()),
        ]
    }
}

/// Render a record through the audit template.
///
/// ```text
/// ETC card info (page 1)
///               ETC ID:  1101181023000012
///              IC CARD:  11011810230000123456
/// ```
pub fn render_audit(ctx: &PageContext, record: &dyn AuditRender) -> String {
    let mut out = match (ctx.resource, ctx.period) {
        (ResourceKind::CardList | ResourceKind::CardBinding, _) => {
            format!("ETC card info (page {})\n", ctx.page)
        }
        (_, Some(period)) => format!("{period} invoice records (page {})\n", ctx.page),
        (_, None) => format!("invoice records (page {})\n", ctx.page),
    };
    for (label, value) in record.audit_fields() {
        let _ = writeln!(out, "{label:>20}:  {value}");
    }
    out
}

/// Receives each record after extraction
pub trait RecordObserver: Send + Sync {
    fn on_record(&self, ctx: &PageContext, record: &dyn AuditRender);
}

/// Writes each record to the audit log target
#[derive(Debug, Clone, Copy, Default)]
pub struct AuditLog;

impl RecordObserver for AuditLog {
    fn on_record(&self, ctx: &PageContext, record: &dyn AuditRender) {
        info!(target: "pss_extract::audit", "{}", render_audit(ctx, record));
    }
}

/// Discards records
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl RecordObserver for NoopObserver {
    fn on_record(&self, _ctx: &PageContext, _record: &dyn AuditRender) {}
}

/// Keeps rendered records in memory
#[derive(Debug, Default)]
pub struct MemoryObserver {
    entries: Mutex<Vec<String>>,
}

impl MemoryObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rendered records seen so far
    pub fn entries(&self) -> Vec<String> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RecordObserver for MemoryObserver {
    fn on_record(&self, ctx: &PageContext, record: &dyn AuditRender) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(render_audit(ctx, record));
        }
    }
}
