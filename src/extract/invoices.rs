//! Invoice query-apply extractor
//!
//! Each application is a `<table class="table_wdfp">`. Its first row holds a
//! nested header table (date, amount, type, detail link); its second row
//! holds a nested detail table (company, taxpayer id, count, status).

use super::dom::{self, Step};
use super::types::{Extractor, InvoiceRecord, PageContext};
use crate::error::Result;
use crate::types::ResourceKind;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Selector};

/// Label characters in front of the taxpayer id, after whitespace removal
const TAXPAYER_LABEL_LEN: usize = 16;
/// Label characters in front of the company name, after whitespace removal
const COMPANY_LABEL_LEN: usize = 5;
/// Currency marker in front of the amount
const AMOUNT_MARKER_LEN: usize = 2;
/// Position of the invoice id in the detail link, counted from the end
const INVOICE_ID_SEGMENT: usize = 3;

static GROUPS: Lazy<Selector> =
    Lazy::new(|| Selector::parse(r#"table[class="table_wdfp"]"#).expect("valid selector"));

/// Invoice query-apply page (`invoice/query/queryApply`)
#[derive(Debug, Clone, Copy, Default)]
pub struct InvoiceApplyExtractor;

// Header cells live under `tr[1]/td/table/tr[1]`, detail cells under
// `.//tr[2]/td[1]/table/tr[1]`.
impl InvoiceApplyExtractor {
    const APPLY_DATE: &'static [Step] = &[
        Step::nth("tr", 1),
        Step::child("td"),
        Step::child("table"),
        Step::nth("tr", 1),
        Step::nth("th", 1),
    ];
    const AMOUNT: &'static [Step] = &[
        Step::nth("tr", 1),
        Step::child("td"),
        Step::child("table"),
        Step::nth("tr", 1),
        Step::nth("th", 2),
        Step::child("span"),
    ];
    const INVOICE_TYPE: &'static [Step] = &[
        Step::nth("tr", 1),
        Step::child("td"),
        Step::child("table"),
        Step::nth("tr", 1),
        Step::nth("th", 3),
    ];
    const INVOICE_LINK: &'static [Step] = &[
        Step::nth("tr", 1),
        Step::child("td"),
        Step::child("table"),
        Step::child("tr"),
        Step::nth("th", 4),
        Step::nth("a", 1),
    ];
    const COMPANY: &'static [Step] = &[
        Step::descendant_nth("tr", 2),
        Step::nth("td", 1),
        Step::child("table"),
        Step::nth("tr", 1),
        Step::nth("td", 1),
    ];
    const TAXPAYER_ID: &'static [Step] = &[
        Step::descendant_nth("tr", 2),
        Step::nth("td", 1),
        Step::child("table"),
        Step::nth("tr", 1),
        Step::nth("td", 2),
    ];
    const RECORD_COUNT: &'static [Step] = &[
        Step::descendant_nth("tr", 2),
        Step::nth("td", 1),
        Step::child("table"),
        Step::nth("tr", 1),
        Step::nth("td", 3),
        Step::child("span"),
    ];
    const STATUS: &'static [Step] = &[
        Step::descendant_nth("tr", 2),
        Step::nth("td", 1),
        Step::child("table"),
        Step::nth("tr", 1),
        Step::nth("td", 4),
        Step::child("span"),
    ];
}

impl Extractor for InvoiceApplyExtractor {
    type Record = InvoiceRecord;

    fn resource(&self) -> ResourceKind {
        ResourceKind::InvoiceApply
    }

    fn groups(&self) -> &Selector {
        &GROUPS
    }

    fn extract(&self, group: ElementRef<'_>, _ctx: &PageContext) -> Result<InvoiceRecord> {
        let resource = self.resource();
        let text = |path: &[Step], field: &'static str| {
            dom::require(dom::text_at(group, path), resource, field, "node has no text")
        };

        let taxpayer_id = text(Self::TAXPAYER_ID, "taxpayer_id")?;
        let apply_date = text(Self::APPLY_DATE, "apply_date")?;
        let record_count = text(Self::RECORD_COUNT, "record_count")?;
        let invoice_type = text(Self::INVOICE_TYPE, "invoice_type")?;
        let company = text(Self::COMPANY, "company")?;
        let href = dom::require(
            dom::attr_at(group, Self::INVOICE_LINK, "href"),
            resource,
            "invoice_id",
            "detail link href missing",
        )?;
        let amount = text(Self::AMOUNT, "amount")?;
        let status = text(Self::STATUS, "status")?;

        let invoice_id = dom::require(
            dom::path_segment_from_end(href, INVOICE_ID_SEGMENT),
            resource,
            "invoice_id",
            "detail link has fewer than 3 segments",
        )?;

        Ok(InvoiceRecord {
            taxpayer_id: dom::skip_chars(&dom::strip_whitespace(taxpayer_id), TAXPAYER_LABEL_LEN),
            apply_date: dom::normalize_whitespace(apply_date),
            record_count: dom::normalize_whitespace(record_count),
            invoice_type: dom::normalize_whitespace(invoice_type),
            company: dom::skip_chars(&dom::strip_whitespace(company), COMPANY_LABEL_LEN),
            amount: dom::skip_chars(amount, AMOUNT_MARKER_LEN),
            invoice_id: invoice_id.to_string(),
            status: dom::normalize_whitespace(status),
        })
    }
}
