//! Tests for the extract module

use super::dom::{self, Step};
use super::*;
use crate::error::Error;
use crate::types::{Period, ResourceKind, UserType};
use pretty_assertions::assert_eq;
use scraper::Html;
use std::sync::Arc;
use test_case::test_case;

const CARD_LIST_P1: &str = include_str!("../../tests/fixtures/card_list_company_p1.html");
const CARD_LIST_P2: &str = include_str!("../../tests/fixtures/card_list_company_p2.html");
const CARD_LIST_PERSONAL: &str = include_str!("../../tests/fixtures/card_list_personal.html");
const CARD_BINDING: &str = include_str!("../../tests/fixtures/card_binding_company.html");
const INVOICE_APPLY: &str = include_str!("../../tests/fixtures/invoice_query_apply.html");

fn card_list_page(text: &str, user_type: UserType) -> PageRecords<CardListExtractor> {
    extract_page(
        Arc::new(CardListExtractor),
        text,
        PageContext::new(ResourceKind::CardList, 1, user_type),
        Arc::new(NoopObserver),
    )
}

fn collect<E: Extractor>(page: &PageRecords<E>) -> Vec<E::Record> {
    page.records()
        .collect::<crate::error::Result<Vec<_>>>()
        .expect("page extracts cleanly")
}

// ============================================================================
// Slicing helpers
// ============================================================================

#[test_case("卡号：11011810230000000001", 20, "11011810230000000001" ; "longer input")]
#[test_case("12345", 20, "12345" ; "shorter input")]
#[test_case("", 7, "" ; "empty input")]
fn test_tail_chars(input: &str, count: usize, expected: &str) {
    assert_eq!(dom::tail_chars(input, count), expected);
}

#[test_case("车牌号：京A12345", 4, "京A12345" ; "label")]
#[test_case("车牌", 4, "" ; "shorter than label")]
fn test_skip_chars(input: &str, count: usize, expected: &str) {
    assert_eq!(dom::skip_chars(input, count), expected);
}

#[test_case("cardInvoice('1101181023000012')", 13, 2, "1101181023000012" ; "onclick")]
#[test_case("short", 13, 2, "" ; "overlapping bounds")]
#[test_case("abcdef", 0, 0, "abcdef" ; "no trimming")]
fn test_slice_chars(input: &str, head: usize, tail: usize, expected: &str) {
    assert_eq!(dom::slice_chars(input, head, tail), expected);
}

#[test_case("/pss/app/login/invoice/cardBinding/1101/COMPANY", 2, Some("1101") ; "second from end")]
#[test_case("/a/INV1/COMPANY/201805", 3, Some("INV1") ; "third from end")]
#[test_case("/COMPANY", 3, None ; "too few segments")]
#[test_case("a/b", 0, None ; "zero index")]
fn test_path_segment_from_end(path: &str, from_end: usize, expected: Option<&str>) {
    assert_eq!(dom::path_segment_from_end(path, from_end), expected);
}

#[test]
fn test_whitespace_helpers() {
    assert_eq!(dom::normalize_whitespace("\n   天津\t  北京 \n"), "天津 北京");
    assert_eq!(dom::strip_whitespace("购方名称：\n   某某 公司"), "购方名称：某某公司");
}

// ============================================================================
// Structural paths
// ============================================================================

#[test]
fn test_rows_are_counted_through_tbody() {
    let html = Html::parse_document(
        "<table id='t'><tr><td>one</td></tr><tr><td>two</td></tr></table>",
    );
    let table = html
        .select(&scraper::Selector::parse("#t").unwrap())
        .next()
        .unwrap();

    let path = [Step::nth("tr", 2), Step::nth("td", 1)];
    assert_eq!(dom::text_at(table, &path), Some("two"));

    let descendant = [Step::descendant_nth("tr", 1), Step::child("td")];
    assert_eq!(dom::text_at(table, &descendant), Some("one"));
}

#[test]
fn test_text_at_skips_elements_without_text() {
    let html = Html::parse_document("<div id='d'><p><b>x</b></p><p>second</p></div>");
    let div = html
        .select(&scraper::Selector::parse("#d").unwrap())
        .next()
        .unwrap();

    assert_eq!(dom::text_at(div, &[Step::child("p")]), Some("second"));
    assert_eq!(dom::text_at(div, &[Step::nth("p", 3)]), None);
}

// ============================================================================
// Card list
// ============================================================================

#[test]
fn test_card_list_first_page() {
    let page = card_list_page(CARD_LIST_P1, UserType::Company);
    let cards = collect(&page);

    assert_eq!(page.group_count(), 16);
    assert_eq!(cards.len(), 16);
    assert_eq!(
        cards[0],
        CardRecord {
            region: "天津".to_string(),
            ic_card_id: "11011810230000000001".to_string(),
            plate_number: "京A00001".to_string(),
            card_id: "1101181023000001".to_string(),
            card_type: UserType::Company,
        }
    );
    assert!(cards.iter().all(|card| card.card_type == UserType::Company));
    assert!(cards.iter().all(|card| card.ic_card_id.chars().count() == 20));
}

#[test]
fn test_card_list_document_order() {
    let page = card_list_page(CARD_LIST_P2, UserType::Company);
    let ids: Vec<String> = collect(&page).into_iter().map(|card| card.card_id).collect();

    let expected: Vec<String> = (17..=34).map(|n| format!("110118102300{n:04}")).collect();
    assert_eq!(ids, expected);
}

#[test]
fn test_card_list_ignores_other_card_blocks() {
    // Both fixture pages carry an "add card" block with a different class.
    let first = card_list_page(CARD_LIST_P1, UserType::Company);
    let second = card_list_page(CARD_LIST_P2, UserType::Company);
    assert_eq!(first.group_count() + second.group_count(), 34);
}

#[test]
fn test_card_list_personal_tags_type() {
    let page = card_list_page(CARD_LIST_PERSONAL, UserType::Personal);
    let cards = collect(&page);

    assert_eq!(cards.len(), 2);
    assert!(cards.iter().all(|card| card.card_type == UserType::Personal));
    assert_eq!(cards[1].card_id, "3201181023000002");
}

#[test]
fn test_extraction_is_deterministic() {
    let first = collect(&card_list_page(CARD_LIST_P1, UserType::Company));
    let second = collect(&card_list_page(CARD_LIST_P1, UserType::Company));
    assert_eq!(first, second);

    // Pulling the same page twice gives the same records too.
    let page = card_list_page(CARD_LIST_P1, UserType::Company);
    assert_eq!(collect(&page), collect(&page));
}

#[test]
fn test_page_without_groups_yields_nothing() {
    let page = card_list_page("<html><body><p>暂无数据</p></body></html>", UserType::Company);
    assert_eq!(page.group_count(), 0);
    assert!(page.records().next().is_none());
}

#[test]
fn test_missing_node_is_shape_error_and_stops() {
    let html = r#"
        <dl class="etc_card_dl">
          <div class="etc_card_div">
            <a onclick="cardInvoice('1101181023000001')"><dt>北京</dt><dd>卡号：11011810230000000001</dd><dd>车牌号：京A00001</dd></a>
          </div>
          <div class="etc_card_div">
            <a onclick="cardInvoice('1101181023000002')"><dt>北京</dt><dd>卡号：11011810230000000002</dd></a>
          </div>
          <div class="etc_card_div">
            <a onclick="cardInvoice('1101181023000003')"><dt>北京</dt><dd>卡号：11011810230000000003</dd><dd>车牌号：京A00003</dd></a>
          </div>
        </dl>"#;
    let page = card_list_page(html, UserType::Company);
    let results: Vec<_> = page.records().collect();

    assert_eq!(results.len(), 2);
    assert!(results[0].is_ok());
    match &results[1] {
        Err(Error::ExtractionShape {
            resource, field, ..
        }) => {
            assert_eq!(*resource, ResourceKind::CardList);
            assert_eq!(*field, "plate_number");
        }
        other => panic!("expected shape error, got {other:?}"),
    }
}

#[test]
fn test_missing_onclick_is_shape_error() {
    let html = r#"<dl class="etc_card_dl"><div class="etc_card_div">
        <a><dt>北京</dt><dd>卡号：1</dd><dd>车牌号：京A00001</dd></a>
        </div></dl>"#;
    let page = card_list_page(html, UserType::Company);
    let err = page.records().next().unwrap().unwrap_err();
    assert!(matches!(err, Error::ExtractionShape { field: "card_id", .. }));
}

// ============================================================================
// Card binding
// ============================================================================

#[test]
fn test_card_binding_page() {
    let page = extract_page(
        Arc::new(CardBindingExtractor),
        CARD_BINDING,
        PageContext::new(ResourceKind::CardBinding, 1, UserType::Company),
        Arc::new(NoopObserver),
    );
    let cards = collect(&page);

    assert_eq!(cards.len(), 16);
    assert_eq!(
        cards[0],
        CardRecord {
            region: "天津".to_string(),
            ic_card_id: "11011810230000000001".to_string(),
            plate_number: "京B00001".to_string(),
            card_id: "1101181023000001".to_string(),
            card_type: UserType::Company,
        }
    );
    assert_eq!(cards[15].card_id, "1101181023000016");
}

// ============================================================================
// Invoices
// ============================================================================

fn invoice_page(observer: Arc<dyn RecordObserver>) -> PageRecords<InvoiceApplyExtractor> {
    let period: Period = "201805".parse().unwrap();
    extract_page(
        Arc::new(InvoiceApplyExtractor),
        INVOICE_APPLY,
        PageContext::new(ResourceKind::InvoiceApply, 1, UserType::Company).with_period(period),
        observer,
    )
}

#[test]
fn test_invoice_apply_page() {
    let page = invoice_page(Arc::new(NoopObserver));
    let invoices = collect(&page);

    assert_eq!(invoices.len(), 3);
    assert_eq!(
        invoices[0],
        InvoiceRecord {
            taxpayer_id: "91110108MA01ABCD1X".to_string(),
            apply_date: "2018-05-12 10:23:45".to_string(),
            record_count: "12".to_string(),
            invoice_type: "电子发票".to_string(),
            company: "北京某某物流有限公司".to_string(),
            amount: "318.50".to_string(),
            invoice_id: "INV201805120001".to_string(),
            status: "已开票".to_string(),
        }
    );
    assert_eq!(invoices[1].amount, "1,024.00");
    assert_eq!(invoices[2].company, "天津某某运输有限公司");
}

#[test]
fn test_invoice_id_is_third_segment_from_end() {
    let invoices = collect(&invoice_page(Arc::new(NoopObserver)));
    let ids: Vec<&str> = invoices.iter().map(|inv| inv.invoice_id.as_str()).collect();
    assert_eq!(ids, ["INV201805120001", "INV201805200007", "INV201805310013"]);
}

#[test]
fn test_invoice_missing_detail_row() {
    let html = r#"<table class="table_wdfp"><tr><td><table><tr>
        <th>2018-05-12</th><th><span>￥ 1.00</span></th><th>电子发票</th>
        <th><a href="/x/INV1/COMPANY/201805">详情</a></th>
        </tr></table></td></tr></table>"#;
    let page = extract_page(
        Arc::new(InvoiceApplyExtractor),
        html,
        PageContext::new(ResourceKind::InvoiceApply, 1, UserType::Company),
        Arc::new(NoopObserver),
    );
    let err = page.records().next().unwrap().unwrap_err();
    assert!(matches!(
        err,
        Error::ExtractionShape {
            resource: ResourceKind::InvoiceApply,
            ..
        }
    ));
}

// ============================================================================
// Observers
// ============================================================================

#[test]
fn test_observer_sees_each_record() {
    let observer = Arc::new(MemoryObserver::new());
    let page = invoice_page(observer.clone());

    let mut records = page.records();
    records.next().unwrap().unwrap();
    assert_eq!(observer.len(), 1);

    records.for_each(drop);
    let entries = observer.entries();
    assert_eq!(entries.len(), 3);
    assert!(entries[0].starts_with("201805 invoice records (page 1)\n"));
    assert!(entries[0].contains("           RECORD ID:  INV201805120001\n"));
    assert!(entries[2].contains("              STATUS:  已开票\n"));
}

#[test]
fn test_observer_skips_failed_records() {
    let observer = Arc::new(MemoryObserver::new());
    let page = extract_page(
        Arc::new(CardListExtractor),
        r#"<dl class="etc_card_dl"><div class="etc_card_div"><a><dt>北京</dt></a></div></dl>"#,
        PageContext::new(ResourceKind::CardList, 1, UserType::Company),
        observer.clone(),
    );
    assert!(page.records().next().unwrap().is_err());
    assert!(observer.is_empty());
}

#[test]
fn test_render_card_audit() {
    let card = CardRecord {
        region: "北京".to_string(),
        ic_card_id: "11011810230000000001".to_string(),
        plate_number: "京A00001".to_string(),
        card_id: "1101181023000001".to_string(),
        card_type: UserType::Personal,
    };
    let ctx = PageContext::new(ResourceKind::CardBinding, 3, UserType::Personal);
    let rendered = render_audit(&ctx, &card);

    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines[0], "ETC card info (page 3)");
    assert_eq!(lines[1], "              ETC ID:  1101181023000001");
    assert_eq!(lines[5], "                TYPE:  PERSONAL");
}
