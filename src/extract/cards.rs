//! Card list and card binding extractors
//!
//! Both pages render one `<dl class="etc_card_dl">` per row of cards with the
//! same `dt`/`dd` layout, but they embed the card id differently and print the
//! plate number with different decorations, so each page keeps its own
//! offsets:
//!
//! | field        | card list                  | card binding             |
//! |--------------|----------------------------|--------------------------|
//! | ic_card_id   | last 20 chars              | last 20 chars            |
//! | plate_number | skip first 4 chars         | last 7 chars             |
//! | card_id      | `onclick` minus 13 head, 2 tail | `href` 2nd-from-last segment |

use super::dom::{self, Step};
use super::types::{CardRecord, Extractor, PageContext};
use crate::error::Result;
use crate::types::ResourceKind;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Selector};

const IC_CARD_LEN: usize = 20;
const LIST_PLATE_SKIP: usize = 4;
const BINDING_PLATE_LEN: usize = 7;
const ONCLICK_HEAD: usize = 13;
const ONCLICK_TAIL: usize = 2;

static LIST_GROUPS: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"dl[class="etc_card_dl"] > div[class="etc_card_div"]"#)
        .expect("valid selector")
});

static BINDING_GROUPS: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"dl[class*="etc_card_dl"] > div > a:nth-of-type(2)"#)
        .expect("valid selector")
});

fn ic_card(raw: &str) -> String {
    dom::tail_chars(raw.trim(), IC_CARD_LEN)
}

/// Card list page (`cardList/manage`)
#[derive(Debug, Clone, Copy, Default)]
pub struct CardListExtractor;

impl CardListExtractor {
    const ANCHOR: &'static [Step] = &[Step::child("a")];
    const REGION: &'static [Step] = &[Step::child("a"), Step::child("dt")];
    const IC_CARD: &'static [Step] = &[Step::child("a"), Step::nth("dd", 1)];
    const PLATE: &'static [Step] = &[Step::child("a"), Step::nth("dd", 2)];
}

impl Extractor for CardListExtractor {
    type Record = CardRecord;

    fn resource(&self) -> ResourceKind {
        ResourceKind::CardList
    }

    fn groups(&self) -> &Selector {
        &LIST_GROUPS
    }

    fn extract(&self, group: ElementRef<'_>, ctx: &PageContext) -> Result<CardRecord> {
        let resource = self.resource();

        let region = dom::require(
            dom::text_at(group, Self::REGION),
            resource,
            "region",
            "a/dt has no text",
        )?;
        let ic_card_id = dom::require(
            dom::text_at(group, Self::IC_CARD),
            resource,
            "ic_card_id",
            "a/dd[1] has no text",
        )?;
        let plate_number = dom::require(
            dom::text_at(group, Self::PLATE),
            resource,
            "plate_number",
            "a/dd[2] has no text",
        )?;
        let onclick = dom::require(
            dom::attr_at(group, Self::ANCHOR, "onclick"),
            resource,
            "card_id",
            "a@onclick missing",
        )?;

        Ok(CardRecord {
            region: dom::normalize_whitespace(region),
            ic_card_id: ic_card(ic_card_id),
            plate_number: dom::skip_chars(plate_number.trim(), LIST_PLATE_SKIP),
            card_id: dom::slice_chars(onclick, ONCLICK_HEAD, ONCLICK_TAIL),
            card_type: ctx.user_type,
        })
    }
}

/// Card binding page (`cardBinding/manage`)
#[derive(Debug, Clone, Copy, Default)]
pub struct CardBindingExtractor;

impl CardBindingExtractor {
    const REGION: &'static [Step] = &[Step::child("dt")];
    const IC_CARD: &'static [Step] = &[Step::nth("dd", 1)];
    const PLATE: &'static [Step] = &[Step::nth("dd", 2)];
}

impl Extractor for CardBindingExtractor {
    type Record = CardRecord;

    fn resource(&self) -> ResourceKind {
        ResourceKind::CardBinding
    }

    fn groups(&self) -> &Selector {
        &BINDING_GROUPS
    }

    fn extract(&self, group: ElementRef<'_>, ctx: &PageContext) -> Result<CardRecord> {
        let resource = self.resource();

        let region = dom::require(
            dom::text_at(group, Self::REGION),
            resource,
            "region",
            "dt has no text",
        )?;
        let ic_card_id = dom::require(
            dom::text_at(group, Self::IC_CARD),
            resource,
            "ic_card_id",
            "dd[1] has no text",
        )?;
        let plate_number = dom::require(
            dom::text_at(group, Self::PLATE),
            resource,
            "plate_number",
            "dd[2] has no text",
        )?;
        let href = dom::require(
            group.value().attr("href"),
            resource,
            "card_id",
            "a@href missing",
        )?;
        let card_id = dom::require(
            dom::path_segment_from_end(href, 2),
            resource,
            "card_id",
            "a@href has fewer than 2 segments",
        )?;

        Ok(CardRecord {
            region: dom::normalize_whitespace(region),
            ic_card_id: ic_card(ic_card_id),
            plate_number: dom::tail_chars(plate_number.trim(), BINDING_PLATE_LEN),
            card_id: card_id.to_string(),
            card_type: ctx.user_type,
        })
    }
}
