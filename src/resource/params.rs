//! Per-endpoint request parameters
//!
//! Each listing takes a typed parameter struct with documented defaults.
//! `to_form` produces the POST body without the page number, which the
//! pagination driver adds per request.

use crate::http::FormParams;
use crate::types::{Period, UserType};
use serde::{Deserialize, Serialize};

/// Card list query (`cardList/manage`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardListParams {
    /// Account type; default `COMPANY`
    pub user_type: UserType,
    /// Listing purpose; default `invoiceApply`
    pub kind: String,
    /// Default `card`
    pub change_view: String,
    /// Free-text filter; default empty
    pub query: String,
}

impl Default for CardListParams {
    fn default() -> Self {
        Self {
            user_type: UserType::Company,
            kind: "invoiceApply".to_string(),
            change_view: "card".to_string(),
            query: String::new(),
        }
    }
}

impl CardListParams {
    pub fn new(user_type: UserType) -> Self {
        Self {
            user_type,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    pub fn to_form(&self) -> FormParams {
        FormParams::new()
            .field("userType", self.user_type)
            .field("type", &self.kind)
            .field("changeView", &self.change_view)
            .field("queryStr", &self.query)
    }
}

/// Card binding query (`cardBinding/manage`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardBindingParams {
    /// Account type; default `COMPANY`
    pub user_type: UserType,
    /// Default `card`
    pub change_view: String,
    /// Free-text filter; default empty
    pub query: String,
}

impl Default for CardBindingParams {
    fn default() -> Self {
        Self {
            user_type: UserType::Company,
            change_view: "card".to_string(),
            query: String::new(),
        }
    }
}

impl CardBindingParams {
    pub fn new(user_type: UserType) -> Self {
        Self {
            user_type,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    pub fn to_form(&self) -> FormParams {
        FormParams::new()
            .field("userType", self.user_type)
            .field("changeView", &self.change_view)
            .field("queryStr", &self.query)
    }
}

/// Default invoice page size
pub const DEFAULT_INVOICE_PAGE_SIZE: u32 = 6;

/// Invoice query for one card and month (`queryApply` / `queryTrade`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceQueryParams {
    pub card_id: String,
    pub period: Period,
    /// Records per page; default 6
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Default `COMPANY`
    #[serde(default)]
    pub user_type: UserType,
    /// Invoice title filter; default empty
    #[serde(default)]
    pub title_name: String,
    /// Toll station filter; default empty
    #[serde(default)]
    pub station_name: String,
}

fn default_page_size() -> u32 {
    DEFAULT_INVOICE_PAGE_SIZE
}

impl InvoiceQueryParams {
    pub fn new(card_id: impl Into<String>, period: Period) -> Self {
        Self {
            card_id: card_id.into(),
            period,
            page_size: DEFAULT_INVOICE_PAGE_SIZE,
            user_type: UserType::Company,
            title_name: String::new(),
            station_name: String::new(),
        }
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    #[must_use]
    pub fn with_user_type(mut self, user_type: UserType) -> Self {
        self.user_type = user_type;
        self
    }

    #[must_use]
    pub fn with_title(mut self, title_name: impl Into<String>) -> Self {
        self.title_name = title_name.into();
        self
    }

    #[must_use]
    pub fn with_station(mut self, station_name: impl Into<String>) -> Self {
        self.station_name = station_name.into();
        self
    }

    pub fn to_form(&self) -> FormParams {
        FormParams::new()
            .field("pageSize", self.page_size)
            .field("cardId", &self.card_id)
            .field("userType", self.user_type)
            .field("month", self.period)
            .field("titleName", &self.title_name)
            .field("stationName", &self.station_name)
    }
}

/// Portal paths for each listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub card_list: String,
    pub card_binding: String,
    pub invoice_apply: String,
    pub invoice_trade: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            card_list: "/pss/app/login/cardList/manage".to_string(),
            card_binding: "/pss/app/login/cardBinding/manage".to_string(),
            invoice_apply: "/pss/app/login/invoice/query/queryApply".to_string(),
            invoice_trade: "/pss/app/login/invoice/query/queryTrade".to_string(),
        }
    }
}
