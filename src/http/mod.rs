//! HTTP gateway module
//!
//! The request gateway sits between the pagination driver and the network.
//!
//! # Features
//!
//! - **Form requests**: POST form bodies or GET query strings from [`FormParams`]
//! - **Pacing**: one shared governor token bucket per gateway
//! - **Optional Retries**: Off by default, configurable with backoff
//! - **Pass-through downloads**: Raw bytes and status for binary endpoints

mod client;
mod pacing;
mod types;

pub use client::{GatewayConfig, GatewayConfigBuilder, HttpGateway};
pub use pacing::{Pace, Pacer};
pub use types::{FormParams, RawPage, RequestGateway, PAGE_FIELD};

#[cfg(test)]
mod tests;
