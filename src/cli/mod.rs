//! CLI module
//!
//! Command-line interface for pulling portal listings.
//!
//! # Commands
//!
//! - `cards` - Toll cards registered to the account
//! - `bindings` - Cards bound for invoicing
//! - `invoices` - Invoice applications for a card and month
//! - `trade` - One raw page of the trade listing
//! - `download` - Save an invoice bundle

mod commands;
mod runner;

pub use commands::{Cli, Commands, InvoiceFilter, OutputFormat};
pub use runner::{RunStats, Runner};
