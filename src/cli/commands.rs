//! CLI commands and argument parsing

use crate::types::{Period, UserType};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Toll-card portal extraction CLI
#[derive(Parser, Debug)]
#[command(name = "pss-extract")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Portal configuration file (YAML or JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Portal username
    #[arg(short, long, global = true, env = "PSS_USERNAME")]
    pub username: Option<String>,

    /// Portal password
    #[arg(short, long, global = true, env = "PSS_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Account type the listings are requested for
    #[arg(long, global = true, default_value = "COMPANY")]
    pub user_type: UserType,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Stop after this many pages
    #[arg(long, global = true)]
    pub max_pages: Option<usize>,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List toll cards registered to the account
    Cards {
        /// Free-text filter
        #[arg(long, default_value = "")]
        query: String,
    },

    /// List cards bound for invoicing
    Bindings {
        /// Free-text filter
        #[arg(long, default_value = "")]
        query: String,
    },

    /// List invoice applications for a card and month
    Invoices {
        #[command(flatten)]
        filter: InvoiceFilter,
    },

    /// Dump one raw page of the trade listing
    Trade {
        #[command(flatten)]
        filter: InvoiceFilter,

        /// Page number
        #[arg(long, default_value = "1")]
        page: u32,
    },

    /// Download an invoice bundle to a file
    Download {
        /// Bundle path or URL
        #[arg(long)]
        path: String,

        /// Destination file
        #[arg(short, long)]
        output: PathBuf,
    },
}

/// Card and month selection for invoice queries
#[derive(clap::Args, Debug, Clone)]
pub struct InvoiceFilter {
    /// Card id as shown by `cards` or `bindings`
    #[arg(long)]
    pub card_id: String,

    /// Month, `YYYYMM`
    #[arg(long)]
    pub month: Period,

    /// Records per page
    #[arg(long, default_value = "6")]
    pub page_size: u32,

    /// Invoice title filter
    #[arg(long, default_value = "")]
    pub title: String,

    /// Toll station filter
    #[arg(long, default_value = "")]
    pub station: String,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one message per line)
    Json,
    /// Human-readable output
    Pretty,
}
