//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Hearth - Household net worth and spending insights
#[derive(Parser)]
#[command(name = "hearth")]
#[command(about = "Self-hosted household net worth tracker", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "hearth.db", global = true)]
    pub db: PathBuf,

    /// Config file (defaults to ~/.local/share/hearth/config/hearth.toml if present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Privacy PIN; monetary values stay masked unless it matches
    #[arg(long, global = true)]
    pub pin: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set HEARTH_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Apply a sync batch (accounts and transactions as JSON)
    Sync {
        /// Batch file to apply
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Manage accounts (list, hide, show)
    Accounts {
        #[command(subcommand)]
        action: Option<AccountsAction>,
    },

    /// Manage manual assets (list, add, update, remove)
    Assets {
        #[command(subcommand)]
        action: Option<AssetsAction>,
    },

    /// Show household net worth with breakdown
    Networth {
        /// Print raw JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show the equity held in one asset
    Equity {
        /// Asset ID
        asset_id: i64,
    },

    /// Show the monthly spending trend and category distribution
    Insights {
        #[command(flatten)]
        filter: FilterArgs,

        /// Print raw JSON instead of tables
        #[arg(long)]
        json: bool,
    },

    /// List the transactions behind the current insight view
    Drilldown {
        #[command(flatten)]
        filter: FilterArgs,

        /// Maximum rows to display (defaults to the configured limit)
        #[arg(short, long)]
        limit: Option<usize>,

        /// Export every matching row to a CSV file (requires the privacy PIN)
        #[arg(long)]
        csv: Option<PathBuf>,
    },

    /// List or update transactions
    Transactions {
        #[command(subcommand)]
        action: Option<TransactionsAction>,
    },

    /// Send uncategorized transactions to the categorization agent
    Categorize,

    /// Start the web server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Disable authentication (for local development only)
        ///
        /// WARNING: Do not use this flag when exposing the server to a network.
        /// By default, the server requires an API key from HEARTH_API_KEYS.
        #[arg(long)]
        no_auth: bool,

        /// Directory containing static files to serve (e.g., ui/dist)
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },
}

/// Insight filter shared by `insights` and `drilldown`
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Time range: 30d, 90d, 365d, ytd, all (defaults to the configured range)
    #[arg(short, long)]
    pub range: Option<String>,

    /// Calendar month (1-12); requires --year
    #[arg(long)]
    pub month: Option<u32>,

    /// Calendar year
    #[arg(long)]
    pub year: Option<i32>,

    /// Transaction source: all, manual, linked
    #[arg(long, default_value = "all")]
    pub source: String,

    /// Only this category ("All" for every category)
    #[arg(long)]
    pub category: Option<String>,
}

#[derive(Subcommand)]
pub enum AccountsAction {
    /// List accounts (default)
    List,

    /// Hide an account from net worth and insights
    Hide {
        /// Account ID
        id: i64,
    },

    /// Show a previously hidden account
    Show {
        /// Account ID
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum AssetsAction {
    /// List assets with their equity (default)
    List,

    /// Add a manual asset
    Add {
        /// Asset name
        #[arg(short, long)]
        name: String,

        /// Asset type: real_estate, investment, vehicle, other
        #[arg(short = 't', long = "type", default_value = "real_estate")]
        asset_type: String,

        /// Current market value
        #[arg(long)]
        value: f64,

        /// Ownership percentage (0-100)
        #[arg(long, default_value = "100")]
        ownership: f64,

        /// Loan or mortgage account backing this asset
        #[arg(long)]
        linked_account: Option<i64>,

        /// Mortgage balance when no account is linked
        #[arg(long)]
        mortgage_balance: Option<f64>,

        /// Interest rate (percent)
        #[arg(long)]
        interest_rate: Option<f64>,

        /// Monthly payment
        #[arg(long)]
        monthly_payment: Option<f64>,
    },

    /// Update fields of an existing asset
    Update {
        /// Asset ID
        id: i64,

        #[arg(short, long)]
        name: Option<String>,

        #[arg(short = 't', long = "type")]
        asset_type: Option<String>,

        #[arg(long)]
        value: Option<f64>,

        #[arg(long)]
        ownership: Option<f64>,

        /// Link to a loan or mortgage account
        #[arg(long, conflicts_with = "unlink")]
        linked_account: Option<i64>,

        /// Remove the account link
        #[arg(long)]
        unlink: bool,

        #[arg(long)]
        mortgage_balance: Option<f64>,

        #[arg(long)]
        interest_rate: Option<f64>,

        #[arg(long)]
        monthly_payment: Option<f64>,
    },

    /// Remove an asset
    Remove {
        /// Asset ID
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum TransactionsAction {
    /// List recent transactions (default)
    List {
        /// Number of transactions to show
        #[arg(short, long, default_value = "20")]
        limit: i64,

        /// Only this account
        #[arg(long)]
        account: Option<i64>,
    },

    /// Update a transaction's category, tags or flags
    Update {
        /// Transaction ID
        id: i64,

        /// New category ("" clears it)
        #[arg(long)]
        category: Option<String>,

        /// Comma-separated tags ("" clears them)
        #[arg(long)]
        tags: Option<String>,

        /// Mark as a fixed (true) or variable (false) expense
        #[arg(long)]
        fixed: Option<bool>,

        /// Mark as tax deductible (true/false)
        #[arg(long)]
        tax_deductible: Option<bool>,
    },
}
