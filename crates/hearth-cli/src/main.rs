//! Hearth CLI - Household net worth and spending insights
//!
//! Usage:
//!   hearth init                   Initialize database
//!   hearth sync --file batch.json Apply a sync batch
//!   hearth networth --pin 1234    Show net worth (values revealed)
//!   hearth insights --range 90d   Show spending insights
//!   hearth serve --port 3000      Start web server

mod cli;
mod commands;


use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;
use hearth_core::HearthConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config =
        HearthConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let gate = commands::privacy_gate(&config, cli.pin.as_deref())?;

    match cli.command {
        Commands::Init => commands::cmd_init(&cli.db, cli.no_encrypt),
        Commands::Sync { file } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_sync(&db, &file)
        }
        Commands::Accounts { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None | Some(AccountsAction::List) => commands::cmd_accounts_list(&db, &gate),
                Some(AccountsAction::Hide { id }) => commands::cmd_accounts_set_hidden(&db, id, true),
                Some(AccountsAction::Show { id }) => {
                    commands::cmd_accounts_set_hidden(&db, id, false)
                }
            }
        }
        Commands::Assets { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None | Some(AssetsAction::List) => commands::cmd_assets_list(&db, &gate),
                Some(AssetsAction::Add {
                    name,
                    asset_type,
                    value,
                    ownership,
                    linked_account,
                    mortgage_balance,
                    interest_rate,
                    monthly_payment,
                }) => commands::cmd_assets_add(
                    &db,
                    commands::AssetFields {
                        name: Some(name),
                        asset_type: Some(asset_type),
                        value: Some(value),
                        ownership: Some(ownership),
                        linked_account,
                        unlink: false,
                        mortgage_balance,
                        interest_rate,
                        monthly_payment,
                    },
                ),
                Some(AssetsAction::Update {
                    id,
                    name,
                    asset_type,
                    value,
                    ownership,
                    linked_account,
                    unlink,
                    mortgage_balance,
                    interest_rate,
                    monthly_payment,
                }) => commands::cmd_assets_update(
                    &db,
                    id,
                    commands::AssetFields {
                        name,
                        asset_type,
                        value,
                        ownership,
                        linked_account,
                        unlink,
                        mortgage_balance,
                        interest_rate,
                        monthly_payment,
                    },
                ),
                Some(AssetsAction::Remove { id }) => commands::cmd_assets_remove(&db, id),
            }
        }
        Commands::Networth { json } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_networth(&db, &gate, json)
        }
        Commands::Equity { asset_id } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_equity(&db, &gate, asset_id)
        }
        Commands::Insights { filter, json } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_insights(&db, &config, &gate, &filter, json)
        }
        Commands::Drilldown { filter, limit, csv } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_drilldown(&db, &config, &gate, &filter, limit, csv.as_deref())
        }
        Commands::Transactions { action } => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            match action {
                None => commands::cmd_transactions_list(&db, &gate, 20, None),
                Some(TransactionsAction::List { limit, account }) => {
                    commands::cmd_transactions_list(&db, &gate, limit, account)
                }
                Some(TransactionsAction::Update {
                    id,
                    category,
                    tags,
                    fixed,
                    tax_deductible,
                }) => commands::cmd_transactions_update(&db, id, category, tags, fixed, tax_deductible),
            }
        }
        Commands::Categorize => {
            let db = commands::open_db(&cli.db, cli.no_encrypt)?;
            commands::cmd_categorize(&db, &config).await
        }
        Commands::Serve {
            port,
            host,
            no_auth,
            static_dir,
        } => {
            commands::cmd_serve(
                &cli.db,
                &host,
                port,
                no_auth,
                cli.no_encrypt,
                static_dir.as_deref(),
                config,
            )
            .await
        }
    }
}
