//! Larder auditor
//!
//! Operational entry point for the inventory ledger:
//!
//!   larder-auditor audit --company <ID> --branch <ID> --actor <ID> [--item <ID>] [--fix]
//!   larder-auditor seed-accounts --company <ID>
//!
//! `audit` prints the report as JSON and exits non-zero when mismatches
//! remain. Configuration comes from `config/` and `LARDER__*` variables.

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use larder_db::{AccountRepository, InventoryRepository, connect};
use larder_shared::AppConfig;
use larder_shared::types::{BranchId, BranchScope, CompanyId, ItemId, UserId};

#[derive(Parser)]
#[command(name = "larder-auditor")]
#[command(about = "Inventory ledger audits and account setup")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compare cached on-hand with lots, and lots with their movements
    Audit {
        /// Company the branch belongs to
        #[arg(long, env = "LARDER_COMPANY_ID")]
        company: CompanyId,
        /// Branch to audit
        #[arg(long)]
        branch: BranchId,
        /// User recorded on the audit event
        #[arg(long, env = "LARDER_ACTOR_ID")]
        actor: UserId,
        /// Restrict the audit to one item
        #[arg(long)]
        item: Option<ItemId>,
        /// Overwrite stale cached on-hand values
        #[arg(long)]
        fix: bool,
    },
    /// Create the ledger's account codes for a company
    SeedAccounts {
        /// Company to seed
        #[arg(long, env = "LARDER_COMPANY_ID")]
        company: CompanyId,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "larder=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load().context("Failed to load configuration")?;
    let db = connect(&config.database)
        .await
        .context("Failed to connect to database")?;
    info!("Connected to database");

    match cli.command {
        Command::Audit {
            company,
            branch,
            actor,
            item,
            fix,
        } => {
            let scope = BranchScope::verified(company, branch, actor);
            let report = InventoryRepository::new(db)
                .audit_on_hand(&scope, item, fix)
                .await?;
            println!("{}", serde_json::to_string_pretty(&report)?);

            let unresolved = report.item_mismatches().any(|item| !item.fixed)
                || report.lot_mismatches().next().is_some();
            if unresolved {
                std::process::exit(2);
            }
        }
        Command::SeedAccounts { company } => {
            let created = AccountRepository::new(db).seed_defaults(company).await?;
            info!(company_id = %company, created, "Chart of accounts ready");
        }
    }

    Ok(())
}
