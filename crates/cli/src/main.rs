//! Premia CLI - ledger operations from the command line
//!
//! Usage:
//! ```bash
//! premia init
//! premia account create --type client --name "Alice" --balance 1500
//! premia top-up <CLIENT_ID> <GATEWAY_ID> 1000 --tranref t1
//! premia premium <CLIENT_ID> <UNDERWRITER_ID> 700 --tranref t1
//! premia commission <UNDERWRITER_ID> <AGENT_ID> 70 --tranref t1
//! premia journal --tranref t1
//! premia report --json
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use premia_config::ConfigLoader;
use premia_core::AccountType;
use premia_ledger::ServiceContext;
use rust_decimal::Decimal;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod db;

use commands::{account, audit, posting};

/// Premia - double-entry ledger for insurance premium flows
#[derive(Parser)]
#[command(name = "premia")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file (defaults are used when it does not exist)
    #[arg(long, short, default_value = "config/premia.toml", global = true)]
    pub config: PathBuf,

    /// Database URL, overrides the configuration (e.g. sqlite:data/premia.db)
    #[arg(long, global = true)]
    pub db: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create the database and apply migrations
    Init,

    /// Account management
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },

    /// Client top-up: debit gateway, credit client
    TopUp {
        /// Client account ID
        client: String,
        /// Gateway account ID
        gateway: String,
        /// Amount (must be positive)
        #[arg(allow_hyphen_values = true)]
        amount: Decimal,
        /// Business reference
        #[arg(long)]
        tranref: String,
    },

    /// Premium payment: debit client, credit underwriter
    Premium {
        /// Client account ID
        client: String,
        /// Underwriter account ID
        underwriter: String,
        /// Amount (must be positive)
        #[arg(allow_hyphen_values = true)]
        amount: Decimal,
        /// Business reference
        #[arg(long)]
        tranref: String,
    },

    /// Agent commission: debit underwriter, credit agent
    Commission {
        /// Underwriter account ID
        underwriter: String,
        /// Agent account ID
        agent: String,
        /// Amount (must be positive)
        #[arg(allow_hyphen_values = true)]
        amount: Decimal,
        /// Business reference
        #[arg(long)]
        tranref: String,
    },

    /// List journal entries, newest first, or all entries of one reference
    Journal {
        /// Page size (0 or less means 50)
        #[arg(long, default_value_t = 50, allow_hyphen_values = true)]
        limit: i64,
        /// Entries to skip
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        skip: i64,
        /// Only entries with this reference
        #[arg(long, conflicts_with_all = ["limit", "skip"])]
        tranref: Option<String>,
    },

    /// Reconcile one account against the journal
    Reconcile {
        /// Account ID
        account_id: String,
    },

    /// Reconcile every account
    Report {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
pub enum AccountAction {
    /// Create a new account
    Create {
        /// Account type
        #[arg(long, short = 't')]
        r#type: AccountTypeArg,
        /// Display name
        #[arg(long, short)]
        name: String,
        /// Opening balance (any sign)
        #[arg(long, short, default_value = "0", allow_hyphen_values = true)]
        balance: Decimal,
    },
    /// List all accounts
    List,
    /// Show account details
    Show {
        /// Account ID
        account_id: String,
    },
    /// Show the stored balance
    Balance {
        /// Account ID
        account_id: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum AccountTypeArg {
    Gateway,
    Client,
    Underwriter,
    Agent,
}

impl AccountTypeArg {
    pub fn to_core_type(&self) -> AccountType {
        match self {
            AccountTypeArg::Gateway => AccountType::GatewayAsset,
            AccountTypeArg::Client => AccountType::ClientLiability,
            AccountTypeArg::Underwriter => AccountType::UnderwriterPayable,
            AccountTypeArg::Agent => AccountType::AgentEarned,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut loader = ConfigLoader::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config {}", cli.config.display()))?;
    if let Some(url) = &cli.db {
        loader
            .override_database_url(url)
            .context("Invalid --db override")?;
    }
    let config = loader.get();

    init_logging(&config.logging.level);

    let database = db::connect(&config.database).await?;
    let ctx = ServiceContext::new(&database, config.ledger.clone());

    let result = match cli.command {
        Commands::Init => db::show_status(&ctx, &config.database.url).await,

        Commands::Account { action } => account::handle(&ctx, action).await,

        Commands::TopUp {
            client,
            gateway,
            amount,
            tranref,
        } => posting::top_up(&ctx, &client, &gateway, amount, &tranref).await,

        Commands::Premium {
            client,
            underwriter,
            amount,
            tranref,
        } => posting::premium(&ctx, &client, &underwriter, amount, &tranref).await,

        Commands::Commission {
            underwriter,
            agent,
            amount,
            tranref,
        } => posting::commission(&ctx, &underwriter, &agent, amount, &tranref).await,

        Commands::Journal {
            limit,
            skip,
            tranref,
        } => audit::journal(&ctx, limit, skip, tranref.as_deref()).await,

        Commands::Reconcile { account_id } => audit::reconcile(&ctx, &account_id).await,

        Commands::Report { json } => audit::report(&ctx, json).await,
    };

    database.close().await;
    result
}

fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
