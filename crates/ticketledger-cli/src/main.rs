//! Admin CLI for the ticket settlement engine.
//!
//! Everything here goes over HTTP to a running `ticketledger-api`
//! instance rather than touching the database directly - the server is
//! the single source of truth, this binary is just an operator's remote.
//!
//! # Quick start
//!
//! ```bash
//! # Resolve a manual-mode withdrawal stuck in `pending`
//! ticketledger transactions set-status --reference wd_01J... --status completed
//! ticketledger transactions set-status --reference wd_01J... --status failed --reason "bank rejected account"
//!
//! # Check the API is up
//! ticketledger healthz
//! ```

use clap::{Parser, Subcommand};
use colored::*;

mod client;
mod commands;
mod display;

use client::{AdminStatus, ApiClient};

#[derive(Parser)]
#[command(name = "ticketledger")]
#[command(author = "Ticketledger Contributors")]
#[command(version)]
#[command(about = "Admin CLI for the ticket settlement engine", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Base URL of the ticketledger-api server
    #[arg(long, env = "TICKETLEDGER_API_URL", default_value = "http://localhost:8080", global = true)]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage transaction state as an operator
    Transactions {
        #[command(subcommand)]
        action: TransactionCommands,
    },

    /// Check that the ticketledger API is up and can reach Postgres
    Healthz,
}

#[derive(Subcommand)]
enum TransactionCommands {
    /// Resolve a manual-mode withdrawal stuck in `pending`
    SetStatus {
        /// Transaction reference
        #[arg(short, long)]
        reference: String,

        /// Target status: `completed` or `failed`
        #[arg(short, long)]
        status: StatusArg,

        /// Required when `--status failed`
        #[arg(long)]
        reason: Option<String>,
    },
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum StatusArg {
    Completed,
    Failed,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let client = ApiClient::new(&cli.api_url);

    print_banner();

    let result = match cli.command {
        Commands::Transactions { action } => match action {
            TransactionCommands::SetStatus { reference, status, reason } => {
                let status = match status {
                    StatusArg::Completed => AdminStatus::Completed,
                    StatusArg::Failed => AdminStatus::Failed,
                };
                if matches!(status, AdminStatus::Failed) && reason.is_none() {
                    anyhow::bail!("--reason is required when --status failed");
                }
                commands::transactions::set_status(&client, &reference, status, reason).await
            }
        },
        Commands::Healthz => commands::health::check(&client).await,
    };

    if let Err(err) = &result {
        display::error(&err.to_string());
    }

    result
}

fn print_banner() {
    println!();
    println!("{}", "Ticketledger Admin CLI".bright_white().bold());
    println!("{}", "─".repeat(40).bright_black());
}
