mod cmd;
mod config;
mod context;
mod domain;
mod error;
mod infra;
mod logging;
mod services;
mod workflow;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};

use crate::cmd::config::{self as config_cmd, ConfigArgs};
use crate::cmd::fields;
use crate::cmd::params::CommandParams;
use crate::cmd::ticket::{self, TicketCommandArgs, TicketOutcome};
use crate::config::AppConfig;
use crate::context::AppContext;
use crate::error::AppResult;
use crate::infra::description::BackLinkDescription;
use crate::infra::jira::JiraConnector;

#[derive(Parser)]
#[command(
    name = "rp-jira",
    author,
    version,
    about = "Jira ticket fields and creation for test reports"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the form fields needed to create an issue (requires `-p issueType=<name>`).
    Fields(FieldsArgs),
    /// Create an issue from a filled-in ticket request.
    Ticket(TicketArgs),
    /// Manage CLI configuration.
    Config(ConfigArgs),
}

#[derive(Args)]
struct FieldsArgs {
    /// Command parameter as key=value; repeatable.
    #[arg(short = 'p', long = "param")]
    params: Vec<String>,
}

#[derive(Args)]
struct TicketArgs {
    /// JSON file holding the ticket request.
    #[arg(short, long)]
    request: PathBuf,
    /// Print the create-issue payload instead of posting it.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> AppResult<()> {
    let cli = Cli::parse();
    logging::init()?;

    match cli.command {
        Commands::Config(args) => {
            config_cmd::run(args.command)?;
            Ok(())
        }
        Commands::Fields(args) => run_fields(args).await,
        Commands::Ticket(args) => run_ticket(args).await,
    }
}

fn build_context() -> AppResult<AppContext> {
    let config = AppConfig::load()?;
    Ok(AppContext::new(
        config,
        Arc::new(JiraConnector),
        Arc::new(BackLinkDescription),
    ))
}

async fn run_fields(args: FieldsArgs) -> AppResult<()> {
    let params = CommandParams::from_pairs(&args.params)?;
    let context = build_context()?;

    let form = fields::run(&context, &params).await?;
    println!("{}", serde_json::to_string_pretty(&form)?);
    Ok(())
}

async fn run_ticket(args: TicketArgs) -> AppResult<()> {
    let context = build_context()?;

    let outcome = ticket::run(
        &context,
        TicketCommandArgs {
            request: args.request,
            dry_run: args.dry_run,
        },
    )
    .await?;

    match outcome {
        TicketOutcome::Created(ticket) => {
            println!("Ticket {} created.", ticket.key);
            if let Some(summary) = &ticket.summary {
                println!("Summary: {summary}");
            }
            if let Some(status) = &ticket.status {
                println!("Status: {status}");
            }
            println!("View ticket: {}", ticket.url);
        }
        TicketOutcome::Preview(payload) => {
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
    }
    Ok(())
}
