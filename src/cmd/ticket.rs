use std::fs;
use std::path::{Path, PathBuf};

use crate::context::AppContext;
use crate::domain::form::TicketRequest;
use crate::domain::ticket::{IssuePayload, Ticket};
use crate::error::{AppError, AppResult};
use crate::workflow::ticket::{create_ticket, preview_ticket};

#[derive(Debug, Clone)]
pub struct TicketCommandArgs {
    pub request: PathBuf,
    pub dry_run: bool,
}

pub enum TicketOutcome {
    Created(Ticket),
    Preview(IssuePayload),
}

pub async fn run(ctx: &AppContext, args: TicketCommandArgs) -> AppResult<TicketOutcome> {
    let request = read_request(&args.request)?;
    if args.dry_run {
        Ok(TicketOutcome::Preview(preview_ticket(ctx, &request).await?))
    } else {
        Ok(TicketOutcome::Created(create_ticket(ctx, &request).await?))
    }
}

fn read_request(path: &Path) -> AppResult<TicketRequest> {
    let contents = fs::read_to_string(path)?;
    serde_json::from_str(&contents).map_err(|err| {
        AppError::Validation(format!("invalid ticket request {}: {err}", path.display()))
    })
}
