use tracing::info;

use crate::context::AppContext;
use crate::domain::field::KnownField;
use crate::domain::form::TicketRequest;
use crate::domain::ticket::{IssuePayload, Ticket};
use crate::error::{AppError, AppResult};
use crate::services::IssueTrackerService;
use crate::workflow::compose::compose_issue_payload;

/// Composes the request and posts it to the configured tracker.
pub async fn create_ticket(ctx: &AppContext, request: &TicketRequest) -> AppResult<Ticket> {
    let params = ctx.config.integration_params()?;
    let tracker = ctx.connector.open(&params)?;

    let payload = prepare_payload(ctx, tracker.as_ref(), &params.project, request).await?;
    let ticket = tracker.create_issue(&payload).await?;

    info!(key = %ticket.key, url = %ticket.url, "Ticket created");
    Ok(ticket)
}

/// Same as [`create_ticket`] but stops before anything is posted.
pub async fn preview_ticket(ctx: &AppContext, request: &TicketRequest) -> AppResult<IssuePayload> {
    let params = ctx.config.integration_params()?;
    let tracker = ctx.connector.open(&params)?;
    prepare_payload(ctx, tracker.as_ref(), &params.project, request).await
}

async fn prepare_payload(
    ctx: &AppContext,
    tracker: &dyn IssueTrackerService,
    project_key: &str,
    request: &TicketRequest,
) -> AppResult<IssuePayload> {
    let issue_type_name = request
        .field(KnownField::IssueType.id())
        .and_then(|field| field.first_value())
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| AppError::Validation("Issue type is not provided".to_string()))?;

    let project = tracker.fetch_project(project_key).await?;
    let issue_type = project
        .find_issue_type(issue_type_name)
        .ok_or_else(|| {
            AppError::Validation(format!("Issue type '{issue_type_name}' not found"))
        })?;
    let schema = tracker
        .fetch_create_metadata(&project.key, &issue_type.id)
        .await?;

    compose_issue_payload(
        tracker,
        &project,
        issue_type,
        &schema,
        request,
        ctx.description.as_ref(),
    )
    .await
}
