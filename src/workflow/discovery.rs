use tracing::{debug, error, info};

use crate::context::AppContext;
use crate::domain::field::{KnownField, is_excluded};
use crate::domain::form::{AllowedValue, FormField};
use crate::domain::schema::{NamedEntity, ProjectRole, RoleActor, SchemaField, TrackerProject};
use crate::error::{AppError, AppResult};
use crate::services::IssueTrackerService;

/// Why field discovery stopped early.
#[derive(Debug)]
enum DiscoveryFailure {
    /// The caller asked for something that does not exist.
    Rejected(AppError),
    /// The tracker could not be read; the form is served empty.
    Degraded(AppError),
}

/// Opens a tracker session for the configured integration and lists the
/// fields of `issue_type_name`, in `project_key` or the configured project.
pub async fn load_form(
    ctx: &AppContext,
    project_key: Option<&str>,
    issue_type_name: &str,
) -> AppResult<Vec<FormField>> {
    let params = ctx.config.integration_params()?;
    let tracker = ctx.connector.open(&params)?;
    let project_key = project_key.unwrap_or(&params.project);
    discover_fields(tracker.as_ref(), project_key, issue_type_name).await
}

/// Lists the form fields needed to create an issue of `issue_type_name`.
///
/// An unknown issue type is a validation error. Any tracker failure yields an
/// empty list instead of an error.
pub async fn discover_fields(
    tracker: &dyn IssueTrackerService,
    project_key: &str,
    issue_type_name: &str,
) -> AppResult<Vec<FormField>> {
    match collect_fields(tracker, project_key, issue_type_name).await {
        Ok(fields) => {
            info!(
                project = %project_key,
                issue_type = %issue_type_name,
                fields = fields.len(),
                "Discovered issue fields"
            );
            Ok(fields)
        }
        Err(DiscoveryFailure::Rejected(err)) => Err(err),
        Err(DiscoveryFailure::Degraded(err)) => {
            error!(
                project = %project_key,
                issue_type = %issue_type_name,
                error = %err,
                "Unable to load issue fields, serving an empty form"
            );
            Ok(Vec::new())
        }
    }
}

async fn collect_fields(
    tracker: &dyn IssueTrackerService,
    project_key: &str,
    issue_type_name: &str,
) -> Result<Vec<FormField>, DiscoveryFailure> {
    let project = tracker
        .fetch_project(project_key)
        .await
        .map_err(DiscoveryFailure::Degraded)?;

    let issue_type = project.find_issue_type(issue_type_name).ok_or_else(|| {
        DiscoveryFailure::Rejected(AppError::Validation(format!(
            "Issue type '{issue_type_name}' not found"
        )))
    })?;

    let schema = tracker
        .fetch_create_metadata(&project.key, &issue_type.id)
        .await
        .map_err(DiscoveryFailure::Degraded)?;

    let fields: Vec<&SchemaField> = schema
        .fields
        .iter()
        .filter(|field| {
            let excluded = is_excluded(&field.id, &field.name);
            if excluded {
                debug!(field = %field.id, "Skipping unsupported field");
            }
            !excluded
        })
        .collect();

    let wants_assignees = fields
        .iter()
        .any(|field| KnownField::lookup(&field.id) == Some(KnownField::Assignee));
    let roles = if wants_assignees {
        tracker
            .fetch_project_roles(&project.key)
            .await
            .map_err(DiscoveryFailure::Degraded)?
    } else {
        Vec::new()
    };

    Ok(fields
        .into_iter()
        .map(|field| form_field(field, &project, &roles, issue_type_name))
        .collect())
}

fn form_field(
    field: &SchemaField,
    project: &TrackerProject,
    roles: &[ProjectRole],
    issue_type_name: &str,
) -> FormField {
    let mut defined_values: Vec<AllowedValue> = field
        .custom_options()
        .map(|(id, value)| AllowedValue::new(id, value))
        .collect();
    let mut value = None;

    match KnownField::lookup(&field.id) {
        Some(KnownField::Components) => defined_values = entity_values(&project.components),
        Some(KnownField::FixVersions | KnownField::AffectsVersions) => {
            defined_values = entity_values(&project.versions)
        }
        Some(KnownField::Priority) => {
            defined_values = field
                .priorities()
                .map(|(id, name)| AllowedValue::new(id, name))
                .collect()
        }
        Some(KnownField::Assignee) => defined_values = role_members(roles),
        Some(KnownField::IssueType) => value = Some(vec![issue_type_name.to_string()]),
        _ => {}
    }

    FormField {
        id: field.id.clone(),
        field_name: field.name.clone(),
        field_type: field.schema_type.clone(),
        required: field.required,
        value,
        defined_values,
    }
}

fn entity_values(entities: &[NamedEntity]) -> Vec<AllowedValue> {
    entities
        .iter()
        .map(|entity| AllowedValue::new(&entity.id, &entity.name))
        .collect()
}

/// Members of every project role, each listed once.
fn role_members(roles: &[ProjectRole]) -> Vec<AllowedValue> {
    let mut actors: Vec<&RoleActor> = Vec::new();
    for actor in roles.iter().flat_map(|role| &role.actors) {
        if !actors.contains(&actor) {
            actors.push(actor);
        }
    }
    actors
        .into_iter()
        .map(|actor| AllowedValue::new(&actor.id, &actor.display_name))
        .collect()
}
