use chrono::NaiveDate;
use serde_json::{Number, Value};
use thiserror::Error;
use tracing::{debug, error, warn};

use crate::domain::field::KnownField;
use crate::domain::form::{FieldType, FormField, TicketRequest};
use crate::domain::schema::{IssueTypeRef, IssueTypeSchema, SchemaField, TrackerProject};
use crate::domain::ticket::IssuePayload;
use crate::error::{AppError, AppResult};
use crate::services::{DescriptionProvider, IssueTrackerService};

/// Written to option fields whose submitted value could not be matched.
pub const AUTOFIELD_PLACEHOLDER: &str = "ReportPortal autofield";

/// Date format produced by the form's calendar control.
const FORM_DATE_FORMAT: &str = "%Y-%m-%d";

/// A single field that could not be mapped. Never leaves this module.
#[derive(Debug, Error)]
enum MappingError {
    #[error("no allowed option of '{field}' matches {values:?}")]
    NoMatchingOption { field: String, values: Vec<String> },
}

/// Translates a filled-in form into a create-issue payload.
///
/// `tracker` is only consulted to resolve user-typed fields.
pub async fn compose_issue_payload(
    tracker: &dyn IssueTrackerService,
    project: &TrackerProject,
    issue_type: &IssueTypeRef,
    schema: &IssueTypeSchema,
    request: &TicketRequest,
    description: &dyn DescriptionProvider,
) -> AppResult<IssuePayload> {
    let mut payload = IssuePayload::new(&project.key, &issue_type.id);
    let mut user_description = String::new();

    for field in &request.fields {
        if field.required && !field.has_value() {
            return Err(AppError::Validation(format!(
                "Required parameter '{}' is empty",
                field.field_name
            )));
        }
        let Some(first) = field.first_value().filter(|value| !value.is_empty()) else {
            continue;
        };

        let known = KnownField::lookup(&field.id);
        if matches!(known, Some(KnownField::IssueType | KnownField::Project)) {
            continue;
        }
        let Some(schema_field) = schema.field(&field.id) else {
            debug!(field = %field.id, "Ignoring field missing from the issue type schema");
            continue;
        };

        match known {
            Some(KnownField::Description) => user_description = first.to_string(),
            Some(KnownField::Summary) => payload.set_summary(first),
            Some(known @ (KnownField::Assignee | KnownField::Reporter)) => {
                payload.set_user_name(known.id(), first)
            }
            Some(KnownField::Priority) => {
                match schema_field.priorities().find(|(_, name)| *name == first) {
                    Some((id, _)) => payload.set_priority_id(id),
                    None => debug!(priority = %first, "No matching priority, leaving it unset"),
                }
            }
            Some(
                known @ (KnownField::Components
                | KnownField::AffectsVersions
                | KnownField::FixVersions),
            ) => payload.set_names(known.id(), field.values()),
            _ => map_by_type(tracker, &mut payload, field, schema_field, first).await?,
        }
    }

    let generated = description.render(request);
    payload.set_description(format!("{user_description}\n{generated}"));
    Ok(payload)
}

async fn map_by_type(
    tracker: &dyn IssueTrackerService,
    payload: &mut IssuePayload,
    field: &FormField,
    schema_field: &SchemaField,
    first: &str,
) -> AppResult<()> {
    let id = schema_field.id.as_str();

    if schema_field.allowed_values.is_some() {
        if let Err(err) = select_options(payload, field, schema_field) {
            warn!(field = %id, error = %err, "Falling back to placeholder value");
            payload.set_field(id, Value::String(AUTOFIELD_PLACEHOLDER.to_string()));
        }
        return Ok(());
    }

    match &field.field_type {
        FieldType::Array if KnownField::lookup(id) == Some(KnownField::Labels) => {
            let labels = split_labels(first).into_iter().map(Value::String).collect();
            payload.set_field(id, Value::Array(labels));
        }
        FieldType::Array => {
            let values = field.values().iter().cloned().map(Value::String).collect();
            payload.set_field(id, Value::Array(values));
        }
        FieldType::Number => {
            let number = first
                .parse::<i64>()
                .map_err(|source| AppError::InvalidNumber {
                    field: field.field_name.clone(),
                    source,
                })?;
            payload.set_field(id, Value::Number(Number::from(number)));
        }
        FieldType::User => {
            let user = tracker.fetch_user(first).await?.ok_or_else(|| {
                AppError::Integration(format!(
                    "Value for '{first}' field with 'user' type wasn't found in JIRA"
                ))
            })?;
            payload.set_user(id, &user);
        }
        FieldType::Date => match NaiveDate::parse_from_str(first, FORM_DATE_FORMAT) {
            Ok(date) => {
                payload.set_field(id, Value::String(date.format(FORM_DATE_FORMAT).to_string()))
            }
            Err(err) => {
                error!(field = %id, value = %first, error = %err, "Unparsable date, leaving it unset")
            }
        },
        _ => payload.set_field(id, Value::String(first.to_string())),
    }
    Ok(())
}

/// Picks the schema options whose display value was submitted.
fn select_options(
    payload: &mut IssuePayload,
    field: &FormField,
    schema_field: &SchemaField,
) -> Result<(), MappingError> {
    let ids: Vec<String> = schema_field
        .custom_options()
        .filter(|(_, value)| field.values().iter().any(|submitted| submitted == value))
        .map(|(id, _)| id.to_string())
        .collect();

    if field.field_type == FieldType::Array {
        payload.set_option_ids(&schema_field.id, &ids);
        return Ok(());
    }

    let id = ids.first().ok_or_else(|| MappingError::NoMatchingOption {
        field: schema_field.id.clone(),
        values: field.values().to_vec(),
    })?;
    payload.set_option_id(&schema_field.id, id);
    Ok(())
}

fn split_labels(raw: &str) -> Vec<String> {
    raw.split(' ')
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::domain::schema::TrackerUser;
    use crate::workflow::testing::{
        FakeTracker, StaticDescription, bug_schema, option, priority, schema_field, submitted,
    };

    fn bug() -> IssueTypeRef {
        IssueTypeRef {
            id: "1".to_string(),
            name: "Bug".to_string(),
        }
    }

    fn schema() -> IssueTypeSchema {
        bug_schema(vec![
            schema_field("summary", "Summary", FieldType::String, None),
            schema_field("description", "Description", FieldType::String, None),
            schema_field(
                "priority",
                "Priority",
                FieldType::Other("priority".to_string()),
                Some(vec![priority("1", "High"), priority("3", "Low")]),
            ),
            schema_field("components", "Component/s", FieldType::Array, None),
            schema_field("versions", "Affects Version/s", FieldType::Array, None),
            schema_field("fixVersions", "Fix Version/s", FieldType::Array, None),
            schema_field("assignee", "Assignee", FieldType::User, None),
            schema_field("reporter", "Reporter", FieldType::User, None),
            schema_field("labels", "Labels", FieldType::Array, None),
            schema_field("customfield_1", "Tags", FieldType::Array, None),
            schema_field("customfield_2", "Story Points", FieldType::Number, None),
            schema_field("customfield_3", "Reviewer", FieldType::User, None),
            schema_field("customfield_4", "Due", FieldType::Date, None),
            schema_field("customfield_5", "Build", FieldType::String, None),
            schema_field(
                "customfield_6",
                "Environment",
                FieldType::Option,
                Some(vec![option("100", "Prod"), option("101", "Stage")]),
            ),
            schema_field(
                "customfield_7",
                "Browsers",
                FieldType::Array,
                Some(vec![option("200", "Chrome"), option("201", "Firefox")]),
            ),
        ])
    }

    async fn compose_with(
        tracker: &FakeTracker,
        fields: Vec<FormField>,
        generated: &'static str,
    ) -> AppResult<IssuePayload> {
        let request = TicketRequest {
            fields,
            ..TicketRequest::default()
        };
        compose_issue_payload(
            tracker,
            &tracker.project,
            &bug(),
            &tracker.schema,
            &request,
            &StaticDescription(generated),
        )
        .await
    }

    async fn compose(fields: Vec<FormField>) -> AppResult<IssuePayload> {
        compose_with(&FakeTracker::new(schema()), fields, "Generated by RP").await
    }

    #[tokio::test]
    async fn fixes_project_and_issue_type() {
        let payload = compose(vec![
            submitted("project", FieldType::Other("project".to_string()), &["OTHER"]),
            submitted("issuetype", FieldType::Other("issuetype".to_string()), &["Task"]),
        ])
        .await
        .unwrap();

        assert_eq!(payload.field("project"), Some(&json!({ "key": "RP" })));
        assert_eq!(payload.field("issuetype"), Some(&json!({ "id": "1" })));
    }

    #[tokio::test]
    async fn maps_priority_by_name() {
        let payload = compose(vec![submitted(
            "priority",
            FieldType::Other("priority".to_string()),
            &["High"],
        )])
        .await
        .unwrap();
        assert_eq!(payload.field("priority"), Some(&json!({ "id": "1" })));
    }

    #[tokio::test]
    async fn unknown_priority_is_left_out() {
        let payload = compose(vec![submitted(
            "priority",
            FieldType::Other("priority".to_string()),
            &["Unknown"],
        )])
        .await
        .unwrap();
        assert!(payload.field("priority").is_none());
    }

    #[tokio::test]
    async fn joins_user_and_generated_description() {
        let payload = compose(vec![submitted("description", FieldType::String, &["my notes"])])
            .await
            .unwrap();
        assert_eq!(
            payload.field("description"),
            Some(&json!("my notes\nGenerated by RP"))
        );
    }

    #[tokio::test]
    async fn generated_description_is_always_written() {
        let payload = compose(Vec::new()).await.unwrap();
        assert_eq!(payload.field("description"), Some(&json!("\nGenerated by RP")));
    }

    #[tokio::test]
    async fn splits_labels_on_spaces() {
        let payload = compose(vec![submitted("labels", FieldType::Array, &["a b c"])])
            .await
            .unwrap();
        assert_eq!(payload.field("labels"), Some(&json!(["a", "b", "c"])));
    }

    #[tokio::test]
    async fn other_arrays_pass_through() {
        let payload = compose(vec![submitted("customfield_1", FieldType::Array, &["x y", "z"])])
            .await
            .unwrap();
        assert_eq!(payload.field("customfield_1"), Some(&json!(["x y", "z"])));
    }

    #[tokio::test]
    async fn copies_summary_people_and_name_lists() {
        let payload = compose(vec![
            submitted("summary", FieldType::String, &["Login fails"]),
            submitted("assignee", FieldType::User, &["jdoe"]),
            submitted("reporter", FieldType::User, &["rp-bot"]),
            submitted("components", FieldType::Array, &["UI", "API"]),
            submitted("versions", FieldType::Array, &["5.0"]),
            submitted("fixVersions", FieldType::Array, &["5.1"]),
        ])
        .await
        .unwrap();

        assert_eq!(payload.field("summary"), Some(&json!("Login fails")));
        assert_eq!(payload.field("assignee"), Some(&json!({ "name": "jdoe" })));
        assert_eq!(payload.field("reporter"), Some(&json!({ "name": "rp-bot" })));
        assert_eq!(
            payload.field("components"),
            Some(&json!([{ "name": "UI" }, { "name": "API" }]))
        );
        assert_eq!(payload.field("versions"), Some(&json!([{ "name": "5.0" }])));
        assert_eq!(payload.field("fixVersions"), Some(&json!([{ "name": "5.1" }])));
    }

    #[tokio::test]
    async fn known_field_ids_match_ignoring_case() {
        let payload = compose(vec![
            submitted("Summary", FieldType::String, &["Login fails"]),
            submitted("PRIORITY", FieldType::Other("priority".to_string()), &["Low"]),
            submitted("Components", FieldType::Array, &["UI"]),
            submitted("FIXVERSIONS", FieldType::Array, &["5.1"]),
            submitted("Labels", FieldType::Array, &["ui flaky"]),
        ])
        .await
        .unwrap();

        assert_eq!(payload.field("summary"), Some(&json!("Login fails")));
        assert_eq!(payload.field("priority"), Some(&json!({ "id": "3" })));
        assert_eq!(payload.field("components"), Some(&json!([{ "name": "UI" }])));
        assert_eq!(payload.field("fixVersions"), Some(&json!([{ "name": "5.1" }])));
        assert_eq!(payload.field("labels"), Some(&json!(["ui", "flaky"])));
        assert!(payload.field("Summary").is_none());
    }

    #[tokio::test]
    async fn required_field_without_value_is_rejected() {
        let mut summary = submitted("summary", FieldType::String, &[]);
        summary.field_name = "Summary".to_string();
        summary.required = true;

        let err = compose(vec![summary]).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(message) if message.contains("'Summary' is empty")));
    }

    #[tokio::test]
    async fn optional_blank_fields_are_skipped() {
        let mut missing = submitted("customfield_5", FieldType::String, &[]);
        missing.value = None;
        let payload = compose(vec![
            missing,
            submitted("customfield_2", FieldType::Number, &[""]),
        ])
        .await
        .unwrap();

        assert!(payload.field("customfield_5").is_none());
        assert!(payload.field("customfield_2").is_none());
    }

    #[tokio::test]
    async fn fields_missing_from_schema_are_ignored() {
        let payload = compose(vec![submitted("customfield_99", FieldType::String, &["x"])])
            .await
            .unwrap();
        assert!(payload.field("customfield_99").is_none());
    }

    #[tokio::test]
    async fn parses_numbers() {
        let payload = compose(vec![submitted("customfield_2", FieldType::Number, &["8"])])
            .await
            .unwrap();
        assert_eq!(payload.field("customfield_2"), Some(&json!(8)));
    }

    #[tokio::test]
    async fn non_numeric_number_fails() {
        let err = compose(vec![submitted("customfield_2", FieldType::Number, &["eight"])])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidNumber { .. }));
    }

    #[tokio::test]
    async fn reformats_dates() {
        let payload = compose(vec![submitted("customfield_4", FieldType::Date, &["2021-03-07"])])
            .await
            .unwrap();
        assert_eq!(payload.field("customfield_4"), Some(&json!("2021-03-07")));
    }

    #[tokio::test]
    async fn unparsable_date_is_left_out() {
        let payload = compose(vec![submitted("customfield_4", FieldType::Date, &["07/03/2021"])])
            .await
            .unwrap();
        assert!(payload.field("customfield_4").is_none());
    }

    #[tokio::test]
    async fn resolves_user_fields() {
        let mut tracker = FakeTracker::new(schema());
        tracker.users.push(TrackerUser {
            name: Some("jdoe".to_string()),
            account_id: None,
            display_name: "Jane Doe".to_string(),
        });

        let payload = compose_with(
            &tracker,
            vec![submitted("customfield_3", FieldType::User, &["jdoe"])],
            "",
        )
        .await
        .unwrap();
        assert_eq!(payload.field("customfield_3"), Some(&json!({ "name": "jdoe" })));
    }

    #[tokio::test]
    async fn unknown_user_fails() {
        let err = compose(vec![submitted("customfield_3", FieldType::User, &["ghost"])])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Integration(message) if message.contains("'ghost'")));
    }

    #[tokio::test]
    async fn copies_plain_values() {
        let payload = compose(vec![submitted("customfield_5", FieldType::String, &["1.2.3"])])
            .await
            .unwrap();
        assert_eq!(payload.field("customfield_5"), Some(&json!("1.2.3")));
    }

    #[tokio::test]
    async fn selects_single_option_by_display_value() {
        let payload = compose(vec![submitted("customfield_6", FieldType::Option, &["Stage"])])
            .await
            .unwrap();
        assert_eq!(payload.field("customfield_6"), Some(&json!({ "id": "101" })));
    }

    #[tokio::test]
    async fn selects_every_matching_option_for_arrays() {
        let payload = compose(vec![submitted(
            "customfield_7",
            FieldType::Array,
            &["Firefox", "Safari", "Chrome"],
        )])
        .await
        .unwrap();
        assert_eq!(
            payload.field("customfield_7"),
            Some(&json!([{ "id": "200" }, { "id": "201" }]))
        );
    }

    #[tokio::test]
    async fn unmatched_option_falls_back_to_placeholder() {
        let payload = compose(vec![submitted("customfield_6", FieldType::Option, &["QA"])])
            .await
            .unwrap();
        assert_eq!(
            payload.field("customfield_6"),
            Some(&json!(AUTOFIELD_PLACEHOLDER))
        );
    }
}
