//! In-memory tracker used by workflow tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::config::{AppConfig, IntegrationParams};
use crate::context::AppContext;
use crate::domain::form::{FieldType, FormField, TicketRequest};
use crate::domain::schema::{
    IssueTypeRef, IssueTypeSchema, NamedEntity, ProjectRole, RoleActor, SchemaField, SchemaValue,
    TrackerProject, TrackerUser,
};
use crate::domain::ticket::{IssuePayload, Ticket};
use crate::error::{AppError, AppResult};
use crate::services::{DescriptionProvider, IssueTrackerConnector, IssueTrackerService};

#[derive(Clone)]
pub struct FakeTracker {
    pub project: TrackerProject,
    pub roles: Vec<ProjectRole>,
    pub schema: IssueTypeSchema,
    pub users: Vec<TrackerUser>,
    pub metadata_unavailable: bool,
    pub roles_forbidden: bool,
    pub created: Arc<Mutex<Vec<IssuePayload>>>,
    pub opened: Arc<AtomicUsize>,
}

impl FakeTracker {
    pub fn new(schema: IssueTypeSchema) -> Self {
        Self {
            project: sample_project(),
            roles: sample_roles(),
            schema,
            users: Vec::new(),
            metadata_unavailable: false,
            roles_forbidden: false,
            created: Arc::new(Mutex::new(Vec::new())),
            opened: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn created(&self) -> Vec<IssuePayload> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl IssueTrackerService for FakeTracker {
    async fn fetch_project(&self, project_key: &str) -> AppResult<TrackerProject> {
        if project_key != self.project.key {
            return Err(AppError::Integration(format!(
                "Jira responded with 404 Not Found: no project {project_key}"
            )));
        }
        Ok(self.project.clone())
    }

    async fn fetch_project_roles(&self, project_key: &str) -> AppResult<Vec<ProjectRole>> {
        if self.roles_forbidden {
            return Err(AppError::Integration(
                "Jira authentication failed (403 Forbidden)".to_string(),
            ));
        }
        if project_key != self.project.key {
            return Err(AppError::Integration(format!(
                "Jira responded with 404 Not Found: no project {project_key}"
            )));
        }
        Ok(self.roles.clone())
    }

    async fn fetch_create_metadata(
        &self,
        project_key: &str,
        issue_type_id: &str,
    ) -> AppResult<IssueTypeSchema> {
        if self.metadata_unavailable {
            return Err(AppError::Integration("failed to call Jira: connection refused".to_string()));
        }
        if project_key != self.project.key || issue_type_id != self.schema.id {
            return Err(AppError::Integration(format!("Project {project_key} not found")));
        }
        Ok(self.schema.clone())
    }

    async fn fetch_user(&self, username: &str) -> AppResult<Option<TrackerUser>> {
        Ok(self
            .users
            .iter()
            .find(|user| user.name.as_deref() == Some(username))
            .cloned())
    }

    async fn create_issue(&self, payload: &IssuePayload) -> AppResult<Ticket> {
        self.created.lock().unwrap().push(payload.clone());
        Ok(Ticket {
            id: "10100".to_string(),
            key: "RP-1".to_string(),
            url: "https://jira.example.com/browse/RP-1".to_string(),
            summary: payload
                .field("summary")
                .and_then(|summary| summary.as_str())
                .map(str::to_string),
            status: Some("Open".to_string()),
        })
    }
}

pub struct FakeConnector {
    pub tracker: FakeTracker,
}

impl IssueTrackerConnector for FakeConnector {
    fn open(&self, _params: &IntegrationParams) -> AppResult<Box<dyn IssueTrackerService>> {
        self.tracker.opened.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(self.tracker.clone()))
    }
}

pub struct StaticDescription(pub &'static str);

impl DescriptionProvider for StaticDescription {
    fn render(&self, _request: &TicketRequest) -> String {
        self.0.to_string()
    }
}

pub fn context_for(tracker: FakeTracker, description: &'static str) -> AppContext {
    AppContext::new(
        AppConfig {
            jira_url: Some("https://jira.example.com".to_string()),
            jira_username: Some("rp-bot".to_string()),
            jira_token: Some("secret".to_string()),
            jira_project: Some("RP".to_string()),
        },
        Arc::new(FakeConnector { tracker }),
        Arc::new(StaticDescription(description)),
    )
}

pub fn sample_project() -> TrackerProject {
    TrackerProject {
        id: "10000".to_string(),
        key: "RP".to_string(),
        name: "ReportPortal".to_string(),
        issue_types: vec![
            IssueTypeRef {
                id: "1".to_string(),
                name: "Bug".to_string(),
            },
            IssueTypeRef {
                id: "3".to_string(),
                name: "Task".to_string(),
            },
        ],
        components: vec![entity("20", "UI"), entity("21", "API")],
        versions: vec![entity("30", "5.0"), entity("31", "5.1")],
    }
}

/// Two roles sharing member "8".
pub fn sample_roles() -> Vec<ProjectRole> {
    vec![
        ProjectRole {
            id: "10002".to_string(),
            name: "Developers".to_string(),
            actors: vec![actor("7", "Jane Doe"), actor("8", "John Roe")],
        },
        ProjectRole {
            id: "10003".to_string(),
            name: "Testers".to_string(),
            actors: vec![actor("8", "John Roe"), actor("9", "Ann Poe")],
        },
    ]
}

pub fn entity(id: &str, name: &str) -> NamedEntity {
    NamedEntity {
        id: id.to_string(),
        name: name.to_string(),
    }
}

pub fn actor(id: &str, display_name: &str) -> RoleActor {
    RoleActor {
        id: id.to_string(),
        display_name: display_name.to_string(),
        name: Some(display_name.to_lowercase().replace(' ', ".")),
        actor_type: Some("atlassian-user-role-actor".to_string()),
    }
}

pub fn schema_field(
    id: &str,
    name: &str,
    schema_type: FieldType,
    allowed_values: Option<Vec<SchemaValue>>,
) -> SchemaField {
    SchemaField {
        id: id.to_string(),
        name: name.to_string(),
        schema_type,
        required: false,
        allowed_values,
    }
}

pub fn option(id: &str, value: &str) -> SchemaValue {
    SchemaValue::CustomOption {
        id: id.to_string(),
        value: value.to_string(),
    }
}

pub fn priority(id: &str, name: &str) -> SchemaValue {
    SchemaValue::Priority {
        id: id.to_string(),
        name: name.to_string(),
    }
}

pub fn bug_schema(fields: Vec<SchemaField>) -> IssueTypeSchema {
    IssueTypeSchema {
        id: "1".to_string(),
        name: "Bug".to_string(),
        fields,
    }
}

pub fn submitted(id: &str, field_type: FieldType, values: &[&str]) -> FormField {
    FormField {
        id: id.to_string(),
        field_name: id.to_string(),
        field_type,
        required: false,
        value: Some(values.iter().map(|value| value.to_string()).collect()),
        defined_values: Vec::new(),
    }
}
