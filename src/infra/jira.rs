use std::time::Duration;

use async_trait::async_trait;
use base64::prelude::{BASE64_STANDARD, Engine as _};
use reqwest::{
    Client, RequestBuilder, Response, StatusCode,
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::config::IntegrationParams;
use crate::domain::form::FieldType;
use crate::domain::schema::{
    IssueTypeRef, IssueTypeSchema, NamedEntity, ProjectRole, RoleActor, SchemaField, SchemaValue,
    TrackerProject, TrackerUser,
};
use crate::domain::ticket::{IssuePayload, Ticket};
use crate::error::{AppError, AppResult};
use crate::services::{IssueTrackerConnector, IssueTrackerService};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Opens a fresh [`JiraClient`] for every operation.
pub struct JiraConnector;

impl IssueTrackerConnector for JiraConnector {
    fn open(&self, params: &IntegrationParams) -> AppResult<Box<dyn IssueTrackerService>> {
        Ok(Box::new(JiraClient::new(params)?))
    }
}

pub struct JiraClient {
    http: Client,
    base_url: String,
    username: String,
    token: String,
}

impl JiraClient {
    pub fn new(params: &IntegrationParams) -> AppResult<Self> {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|err| AppError::Integration(format!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            http,
            base_url: strip_end(params.url.trim(), "/").to_string(),
            username: params.username.clone(),
            token: params.token.clone(),
        })
    }

    fn auth_header(username: &str, token: &str) -> String {
        let credentials = format!("{username}:{token}");
        let encoded = BASE64_STANDARD.encode(credentials);
        format!("Basic {encoded}")
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}/rest/api/2/{}", self.base_url, path)
    }

    fn browse_url(base_url: &str, key: &str) -> String {
        format!("{}/browse/{}", strip_end(base_url, "/"), key)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header(AUTHORIZATION, Self::auth_header(&self.username, &self.token))
            .header(ACCEPT, "application/json")
    }

    async fn send(&self, request: RequestBuilder) -> AppResult<Response> {
        self.authorized(request)
            .send()
            .await
            .map_err(|err| AppError::Integration(format!("failed to call Jira: {err}")))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, &str)]) -> AppResult<T> {
        debug!(url = %url, "Requesting Jira resource");
        let response = self.send(self.http.get(url).query(query)).await?;
        read_json(response).await
    }

    async fn fetch_role(&self, url: &str) -> AppResult<ProjectRole> {
        let role: JiraRole = self.get_json(url, &[]).await?;
        Ok(role.into())
    }

    async fn fetch_issue_overview(&self, key: &str) -> AppResult<JiraIssue> {
        let url = self.api_url(&format!("issue/{key}"));
        self.get_json(&url, &[("fields", "summary,status")]).await
    }
}

#[async_trait]
impl IssueTrackerService for JiraClient {
    async fn fetch_project(&self, project_key: &str) -> AppResult<TrackerProject> {
        let url = self.api_url(&format!("project/{}", project_key.trim()));
        let project: JiraProject = self.get_json(&url, &[]).await?;

        Ok(TrackerProject {
            id: project.id,
            key: project.key,
            name: project.name,
            issue_types: project
                .issue_types
                .into_iter()
                .map(|issue_type| IssueTypeRef {
                    id: issue_type.id,
                    name: issue_type.name,
                })
                .collect(),
            components: project.components.into_iter().map(Into::into).collect(),
            versions: project.versions.into_iter().map(Into::into).collect(),
        })
    }

    async fn fetch_project_roles(&self, project_key: &str) -> AppResult<Vec<ProjectRole>> {
        let url = self.api_url(&format!("project/{}/role", project_key.trim()));
        // Role name to role resource URL.
        let role_urls: Map<String, Value> = self.get_json(&url, &[]).await?;

        let mut roles = Vec::with_capacity(role_urls.len());
        for (name, role_url) in &role_urls {
            let Some(role_url) = role_url.as_str() else {
                debug!(role = %name, "Skipping project role without a URL");
                continue;
            };
            roles.push(self.fetch_role(role_url).await?);
        }
        Ok(roles)
    }

    async fn fetch_create_metadata(
        &self,
        project_key: &str,
        issue_type_id: &str,
    ) -> AppResult<IssueTypeSchema> {
        let url = self.api_url("issue/createmeta");
        let metadata: JiraCreateMeta = self
            .get_json(
                &url,
                &[
                    ("projectKeys", project_key),
                    ("issuetypeIds", issue_type_id),
                    ("expand", "projects.issuetypes.fields"),
                ],
            )
            .await?;

        let project = metadata
            .projects
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Integration(format!("Project {project_key} not found")))?;
        let issue_type = project
            .issue_types
            .into_iter()
            .find(|issue_type| issue_type.id == issue_type_id)
            .ok_or_else(|| {
                AppError::Integration(format!(
                    "Issue type {issue_type_id} not found in project {project_key}"
                ))
            })?;

        let mut fields = Vec::with_capacity(issue_type.fields.len());
        for (key, raw) in issue_type.fields {
            let field: JiraCimField = serde_json::from_value(raw).map_err(|err| {
                AppError::Integration(format!("malformed metadata for field '{key}': {err}"))
            })?;
            fields.push(field.into_schema_field(key));
        }

        Ok(IssueTypeSchema {
            id: issue_type.id,
            name: issue_type.name,
            fields,
        })
    }

    async fn fetch_user(&self, username: &str) -> AppResult<Option<TrackerUser>> {
        let url = self.api_url("user");
        debug!(username = %username, "Looking up Jira user");
        let response = self
            .send(self.http.get(&url).query(&[("username", username)]))
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let user: JiraUser = read_json(response).await?;
        Ok(Some(TrackerUser {
            name: user.name,
            account_id: user.account_id,
            display_name: user.display_name,
        }))
    }

    async fn create_issue(&self, payload: &IssuePayload) -> AppResult<Ticket> {
        let url = self.api_url("issue");
        let response = self
            .send(
                self.http
                    .post(&url)
                    .header(CONTENT_TYPE, "application/json")
                    .json(payload),
            )
            .await?;
        let created: JiraCreatedIssue = read_json(response).await?;

        info!(key = %created.key, "Created Jira issue");
        let url = Self::browse_url(&self.base_url, &created.key);

        // The create response only carries id and key.
        let (summary, status) = match self.fetch_issue_overview(&created.key).await {
            Ok(issue) => (
                issue.fields.summary,
                issue.fields.status.map(|status| status.name),
            ),
            Err(err) => {
                warn!(key = %created.key, error = %err, "Unable to read back the created issue");
                (None, None)
            }
        };

        Ok(Ticket {
            id: created.id,
            key: created.key,
            url,
            summary,
            status,
        })
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> AppResult<T> {
    let status = response.status();
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(AppError::Integration(format!(
            "Jira authentication failed ({status})"
        ))),
        status if !status.is_success() => {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unable to read response>".to_string());
            Err(AppError::Integration(format!(
                "Jira responded with {status}: {body}"
            )))
        }
        _ => response.json().await.map_err(|err| {
            AppError::Integration(format!("failed to parse Jira response: {err}"))
        }),
    }
}

fn strip_end<'a>(value: &'a str, suffix: &str) -> &'a str {
    value.strip_suffix(suffix).unwrap_or(value)
}

/// Jira sends some ids as strings and others (roles, actors) as numbers.
fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(text) => text,
        RawId::Number(number) => number.to_string(),
    })
}

#[derive(Deserialize)]
struct JiraProject {
    #[serde(deserialize_with = "id_string")]
    id: String,
    key: String,
    #[serde(default)]
    name: String,
    #[serde(rename = "issueTypes", default)]
    issue_types: Vec<JiraIssueType>,
    #[serde(default)]
    components: Vec<JiraNamed>,
    #[serde(default)]
    versions: Vec<JiraNamed>,
}

#[derive(Deserialize)]
struct JiraIssueType {
    #[serde(deserialize_with = "id_string")]
    id: String,
    name: String,
}

#[derive(Deserialize)]
struct JiraNamed {
    #[serde(deserialize_with = "id_string")]
    id: String,
    name: String,
}

impl From<JiraNamed> for NamedEntity {
    fn from(value: JiraNamed) -> Self {
        Self {
            id: value.id,
            name: value.name,
        }
    }
}

#[derive(Deserialize)]
struct JiraRole {
    #[serde(deserialize_with = "id_string")]
    id: String,
    name: String,
    #[serde(default)]
    actors: Vec<JiraRoleActor>,
}

#[derive(Deserialize)]
struct JiraRoleActor {
    #[serde(deserialize_with = "id_string")]
    id: String,
    #[serde(rename = "displayName")]
    display_name: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(rename = "type", default)]
    actor_type: Option<String>,
}

impl From<JiraRole> for ProjectRole {
    fn from(role: JiraRole) -> Self {
        Self {
            id: role.id,
            name: role.name,
            actors: role
                .actors
                .into_iter()
                .map(|actor| RoleActor {
                    id: actor.id,
                    display_name: actor.display_name,
                    name: actor.name,
                    actor_type: actor.actor_type,
                })
                .collect(),
        }
    }
}

#[derive(Deserialize)]
struct JiraCreateMeta {
    #[serde(default)]
    projects: Vec<JiraCimProject>,
}

#[derive(Deserialize)]
struct JiraCimProject {
    #[serde(rename = "issuetypes", default)]
    issue_types: Vec<JiraCimIssueType>,
}

#[derive(Deserialize)]
struct JiraCimIssueType {
    #[serde(deserialize_with = "id_string")]
    id: String,
    name: String,
    /// Kept as a raw map so the tracker's field order survives.
    #[serde(default)]
    fields: Map<String, Value>,
}

#[derive(Deserialize)]
struct JiraCimField {
    #[serde(default)]
    required: bool,
    name: String,
    #[serde(rename = "fieldId", default)]
    field_id: Option<String>,
    schema: JiraFieldSchema,
    #[serde(rename = "allowedValues", default)]
    allowed_values: Option<Vec<Value>>,
}

#[derive(Deserialize)]
struct JiraFieldSchema {
    #[serde(rename = "type")]
    schema_type: String,
    #[serde(default)]
    system: Option<String>,
}

impl JiraCimField {
    fn into_schema_field(self, key: String) -> SchemaField {
        let id = self.field_id.unwrap_or(key);
        let is_priority = id.eq_ignore_ascii_case("priority")
            || self.schema.system.as_deref() == Some("priority");
        let allowed_values = self.allowed_values.map(|values| {
            values
                .iter()
                .map(|value| schema_value(value, is_priority))
                .collect()
        });

        SchemaField {
            id,
            name: self.name,
            schema_type: FieldType::parse(&self.schema.schema_type),
            required: self.required,
            allowed_values,
        }
    }
}

fn schema_value(raw: &Value, is_priority: bool) -> SchemaValue {
    let text = |key: &str| match raw.get(key) {
        Some(Value::String(text)) => Some(text.clone()),
        Some(Value::Number(number)) => Some(number.to_string()),
        _ => None,
    };

    match (text("id"), text("value"), text("name")) {
        (Some(id), Some(value), _) => SchemaValue::CustomOption { id, value },
        (Some(id), None, Some(name)) if is_priority => SchemaValue::Priority { id, name },
        _ => SchemaValue::Other,
    }
}

#[derive(Deserialize)]
struct JiraUser {
    #[serde(default)]
    name: Option<String>,
    #[serde(rename = "accountId", default)]
    account_id: Option<String>,
    #[serde(rename = "displayName")]
    display_name: String,
}

#[derive(Deserialize)]
struct JiraCreatedIssue {
    #[serde(deserialize_with = "id_string")]
    id: String,
    key: String,
}

#[derive(Deserialize)]
struct JiraIssue {
    #[serde(default)]
    fields: JiraIssueFields,
}

#[derive(Deserialize, Default)]
struct JiraIssueFields {
    #[serde(default)]
    summary: Option<String>,
    #[serde(default)]
    status: Option<JiraStatus>,
}

#[derive(Deserialize)]
struct JiraStatus {
    name: String,
}
