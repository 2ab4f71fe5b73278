use async_trait::async_trait;

use crate::config::IntegrationParams;
use crate::domain::schema::{IssueTypeSchema, ProjectRole, TrackerProject, TrackerUser};
use crate::domain::ticket::{IssuePayload, Ticket};
use crate::error::AppResult;

/// One session with the tracker. Sessions are opened per operation and are
/// never shared between operations.
#[async_trait]
pub trait IssueTrackerService: Send + Sync {
    async fn fetch_project(&self, project_key: &str) -> AppResult<TrackerProject>;
    /// Role members of the project. Reading roles may need more permissions
    /// than creating issues, so only discovery asks for them.
    async fn fetch_project_roles(&self, project_key: &str) -> AppResult<Vec<ProjectRole>>;
    async fn fetch_create_metadata(
        &self,
        project_key: &str,
        issue_type_id: &str,
    ) -> AppResult<IssueTypeSchema>;
    async fn fetch_user(&self, username: &str) -> AppResult<Option<TrackerUser>>;
    async fn create_issue(&self, payload: &IssuePayload) -> AppResult<Ticket>;
}

pub trait IssueTrackerConnector: Send + Sync {
    fn open(&self, params: &IntegrationParams) -> AppResult<Box<dyn IssueTrackerService>>;
}
