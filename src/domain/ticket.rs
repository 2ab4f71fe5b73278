use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::domain::schema::TrackerUser;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: String,
    pub key: String,
    pub url: String,
    /// Read back from the tracker after creation; absent if that lookup failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Body of a create-issue request, `{"fields": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IssuePayload {
    fields: Map<String, Value>,
}

impl IssuePayload {
    pub fn new(project_key: &str, issue_type_id: &str) -> Self {
        let mut fields = Map::new();
        fields.insert("project".to_string(), json!({ "key": project_key }));
        fields.insert("issuetype".to_string(), json!({ "id": issue_type_id }));
        Self { fields }
    }

    #[cfg(test)]
    pub fn field(&self, id: &str) -> Option<&Value> {
        self.fields.get(id)
    }

    pub fn set_field(&mut self, id: &str, value: Value) {
        self.fields.insert(id.to_string(), value);
    }

    pub fn set_summary(&mut self, summary: &str) {
        self.set_field("summary", Value::String(summary.to_string()));
    }

    pub fn set_description(&mut self, description: String) {
        self.set_field("description", Value::String(description));
    }

    pub fn set_priority_id(&mut self, priority_id: &str) {
        self.set_field("priority", json!({ "id": priority_id }));
    }

    pub fn set_user_name(&mut self, field_id: &str, name: &str) {
        self.set_field(field_id, json!({ "name": name }));
    }

    pub fn set_user(&mut self, field_id: &str, user: &TrackerUser) {
        let reference = match (&user.account_id, &user.name) {
            (Some(account_id), _) => json!({ "accountId": account_id }),
            (None, Some(name)) => json!({ "name": name }),
            (None, None) => json!({ "name": user.display_name }),
        };
        self.set_field(field_id, reference);
    }

    /// Components and versions are referenced by name.
    pub fn set_names(&mut self, field_id: &str, names: &[String]) {
        let references = names.iter().map(|name| json!({ "name": name })).collect();
        self.set_field(field_id, Value::Array(references));
    }

    pub fn set_option_ids(&mut self, field_id: &str, ids: &[String]) {
        let references = ids.iter().map(|id| json!({ "id": id })).collect();
        self.set_field(field_id, Value::Array(references));
    }

    pub fn set_option_id(&mut self, field_id: &str, id: &str) {
        self.set_field(field_id, json!({ "id": id }));
    }
}
