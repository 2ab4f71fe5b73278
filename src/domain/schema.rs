//! Read-only views of tracker objects, owned for the length of one operation.

use crate::domain::form::FieldType;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueTypeRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedEntity {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleActor {
    pub id: String,
    pub display_name: String,
    pub name: Option<String>,
    pub actor_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRole {
    pub id: String,
    pub name: String,
    pub actors: Vec<RoleActor>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerProject {
    pub id: String,
    pub key: String,
    pub name: String,
    pub issue_types: Vec<IssueTypeRef>,
    pub components: Vec<NamedEntity>,
    pub versions: Vec<NamedEntity>,
}

impl TrackerProject {
    pub fn find_issue_type(&self, name: &str) -> Option<&IssueTypeRef> {
        self.issue_types
            .iter()
            .find(|issue_type| issue_type.name.eq_ignore_ascii_case(name))
    }
}

/// One entry of a field's allowed-value list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaValue {
    CustomOption { id: String, value: String },
    Priority { id: String, name: String },
    /// Value kinds the mapping does not understand (components, versions, ...).
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaField {
    pub id: String,
    pub name: String,
    pub schema_type: FieldType,
    pub required: bool,
    pub allowed_values: Option<Vec<SchemaValue>>,
}

impl SchemaField {
    pub fn custom_options(&self) -> impl Iterator<Item = (&str, &str)> {
        self.allowed_values
            .iter()
            .flatten()
            .filter_map(|value| match value {
                SchemaValue::CustomOption { id, value } => Some((id.as_str(), value.as_str())),
                _ => None,
            })
    }

    pub fn priorities(&self) -> impl Iterator<Item = (&str, &str)> {
        self.allowed_values
            .iter()
            .flatten()
            .filter_map(|value| match value {
                SchemaValue::Priority { id, name } => Some((id.as_str(), name.as_str())),
                _ => None,
            })
    }
}

/// Create-issue metadata for a single project / issue type pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueTypeSchema {
    pub id: String,
    pub name: String,
    /// Fields in the order the tracker lists them.
    pub fields: Vec<SchemaField>,
}

impl IssueTypeSchema {
    /// Field ids are matched ignoring ASCII case.
    pub fn field(&self, id: &str) -> Option<&SchemaField> {
        self.fields
            .iter()
            .find(|field| field.id.eq_ignore_ascii_case(id))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerUser {
    pub name: Option<String>,
    pub account_id: Option<String>,
    pub display_name: String,
}
