use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Input kind of a form field, as declared by the tracker schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    Array,
    Date,
    Number,
    User,
    Option,
    String,
    /// Tracker types with no dedicated conversion (`priority`, `datetime`, ...).
    Other(String),
}

impl FieldType {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "array" => FieldType::Array,
            "date" => FieldType::Date,
            "number" => FieldType::Number,
            "user" => FieldType::User,
            "option" => FieldType::Option,
            "string" => FieldType::String,
            _ => FieldType::Other(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            FieldType::Array => "array",
            FieldType::Date => "date",
            FieldType::Number => "number",
            FieldType::User => "user",
            FieldType::Option => "option",
            FieldType::String => "string",
            FieldType::Other(raw) => raw.as_str(),
        }
    }
}

impl From<String> for FieldType {
    fn from(value: String) -> Self {
        FieldType::parse(&value)
    }
}

impl From<FieldType> for String {
    fn from(value: FieldType) -> Self {
        value.as_str().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllowedValue {
    pub value_id: String,
    pub value_name: String,
}

impl AllowedValue {
    pub fn new(value_id: impl Into<String>, value_name: impl Into<String>) -> Self {
        Self {
            value_id: value_id.into(),
            value_name: value_name.into(),
        }
    }
}

/// One issue-creation input, independent of the tracker vendor.
///
/// Discovery fills `defined_values` and, for the issue type, a default in
/// `value`. The same shape comes back in a [`TicketRequest`] carrying the
/// user's values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub id: String,
    pub field_name: String,
    pub field_type: FieldType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub value: Option<Vec<String>>,
    #[serde(default)]
    pub defined_values: Vec<AllowedValue>,
}

impl FormField {
    pub fn values(&self) -> &[String] {
        self.value.as_deref().unwrap_or_default()
    }

    pub fn first_value(&self) -> Option<&str> {
        self.values().first().map(String::as_str)
    }

    pub fn has_value(&self) -> bool {
        !self.values().is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketRequest {
    pub fields: Vec<FormField>,
    /// Test item id to report URL.
    #[serde(default)]
    pub back_links: BTreeMap<String, String>,
}

impl TicketRequest {
    pub fn field(&self, id: &str) -> Option<&FormField> {
        self.fields
            .iter()
            .find(|field| field.id.eq_ignore_ascii_case(id))
    }
}
