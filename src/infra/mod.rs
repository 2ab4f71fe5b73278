pub mod description;
pub mod jira;
