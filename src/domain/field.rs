/// Tracker field ids that get dedicated handling instead of type-driven
/// conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnownField {
    Project,
    IssueType,
    Summary,
    Description,
    Priority,
    Components,
    AffectsVersions,
    FixVersions,
    Assignee,
    Reporter,
    Labels,
    Attachment,
    TimeTracking,
}

const KNOWN_FIELDS: &[(&str, KnownField)] = &[
    ("project", KnownField::Project),
    ("issuetype", KnownField::IssueType),
    ("summary", KnownField::Summary),
    ("description", KnownField::Description),
    ("priority", KnownField::Priority),
    ("components", KnownField::Components),
    ("versions", KnownField::AffectsVersions),
    ("fixversions", KnownField::FixVersions),
    ("assignee", KnownField::Assignee),
    ("reporter", KnownField::Reporter),
    ("labels", KnownField::Labels),
    ("attachment", KnownField::Attachment),
    ("timetracking", KnownField::TimeTracking),
];

/// Display names of fields the form never offers.
const EXCLUDED_FIELD_NAMES: &[&str] = &["Epic Link", "Sprint"];

impl KnownField {
    pub fn lookup(field_id: &str) -> Option<Self> {
        let normalized = field_id.trim().to_lowercase();
        KNOWN_FIELDS
            .iter()
            .find(|(id, _)| *id == normalized)
            .map(|(_, field)| *field)
    }

    pub fn id(self) -> &'static str {
        match self {
            KnownField::Project => "project",
            KnownField::IssueType => "issuetype",
            KnownField::Summary => "summary",
            KnownField::Description => "description",
            KnownField::Priority => "priority",
            KnownField::Components => "components",
            KnownField::AffectsVersions => "versions",
            KnownField::FixVersions => "fixVersions",
            KnownField::Assignee => "assignee",
            KnownField::Reporter => "reporter",
            KnownField::Labels => "labels",
            KnownField::Attachment => "attachment",
            KnownField::TimeTracking => "timetracking",
        }
    }
}

/// Project is fixed by the integration, attachments and time tracking are
/// not supported, epic links and sprints belong to the agile add-on.
pub fn is_excluded(field_id: &str, field_name: &str) -> bool {
    matches!(
        KnownField::lookup(field_id),
        Some(KnownField::Project | KnownField::Attachment | KnownField::TimeTracking)
    ) || EXCLUDED_FIELD_NAMES
        .iter()
        .any(|name| name.eq_ignore_ascii_case(field_name.trim()))
}
