pub mod description;
pub mod issue_tracker;

pub use description::DescriptionProvider;
pub use issue_tracker::{IssueTrackerConnector, IssueTrackerService};
