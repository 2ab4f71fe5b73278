use crate::domain::form::TicketRequest;

/// Produces the standard description block appended to every new issue.
pub trait DescriptionProvider: Send + Sync {
    fn render(&self, request: &TicketRequest) -> String;
}
