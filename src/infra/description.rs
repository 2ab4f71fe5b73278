use crate::domain::form::TicketRequest;
use crate::services::DescriptionProvider;

const BACK_LINK_PREFIX: &str = "Back link to Report Portal:";

/// Links every reported item back to its page in the reporting platform.
pub struct BackLinkDescription;

impl DescriptionProvider for BackLinkDescription {
    fn render(&self, request: &TicketRequest) -> String {
        request
            .back_links
            .values()
            .map(|url| format!("{BACK_LINK_PREFIX} {url}"))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
