use std::sync::Arc;

use crate::config::AppConfig;
use crate::services::{DescriptionProvider, IssueTrackerConnector};

#[derive(Clone)]
pub struct AppContext {
    pub config: AppConfig,
    pub connector: Arc<dyn IssueTrackerConnector>,
    pub description: Arc<dyn DescriptionProvider>,
}

impl AppContext {
    pub fn new(
        config: AppConfig,
        connector: Arc<dyn IssueTrackerConnector>,
        description: Arc<dyn DescriptionProvider>,
    ) -> Self {
        Self {
            config,
            connector,
            description,
        }
    }
}
