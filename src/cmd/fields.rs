use crate::cmd::params::CommandParams;
use crate::context::AppContext;
use crate::domain::form::FormField;
use crate::error::AppResult;
use crate::workflow::discovery::load_form;

const ISSUE_TYPE_PARAM: &str = "issueType";
const PROJECT_PARAM: &str = "project";

pub async fn run(ctx: &AppContext, params: &CommandParams) -> AppResult<Vec<FormField>> {
    let issue_type = params.retrieve_str(ISSUE_TYPE_PARAM)?;
    load_form(ctx, params.optional_str(PROJECT_PARAM), issue_type).await
}
