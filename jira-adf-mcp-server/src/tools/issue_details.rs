//! Issue details tool
//!
//! Fetches one issue and returns its description (and optionally comments)
//! rendered from ADF into Markdown or plain text.

use crate::config::DescriptionFormat;
use crate::error::JiraMcpResult;
use crate::jira_client::{IssueDetails, JiraClient};
use crate::tools::normalize_issue_key;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};

/// Comment count above which the response is flagged as large
const LARGE_COMMENT_COUNT: usize = 500;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct GetIssueDetailsParams {
    /// JIRA issue key (required)
    /// Examples: "PROJ-123", "KEY-456"
    pub issue_key: String,

    /// Include comments in the response (optional, default: false)
    pub include_comments: Option<bool>,

    /// How to render the description and comments: "markdown" or
    /// "plain_text" (optional, defaults to the server configuration)
    pub format: Option<DescriptionFormat>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetIssueDetailsResult {
    pub issue_details: IssueDetails,

    /// Format the rich-text fields were rendered in
    pub format: DescriptionFormat,

    /// Time taken in milliseconds
    pub duration_ms: u64,
}

pub struct GetIssueDetailsTool {
    jira_client: Arc<JiraClient>,
}

impl GetIssueDetailsTool {
    pub fn new(jira_client: Arc<JiraClient>) -> Self {
        Self { jira_client }
    }

    #[instrument(skip(self), fields(
        issue_key = %params.issue_key,
        include_comments = params.include_comments.unwrap_or(false),
    ))]
    pub async fn execute(
        &self,
        params: GetIssueDetailsParams,
    ) -> JiraMcpResult<GetIssueDetailsResult> {
        let start_time = Instant::now();

        let issue_key = normalize_issue_key(&params.issue_key)?;
        let format = params
            .format
            .unwrap_or_else(|| self.jira_client.description_format());

        let issue_details = self
            .jira_client
            .get_issue_details(&issue_key, params.include_comments.unwrap_or(false), format)
            .await?;

        if issue_details.issue_info.summary.is_empty() {
            warn!("Issue {} came back without a summary", issue_key);
        }
        if let Some(comments) = &issue_details.comments {
            if comments.len() > LARGE_COMMENT_COUNT {
                warn!("Issue {} has {} comments, response may be large", issue_key, comments.len());
            }
        }

        let duration_ms = start_time.elapsed().as_millis() as u64;
        info!("Retrieved issue {} in {}ms", issue_key, duration_ms);

        Ok(GetIssueDetailsResult {
            issue_details,
            format,
            duration_ms,
        })
    }
}
