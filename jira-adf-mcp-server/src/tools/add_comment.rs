//! Add comment tool
//!
//! The comment text is normalized into an ADF document before it is posted,
//! one paragraph per blank-line separated block.

use crate::adf::{self, Content};
use crate::error::{JiraMcpError, JiraMcpResult};
use crate::jira_client::{CommentInfo, JiraClient};
use crate::tools::normalize_issue_key;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};

/// JIRA rejects comment bodies above this many characters
pub const MAX_COMMENT_LENGTH: usize = 32_768;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AddCommentParams {
    /// JIRA issue key (required)
    /// Examples: "PROJ-123", "KEY-456"
    pub issue_key: String,

    /// Comment text. Separate paragraphs with a blank line.
    pub comment_body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddCommentResult {
    /// The created comment, body rendered back from JIRA's response
    pub comment: CommentInfo,

    pub issue_key: String,

    /// Number of paragraphs sent
    pub paragraphs: usize,

    pub message: String,
}

pub struct AddCommentTool {
    jira_client: Arc<JiraClient>,
}

impl AddCommentTool {
    pub fn new(jira_client: Arc<JiraClient>) -> Self {
        Self { jira_client }
    }

    #[instrument(skip(self), fields(
        issue_key = params.issue_key.as_str(),
        comment_length = params.comment_body.len(),
    ))]
    pub async fn execute(&self, params: AddCommentParams) -> JiraMcpResult<AddCommentResult> {
        let issue_key = normalize_issue_key(&params.issue_key)?;
        validate_comment_body(&params.comment_body)?;

        let body = adf::ensure_document(Some(Content::Text(params.comment_body))).ok_or_else(
            || JiraMcpError::invalid_param("comment_body", "Comment body cannot be empty"),
        )?;
        let paragraphs = body.content.len();

        let comment = self.jira_client.add_comment(&issue_key, &body).await?;

        info!("Comment {} added to issue {}", comment.id, issue_key);

        Ok(AddCommentResult {
            comment,
            message: format!("Comment successfully added to issue {}", issue_key),
            issue_key,
            paragraphs,
        })
    }
}

fn validate_comment_body(body: &str) -> JiraMcpResult<()> {
    if body.trim().is_empty() {
        return Err(JiraMcpError::invalid_param(
            "comment_body",
            "Comment body cannot be empty",
        ));
    }

    if body.chars().count() > MAX_COMMENT_LENGTH {
        return Err(JiraMcpError::invalid_param(
            "comment_body",
            "Comment body cannot exceed 32,768 characters",
        ));
    }

    Ok(())
}
