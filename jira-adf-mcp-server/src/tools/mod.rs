//! MCP tools for the JIRA ADF MCP Server
//!
//! Each tool validates its parameters, converts rich text through the
//! [`crate::adf`] codec and delegates the JIRA call to [`crate::jira_client`].

pub mod add_comment;
pub mod convert_document;
pub mod create_issue;
pub mod issue_details;
pub mod update_description;

pub use add_comment::*;
pub use convert_document::*;
pub use create_issue::*;
pub use issue_details::*;
pub use update_description::*;

use crate::error::{JiraMcpError, JiraMcpResult};

const MAX_ISSUE_KEY_LENGTH: usize = 100;

/// Validate a `PROJECT-NUMBER` issue key and return it trimmed and
/// upper-cased
pub fn normalize_issue_key(issue_key: &str) -> JiraMcpResult<String> {
    let key = issue_key.trim().to_uppercase();

    if key.is_empty() {
        return Err(JiraMcpError::invalid_param(
            "issue_key",
            "Issue key is required (e.g., 'PROJ-123')",
        ));
    }

    if key.len() > MAX_ISSUE_KEY_LENGTH {
        return Err(JiraMcpError::invalid_param(
            "issue_key",
            "Issue key cannot exceed 100 characters",
        ));
    }

    let Some((project, number)) = key.rsplit_once('-') else {
        return Err(JiraMcpError::invalid_param(
            "issue_key",
            "Issue key must follow PROJECT-NUMBER format (e.g., 'PROJ-123')",
        ));
    };

    let project_valid = project.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
        && project.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !project_valid {
        return Err(JiraMcpError::invalid_param(
            "issue_key",
            "Project part of issue key must start with a letter and contain only letters, digits or '_'",
        ));
    }

    if number.is_empty() || !number.chars().all(|c| c.is_ascii_digit()) {
        return Err(JiraMcpError::invalid_param(
            "issue_key",
            "Number part of issue key must contain only digits",
        ));
    }

    Ok(key)
}
