//! Update description tool
//!
//! New text is built into ADF paragraphs. Append and prepend splice those
//! paragraphs into the stored description JSON at the block level, so
//! existing rich content (links, list numbering, tables, mentions) is
//! written back exactly as JIRA returned it.

use crate::adf::{self, AdfDocument, Content};
use crate::error::{JiraMcpError, JiraMcpResult};
use crate::jira_client::JiraClient;
use crate::tools::normalize_issue_key;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum UpdateMode {
    /// Replace the entire description
    Replace,
    /// Add content after the current description (default)
    #[default]
    Append,
    /// Add content before the current description
    Prepend,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UpdateDescriptionParams {
    /// The JIRA issue key (e.g., "PROJ-123")
    pub issue_key: String,

    /// Plain text to write. Separate paragraphs with a blank line.
    pub content: String,

    /// How to update the description: "replace", "append" (default), or "prepend"
    #[serde(default)]
    pub mode: UpdateMode,
}

#[derive(Debug, Serialize)]
pub struct UpdateDescriptionResult {
    pub success: bool,

    pub issue_key: String,

    pub mode: UpdateMode,

    /// Paragraphs contributed by `content`
    pub paragraphs_added: usize,

    /// The resulting description rendered as Markdown
    pub new_description: String,
}

pub struct UpdateDescriptionTool {
    jira_client: Arc<JiraClient>,
}

impl UpdateDescriptionTool {
    pub fn new(jira_client: Arc<JiraClient>) -> Self {
        Self { jira_client }
    }

    #[instrument(skip(self), fields(issue_key = %params.issue_key, mode = ?params.mode))]
    pub async fn execute(
        &self,
        params: UpdateDescriptionParams,
    ) -> JiraMcpResult<UpdateDescriptionResult> {
        let issue_key = normalize_issue_key(&params.issue_key)?;

        let addition = adf::text_to_tree(Some(&params.content)).ok_or_else(|| {
            JiraMcpError::invalid_param("content", "Description content cannot be empty")
        })?;
        let paragraphs_added = addition.content.len();

        let existing = match params.mode {
            UpdateMode::Replace => Value::Null,
            UpdateMode::Append | UpdateMode::Prepend => {
                debug!("Fetching current description for issue {}", issue_key);
                self.jira_client.get_description(&issue_key).await?
            }
        };

        let description = merge_descriptions(existing, addition, params.mode)?;
        let new_description = adf::render(Content::from_value(description.clone()).as_ref());
        let block_count = description["content"].as_array().map_or(0, Vec::len);

        self.jira_client
            .update_description(&issue_key, description)
            .await?;

        info!(
            "Updated description of {} ({} blocks total)",
            issue_key, block_count
        );

        Ok(UpdateDescriptionResult {
            success: true,
            new_description,
            issue_key,
            mode: params.mode,
            paragraphs_added,
        })
    }
}

/// Combine the stored description JSON with new blocks according to `mode`.
///
/// A stored document keeps its top-level fields and every existing block
/// verbatim. A legacy string becomes paragraphs first and a bare node is
/// wrapped, both without decoding the node itself.
pub fn merge_descriptions(
    existing: Value,
    addition: AdfDocument,
    mode: UpdateMode,
) -> JiraMcpResult<Value> {
    let mut document = match (mode, existing) {
        (UpdateMode::Replace, _) | (_, Value::Null) => return Ok(serde_json::to_value(&addition)?),
        (_, existing) if AdfDocument::is_document(&existing) => existing,
        (_, Value::String(text)) => match adf::text_to_tree(Some(&text)) {
            Some(legacy) => serde_json::to_value(&legacy)?,
            None => return Ok(serde_json::to_value(&addition)?),
        },
        (_, node @ Value::Object(_)) => serde_json::to_value(AdfDocument::new(Vec::new()))
            .map(|mut wrapper| {
                wrapper["content"] = json!([node]);
                wrapper
            })?,
        (_, _) => return Ok(serde_json::to_value(&addition)?),
    };

    let new_blocks = addition
        .content
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()?;

    if !document["content"].is_array() {
        document["content"] = json!([]);
    }
    if let Some(blocks) = document["content"].as_array_mut() {
        match mode {
            UpdateMode::Prepend => {
                blocks.splice(0..0, new_blocks);
            }
            _ => blocks.extend(new_blocks),
        }
    }

    Ok(document)
}
