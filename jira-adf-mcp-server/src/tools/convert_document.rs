//! Document conversion tool
//!
//! Converts between ADF JSON, Markdown and plain text without contacting
//! JIRA, so an assistant can preview how text will be stored or read a
//! document it already holds.

use crate::adf::{self, AdfDocument, Content};
use crate::error::{JiraMcpError, JiraMcpResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, instrument};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ConvertTarget {
    /// Render to Markdown (default)
    #[default]
    Markdown,
    /// Concatenated text runs only
    PlainText,
    /// Normalize into a versioned ADF document
    Adf,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct ConvertDocumentParams {
    /// An ADF document or node (JSON object), or plain text (string)
    pub input: Value,

    /// Output representation: "markdown" (default), "plain_text" or "adf"
    #[serde(default)]
    pub target: ConvertTarget,
}

#[derive(Debug, Serialize)]
pub struct ConvertDocumentResult {
    pub target: ConvertTarget,

    /// A string for text targets, an ADF object (or null) for "adf"
    pub output: Value,

    /// Whether the input held no content
    pub is_empty: bool,
}

#[derive(Debug, Default)]
pub struct ConvertDocumentTool;

impl ConvertDocumentTool {
    pub fn new() -> Self {
        Self
    }

    #[instrument(skip_all, fields(target = ?params.target))]
    pub fn execute(&self, params: ConvertDocumentParams) -> JiraMcpResult<ConvertDocumentResult> {
        if !matches!(params.input, Value::Null | Value::String(_) | Value::Object(_)) {
            return Err(JiraMcpError::invalid_param(
                "input",
                "Input must be an ADF object, a string or null",
            ));
        }

        let output = match (params.target, params.input) {
            // JSON objects become ADF without being decoded, so attributes
            // and marks the renderer ignores are kept
            (ConvertTarget::Adf, document) if AdfDocument::is_document(&document) => document,
            (ConvertTarget::Adf, node @ Value::Object(_)) => {
                let mut wrapper = serde_json::to_value(AdfDocument::new(Vec::new()))?;
                wrapper["content"] = json!([node]);
                wrapper
            }
            (target, input) => {
                let content = Content::from_value(input);
                debug!("Converting {} input", content_kind(content.as_ref()));

                match target {
                    ConvertTarget::Markdown => Value::String(adf::render(content.as_ref())),
                    ConvertTarget::PlainText => {
                        Value::String(adf::extract_plain_text(content.as_ref()))
                    }
                    ConvertTarget::Adf => match adf::ensure_document(content) {
                        Some(document) => serde_json::to_value(&document)?,
                        None => Value::Null,
                    },
                }
            }
        };

        let is_empty = match &output {
            Value::String(text) => text.trim().is_empty(),
            Value::Null => true,
            _ => false,
        };

        Ok(ConvertDocumentResult {
            target: params.target,
            output,
            is_empty,
        })
    }
}

fn content_kind(content: Option<&Content>) -> &'static str {
    match content {
        None => "empty",
        Some(Content::Document(_)) => "document",
        Some(Content::Node(_)) => "node",
        Some(Content::Text(_)) => "text",
    }
}
