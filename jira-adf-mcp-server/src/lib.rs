//! JIRA ADF MCP Server Library
//!
//! An MCP server that lets AI assistants read and write JIRA issues without
//! dealing with Atlassian Document Format. Rich-text fields are rendered
//! from ADF into Markdown or plain text on the way out, and plain text is
//! built into ADF documents on the way in.
//!
//! ## Modules
//!
//! - [`adf`]: the document codec (render, extract text, build, normalize)
//! - [`jira_client`]: gouqi wrapper with timeouts and error mapping
//! - [`tools`]: MCP tool implementations
//! - [`config`], [`error`]: configuration and MCP error codes

use crate::config::JiraConfig;
use crate::error::JiraMcpResult;
use crate::jira_client::JiraClient;
use crate::tools::{
    AddCommentParams, AddCommentResult, AddCommentTool, ConvertDocumentParams,
    ConvertDocumentResult, ConvertDocumentTool, CreateIssueParams, CreateIssueResult,
    CreateIssueTool, GetIssueDetailsParams, GetIssueDetailsResult, GetIssueDetailsTool,
    UpdateDescriptionParams, UpdateDescriptionResult, UpdateDescriptionTool,
};

use pulseengine_mcp_macros::{mcp_server, mcp_tools};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, instrument};

pub mod adf;
pub mod config;
pub mod error;
pub mod jira_client;
pub mod tools;

const SERVER_NAME: &str = "JIRA ADF MCP Server";

/// Tools exposed by [`JiraAdfServer`]
pub const TOOL_NAMES: [&str; 7] = [
    "get_issue_details",
    "add_comment",
    "update_description",
    "create_issue",
    "convert_document",
    "get_server_status",
    "test_connection",
];

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JiraServerStatus {
    pub server_name: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub jira_url: String,
    pub jira_connection_status: String,
    pub authenticated_user: Option<String>,
    pub description_format: config::DescriptionFormat,
    pub tools_count: usize,
}

#[mcp_server(
    name = "JIRA ADF MCP Server",
    version = "0.1.0",
    description = "JIRA integration that converts Atlassian Document Format to and from Markdown",
    auth = "disabled"
)]
#[derive(Clone)]
pub struct JiraAdfServer {
    start_time: Instant,
    jira_client: Arc<JiraClient>,
    config: Arc<JiraConfig>,

    issue_details_tool: Arc<GetIssueDetailsTool>,
    add_comment_tool: Arc<AddCommentTool>,
    update_description_tool: Arc<UpdateDescriptionTool>,
    create_issue_tool: Arc<CreateIssueTool>,
    convert_document_tool: Arc<ConvertDocumentTool>,
}

impl Default for JiraAdfServer {
    fn default() -> Self {
        // The macro requires Default, but a server without a JIRA connection
        // is not usable.
        panic!("JiraAdfServer must be built with JiraAdfServer::new() or with_config()")
    }
}

impl JiraAdfServer {
    /// Build the server from configuration files and the environment
    #[instrument]
    pub async fn new() -> JiraMcpResult<Self> {
        info!("Initializing {}", SERVER_NAME);
        let config = JiraConfig::load()?;
        info!("Configuration loaded successfully");
        Self::with_config(config).await
    }

    /// Build the server from an explicit configuration
    #[instrument(skip(config))]
    pub async fn with_config(config: JiraConfig) -> JiraMcpResult<Self> {
        let config = Arc::new(config);
        let jira_client = Arc::new(JiraClient::new(Arc::clone(&config)).await?);

        info!("{} initialized", SERVER_NAME);

        Ok(Self {
            start_time: Instant::now(),
            issue_details_tool: Arc::new(GetIssueDetailsTool::new(Arc::clone(&jira_client))),
            add_comment_tool: Arc::new(AddCommentTool::new(Arc::clone(&jira_client))),
            update_description_tool: Arc::new(UpdateDescriptionTool::new(Arc::clone(
                &jira_client,
            ))),
            create_issue_tool: Arc::new(CreateIssueTool::new(Arc::clone(&jira_client))),
            convert_document_tool: Arc::new(ConvertDocumentTool::new()),
            jira_client,
            config,
        })
    }

    fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

/// Log a tool failure and hand it to the MCP layer
fn tool_error(tool: &str, err: error::JiraMcpError) -> anyhow::Error {
    error!(
        category = err.category(),
        code = err.error_code(),
        "{} failed: {}",
        tool,
        err
    );
    anyhow::anyhow!(err)
}

/// All public methods in this impl block become MCP tools
#[mcp_tools]
impl JiraAdfServer {
    /// Get a JIRA issue with its description rendered from ADF
    ///
    /// The description and, when requested, comment bodies are returned as
    /// Markdown (default) or plain text.
    ///
    /// # Examples
    /// - Basic issue info: `{"issue_key": "PROJ-123"}`
    /// - With comments as plain text: `{"issue_key": "PROJ-123", "include_comments": true, "format": "plain_text"}`
    #[instrument(skip(self))]
    pub async fn get_issue_details(
        &self,
        params: GetIssueDetailsParams,
    ) -> anyhow::Result<GetIssueDetailsResult> {
        self.issue_details_tool
            .execute(params)
            .await
            .map_err(|e| tool_error("get_issue_details", e))
    }

    /// Add a comment to a JIRA issue
    ///
    /// Plain text is converted to ADF; blank lines start new paragraphs.
    ///
    /// # Examples
    /// - `{"issue_key": "PROJ-123", "comment_body": "Fixed in build 42.\n\nPlease verify."}`
    #[instrument(skip(self))]
    pub async fn add_comment(&self, params: AddCommentParams) -> anyhow::Result<AddCommentResult> {
        self.add_comment_tool
            .execute(params)
            .await
            .map_err(|e| tool_error("add_comment", e))
    }

    /// Replace, append to, or prepend to an issue description
    ///
    /// Existing rich content is preserved when appending or prepending.
    ///
    /// # Examples
    /// - `{"issue_key": "PROJ-123", "content": "Root cause: stale cache", "mode": "append"}`
    /// - `{"issue_key": "PROJ-123", "content": "New description", "mode": "replace"}`
    #[instrument(skip(self))]
    pub async fn update_description(
        &self,
        params: UpdateDescriptionParams,
    ) -> anyhow::Result<UpdateDescriptionResult> {
        self.update_description_tool
            .execute(params)
            .await
            .map_err(|e| tool_error("update_description", e))
    }

    /// Create a JIRA issue with a plain-text description
    ///
    /// # Examples
    /// - `{"project_key": "PROJ", "summary": "Fix login", "description": "Steps to reproduce..."}`
    /// - `{"parent_issue_key": "PROJ-10", "summary": "Write docs", "initial_todos": ["Outline", "Draft"]}`
    #[instrument(skip(self))]
    pub async fn create_issue(
        &self,
        params: CreateIssueParams,
    ) -> anyhow::Result<CreateIssueResult> {
        self.create_issue_tool
            .execute(params)
            .await
            .map_err(|e| tool_error("create_issue", e))
    }

    /// Convert between ADF, Markdown and plain text without calling JIRA
    ///
    /// # Examples
    /// - Preview stored form: `{"input": "First\n\nSecond", "target": "adf"}`
    /// - Read a document: `{"input": {"type": "doc", "version": 1, "content": []}, "target": "markdown"}`
    #[instrument(skip(self))]
    pub async fn convert_document(
        &self,
        params: ConvertDocumentParams,
    ) -> anyhow::Result<ConvertDocumentResult> {
        self.convert_document_tool
            .execute(params)
            .map_err(|e| tool_error("convert_document", e))
    }

    /// Get server status and JIRA connection information
    #[instrument(skip(self))]
    pub async fn get_server_status(&self) -> anyhow::Result<JiraServerStatus> {
        let (connection_status, authenticated_user) =
            match self.jira_client.get_current_user().await {
                Ok(user) => ("Connected".to_string(), Some(user.display_name)),
                Err(e) => (format!("Connection Error: {}", e), None),
            };

        Ok(JiraServerStatus {
            server_name: SERVER_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: self.uptime_seconds(),
            jira_url: self.config.jira_url.clone(),
            jira_connection_status: connection_status,
            authenticated_user,
            description_format: self.config.description_format,
            tools_count: TOOL_NAMES.len(),
        })
    }

    /// Test the JIRA connection and authentication
    #[instrument(skip(self))]
    pub async fn test_connection(&self) -> anyhow::Result<String> {
        match self.jira_client.get_current_user().await {
            Ok(user) => {
                info!("Connection test successful for user: {}", user.display_name);
                Ok(format!(
                    "✅ Connection successful!\n\
                     JIRA URL: {}\n\
                     Authenticated as: {}",
                    self.config.jira_url, user.display_name
                ))
            }
            Err(e) => {
                error!("Connection test failed: {}", e);
                // Reported as a successful tool call so the assistant sees the hints
                Ok(format!(
                    "❌ Connection failed!\n\
                     JIRA URL: {}\n\
                     Error: {}\n\
                     \n\
                     Please check:\n\
                     - JIRA URL is correct and accessible\n\
                     - Authentication credentials are valid",
                    self.config.jira_url, e
                ))
            }
        }
    }
}
