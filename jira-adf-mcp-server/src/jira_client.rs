//! JIRA client wrapper around gouqi
//!
//! Issues and comments are fetched as raw JSON so that ADF rich-text fields
//! reach the codec untouched. Comment bodies are sent as serialized
//! [`AdfDocument`]s; descriptions are read and written as raw JSON so an
//! edit keeps everything JIRA stored.

use crate::adf::{AdfDocument, Content};
use crate::config::{DescriptionFormat, JiraConfig};
use crate::error::{JiraMcpError, JiraMcpResult};
use gouqi::r#async::Jira;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, error, info, instrument};

#[derive(Debug, Clone)]
pub struct JiraClient {
    client: Arc<Jira>,
    config: Arc<JiraConfig>,
}

/// Issue fields shown to the assistant, rich text already rendered
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueInfo {
    pub key: String,
    pub id: String,
    pub summary: String,
    pub description: Option<String>,
    pub issue_type: String,
    pub status: String,
    pub priority: Option<String>,
    pub assignee: Option<String>,
    pub reporter: Option<String>,
    pub created: String,
    pub updated: String,
    pub project_key: String,
    pub labels: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueDetails {
    pub issue_info: IssueInfo,
    pub comments: Option<Vec<CommentInfo>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentInfo {
    pub id: String,
    pub author: String,
    /// Rendered comment body
    pub body: String,
    pub created: String,
    pub updated: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub account_id: String,
    pub display_name: String,
    pub email_address: Option<String>,
    pub active: bool,
}

/// Key and id JIRA assigns to a newly created issue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatedIssue {
    pub key: String,
    pub id: String,
}

impl JiraClient {
    /// Create a client and verify the credentials against the instance
    #[instrument(skip_all)]
    pub async fn new(config: Arc<JiraConfig>) -> JiraMcpResult<Self> {
        info!("Initializing JIRA client for URL: {}", config.jira_url);

        let client = Jira::new(&config.jira_url, config.to_gouqi_credentials())
            .map_err(JiraMcpError::from)?;

        let jira_client = Self {
            client: Arc::new(client),
            config,
        };

        match jira_client.get_current_user().await {
            Ok(user) => info!("Connected to JIRA as {}", user.display_name),
            Err(e) => {
                error!("Connection test failed: {}", e);
                return Err(e);
            }
        }

        Ok(jira_client)
    }

    pub fn base_url(&self) -> &str {
        self.config.base_url()
    }

    /// Format used for rendered rich-text fields unless a tool overrides it
    pub fn description_format(&self) -> DescriptionFormat {
        self.config.description_format
    }

    /// Run a gouqi call under the configured request timeout
    async fn timed<T, F>(&self, operation: &str, call: F) -> JiraMcpResult<Result<T, gouqi::Error>>
    where
        F: Future<Output = Result<T, gouqi::Error>>,
    {
        timeout(
            Duration::from_secs(self.config.request_timeout_seconds),
            call,
        )
        .await
        .map_err(|_| JiraMcpError::network(format!("Timeout while {}", operation)))
    }

    #[instrument(skip_all)]
    pub async fn get_current_user(&self) -> JiraMcpResult<UserInfo> {
        debug!("Fetching current user information");

        let session = self
            .timed("getting current user", self.client.session())
            .await?
            .map_err(JiraMcpError::from)?;

        Ok(UserInfo {
            account_id: session.name.clone(),
            display_name: session.name,
            email_address: None,
            active: true,
        })
    }

    /// Raw issue JSON with all fields
    async fn fetch_issue(&self, issue_key: &str) -> JiraMcpResult<Value> {
        let endpoint = format!("/issue/{}", issue_key);
        let issue: Value = self
            .timed(
                &format!("getting issue {}", issue_key),
                self.client.get("api", &endpoint),
            )
            .await?
            .map_err(|e| JiraMcpError::from_jira_failure(e, issue_key))?;
        Ok(issue)
    }

    #[instrument(skip(self))]
    pub async fn get_issue_details(
        &self,
        issue_key: &str,
        include_comments: bool,
        format: DescriptionFormat,
    ) -> JiraMcpResult<IssueDetails> {
        debug!("Fetching issue details for: {}", issue_key);

        let issue = self.fetch_issue(issue_key).await?;
        let comments = include_comments.then(|| comments_from_json(&issue, format));

        Ok(IssueDetails {
            issue_info: issue_info_from_json(&issue, format),
            comments,
        })
    }

    /// Current description exactly as JIRA stores it, `Null` when unset
    #[instrument(skip(self))]
    pub async fn get_description(&self, issue_key: &str) -> JiraMcpResult<Value> {
        let mut issue = self.fetch_issue(issue_key).await?;
        Ok(issue
            .get_mut("fields")
            .and_then(|fields| fields.get_mut("description"))
            .map(Value::take)
            .unwrap_or(Value::Null))
    }

    /// Write a description document, given as ADF JSON
    #[instrument(skip(self, description))]
    pub async fn update_description(
        &self,
        issue_key: &str,
        description: Value,
    ) -> JiraMcpResult<()> {
        let mut fields = BTreeMap::new();
        fields.insert("description".to_string(), description);

        self.timed(
            &format!("updating description of {}", issue_key),
            self.client
                .issues()
                .edit(issue_key, gouqi::issues::EditIssue { fields }),
        )
        .await?
        .map_err(|e| JiraMcpError::from_jira_failure(e, issue_key))?;

        info!("Updated description for issue {}", issue_key);
        Ok(())
    }

    #[instrument(skip(self, body))]
    pub async fn add_comment(
        &self,
        issue_key: &str,
        body: &AdfDocument,
    ) -> JiraMcpResult<CommentInfo> {
        let endpoint = format!("/issue/{}/comment", issue_key);
        let payload = json!({ "body": body });

        let response: Value = self
            .timed(
                &format!("adding comment to {}", issue_key),
                self.client.post("api", &endpoint, payload),
            )
            .await?
            .map_err(|e| JiraMcpError::from_jira_failure(e, issue_key))?;

        info!("Added comment to issue {}", issue_key);
        Ok(comment_from_json(&response, self.description_format()))
    }

    /// Create an issue from a complete `fields` object
    #[instrument(skip_all)]
    pub async fn create_issue(&self, fields: Value) -> JiraMcpResult<CreatedIssue> {
        let response: Value = self
            .timed(
                "creating issue",
                self.client.post("api", "/issue", json!({ "fields": fields })),
            )
            .await?
            .map_err(classify_create_failure)?;

        let key = str_at(&response, "/key")
            .ok_or_else(|| JiraMcpError::internal("No issue key in create response"))?;
        let id = str_at(&response, "/id")
            .ok_or_else(|| JiraMcpError::internal("No issue id in create response"))?;

        info!("Created issue {}", key);
        Ok(CreatedIssue {
            key: key.to_string(),
            id: id.to_string(),
        })
    }
}

fn classify_create_failure(err: gouqi::Error) -> JiraMcpError {
    let message = err.to_string();
    if message.contains("project") {
        JiraMcpError::invalid_param("project_key", format!("JIRA rejected the project: {}", message))
    } else if message.contains("issue type") || message.contains("issuetype") {
        JiraMcpError::invalid_param("issue_type", format!("JIRA rejected the issue type: {}", message))
    } else {
        JiraMcpError::from(err)
    }
}

fn str_at<'a>(value: &'a Value, pointer: &str) -> Option<&'a str> {
    value.pointer(pointer).and_then(Value::as_str)
}

fn owned_at(value: &Value, pointer: &str) -> Option<String> {
    str_at(value, pointer).map(str::to_string)
}

/// Render a rich-text field, treating an empty rendering as absent
fn render_field(field: Option<&Value>, format: DescriptionFormat) -> Option<String> {
    let content = Content::from_value(field?.clone())?;
    let rendered = format.render(Some(&content));
    let rendered = rendered.trim_end();
    (!rendered.is_empty()).then(|| rendered.to_string())
}

/// Convert raw issue JSON into [`IssueInfo`]
pub fn issue_info_from_json(issue: &Value, format: DescriptionFormat) -> IssueInfo {
    let fields = issue.get("fields").unwrap_or(&Value::Null);

    IssueInfo {
        key: owned_at(issue, "/key").unwrap_or_default(),
        id: owned_at(issue, "/id").unwrap_or_default(),
        summary: owned_at(fields, "/summary").unwrap_or_default(),
        description: render_field(fields.get("description"), format),
        issue_type: owned_at(fields, "/issuetype/name").unwrap_or_default(),
        status: owned_at(fields, "/status/name").unwrap_or_default(),
        priority: owned_at(fields, "/priority/name"),
        assignee: owned_at(fields, "/assignee/displayName"),
        reporter: owned_at(fields, "/reporter/displayName"),
        created: owned_at(fields, "/created").unwrap_or_default(),
        updated: owned_at(fields, "/updated").unwrap_or_default(),
        project_key: owned_at(fields, "/project/key").unwrap_or_default(),
        labels: fields
            .get("labels")
            .and_then(Value::as_array)
            .map(|labels| {
                labels
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default(),
    }
}

/// Comments embedded in raw issue JSON (`fields.comment.comments`)
pub fn comments_from_json(issue: &Value, format: DescriptionFormat) -> Vec<CommentInfo> {
    issue
        .pointer("/fields/comment/comments")
        .and_then(Value::as_array)
        .map(|comments| {
            comments
                .iter()
                .map(|comment| comment_from_json(comment, format))
                .collect()
        })
        .unwrap_or_default()
}

pub fn comment_from_json(comment: &Value, format: DescriptionFormat) -> CommentInfo {
    CommentInfo {
        id: owned_at(comment, "/id").unwrap_or_default(),
        author: owned_at(comment, "/author/displayName").unwrap_or_else(|| "Unknown".to_string()),
        body: render_field(comment.get("body"), format).unwrap_or_default(),
        created: owned_at(comment, "/created").unwrap_or_default(),
        updated: owned_at(comment, "/updated").unwrap_or_default(),
    }
}
