use crate::adf::{self, AdfDocument, Content, DocumentNode};
use crate::error::{JiraMcpError, JiraMcpResult};
use crate::jira_client::JiraClient;
use crate::tools::normalize_issue_key;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, instrument};

/// Parameters for creating a new JIRA issue
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateIssueParams {
    /// Project key where the issue will be created (e.g., "PROJ", "DEV")
    /// Can be inferred from parent_issue_key if not provided
    #[serde(default)]
    pub project_key: Option<String>,

    /// Issue summary/title (required)
    pub summary: String,

    /// Issue description as plain text; blank lines separate paragraphs
    #[serde(default)]
    pub description: Option<String>,

    /// Issue type (default: "Task", or "Subtask" when a parent is given)
    #[serde(default)]
    pub issue_type: Option<String>,

    /// Priority name (e.g., "High", "Medium", "Low")
    #[serde(default)]
    pub priority: Option<String>,

    /// Account ID of the assignee, or "me" for the authenticated user
    #[serde(default)]
    pub assignee: Option<String>,

    #[serde(default)]
    pub labels: Vec<String>,

    /// Parent issue key for creating subtasks (e.g., "PROJ-123")
    #[serde(default)]
    pub parent_issue_key: Option<String>,

    /// Checklist items added to the description as a "Tasks" bullet list
    #[serde(default)]
    pub initial_todos: Vec<String>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct CreateIssueResult {
    pub issue_key: String,

    pub issue_id: String,

    /// Browse URL of the new issue
    pub issue_url: String,

    pub issue_type: String,

    pub project_key: String,

    pub message: String,
}

pub struct CreateIssueTool {
    jira_client: Arc<JiraClient>,
}

impl CreateIssueTool {
    pub fn new(jira_client: Arc<JiraClient>) -> Self {
        Self { jira_client }
    }

    #[instrument(skip(self), fields(summary = %params.summary))]
    pub async fn execute(&self, params: CreateIssueParams) -> JiraMcpResult<CreateIssueResult> {
        if params.summary.trim().is_empty() {
            return Err(JiraMcpError::invalid_param("summary", "Summary cannot be empty"));
        }

        let parent_key = params
            .parent_issue_key
            .as_deref()
            .map(normalize_issue_key)
            .transpose()?;

        let project_key = match (&params.project_key, &parent_key) {
            (Some(key), _) if !key.trim().is_empty() => key.trim().to_uppercase(),
            (_, Some(parent)) => parent
                .rsplit_once('-')
                .map(|(project, _)| project.to_string())
                .unwrap_or_default(),
            _ => {
                return Err(JiraMcpError::invalid_param(
                    "project_key",
                    "Either project_key or parent_issue_key must be provided",
                ))
            }
        };

        let issue_type = match (&params.issue_type, &parent_key) {
            (Some(issue_type), _) => issue_type.clone(),
            (None, Some(_)) => "Subtask".to_string(),
            (None, None) => "Task".to_string(),
        };

        let mut fields = json!({
            "project": { "key": project_key },
            "summary": params.summary.trim(),
            "issuetype": { "name": issue_type },
        });

        if let Some(description) =
            build_description(params.description.as_deref(), &params.initial_todos)
        {
            fields["description"] = serde_json::to_value(&description)?;
        }

        if let Some(priority) = &params.priority {
            fields["priority"] = json!({ "name": priority });
        }

        match params.assignee.as_deref() {
            Some("me") | Some("self") => {
                let user = self.jira_client.get_current_user().await?;
                fields["assignee"] = json!({ "accountId": user.account_id });
            }
            Some(account_id) => fields["assignee"] = json!({ "accountId": account_id }),
            None => {}
        }

        if !params.labels.is_empty() {
            fields["labels"] = json!(params.labels);
        }

        if let Some(parent) = &parent_key {
            fields["parent"] = json!({ "key": parent });
        }

        let created = self.jira_client.create_issue(fields).await?;
        let issue_url = format!("{}/browse/{}", self.jira_client.base_url(), created.key);

        info!("Created {} {} in {}", issue_type, created.key, project_key);

        Ok(CreateIssueResult {
            message: format!(
                "Created {} '{}' in project {}. View at: {}",
                issue_type.to_lowercase(),
                params.summary.trim(),
                project_key,
                issue_url
            ),
            issue_key: created.key,
            issue_id: created.id,
            issue_url,
            issue_type,
            project_key,
        })
    }
}

/// Description document from free text plus an optional checklist
pub fn build_description(text: Option<&str>, todos: &[String]) -> Option<AdfDocument> {
    let mut document = adf::ensure_document(text.map(Content::from));

    let items: Vec<DocumentNode> = todos
        .iter()
        .map(|todo| todo.trim())
        .filter(|todo| !todo.is_empty())
        .map(|todo| DocumentNode::ListItem {
            children: vec![DocumentNode::paragraph(todo)],
        })
        .collect();

    if !items.is_empty() {
        let checklist = [
            DocumentNode::Heading {
                level: 2,
                children: vec![DocumentNode::text("Tasks")],
            },
            DocumentNode::BulletList { items },
        ];
        document
            .get_or_insert_with(|| AdfDocument::new(Vec::new()))
            .content
            .extend(checklist);
    }

    document
}
