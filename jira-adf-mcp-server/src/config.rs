//! Configuration for the JIRA ADF MCP Server
//!
//! Values come from a TOML file when one is present, then environment
//! variables override them, then the result is validated.

use crate::adf::{self, Content};
use anyhow::{Context, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;
use tracing::{debug, info, warn};

/// Config file locations, first match wins
const CONFIG_FILES: [&str; 2] = ["config/jira-adf-mcp.toml", "jira-adf-mcp.toml"];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JiraConfig {
    /// JIRA instance URL (required)
    pub jira_url: String,

    /// Authentication method
    pub auth: AuthConfig,

    /// Timeout for each JIRA request in seconds (default: 30)
    pub request_timeout_seconds: u64,

    /// How ADF descriptions and comments are shown to the assistant
    pub description_format: DescriptionFormat,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AuthConfig {
    /// Personal Access Token (recommended)
    PersonalAccessToken(String),

    /// Username + password or API token
    Basic { username: String, password: String },

    Bearer(String),

    /// Anonymous access (read-only on most instances)
    Anonymous,
}

/// Text rendering applied to ADF fields before they are returned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DescriptionFormat {
    /// Markdown with headings, lists, code fences and emphasis (default)
    #[default]
    Markdown,
    /// Text runs only, concatenated without separators
    PlainText,
}

impl DescriptionFormat {
    /// Parse the `JIRA_DESCRIPTION_FORMAT` spelling
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "markdown" | "md" => Some(DescriptionFormat::Markdown),
            "plain_text" | "plain" | "text" => Some(DescriptionFormat::PlainText),
            _ => None,
        }
    }

    pub fn render(self, content: Option<&Content>) -> String {
        match self {
            DescriptionFormat::Markdown => adf::render(content),
            DescriptionFormat::PlainText => adf::extract_plain_text(content),
        }
    }
}

impl Default for JiraConfig {
    fn default() -> Self {
        Self {
            jira_url: String::new(),
            auth: AuthConfig::Anonymous,
            request_timeout_seconds: 30,
            description_format: DescriptionFormat::Markdown,
        }
    }
}

impl JiraConfig {
    /// Load configuration. Priority: env vars > TOML file > defaults
    pub fn load() -> Result<Self> {
        let mut config = match CONFIG_FILES.iter().find(|path| Path::new(path).exists()) {
            Some(path) => {
                info!("Loading configuration from {}", path);
                Self::load_from_file(path)?
            }
            None => {
                debug!("No configuration file found, using defaults and environment");
                Self::default()
            }
        };

        config.load_from_env()?;
        config.validate()?;

        Ok(config)
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    fn load_from_env(&mut self) -> Result<()> {
        if let Ok(url) = env::var("JIRA_URL") {
            self.jira_url = url;
            debug!("Loaded JIRA_URL from environment");
        }

        if let Ok(auth_type) = env::var("JIRA_AUTH_TYPE") {
            match auth_type.to_lowercase().as_str() {
                "pat" | "personal_access_token" => {
                    let token =
                        env::var("JIRA_TOKEN").context("JIRA_TOKEN required for pat authentication")?;
                    self.auth = AuthConfig::PersonalAccessToken(token);
                }
                "basic" => {
                    let username = env::var("JIRA_USERNAME")
                        .context("JIRA_USERNAME required for basic authentication")?;
                    let password = env::var("JIRA_PASSWORD")
                        .context("JIRA_PASSWORD required for basic authentication")?;
                    self.auth = AuthConfig::Basic { username, password };
                }
                "bearer" => {
                    let token = env::var("JIRA_TOKEN")
                        .context("JIRA_TOKEN required for bearer authentication")?;
                    self.auth = AuthConfig::Bearer(token);
                }
                "anonymous" => self.auth = AuthConfig::Anonymous,
                other => warn!("Unknown JIRA_AUTH_TYPE '{}', keeping configured auth", other),
            }
            debug!("Configured {} authentication from environment", auth_type);
        }

        if let Ok(timeout) = env::var("JIRA_REQUEST_TIMEOUT") {
            match timeout.parse::<u64>() {
                Ok(seconds) => self.request_timeout_seconds = seconds,
                Err(_) => warn!("Ignoring non-numeric JIRA_REQUEST_TIMEOUT '{}'", timeout),
            }
        }

        if let Ok(format) = env::var("JIRA_DESCRIPTION_FORMAT") {
            match DescriptionFormat::parse(&format) {
                Some(parsed) => self.description_format = parsed,
                None => warn!("Unknown JIRA_DESCRIPTION_FORMAT '{}', using markdown", format),
            }
        }

        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.jira_url.is_empty() {
            anyhow::bail!(
                "JIRA URL is required. Set JIRA_URL or configure jira_url in jira-adf-mcp.toml."
            );
        }

        if !self.jira_url.starts_with("http://") && !self.jira_url.starts_with("https://") {
            anyhow::bail!(
                "JIRA URL must start with http:// or https://. Got: {}",
                self.jira_url
            );
        }

        match &self.auth {
            AuthConfig::PersonalAccessToken(token) | AuthConfig::Bearer(token) => {
                if token.is_empty() {
                    anyhow::bail!("Authentication token cannot be empty");
                }
            }
            AuthConfig::Basic { username, password } => {
                if username.is_empty() || password.is_empty() {
                    anyhow::bail!("Username and password cannot be empty for basic auth");
                }
            }
            AuthConfig::Anonymous => {
                info!("Using anonymous authentication, write tools will likely be rejected");
            }
        }

        if self.request_timeout_seconds == 0 {
            anyhow::bail!("request_timeout_seconds must be greater than 0");
        }

        Ok(())
    }

    /// Base URL without a trailing slash, for browse links
    pub fn base_url(&self) -> &str {
        self.jira_url.trim_end_matches('/')
    }

    pub fn to_gouqi_credentials(&self) -> gouqi::Credentials {
        match &self.auth {
            AuthConfig::PersonalAccessToken(token) | AuthConfig::Bearer(token) => {
                gouqi::Credentials::Bearer(token.clone())
            }
            AuthConfig::Basic { username, password } => {
                gouqi::Credentials::Basic(username.clone(), password.clone())
            }
            AuthConfig::Anonymous => gouqi::Credentials::Anonymous,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serial_test::serial;

    const ENV_VARS: [&str; 7] = [
        "JIRA_URL",
        "JIRA_AUTH_TYPE",
        "JIRA_TOKEN",
        "JIRA_USERNAME",
        "JIRA_PASSWORD",
        "JIRA_REQUEST_TIMEOUT",
        "JIRA_DESCRIPTION_FORMAT",
    ];

    fn clear_env() {
        for var in ENV_VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_default_config() {
        let config = JiraConfig::default();
        assert_eq!(config.request_timeout_seconds, 30);
        assert_eq!(config.description_format, DescriptionFormat::Markdown);
        assert_matches!(config.auth, AuthConfig::Anonymous);
    }

    #[test]
    #[serial]
    fn test_env_var_loading() {
        clear_env();
        env::set_var("JIRA_URL", "https://adf.atlassian.net/");
        env::set_var("JIRA_AUTH_TYPE", "basic");
        env::set_var("JIRA_USERNAME", "bot@example.com");
        env::set_var("JIRA_PASSWORD", "api-token");
        env::set_var("JIRA_REQUEST_TIMEOUT", "12");
        env::set_var("JIRA_DESCRIPTION_FORMAT", "plain");

        let mut config = JiraConfig::default();
        config.load_from_env().unwrap();
        clear_env();

        assert_eq!(config.base_url(), "https://adf.atlassian.net");
        assert_eq!(config.request_timeout_seconds, 12);
        assert_eq!(config.description_format, DescriptionFormat::PlainText);
        assert_matches!(config.auth, AuthConfig::Basic { ref username, .. } if username == "bot@example.com");
        assert!(config.validate().is_ok());
    }

    #[test]
    #[serial]
    fn test_pat_requires_token() {
        clear_env();
        env::set_var("JIRA_AUTH_TYPE", "pat");

        let mut config = JiraConfig::default();
        let result = config.load_from_env();
        clear_env();

        assert!(result.is_err());
    }

    #[test]
    fn test_validation_errors() {
        let mut config = JiraConfig::default();
        assert!(config.validate().is_err());

        config.jira_url = "adf.atlassian.net".to_string();
        assert!(config.validate().is_err());

        config.jira_url = "https://adf.atlassian.net".to_string();
        assert!(config.validate().is_ok());

        config.auth = AuthConfig::Bearer(String::new());
        assert!(config.validate().is_err());

        config.auth = AuthConfig::Anonymous;
        config.request_timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_partial_file() {
        let config: JiraConfig = toml::from_str(
            r#"
            jira_url = "https://adf.atlassian.net"
            description_format = "plain_text"

            [auth.Basic]
            username = "bot"
            password = "secret"
            "#,
        )
        .unwrap();

        assert_eq!(config.request_timeout_seconds, 30);
        assert_eq!(config.description_format, DescriptionFormat::PlainText);
        assert_matches!(config.auth, AuthConfig::Basic { .. });
    }

    #[test]
    fn test_malformed_toml_file_is_a_configuration_error() {
        let path = env::temp_dir().join("jira-adf-mcp-malformed.toml");
        std::fs::write(&path, "jira_url = \"https://adf.atlassian.net\"\ndescription_format = [\n").unwrap();

        let result = JiraConfig::load_from_file(&path);
        std::fs::remove_file(&path).ok();

        let err = crate::error::JiraMcpError::from(result.unwrap_err());
        assert_matches!(err, crate::error::JiraMcpError::Configuration { ref message }
            if message.contains("Failed to parse config file"));
    }

    #[test]
    fn test_description_format_rendering() {
        let content = Content::from_value(serde_json::json!({
            "type": "heading",
            "attrs": {"level": 1},
            "content": [{"type": "text", "text": "Title"}]
        }));

        assert_eq!(DescriptionFormat::Markdown.render(content.as_ref()), "# Title\n\n");
        assert_eq!(DescriptionFormat::PlainText.render(content.as_ref()), "Title");
        assert_eq!(DescriptionFormat::parse("MD"), Some(DescriptionFormat::Markdown));
        assert_eq!(DescriptionFormat::parse("html"), None);
    }
}
