//! Error types for the JIRA ADF MCP Server
//!
//! Every failure surfaced by a tool maps onto an MCP JSON-RPC error code.
//! The ADF codec itself never fails; these errors come from configuration,
//! parameter validation and the JIRA API.

use serde_json::{Map, Value};
use thiserror::Error;

/// Retry delay used when JIRA rate-limits without saying for how long
pub const DEFAULT_RETRY_AFTER_SECONDS: u64 = 60;

#[derive(Debug, Error)]
pub enum JiraMcpError {
    /// Configuration errors (-32001)
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Authentication failures (-32002)
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Network and timeout errors (-32003)
    #[error("Network error: {message}")]
    Network { message: String },

    /// Permission denied (-32004)
    #[error("Permission denied: {message}")]
    Permission { message: String },

    /// Missing resource (-32005)
    #[error("Not found: {resource} '{key}' not found")]
    NotFound { resource: String, key: String },

    /// Rejected tool parameter (-32006)
    #[error("Invalid parameter: {parameter} - {message}")]
    InvalidParameter { parameter: String, message: String },

    /// JIRA rate limit (-32007)
    #[error("Rate limit exceeded, retry after {retry_after} seconds")]
    RateLimit { retry_after: u64 },

    /// Anything else (-32603)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl JiraMcpError {
    /// MCP JSON-RPC error code
    pub fn error_code(&self) -> i32 {
        match self {
            JiraMcpError::Configuration { .. } => -32001,
            JiraMcpError::Authentication { .. } => -32002,
            JiraMcpError::Network { .. } => -32003,
            JiraMcpError::Permission { .. } => -32004,
            JiraMcpError::NotFound { .. } => -32005,
            JiraMcpError::InvalidParameter { .. } => -32006,
            JiraMcpError::RateLimit { .. } => -32007,
            JiraMcpError::Internal { .. } => -32603,
        }
    }

    /// Short category name used in logs and error data
    pub fn category(&self) -> &'static str {
        match self {
            JiraMcpError::Configuration { .. } => "configuration",
            JiraMcpError::Authentication { .. } => "authentication",
            JiraMcpError::Network { .. } => "network",
            JiraMcpError::Permission { .. } => "permission",
            JiraMcpError::NotFound { .. } => "not_found",
            JiraMcpError::InvalidParameter { .. } => "invalid_parameter",
            JiraMcpError::RateLimit { .. } => "rate_limit",
            JiraMcpError::Internal { .. } => "internal",
        }
    }

    /// Structured data attached to MCP error responses
    pub fn error_data(&self) -> Value {
        let mut data = Map::new();
        data.insert("category".to_string(), Value::from(self.category()));

        match self {
            JiraMcpError::RateLimit { retry_after } => {
                data.insert("retry_after".to_string(), Value::from(*retry_after));
            }
            JiraMcpError::NotFound { resource, key } => {
                data.insert("resource".to_string(), Value::from(resource.as_str()));
                data.insert("key".to_string(), Value::from(key.as_str()));
            }
            JiraMcpError::InvalidParameter { parameter, .. } => {
                data.insert("parameter".to_string(), Value::from(parameter.as_str()));
            }
            _ => {}
        }

        Value::Object(data)
    }

    pub fn config(message: impl Into<String>) -> Self {
        JiraMcpError::Configuration {
            message: message.into(),
        }
    }

    pub fn auth(message: impl Into<String>) -> Self {
        JiraMcpError::Authentication {
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        JiraMcpError::Network {
            message: message.into(),
        }
    }

    pub fn permission(message: impl Into<String>) -> Self {
        JiraMcpError::Permission {
            message: message.into(),
        }
    }

    pub fn not_found(resource: impl Into<String>, key: impl Into<String>) -> Self {
        JiraMcpError::NotFound {
            resource: resource.into(),
            key: key.into(),
        }
    }

    pub fn invalid_param(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        JiraMcpError::InvalidParameter {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    pub fn rate_limit(retry_after: u64) -> Self {
        JiraMcpError::RateLimit { retry_after }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        JiraMcpError::Internal {
            message: message.into(),
        }
    }

    /// Classify a failed JIRA call on `issue_key` by the status it reports
    pub fn from_jira_failure(err: gouqi::Error, issue_key: &str) -> Self {
        let message = err.to_string();

        if message.contains("404") || message.contains("Not Found") {
            JiraMcpError::not_found("issue", issue_key)
        } else if message.contains("403") || message.contains("Forbidden") {
            JiraMcpError::permission(format!("Access to issue {} was denied", issue_key))
        } else if message.contains("429") || message.to_lowercase().contains("rate limit") {
            JiraMcpError::rate_limit(
                extract_retry_after(&message).unwrap_or(DEFAULT_RETRY_AFTER_SECONDS),
            )
        } else {
            JiraMcpError::from(err)
        }
    }
}

impl From<gouqi::Error> for JiraMcpError {
    fn from(err: gouqi::Error) -> Self {
        match err {
            gouqi::Error::Http(_) => JiraMcpError::network(format!("HTTP error: {}", err)),
            gouqi::Error::IO(_) => JiraMcpError::network(format!("IO error: {}", err)),
            gouqi::Error::Serde(_) => {
                JiraMcpError::internal(format!("Unexpected JIRA response: {}", err))
            }
            gouqi::Error::Unauthorized => JiraMcpError::auth("JIRA rejected the credentials"),
            gouqi::Error::NotFound => JiraMcpError::not_found("resource", "unknown"),
            gouqi::Error::Fault { .. } => {
                JiraMcpError::internal(format!("JIRA API error: {}", err))
            }
            _ => JiraMcpError::internal(format!("JIRA client error: {}", err)),
        }
    }
}

impl From<serde_json::Error> for JiraMcpError {
    fn from(err: serde_json::Error) -> Self {
        JiraMcpError::internal(format!("JSON error: {}", err))
    }
}

/// Configuration loading reports through anyhow; classify by message
impl From<anyhow::Error> for JiraMcpError {
    fn from(err: anyhow::Error) -> Self {
        let message = format!("{:#}", err);
        let lower = message.to_lowercase();

        if lower.contains("unauthorized") || lower.contains("authentication") {
            JiraMcpError::auth(message)
        } else if lower.contains("forbidden") || lower.contains("permission") {
            JiraMcpError::permission(message)
        } else if lower.contains("timeout") || lower.contains("connection") {
            JiraMcpError::network(message)
        } else if lower.contains("rate limit") || lower.contains("429") {
            JiraMcpError::rate_limit(
                extract_retry_after(&message).unwrap_or(DEFAULT_RETRY_AFTER_SECONDS),
            )
        } else if lower.contains("config") || lower.contains("jira url") {
            JiraMcpError::config(message)
        } else {
            JiraMcpError::internal(message)
        }
    }
}

/// Seconds from a `retry-after` hint in an error message, if any
pub fn extract_retry_after(error_message: &str) -> Option<u64> {
    let lower = error_message.to_lowercase();
    let (_, hint) = lower.split_once("retry-after")?;
    hint.split(|c: char| !c.is_ascii_digit())
        .find(|digits| !digits.is_empty())
        .and_then(|digits| digits.parse().ok())
}

pub type JiraMcpResult<T> = Result<T, JiraMcpError>;

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_error_codes() {
        assert_eq!(JiraMcpError::config("x").error_code(), -32001);
        assert_eq!(JiraMcpError::auth("x").error_code(), -32002);
        assert_eq!(JiraMcpError::network("x").error_code(), -32003);
        assert_eq!(JiraMcpError::permission("x").error_code(), -32004);
        assert_eq!(JiraMcpError::not_found("issue", "ADF-1").error_code(), -32005);
        assert_eq!(
            JiraMcpError::invalid_param("issue_key", "empty").error_code(),
            -32006
        );
        assert_eq!(JiraMcpError::rate_limit(30).error_code(), -32007);
        assert_eq!(JiraMcpError::internal("x").error_code(), -32603);
    }

    #[test]
    fn test_error_data() {
        let data = JiraMcpError::rate_limit(120).error_data();
        assert_eq!(data["category"], "rate_limit");
        assert_eq!(data["retry_after"], 120);

        let data = JiraMcpError::not_found("issue", "ADF-7").error_data();
        assert_eq!(data["resource"], "issue");
        assert_eq!(data["key"], "ADF-7");

        let data = JiraMcpError::invalid_param("format", "unknown").error_data();
        assert_eq!(data["parameter"], "format");

        let data = JiraMcpError::internal("boom").error_data();
        assert_eq!(data, serde_json::json!({"category": "internal"}));
    }

    #[test]
    fn test_anyhow_classification() {
        let err: JiraMcpError = anyhow::anyhow!("JIRA URL is required").into();
        assert_matches!(err, JiraMcpError::Configuration { .. });

        let err: JiraMcpError = anyhow::anyhow!("connection reset").into();
        assert_matches!(err, JiraMcpError::Network { .. });

        let err: JiraMcpError = anyhow::anyhow!("429 rate limit, Retry-After: 15").into();
        assert_matches!(err, JiraMcpError::RateLimit { retry_after: 15 });
    }

    #[test]
    fn test_retry_after_extraction() {
        assert_eq!(extract_retry_after("rate limited, retry-after 60"), Some(60));
        assert_eq!(extract_retry_after("Retry-After: 5s"), Some(5));
        assert_eq!(extract_retry_after("retry-after soon"), None);
        assert_eq!(extract_retry_after("no hint at all"), None);
    }
}
