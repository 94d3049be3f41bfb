//! Helpers for live integration tests against a real JIRA instance
//!
//! Tests using these helpers are `#[ignore]`d; run them with
//! `cargo test -- --ignored` after filling in `.env` (JIRA_URL,
//! JIRA_AUTH_TYPE and credentials, TEST_ISSUE_KEY).
use serde_json::{json, Value};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::atomic::{AtomicU64, Ordering};

static REQUEST_ID: AtomicU64 = AtomicU64::new(1);

const BINARY_CANDIDATES: [&str; 4] = [
    "target/debug/jira-adf-mcp-server",
    "target/release/jira-adf-mcp-server",
    "../target/debug/jira-adf-mcp-server",
    "../target/release/jira-adf-mcp-server",
];

const FORWARDED_ENV: [&str; 6] = [
    "JIRA_URL",
    "JIRA_AUTH_TYPE",
    "JIRA_TOKEN",
    "JIRA_USERNAME",
    "JIRA_PASSWORD",
    "JIRA_DESCRIPTION_FORMAT",
];

type TestResult<T> = Result<T, Box<dyn std::error::Error>>;

/// JSON-RPC client driving the server binary over STDIO
#[allow(dead_code)]
pub struct McpTestClient {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

#[allow(dead_code)]
impl McpTestClient {
    /// Spawn the server and perform the MCP handshake
    pub fn new() -> TestResult<Self> {
        dotenv::from_filename(".env").ok();

        let binary = BINARY_CANDIDATES
            .iter()
            .find(|path| Path::new(path).exists())
            .ok_or("Server binary not found, run `cargo build` first")?;

        let mut command = Command::new(binary);
        for var in FORWARDED_ENV {
            if let Ok(value) = std::env::var(var) {
                command.env(var, value);
            }
        }

        let mut child = command
            .env("RUST_LOG", "error")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()?;

        let stdin = child.stdin.take().ok_or("Failed to open server stdin")?;
        let stdout = child.stdout.take().ok_or("Failed to open server stdout")?;

        let mut client = Self {
            child,
            stdin,
            stdout: BufReader::new(stdout),
        };
        client.initialize()?;

        Ok(client)
    }

    fn initialize(&mut self) -> TestResult<()> {
        self.send(&json!({
            "jsonrpc": "2.0",
            "id": 0,
            "method": "initialize",
            "params": {
                "protocolVersion": "2024-11-05",
                "capabilities": {},
                "clientInfo": {"name": "adf-test-client", "version": "1.0.0"}
            }
        }))?;

        let response = self.read()?;
        if let Some(error) = response.get("error") {
            return Err(format!("Initialization failed: {}", error).into());
        }
        Ok(())
    }

    /// Call a tool and return the raw JSON-RPC response
    pub fn call_tool(&mut self, tool_name: &str, arguments: Value) -> TestResult<Value> {
        let id = REQUEST_ID.fetch_add(1, Ordering::SeqCst);
        self.send(&json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": "tools/call",
            "params": {"name": tool_name, "arguments": arguments}
        }))?;
        self.read()
    }

    fn send(&mut self, request: &Value) -> TestResult<()> {
        writeln!(self.stdin, "{}", serde_json::to_string(request)?)?;
        self.stdin.flush()?;
        Ok(())
    }

    fn read(&mut self) -> TestResult<Value> {
        let mut line = String::new();
        self.stdout.read_line(&mut line)?;
        if line.is_empty() {
            return Err("Server closed connection".into());
        }
        Ok(serde_json::from_str(&line)?)
    }

    /// Parse the JSON text content of a successful tool response
    pub fn extract_tool_result(response: &Value) -> Result<Value, String> {
        if let Some(error) = response.get("error") {
            return Err(format!("Tool call failed: {}", error));
        }

        let text = response
            .pointer("/result/content")
            .and_then(Value::as_array)
            .and_then(|content| {
                content
                    .iter()
                    .find(|item| item.get("type").and_then(Value::as_str) == Some("text"))
            })
            .and_then(|item| item.get("text"))
            .and_then(Value::as_str)
            .ok_or("No text content in tool result")?;

        serde_json::from_str(text)
            .map_err(|e| format!("Tool result is not JSON: {}. Text was: {}", e, text))
    }
}

impl Drop for McpTestClient {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Issue used by live tests, `TEST_ISSUE_KEY` or `SCRUM-1`
#[allow(dead_code)]
pub fn test_issue_key() -> String {
    std::env::var("TEST_ISSUE_KEY").unwrap_or_else(|_| "SCRUM-1".to_string())
}
