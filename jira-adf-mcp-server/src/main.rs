//! JIRA ADF MCP Server
//!
//! Serves JIRA issue tools over STDIO, converting Atlassian Document Format
//! to and from Markdown for the assistant.

use jira_adf_mcp_server::JiraAdfServer;
use pulseengine_mcp_server::McpServerBuilder;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // stdout carries JSON-RPC, logs go to stderr
    JiraAdfServer::configure_stdio_logging();

    info!("Starting JIRA ADF MCP Server...");

    let server = match JiraAdfServer::new().await {
        Ok(server) => server,
        Err(e) => {
            error!(category = e.category(), "Failed to create server: {}", e);
            eprintln!("❌ Failed to start JIRA ADF MCP Server: {}", e);
            eprintln!("\nPlease check:");
            eprintln!("  - JIRA_URL is set (or jira_url in jira-adf-mcp.toml)");
            eprintln!("  - JIRA_AUTH_TYPE and its credentials (JIRA_TOKEN or JIRA_USERNAME/JIRA_PASSWORD)");
            eprintln!("  - the JIRA instance is reachable");
            std::process::exit(1);
        }
    };

    let mut transport = server.serve_stdio().await?;

    info!("JIRA ADF MCP Server is ready on STDIO");

    transport.run().await?;

    Ok(())
}
