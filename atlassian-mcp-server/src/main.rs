//! Atlassian MCP Server - Jira and Confluence integration via MCP
//!
//! This server exposes Jira issue tracking and Confluence wiki operations
//! as tools for AI agents over the STDIO transport.

use atlassian_mcp_server::AtlassianMcpServer;
use pulseengine_mcp_server::McpServerBuilder;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Configure logging for STDIO transport
    AtlassianMcpServer::configure_stdio_logging();

    info!("Starting Atlassian MCP Server...");

    // Create the Atlassian MCP server instance
    let atlassian_server = match AtlassianMcpServer::new() {
        Ok(server) => {
            info!("Atlassian MCP Server created successfully");
            server
        }
        Err(e) => {
            error!("Failed to create Atlassian MCP Server: {}", e);
            eprintln!("❌ Failed to start Atlassian MCP Server: {}", e);
            eprintln!("\nPlease check:");
            eprintln!("  - ATLASSIAN_SITE (or the per-service site variables) is set");
            eprintln!("  - Credentials are configured (ATLASSIAN_JIRA_OAUTH_TOKEN, or ATLASSIAN_JIRA_EMAIL plus ATLASSIAN_JIRA_API_TOKEN)");
            eprintln!("  - Any TOML file referenced by ATLASSIAN_MCP_CONFIG exists and parses");
            eprintln!("\nFor help, see the README.md file.");
            std::process::exit(1);
        }
    };

    info!("Starting MCP server with STDIO transport...");

    // Start the server using the macro-generated infrastructure
    let mut server = atlassian_server.serve_stdio().await?;

    info!("🚀 Atlassian MCP Server is running and ready to serve requests");

    server.run().await?;

    Ok(())
}
