/// Common utilities for Atlassian MCP Server integration tests
///
/// Tests run against a local mock HTTP server, so they need no real
/// Atlassian instance and no environment variables.
use atlassian_mcp_server::config::ServiceCredentials;
use atlassian_mcp_server::confluence::ConfluenceService;
use atlassian_mcp_server::jira::JiraService;
use wiremock::MockServer;

/// Bearer token the mock expects: "Authorization: Bearer test-token"
#[allow(dead_code)]
pub const BEARER_HEADER: &str = "Bearer test-token";

/// Basic header for user@example.com + "secret"
#[allow(dead_code)]
pub const BASIC_HEADER: &str = "Basic dXNlckBleGFtcGxlLmNvbTpzZWNyZXQ=";

#[allow(dead_code)]
pub fn bearer_credentials() -> ServiceCredentials {
    ServiceCredentials {
        oauth_token: "test-token".to_string(),
        ..Default::default()
    }
}

#[allow(dead_code)]
pub fn basic_credentials() -> ServiceCredentials {
    ServiceCredentials {
        email: "user@example.com".to_string(),
        api_token: "secret".to_string(),
        ..Default::default()
    }
}

/// Jira client pointed at the mock server, bearer auth
#[allow(dead_code)]
pub fn jira_service(server: &MockServer) -> JiraService {
    JiraService::new(&server.uri(), &bearer_credentials()).expect("Failed to build Jira service")
}

/// Confluence client pointed at the mock server, bearer auth
#[allow(dead_code)]
pub fn confluence_service(server: &MockServer) -> ConfluenceService {
    ConfluenceService::new(&server.uri(), &bearer_credentials())
        .expect("Failed to build Confluence service")
}
