//! Atlassian MCP Server Library
//!
//! Exposes Jira and Confluence REST operations as tools over the Model
//! Context Protocol (MCP). One server process serves both products with a
//! shared session cache, so agents can list projects, search and mutate
//! issues, and author wiki pages through a single stdio endpoint.
//!
//! ## Features
//!
//! - **Jira Tools**: Projects, JQL search, issue create/update, comments,
//!   workflow transitions, attachments
//! - **Confluence Tools**: Spaces, CQL search, page create/update
//! - **Session Cache**: Remembers the last project listing and JQL query
//! - **Fail-Fast Auth**: Credential problems surface at startup, not on
//!   first use
//! - **Error Handling**: MCP-compliant error codes and messages

use crate::cache::SessionCache;
use crate::config::AtlassianConfig;
use crate::confluence::ConfluenceService;
use crate::error::AtlassianMcpResult;
use crate::jira::JiraService;
use crate::tools::{
    AddAttachmentParams, AddAttachmentResult, AddAttachmentTool, AddCommentParams,
    AddCommentResult, AddCommentTool, CreateIssueParams, CreateIssueResult, CreateIssueTool,
    CreatePageParams, CreatePageTool, ListProjectsParams, ListProjectsResult, ListProjectsTool,
    ListSpacesParams, ListSpacesResult, ListSpacesTool, ListTransitionsParams,
    ListTransitionsResult, ListTransitionsTool, PageResult, SearchIssuesParams,
    SearchIssuesResult, SearchIssuesTool, SearchPagesParams, SearchPagesResult, SearchPagesTool,
    TransitionIssueParams, TransitionIssueResult, TransitionIssueTool, UpdateIssueParams,
    UpdateIssueResult, UpdateIssueTool, UpdatePageParams, UpdatePageTool,
};

use pulseengine_mcp_macros::{mcp_server, mcp_tools};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info, instrument};

// Re-export modules for external use
pub mod auth;
pub mod cache;
pub mod config;
pub mod confluence;
pub mod error;
pub mod gateway;
pub mod jira;
pub mod site;
pub mod tools;

/// Server status information
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AtlassianServerStatus {
    pub server_name: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub jira_site: String,
    pub confluence_site: String,
    pub cached_projects: usize,
    pub has_cached_query: bool,
    pub tools_count: usize,
}

/// Atlassian MCP Server
///
/// Main server implementation wiring the Jira and Confluence services and
/// the session cache into MCP tools. Uses the #[mcp_server] macro for
/// automatic MCP infrastructure generation.
#[mcp_server(
    name = "Atlassian MCP Server",
    version = "0.1.0",
    description = "Atlassian integration server exposing Jira and Confluence tools",
    auth = "disabled" // Local stdio server, transport security comes from the host
)]
#[derive(Clone)]
pub struct AtlassianMcpServer {
    /// Server start time for uptime calculation
    start_time: Instant,

    /// Session cache shared by the listing and search tools
    cache: Arc<SessionCache>,

    /// Service clients
    jira: Arc<JiraService>,
    confluence: Arc<ConfluenceService>,

    /// Tool implementations
    list_projects_tool: Arc<ListProjectsTool>,
    search_issues_tool: Arc<SearchIssuesTool>,
    create_issue_tool: Arc<CreateIssueTool>,
    update_issue_tool: Arc<UpdateIssueTool>,
    add_comment_tool: Arc<AddCommentTool>,
    list_transitions_tool: Arc<ListTransitionsTool>,
    transition_issue_tool: Arc<TransitionIssueTool>,
    add_attachment_tool: Arc<AddAttachmentTool>,
    list_spaces_tool: Arc<ListSpacesTool>,
    search_pages_tool: Arc<SearchPagesTool>,
    create_page_tool: Arc<CreatePageTool>,
    update_page_tool: Arc<UpdatePageTool>,
}

impl Default for AtlassianMcpServer {
    fn default() -> Self {
        // The server carries live clients and cannot exist unconfigured
        panic!(
            "AtlassianMcpServer cannot be created with default(). Use AtlassianMcpServer::new() instead."
        )
    }
}

impl AtlassianMcpServer {
    /// Create a new Atlassian MCP Server from the ambient configuration
    #[instrument]
    pub fn new() -> AtlassianMcpResult<Self> {
        info!("Initializing Atlassian MCP Server");

        let config = AtlassianConfig::load()?;
        info!("Configuration loaded successfully");

        Self::with_config(config)
    }

    /// Create the server from an explicit configuration (for testing)
    #[instrument(skip(config))]
    pub fn with_config(config: AtlassianConfig) -> AtlassianMcpResult<Self> {
        let jira = Arc::new(JiraService::new(
            &config.jira.site,
            &config.jira.credentials,
        )?);
        let confluence = Arc::new(ConfluenceService::new(
            &config.confluence.site,
            &config.confluence.credentials,
        )?);
        info!(
            "Service clients ready (jira: {}, confluence: {})",
            jira.site(),
            confluence.site()
        );

        let cache = Arc::new(SessionCache::new());

        let list_projects_tool = Arc::new(ListProjectsTool::new(
            Arc::clone(&jira),
            Arc::clone(&cache),
        ));
        let search_issues_tool = Arc::new(SearchIssuesTool::new(
            Arc::clone(&jira),
            Arc::clone(&cache),
        ));
        let create_issue_tool = Arc::new(CreateIssueTool::new(Arc::clone(&jira)));
        let update_issue_tool = Arc::new(UpdateIssueTool::new(Arc::clone(&jira)));
        let add_comment_tool = Arc::new(AddCommentTool::new(Arc::clone(&jira)));
        let list_transitions_tool = Arc::new(ListTransitionsTool::new(Arc::clone(&jira)));
        let transition_issue_tool = Arc::new(TransitionIssueTool::new(Arc::clone(&jira)));
        let add_attachment_tool = Arc::new(AddAttachmentTool::new(Arc::clone(&jira)));
        let list_spaces_tool = Arc::new(ListSpacesTool::new(Arc::clone(&confluence)));
        let search_pages_tool = Arc::new(SearchPagesTool::new(Arc::clone(&confluence)));
        let create_page_tool = Arc::new(CreatePageTool::new(Arc::clone(&confluence)));
        let update_page_tool = Arc::new(UpdatePageTool::new(Arc::clone(&confluence)));

        info!("Atlassian MCP Server initialized successfully");

        Ok(Self {
            start_time: Instant::now(),
            cache,
            jira,
            confluence,
            list_projects_tool,
            search_issues_tool,
            create_issue_tool,
            update_issue_tool,
            add_comment_tool,
            list_transitions_tool,
            transition_issue_tool,
            add_attachment_tool,
            list_spaces_tool,
            search_pages_tool,
            create_page_tool,
            update_page_tool,
        })
    }

    /// Get server uptime in seconds
    fn get_uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

/// All public methods in this impl block become MCP tools automatically
/// The #[mcp_tools] macro discovers these methods and exposes them via MCP
#[mcp_tools]
impl AtlassianMcpServer {
    /// List Jira projects visible to the configured account
    ///
    /// Returns project ids, keys, names, and browse links. The listing is
    /// remembered for the rest of the session.
    ///
    /// # Examples
    /// - First page with defaults: `{}`
    /// - Larger page: `{"max_results": 100}`
    #[instrument(skip(self))]
    pub async fn jira_list_projects(
        &self,
        params: ListProjectsParams,
    ) -> anyhow::Result<ListProjectsResult> {
        self.list_projects_tool.execute(params).await.map_err(|e| {
            error!("jira_list_projects failed: {}", e);
            anyhow::anyhow!(e)
        })
    }

    /// Execute a JQL search and return matching issues
    ///
    /// # Examples
    /// - Open issues in a project: `{"jql": "project = PROJ AND status = Open"}`
    /// - My issues, paged: `{"jql": "assignee = currentUser()", "max_results": 10, "start_at": 20}`
    #[instrument(skip(self))]
    pub async fn jira_search_issues(
        &self,
        params: SearchIssuesParams,
    ) -> anyhow::Result<SearchIssuesResult> {
        self.search_issues_tool.execute(params).await.map_err(|e| {
            error!("jira_search_issues failed: {}", e);
            anyhow::anyhow!(e)
        })
    }

    /// Create a new Jira issue in the specified project
    ///
    /// # Examples
    /// - Minimal: `{"project_key": "PROJ", "issue_type": "Task", "summary": "Fix the build"}`
    /// - With extras: `{"project_key": "PROJ", "issue_type": "Bug", "summary": "Crash on save", "fields": {"labels": ["backend"]}}`
    #[instrument(skip(self))]
    pub async fn jira_create_issue(
        &self,
        params: CreateIssueParams,
    ) -> anyhow::Result<CreateIssueResult> {
        self.create_issue_tool.execute(params).await.map_err(|e| {
            error!("jira_create_issue failed: {}", e);
            anyhow::anyhow!(e)
        })
    }

    /// Update fields on an existing Jira issue
    #[instrument(skip(self))]
    pub async fn jira_update_issue(
        &self,
        params: UpdateIssueParams,
    ) -> anyhow::Result<UpdateIssueResult> {
        self.update_issue_tool.execute(params).await.map_err(|e| {
            error!("jira_update_issue failed: {}", e);
            anyhow::anyhow!(e)
        })
    }

    /// Add a comment to an existing Jira issue
    #[instrument(skip(self))]
    pub async fn jira_add_comment(
        &self,
        params: AddCommentParams,
    ) -> anyhow::Result<AddCommentResult> {
        self.add_comment_tool.execute(params).await.map_err(|e| {
            error!("jira_add_comment failed: {}", e);
            anyhow::anyhow!(e)
        })
    }

    /// List available workflow transitions for an issue
    #[instrument(skip(self))]
    pub async fn jira_list_transitions(
        &self,
        params: ListTransitionsParams,
    ) -> anyhow::Result<ListTransitionsResult> {
        self.list_transitions_tool
            .execute(params)
            .await
            .map_err(|e| {
                error!("jira_list_transitions failed: {}", e);
                anyhow::anyhow!(e)
            })
    }

    /// Move an issue using a workflow transition
    ///
    /// # Examples
    /// - `{"issue_key": "PROJ-123", "transition_id": "31"}`
    #[instrument(skip(self))]
    pub async fn jira_transition_issue(
        &self,
        params: TransitionIssueParams,
    ) -> anyhow::Result<TransitionIssueResult> {
        self.transition_issue_tool
            .execute(params)
            .await
            .map_err(|e| {
                error!("jira_transition_issue failed: {}", e);
                anyhow::anyhow!(e)
            })
    }

    /// Upload an attachment to a Jira issue (base64-encoded content)
    #[instrument(skip(self, params))]
    pub async fn jira_add_attachment(
        &self,
        params: AddAttachmentParams,
    ) -> anyhow::Result<AddAttachmentResult> {
        self.add_attachment_tool.execute(params).await.map_err(|e| {
            error!("jira_add_attachment failed: {}", e);
            anyhow::anyhow!(e)
        })
    }

    /// List Confluence spaces visible to the configured account
    #[instrument(skip(self))]
    pub async fn confluence_list_spaces(
        &self,
        params: ListSpacesParams,
    ) -> anyhow::Result<ListSpacesResult> {
        self.list_spaces_tool.execute(params).await.map_err(|e| {
            error!("confluence_list_spaces failed: {}", e);
            anyhow::anyhow!(e)
        })
    }

    /// Search Confluence content with a CQL query
    ///
    /// # Examples
    /// - Pages in a space: `{"cql": "space = DEV and type = page"}`
    /// - By title: `{"cql": "title ~ 'runbook'", "limit": 10}`
    #[instrument(skip(self))]
    pub async fn confluence_search_pages(
        &self,
        params: SearchPagesParams,
    ) -> anyhow::Result<SearchPagesResult> {
        self.search_pages_tool.execute(params).await.map_err(|e| {
            error!("confluence_search_pages failed: {}", e);
            anyhow::anyhow!(e)
        })
    }

    /// Create a new Confluence page
    ///
    /// # Examples
    /// - `{"space_key": "DEV", "title": "Runbook", "body": "<p>Steps</p>"}`
    #[instrument(skip(self, params))]
    pub async fn confluence_create_page(
        &self,
        params: CreatePageParams,
    ) -> anyhow::Result<PageResult> {
        self.create_page_tool.execute(params).await.map_err(|e| {
            error!("confluence_create_page failed: {}", e);
            anyhow::anyhow!(e)
        })
    }

    /// Update an existing Confluence page to a new version
    #[instrument(skip(self, params))]
    pub async fn confluence_update_page(
        &self,
        params: UpdatePageParams,
    ) -> anyhow::Result<PageResult> {
        self.update_page_tool.execute(params).await.map_err(|e| {
            error!("confluence_update_page failed: {}", e);
            anyhow::anyhow!(e)
        })
    }

    /// Get server status and session cache information
    ///
    /// Cheap and purely local; never contacts the remote instances.
    #[instrument(skip(self))]
    pub async fn get_server_status(&self) -> anyhow::Result<AtlassianServerStatus> {
        info!("Getting server status");

        Ok(AtlassianServerStatus {
            server_name: "Atlassian MCP Server".to_string(),
            version: "0.1.0".to_string(),
            uptime_seconds: self.get_uptime_seconds(),
            jira_site: self.jira.site().to_string(),
            confluence_site: self.confluence.site().to_string(),
            cached_projects: self.cache.projects().len(),
            has_cached_query: !self.cache.last_query().is_empty(),
            tools_count: 14,
        })
    }

    /// Test connectivity and authentication against the Jira instance
    #[instrument(skip(self))]
    pub async fn test_connection(&self) -> anyhow::Result<String> {
        info!("Testing Jira connection");

        match self.jira.current_user().await {
            Ok(user) => {
                let message = format!(
                    "✅ Connection successful!\n\
                     Site: {}\n\
                     Authenticated as: {}\n\
                     Account ID: {}\n\
                     Email: {}",
                    self.jira.site(),
                    user.display_name,
                    user.account_id,
                    user.email_address.as_deref().unwrap_or("Not provided")
                );
                info!("Connection test successful for user: {}", user.display_name);
                Ok(message)
            }
            Err(e) => {
                let message = format!(
                    "❌ Connection failed!\n\
                     Site: {}\n\
                     Error: {}\n\
                     \n\
                     Please check:\n\
                     - The site address is correct and reachable\n\
                     - The configured credentials are valid\n\
                     - Network connectivity to the instance",
                    self.jira.site(),
                    e
                );
                error!("Connection test failed: {}", e);
                Ok(message) // Return as success with error message for user feedback
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ServiceConfig, ServiceCredentials};

    fn test_config() -> AtlassianConfig {
        AtlassianConfig {
            site: String::new(),
            jira: ServiceConfig {
                site: "https://example.atlassian.net".to_string(),
                credentials: ServiceCredentials {
                    oauth_token: "tok".to_string(),
                    ..Default::default()
                },
            },
            confluence: ServiceConfig {
                site: "https://example.atlassian.net/wiki".to_string(),
                credentials: ServiceCredentials {
                    email: "user@example.com".to_string(),
                    api_token: "secret".to_string(),
                    ..Default::default()
                },
            },
        }
    }

    #[test]
    fn test_server_creation_with_empty_config_fails() {
        assert!(AtlassianMcpServer::with_config(AtlassianConfig::default()).is_err());
    }

    #[tokio::test]
    async fn test_server_status_is_local_only() {
        let server = AtlassianMcpServer::with_config(test_config()).unwrap();
        let status = server.get_server_status().await.unwrap();

        assert_eq!(status.server_name, "Atlassian MCP Server");
        assert_eq!(status.jira_site, "https://example.atlassian.net");
        assert_eq!(status.confluence_site, "https://example.atlassian.net");
        assert_eq!(status.cached_projects, 0);
        assert!(!status.has_cached_query);
        assert_eq!(status.tools_count, 14);
    }

    #[test]
    fn test_uptime_calculation() {
        let server = AtlassianMcpServer::with_config(test_config()).unwrap();
        assert!(server.get_uptime_seconds() < 10);
    }
}
