//! List projects tool
//!
//! Returns the Jira projects visible to the configured account and
//! remembers the listing for the rest of the session.

use crate::cache::SessionCache;
use crate::error::{AtlassianMcpError, AtlassianMcpResult};
use crate::jira::JiraService;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};

/// Parameters for the list_projects tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ListProjectsParams {
    /// Maximum number of projects to return (optional, default: 50, max: 100)
    pub max_results: Option<u32>,
}

/// One project in the listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectEntry {
    pub id: String,
    pub key: String,
    pub name: String,
    /// Browsable link to the project
    pub url: String,
}

/// Result from the list_projects tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListProjectsResult {
    pub projects: Vec<ProjectEntry>,
    pub message: String,
}

/// Implementation of the list_projects tool
pub struct ListProjectsTool {
    jira: Arc<JiraService>,
    cache: Arc<SessionCache>,
}

impl ListProjectsTool {
    pub fn new(jira: Arc<JiraService>, cache: Arc<SessionCache>) -> Self {
        Self { jira, cache }
    }

    /// Execute the list_projects tool
    #[instrument(skip(self))]
    pub async fn execute(&self, params: ListProjectsParams) -> AtlassianMcpResult<ListProjectsResult> {
        self.validate_params(&params)?;

        let max_results = params.max_results.unwrap_or(50);
        let projects = self.jira.list_projects(max_results).await?;

        let entries: Vec<ProjectEntry> = projects
            .iter()
            .map(|project| ProjectEntry {
                id: project.id.clone(),
                key: project.key.clone(),
                name: project.name.clone(),
                url: self.jira.browse_url(&project.key),
            })
            .collect();

        // Remember the listing only once the call has succeeded
        self.cache.set_projects(&projects);

        info!("Listed {} projects", entries.len());

        Ok(ListProjectsResult {
            message: format!("Found {} Jira projects", entries.len()),
            projects: entries,
        })
    }

    fn validate_params(&self, params: &ListProjectsParams) -> AtlassianMcpResult<()> {
        if let Some(max_results) = params.max_results {
            if max_results == 0 {
                return Err(AtlassianMcpError::invalid_param(
                    "max_results",
                    "max_results must be greater than 0",
                ));
            }
            if max_results > 100 {
                return Err(AtlassianMcpError::invalid_param(
                    "max_results",
                    "max_results cannot exceed 100",
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServiceCredentials;

    fn tool() -> ListProjectsTool {
        let creds = ServiceCredentials {
            oauth_token: "tok".to_string(),
            ..Default::default()
        };
        let jira = Arc::new(JiraService::new("https://example.atlassian.net", &creds).unwrap());
        ListProjectsTool::new(jira, Arc::new(SessionCache::new()))
    }

    #[test]
    fn test_validate_max_results_bounds() {
        let tool = tool();

        assert!(tool
            .validate_params(&ListProjectsParams { max_results: None })
            .is_ok());
        assert!(tool
            .validate_params(&ListProjectsParams {
                max_results: Some(100)
            })
            .is_ok());
        assert!(tool
            .validate_params(&ListProjectsParams {
                max_results: Some(0)
            })
            .is_err());
        assert!(tool
            .validate_params(&ListProjectsParams {
                max_results: Some(101)
            })
            .is_err());
    }
}
