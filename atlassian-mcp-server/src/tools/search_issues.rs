//! Search issues tool
//!
//! Runs a caller-supplied JQL query and returns a flattened summary per
//! issue. The query string is remembered for the rest of the session.

use crate::cache::SessionCache;
use crate::error::{AtlassianMcpError, AtlassianMcpResult};
use crate::jira::{JiraService, SearchRequest};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument};

/// Parameters for the search_issues tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SearchIssuesParams {
    /// JQL query to execute
    /// Examples: "project = PROJ AND status = Open", "assignee = currentUser()"
    pub jql: String,

    /// Maximum results to return (optional, default: 50, max: 100)
    pub max_results: Option<u32>,

    /// Starting offset for pagination (optional, default: 0)
    pub start_at: Option<u32>,

    /// Issue fields to request (optional, remote default when omitted)
    pub fields: Option<Vec<String>>,
}

/// Flattened view of one matched issue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueSummary {
    pub id: String,
    pub key: String,
    pub summary: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,
    /// Browsable link to the issue
    pub url: String,
}

/// Result from the search_issues tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchIssuesResult {
    pub total: u32,
    pub start_at: u32,
    pub max_results: u32,
    pub issues: Vec<IssueSummary>,

    /// Time taken for the search in milliseconds
    pub execution_time_ms: u64,
}

/// Implementation of the search_issues tool
pub struct SearchIssuesTool {
    jira: Arc<JiraService>,
    cache: Arc<SessionCache>,
}

impl SearchIssuesTool {
    pub fn new(jira: Arc<JiraService>, cache: Arc<SessionCache>) -> Self {
        Self { jira, cache }
    }

    /// Execute the search_issues tool
    #[instrument(skip(self), fields(jql = params.jql.as_str()))]
    pub async fn execute(&self, params: SearchIssuesParams) -> AtlassianMcpResult<SearchIssuesResult> {
        let start_time = std::time::Instant::now();

        self.validate_params(&params)?;

        let request = SearchRequest {
            jql: params.jql.clone(),
            start_at: params.start_at.unwrap_or(0),
            max_results: params.max_results.unwrap_or(50),
            fields: params.fields.unwrap_or_default(),
            expand: Vec::new(),
        };

        let result = self.jira.search_issues(&request).await?;

        // Remember the query only once the search has succeeded
        self.cache.set_last_query(params.jql.trim());

        let issues: Vec<IssueSummary> = result
            .issues
            .iter()
            .map(|issue| IssueSummary {
                id: issue.id.clone(),
                key: issue.key.clone(),
                summary: issue.fields.summary.clone(),
                status: issue.fields.status.name.clone(),
                assignee: issue
                    .fields
                    .assignee
                    .as_ref()
                    .map(|assignee| assignee.display_name.clone())
                    .filter(|name| !name.is_empty()),
                description: issue.fields.description.clone(),
                url: self.jira.browse_url(&issue.key),
            })
            .collect();

        info!("Search matched {} of {} issues", issues.len(), result.total);

        Ok(SearchIssuesResult {
            total: result.total,
            start_at: result.start_at,
            max_results: result.max_results,
            issues,
            execution_time_ms: start_time.elapsed().as_millis() as u64,
        })
    }

    fn validate_params(&self, params: &SearchIssuesParams) -> AtlassianMcpResult<()> {
        if params.jql.trim().is_empty() {
            return Err(AtlassianMcpError::invalid_param(
                "jql",
                "JQL query must not be empty",
            ));
        }

        if let Some(max_results) = params.max_results {
            if max_results == 0 || max_results > 100 {
                return Err(AtlassianMcpError::invalid_param(
                    "max_results",
                    "max_results must be between 1 and 100",
                ));
            }
        }

        Ok(())
    }
}
