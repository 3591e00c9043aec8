//! Search pages tool
//!
//! Runs a caller-supplied CQL query over Confluence content.

use crate::confluence::ConfluenceService;
use crate::error::{AtlassianMcpError, AtlassianMcpResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};

/// Parameters for the search_pages tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchPagesParams {
    /// CQL query to execute
    /// Examples: "space = DEV and type = page", "title ~ 'runbook'"
    pub cql: String,

    /// Maximum results to return (optional, default: 25, max: 100)
    pub limit: Option<u32>,
}

/// Flattened view of one matched page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageSummary {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub content_type: String,
    pub status: String,
    pub version: u32,
    /// Browsable link to the page
    pub url: String,
}

/// Result from the search_pages tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchPagesResult {
    pub results: Vec<PageSummary>,
    pub message: String,

    /// Execution time in milliseconds
    pub execution_time_ms: u64,
}

/// Implementation of the search_pages tool
pub struct SearchPagesTool {
    confluence: Arc<ConfluenceService>,
}

impl SearchPagesTool {
    pub fn new(confluence: Arc<ConfluenceService>) -> Self {
        Self { confluence }
    }

    /// Execute the search_pages tool
    #[instrument(skip(self), fields(cql = params.cql.as_str()))]
    pub async fn execute(&self, params: SearchPagesParams) -> AtlassianMcpResult<SearchPagesResult> {
        let start_time = std::time::Instant::now();

        self.validate_params(&params)?;

        let results = self
            .confluence
            .search_content(params.cql.trim(), params.limit.unwrap_or(0))
            .await?;
        let base_url = self.confluence.base_url();

        let pages: Vec<PageSummary> = results
            .into_iter()
            .map(|content| PageSummary {
                url: format!("{}/pages/{}", base_url, content.id),
                id: content.id,
                title: content.title,
                content_type: content.content_type,
                status: content.status,
                version: content.version,
            })
            .collect();

        info!("CQL search matched {} pages", pages.len());

        Ok(SearchPagesResult {
            message: format!("Found {} matching pages", pages.len()),
            results: pages,
            execution_time_ms: start_time.elapsed().as_millis() as u64,
        })
    }

    fn validate_params(&self, params: &SearchPagesParams) -> AtlassianMcpResult<()> {
        if params.cql.trim().is_empty() {
            return Err(AtlassianMcpError::invalid_param(
                "cql",
                "CQL query must not be empty",
            ));
        }
        if let Some(limit) = params.limit {
            if limit == 0 || limit > 100 {
                return Err(AtlassianMcpError::invalid_param(
                    "limit",
                    "limit must be between 1 and 100",
                ));
            }
        }
        Ok(())
    }
}
