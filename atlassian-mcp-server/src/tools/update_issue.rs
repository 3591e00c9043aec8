//! Update issue tool
//!
//! Convenience members for summary and description are merged with the raw
//! field map; the explicit members win on collision.

use crate::error::{AtlassianMcpError, AtlassianMcpResult};
use crate::jira::JiraService;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{info, instrument};

/// Parameters for the update_issue tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UpdateIssueParams {
    /// Issue key to update (e.g., "PROJ-123")
    pub issue_key: String,

    /// New summary (optional)
    pub summary: Option<String>,

    /// New description (optional); plain text or an ADF document
    pub description: Option<Value>,

    /// Raw field updates (optional)
    /// Examples: {"labels": ["backend"], "priority": {"name": "High"}}
    pub fields: Option<Map<String, Value>>,
}

/// Result from the update_issue tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateIssueResult {
    pub issue_key: String,
    pub updated_fields: Vec<String>,
    pub message: String,
}

/// Implementation of the update_issue tool
pub struct UpdateIssueTool {
    jira: Arc<JiraService>,
}

impl UpdateIssueTool {
    pub fn new(jira: Arc<JiraService>) -> Self {
        Self { jira }
    }

    /// Execute the update_issue tool
    #[instrument(skip(self), fields(issue_key = params.issue_key.as_str()))]
    pub async fn execute(&self, params: UpdateIssueParams) -> AtlassianMcpResult<UpdateIssueResult> {
        self.validate_params(&params)?;

        let mut updates = params.fields.unwrap_or_default();
        if let Some(summary) = params.summary {
            updates.insert("summary".to_string(), Value::String(summary));
        }
        if let Some(description) = params.description {
            updates.insert("description".to_string(), description);
        }

        if updates.is_empty() {
            return Err(AtlassianMcpError::invalid_param(
                "fields",
                "No updates provided; set summary, description, or fields",
            ));
        }

        let updated_fields: Vec<String> = updates.keys().cloned().collect();
        let issue_key = params.issue_key.trim().to_string();

        self.jira.update_issue(&issue_key, updates).await?;

        info!("Updated issue {}", issue_key);

        Ok(UpdateIssueResult {
            message: format!("Updated issue {}", issue_key),
            issue_key,
            updated_fields,
        })
    }

    fn validate_params(&self, params: &UpdateIssueParams) -> AtlassianMcpResult<()> {
        let issue_key = params.issue_key.trim();
        if issue_key.is_empty() {
            return Err(AtlassianMcpError::invalid_param(
                "issue_key",
                "issue_key must not be empty",
            ));
        }
        if !issue_key.contains('-') {
            return Err(AtlassianMcpError::invalid_param(
                "issue_key",
                "Issue key must be in format 'PROJECT-NUMBER' (e.g., 'PROJ-123')",
            ));
        }
        Ok(())
    }
}
