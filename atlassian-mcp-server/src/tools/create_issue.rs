//! Create issue tool

use crate::error::{AtlassianMcpError, AtlassianMcpResult};
use crate::jira::{IssueInput, JiraService};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{info, instrument};

/// Parameters for the create_issue tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CreateIssueParams {
    /// Project key the issue is created in (e.g., "PROJ")
    pub project_key: String,

    /// Issue type name (e.g., "Task", "Bug", "Story")
    pub issue_type: String,

    /// Issue summary line
    pub summary: String,

    /// Issue description (optional); plain text or an ADF document
    pub description: Option<Value>,

    /// Raw field overrides merged into the create payload (optional)
    /// Examples: {"labels": ["backend"], "priority": {"name": "High"}}
    pub fields: Option<Map<String, Value>>,
}

/// Result from the create_issue tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateIssueResult {
    pub key: String,
    pub id: String,
    /// Browsable link to the new issue
    pub url: String,
    pub message: String,
}

/// Implementation of the create_issue tool
pub struct CreateIssueTool {
    jira: Arc<JiraService>,
}

impl CreateIssueTool {
    pub fn new(jira: Arc<JiraService>) -> Self {
        Self { jira }
    }

    /// Execute the create_issue tool
    #[instrument(skip(self), fields(project_key = params.project_key.as_str()))]
    pub async fn execute(&self, params: CreateIssueParams) -> AtlassianMcpResult<CreateIssueResult> {
        self.validate_params(&params)?;

        let input = IssueInput {
            project_key: params.project_key.trim().to_string(),
            summary: params.summary.trim().to_string(),
            issue_type: params.issue_type.trim().to_string(),
            description: params.description,
            fields: params.fields.unwrap_or_default(),
        };

        let issue = self.jira.create_issue(input).await?;

        info!("Created issue {}", issue.key);

        Ok(CreateIssueResult {
            url: self.jira.browse_url(&issue.key),
            message: format!("Created issue {}", issue.key),
            key: issue.key,
            id: issue.id,
        })
    }

    fn validate_params(&self, params: &CreateIssueParams) -> AtlassianMcpResult<()> {
        if params.project_key.trim().is_empty() {
            return Err(AtlassianMcpError::invalid_param(
                "project_key",
                "project_key must not be empty",
            ));
        }
        if params.issue_type.trim().is_empty() {
            return Err(AtlassianMcpError::invalid_param(
                "issue_type",
                "issue_type must not be empty",
            ));
        }
        if params.summary.trim().is_empty() {
            return Err(AtlassianMcpError::invalid_param(
                "summary",
                "summary must not be empty",
            ));
        }
        Ok(())
    }
}
