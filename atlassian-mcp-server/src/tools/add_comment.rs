//! Add comment tool

use crate::error::{AtlassianMcpError, AtlassianMcpResult};
use crate::jira::JiraService;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{info, instrument};

/// Maximum accepted length for a plain-text comment
const MAX_COMMENT_LENGTH: usize = 32_768;

/// Parameters for the add_comment tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AddCommentParams {
    /// Issue key to comment on (e.g., "PROJ-123")
    pub issue_key: String,

    /// Comment body: plain text or an ADF document
    pub body: Value,
}

/// Result from the add_comment tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddCommentResult {
    pub issue_key: String,
    pub message: String,
}

/// Implementation of the add_comment tool
pub struct AddCommentTool {
    jira: Arc<JiraService>,
}

impl AddCommentTool {
    pub fn new(jira: Arc<JiraService>) -> Self {
        Self { jira }
    }

    /// Execute the add_comment tool
    #[instrument(skip(self, params), fields(issue_key = params.issue_key.as_str()))]
    pub async fn execute(&self, params: AddCommentParams) -> AtlassianMcpResult<AddCommentResult> {
        self.validate_params(&params)?;

        let issue_key = params.issue_key.trim().to_string();
        self.jira.add_comment(&issue_key, params.body).await?;

        info!("Added comment to {}", issue_key);

        Ok(AddCommentResult {
            message: format!("Comment added to {}", issue_key),
            issue_key,
        })
    }

    fn validate_params(&self, params: &AddCommentParams) -> AtlassianMcpResult<()> {
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

        match &params.body {
            Value::Null => {
                return Err(AtlassianMcpError::invalid_param(
                    "body",
                    "Comment body must not be empty",
                ));
            }
            Value::String(text) => {
                if text.trim().is_empty() {
                    return Err(AtlassianMcpError::invalid_param(
                        "body",
                        "Comment body must not be empty",
                    ));
                }
                if text.len() > MAX_COMMENT_LENGTH {
                    return Err(AtlassianMcpError::invalid_param(
                        "body",
                        format!("Comment body cannot exceed {} characters", MAX_COMMENT_LENGTH),
                    ));
                }
            }
            _ => {}
        }

        Ok(())
    }
}
