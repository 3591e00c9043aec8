//! Add attachment tool
//!
//! File content arrives base64 encoded, as MCP tool arguments are JSON and
//! cannot carry raw bytes.

use crate::error::{AtlassianMcpError, AtlassianMcpResult};
use crate::jira::JiraService;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};

/// Parameters for the add_attachment tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AddAttachmentParams {
    /// Issue key to attach to (e.g., "PROJ-123")
    pub issue_key: String,

    /// File name as it should appear on the issue (e.g., "error.log")
    pub file_name: String,

    /// Base64-encoded file content
    pub data: String,
}

/// Result from the add_attachment tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddAttachmentResult {
    pub issue_key: String,
    pub file_name: String,
    /// Decoded size of the uploaded file
    pub size_bytes: usize,
    pub message: String,
}

/// Implementation of the add_attachment tool
pub struct AddAttachmentTool {
    jira: Arc<JiraService>,
}

impl AddAttachmentTool {
    pub fn new(jira: Arc<JiraService>) -> Self {
        Self { jira }
    }

    /// Execute the add_attachment tool
    #[instrument(skip(self, params), fields(
        issue_key = params.issue_key.as_str(),
        file_name = params.file_name.as_str(),
    ))]
    pub async fn execute(
        &self,
        params: AddAttachmentParams,
    ) -> AtlassianMcpResult<AddAttachmentResult> {
        self.validate_params(&params)?;

        let data = STANDARD.decode(params.data.trim()).map_err(|e| {
            AtlassianMcpError::invalid_param("data", format!("Invalid base64 data: {}", e))
        })?;
        if data.is_empty() {
            return Err(AtlassianMcpError::invalid_param(
                "data",
                "Attachment data must not be empty",
            ));
        }

        let issue_key = params.issue_key.trim().to_string();
        let file_name = params.file_name.trim().to_string();
        let size_bytes = data.len();

        self.jira
            .add_attachment(&issue_key, &file_name, data)
            .await?;

        info!("Attached {} ({} bytes) to {}", file_name, size_bytes, issue_key);

        Ok(AddAttachmentResult {
            message: format!("Attached {} to {}", file_name, issue_key),
            issue_key,
            file_name,
            size_bytes,
        })
    }

    fn validate_params(&self, params: &AddAttachmentParams) -> AtlassianMcpResult<()> {
        let issue_key = params.issue_key.trim();
        if issue_key.is_empty() || !issue_key.contains('-') {
            return Err(AtlassianMcpError::invalid_param(
                "issue_key",
                "Issue key must be in format 'PROJECT-NUMBER' (e.g., 'PROJ-123')",
            ));
        }
        if params.file_name.trim().is_empty() {
            return Err(AtlassianMcpError::invalid_param(
                "file_name",
                "file_name must not be empty",
            ));
        }
        if params.data.trim().is_empty() {
            return Err(AtlassianMcpError::invalid_param(
                "data",
                "data must not be empty",
            ));
        }
        Ok(())
    }
}
