//! Page authoring tools
//!
//! Creating and updating pages share this module. Both take storage-format
//! bodies; updates additionally require the next version number, which the
//! remote uses to reject concurrent edits.

use crate::confluence::{ConfluenceService, PageInput};
use crate::error::{AtlassianMcpError, AtlassianMcpResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};

/// Result shared by the page authoring tools
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResult {
    pub id: String,
    pub title: String,
    pub version: u32,
    /// Browsable link to the page
    pub url: String,
    pub message: String,
}

/// Parameters for the create_page tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CreatePageParams {
    /// Space key the page is created in (e.g., "DEV")
    pub space_key: String,

    /// Page title
    pub title: String,

    /// Page body in storage format
    /// Examples: "<p>Hello</p>"
    pub body: String,

    /// Parent page id for a child page (optional)
    pub parent_id: Option<String>,
}

/// Implementation of the create_page tool
pub struct CreatePageTool {
    confluence: Arc<ConfluenceService>,
}

impl CreatePageTool {
    pub fn new(confluence: Arc<ConfluenceService>) -> Self {
        Self { confluence }
    }

    /// Execute the create_page tool
    #[instrument(skip(self, params), fields(
        space_key = params.space_key.as_str(),
        title = params.title.as_str(),
    ))]
    pub async fn execute(&self, params: CreatePageParams) -> AtlassianMcpResult<PageResult> {
        self.validate_params(&params)?;

        let input = PageInput {
            space_key: params.space_key.trim().to_string(),
            title: params.title.trim().to_string(),
            body: params.body,
            parent_id: params.parent_id.unwrap_or_default().trim().to_string(),
            version: 0,
        };

        let content = self.confluence.create_page(input).await?;

        info!("Created page {} ({})", content.title, content.id);

        Ok(PageResult {
            url: format!("{}/pages/{}", self.confluence.base_url(), content.id),
            message: format!("Created page '{}'", content.title),
            id: content.id,
            title: content.title,
            version: content.version,
        })
    }

    fn validate_params(&self, params: &CreatePageParams) -> AtlassianMcpResult<()> {
        if params.space_key.trim().is_empty() {
            return Err(AtlassianMcpError::invalid_param(
                "space_key",
                "space_key must not be empty",
            ));
        }
        if params.title.trim().is_empty() {
            return Err(AtlassianMcpError::invalid_param(
                "title",
                "title must not be empty",
            ));
        }
        if params.body.trim().is_empty() {
            return Err(AtlassianMcpError::invalid_param(
                "body",
                "body must not be empty",
            ));
        }
        Ok(())
    }
}

/// Parameters for the update_page tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UpdatePageParams {
    /// Id of the page to update
    pub page_id: String,

    /// New page title
    pub title: String,

    /// New page body in storage format
    pub body: String,

    /// Next version number; fetch the current one with search_pages first
    pub version: u32,

    /// Move the page to this space (optional)
    pub space_key: Option<String>,

    /// Re-parent the page under this id (optional)
    pub parent_id: Option<String>,
}

/// Implementation of the update_page tool
pub struct UpdatePageTool {
    confluence: Arc<ConfluenceService>,
}

impl UpdatePageTool {
    pub fn new(confluence: Arc<ConfluenceService>) -> Self {
        Self { confluence }
    }

    /// Execute the update_page tool
    #[instrument(skip(self, params), fields(
        page_id = params.page_id.as_str(),
        version = params.version,
    ))]
    pub async fn execute(&self, params: UpdatePageParams) -> AtlassianMcpResult<PageResult> {
        self.validate_params(&params)?;

        let page_id = params.page_id.trim().to_string();
        let input = PageInput {
            space_key: params.space_key.unwrap_or_default().trim().to_string(),
            title: params.title.trim().to_string(),
            body: params.body,
            parent_id: params.parent_id.unwrap_or_default().trim().to_string(),
            version: params.version,
        };

        let content = self.confluence.update_page(&page_id, input).await?;

        info!("Updated page {} to version {}", content.id, content.version);

        Ok(PageResult {
            url: format!("{}/pages/{}", self.confluence.base_url(), content.id),
            message: format!("Updated page '{}' to version {}", content.title, content.version),
            id: content.id,
            title: content.title,
            version: content.version,
        })
    }

    fn validate_params(&self, params: &UpdatePageParams) -> AtlassianMcpResult<()> {
        if params.page_id.trim().is_empty() {
            return Err(AtlassianMcpError::invalid_param(
                "page_id",
                "page_id must not be empty",
            ));
        }
        if params.title.trim().is_empty() {
            return Err(AtlassianMcpError::invalid_param(
                "title",
                "title must not be empty",
            ));
        }
        if params.body.trim().is_empty() {
            return Err(AtlassianMcpError::invalid_param(
                "body",
                "body must not be empty",
            ));
        }
        if params.version == 0 {
            return Err(AtlassianMcpError::invalid_param(
                "version",
                "version must be at least 1",
            ));
        }
        Ok(())
    }
}
