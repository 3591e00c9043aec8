//! List spaces tool

use crate::confluence::ConfluenceService;
use crate::error::{AtlassianMcpError, AtlassianMcpResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};

/// Parameters for the list_spaces tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ListSpacesParams {
    /// Maximum number of spaces to return (optional, default: 25, max: 100)
    pub limit: Option<u32>,
}

/// One space in the listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpaceEntry {
    pub id: String,
    pub key: String,
    pub name: String,
    /// Plain-text description, omitted when the space has none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Browsable link to the space
    pub url: String,
}

/// Result from the list_spaces tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListSpacesResult {
    pub spaces: Vec<SpaceEntry>,
    pub message: String,
}

/// Implementation of the list_spaces tool
pub struct ListSpacesTool {
    confluence: Arc<ConfluenceService>,
}

impl ListSpacesTool {
    pub fn new(confluence: Arc<ConfluenceService>) -> Self {
        Self { confluence }
    }

    /// Execute the list_spaces tool
    #[instrument(skip(self))]
    pub async fn execute(&self, params: ListSpacesParams) -> AtlassianMcpResult<ListSpacesResult> {
        self.validate_params(&params)?;

        let spaces = self.confluence.list_spaces(params.limit.unwrap_or(0)).await?;
        let base_url = self.confluence.base_url();

        let entries: Vec<SpaceEntry> = spaces
            .into_iter()
            .map(|space| {
                let description = space.description.trim().to_string();
                SpaceEntry {
                    url: format!("{}/spaces/{}", base_url, space.key),
                    id: space.id,
                    key: space.key,
                    name: space.name,
                    description: if description.is_empty() {
                        None
                    } else {
                        Some(description)
                    },
                }
            })
            .collect();

        info!("Listed {} spaces", entries.len());

        Ok(ListSpacesResult {
            message: format!("Found {} Confluence spaces", entries.len()),
            spaces: entries,
        })
    }

    fn validate_params(&self, params: &ListSpacesParams) -> AtlassianMcpResult<()> {
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
