//! Workflow transition tools
//!
//! Two tools share this module: one lists the transitions currently
//! available for an issue, the other executes a transition by id.

use crate::error::{AtlassianMcpError, AtlassianMcpResult};
use crate::jira::JiraService;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{info, instrument};

fn validate_issue_key(issue_key: &str) -> AtlassianMcpResult<()> {
    let issue_key = issue_key.trim();
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

/// Parameters for the list_transitions tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ListTransitionsParams {
    /// Issue key to inspect (e.g., "PROJ-123")
    pub issue_key: String,
}

/// One available workflow transition
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TransitionEntry {
    /// Transition id, pass this to transition_issue
    pub id: String,
    /// Transition name shown in the workflow (e.g., "Start Progress")
    pub name: String,
    /// Status the issue lands in
    pub to_status: String,
    /// Id of the target status
    pub to_status_id: String,
}

/// Result from the list_transitions tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ListTransitionsResult {
    pub issue_key: String,
    pub transitions: Vec<TransitionEntry>,

    /// Execution time in milliseconds
    pub execution_time_ms: u64,
}

/// Implementation of the list_transitions tool
pub struct ListTransitionsTool {
    jira: Arc<JiraService>,
}

impl ListTransitionsTool {
    pub fn new(jira: Arc<JiraService>) -> Self {
        Self { jira }
    }

    /// Execute the list_transitions tool
    #[instrument(skip(self), fields(issue_key = params.issue_key.as_str()))]
    pub async fn execute(
        &self,
        params: ListTransitionsParams,
    ) -> AtlassianMcpResult<ListTransitionsResult> {
        let start_time = std::time::Instant::now();

        validate_issue_key(&params.issue_key)?;
        let issue_key = params.issue_key.trim().to_string();

        let transitions = self.jira.list_transitions(&issue_key).await?;

        let entries: Vec<TransitionEntry> = transitions
            .into_iter()
            .map(|transition| TransitionEntry {
                id: transition.id,
                name: transition.name,
                to_status: transition.to.name,
                to_status_id: transition.to.id,
            })
            .collect();

        info!("Found {} transitions for {}", entries.len(), issue_key);

        Ok(ListTransitionsResult {
            issue_key,
            transitions: entries,
            execution_time_ms: start_time.elapsed().as_millis() as u64,
        })
    }
}

/// Parameters for the transition_issue tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct TransitionIssueParams {
    /// Issue key to transition (e.g., "PROJ-123")
    pub issue_key: String,

    /// Transition id from list_transitions (e.g., "21")
    pub transition_id: String,

    /// Field updates applied together with the transition (optional)
    /// Examples: {"resolution": {"name": "Done"}}
    pub fields: Option<Map<String, Value>>,
}

/// Result from the transition_issue tool
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct TransitionIssueResult {
    pub success: bool,
    pub issue_key: String,
    pub transition_id: String,
    pub message: String,

    /// Execution time in milliseconds
    pub execution_time_ms: u64,
}

/// Implementation of the transition_issue tool
pub struct TransitionIssueTool {
    jira: Arc<JiraService>,
}

impl TransitionIssueTool {
    pub fn new(jira: Arc<JiraService>) -> Self {
        Self { jira }
    }

    /// Execute the transition_issue tool
    #[instrument(skip(self), fields(
        issue_key = params.issue_key.as_str(),
        transition_id = params.transition_id.as_str(),
    ))]
    pub async fn execute(
        &self,
        params: TransitionIssueParams,
    ) -> AtlassianMcpResult<TransitionIssueResult> {
        let start_time = std::time::Instant::now();

        validate_issue_key(&params.issue_key)?;
        if params.transition_id.trim().is_empty() {
            return Err(AtlassianMcpError::invalid_param(
                "transition_id",
                "transition_id must not be empty; call list_transitions to discover ids",
            ));
        }

        let issue_key = params.issue_key.trim().to_string();
        let transition_id = params.transition_id.trim().to_string();

        self.jira
            .transition_issue(&issue_key, &transition_id, params.fields.unwrap_or_default())
            .await?;

        info!("Transitioned {} via transition {}", issue_key, transition_id);

        Ok(TransitionIssueResult {
            success: true,
            message: format!("Issue {} transitioned", issue_key),
            issue_key,
            transition_id,
            execution_time_ms: start_time.elapsed().as_millis() as u64,
        })
    }
}
