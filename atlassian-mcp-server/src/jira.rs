//! Jira REST operations
//!
//! A thin service layer over the gateway: each method maps one REST
//! endpoint, unwraps its envelope, and validates required inputs before
//! anything leaves the process.

use crate::cache::ProjectSummary;
use crate::config::ServiceCredentials;
use crate::error::{AtlassianMcpError, AtlassianMcpResult};
use crate::gateway::RestGateway;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tracing::{debug, instrument};

/// REST prefix used for every Jira call
const API_PREFIX: &str = "/rest/api/2";

/// Site suffixes recognized and stripped during normalization, most
/// specific first
const KNOWN_SUFFIXES: &[&str] = &["/rest/api/3", "/rest/api/2"];

/// A Jira issue with the field subset this server surfaces
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    pub id: String,
    pub key: String,
    #[serde(default)]
    pub fields: IssueFields,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IssueFields {
    pub summary: String,
    /// Plain text on server instances, an ADF document on cloud
    pub description: Option<Value>,
    pub status: StatusField,
    pub assignee: Option<AssigneeField>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusField {
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AssigneeField {
    pub display_name: String,
    pub account_id: String,
}

/// One workflow transition available for an issue
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub to: TransitionTarget,
}

/// Status an issue lands in after a transition
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TransitionTarget {
    pub id: String,
    pub name: String,
}

/// Parameters for a JQL search. Zero or empty members are omitted from the
/// request body so the remote defaults apply.
#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    pub jql: String,
    pub start_at: u32,
    pub max_results: u32,
    pub fields: Vec<String>,
    pub expand: Vec<String>,
}

/// One page of JQL search results
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchResult {
    pub total: u32,
    pub start_at: u32,
    pub max_results: u32,
    pub issues: Vec<Issue>,
}

/// The account the server is authenticated as
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CurrentUser {
    pub account_id: String,
    pub display_name: String,
    pub email_address: Option<String>,
}

/// Fields for creating a new issue.
///
/// `fields` carries raw field overrides and is merged last, so it can
/// override the named members.
#[derive(Debug, Clone, Default)]
pub struct IssueInput {
    pub project_key: String,
    pub summary: String,
    pub issue_type: String,
    pub description: Option<Value>,
    pub fields: Map<String, Value>,
}

/// Client for one Jira site
#[derive(Debug, Clone)]
pub struct JiraService {
    gateway: RestGateway,
}

impl JiraService {
    /// Build the service. Credential resolution and site normalization
    /// happen here, so a bad configuration fails before any tool runs.
    pub fn new(site: &str, creds: &ServiceCredentials) -> AtlassianMcpResult<Self> {
        let gateway = RestGateway::new("jira", site, API_PREFIX, KNOWN_SUFFIXES, creds)?;
        Ok(Self { gateway })
    }

    /// Normalized site root
    pub fn site(&self) -> &str {
        self.gateway.root()
    }

    /// Browsable link for an issue or project key
    pub fn browse_url(&self, key: &str) -> String {
        format!("{}/browse/{}", self.gateway.root(), key)
    }

    /// List projects visible to the configured account.
    ///
    /// A `max_results` of zero leaves the page size to the remote default.
    #[instrument(skip(self))]
    pub async fn list_projects(&self, max_results: u32) -> AtlassianMcpResult<Vec<ProjectSummary>> {
        #[derive(Deserialize)]
        struct ProjectPage {
            #[serde(default)]
            values: Vec<ProjectSummary>,
        }

        let mut query = vec![("expand", "lead".to_string())];
        if max_results > 0 {
            query.push(("maxResults", max_results.to_string()));
        }

        let page: ProjectPage = self.gateway.get(&["project/search"], &query).await?;
        debug!("Listed {} projects", page.values.len());
        Ok(page.values)
    }

    /// Execute a JQL search
    #[instrument(skip(self), fields(jql = request.jql.as_str()))]
    pub async fn search_issues(&self, request: &SearchRequest) -> AtlassianMcpResult<SearchResult> {
        let mut body = Map::new();
        body.insert("jql".to_string(), Value::String(request.jql.clone()));
        if request.start_at > 0 {
            body.insert("startAt".to_string(), json!(request.start_at));
        }
        if request.max_results > 0 {
            body.insert("maxResults".to_string(), json!(request.max_results));
        }
        if !request.fields.is_empty() {
            body.insert("fields".to_string(), serde_json::to_value(&request.fields)?);
        }
        if !request.expand.is_empty() {
            body.insert("expand".to_string(), serde_json::to_value(&request.expand)?);
        }

        self.gateway.post(&["search"], &Value::Object(body)).await
    }

    /// Create an issue and return its assigned id and key
    #[instrument(skip(self, input), fields(project_key = input.project_key.as_str()))]
    pub async fn create_issue(&self, input: IssueInput) -> AtlassianMcpResult<Issue> {
        if input.project_key.trim().is_empty() {
            return Err(AtlassianMcpError::invalid_param(
                "project_key",
                "Project key is required",
            ));
        }
        if input.summary.trim().is_empty() {
            return Err(AtlassianMcpError::invalid_param(
                "summary",
                "Summary is required",
            ));
        }
        if input.issue_type.trim().is_empty() {
            return Err(AtlassianMcpError::invalid_param(
                "issue_type",
                "Issue type is required",
            ));
        }

        let mut fields = Map::new();
        fields.insert("project".to_string(), json!({ "key": input.project_key }));
        fields.insert("summary".to_string(), Value::String(input.summary.clone()));
        fields.insert("issuetype".to_string(), json!({ "name": input.issue_type }));
        if let Some(description) = input.description {
            fields.insert("description".to_string(), description);
        }
        for (name, value) in input.fields {
            fields.insert(name, value);
        }

        let body = json!({ "fields": fields });
        self.gateway.post(&["issue"], &body).await
    }

    /// Update fields on an existing issue. The endpoint answers 204.
    #[instrument(skip(self, fields))]
    pub async fn update_issue(
        &self,
        key: &str,
        fields: Map<String, Value>,
    ) -> AtlassianMcpResult<()> {
        if key.trim().is_empty() {
            return Err(AtlassianMcpError::invalid_param(
                "issue_key",
                "Issue key is required",
            ));
        }
        if fields.is_empty() {
            return Err(AtlassianMcpError::invalid_param(
                "fields",
                "At least one field update is required",
            ));
        }

        let body = json!({ "fields": fields });
        self.gateway.put_unit(&["issue", key], &body).await
    }

    /// Add a comment. The body is plain text on server instances or an ADF
    /// document on cloud; it is passed through untouched.
    #[instrument(skip(self, body))]
    pub async fn add_comment(&self, key: &str, body: Value) -> AtlassianMcpResult<()> {
        if key.trim().is_empty() {
            return Err(AtlassianMcpError::invalid_param(
                "issue_key",
                "Issue key is required",
            ));
        }
        if body.is_null() {
            return Err(AtlassianMcpError::invalid_param(
                "body",
                "Comment body is required",
            ));
        }

        let payload = json!({ "body": body });
        self.gateway
            .post_unit(&["issue", key, "comment"], &payload)
            .await
    }

    /// List the workflow transitions currently available for an issue
    #[instrument(skip(self))]
    pub async fn list_transitions(&self, key: &str) -> AtlassianMcpResult<Vec<Transition>> {
        if key.trim().is_empty() {
            return Err(AtlassianMcpError::invalid_param(
                "issue_key",
                "Issue key is required",
            ));
        }

        #[derive(Deserialize)]
        struct TransitionPage {
            #[serde(default)]
            transitions: Vec<Transition>,
        }

        let query = vec![("expand", "transitions.fields".to_string())];
        let page: TransitionPage = self
            .gateway
            .get(&["issue", key, "transitions"], &query)
            .await?;
        Ok(page.transitions)
    }

    /// Move an issue through a workflow transition. The endpoint answers 204.
    #[instrument(skip(self, fields))]
    pub async fn transition_issue(
        &self,
        key: &str,
        transition_id: &str,
        fields: Map<String, Value>,
    ) -> AtlassianMcpResult<()> {
        if key.trim().is_empty() {
            return Err(AtlassianMcpError::invalid_param(
                "issue_key",
                "Issue key is required",
            ));
        }
        if transition_id.trim().is_empty() {
            return Err(AtlassianMcpError::invalid_param(
                "transition_id",
                "Transition id is required",
            ));
        }

        let mut body = Map::new();
        body.insert("transition".to_string(), json!({ "id": transition_id }));
        if !fields.is_empty() {
            body.insert("fields".to_string(), Value::Object(fields));
        }

        self.gateway
            .post_unit(&["issue", key, "transitions"], &Value::Object(body))
            .await
    }

    /// Upload an attachment to an issue
    #[instrument(skip(self, data), fields(size = data.len()))]
    pub async fn add_attachment(
        &self,
        key: &str,
        file_name: &str,
        data: Vec<u8>,
    ) -> AtlassianMcpResult<()> {
        if key.trim().is_empty() {
            return Err(AtlassianMcpError::invalid_param(
                "issue_key",
                "Issue key is required",
            ));
        }
        if file_name.trim().is_empty() {
            return Err(AtlassianMcpError::invalid_param(
                "file_name",
                "Attachment file name is required",
            ));
        }
        if data.is_empty() {
            return Err(AtlassianMcpError::invalid_param(
                "data",
                "Attachment data is required",
            ));
        }

        self.gateway
            .upload(&["issue", key, "attachments"], file_name, data)
            .await
    }

    /// Fetch the account the server is authenticated as
    #[instrument(skip(self))]
    pub async fn current_user(&self) -> AtlassianMcpResult<CurrentUser> {
        self.gateway.get(&["myself"], &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn service() -> JiraService {
        let creds = ServiceCredentials {
            oauth_token: "tok123".to_string(),
            ..Default::default()
        };
        JiraService::new("example.atlassian.net/rest/api/3", &creds).unwrap()
    }

    #[test]
    fn test_site_is_normalized() {
        assert_eq!(service().site(), "https://example.atlassian.net");
    }

    #[test]
    fn test_browse_url() {
        assert_eq!(
            service().browse_url("PROJ-1"),
            "https://example.atlassian.net/browse/PROJ-1"
        );
    }

    #[tokio::test]
    async fn test_create_issue_requires_fields() {
        let input = IssueInput {
            summary: "A bug".to_string(),
            issue_type: "Bug".to_string(),
            ..Default::default()
        };
        let err = service().create_issue(input).await.unwrap_err();
        assert_matches!(
            err,
            AtlassianMcpError::InvalidParameter { ref parameter, .. } if parameter == "project_key"
        );
    }

    #[tokio::test]
    async fn test_update_issue_requires_updates() {
        let err = service()
            .update_issue("PROJ-1", Map::new())
            .await
            .unwrap_err();
        assert_matches!(
            err,
            AtlassianMcpError::InvalidParameter { ref parameter, .. } if parameter == "fields"
        );
    }

    #[tokio::test]
    async fn test_add_comment_requires_body() {
        let err = service()
            .add_comment("PROJ-1", Value::Null)
            .await
            .unwrap_err();
        assert_matches!(err, AtlassianMcpError::InvalidParameter { .. });
    }

    #[tokio::test]
    async fn test_transition_requires_id() {
        let err = service()
            .transition_issue("PROJ-1", "  ", Map::new())
            .await
            .unwrap_err();
        assert_matches!(
            err,
            AtlassianMcpError::InvalidParameter { ref parameter, .. } if parameter == "transition_id"
        );
    }

    #[tokio::test]
    async fn test_attachment_requires_data() {
        let err = service()
            .add_attachment("PROJ-1", "log.txt", Vec::new())
            .await
            .unwrap_err();
        assert_matches!(
            err,
            AtlassianMcpError::InvalidParameter { ref parameter, .. } if parameter == "data"
        );
    }
}
