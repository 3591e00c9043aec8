//! Confluence REST operations
//!
//! Mirrors the Jira service layer: one method per endpoint, envelope
//! unwrapping, and input validation up front. Wire shapes are simplified
//! before they leave this module; tools never see the nested REST forms.

use crate::config::ServiceCredentials;
use crate::error::{AtlassianMcpError, AtlassianMcpResult};
use crate::gateway::RestGateway;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, instrument};

/// REST prefix used for every Confluence call
const API_PREFIX: &str = "/wiki/rest/api";

/// Site suffixes recognized and stripped during normalization, most
/// specific first
const KNOWN_SUFFIXES: &[&str] = &["/wiki/rest/api", "/rest/api", "/wiki"];

/// Default page size when a caller does not pick one
const DEFAULT_LIMIT: u32 = 25;

/// A Confluence space summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Space {
    pub id: String,
    pub key: String,
    pub name: String,
    /// Plain-text space description, empty when none is set
    pub description: String,
}

/// A piece of Confluence content, usually a page
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Content {
    pub id: String,
    /// Content kind as reported by the API, e.g. "page" or "blogpost"
    pub content_type: String,
    pub status: String,
    pub title: String,
    pub version: u32,
    /// Storage-format body, empty when the caller did not expand it
    pub body: String,
}

/// Fields for creating or updating a page
#[derive(Debug, Clone, Default)]
pub struct PageInput {
    pub space_key: String,
    pub title: String,
    /// Page body in storage format
    pub body: String,
    /// Parent page id, empty for a top-level page
    pub parent_id: String,
    /// Target version number, used only by updates
    pub version: u32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSpace {
    id: Value,
    key: String,
    name: String,
    description: RawDescription,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawDescription {
    plain: RawPlain,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawPlain {
    value: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawContent {
    id: Value,
    #[serde(rename = "type")]
    content_type: String,
    status: String,
    title: String,
    version: RawVersion,
    body: RawBody,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawVersion {
    number: u32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawBody {
    storage: RawStorage,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawStorage {
    value: String,
}

/// Ids arrive as strings for content but as bare numbers for spaces
fn id_string(id: &Value) -> String {
    match id {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn simplify_space(raw: RawSpace) -> Space {
    Space {
        id: id_string(&raw.id),
        key: raw.key,
        name: raw.name,
        description: raw.description.plain.value,
    }
}

fn simplify_content(raw: RawContent) -> Content {
    Content {
        id: id_string(&raw.id),
        content_type: raw.content_type,
        status: raw.status,
        title: raw.title,
        version: raw.version.number,
        body: raw.body.storage.value,
    }
}

/// Client for one Confluence site
#[derive(Debug, Clone)]
pub struct ConfluenceService {
    gateway: RestGateway,
}

impl ConfluenceService {
    /// Build the service. Credential resolution and site normalization
    /// happen here, so a bad configuration fails before any tool runs.
    pub fn new(site: &str, creds: &ServiceCredentials) -> AtlassianMcpResult<Self> {
        let gateway = RestGateway::new("confluence", site, API_PREFIX, KNOWN_SUFFIXES, creds)?;
        Ok(Self { gateway })
    }

    /// Normalized site root
    pub fn site(&self) -> &str {
        self.gateway.root()
    }

    /// Root for browsable links, which live under the wiki context path
    pub fn base_url(&self) -> String {
        format!("{}/wiki", self.gateway.root())
    }

    /// List spaces visible to the configured account
    #[instrument(skip(self))]
    pub async fn list_spaces(&self, limit: u32) -> AtlassianMcpResult<Vec<Space>> {
        #[derive(Default, Deserialize)]
        #[serde(default)]
        struct SpacePage {
            results: Vec<RawSpace>,
        }

        let limit = if limit == 0 { DEFAULT_LIMIT } else { limit };
        let query = vec![
            ("limit", limit.to_string()),
            ("expand", "description.plain".to_string()),
        ];

        let page: SpacePage = self.gateway.get(&["space"], &query).await?;
        debug!("Listed {} spaces", page.results.len());
        Ok(page.results.into_iter().map(simplify_space).collect())
    }

    /// Run a CQL search over content, bodies and versions expanded
    #[instrument(skip(self), fields(cql))]
    pub async fn search_content(&self, cql: &str, limit: u32) -> AtlassianMcpResult<Vec<Content>> {
        if cql.trim().is_empty() {
            return Err(AtlassianMcpError::invalid_param(
                "cql",
                "CQL query is required",
            ));
        }

        #[derive(Default, Deserialize)]
        #[serde(default)]
        struct ContentPage {
            results: Vec<RawContent>,
        }

        let limit = if limit == 0 { DEFAULT_LIMIT } else { limit };
        let query = vec![
            ("cql", cql.to_string()),
            ("limit", limit.to_string()),
            ("expand", "body.storage,version".to_string()),
        ];

        let page: ContentPage = self.gateway.get(&["content/search"], &query).await?;
        Ok(page.results.into_iter().map(simplify_content).collect())
    }

    /// Create a page in storage format
    #[instrument(skip(self, input), fields(space_key = input.space_key.as_str()))]
    pub async fn create_page(&self, input: PageInput) -> AtlassianMcpResult<Content> {
        if input.space_key.trim().is_empty() {
            return Err(AtlassianMcpError::invalid_param(
                "space_key",
                "Space key is required",
            ));
        }
        if input.title.trim().is_empty() {
            return Err(AtlassianMcpError::invalid_param(
                "title",
                "Title is required",
            ));
        }
        if input.body.trim().is_empty() {
            return Err(AtlassianMcpError::invalid_param(
                "body",
                "Page body is required",
            ));
        }

        let mut payload = json!({
            "type": "page",
            "title": input.title,
            "space": { "key": input.space_key },
            "body": {
                "storage": {
                    "value": input.body,
                    "representation": "storage",
                }
            }
        });
        if !input.parent_id.trim().is_empty() {
            payload["ancestors"] = json!([{ "id": input.parent_id }]);
        }

        let raw: RawContent = self.gateway.post(&["content"], &payload).await?;
        Ok(simplify_content(raw))
    }

    /// Update an existing page. The caller supplies the next version
    /// number; the remote rejects stale versions.
    #[instrument(skip(self, input), fields(page_id))]
    pub async fn update_page(&self, page_id: &str, input: PageInput) -> AtlassianMcpResult<Content> {
        if page_id.trim().is_empty() {
            return Err(AtlassianMcpError::invalid_param(
                "page_id",
                "Page id is required",
            ));
        }
        if input.title.trim().is_empty() {
            return Err(AtlassianMcpError::invalid_param(
                "title",
                "Title is required",
            ));
        }
        if input.body.trim().is_empty() {
            return Err(AtlassianMcpError::invalid_param(
                "body",
                "Page body is required",
            ));
        }
        if input.version == 0 {
            return Err(AtlassianMcpError::invalid_param(
                "version",
                "Target version number is required",
            ));
        }

        let mut payload = json!({
            "type": "page",
            "title": input.title,
            "version": { "number": input.version },
            "body": {
                "storage": {
                    "value": input.body,
                    "representation": "storage",
                }
            }
        });
        if !input.space_key.trim().is_empty() {
            payload["space"] = json!({ "key": input.space_key });
        }
        if !input.parent_id.trim().is_empty() {
            payload["ancestors"] = json!([{ "id": input.parent_id }]);
        }

        let raw: RawContent = self.gateway.put(&["content", page_id], &payload).await?;
        Ok(simplify_content(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn service() -> ConfluenceService {
        let creds = ServiceCredentials {
            oauth_token: "tok123".to_string(),
            ..Default::default()
        };
        ConfluenceService::new("https://example.atlassian.net/wiki", &creds).unwrap()
    }

    #[test]
    fn test_base_url_restores_wiki_path() {
        let service = service();
        assert_eq!(service.site(), "https://example.atlassian.net");
        assert_eq!(service.base_url(), "https://example.atlassian.net/wiki");
    }

    #[test]
    fn test_numeric_space_id_becomes_string() {
        let raw: RawSpace = serde_json::from_str(
            r#"{"id": 65537, "key": "DEV", "name": "Development",
                "description": {"plain": {"value": "Team space"}}}"#,
        )
        .unwrap();

        let space = simplify_space(raw);
        assert_eq!(space.id, "65537");
        assert_eq!(space.key, "DEV");
        assert_eq!(space.description, "Team space");
    }

    #[test]
    fn test_content_simplification() {
        let raw: RawContent = serde_json::from_str(
            r#"{"id": "196609", "type": "page", "status": "current",
                "title": "Runbook", "version": {"number": 4},
                "body": {"storage": {"value": "<p>hello</p>", "representation": "storage"}}}"#,
        )
        .unwrap();

        let content = simplify_content(raw);
        assert_eq!(content.id, "196609");
        assert_eq!(content.content_type, "page");
        assert_eq!(content.version, 4);
        assert_eq!(content.body, "<p>hello</p>");
    }

    #[tokio::test]
    async fn test_search_requires_cql() {
        let err = service().search_content("   ", 10).await.unwrap_err();
        assert_matches!(
            err,
            AtlassianMcpError::InvalidParameter { ref parameter, .. } if parameter == "cql"
        );
    }

    #[tokio::test]
    async fn test_create_page_requires_body() {
        let input = PageInput {
            space_key: "DEV".to_string(),
            title: "Runbook".to_string(),
            ..Default::default()
        };
        let err = service().create_page(input).await.unwrap_err();
        assert_matches!(
            err,
            AtlassianMcpError::InvalidParameter { ref parameter, .. } if parameter == "body"
        );
    }

    #[tokio::test]
    async fn test_update_page_requires_version() {
        let input = PageInput {
            title: "Runbook".to_string(),
            body: "<p>updated</p>".to_string(),
            ..Default::default()
        };
        let err = service().update_page("196609", input).await.unwrap_err();
        assert_matches!(
            err,
            AtlassianMcpError::InvalidParameter { ref parameter, .. } if parameter == "version"
        );
    }
}
