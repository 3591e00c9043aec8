/// Integration tests for the Confluence service layer: request shapes,
/// wire-format simplification, and endpoint paths against a mock server
mod common;

use common::confluence_service;
use serde_json::json;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_list_spaces_uses_default_limit() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wiki/rest/api/space"))
        .and(query_param("limit", "25"))
        .and(query_param("expand", "description.plain"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [
                {
                    "id": 65537,
                    "key": "DEV",
                    "name": "Development",
                    "description": {"plain": {"value": "Team space", "representation": "plain"}}
                },
                {
                    "id": "98305",
                    "key": "OPS",
                    "name": "Operations",
                    "description": {}
                }
            ],
            "size": 2
        })))
        .expect(1)
        .mount(&server)
        .await;

    let spaces = confluence_service(&server).list_spaces(0).await.unwrap();

    assert_eq!(spaces.len(), 2);
    // Numeric and string ids both come back as strings
    assert_eq!(spaces[0].id, "65537");
    assert_eq!(spaces[0].description, "Team space");
    assert_eq!(spaces[1].id, "98305");
    assert_eq!(spaces[1].description, "");
}

#[tokio::test]
async fn test_list_spaces_respects_caller_limit() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wiki/rest/api/space"))
        .and(query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .expect(1)
        .mount(&server)
        .await;

    let spaces = confluence_service(&server).list_spaces(5).await.unwrap();
    assert!(spaces.is_empty());
}

#[tokio::test]
async fn test_search_content_expands_body_and_version() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/wiki/rest/api/content/search"))
        .and(query_param("cql", "space = DEV and type = page"))
        .and(query_param("limit", "10"))
        .and(query_param("expand", "body.storage,version"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{
                "id": "196609",
                "type": "page",
                "status": "current",
                "title": "Runbook",
                "version": {"number": 4},
                "body": {"storage": {"value": "<p>Steps</p>", "representation": "storage"}}
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let results = confluence_service(&server)
        .search_content("space = DEV and type = page", 10)
        .await
        .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, "196609");
    assert_eq!(results[0].content_type, "page");
    assert_eq!(results[0].version, 4);
    assert_eq!(results[0].body, "<p>Steps</p>");
}

#[tokio::test]
async fn test_create_page_payload_shape() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/wiki/rest/api/content"))
        .and(body_json(json!({
            "type": "page",
            "title": "Runbook",
            "space": {"key": "DEV"},
            "body": {
                "storage": {"value": "<p>Steps</p>", "representation": "storage"}
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "196609",
            "type": "page",
            "status": "current",
            "title": "Runbook",
            "version": {"number": 1}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let input = atlassian_mcp_server::confluence::PageInput {
        space_key: "DEV".to_string(),
        title: "Runbook".to_string(),
        body: "<p>Steps</p>".to_string(),
        ..Default::default()
    };
    let page = confluence_service(&server).create_page(input).await.unwrap();

    assert_eq!(page.id, "196609");
    assert_eq!(page.version, 1);
}

#[tokio::test]
async fn test_create_page_includes_ancestor() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/wiki/rest/api/content"))
        .and(body_json(json!({
            "type": "page",
            "title": "Child page",
            "space": {"key": "DEV"},
            "body": {
                "storage": {"value": "<p>Nested</p>", "representation": "storage"}
            },
            "ancestors": [{"id": "196609"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "196610",
            "type": "page",
            "status": "current",
            "title": "Child page",
            "version": {"number": 1}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let input = atlassian_mcp_server::confluence::PageInput {
        space_key: "DEV".to_string(),
        title: "Child page".to_string(),
        body: "<p>Nested</p>".to_string(),
        parent_id: "196609".to_string(),
        ..Default::default()
    };
    let page = confluence_service(&server).create_page(input).await.unwrap();

    assert_eq!(page.id, "196610");
}

#[tokio::test]
async fn test_update_page_sends_target_version() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/wiki/rest/api/content/196609"))
        .and(body_json(json!({
            "type": "page",
            "title": "Runbook",
            "version": {"number": 5},
            "body": {
                "storage": {"value": "<p>Updated steps</p>", "representation": "storage"}
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "196609",
            "type": "page",
            "status": "current",
            "title": "Runbook",
            "version": {"number": 5},
            "body": {"storage": {"value": "<p>Updated steps</p>"}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let input = atlassian_mcp_server::confluence::PageInput {
        title: "Runbook".to_string(),
        body: "<p>Updated steps</p>".to_string(),
        version: 5,
        ..Default::default()
    };
    let page = confluence_service(&server)
        .update_page("196609", input)
        .await
        .unwrap();

    assert_eq!(page.version, 5);
    assert_eq!(page.body, "<p>Updated steps</p>");
}

#[tokio::test]
async fn test_stale_version_conflict_surfaces_remote_error() {
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/wiki/rest/api/content/196609"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "message": "Version must be incremented on update"
        })))
        .mount(&server)
        .await;

    let input = atlassian_mcp_server::confluence::PageInput {
        title: "Runbook".to_string(),
        body: "<p>Updated steps</p>".to_string(),
        version: 3,
        ..Default::default()
    };
    let err = confluence_service(&server)
        .update_page("196609", input)
        .await
        .unwrap_err();

    assert_eq!(err.error_code(), -32004);
    assert!(err
        .to_string()
        .contains("Version must be incremented on update"));
}
