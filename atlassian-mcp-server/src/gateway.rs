//! Authenticated HTTP gateway shared by the Jira and Confluence clients
//!
//! One gateway per service. It owns the normalized root address, the REST
//! prefix, the resolved Authorization header, and an HTTP client with a
//! fixed request timeout. Every remote call in the crate flows through
//! here, so authentication and error mapping live in exactly one place.

use crate::auth::AuthHeader;
use crate::config::ServiceCredentials;
use crate::error::{AtlassianMcpError, AtlassianMcpResult};
use crate::site::{build_path, normalize_root};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Fixed outbound request timeout. Callers cannot override it per call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Authenticated client for one service root.
#[derive(Debug, Clone)]
pub struct RestGateway {
    http: reqwest::Client,
    root: String,
    api_prefix: String,
    auth_header: String,
}

impl RestGateway {
    /// Build a gateway for one service.
    ///
    /// Credential resolution happens here, not on first use, so a
    /// configuration without usable credentials fails construction.
    pub fn new(
        service: &str,
        site: &str,
        api_prefix: &str,
        known_suffixes: &[&str],
        creds: &ServiceCredentials,
    ) -> AtlassianMcpResult<Self> {
        let root = normalize_root(site, known_suffixes);
        if root.is_empty() {
            return Err(AtlassianMcpError::config(format!(
                "{} site address is empty",
                service
            )));
        }

        let auth_header = AuthHeader::resolve(service, creds)?.header_value();

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| {
                AtlassianMcpError::internal(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            http,
            root,
            api_prefix: api_prefix.to_string(),
            auth_header,
        })
    }

    /// Normalized root address: scheme, host, and any context path
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Full request URL for the given path segments
    pub fn url(&self, segments: &[&str]) -> String {
        build_path(&self.root, &self.api_prefix, segments)
    }

    /// Issue a request and decode the JSON response into `T`.
    ///
    /// A 204 response never reaches the JSON parser; target shapes that
    /// tolerate absence decode from `null` instead.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> AtlassianMcpResult<T> {
        let response = self.send(method, segments, query, body).await?;

        if response.status() == StatusCode::NO_CONTENT {
            return serde_json::from_value(Value::Null).map_err(|e| {
                AtlassianMcpError::decode(format!("Response had no content: {}", e))
            });
        }

        let bytes = response.bytes().await.map_err(AtlassianMcpError::from)?;
        serde_json::from_slice(&bytes)
            .map_err(|e| AtlassianMcpError::decode(format!("Invalid JSON response: {}", e)))
    }

    /// Issue a request and discard the response body
    pub async fn request_unit(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> AtlassianMcpResult<()> {
        self.send(method, segments, query, body).await?;
        Ok(())
    }

    /// GET with query parameters, decoding the response into `T`
    pub async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        query: &[(&str, String)],
    ) -> AtlassianMcpResult<T> {
        self.request(Method::GET, segments, query, None).await
    }

    /// POST a JSON body, decoding the response into `T`
    pub async fn post<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &Value,
    ) -> AtlassianMcpResult<T> {
        self.request(Method::POST, segments, &[], Some(body)).await
    }

    /// POST a JSON body, discarding the response
    pub async fn post_unit(&self, segments: &[&str], body: &Value) -> AtlassianMcpResult<()> {
        self.request_unit(Method::POST, segments, &[], Some(body))
            .await
    }

    /// PUT a JSON body, decoding the response into `T`
    pub async fn put<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        body: &Value,
    ) -> AtlassianMcpResult<T> {
        self.request(Method::PUT, segments, &[], Some(body)).await
    }

    /// PUT a JSON body, discarding the response
    pub async fn put_unit(&self, segments: &[&str], body: &Value) -> AtlassianMcpResult<()> {
        self.request_unit(Method::PUT, segments, &[], Some(body))
            .await
    }

    /// Upload a file as a multipart form.
    ///
    /// Attachment endpoints reject requests unless the XSRF check is
    /// disabled via the `X-Atlassian-Token` header.
    pub async fn upload(
        &self,
        segments: &[&str],
        file_name: &str,
        data: Vec<u8>,
    ) -> AtlassianMcpResult<()> {
        let url = self.url(segments);
        debug!("POST {} (multipart, {} bytes)", url, data.len());

        let part = reqwest::multipart::Part::bytes(data).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(&url)
            .header(AUTHORIZATION, &self.auth_header)
            .header(ACCEPT, "application/json")
            .header("X-Atlassian-Token", "no-check")
            .multipart(form)
            .send()
            .await
            .map_err(AtlassianMcpError::from)?;

        Self::check_status(response).await?;
        Ok(())
    }

    async fn send(
        &self,
        method: Method,
        segments: &[&str],
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> AtlassianMcpResult<Response> {
        let url = self.url(segments);
        debug!("{} {}", method, url);

        let mut request = self
            .http
            .request(method, &url)
            .header(AUTHORIZATION, &self.auth_header)
            .header(ACCEPT, "application/json");

        if !query.is_empty() {
            request = request.query(query);
        }

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(AtlassianMcpError::from)?;
        Self::check_status(response).await
    }

    async fn check_status(response: Response) -> AtlassianMcpResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(remote_error(status, &body))
    }
}

/// Wire shape of a remote error body. Jira tends to populate
/// `errorMessages`, Confluence `message`.
#[derive(Debug, Deserialize)]
struct RemoteErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default, rename = "errorMessages")]
    error_messages: Vec<String>,
}

/// Build a `Remote` error from a failed response.
///
/// The message is the body's `message` field if present, else the first
/// `errorMessages` element, else the raw body text verbatim.
fn remote_error(status: StatusCode, body: &str) -> AtlassianMcpError {
    let message = serde_json::from_str::<RemoteErrorBody>(body)
        .ok()
        .and_then(|parsed| {
            parsed
                .message
                .filter(|message| !message.is_empty())
                .or_else(|| parsed.error_messages.into_iter().next())
        })
        .unwrap_or_else(|| body.to_string());

    AtlassianMcpError::remote(status.as_u16(), message)
}
