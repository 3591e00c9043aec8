//! Configuration management for the Atlassian MCP Server
//!
//! Handles loading configuration from TOML files and environment variables,
//! applies the shared-site and netrc fallbacks, and validates that every
//! service has a site address and usable credentials.

use crate::auth::AuthHeader;
use crate::error::{AtlassianMcpError, AtlassianMcpResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Main configuration structure for the Atlassian MCP Server
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AtlassianConfig {
    /// Shared site address, used by services that do not set their own
    pub site: String,

    /// Jira connectivity and credentials
    pub jira: ServiceConfig,

    /// Confluence connectivity and credentials
    pub confluence: ServiceConfig,
}

/// Per-service connectivity settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Service site address; falls back to the shared `site` when empty
    pub site: String,

    /// Authentication material, inlined at the service level
    #[serde(flatten)]
    pub credentials: ServiceCredentials,
}

/// Authentication material for one service.
///
/// Either `oauth_token` alone, or `email` plus `api_token`. When both forms
/// are present the bearer token wins, see [`AuthHeader::resolve`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceCredentials {
    /// Account email for basic authentication
    pub email: String,

    /// API token paired with the email
    pub api_token: String,

    /// OAuth or personal access token for bearer authentication
    pub oauth_token: String,
}

impl AtlassianConfig {
    /// Load configuration with priority: environment variables > TOML file > defaults
    pub fn load() -> AtlassianMcpResult<Self> {
        let mut config = if let Ok(path) = env::var("ATLASSIAN_MCP_CONFIG") {
            info!("Loading configuration from {}", path);
            Self::load_from_file(&path)?
        } else if let Ok(file_config) = Self::load_from_file("config/atlassian-mcp.toml") {
            info!("Loaded configuration from config/atlassian-mcp.toml");
            file_config
        } else if let Ok(file_config) = Self::load_from_file("atlassian-mcp.toml") {
            info!("Loaded configuration from atlassian-mcp.toml");
            file_config
        } else {
            debug!("No configuration file found, using environment variables only");
            Self::default()
        };

        config.load_from_env();
        config.apply_defaults();
        config.apply_netrc_defaults()?;
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a TOML file
    fn load_from_file<P: AsRef<Path>>(path: P) -> AtlassianMcpResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            AtlassianMcpError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let config = toml::from_str(&content)?;
        debug!("Parsed configuration file {}", path.display());
        Ok(config)
    }

    /// Override configuration from environment variables
    fn load_from_env(&mut self) {
        if let Ok(site) = env::var("ATLASSIAN_SITE") {
            self.site = site;
            debug!("Loaded ATLASSIAN_SITE from environment");
        }
        Self::service_from_env("ATLASSIAN_JIRA", &mut self.jira);
        Self::service_from_env("ATLASSIAN_CONFLUENCE", &mut self.confluence);
    }

    fn service_from_env(prefix: &str, service: &mut ServiceConfig) {
        if let Ok(site) = env::var(format!("{}_SITE", prefix)) {
            service.site = site;
        }
        if let Ok(email) = env::var(format!("{}_EMAIL", prefix)) {
            service.credentials.email = email;
        }
        if let Ok(api_token) = env::var(format!("{}_API_TOKEN", prefix)) {
            service.credentials.api_token = api_token;
        }
        if let Ok(oauth_token) = env::var(format!("{}_OAUTH_TOKEN", prefix)) {
            service.credentials.oauth_token = oauth_token;
        }
    }

    /// Trim site addresses and fall back to the shared site where needed
    fn apply_defaults(&mut self) {
        self.site = self.site.trim().to_string();
        apply_site_fallback(&mut self.jira, &self.site);
        apply_site_fallback(&mut self.confluence, &self.site);
    }

    /// Fill missing credentials from a netrc file.
    ///
    /// Looked up per service by site hostname, trying the exact host, the
    /// host without its port, then the `default` entry. Only services with
    /// no configured credentials at all are filled.
    fn apply_netrc_defaults(&mut self) -> AtlassianMcpResult<()> {
        let Some(path) = netrc_path() else {
            return Ok(());
        };

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => {
                return Err(AtlassianMcpError::config(format!(
                    "Failed to read netrc file {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        let entries = parse_netrc(&content);
        apply_netrc_to_service("jira", &mut self.jira, &entries);
        apply_netrc_to_service("confluence", &mut self.confluence, &entries);
        Ok(())
    }

    /// Validate that every service can be constructed from this configuration
    fn validate(&self) -> AtlassianMcpResult<()> {
        validate_service("jira", &self.jira)?;
        validate_service("confluence", &self.confluence)?;
        debug!("Configuration validation successful");
        Ok(())
    }
}

fn apply_site_fallback(service: &mut ServiceConfig, shared_site: &str) {
    service.site = service.site.trim().to_string();
    if service.site.is_empty() {
        service.site = shared_site.to_string();
    }
}

fn validate_service(name: &str, service: &ServiceConfig) -> AtlassianMcpResult<()> {
    if service.site.trim().is_empty() {
        return Err(AtlassianMcpError::config(format!(
            "{} site is not configured. Set ATLASSIAN_SITE or ATLASSIAN_{}_SITE",
            name,
            name.to_uppercase()
        )));
    }
    AuthHeader::resolve(name, &service.credentials)?;
    Ok(())
}

/// One machine entry parsed from a netrc file
#[derive(Debug, Clone, Default, PartialEq)]
struct NetrcEntry {
    machine: String,
    login: String,
    password: String,
}

/// Locate the netrc file: the NETRC environment variable wins, otherwise
/// `~/.netrc` when it exists.
fn netrc_path() -> Option<PathBuf> {
    if let Ok(path) = env::var("NETRC") {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    let candidate = dirs::home_dir()?.join(".netrc");
    if candidate.exists() {
        Some(candidate)
    } else {
        None
    }
}

/// Parse netrc content into entries keyed by machine name.
///
/// The keyword grammar is flat, so a simple token walk is enough. Keywords
/// we do not use still consume their value token.
fn parse_netrc(content: &str) -> HashMap<String, NetrcEntry> {
    let mut entries = HashMap::new();
    let mut current: Option<NetrcEntry> = None;

    let tokens: Vec<&str> = content
        .lines()
        .filter(|line| !line.trim_start().starts_with('#'))
        .flat_map(str::split_whitespace)
        .collect();

    let mut i = 0;
    while i < tokens.len() {
        match tokens[i] {
            "machine" => {
                if let Some(entry) = current.take() {
                    entries.insert(entry.machine.clone(), entry);
                }
                i += 1;
                if let Some(name) = tokens.get(i) {
                    current = Some(NetrcEntry {
                        machine: name.to_string(),
                        ..Default::default()
                    });
                }
            }
            "default" => {
                if let Some(entry) = current.take() {
                    entries.insert(entry.machine.clone(), entry);
                }
                current = Some(NetrcEntry {
                    machine: "default".to_string(),
                    ..Default::default()
                });
            }
            "login" => {
                i += 1;
                if let (Some(entry), Some(value)) = (current.as_mut(), tokens.get(i)) {
                    entry.login = value.to_string();
                }
            }
            "password" => {
                i += 1;
                if let (Some(entry), Some(value)) = (current.as_mut(), tokens.get(i)) {
                    entry.password = value.to_string();
                }
            }
            "account" | "macdef" => {
                i += 1;
            }
            _ => {}
        }
        i += 1;
    }

    if let Some(entry) = current.take() {
        entries.insert(entry.machine.clone(), entry);
    }

    entries
}

fn apply_netrc_to_service(
    name: &str,
    service: &mut ServiceConfig,
    entries: &HashMap<String, NetrcEntry>,
) {
    if service.site.trim().is_empty() {
        return;
    }

    let creds = &service.credentials;
    if !creds.email.trim().is_empty()
        || !creds.api_token.trim().is_empty()
        || !creds.oauth_token.trim().is_empty()
    {
        return;
    }

    let host = site_hostname(&service.site);
    if let Some(entry) = lookup_netrc(entries, host) {
        if !entry.login.is_empty() && !entry.password.is_empty() {
            debug!("Filled {} credentials from netrc machine '{}'", name, entry.machine);
            service.credentials.email = entry.login.clone();
            service.credentials.api_token = entry.password.clone();
        }
    }
}

/// Hostname portion of a site address, port included
fn site_hostname(site: &str) -> &str {
    let without_scheme = site
        .trim()
        .trim_start_matches("https://")
        .trim_start_matches("http://");
    without_scheme.split('/').next().unwrap_or("")
}

fn lookup_netrc<'a>(
    entries: &'a HashMap<String, NetrcEntry>,
    host: &str,
) -> Option<&'a NetrcEntry> {
    if host.is_empty() {
        return None;
    }

    if let Some(entry) = entries.get(host) {
        return Some(entry);
    }

    let without_port = host.split(':').next().unwrap_or(host);
    if without_port != host {
        if let Some(entry) = entries.get(without_port) {
            return Some(entry);
        }
    }

    entries.get("default")
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serial_test::serial;

    fn valid_service() -> ServiceConfig {
        ServiceConfig {
            site: "https://example.atlassian.net".to_string(),
            credentials: ServiceCredentials {
                email: "user@example.com".to_string(),
                api_token: "secret".to_string(),
                oauth_token: String::new(),
            },
        }
    }

    #[test]
    fn test_default_config_is_empty() {
        let config = AtlassianConfig::default();
        assert_eq!(config.site, "");
        assert_eq!(config.jira.site, "");
        assert_eq!(config.confluence.credentials.oauth_token, "");
    }

    #[test]
    fn test_toml_parsing_with_flattened_credentials() {
        let toml_content = r#"
            site = "example.atlassian.net"

            [jira]
            email = "user@example.com"
            api_token = "secret"

            [confluence]
            site = "https://docs.example.com"
            oauth_token = "tok123"
        "#;

        let config: AtlassianConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.site, "example.atlassian.net");
        assert_eq!(config.jira.site, "");
        assert_eq!(config.jira.credentials.email, "user@example.com");
        assert_eq!(config.jira.credentials.api_token, "secret");
        assert_eq!(config.confluence.site, "https://docs.example.com");
        assert_eq!(config.confluence.credentials.oauth_token, "tok123");
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        env::set_var("ATLASSIAN_SITE", "https://env.atlassian.net");
        env::set_var("ATLASSIAN_JIRA_EMAIL", "env@example.com");
        env::set_var("ATLASSIAN_JIRA_API_TOKEN", "env-token");
        env::set_var("ATLASSIAN_CONFLUENCE_OAUTH_TOKEN", "env-oauth");

        let mut config = AtlassianConfig::default();
        config.load_from_env();

        assert_eq!(config.site, "https://env.atlassian.net");
        assert_eq!(config.jira.credentials.email, "env@example.com");
        assert_eq!(config.jira.credentials.api_token, "env-token");
        assert_eq!(config.confluence.credentials.oauth_token, "env-oauth");

        env::remove_var("ATLASSIAN_SITE");
        env::remove_var("ATLASSIAN_JIRA_EMAIL");
        env::remove_var("ATLASSIAN_JIRA_API_TOKEN");
        env::remove_var("ATLASSIAN_CONFLUENCE_OAUTH_TOKEN");
    }

    #[test]
    fn test_shared_site_fallback() {
        let mut config = AtlassianConfig {
            site: "  example.atlassian.net  ".to_string(),
            jira: ServiceConfig::default(),
            confluence: ServiceConfig {
                site: "https://docs.example.com".to_string(),
                ..Default::default()
            },
        };

        config.apply_defaults();

        assert_eq!(config.site, "example.atlassian.net");
        assert_eq!(config.jira.site, "example.atlassian.net");
        assert_eq!(config.confluence.site, "https://docs.example.com");
    }

    #[test]
    fn test_validate_requires_site() {
        let config = AtlassianConfig {
            jira: valid_service(),
            ..Default::default()
        };

        let err = config.validate().unwrap_err();
        assert_matches!(err, AtlassianMcpError::Configuration { ref message } if message.contains("confluence"));
    }

    #[test]
    fn test_validate_requires_credentials() {
        let mut config = AtlassianConfig {
            jira: valid_service(),
            confluence: valid_service(),
            ..Default::default()
        };
        config.confluence.credentials = ServiceCredentials::default();

        let err = config.validate().unwrap_err();
        assert_matches!(
            err,
            AtlassianMcpError::InsufficientCredentials { ref service } if service == "confluence"
        );
    }

    #[test]
    fn test_parse_netrc_entries() {
        let content = r#"
            # work account
            machine example.atlassian.net login user@example.com password secret

            machine jira.example.com:8443
              login ops@example.com
              password hunter2

            default login fallback@example.com password fb
        "#;

        let entries = parse_netrc(content);
        assert_eq!(entries.len(), 3);
        assert_eq!(entries["example.atlassian.net"].login, "user@example.com");
        assert_eq!(entries["example.atlassian.net"].password, "secret");
        assert_eq!(entries["jira.example.com:8443"].password, "hunter2");
        assert_eq!(entries["default"].login, "fallback@example.com");
    }

    #[test]
    fn test_netrc_lookup_order() {
        let mut entries = HashMap::new();
        entries.insert(
            "jira.example.com".to_string(),
            NetrcEntry {
                machine: "jira.example.com".to_string(),
                login: "bare".to_string(),
                password: "pw".to_string(),
            },
        );
        entries.insert(
            "default".to_string(),
            NetrcEntry {
                machine: "default".to_string(),
                login: "fallback".to_string(),
                password: "pw".to_string(),
            },
        );

        // Port-qualified host falls back to the bare hostname
        assert_eq!(
            lookup_netrc(&entries, "jira.example.com:8443").unwrap().login,
            "bare"
        );
        assert_eq!(lookup_netrc(&entries, "other.example.com").unwrap().login, "fallback");
        assert!(lookup_netrc(&entries, "").is_none());
    }

    #[test]
    fn test_site_hostname_extraction() {
        assert_eq!(site_hostname("https://example.atlassian.net/wiki"), "example.atlassian.net");
        assert_eq!(site_hostname("http://localhost:8080/jira"), "localhost:8080");
        assert_eq!(site_hostname("example.atlassian.net"), "example.atlassian.net");
    }

    #[test]
    fn test_netrc_fills_only_empty_credentials() {
        let mut entries = HashMap::new();
        entries.insert(
            "example.atlassian.net".to_string(),
            NetrcEntry {
                machine: "example.atlassian.net".to_string(),
                login: "netrc@example.com".to_string(),
                password: "netrc-token".to_string(),
            },
        );

        let mut empty = ServiceConfig {
            site: "https://example.atlassian.net".to_string(),
            ..Default::default()
        };
        apply_netrc_to_service("jira", &mut empty, &entries);
        assert_eq!(empty.credentials.email, "netrc@example.com");
        assert_eq!(empty.credentials.api_token, "netrc-token");

        let mut with_oauth = ServiceConfig {
            site: "https://example.atlassian.net".to_string(),
            credentials: ServiceCredentials {
                oauth_token: "tok".to_string(),
                ..Default::default()
            },
        };
        apply_netrc_to_service("jira", &mut with_oauth, &entries);
        assert_eq!(with_oauth.credentials.email, "");
        assert_eq!(with_oauth.credentials.oauth_token, "tok");
    }
}
