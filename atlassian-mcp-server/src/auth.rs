//! Authentication strategy selection
//!
//! Credentials arrive as a bag of optional fields; exactly one header
//! strategy is materialized from them when a service client is built.

use crate::config::ServiceCredentials;
use crate::error::{AtlassianMcpError, AtlassianMcpResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Materialized Authorization header for one service.
///
/// A bearer token takes precedence over an email/API token pair when both
/// are configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthHeader {
    /// OAuth or personal access token, sent as `Bearer <token>`
    Bearer(String),
    /// Base64-encoded `email:token` pair, sent as `Basic <encoded>`
    Basic(String),
}

impl AuthHeader {
    /// Select the authentication strategy for `creds`.
    ///
    /// Fails with `InsufficientCredentials` when neither a bearer token nor
    /// a complete email/API token pair is present. The failure is permanent
    /// for the process, so callers surface it at construction rather than
    /// on first use.
    pub fn resolve(service: &str, creds: &ServiceCredentials) -> AtlassianMcpResult<Self> {
        let oauth_token = creds.oauth_token.trim();
        if !oauth_token.is_empty() {
            return Ok(AuthHeader::Bearer(oauth_token.to_string()));
        }

        let email = creds.email.trim();
        let api_token = creds.api_token.trim();
        if !email.is_empty() && !api_token.is_empty() {
            let encoded = STANDARD.encode(format!("{}:{}", email, api_token));
            return Ok(AuthHeader::Basic(encoded));
        }

        Err(AtlassianMcpError::insufficient_credentials(service))
    }

    /// Value to attach as the `Authorization` header
    pub fn header_value(&self) -> String {
        match self {
            AuthHeader::Bearer(token) => format!("Bearer {}", token),
            AuthHeader::Basic(encoded) => format!("Basic {}", encoded),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn creds(email: &str, api_token: &str, oauth_token: &str) -> ServiceCredentials {
        ServiceCredentials {
            email: email.to_string(),
            api_token: api_token.to_string(),
            oauth_token: oauth_token.to_string(),
        }
    }

    #[test]
    fn test_bearer_wins_over_basic() {
        let header =
            AuthHeader::resolve("jira", &creds("user@example.com", "secret", "tok123")).unwrap();
        assert_eq!(header, AuthHeader::Bearer("tok123".to_string()));
        assert_eq!(header.header_value(), "Bearer tok123");
    }

    #[test]
    fn test_basic_encoding() {
        let header = AuthHeader::resolve("jira", &creds("user@example.com", "secret", "")).unwrap();
        assert_eq!(
            header.header_value(),
            "Basic dXNlckBleGFtcGxlLmNvbTpzZWNyZXQ="
        );
    }

    #[test]
    fn test_whitespace_token_falls_through_to_basic() {
        let header =
            AuthHeader::resolve("jira", &creds("user@example.com", "secret", "   ")).unwrap();
        assert_matches!(header, AuthHeader::Basic(_));
    }

    #[test]
    fn test_bearer_token_is_trimmed() {
        let header = AuthHeader::resolve("jira", &creds("", "", "  tok123  ")).unwrap();
        assert_eq!(header.header_value(), "Bearer tok123");
    }

    #[test]
    fn test_missing_credentials_fail() {
        let err = AuthHeader::resolve("confluence", &creds("", "", "")).unwrap_err();
        assert_matches!(
            err,
            AtlassianMcpError::InsufficientCredentials { ref service } if service == "confluence"
        );
    }

    #[test]
    fn test_partial_basic_pair_fails() {
        // An email without a token (or the reverse) is not a usable pair
        assert_matches!(
            AuthHeader::resolve("jira", &creds("user@example.com", "", "")),
            Err(AtlassianMcpError::InsufficientCredentials { .. })
        );
        assert_matches!(
            AuthHeader::resolve("jira", &creds("", "secret", "")),
            Err(AtlassianMcpError::InsufficientCredentials { .. })
        );
    }
}
