//! Error types and handling for the Atlassian MCP Server
//!
//! Provides structured error types that map to MCP JSON-RPC error codes
//! and converts errors from dependencies into MCP-compatible errors.

use serde_json::Value;
use thiserror::Error;

/// Custom error types for the Atlassian MCP Server
#[derive(Debug, Error)]
pub enum AtlassianMcpError {
    /// Configuration errors (-32001)
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// No usable credentials for a service (-32002)
    #[error("Insufficient credentials for {service}: set an OAuth token or an email/API token pair")]
    InsufficientCredentials { service: String },

    /// Transport-level failures: connection refused, DNS, timeouts (-32003)
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// Non-2xx response from the remote API (-32004)
    #[error("Remote API error (status {status}): {message}")]
    Remote { status: u16, message: String },

    /// Response body could not be decoded into the expected shape (-32005)
    #[error("Decode error: {message}")]
    Decode { message: String },

    /// Invalid parameter errors (-32006)
    #[error("Invalid parameter: {parameter} - {message}")]
    InvalidParameter { parameter: String, message: String },

    /// Internal server errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl AtlassianMcpError {
    /// Get the MCP JSON-RPC error code for this error
    pub fn error_code(&self) -> i32 {
        match self {
            AtlassianMcpError::Configuration { .. } => -32001,
            AtlassianMcpError::InsufficientCredentials { .. } => -32002,
            AtlassianMcpError::Transport { .. } => -32003,
            AtlassianMcpError::Remote { .. } => -32004,
            AtlassianMcpError::Decode { .. } => -32005,
            AtlassianMcpError::InvalidParameter { .. } => -32006,
            AtlassianMcpError::Internal { .. } => -32603, // Internal error
        }
    }

    /// Get the error category for logging and metrics
    pub fn category(&self) -> &'static str {
        match self {
            AtlassianMcpError::Configuration { .. } => "configuration",
            AtlassianMcpError::InsufficientCredentials { .. } => "authentication",
            AtlassianMcpError::Transport { .. } => "network",
            AtlassianMcpError::Remote { .. } => "remote",
            AtlassianMcpError::Decode { .. } => "decode",
            AtlassianMcpError::InvalidParameter { .. } => "invalid_parameter",
            AtlassianMcpError::Internal { .. } => "internal",
        }
    }

    /// Whether a retry could plausibly succeed.
    ///
    /// Transport failures and throttled or server-side remote statuses are
    /// retryable; everything else is terminal for the same request.
    pub fn is_retryable(&self) -> bool {
        match self {
            AtlassianMcpError::Transport { .. } => true,
            AtlassianMcpError::Remote { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Get additional error data for MCP error responses
    pub fn error_data(&self) -> Option<Value> {
        let mut data = serde_json::Map::new();
        data.insert(
            "category".to_string(),
            Value::String(self.category().to_string()),
        );

        match self {
            AtlassianMcpError::Remote { status, .. } => {
                data.insert("status".to_string(), Value::Number((*status).into()));
                data.insert("retryable".to_string(), Value::Bool(self.is_retryable()));
                Some(Value::Object(data))
            }
            AtlassianMcpError::InsufficientCredentials { service } => {
                data.insert("service".to_string(), Value::String(service.clone()));
                Some(Value::Object(data))
            }
            AtlassianMcpError::InvalidParameter { parameter, .. } => {
                data.insert("parameter".to_string(), Value::String(parameter.clone()));
                Some(Value::Object(data))
            }
            _ => {
                if !data.is_empty() {
                    Some(Value::Object(data))
                } else {
                    None
                }
            }
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        AtlassianMcpError::Configuration {
            message: message.into(),
        }
    }

    /// Create an insufficient credentials error
    pub fn insufficient_credentials(service: impl Into<String>) -> Self {
        AtlassianMcpError::InsufficientCredentials {
            service: service.into(),
        }
    }

    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        AtlassianMcpError::Transport {
            message: message.into(),
        }
    }

    /// Create a remote API error
    pub fn remote(status: u16, message: impl Into<String>) -> Self {
        AtlassianMcpError::Remote {
            status,
            message: message.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        AtlassianMcpError::Decode {
            message: message.into(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_param(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        AtlassianMcpError::InvalidParameter {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        AtlassianMcpError::Internal {
            message: message.into(),
        }
    }
}

/// Convert from reqwest errors to AtlassianMcpError
impl From<reqwest::Error> for AtlassianMcpError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AtlassianMcpError::transport(format!("Request timed out: {}", err))
        } else if err.is_connect() {
            AtlassianMcpError::transport(format!("Connection failed: {}", err))
        } else if err.is_decode() {
            AtlassianMcpError::decode(format!("Response decoding failed: {}", err))
        } else {
            AtlassianMcpError::transport(format!("HTTP error: {}", err))
        }
    }
}

/// Convert from serde_json errors
impl From<serde_json::Error> for AtlassianMcpError {
    fn from(err: serde_json::Error) -> Self {
        AtlassianMcpError::internal(format!("JSON error: {}", err))
    }
}

/// Convert from TOML parsing errors
impl From<toml::de::Error> for AtlassianMcpError {
    fn from(err: toml::de::Error) -> Self {
        AtlassianMcpError::config(format!("TOML parsing error: {}", err))
    }
}

/// Result type alias for Atlassian MCP operations
pub type AtlassianMcpResult<T> = Result<T, AtlassianMcpError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(AtlassianMcpError::config("test").error_code(), -32001);
        assert_eq!(
            AtlassianMcpError::insufficient_credentials("jira").error_code(),
            -32002
        );
        assert_eq!(AtlassianMcpError::transport("test").error_code(), -32003);
        assert_eq!(AtlassianMcpError::remote(404, "gone").error_code(), -32004);
        assert_eq!(AtlassianMcpError::decode("bad json").error_code(), -32005);
        assert_eq!(
            AtlassianMcpError::invalid_param("jql", "empty").error_code(),
            -32006
        );
        assert_eq!(AtlassianMcpError::internal("test").error_code(), -32603);
    }

    #[test]
    fn test_error_categories() {
        assert_eq!(AtlassianMcpError::config("test").category(), "configuration");
        assert_eq!(
            AtlassianMcpError::insufficient_credentials("jira").category(),
            "authentication"
        );
        assert_eq!(AtlassianMcpError::transport("test").category(), "network");
        assert_eq!(AtlassianMcpError::remote(502, "bad gateway").category(), "remote");
        assert_eq!(AtlassianMcpError::decode("test").category(), "decode");
    }

    #[test]
    fn test_error_data() {
        let remote_error = AtlassianMcpError::remote(429, "throttled");
        let data = remote_error.error_data().unwrap();

        assert_eq!(data["category"], "remote");
        assert_eq!(data["status"], 429);
        assert_eq!(data["retryable"], true);

        let param_error = AtlassianMcpError::invalid_param("cql", "must not be empty");
        let data = param_error.error_data().unwrap();

        assert_eq!(data["category"], "invalid_parameter");
        assert_eq!(data["parameter"], "cql");

        let creds_error = AtlassianMcpError::insufficient_credentials("confluence");
        let data = creds_error.error_data().unwrap();

        assert_eq!(data["service"], "confluence");
    }

    #[test]
    fn test_retryable() {
        assert!(AtlassianMcpError::remote(429, "throttled").is_retryable());
        assert!(AtlassianMcpError::remote(503, "unavailable").is_retryable());
        assert!(AtlassianMcpError::transport("timeout").is_retryable());
        assert!(!AtlassianMcpError::remote(404, "missing").is_retryable());
        assert!(!AtlassianMcpError::remote(400, "bad request").is_retryable());
        assert!(!AtlassianMcpError::invalid_param("jql", "empty").is_retryable());
    }

    #[test]
    fn test_remote_display() {
        let err = AtlassianMcpError::remote(404, "Issue does not exist");
        assert_eq!(
            err.to_string(),
            "Remote API error (status 404): Issue does not exist"
        );
    }

    #[test]
    fn test_serde_json_conversion() {
        let json_error = serde_json::from_str::<Value>("{not json").unwrap_err();
        let err: AtlassianMcpError = json_error.into();
        assert_eq!(err.category(), "internal");
    }
}
