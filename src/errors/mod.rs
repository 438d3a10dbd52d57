//! Error types for the Webex client.
//!
//! Construction failures fall into three groups: invalid arguments,
//! unresolvable credentials, and transport failures from the OAuth
//! exchange. Each group has its own enum so callers can tell them apart.

use std::time::Duration;
use thiserror::Error;

/// Result type for Webex operations
pub type WebexResult<T> = Result<T, WebexError>;

/// Root error type for the Webex client
#[derive(Error, Debug)]
pub enum WebexError {
    /// An argument failed validation
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// No usable access token could be resolved
    #[error("Access token error: {0}")]
    AccessToken(#[from] AccessTokenError),

    /// Rate limit error
    #[error("Rate limit error: {0}")]
    RateLimit(#[from] RateLimitError),

    /// Network error
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    /// Response parsing error
    #[error("Response error: {0}")]
    Response(#[from] ResponseError),

    /// Non-success HTTP status returned by the service
    #[error("API error: {status} - {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message reported by the service
        message: String,
        /// Tracking ID reported by the service, if any
        tracking_id: Option<String>,
    },

    /// The resource category's endpoint doesn't serve this operation
    #[error("{category} does not support {operation}")]
    Unsupported {
        /// Resource category name
        category: &'static str,
        /// Operation name
        operation: &'static str,
    },
}

impl WebexError {
    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "WEBEX_CONFIG",
            Self::AccessToken(_) => "WEBEX_ACCESS_TOKEN",
            Self::RateLimit(_) => "WEBEX_RATE_LIMIT",
            Self::Network(_) => "WEBEX_NETWORK",
            Self::Response(_) => "WEBEX_RESPONSE",
            Self::Api { .. } => "WEBEX_API",
            Self::Unsupported { .. } => "WEBEX_UNSUPPORTED",
        }
    }

    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(NetworkError::Timeout)
            | Self::Network(NetworkError::ConnectionFailed { .. })
            | Self::RateLimit(_) => true,
            Self::Api { status, .. } => matches!(*status, 500 | 502 | 503 | 504),
            _ => false,
        }
    }

    /// Get retry-after duration if applicable
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimit(RateLimitError::RateLimited { retry_after }) => Some(*retry_after),
            _ => None,
        }
    }

    /// Whether this error came from talking to the service rather than
    /// from local configuration
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::RateLimit(_) | Self::Network(_) | Self::Response(_) | Self::Api { .. }
        )
    }

    /// Build an API error from a non-success response body.
    ///
    /// Webex error bodies carry `message` and `trackingId`; anything else
    /// falls back to the raw body.
    pub fn from_response(status: u16, body: &str) -> Self {
        let json: Option<serde_json::Value> = serde_json::from_str(body).ok();
        let message = json
            .as_ref()
            .and_then(|v| v.get("message"))
            .and_then(|v| v.as_str())
            .map(String::from)
            .unwrap_or_else(|| {
                if body.is_empty() {
                    "Unknown error".to_string()
                } else {
                    body.to_string()
                }
            });
        let tracking_id = json
            .as_ref()
            .and_then(|v| v.get("trackingId"))
            .and_then(|v| v.as_str())
            .map(String::from);

        Self::Api {
            status,
            message,
            tracking_id,
        }
    }
}

/// Argument validation errors
#[derive(Error, Debug)]
pub enum ConfigurationError {
    /// An argument does not satisfy its declared type constraint
    #[error("Invalid argument `{argument}`: {message}")]
    InvalidArgument {
        /// Name of the offending argument
        argument: &'static str,
        /// What was wrong with it
        message: String,
    },

    /// Failed to build the underlying HTTP client
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(String),
}

impl ConfigurationError {
    /// Shorthand for an invalid argument error
    pub fn invalid(argument: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            argument,
            message: message.into(),
        }
    }

    /// Name of the offending argument, if this is an argument error
    pub fn argument(&self) -> Option<&'static str> {
        match self {
            Self::InvalidArgument { argument, .. } => Some(argument),
            Self::HttpClient(_) => None,
        }
    }
}

/// Access token resolution errors
#[derive(Error, Debug)]
pub enum AccessTokenError {
    /// No access token argument, environment token or OAuth parameters
    #[error(
        "You must provide a Webex Teams access token to interact with the Webex Teams APIs, \
         either via a WEBEX_TEAMS_ACCESS_TOKEN environment variable, via the access_token \
         argument, or via the client_id, client_secret, oauth_code and redirect_uri arguments"
    )]
    Missing,

    /// The OAuth exchange succeeded but returned an empty access token
    #[error("The OAuth access token exchange returned an empty access token")]
    EmptyExchangeToken,

    /// Some but not all OAuth parameters were supplied
    #[error("Incomplete OAuth parameters, missing: {}", missing.join(", "))]
    IncompleteOAuth {
        /// Names of the missing parameters
        missing: Vec<&'static str>,
    },
}

/// Rate limit errors
#[derive(Error, Debug)]
pub enum RateLimitError {
    /// Rate limited with retry information
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Duration to wait before retrying
        retry_after: Duration,
    },
}

/// Network errors
#[derive(Error, Debug)]
pub enum NetworkError {
    /// Connection failed
    #[error("Connection failed: {message}")]
    ConnectionFailed {
        /// Error message
        message: String,
    },

    /// Request timeout
    #[error("Request timed out")]
    Timeout,

    /// HTTP error
    #[error("HTTP error: {0}")]
    Http(String),
}

impl From<reqwest::Error> for NetworkError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            NetworkError::Timeout
        } else if err.is_connect() {
            NetworkError::ConnectionFailed {
                message: err.to_string(),
            }
        } else {
            NetworkError::Http(err.to_string())
        }
    }
}

/// Response parsing errors
#[derive(Error, Debug)]
pub enum ResponseError {
    /// JSON deserialization error
    #[error("Deserialization error: {message}")]
    DeserializationError {
        /// Error message
        message: String,
    },

    /// Unexpected response format
    #[error("Unexpected response: {message}")]
    UnexpectedResponse {
        /// Error message
        message: String,
    },
}

impl From<serde_json::Error> for ResponseError {
    fn from(err: serde_json::Error) -> Self {
        ResponseError::DeserializationError {
            message: err.to_string(),
        }
    }
}
