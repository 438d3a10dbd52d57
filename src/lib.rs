//! Webex Teams API Client
//!
//! Builds an authenticated client for the Webex Teams REST API:
//! - Access token resolution: explicit token, then environment token, then
//!   an OAuth authorization-code exchange
//! - One shared request session (base URL, timeout, rate-limit policy,
//!   proxies) behind every resource handle
//! - Optional waiting on HTTP 429 responses
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use webex_client::WebexClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Reads WEBEX_TEAMS_ACCESS_TOKEN
//!     let client = webex_client::create_client_from_env().await?;
//!
//!     let rooms = client.rooms().list([("max", "10")]).await?;
//!     println!("{} rooms", rooms.len());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

// Core modules
pub mod auth;
pub mod client;
pub mod config;
pub mod errors;
pub mod session;
pub mod transport;

// Services
pub mod services;

// Observability
pub mod observability;

// Testing utilities
pub mod mocks;

// Tests
#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use auth::{OAuthCredentials, TokenSource};
pub use client::{WebexClient, WebexClientImpl};
pub use config::{SessionConfig, WebexConfig, WebexConfigBuilder};
pub use errors::{WebexError, WebexResult};

/// Default base URL for the Webex API
pub const DEFAULT_BASE_URL: &str = "https://webexapis.com/v1/";

/// Default timeout in seconds for a single request
pub const DEFAULT_SINGLE_REQUEST_TIMEOUT: u64 = 60;

/// Default for waiting out rate limits
pub const DEFAULT_WAIT_ON_RATE_LIMIT: bool = true;

/// Create a Webex client with the given configuration
pub async fn create_client(config: WebexConfig) -> WebexResult<WebexClientImpl> {
    WebexClientImpl::new(config).await
}

/// Create a Webex client from environment variables
///
/// Reads:
/// - `WEBEX_TEAMS_ACCESS_TOKEN` - Access token
/// - `WEBEX_TEAMS_BASE_URL` - Base URL override
/// - `WEBEX_TEAMS_SINGLE_REQUEST_TIMEOUT` - Timeout in seconds
/// - `WEBEX_TEAMS_WAIT_ON_RATE_LIMIT` - `true`/`false`
pub async fn create_client_from_env() -> WebexResult<WebexClientImpl> {
    let config = WebexConfig::from_env()?;
    create_client(config).await
}
