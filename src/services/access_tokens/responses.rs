//! Response types for the access tokens service.

use chrono::{DateTime, Duration, Utc};
use secrecy::SecretString;
use serde::Deserialize;

/// Response from `POST /access_token`
#[derive(Debug, Clone, Deserialize)]
pub struct AccessTokenResponse {
    /// Access token
    pub access_token: SecretString,
    /// Access token lifetime in seconds
    #[serde(default)]
    pub expires_in: Option<i64>,
    /// Refresh token
    #[serde(default)]
    pub refresh_token: Option<SecretString>,
    /// Refresh token lifetime in seconds
    #[serde(default)]
    pub refresh_token_expires_in: Option<i64>,
}

impl AccessTokenResponse {
    /// When the access token expires, given when it was issued
    pub fn expires_at(&self, issued_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.expires_in.and_then(|secs| offset(issued_at, secs))
    }

    /// When the refresh token expires, given when it was issued
    pub fn refresh_token_expires_at(&self, issued_at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.refresh_token_expires_in
            .and_then(|secs| offset(issued_at, secs))
    }
}

/// `None` when the lifetime doesn't fit in a timestamp
fn offset(issued_at: DateTime<Utc>, secs: i64) -> Option<DateTime<Utc>> {
    Duration::try_seconds(secs).and_then(|d| issued_at.checked_add_signed(d))
}
