//! Request types for the access tokens service.

use secrecy::{ExposeSecret, SecretString};
use std::fmt;

/// OAuth grant used when requesting an access token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrantType {
    /// Exchange an authorization code
    AuthorizationCode,
    /// Exchange a refresh token
    RefreshToken,
}

impl GrantType {
    /// Wire value of the `grant_type` field
    pub fn as_str(&self) -> &'static str {
        match self {
            GrantType::AuthorizationCode => "authorization_code",
            GrantType::RefreshToken => "refresh_token",
        }
    }
}

/// Request for `POST /access_token`
#[derive(Clone)]
pub struct AccessTokenRequest {
    /// Grant type
    pub grant_type: GrantType,
    /// Client ID
    pub client_id: String,
    client_secret: SecretString,
    code: Option<SecretString>,
    /// Redirect URI (authorization-code grant only)
    pub redirect_uri: Option<String>,
    refresh_token: Option<SecretString>,
}

impl AccessTokenRequest {
    /// Create an authorization-code exchange request
    pub fn authorization_code(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        code: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Self {
        Self {
            grant_type: GrantType::AuthorizationCode,
            client_id: client_id.into(),
            client_secret: SecretString::new(client_secret.into()),
            code: Some(SecretString::new(code.into())),
            redirect_uri: Some(redirect_uri.into()),
            refresh_token: None,
        }
    }

    /// Create a refresh-token exchange request
    pub fn refresh_token(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> Self {
        Self {
            grant_type: GrantType::RefreshToken,
            client_id: client_id.into(),
            client_secret: SecretString::new(client_secret.into()),
            code: None,
            redirect_uri: None,
            refresh_token: Some(SecretString::new(refresh_token.into())),
        }
    }

    /// Form fields in the order the token endpoint documents them
    pub(crate) fn form_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("grant_type", self.grant_type.as_str().to_string()),
            ("client_id", self.client_id.clone()),
            ("client_secret", self.client_secret.expose_secret().clone()),
        ];
        if let Some(code) = &self.code {
            fields.push(("code", code.expose_secret().clone()));
        }
        if let Some(uri) = &self.redirect_uri {
            fields.push(("redirect_uri", uri.clone()));
        }
        if let Some(token) = &self.refresh_token {
            fields.push(("refresh_token", token.expose_secret().clone()));
        }
        fields
    }
}

impl fmt::Debug for AccessTokenRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessTokenRequest")
            .field("grant_type", &self.grant_type)
            .field("client_id", &self.client_id)
            .field("redirect_uri", &self.redirect_uri)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorization_code_fields() {
        let request = AccessTokenRequest::authorization_code(
            "client",
            "secret",
            "code-1",
            "https://example.test/cb",
        );
        let fields = request.form_fields();

        assert_eq!(
            fields,
            vec![
                ("grant_type", "authorization_code".to_string()),
                ("client_id", "client".to_string()),
                ("client_secret", "secret".to_string()),
                ("code", "code-1".to_string()),
                ("redirect_uri", "https://example.test/cb".to_string()),
            ]
        );
    }

    #[test]
    fn test_refresh_fields() {
        let request = AccessTokenRequest::refresh_token("client", "secret", "refresh-1");
        let fields = request.form_fields();

        assert_eq!(fields[0], ("grant_type", "refresh_token".to_string()));
        assert!(fields.contains(&("refresh_token", "refresh-1".to_string())));
        assert!(!fields.iter().any(|(k, _)| *k == "code"));
    }

    #[test]
    fn test_debug_hides_secrets() {
        let request = AccessTokenRequest::authorization_code("client", "s3cret", "c0de", "https://example.test/cb");
        let debug = format!("{:?}", request);
        assert!(!debug.contains("s3cret"));
        assert!(!debug.contains("c0de"));
    }
}
