//! Access tokens service implementation.

use super::*;
use crate::config::SessionConfig;
use crate::errors::WebexResult;
use crate::transport::{HttpRequest, HttpTransport};
use async_trait::async_trait;
use http::HeaderMap;
use std::sync::Arc;
use tracing::instrument;

/// Trait for access token operations
#[async_trait]
pub trait AccessTokensServiceTrait: Send + Sync {
    /// Exchange an authorization code (or any prepared grant) for tokens
    async fn get(&self, request: AccessTokenRequest) -> WebexResult<AccessTokenResponse>;

    /// Exchange a refresh token for a new access token
    async fn refresh(
        &self,
        client_id: &str,
        client_secret: &str,
        refresh_token: &str,
    ) -> WebexResult<AccessTokenResponse> {
        self.get(AccessTokenRequest::refresh_token(
            client_id,
            client_secret,
            refresh_token,
        ))
        .await
    }
}

/// Access tokens service implementation.
///
/// Does not need an access token, so it is built before credentials are
/// resolved and used by the resolver for the OAuth exchange.
#[derive(Clone)]
pub struct AccessTokensService {
    transport: Arc<dyn HttpTransport>,
    config: Arc<SessionConfig>,
}

impl AccessTokensService {
    /// Create a new access tokens service
    pub fn new(transport: Arc<dyn HttpTransport>, config: Arc<SessionConfig>) -> Self {
        Self { transport, config }
    }
}

#[async_trait]
impl AccessTokensServiceTrait for AccessTokensService {
    #[instrument(skip(self, request), fields(client_id = %request.client_id, grant_type = request.grant_type.as_str()))]
    async fn get(&self, request: AccessTokenRequest) -> WebexResult<AccessTokenResponse> {
        let url = self.config.build_url("access_token");

        let http_request = request
            .form_fields()
            .into_iter()
            .fold(HttpRequest::post_form(url, HeaderMap::new()), |req, (k, v)| {
                req.field(k, v)
            })
            .with_timeout(self.config.timeout());

        self.transport
            .send(http_request)
            .await?
            .error_for_status()?
            .json()
    }
}

impl std::fmt::Debug for AccessTokensService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessTokensService")
            .field("base_url", &self.config.base_url().as_str())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{NetworkError, WebexError};
    use crate::mocks::{MockFailure, MockHttpTransport, MockResponse};
    use secrecy::ExposeSecret;
    use serde_json::json;

    fn service(transport: Arc<MockHttpTransport>) -> AccessTokensService {
        AccessTokensService::new(transport, Arc::new(SessionConfig::default()))
    }

    #[tokio::test]
    async fn test_get_posts_form_without_auth() {
        let transport = Arc::new(
            MockHttpTransport::new().add_json_response(&json!({"access_token": "new-token"})),
        );

        let response = service(transport.clone())
            .get(AccessTokenRequest::authorization_code(
                "client",
                "secret",
                "code-1",
                "https://example.test/cb",
            ))
            .await
            .unwrap();

        assert_eq!(response.access_token.expose_secret(), "new-token");

        let request = transport.last_request().unwrap();
        assert_eq!(request.url, "https://webexapis.com/v1/access_token");
        assert_eq!(request.method, "POST");
        assert!(request.header("authorization").is_none());
        assert_eq!(
            request.body.as_deref(),
            Some("grant_type=authorization_code&client_id=client&client_secret=secret&code=code-1&redirect_uri=https://example.test/cb")
        );
    }

    #[tokio::test]
    async fn test_refresh() {
        let transport = Arc::new(MockHttpTransport::new().add_json_response(&json!({
            "access_token": "refreshed",
            "expires_in": 1209600
        })));

        let response = service(transport.clone())
            .refresh("client", "secret", "refresh-1")
            .await
            .unwrap();

        assert_eq!(response.access_token.expose_secret(), "refreshed");
        assert!(transport
            .last_request()
            .unwrap()
            .body
            .unwrap()
            .contains("grant_type=refresh_token"));
    }

    #[tokio::test]
    async fn test_rejected_code_is_api_error() {
        let transport = Arc::new(MockHttpTransport::new().add_response(MockResponse::status(
            400,
            &json!({"message": "Invalid authorization code", "trackingId": "ATK_1"}),
        )));

        let result = service(transport)
            .get(AccessTokenRequest::authorization_code("c", "s", "bad", "https://example.test/cb"))
            .await;

        assert!(matches!(result, Err(WebexError::Api { status: 400, .. })));
    }

    #[tokio::test]
    async fn test_network_failure_propagates() {
        let transport = Arc::new(
            MockHttpTransport::new().add_response(MockResponse::failure(MockFailure::Timeout)),
        );

        let result = service(transport)
            .get(AccessTokenRequest::authorization_code("c", "s", "code", "https://example.test/cb"))
            .await;

        assert!(matches!(result, Err(WebexError::Network(NetworkError::Timeout))));
    }

    #[tokio::test]
    async fn test_malformed_body_is_response_error() {
        let transport = Arc::new(MockHttpTransport::new().add_response(MockResponse::ok("<html>")));

        let result = service(transport)
            .get(AccessTokenRequest::authorization_code("c", "s", "code", "https://example.test/cb"))
            .await;

        assert!(matches!(result, Err(WebexError::Response(_))));
    }
}
