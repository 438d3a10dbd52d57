//! Client construction and credential resolution tests.

use crate::auth::{OAuthCredentials, TokenSource};
use crate::client::{WebexClient, WebexClientImpl};
use crate::config::{WebexConfigBuilder, ACCESS_TOKEN_ENV};
use crate::errors::{AccessTokenError, ConfigurationError, NetworkError, WebexError};
use crate::mocks::{MockFailure, MockHttpTransport, MockResponse};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;
use test_case::test_case;

fn oauth() -> OAuthCredentials {
    OAuthCredentials::new("client-id", "client-secret", "auth-code", "https://example.test/cb")
        .unwrap()
}

fn token_response(token: &str) -> MockResponse {
    MockResponse::json(&json!({
        "access_token": token,
        "expires_in": 1209600,
        "refresh_token": "refresh",
        "refresh_token_expires_in": 7776000
    }))
}

#[tokio::test]
async fn test_explicit_token_wins_over_environment() {
    let transport = Arc::new(MockHttpTransport::new());
    let config = WebexConfigBuilder::from_lookup(|key: &str| {
        (key == ACCESS_TOKEN_ENV).then(|| "env-token".to_string())
    })
    .unwrap()
    .access_token("explicit-token")
    .oauth(oauth())
    .build();

    let client = WebexClientImpl::with_transport(config, transport.clone())
        .await
        .unwrap();

    assert_eq!(client.access_token(), "explicit-token");
    assert_eq!(client.token_source(), TokenSource::Argument);
    assert!(transport.recorded_requests().is_empty());
}

#[tokio::test]
async fn test_environment_token_used_without_explicit_token() {
    let transport = Arc::new(MockHttpTransport::new());
    let config = WebexConfigBuilder::new()
        .environment_token("env-token")
        .oauth(oauth())
        .build();

    let client = WebexClientImpl::with_transport(config, transport.clone())
        .await
        .unwrap();

    assert_eq!(client.access_token(), "env-token");
    assert_eq!(client.token_source(), TokenSource::Environment);
    assert!(transport.recorded_requests().is_empty());
}

#[tokio::test]
async fn test_empty_explicit_token_falls_through_to_environment() {
    let transport = Arc::new(MockHttpTransport::new());
    let config = WebexConfigBuilder::new()
        .access_token("")
        .environment_token("env-token")
        .build();

    let client = WebexClientImpl::with_transport(config, transport).await.unwrap();
    assert_eq!(client.access_token(), "env-token");
}

#[tokio::test]
async fn test_oauth_exchange_runs_exactly_once() {
    let transport = Arc::new(MockHttpTransport::new().add_response(token_response("oauth-token")));
    let config = WebexConfigBuilder::new().oauth(oauth()).build();

    let client = WebexClientImpl::with_transport(config, transport.clone())
        .await
        .unwrap();

    assert_eq!(client.access_token(), "oauth-token");
    assert_eq!(client.token_source(), TokenSource::OAuthExchange);

    let requests = transport.recorded_requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url, "https://webexapis.com/v1/access_token");
    let body = requests[0].body.clone().unwrap();
    assert!(body.contains("client_id=client-id"));
    assert!(body.contains("code=auth-code"));
    assert!(body.contains("redirect_uri=https://example.test/cb"));
}

#[tokio::test]
async fn test_empty_exchanged_token_fails() {
    let transport = Arc::new(MockHttpTransport::new().add_response(token_response("")));
    let config = WebexConfigBuilder::new().oauth(oauth()).build();

    let result = WebexClientImpl::with_transport(config, transport.clone()).await;

    assert!(matches!(
        result,
        Err(WebexError::AccessToken(AccessTokenError::EmptyExchangeToken))
    ));
    assert_eq!(transport.recorded_requests().len(), 1);
}

#[tokio::test]
async fn test_oauth_parts_complete_set_exchanges() {
    let transport = Arc::new(MockHttpTransport::new().add_response(token_response("oauth-token")));
    let config = WebexConfigBuilder::new()
        .oauth_parts(
            Some("client-id"),
            Some("client-secret"),
            Some("auth-code"),
            Some("https://example.test/cb"),
        )
        .unwrap()
        .build();

    let client = WebexClientImpl::with_transport(config, transport).await.unwrap();
    assert_eq!(client.access_token(), "oauth-token");
}

#[test_case(None, Some("secret"), Some("code"), Some("https://example.test/cb"), "client_id")]
#[test_case(Some("id"), None, Some("code"), Some("https://example.test/cb"), "client_secret")]
#[test_case(Some("id"), Some("secret"), None, Some("https://example.test/cb"), "oauth_code")]
#[test_case(Some("id"), Some("secret"), Some("code"), None, "redirect_uri")]
#[tokio::test]
async fn test_three_of_four_oauth_parts_fails_without_exchange(
    client_id: Option<&str>,
    client_secret: Option<&str>,
    oauth_code: Option<&str>,
    redirect_uri: Option<&str>,
    missing_field: &str,
) {
    let transport = Arc::new(MockHttpTransport::new().add_response(token_response("unused")));
    let config = WebexConfigBuilder::new()
        .oauth_parts(client_id, client_secret, oauth_code, redirect_uri)
        .unwrap()
        .build();

    let result = WebexClientImpl::with_transport(config, transport.clone()).await;

    match result {
        Err(WebexError::AccessToken(AccessTokenError::IncompleteOAuth { missing })) => {
            assert_eq!(missing, vec![missing_field]);
        }
        other => panic!("expected incomplete OAuth error, got {:?}", other.map(|_| ())),
    }
    assert!(transport.recorded_requests().is_empty());
}

#[tokio::test]
async fn test_partial_oauth_ignored_when_token_present() {
    let transport = Arc::new(MockHttpTransport::new());
    let config = WebexConfigBuilder::new()
        .oauth_parts(Some("id"), None, None, None)
        .unwrap()
        .environment_token("env-token")
        .build();

    let client = WebexClientImpl::with_transport(config, transport).await.unwrap();
    assert_eq!(client.access_token(), "env-token");
}

#[tokio::test]
async fn test_no_credentials_fails() {
    let transport = Arc::new(MockHttpTransport::new());
    let config = WebexConfigBuilder::from_lookup(|_| None).unwrap().build();

    let result = WebexClientImpl::with_transport(config, transport.clone()).await;

    assert!(matches!(
        result,
        Err(WebexError::AccessToken(AccessTokenError::Missing))
    ));
    assert!(transport.recorded_requests().is_empty());
}

#[tokio::test]
async fn test_exchange_failure_is_transport_error() {
    let transport = Arc::new(
        MockHttpTransport::new()
            .add_response(MockResponse::failure(MockFailure::ConnectionFailed(
                "connection refused".to_string(),
            ))),
    );
    let config = WebexConfigBuilder::new().oauth(oauth()).build();

    let err = WebexClientImpl::with_transport(config, transport)
        .await
        .err()
        .unwrap();

    assert!(matches!(
        err,
        WebexError::Network(NetworkError::ConnectionFailed { .. })
    ));
    assert!(err.is_transport());
}

#[tokio::test]
async fn test_exchange_rejection_is_api_error() {
    let transport = Arc::new(MockHttpTransport::new().add_response(MockResponse::status(
        401,
        &json!({"message": "Authentication failed", "trackingId": "ATK_9"}),
    )));
    let config = WebexConfigBuilder::new().oauth(oauth()).build();

    let err = WebexClientImpl::with_transport(config, transport)
        .await
        .err()
        .unwrap();

    assert!(matches!(err, WebexError::Api { status: 401, .. }));
    assert!(!matches!(err, WebexError::AccessToken(_)));
}

#[tokio::test]
async fn test_properties_reflect_defaults() {
    let config = WebexConfigBuilder::new().access_token("token").build();
    let client = WebexClientImpl::with_transport(config, Arc::new(MockHttpTransport::new()))
        .await
        .unwrap();

    assert_eq!(client.base_url().as_str(), crate::DEFAULT_BASE_URL);
    assert_eq!(
        client.single_request_timeout(),
        crate::DEFAULT_SINGLE_REQUEST_TIMEOUT
    );
    assert_eq!(client.wait_on_rate_limit(), crate::DEFAULT_WAIT_ON_RATE_LIMIT);
}

#[tokio::test]
async fn test_properties_reflect_explicit_values() {
    let config = WebexConfigBuilder::new()
        .access_token("token")
        .base_url("https://webex.example.test/v1/")
        .unwrap()
        .single_request_timeout(5)
        .unwrap()
        .wait_on_rate_limit(false)
        .build();
    let client = WebexClientImpl::with_transport(config, Arc::new(MockHttpTransport::new()))
        .await
        .unwrap();

    assert_eq!(client.base_url().as_str(), "https://webex.example.test/v1/");
    assert_eq!(client.single_request_timeout(), 5);
    assert!(!client.wait_on_rate_limit());
}

#[tokio::test]
async fn test_oauth_exchange_uses_configured_base_url() {
    let transport = Arc::new(MockHttpTransport::new().add_response(token_response("oauth-token")));
    let config = WebexConfigBuilder::new()
        .base_url("https://webex.example.test/v1")
        .unwrap()
        .oauth(oauth())
        .build();

    WebexClientImpl::with_transport(config, transport.clone())
        .await
        .unwrap();

    assert_eq!(
        transport.last_request().unwrap().url,
        "https://webex.example.test/v1/access_token"
    );
}

#[test]
fn test_invalid_arguments_fail_before_resolution() {
    let err = WebexConfigBuilder::new()
        .access_token("token")
        .single_request_timeout(0)
        .err()
        .unwrap();
    assert!(matches!(
        err,
        ConfigurationError::InvalidArgument {
            argument: "single_request_timeout",
            ..
        }
    ));

    let err = WebexConfigBuilder::new()
        .oauth_parts(Some("id"), Some("secret"), Some("code"), Some("not a uri"))
        .err()
        .unwrap();
    assert_eq!(err.argument(), Some("redirect_uri"));
}

#[tokio::test]
async fn test_handles_share_one_session() {
    let transport = Arc::new(
        MockHttpTransport::new().with_default_response(MockResponse::json(&json!({"items": []}))),
    );
    let config = WebexConfigBuilder::new().access_token("shared-token").build();
    let client = WebexClientImpl::with_transport(config, transport.clone())
        .await
        .unwrap();

    for handle in client.handles() {
        assert!(Arc::ptr_eq(handle.session(), client.session()));
    }

    client.rooms().list(Vec::<(String, String)>::new()).await.unwrap();
    client.teams().list(Vec::<(String, String)>::new()).await.unwrap();

    let requests = transport.recorded_requests();
    assert_eq!(requests.len(), 2);
    for request in requests {
        assert_eq!(request.header("authorization"), Some("Bearer shared-token"));
    }
}
