//! Shared request session.
//!
//! One [`RestSession`] is created per client. It owns the resolved access
//! token, the immutable [`SessionConfig`] and the transport, and every
//! resource handle sends its requests through it.

use crate::auth::AuthManager;
use crate::config::SessionConfig;
use crate::errors::WebexResult;
use crate::observability::{
    create_request_span, record_error, record_rate_limit_waits, record_success,
};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport};
use http::{Method, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tracing::{warn, Instrument};

/// Authenticated request session shared by all resource handles
pub struct RestSession {
    config: Arc<SessionConfig>,
    auth: AuthManager,
    transport: Arc<dyn HttpTransport>,
}

impl RestSession {
    /// Create a new session
    pub fn new(
        config: Arc<SessionConfig>,
        auth: AuthManager,
        transport: Arc<dyn HttpTransport>,
    ) -> Self {
        Self {
            config,
            auth,
            transport,
        }
    }

    /// The access token used for API calls
    pub fn access_token(&self) -> &str {
        self.auth.access_token()
    }

    /// Session settings
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Build the full URL for an endpoint
    pub fn build_url(&self, endpoint: &str) -> String {
        self.config.build_url(endpoint)
    }

    /// Send an authenticated request.
    ///
    /// When `wait_on_rate_limit` is set, a 429 response is waited out for
    /// its `Retry-After` and the request re-sent. Without a
    /// `max_rate_limit_waits` cap this repeats for as long as the server
    /// keeps answering 429. Once the cap is reached, when waiting is off,
    /// and for every other non-success status, an error is returned.
    pub async fn request(
        &self,
        method: Method,
        endpoint: &str,
        query: Vec<(String, String)>,
        body: Option<serde_json::Value>,
    ) -> WebexResult<HttpResponse> {
        let span = create_request_span(method.as_str(), endpoint);
        let mut request = HttpRequest::new(method, self.build_url(endpoint), self.auth.get_headers()?)
            .query(query)
            .with_timeout(self.config.timeout());
        if let Some(body) = body {
            request = request.json(body);
        }

        async {
            let mut waits = 0u32;
            loop {
                let response = match self.transport.send(request.clone()).await {
                    Ok(response) => response,
                    Err(e) => {
                        record_error(&span, &e.to_string());
                        return Err(e);
                    }
                };

                if response.status == StatusCode::TOO_MANY_REQUESTS
                    && self.config.wait_on_rate_limit()
                    && self
                        .config
                        .max_rate_limit_waits()
                        .map_or(true, |max| waits < max)
                {
                    let wait = response.retry_after();
                    waits += 1;
                    record_rate_limit_waits(&span, waits);
                    warn!(retry_after = ?wait, attempt = waits, "Rate limited, waiting before resending");
                    tokio::time::sleep(wait).await;
                    continue;
                }

                return match response.error_for_status() {
                    Ok(response) => {
                        record_success(&span, response.status.as_u16());
                        Ok(response)
                    }
                    Err(e) => {
                        record_error(&span, &e.to_string());
                        Err(e)
                    }
                };
            }
        }
        .instrument(span.clone())
        .await
    }

    /// GET an endpoint and deserialize the JSON body
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: Vec<(String, String)>,
    ) -> WebexResult<T> {
        self.request(Method::GET, endpoint, query, None).await?.json()
    }

    /// DELETE an endpoint, discarding the body
    pub async fn delete(&self, endpoint: &str) -> WebexResult<()> {
        self.request(Method::DELETE, endpoint, Vec::new(), None)
            .await
            .map(|_| ())
    }
}

impl std::fmt::Debug for RestSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestSession")
            .field("config", &self.config)
            .field("auth", &self.auth)
            .finish()
    }
}
