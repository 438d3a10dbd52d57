//! HTTP transport layer for the Webex client.
//!
//! Provides low-level HTTP communication with the Webex API. The transport
//! only moves bytes; status handling and rate-limit waiting belong to the
//! session.

use crate::config::{ProxyScheme, SessionConfig};
use crate::observability::redact_url;
use crate::errors::{
    ConfigurationError, NetworkError, RateLimitError, ResponseError, WebexError, WebexResult,
};
use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderMap, Method, StatusCode};
use reqwest::{Client, ClientBuilder, Proxy};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Wait applied to a 429 that carries no usable `Retry-After` header
pub const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(15);

/// HTTP transport trait for making API requests
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send a request and return the raw response
    async fn send(&self, request: HttpRequest) -> WebexResult<HttpResponse>;
}

/// Request body variants
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// No body
    Empty,
    /// JSON body
    Json(serde_json::Value),
    /// Form-encoded body
    Form(Vec<(String, String)>),
}

/// Transport-level request
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method
    pub method: Method,
    /// Absolute URL
    pub url: String,
    /// Query parameters
    pub query: Vec<(String, String)>,
    /// Request headers
    pub headers: HeaderMap,
    /// Request body
    pub body: RequestBody,
    /// Request timeout
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    /// Create a new request with no body
    pub fn new(method: Method, url: impl Into<String>, headers: HeaderMap) -> Self {
        Self {
            method,
            url: url.into(),
            query: Vec::new(),
            headers,
            body: RequestBody::Empty,
            timeout: None,
        }
    }

    /// Create a new GET request
    pub fn get(url: impl Into<String>, headers: HeaderMap) -> Self {
        Self::new(Method::GET, url, headers)
    }

    /// Create a new form POST request
    pub fn post_form(url: impl Into<String>, headers: HeaderMap) -> Self {
        Self {
            body: RequestBody::Form(Vec::new()),
            ..Self::new(Method::POST, url, headers)
        }
    }

    /// Add a form field. Turns the body into a form if it wasn't one.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let pair = (name.into(), value.into());
        match &mut self.body {
            RequestBody::Form(fields) => fields.push(pair),
            _ => self.body = RequestBody::Form(vec![pair]),
        }
        self
    }

    /// Set a JSON body
    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    /// Add query parameters
    pub fn query<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.query
            .extend(params.into_iter().map(|(k, v)| (k.into(), v.into())));
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Transport-level response
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Response body
    pub body: Bytes,
}

impl HttpResponse {
    /// Create a response
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Wait requested by a `Retry-After` header, or the default
    pub fn retry_after(&self) -> Duration {
        self.headers
            .get(http::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_RETRY_AFTER)
    }

    /// Turn 429 and other non-success statuses into errors
    pub fn error_for_status(self) -> WebexResult<Self> {
        if self.status == StatusCode::TOO_MANY_REQUESTS {
            return Err(WebexError::RateLimit(RateLimitError::RateLimited {
                retry_after: self.retry_after(),
            }));
        }

        if !self.status.is_success() {
            warn!(status = %self.status, "Request failed with non-success status");
            let body = String::from_utf8_lossy(&self.body);
            return Err(WebexError::from_response(self.status.as_u16(), &body));
        }

        Ok(self)
    }

    /// Deserialize the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> WebexResult<T> {
        serde_json::from_slice(&self.body)
            .map_err(|e| WebexError::Response(ResponseError::from(e)))
    }
}

/// Default HTTP transport implementation using reqwest
pub struct ReqwestTransport {
    client: Client,
    default_timeout: Duration,
}

impl ReqwestTransport {
    /// Create a transport honouring the session's timeout and proxies
    pub fn new(session: &SessionConfig) -> WebexResult<Self> {
        let mut builder = ClientBuilder::new()
            .timeout(session.timeout())
            .pool_max_idle_per_host(10);

        for (scheme, url) in session.proxies() {
            let proxy = match scheme {
                ProxyScheme::Http => Proxy::http(url.as_str()),
                ProxyScheme::Https => Proxy::https(url.as_str()),
                ProxyScheme::All => Proxy::all(url.as_str()),
            }
            .map_err(|e| ConfigurationError::invalid("proxies", e.to_string()))?;
            builder = builder.proxy(proxy);
        }

        let client = builder
            .build()
            .map_err(|e| ConfigurationError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            default_timeout: session.timeout(),
        })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    #[instrument(skip(self, request), fields(method = %request.method, url = %redact_url(&request.url)))]
    async fn send(&self, request: HttpRequest) -> WebexResult<HttpResponse> {
        let timeout = request.timeout.unwrap_or(self.default_timeout);

        let mut req_builder = self
            .client
            .request(request.method, &request.url)
            .headers(request.headers)
            .timeout(timeout);

        if !request.query.is_empty() {
            req_builder = req_builder.query(&request.query);
        }

        req_builder = match request.body {
            RequestBody::Empty => req_builder,
            RequestBody::Json(body) => req_builder.json(&body),
            RequestBody::Form(fields) => req_builder.form(&fields),
        };

        let response = req_builder
            .send()
            .await
            .map_err(|e| WebexError::Network(NetworkError::from(e)))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| WebexError::Network(NetworkError::from(e)))?;

        debug!(status = %status, bytes = body.len(), "Received response");

        Ok(HttpResponse::new(status, headers, body))
    }
}

impl std::fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestTransport")
            .field("default_timeout", &self.default_timeout)
            .finish()
    }
}
