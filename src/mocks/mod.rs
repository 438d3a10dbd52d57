//! Mock implementations for testing.
//!
//! Provides a mock transport that replays queued responses and records
//! every request it receives.

use crate::errors::{NetworkError, ResponseError, WebexError, WebexResult};
use crate::transport::{HttpRequest, HttpResponse, HttpTransport, RequestBody};
use async_trait::async_trait;
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;

/// Transport failure a mock response can simulate
#[derive(Debug, Clone)]
pub enum MockFailure {
    /// Request timed out
    Timeout,
    /// Connection could not be established
    ConnectionFailed(String),
}

impl From<MockFailure> for WebexError {
    fn from(failure: MockFailure) -> Self {
        match failure {
            MockFailure::Timeout => WebexError::Network(NetworkError::Timeout),
            MockFailure::ConnectionFailed(message) => {
                WebexError::Network(NetworkError::ConnectionFailed { message })
            }
        }
    }
}

/// Mock response configuration
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// Response body
    pub body: String,
    /// HTTP status code
    pub status: u16,
    /// Response headers
    pub headers: Vec<(String, String)>,
    /// Delay before response
    pub delay_ms: Option<u64>,
    /// Failure to return instead of a response
    pub failure: Option<MockFailure>,
}

impl MockResponse {
    /// Create a successful JSON response
    pub fn json<T: Serialize>(data: &T) -> Self {
        Self::ok(serde_json::to_string(data).unwrap_or_default())
    }

    /// Create a successful response with raw body
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            status: 200,
            headers: Vec::new(),
            delay_ms: None,
            failure: None,
        }
    }

    /// Create a response with the given status and JSON body
    pub fn status<T: Serialize>(status: u16, data: &T) -> Self {
        Self {
            status,
            ..Self::json(data)
        }
    }

    /// Create a transport failure
    pub fn failure(failure: MockFailure) -> Self {
        Self {
            body: String::new(),
            status: 0,
            headers: Vec::new(),
            delay_ms: None,
            failure: Some(failure),
        }
    }

    /// Create a 429 response carrying a `Retry-After` header
    pub fn rate_limited(retry_after: u64) -> Self {
        Self {
            body: r#"{"message":"Too Many Requests"}"#.to_string(),
            status: 429,
            headers: vec![("retry-after".to_string(), retry_after.to_string())],
            delay_ms: None,
            failure: None,
        }
    }

    /// Add a response header
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Add delay to response
    pub fn with_delay(mut self, ms: u64) -> Self {
        self.delay_ms = Some(ms);
        self
    }
}

/// Recorded request for verification
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Request URL, without the query string
    pub url: String,
    /// Query parameters
    pub query: Vec<(String, String)>,
    /// Request method
    pub method: String,
    /// Request body, JSON or `k=v&k=v` for forms
    pub body: Option<String>,
    /// Request headers
    pub headers: Vec<(String, String)>,
}

impl RecordedRequest {
    /// Look up a header by (lowercase) name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Mock HTTP transport for testing
pub struct MockHttpTransport {
    /// Queue of responses to return
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    /// Recorded requests
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    /// Default response if queue is empty
    default_response: Option<MockResponse>,
}

impl MockHttpTransport {
    /// Create a new mock transport
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(VecDeque::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
            default_response: None,
        }
    }

    /// Add a response to the queue
    pub fn add_response(self, response: MockResponse) -> Self {
        self.responses.lock().push_back(response);
        self
    }

    /// Add a JSON response
    pub fn add_json_response<T: Serialize>(self, data: &T) -> Self {
        self.add_response(MockResponse::json(data))
    }

    /// Set default response when queue is empty
    pub fn with_default_response(mut self, response: MockResponse) -> Self {
        self.default_response = Some(response);
        self
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    /// Get the last recorded request
    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.requests.lock().last().cloned()
    }

    /// Get remaining response count
    pub fn remaining_responses(&self) -> usize {
        self.responses.lock().len()
    }

    fn record_request(&self, request: &HttpRequest) {
        let headers = request
            .headers
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_string()))
            .collect();

        let body = match &request.body {
            RequestBody::Empty => None,
            RequestBody::Json(value) => Some(value.to_string()),
            RequestBody::Form(fields) => Some(
                fields
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, v))
                    .collect::<Vec<_>>()
                    .join("&"),
            ),
        };

        self.requests.lock().push(RecordedRequest {
            url: request.url.clone(),
            query: request.query.clone(),
            method: request.method.to_string(),
            body,
            headers,
        });
    }

    fn next_response(&self) -> Option<MockResponse> {
        let mut queue = self.responses.lock();
        queue.pop_front().or_else(|| self.default_response.clone())
    }
}

impl Default for MockHttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HttpTransport for MockHttpTransport {
    async fn send(&self, request: HttpRequest) -> WebexResult<HttpResponse> {
        self.record_request(&request);

        let response = self.next_response().ok_or_else(|| {
            WebexError::Response(ResponseError::UnexpectedResponse {
                message: "No mock response configured".to_string(),
            })
        })?;

        if let Some(delay) = response.delay_ms {
            tokio::time::sleep(std::time::Duration::from_millis(delay)).await;
        }

        if let Some(failure) = response.failure {
            return Err(failure.into());
        }

        let status = StatusCode::from_u16(response.status).map_err(|e| {
            WebexError::Response(ResponseError::UnexpectedResponse {
                message: e.to_string(),
            })
        })?;

        let mut headers = HeaderMap::new();
        for (name, value) in &response.headers {
            if let (Ok(name), Ok(value)) = (
                name.parse::<HeaderName>(),
                HeaderValue::from_str(value),
            ) {
                headers.insert(name, value);
            }
        }

        Ok(HttpResponse::new(status, headers, response.body))
    }
}

impl std::fmt::Debug for MockHttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockHttpTransport")
            .field("pending_responses", &self.responses.lock().len())
            .field("recorded_requests", &self.requests.lock().len())
            .finish()
    }
}
