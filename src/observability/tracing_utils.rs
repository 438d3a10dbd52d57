//! Tracing utilities for request spans.

use tracing::{span, Level, Span};

/// Create a request span with common attributes
pub fn create_request_span(method: &str, endpoint: &str) -> Span {
    span!(
        Level::INFO,
        "webex_request",
        method = %method,
        endpoint = %endpoint,
        otel.kind = "client",
        otel.status_code = tracing::field::Empty,
        http.status_code = tracing::field::Empty,
        webex.rate_limit_waits = tracing::field::Empty,
        error.message = tracing::field::Empty,
    )
}

/// Record success on a span
pub fn record_success(span: &Span, status: u16) {
    span.record("otel.status_code", "OK");
    span.record("http.status_code", status);
}

/// Record error on a span
pub fn record_error(span: &Span, error: &str) {
    span.record("otel.status_code", "ERROR");
    span.record("error.message", error);
}

/// Record how many times a request waited out a rate limit
pub fn record_rate_limit_waits(span: &Span, waits: u32) {
    span.record("webex.rate_limit_waits", waits);
}
