//! Logging utilities with sensitive data redaction.

use std::fmt;

/// Wrapper for sensitive data that redacts on display
#[derive(Clone)]
pub struct Redacted<T>(T);

impl<T> Redacted<T> {
    /// Create a new redacted value
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Get the inner value (use sparingly)
    pub fn expose(&self) -> &T {
        &self.0
    }
}

impl<T> fmt::Debug for Redacted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl<T> fmt::Display for Redacted<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

/// Redact an access token, keeping the last four characters so two tokens
/// can be told apart in logs
pub fn redact_token(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 12 {
        "[REDACTED]".to_string()
    } else {
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("[REDACTED]...{}", tail)
    }
}

/// Redact a URL, hiding credentials in userinfo and sensitive query
/// parameters
pub fn redact_url(url: &str) -> String {
    let Ok(mut parsed) = url::Url::parse(url) else {
        return url.to_string();
    };

    if parsed.password().is_some() {
        let _ = parsed.set_password(Some("[REDACTED]"));
    }

    let sensitive = ["access_token", "token", "code", "client_secret", "refresh_token"];
    let pairs: Vec<(String, String)> = parsed
        .query_pairs()
        .map(|(k, v)| {
            if sensitive.iter().any(|s| k.eq_ignore_ascii_case(s)) {
                (k.into_owned(), "[REDACTED]".to_string())
            } else {
                (k.into_owned(), v.into_owned())
            }
        })
        .collect();

    if !pairs.is_empty() {
        parsed.query_pairs_mut().clear().extend_pairs(pairs);
    }

    parsed.to_string()
}
