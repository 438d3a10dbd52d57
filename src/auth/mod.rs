//! Authentication management for the Webex client.
//!
//! Handles credential resolution (explicit token, environment token, OAuth
//! code exchange) and authorization headers.

use crate::errors::{AccessTokenError, ConfigurationError, WebexError, WebexResult};
use crate::observability::{redact_token, Redacted};
use crate::services::access_tokens::{AccessTokenRequest, AccessTokensServiceTrait};
use http::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use url::Url;

/// OAuth parameters needed to exchange an authorization code for an
/// access token. Present or absent as a whole.
#[derive(Clone)]
pub struct OAuthCredentials {
    client_id: String,
    client_secret: SecretString,
    code: SecretString,
    redirect_uri: String,
}

impl OAuthCredentials {
    /// Create OAuth credentials, validating every field
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        code: impl Into<String>,
        redirect_uri: impl Into<String>,
    ) -> Result<Self, ConfigurationError> {
        let client_id = required("client_id", client_id.into())?;
        let client_secret = required("client_secret", client_secret.into())?;
        let code = required("oauth_code", code.into())?;
        let redirect_uri = required("redirect_uri", redirect_uri.into())?;

        Url::parse(&redirect_uri).map_err(|e| {
            ConfigurationError::invalid("redirect_uri", format!("invalid URL: {}", e))
        })?;

        Ok(Self {
            client_id,
            client_secret: SecretString::new(client_secret),
            code: SecretString::new(code),
            redirect_uri,
        })
    }

    /// The integration's client ID
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// The redirect URI used in the authorization step
    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    pub(crate) fn to_request(&self) -> AccessTokenRequest {
        AccessTokenRequest::authorization_code(
            &self.client_id,
            self.client_secret.expose_secret(),
            self.code.expose_secret(),
            &self.redirect_uri,
        )
    }
}

impl fmt::Debug for OAuthCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &Redacted::new(&self.client_secret))
            .field("code", &Redacted::new(&self.code))
            .field("redirect_uri", &self.redirect_uri)
            .finish()
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

fn required(argument: &'static str, value: String) -> Result<String, ConfigurationError> {
    if value.is_empty() {
        Err(ConfigurationError::invalid(argument, "must not be empty"))
    } else {
        Ok(value)
    }
}

/// OAuth parameters as supplied by the caller
#[derive(Debug, Clone)]
pub enum OAuthParameters {
    /// All four parameters were supplied
    Complete(OAuthCredentials),
    /// Only some were supplied; the exchange can't be attempted
    Incomplete {
        /// Names of the parameters that were not supplied
        missing: Vec<&'static str>,
    },
}

impl OAuthParameters {
    /// Assemble OAuth parameters from four independently optional parts.
    ///
    /// Empty strings count as absent. Returns `None` when nothing was
    /// supplied.
    pub fn from_parts(
        client_id: Option<&str>,
        client_secret: Option<&str>,
        oauth_code: Option<&str>,
        redirect_uri: Option<&str>,
    ) -> Result<Option<Self>, ConfigurationError> {
        let parts = [
            ("client_id", present(client_id)),
            ("client_secret", present(client_secret)),
            ("oauth_code", present(oauth_code)),
            ("redirect_uri", present(redirect_uri)),
        ];

        let missing: Vec<&'static str> = parts
            .iter()
            .filter(|(_, v)| v.is_none())
            .map(|(name, _)| *name)
            .collect();

        match (parts, missing.len()) {
            (_, 4) => Ok(None),
            ([(_, Some(id)), (_, Some(secret)), (_, Some(code)), (_, Some(uri))], 0) => Ok(Some(
                OAuthParameters::Complete(OAuthCredentials::new(id, secret, code, uri)?),
            )),
            _ => Ok(Some(OAuthParameters::Incomplete { missing })),
        }
    }
}

/// Every place an access token may come from, before resolution
#[derive(Clone, Default)]
pub struct CredentialSources {
    pub(crate) access_token: Option<SecretString>,
    pub(crate) environment_token: Option<SecretString>,
    pub(crate) oauth: Option<OAuthParameters>,
}

impl fmt::Debug for CredentialSources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialSources")
            .field("access_token", &self.access_token.is_some())
            .field("environment_token", &self.environment_token.is_some())
            .field("oauth", &self.oauth)
            .finish()
    }
}

/// Where a resolved access token came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenSource {
    /// The explicit `access_token` argument
    Argument,
    /// The environment token
    Environment,
    /// An OAuth authorization-code exchange
    OAuthExchange,
}

/// An access token together with its source
#[derive(Clone)]
pub struct ResolvedToken {
    token: SecretString,
    source: TokenSource,
}

impl ResolvedToken {
    /// Where the token came from
    pub fn source(&self) -> TokenSource {
        self.source
    }

    /// The token itself
    pub fn secret(&self) -> &SecretString {
        &self.token
    }
}

impl fmt::Debug for ResolvedToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ResolvedToken({:?}, {})",
            self.source,
            redact_token(self.token.expose_secret())
        )
    }
}

/// Picks the single access token a client will use.
///
/// Precedence, highest first: explicit argument, environment token, OAuth
/// exchange. The OAuth exchange runs only when neither token is present.
#[derive(Debug)]
pub struct CredentialResolver<'a> {
    sources: &'a CredentialSources,
}

impl<'a> CredentialResolver<'a> {
    /// Create a resolver over the given sources
    pub fn new(sources: &'a CredentialSources) -> Self {
        Self { sources }
    }

    /// Resolve the access token, calling the exchanger at most once
    #[instrument(skip_all)]
    pub async fn resolve(
        &self,
        exchanger: &dyn AccessTokensServiceTrait,
    ) -> WebexResult<ResolvedToken> {
        if let Some(token) = &self.sources.access_token {
            debug!("Using access token from argument");
            return Ok(ResolvedToken {
                token: token.clone(),
                source: TokenSource::Argument,
            });
        }

        if let Some(token) = &self.sources.environment_token {
            debug!("Using access token from environment");
            return Ok(ResolvedToken {
                token: token.clone(),
                source: TokenSource::Environment,
            });
        }

        match &self.sources.oauth {
            Some(OAuthParameters::Complete(credentials)) => {
                info!(client_id = %credentials.client_id(), "Exchanging OAuth code for access token");
                let response = exchanger.get(credentials.to_request()).await?;
                if response.access_token.expose_secret().is_empty() {
                    return Err(WebexError::AccessToken(AccessTokenError::EmptyExchangeToken));
                }
                Ok(ResolvedToken {
                    token: response.access_token,
                    source: TokenSource::OAuthExchange,
                })
            }
            Some(OAuthParameters::Incomplete { missing }) => {
                Err(WebexError::AccessToken(AccessTokenError::IncompleteOAuth {
                    missing: missing.clone(),
                }))
            }
            None => Err(WebexError::AccessToken(AccessTokenError::Missing)),
        }
    }
}

/// Builds authorization headers for API requests
#[derive(Clone)]
pub struct AuthManager {
    token: Arc<SecretString>,
}

impl AuthManager {
    /// Create a new authentication manager
    pub fn new(token: SecretString) -> Self {
        Self {
            token: Arc::new(token),
        }
    }

    /// The access token
    pub fn access_token(&self) -> &str {
        self.token.expose_secret()
    }

    /// Get headers for an authenticated JSON request
    pub fn get_headers(&self) -> WebexResult<HeaderMap> {
        let mut headers = HeaderMap::new();

        let auth_value = format!("Bearer {}", self.token.expose_secret());
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&auth_value).map_err(|_| {
                ConfigurationError::invalid("access_token", "contains characters not allowed in a header")
            })?,
        );
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/json;charset=utf-8"),
        );

        Ok(headers)
    }
}

impl fmt::Debug for AuthManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthManager")
            .field("token", &redact_token(self.token.expose_secret()))
            .finish()
    }
}
