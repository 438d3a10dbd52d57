//! Webex client implementation.
//!
//! Provides the main entry point for interacting with Webex APIs. Building
//! a client resolves the access token, creates the shared session and
//! creates one handle per resource category, all or nothing.

use crate::auth::{AuthManager, CredentialResolver, TokenSource};
use crate::config::{SessionConfig, WebexConfig};
use crate::errors::WebexResult;
use crate::services::{
    AccessTokensService, AccessTokensServiceTrait, ResourceCategory, ResourceClient,
};
use crate::session::RestSession;
use crate::transport::{HttpTransport, ReqwestTransport};
use std::sync::Arc;
use tracing::info;
use url::Url;

/// Trait defining the Webex client interface
pub trait WebexClient: Send + Sync {
    /// The access token used for API calls
    fn access_token(&self) -> &str;

    /// The base URL prefixed to every endpoint
    fn base_url(&self) -> &Url;

    /// Timeout in seconds for a single HTTP request
    fn single_request_timeout(&self) -> u64;

    /// Whether requests wait out rate limits
    fn wait_on_rate_limit(&self) -> bool;

    /// Get the access tokens service
    fn access_tokens(&self) -> &dyn AccessTokensServiceTrait;

    /// Get the people handle
    fn people(&self) -> &ResourceClient;

    /// Get the rooms handle
    fn rooms(&self) -> &ResourceClient;

    /// Get the memberships handle
    fn memberships(&self) -> &ResourceClient;

    /// Get the messages handle
    fn messages(&self) -> &ResourceClient;

    /// Get the teams handle
    fn teams(&self) -> &ResourceClient;

    /// Get the team memberships handle
    fn team_memberships(&self) -> &ResourceClient;

    /// Get the webhooks handle
    fn webhooks(&self) -> &ResourceClient;

    /// Get the organizations handle
    fn organizations(&self) -> &ResourceClient;

    /// Get the licenses handle
    fn licenses(&self) -> &ResourceClient;

    /// Get the roles handle
    fn roles(&self) -> &ResourceClient;

    /// Get the events handle
    fn events(&self) -> &ResourceClient;

    /// Get the guest issuer handle
    fn guest_issuer(&self) -> &ResourceClient;
}

/// Main Webex client implementation
#[derive(Clone)]
pub struct WebexClientImpl {
    session: Arc<RestSession>,
    token_source: TokenSource,
    access_tokens_service: AccessTokensService,
    people: ResourceClient,
    rooms: ResourceClient,
    memberships: ResourceClient,
    messages: ResourceClient,
    teams: ResourceClient,
    team_memberships: ResourceClient,
    webhooks: ResourceClient,
    organizations: ResourceClient,
    licenses: ResourceClient,
    roles: ResourceClient,
    events: ResourceClient,
    guest_issuer: ResourceClient,
}

impl WebexClientImpl {
    /// Create a new Webex client with the given configuration
    pub async fn new(config: WebexConfig) -> WebexResult<Self> {
        let transport = Arc::new(ReqwestTransport::new(&config.session)?);
        Self::with_transport(config, transport).await
    }

    /// Create a new Webex client with a custom transport
    pub async fn with_transport(
        config: WebexConfig,
        transport: Arc<dyn HttpTransport>,
    ) -> WebexResult<Self> {
        let WebexConfig {
            credentials,
            session: session_config,
        } = config;
        let session_config = Arc::new(session_config);

        // Needs no token, so it can serve the OAuth exchange
        let access_tokens_service =
            AccessTokensService::new(transport.clone(), session_config.clone());

        let resolved = CredentialResolver::new(&credentials)
            .resolve(&access_tokens_service)
            .await?;
        let token_source = resolved.source();

        let session = Arc::new(RestSession::new(
            session_config,
            AuthManager::new(resolved.secret().clone()),
            transport,
        ));
        let handle = |category| ResourceClient::new(category, session.clone());

        let client = Self {
            people: handle(ResourceCategory::People),
            rooms: handle(ResourceCategory::Rooms),
            memberships: handle(ResourceCategory::Memberships),
            messages: handle(ResourceCategory::Messages),
            teams: handle(ResourceCategory::Teams),
            team_memberships: handle(ResourceCategory::TeamMemberships),
            webhooks: handle(ResourceCategory::Webhooks),
            organizations: handle(ResourceCategory::Organizations),
            licenses: handle(ResourceCategory::Licenses),
            roles: handle(ResourceCategory::Roles),
            events: handle(ResourceCategory::Events),
            guest_issuer: handle(ResourceCategory::GuestIssuer),
            access_tokens_service,
            token_source,
            session,
        };

        info!(
            base_url = %client.session.config().base_url(),
            token_source = ?token_source,
            "Webex client created"
        );

        Ok(client)
    }

    /// Where the access token came from
    pub fn token_source(&self) -> TokenSource {
        self.token_source
    }

    /// Session settings shared by every handle
    pub fn session_config(&self) -> &SessionConfig {
        self.session.config()
    }

    /// The shared session
    pub fn session(&self) -> &Arc<RestSession> {
        &self.session
    }

    /// Every resource handle, in [`ResourceCategory::ALL`] order
    pub fn handles(&self) -> [&ResourceClient; 12] {
        [
            &self.people,
            &self.rooms,
            &self.memberships,
            &self.messages,
            &self.teams,
            &self.team_memberships,
            &self.webhooks,
            &self.organizations,
            &self.licenses,
            &self.roles,
            &self.events,
            &self.guest_issuer,
        ]
    }

    /// Build the full URL for an endpoint
    pub fn build_url(&self, endpoint: &str) -> String {
        self.session.build_url(endpoint)
    }
}

impl WebexClient for WebexClientImpl {
    fn access_token(&self) -> &str {
        self.session.access_token()
    }

    fn base_url(&self) -> &Url {
        self.session.config().base_url()
    }

    fn single_request_timeout(&self) -> u64 {
        self.session.config().single_request_timeout()
    }

    fn wait_on_rate_limit(&self) -> bool {
        self.session.config().wait_on_rate_limit()
    }

    fn access_tokens(&self) -> &dyn AccessTokensServiceTrait {
        &self.access_tokens_service
    }

    fn people(&self) -> &ResourceClient {
        &self.people
    }

    fn rooms(&self) -> &ResourceClient {
        &self.rooms
    }

    fn memberships(&self) -> &ResourceClient {
        &self.memberships
    }

    fn messages(&self) -> &ResourceClient {
        &self.messages
    }

    fn teams(&self) -> &ResourceClient {
        &self.teams
    }

    fn team_memberships(&self) -> &ResourceClient {
        &self.team_memberships
    }

    fn webhooks(&self) -> &ResourceClient {
        &self.webhooks
    }

    fn organizations(&self) -> &ResourceClient {
        &self.organizations
    }

    fn licenses(&self) -> &ResourceClient {
        &self.licenses
    }

    fn roles(&self) -> &ResourceClient {
        &self.roles
    }

    fn events(&self) -> &ResourceClient {
        &self.events
    }

    fn guest_issuer(&self) -> &ResourceClient {
        &self.guest_issuer
    }
}

impl std::fmt::Debug for WebexClientImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebexClientImpl")
            .field("session", &self.session)
            .field("token_source", &self.token_source)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WebexConfigBuilder;

    async fn test_client() -> WebexClientImpl {
        let config = WebexConfigBuilder::new().access_token("test-token-123").build();
        WebexClientImpl::new(config).await.unwrap()
    }

    #[tokio::test]
    async fn test_client_creation() {
        let client = test_client().await;
        assert_eq!(client.access_token(), "test-token-123");
        assert_eq!(client.token_source(), TokenSource::Argument);
    }

    #[tokio::test]
    async fn test_build_url() {
        let client = test_client().await;
        assert_eq!(
            client.build_url("people/me"),
            "https://webexapis.com/v1/people/me"
        );
    }

    #[tokio::test]
    async fn test_client_clone() {
        let client = test_client().await;
        let cloned = client.clone();
        assert_eq!(client.base_url(), cloned.base_url());
        assert!(Arc::ptr_eq(client.session(), cloned.session()));
    }

    #[tokio::test]
    async fn test_handles_follow_category_order() {
        let client = test_client().await;
        let categories: Vec<_> = client.handles().iter().map(|h| h.category()).collect();
        assert_eq!(categories, ResourceCategory::ALL.to_vec());
    }

    #[tokio::test]
    async fn test_trait_accessors() {
        let client = test_client().await;
        let client_trait: &dyn WebexClient = &client;

        assert_eq!(client_trait.people().category(), ResourceCategory::People);
        assert_eq!(client_trait.rooms().category(), ResourceCategory::Rooms);
        assert_eq!(client_trait.memberships().category(), ResourceCategory::Memberships);
        assert_eq!(client_trait.messages().category(), ResourceCategory::Messages);
        assert_eq!(client_trait.teams().category(), ResourceCategory::Teams);
        assert_eq!(
            client_trait.team_memberships().category(),
            ResourceCategory::TeamMemberships
        );
        assert_eq!(client_trait.webhooks().category(), ResourceCategory::Webhooks);
        assert_eq!(client_trait.organizations().category(), ResourceCategory::Organizations);
        assert_eq!(client_trait.licenses().category(), ResourceCategory::Licenses);
        assert_eq!(client_trait.roles().category(), ResourceCategory::Roles);
        assert_eq!(client_trait.events().category(), ResourceCategory::Events);
        assert_eq!(client_trait.guest_issuer().category(), ResourceCategory::GuestIssuer);
        let _ = client_trait.access_tokens();
    }

    #[tokio::test]
    async fn test_debug_hides_token() {
        let client = test_client().await;
        assert!(!format!("{:?}", client).contains("test-token-123"));
    }
}
