//! Resource handles.
//!
//! Each handle pairs a [`ResourceCategory`] with the client's shared
//! [`RestSession`]. Handles carry no state of their own.

use crate::errors::{ResponseError, WebexError, WebexResult};
use crate::session::RestSession;
use std::fmt;
use std::sync::Arc;
use tracing::instrument;

/// Read and delete operations a handle can perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceOperation {
    /// `GET <category>/<id>`
    Get,
    /// `GET <category>`
    List,
    /// `DELETE <category>/<id>`
    Delete,
}

impl ResourceOperation {
    /// Operation name
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceOperation::Get => "get",
            ResourceOperation::List => "list",
            ResourceOperation::Delete => "delete",
        }
    }
}

/// API resource categories exposed by the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceCategory {
    /// People
    People,
    /// Rooms (spaces)
    Rooms,
    /// Room memberships
    Memberships,
    /// Messages
    Messages,
    /// Teams
    Teams,
    /// Team memberships
    TeamMemberships,
    /// Webhooks
    Webhooks,
    /// Organizations
    Organizations,
    /// Licenses
    Licenses,
    /// Roles
    Roles,
    /// Events
    Events,
    /// Guest issuer
    GuestIssuer,
}

impl ResourceCategory {
    /// Every category, in the order the client exposes them
    pub const ALL: [ResourceCategory; 12] = [
        ResourceCategory::People,
        ResourceCategory::Rooms,
        ResourceCategory::Memberships,
        ResourceCategory::Messages,
        ResourceCategory::Teams,
        ResourceCategory::TeamMemberships,
        ResourceCategory::Webhooks,
        ResourceCategory::Organizations,
        ResourceCategory::Licenses,
        ResourceCategory::Roles,
        ResourceCategory::Events,
        ResourceCategory::GuestIssuer,
    ];

    /// Handle name
    pub fn name(&self) -> &'static str {
        match self {
            ResourceCategory::People => "people",
            ResourceCategory::Rooms => "rooms",
            ResourceCategory::Memberships => "memberships",
            ResourceCategory::Messages => "messages",
            ResourceCategory::Teams => "teams",
            ResourceCategory::TeamMemberships => "team_memberships",
            ResourceCategory::Webhooks => "webhooks",
            ResourceCategory::Organizations => "organizations",
            ResourceCategory::Licenses => "licenses",
            ResourceCategory::Roles => "roles",
            ResourceCategory::Events => "events",
            ResourceCategory::GuestIssuer => "guest_issuer",
        }
    }

    /// Whether the category's endpoint serves the operation.
    ///
    /// Guest issuer login is POST-only. Organizations, licenses, roles and
    /// events are read-only.
    pub fn supports(&self, operation: ResourceOperation) -> bool {
        match (self, operation) {
            (ResourceCategory::GuestIssuer, _) => false,
            (
                ResourceCategory::Organizations
                | ResourceCategory::Licenses
                | ResourceCategory::Roles
                | ResourceCategory::Events,
                ResourceOperation::Delete,
            ) => false,
            _ => true,
        }
    }

    /// Endpoint path relative to the base URL
    pub fn path(&self) -> &'static str {
        match self {
            ResourceCategory::TeamMemberships => "team/memberships",
            ResourceCategory::GuestIssuer => "jwt/login",
            other => other.name(),
        }
    }
}

impl fmt::Display for ResourceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Handle for one resource category
#[derive(Clone)]
pub struct ResourceClient {
    category: ResourceCategory,
    session: Arc<RestSession>,
}

impl ResourceClient {
    /// Create a handle sharing the given session
    pub fn new(category: ResourceCategory, session: Arc<RestSession>) -> Self {
        Self { category, session }
    }

    /// The category this handle serves
    pub fn category(&self) -> ResourceCategory {
        self.category
    }

    /// The shared session
    pub fn session(&self) -> &Arc<RestSession> {
        &self.session
    }

    fn ensure_supported(&self, operation: ResourceOperation) -> WebexResult<()> {
        if self.category.supports(operation) {
            Ok(())
        } else {
            Err(WebexError::Unsupported {
                category: self.category.name(),
                operation: operation.as_str(),
            })
        }
    }

    /// Fetch one item by ID
    #[instrument(skip(self), fields(category = %self.category))]
    pub async fn get(&self, id: &str) -> WebexResult<serde_json::Value> {
        self.ensure_supported(ResourceOperation::Get)?;
        let endpoint = format!("{}/{}", self.category.path(), id);
        self.session.get_json(&endpoint, Vec::new()).await
    }

    /// Fetch the first page of items, returning the `items` array
    #[instrument(skip(self, params), fields(category = %self.category))]
    pub async fn list<I, K, V>(&self, params: I) -> WebexResult<Vec<serde_json::Value>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.ensure_supported(ResourceOperation::List)?;
        let query = params
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        let mut body: serde_json::Value =
            self.session.get_json(self.category.path(), query).await?;

        match body.get_mut("items").map(serde_json::Value::take) {
            Some(serde_json::Value::Array(items)) => Ok(items),
            _ => Err(WebexError::Response(ResponseError::UnexpectedResponse {
                message: format!("{} list response has no items array", self.category),
            })),
        }
    }

    /// Delete one item by ID
    #[instrument(skip(self), fields(category = %self.category))]
    pub async fn delete(&self, id: &str) -> WebexResult<()> {
        self.ensure_supported(ResourceOperation::Delete)?;
        let endpoint = format!("{}/{}", self.category.path(), id);
        self.session.delete(&endpoint).await
    }
}

impl fmt::Debug for ResourceClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceClient")
            .field("category", &self.category)
            .finish()
    }
}
