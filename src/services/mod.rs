//! Service implementations for Webex API endpoints.
//!
//! `access_tokens` performs OAuth token exchanges; every other resource
//! category is served by a [`ResourceClient`] over the shared session.

pub mod access_tokens;
pub mod resources;

pub use access_tokens::{AccessTokensService, AccessTokensServiceTrait};
pub use resources::{ResourceCategory, ResourceClient, ResourceOperation};
