//! Access tokens service for the Webex API.
//!
//! Exchanges OAuth authorization codes and refresh tokens for access
//! tokens. Requests are unauthenticated form posts.

mod requests;
mod responses;
mod service;

pub use requests::*;
pub use responses::*;
pub use service::*;
