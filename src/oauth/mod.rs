//! OAuth2 authorization-code and refresh-token support for the Dexcom API.
//!
//! Dexcom's OAuth2 endpoints live under `/v2/oauth2` on the configured domain
//! no matter which API version the rest of the client targets. The login page
//! itself is left to the caller: we only build the URL to send the user to.

mod authorize;
mod oauth_client;
mod token;

pub use token::TokenSet;

/// The API version OAuth2 endpoints are always served under.
pub const OAUTH_API_VERSION: &str = "v2";

/// The scope that grants a refresh token alongside the access token.
pub const OAUTH_SCOPE: &str = "offline_access";
