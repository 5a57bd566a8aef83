//! A client for the Dexcom continuous glucose monitoring REST API.
//!
//! [`Client`] builds request URLs for the sandbox or production environment
//! (in the US or outside-US region), attaches the bearer token, and wraps
//! every outcome in an [`ApiResponse`]. The [`oauth`] module adds the
//! authorization-code and refresh-token exchanges.
//!
//! ```no_run
//! use dexcom::{Client, ClientConfig, Mode};
//!
//! # async fn example() -> Result<(), dexcom::RequestError> {
//! let config = ClientConfig::new("access-token", Mode::Sandbox, "v2", false);
//! let client = Client::new(config)?;
//!
//! let response = client.data_range().await;
//! if response.is_success() {
//!     println!("{:?}", response.data());
//! } else {
//!     eprintln!("{:?}", response.errors());
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod oauth;

pub use api::{ApiResponse, Client, ClientConfig, DateWindow, Mode, RequestError};
pub use oauth::TokenSet;
