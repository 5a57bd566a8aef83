mod client;
mod endpoints;
mod environment;
mod error;
mod response;

pub use client::Client;
pub use endpoints::{DateWindow, DATE_FORMAT};
pub use environment::{ClientConfig, Mode, DEFAULT_API_VERSION};
pub use error::RequestError;
pub use response::ApiResponse;
