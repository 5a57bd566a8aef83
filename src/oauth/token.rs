use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::{ApiResponse, Client, RequestError};

/// The tokens issued by a successful code or refresh-token exchange.
///
/// Keeping these somewhere safe between sessions is up to the caller.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct TokenSet {
    pub access_token: String,
    /// Only issued when the `offline_access` scope was granted.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Lifetime of the access token, in seconds.
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub token_type: Option<String>,
}

impl TokenSet {
    /// Extracts the token set from an exchange's response.
    pub fn from_response(response: ApiResponse) -> Result<Self, RequestError> {
        let data = response.into_result()?;
        Ok(serde_json::from_value(Value::Object(data))?)
    }
}

impl Client {
    /// Uses the access token from `tokens` for subsequent requests.
    pub fn apply_token_set(&mut self, tokens: &TokenSet) {
        self.set_access_token(&tokens.access_token);
    }
}
