use url::Url;

use super::{OAUTH_API_VERSION, OAUTH_SCOPE};
use crate::api::{Client, RequestError};

impl Client {
    /// Builds the login URL to redirect a user to when starting the authorization-code flow.
    ///
    /// After signing in, Dexcom redirects back to `redirect_uri` with a `code`
    /// query parameter, which [`exchange_code`](Client::exchange_code) trades for tokens.
    pub fn auth_url(&self, redirect_uri: &str, client_id: &str) -> Result<Url, RequestError> {
        let login_endpoint = format!("{}/{OAUTH_API_VERSION}/oauth2/login", self.domain_url());
        let url = Url::parse_with_params(
            &login_endpoint,
            &[
                ("client_id", client_id),
                ("redirect_uri", redirect_uri),
                ("response_type", "code"),
                ("scope", OAUTH_SCOPE),
            ],
        )?;
        Ok(url)
    }
}
