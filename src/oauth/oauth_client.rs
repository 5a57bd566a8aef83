use reqwest::Method;

use super::OAUTH_API_VERSION;
use crate::api::{ApiResponse, Client};

impl Client {
    /// Exchanges an authorization code for an access and refresh token.
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
        client_id: &str,
        client_secret: &str,
    ) -> ApiResponse {
        let form = [
            ("code", code),
            ("grant_type", "authorization_code"),
            ("redirect_uri", redirect_uri),
            ("client_secret", client_secret),
            ("client_id", client_id),
        ];
        self.send_request(Method::POST, &self.token_endpoint(), Some(&form))
            .await
    }

    /// Trades a refresh token for a fresh token pair.
    pub async fn exchange_refresh_token(
        &self,
        refresh_token: &str,
        redirect_uri: &str,
        client_id: &str,
        client_secret: &str,
    ) -> ApiResponse {
        let form = [
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
            ("redirect_uri", redirect_uri),
            ("client_id", client_id),
            ("client_secret", client_secret),
        ];
        self.send_request(Method::POST, &self.token_endpoint(), Some(&form))
            .await
    }

    fn token_endpoint(&self) -> String {
        format!("{}/{OAUTH_API_VERSION}/oauth2/token", self.domain_url())
    }
}

#[cfg(test)]
mod tests {
    use crate::api::{Client, ClientConfig, Mode, RequestError};
    use crate::oauth::TokenSet;
    use serde_json::json;
    use wiremock::matchers::{body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn token_body() -> serde_json::Value {
        json!({
            "access_token": "new-access",
            "refresh_token": "new-refresh",
            "expires_in": 7200,
            "token_type": "Bearer"
        })
    }

    /// Configured for `v3` so the token endpoint's fixed `v2` is observable.
    fn mock_client(server: &MockServer) -> Client {
        let config =
            ClientConfig::new("", Mode::Production, "v3", false).with_domain_url(&server.uri());
        Client::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_exchange_code() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v2/oauth2/token"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string(
                "code=abc&grant_type=authorization_code&redirect_uri=https%3A%2F%2Fcb\
                 &client_secret=secret&client_id=cid",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = mock_client(&mock_server);
        let response = client
            .exchange_code("abc", "https://cb", "cid", "secret")
            .await;

        assert!(response.is_success());
        let tokens = TokenSet::from_response(response).unwrap();
        assert_eq!(tokens.access_token, "new-access");
        assert_eq!(tokens.refresh_token.as_deref(), Some("new-refresh"));
    }

    #[tokio::test]
    async fn test_exchange_refresh_token() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v2/oauth2/token"))
            .and(body_string(
                "refresh_token=old&grant_type=refresh_token&redirect_uri=https%3A%2F%2Fcb\
                 &client_id=cid&client_secret=secret",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(token_body()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = mock_client(&mock_server);
        let response = client
            .exchange_refresh_token("old", "https://cb", "cid", "secret")
            .await;

        assert!(response.is_success());
        assert_eq!(response.data()["expires_in"], json!(7200));
    }

    #[tokio::test]
    async fn test_rejected_exchange() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v2/oauth2/token"))
            .respond_with(
                ResponseTemplate::new(400).set_body_json(json!({"error": "invalid_grant"})),
            )
            .mount(&mock_server)
            .await;

        let client = mock_client(&mock_server);
        let response = client
            .exchange_refresh_token("expired", "https://cb", "cid", "secret")
            .await;

        assert!(!response.is_success());
        assert_eq!(response.errors().len(), 1);
        assert!(response.errors()[0].contains("invalid_grant"));
        assert!(matches!(
            TokenSet::from_response(response),
            Err(RequestError::Status { .. })
        ));
    }
}
