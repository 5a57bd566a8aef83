use std::fmt;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Method;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, instrument, warn, Span};

use super::response::decode_body;
use super::{ApiResponse, ClientConfig, Mode, RequestError};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const JSON_CONTENT_TYPE: &str = "application/json";

/// A client for the Dexcom REST API.
///
/// Holds the configuration (environment, version, region and bearer token)
/// and a single HTTP transport reused across every call.
#[derive(Clone)]
pub struct Client {
    config: ClientConfig,
    http: reqwest::Client,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Creates a new API client around the given configuration.
    pub fn new(config: ClientConfig) -> Result<Self, RequestError> {
        // Dexcom has been observed sending a content encoding some clients fail to
        // decode, so bodies are always taken raw and decoded as JSON by us.
        let http = reqwest::Client::builder()
            .no_gzip()
            .no_brotli()
            .no_deflate()
            .build()?;

        Ok(Self { config, http })
    }

    /// Creates a production, US-region, `v2` client without a token.
    pub fn default_client() -> Result<Self, RequestError> {
        Self::new(ClientConfig::default())
    }

    /// Returns a client with a different configuration, sharing this client's transport.
    pub fn with_config(&self, config: ClientConfig) -> Self {
        Self {
            config,
            http: self.http.clone(),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn base_url(&self) -> &str {
        self.config.base_url()
    }

    pub fn domain_url(&self) -> &str {
        self.config.domain_url()
    }

    /// Re-derives the domain and base URL. See [`ClientConfig::with_base_url`].
    pub fn set_base_url(&mut self, mode: Mode, api_version: Option<&str>, is_ous: Option<bool>) {
        self.config = self.config.clone().with_base_url(mode, api_version, is_ous);
    }

    pub fn set_access_token(&mut self, access_token: &str) {
        self.config = self.config.clone().with_access_token(access_token);
    }

    /// Changes the region flag only; the base URL keeps pointing where it did
    /// until [`set_base_url`](Self::set_base_url) is called.
    pub fn set_is_ous(&mut self, is_ous: bool) {
        self.config = self.config.clone().with_ous(is_ous);
    }

    /// GETs `path` under the base URL with `params` as the query string.
    pub async fn get<Q: Serialize + ?Sized>(&self, path: &str, params: &Q) -> ApiResponse {
        self.send_request(Method::GET, &self.url_for(path), Some(params)).await
    }

    /// POSTs `body` as a form to `path` under the base URL.
    pub async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ApiResponse {
        self.send_request(Method::POST, &self.url_for(path), Some(body)).await
    }

    /// PUTs `body` as JSON to `path` under the base URL.
    pub async fn put<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> ApiResponse {
        self.send_request(Method::PUT, &self.url_for(path), Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> ApiResponse {
        self.send_request::<()>(Method::DELETE, &self.url_for(path), None).await
    }

    /// Sends a request to an absolute URL and wraps the outcome.
    ///
    /// `data` becomes a form body for POST, a JSON body for PUT and the query
    /// string for GET; it is ignored for any other method.
    pub async fn send_request<T: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &str,
        data: Option<&T>,
    ) -> ApiResponse {
        self.try_send_request(method, url, data).await.into()
    }

    /// Like [`send_request`](Self::send_request), but returns the decoded body or the typed error.
    #[instrument(
        name = "dexcom_request",
        skip_all,
        fields(
            http.method = %method,
            http.url = %url,
            http.status_code = tracing::field::Empty,
        )
    )]
    pub async fn try_send_request<T: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &str,
        data: Option<&T>,
    ) -> Result<Map<String, Value>, RequestError> {
        let mut request = self.http.request(method.clone(), url);

        if let Some(access_token) = self.config.access_token() {
            request = request.header(AUTHORIZATION, format!("Bearer {access_token}"));
        }

        if let Some(data) = data {
            request = if method == Method::POST {
                request.header(CONTENT_TYPE, FORM_CONTENT_TYPE).form(data)
            } else if method == Method::PUT {
                request.header(CONTENT_TYPE, JSON_CONTENT_TYPE).json(data)
            } else if method == Method::GET {
                request.query(data)
            } else {
                request
            };
        }

        let response = request.send().await.map_err(|err| {
            warn!(error = %err, "request failed to complete");
            RequestError::Transport(err)
        })?;

        let status = response.status();
        Span::current().record("http.status_code", status.as_u16());

        if !status.is_success() {
            let url = response.url().to_string();
            let body = response.text().await.unwrap_or_else(|err| {
                debug!(error = %err, "could not read body of rejected request");
                String::new()
            });
            warn!(%status, "request was rejected");
            return Err(RequestError::Status { status, url, body });
        }

        let body = response.bytes().await?;
        let data = decode_body(&body);

        debug!(keys = data.len(), "request succeeded");
        Ok(data)
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url(), path)
    }
}
