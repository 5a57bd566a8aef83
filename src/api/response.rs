use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

use super::RequestError;

/// The uniform outcome of every [`Client`](super::Client) call.
///
/// A successful response carries the decoded JSON body and no errors.
/// A failed one carries an empty body and exactly one error message,
/// alongside the typed cause.
#[derive(Debug, Serialize)]
pub struct ApiResponse {
    success: bool,
    data: Map<String, Value>,
    errors: Vec<String>,
    #[serde(skip)]
    error: Option<RequestError>,
}

impl ApiResponse {
    pub fn success(data: Map<String, Value>) -> Self {
        Self {
            success: true,
            data,
            errors: Vec::new(),
            error: None,
        }
    }

    pub fn failure(error: RequestError) -> Self {
        Self {
            success: false,
            data: Map::new(),
            errors: vec![error.to_string()],
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    /// Same as [`is_success`](Self::is_success).
    pub fn status(&self) -> bool {
        self.success
    }

    pub fn data(&self) -> &Map<String, Value> {
        &self.data
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// The typed cause of a failed response.
    pub fn error(&self) -> Option<&RequestError> {
        self.error.as_ref()
    }

    pub fn into_data(self) -> Map<String, Value> {
        self.data
    }

    /// Converts back into a plain `Result`, for use with `?`.
    pub fn into_result(self) -> Result<Map<String, Value>, RequestError> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.data),
        }
    }

    /// Deserializes the decoded body into a typed value.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(Value::Object(self.data.clone()))
    }
}

impl From<Result<Map<String, Value>, RequestError>> for ApiResponse {
    fn from(result: Result<Map<String, Value>, RequestError>) -> Self {
        match result {
            Ok(data) => Self::success(data),
            Err(error) => Self::failure(error),
        }
    }
}

/// Decodes a response body into a key/value mapping.
///
/// Empty bodies, `null` and anything that is not JSON become an empty map.
/// Arrays and bare scalars are keyed by their position so callers always
/// receive a mapping.
pub(crate) fn decode_body(body: &[u8]) -> Map<String, Value> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Map::new();
    }

    let value = match serde_json::from_slice(body) {
        Ok(value) => value,
        Err(err) => {
            warn!(error = %err, "response body was not valid JSON, treating it as empty");
            return Map::new();
        }
    };

    match value {
        Value::Null => Map::new(),
        Value::Object(map) => map,
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| (index.to_string(), item))
            .collect(),
        scalar => Map::from_iter([("0".to_string(), scalar)]),
    }
}
