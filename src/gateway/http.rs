//! HTTP gateway backed by a blocking `reqwest` client.

use super::{interpret_response, join_url, Gateway, Method, Request, RequestBody};
use crate::error::{Result, SyncError};
use crate::settings::Settings;
use parking_lot::RwLock;
use reqwest::blocking::Client;
use reqwest::header::{HeaderValue, CONTENT_TYPE};

/// Header carrying the API key on every request.
pub const API_KEY_HEADER: &str = "X-API-KEY";

/// Gateway talking to the inventory service over HTTP.
pub struct HttpGateway {
    client: Client,
    settings: RwLock<Settings>,
}

impl HttpGateway {
    /// Create a gateway for the given settings. Requests never time out.
    pub fn new(settings: Settings) -> Result<Self> {
        let client = Client::builder()
            .timeout(None)
            .build()
            .map_err(|e| SyncError::InvalidConfig(e.to_string()))?;

        Ok(Self {
            client,
            settings: RwLock::new(settings.trimmed()),
        })
    }

    /// Current connection settings.
    pub fn settings(&self) -> Settings {
        self.settings.read().clone()
    }

    /// Replace the connection settings; later requests use the new values.
    pub fn set_settings(&self, settings: Settings) {
        tracing::debug!(base_url = %settings.base_url.trim(), "gateway settings updated");
        *self.settings.write() = settings.trimmed();
    }

    fn method(method: Method) -> reqwest::Method {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        }
    }
}

impl Gateway for HttpGateway {
    fn send(&self, request: Request) -> Result<Option<serde_json::Value>> {
        let settings = self.settings();
        let url = join_url(&settings.base_url, &request.path);
        let api_key = HeaderValue::from_str(&settings.api_key)
            .map_err(|e| SyncError::InvalidConfig(format!("API key: {}", e)))?;

        tracing::debug!(method = %request.method, %url, "sending request");

        let mut builder = self
            .client
            .request(Self::method(request.method), &url)
            .header(API_KEY_HEADER, api_key);

        builder = match request.body {
            Some(RequestBody::Json(value)) => {
                let bytes = serde_json::to_vec(&value)
                    .map_err(|e| SyncError::Serialization(e.to_string()))?;
                builder
                    .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
                    .body(bytes)
            }
            Some(RequestBody::Binary(bytes)) => builder.body(bytes),
            None => builder,
        };

        let response = builder
            .send()
            .map_err(|e| SyncError::transport(e.to_string()))?;

        let status = response.status();
        let reason = status.canonical_reason().unwrap_or("");
        let body = match response.bytes() {
            Ok(bytes) => bytes.to_vec(),
            // An unreadable error body reports the status text instead
            Err(_) if !status.is_success() => Vec::new(),
            Err(e) => return Err(SyncError::transport(e.to_string())),
        };

        interpret_response(status.as_u16(), reason, &body)
    }
}
