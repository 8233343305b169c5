//! Remote access gateway.
//!
//! A gateway performs a single request against the inventory service and
//! hands back the decoded payload:
//! - non-2xx statuses become [`SyncError::Remote`]
//! - `204 No Content` yields `None`
//! - anything else is parsed as JSON
//!
//! There is no retry policy and no timeout.

mod http;
mod memory;

pub use http::{HttpGateway, API_KEY_HEADER};
pub use memory::MemoryGateway;

use crate::error::{Result, SyncError};
use serde::Serialize;
use std::fmt;

/// HTTP method of a gateway request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request body.
#[derive(Clone, Debug, PartialEq)]
pub enum RequestBody {
    /// JSON document; sent with `Content-Type: application/json`.
    Json(serde_json::Value),
    /// Opaque bytes (form data, uploads); no JSON content type is attached.
    Binary(Vec<u8>),
}

impl RequestBody {
    pub fn is_json(&self) -> bool {
        matches!(self, RequestBody::Json(_))
    }
}

/// A request against a path relative to the configured base URL.
#[derive(Clone, Debug, PartialEq)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub body: Option<RequestBody>,
}

impl Request {
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            body: None,
        }
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            method: Method::Delete,
            path: path.into(),
            body: None,
        }
    }

    /// POST with a JSON body.
    pub fn post_json(path: impl Into<String>, body: &impl Serialize) -> Result<Self> {
        Ok(Self {
            method: Method::Post,
            path: path.into(),
            body: Some(RequestBody::Json(to_json(body)?)),
        })
    }

    /// PUT with a JSON body.
    pub fn put_json(path: impl Into<String>, body: &impl Serialize) -> Result<Self> {
        Ok(Self {
            method: Method::Put,
            path: path.into(),
            body: Some(RequestBody::Json(to_json(body)?)),
        })
    }
}

pub(crate) fn to_json(body: &impl Serialize) -> Result<serde_json::Value> {
    serde_json::to_value(body).map_err(|e| SyncError::Serialization(e.to_string()))
}

/// Transport used by the client to reach the inventory service.
pub trait Gateway: Send + Sync {
    /// Perform a single request. `Ok(None)` means the server answered
    /// `204 No Content`.
    fn send(&self, request: Request) -> Result<Option<serde_json::Value>>;
}

impl<G: Gateway + ?Sized> Gateway for std::sync::Arc<G> {
    fn send(&self, request: Request) -> Result<Option<serde_json::Value>> {
        (**self).send(request)
    }
}

/// Turn a raw response into the gateway result.
///
/// `reason` is the canonical status text, used when the body of a failed
/// response is empty or not valid UTF-8. A non-empty body is reported as is.
pub fn interpret_response(
    status: u16,
    reason: &str,
    body: &[u8],
) -> Result<Option<serde_json::Value>> {
    if !(200..300).contains(&status) {
        let text = std::str::from_utf8(body).unwrap_or("");
        let message = if text.is_empty() { reason } else { text };
        return Err(SyncError::remote(status, message));
    }

    if status == 204 {
        return Ok(None);
    }

    let value = serde_json::from_slice(body)?;
    Ok(Some(value))
}

/// Join a base URL and a path, dropping a trailing slash from the base.
pub fn join_url(base_url: &str, path: &str) -> String {
    let base = base_url.trim();
    let base = base.strip_suffix('/').unwrap_or(base);
    format!("{}{}", base, path)
}
