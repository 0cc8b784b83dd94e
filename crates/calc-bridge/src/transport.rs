//! HTTP transport
//!
//! The dispatcher only sees [`Transport`], so tests and alternative hosts can
//! substitute their own. [`HttpTransport`] is the blocking reqwest client (no
//! async runtime required).

use std::time::Duration;

use reqwest::header::CONTENT_TYPE;

use crate::error::{BridgeError, Result};

/// A raw HTTP response, before any protocol interpretation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: String,
}

impl HttpReply {
    /// A JSON reply with the given status
    pub fn json(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type: Some("application/json".to_string()),
            body: body.into(),
        }
    }

    /// Whether the content type announces JSON
    pub fn is_json(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("application/json"))
    }
}

/// One synchronous request/response exchange
///
/// An `Err` means no HTTP response arrived at all; any response, whatever
/// its status, is an `Ok`.
pub trait Transport: Send + Sync {
    fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<HttpReply>;

    fn get(&self, url: &str) -> Result<HttpReply>;
}

/// Blocking reqwest transport
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::blocking::Client,
}

impl HttpTransport {
    /// Create a transport with an optional per-request timeout
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::blocking::Client::builder()
            .user_agent(concat!("calc-bridge/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder
            .build()
            .map_err(|e| BridgeError::Transport(e.to_string()))?;
        Ok(Self { http })
    }

    fn read(response: reqwest::blocking::Response) -> Result<HttpReply> {
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response
            .text()
            .map_err(|e| BridgeError::Transport(e.to_string()))?;
        Ok(HttpReply {
            status,
            content_type,
            body,
        })
    }
}

impl Transport for HttpTransport {
    fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<HttpReply> {
        let response = self
            .http
            .post(url)
            .json(body)
            .send()
            .map_err(|e| BridgeError::Transport(e.to_string()))?;
        Self::read(response)
    }

    fn get(&self, url: &str) -> Result<HttpReply> {
        let response = self
            .http
            .get(url)
            .send()
            .map_err(|e| BridgeError::Transport(e.to_string()))?;
        Self::read(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_json() {
        let mut reply = HttpReply::json(200, "{}");
        assert!(reply.is_json());
        reply.content_type = Some("Application/JSON; charset=utf-8".into());
        assert!(reply.is_json());
        reply.content_type = Some("text/html".into());
        assert!(!reply.is_json());
        reply.content_type = None;
        assert!(!reply.is_json());
    }
}
