// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response};

use crate::config::Settings;
use crate::error::{ApiError, ChatError, Result};

/// Shared HTTP client bound to one backend base URL
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    request_timeout: Duration,
}

impl ApiClient {
    /// Create a client for the given backend base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Create a client from settings (env override applied)
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.api_base_url())
            .with_request_timeout(Duration::from_secs(settings.api.request_timeout_secs))
    }

    /// Timeout for request/response calls. Streaming requests are not bounded.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a path under `/api`
    pub fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    /// Raw HTTP client, for requests outside the backend (presigned URLs)
    pub fn http(&self) -> &Client {
        &self.client
    }

    /// Request/response call with the configured timeout
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, self.url(path))
            .timeout(self.request_timeout)
    }

    /// Long-lived streaming call without a total timeout
    pub fn streaming(&self, method: Method, path: &str) -> RequestBuilder {
        self.client.request(method, self.url(path))
    }
}

/// Extract the backend's `{"error": "..."}` message, falling back to the raw body.
pub(crate) fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_owned))
        .unwrap_or_else(|| body.trim().to_string())
}

/// Construct a standardized server error.
pub(crate) fn server_error(status: u16, message: impl Into<String>) -> ChatError {
    ChatError::Api(ApiError::ServerError {
        status,
        message: message.into(),
    })
}

/// Pass through success responses, turn anything else into a server error.
pub(crate) async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(server_error(status.as_u16(), error_message(&body)))
}

/// Map a send failure to a network error.
pub(crate) fn network_error(err: reqwest::Error) -> ChatError {
    ChatError::Api(ApiError::Network(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_api_prefix() {
        let client = ApiClient::new("http://localhost:8080/");
        assert_eq!(client.base_url(), "http://localhost:8080");
        assert_eq!(
            client.url("/sessions/abc"),
            "http://localhost:8080/api/sessions/abc"
        );
    }

    #[test]
    fn test_error_message_from_json() {
        assert_eq!(
            error_message(r#"{"error":"Session not found"}"#),
            "Session not found"
        );
    }

    #[test]
    fn test_error_message_plain_body() {
        assert_eq!(error_message("bad gateway\n"), "bad gateway");
    }

    #[test]
    fn test_server_error_shape() {
        let err = server_error(500, "boom");
        assert!(matches!(
            err,
            ChatError::Api(ApiError::ServerError { status: 500, .. })
        ));
    }
}
