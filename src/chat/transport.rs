// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Chat stream transport
//!
//! Defines the seam between the stream controller and the network.

use async_trait::async_trait;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use reqwest::header::ACCEPT;
use reqwest::Method;
use serde::Serialize;
use std::pin::Pin;

use crate::api::client::{network_error, ApiClient};
use crate::error::{ApiError, ChatError, Result};

/// Response body as a stream of raw chunks
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// Body of a start-stream request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub session_id: String,

    pub message: String,

    /// Uploaded documents to include in the agent context
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub document_ids: Vec<String>,
}

/// Opens chat streams against a backend
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Start a stream. Resolves once a success response with a readable
    /// body is available; a non-success status is an error.
    async fn open(&self, request: &ChatRequest) -> Result<ByteStream>;
}

/// HTTP transport posting to `/api/chat/stream`
#[derive(Debug, Clone)]
pub struct HttpTransport {
    api: ApiClient,
}

impl HttpTransport {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn open(&self, request: &ChatRequest) -> Result<ByteStream> {
        let response = self
            .api
            .streaming(Method::POST, "/chat/stream")
            .header(ACCEPT, "text/event-stream")
            .json(request)
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(
                target: "agentchat.api",
                "Chat stream rejected with {}: {}",
                status,
                body
            );
            return Err(ApiError::RequestFailed {
                status: status.as_u16(),
            }
            .into());
        }

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| ChatError::Api(ApiError::StreamError(e.to_string()))));

        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::{EventPipeline, StreamEvent};
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> ChatRequest {
        ChatRequest {
            session_id: "s1".to_string(),
            message: "hello".to_string(),
            document_ids: Vec::new(),
        }
    }

    #[test]
    fn test_request_omits_empty_documents() {
        let json = serde_json::to_value(request()).unwrap();
        assert_eq!(json, serde_json::json!({"sessionId": "s1", "message": "hello"}));
    }

    #[test]
    fn test_request_includes_documents() {
        let mut req = request();
        req.document_ids = vec!["d1".to_string()];
        let json = serde_json::to_value(req).unwrap();
        assert_eq!(json["documentIds"], serde_json::json!(["d1"]));
    }

    #[tokio::test]
    async fn test_open_streams_body() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat/stream"))
            .and(header("accept", "text/event-stream"))
            .and(body_json(serde_json::json!({"sessionId": "s1", "message": "hello"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/event-stream")
                    .set_body_string(
                        "event: content\ndata: {\"chunk\":\"Hi\"}\n\nevent: done\ndata: {\"messageId\":\"m1\"}\n\n",
                    ),
            )
            .mount(&mock_server)
            .await;

        let transport = HttpTransport::new(ApiClient::new(mock_server.uri()));
        let mut body = transport.open(&request()).await.unwrap();

        let mut pipeline = EventPipeline::new();
        let mut events = Vec::new();
        while let Some(chunk) = body.next().await {
            events.extend(pipeline.push(&chunk.unwrap()));
        }
        events.extend(pipeline.finish());

        assert_eq!(
            events,
            vec![
                StreamEvent::ContentChunk {
                    text: "Hi".to_string()
                },
                StreamEvent::Done {
                    message_id: Some("m1".to_string())
                },
            ]
        );
    }

    #[tokio::test]
    async fn test_open_non_success_status() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/chat/stream"))
            .respond_with(
                ResponseTemplate::new(400).set_body_string(r#"{"error":"sessionId required"}"#),
            )
            .mount(&mock_server)
            .await;

        let transport = HttpTransport::new(ApiClient::new(mock_server.uri()));
        let err = match transport.open(&request()).await {
            Ok(_) => panic!("Expected a transport error"),
            Err(e) => e,
        };

        assert!(matches!(
            err,
            ChatError::Api(ApiError::RequestFailed { status: 400 })
        ));
    }

    #[tokio::test]
    async fn test_open_unreachable_backend() {
        // Port 9 (discard) is closed on test hosts
        let transport = HttpTransport::new(ApiClient::new("http://127.0.0.1:9"));
        let err = match transport.open(&request()).await {
            Ok(_) => panic!("Expected a network error"),
            Err(e) => e,
        };
        assert!(matches!(err, ChatError::Api(ApiError::Network(_))));
    }
}
