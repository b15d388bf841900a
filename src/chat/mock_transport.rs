// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Mock chat transport for testing
//!
//! Replays a scripted response body so the stream controller can be
//! exercised without a backend.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream;
use std::sync::{Arc, Mutex};

use crate::chat::transport::{ByteStream, ChatRequest, ChatTransport};
use crate::error::{ApiError, ChatError, Result};
use crate::utils::lock;

/// One scripted body item
#[derive(Clone, Debug)]
enum MockChunk {
    Data(Bytes),
    Fail(String),
}

/// A scripted transport for testing
#[derive(Clone, Default)]
pub struct MockTransport {
    script: Arc<Mutex<Vec<MockChunk>>>,
    /// Status to reject the request with, instead of streaming
    reject_status: Option<u16>,
    /// Keep the body open after the script runs out
    hold_open: bool,
    /// Never answer the request, so the caller stays before the body
    stall_open: bool,
    recorded_requests: Arc<Mutex<Vec<ChatRequest>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script one `event:`-less SSE record per JSON payload
    pub fn with_payloads(payloads: &[&str]) -> Self {
        payloads
            .iter()
            .fold(Self::new(), |transport, payload| {
                transport.with_bytes(format!("data: {}\n\n", payload))
            })
    }

    /// Append a raw body chunk
    pub fn with_bytes(self, chunk: impl Into<Bytes>) -> Self {
        lock(&self.script).push(MockChunk::Data(chunk.into()));
        self
    }

    /// Append a transport failure to the body
    pub fn with_failure(self, message: impl Into<String>) -> Self {
        lock(&self.script).push(MockChunk::Fail(message.into()));
        self
    }

    /// Reject the request with a non-success status
    pub fn rejecting(mut self, status: u16) -> Self {
        self.reject_status = Some(status);
        self
    }

    /// Never signal end of stream after the scripted chunks
    pub fn holding_open(mut self) -> Self {
        self.hold_open = true;
        self
    }

    /// Never resolve `open`, as a backend that accepts the connection but
    /// sends no response headers
    pub fn stalling_open(mut self) -> Self {
        self.stall_open = true;
        self
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<ChatRequest> {
        lock(&self.recorded_requests).clone()
    }
}

#[async_trait]
impl ChatTransport for MockTransport {
    async fn open(&self, request: &ChatRequest) -> Result<ByteStream> {
        lock(&self.recorded_requests).push(request.clone());

        if self.stall_open {
            futures::future::pending::<()>().await;
        }

        if let Some(status) = self.reject_status {
            return Err(ApiError::RequestFailed { status }.into());
        }

        let items: Vec<Result<Bytes>> = lock(&self.script)
            .iter()
            .map(|chunk| match chunk {
                MockChunk::Data(bytes) => Ok(bytes.clone()),
                MockChunk::Fail(message) => {
                    Err(ChatError::Api(ApiError::StreamError(message.clone())))
                }
            })
            .collect();

        let body = stream::iter(items);
        if self.hold_open {
            Ok(Box::pin(futures::StreamExt::chain(body, stream::pending())))
        } else {
            Ok(Box::pin(body))
        }
    }
}
