// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Stream lifecycle controller
//!
//! Owns the request lifecycle for one chat session: start, cancel, failure
//! and completion. At most one stream is live at a time. The single consumer
//! loop is the only writer of the turn; observers read snapshots through
//! `watch` receivers.

use futures::StreamExt;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::api::sessions::SessionStore;
use crate::chat::message::ChatMessage;
use crate::chat::transport::{ChatRequest, ChatTransport};
use crate::chat::turn::Turn;
use crate::error::{ChatError, Result};
use crate::stream::{ErrorInfo, EventPipeline, PipelineStats, StreamEvent};
use crate::utils::lock;

/// Error kind recorded when clearing history fails
const CLEAR_HISTORY_ERROR_KIND: &str = "ClearHistoryError";

/// Lifecycle state of the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Idle,
    /// Request sent, waiting for response headers
    Sending,
    /// Reading the response body
    Streaming,
    Completed,
    Cancelled,
    Failed,
}

impl StreamState {
    pub fn is_active(&self) -> bool {
        matches!(self, StreamState::Sending | StreamState::Streaming)
    }
}

/// Why a send was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    AlreadyStreaming,
    NoSession,
    EmptyMessage,
}

/// Result of one send
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamOutcome {
    /// Stream ended cleanly
    Completed,
    /// User cancelled; the turn keeps its partial state without an error
    Cancelled,
    /// Transport failed; the message is recorded as the turn's error
    Failed(String),
    /// Send was refused before any request was made
    Rejected(RejectReason),
}

/// Handle for the live stream
struct StreamSession {
    session_id: String,
    cancel: CancellationToken,
}

/// Drives chat streams for one chat session
pub struct StreamController {
    transport: Arc<dyn ChatTransport>,
    session_id: Mutex<Option<String>>,
    active: Mutex<Option<StreamSession>>,
    transcript: Mutex<Vec<ChatMessage>>,
    state: watch::Sender<StreamState>,
    turn: watch::Sender<Turn>,
}

impl StreamController {
    /// Create a controller with no session selected
    pub fn new(transport: Arc<dyn ChatTransport>) -> Self {
        let (state, _) = watch::channel(StreamState::Idle);
        let (turn, _) = watch::channel(Turn::new());
        Self {
            transport,
            session_id: Mutex::new(None),
            active: Mutex::new(None),
            transcript: Mutex::new(Vec::new()),
            state,
            turn,
        }
    }

    /// Select a session at construction time
    pub fn with_session(self, session_id: impl Into<String>) -> Self {
        *lock(&self.session_id) = Some(session_id.into());
        self
    }

    /// Switch to another chat session and load its transcript
    pub fn select_session(
        &self,
        session_id: impl Into<String>,
        history: Vec<ChatMessage>,
    ) -> Result<()> {
        if self.is_streaming() {
            return Err(ChatError::Session(
                "cannot switch sessions while a reply is streaming".to_string(),
            ));
        }
        *lock(&self.session_id) = Some(session_id.into());
        *lock(&self.transcript) = history;
        self.turn.send_replace(Turn::new());
        Ok(())
    }

    pub fn session_id(&self) -> Option<String> {
        lock(&self.session_id).clone()
    }

    pub fn state(&self) -> StreamState {
        *self.state.borrow()
    }

    /// Whether a stream is live
    pub fn is_streaming(&self) -> bool {
        lock(&self.active).is_some()
    }

    /// Snapshot of the current turn
    pub fn turn(&self) -> Turn {
        self.turn.borrow().clone()
    }

    /// Change notifications for the current turn
    pub fn subscribe_turn(&self) -> watch::Receiver<Turn> {
        self.turn.subscribe()
    }

    /// Change notifications for the lifecycle state
    pub fn subscribe_state(&self) -> watch::Receiver<StreamState> {
        self.state.subscribe()
    }

    /// Transcript of the selected session
    pub fn messages(&self) -> Vec<ChatMessage> {
        lock(&self.transcript).clone()
    }

    /// Send a message and drive its reply stream to completion.
    pub async fn send(&self, message: &str) -> StreamOutcome {
        self.send_with_documents(message, Vec::new()).await
    }

    /// Send a message with uploaded documents attached.
    pub async fn send_with_documents(
        &self,
        message: &str,
        document_ids: Vec<String>,
    ) -> StreamOutcome {
        let text = message.trim();
        if text.is_empty() {
            return StreamOutcome::Rejected(RejectReason::EmptyMessage);
        }
        let Some(session_id) = self.session_id() else {
            return StreamOutcome::Rejected(RejectReason::NoSession);
        };

        let cancel = {
            let mut active = lock(&self.active);
            if active.is_some() {
                tracing::debug!(target: "agentchat.controller", "Send rejected: stream already active");
                return StreamOutcome::Rejected(RejectReason::AlreadyStreaming);
            }
            let cancel = CancellationToken::new();
            *active = Some(StreamSession {
                session_id: session_id.clone(),
                cancel: cancel.clone(),
            });
            cancel
        };

        self.turn.send_replace(Turn::new());
        lock(&self.transcript).push(
            ChatMessage::user(&session_id, text).with_documents(document_ids.clone()),
        );
        self.transition(StreamState::Sending);

        let request = ChatRequest {
            session_id: session_id.clone(),
            message: text.to_string(),
            document_ids,
        };

        let (terminal, outcome) = match self.run_stream(&request, &cancel).await {
            Ok(stats) => {
                tracing::debug!(target: "agentchat.controller", "Stream completed: {:?}", stats);
                (StreamState::Completed, StreamOutcome::Completed)
            }
            Err(e) if e.is_cancelled() => {
                tracing::info!(target: "agentchat.controller", "Stream cancelled by user");
                (StreamState::Cancelled, StreamOutcome::Cancelled)
            }
            Err(e) => {
                let message = e.turn_message();
                tracing::warn!(target: "agentchat.controller", "Stream error: {}", e);
                self.turn.send_modify(|turn| turn.set_stream_error(message.clone()));
                (StreamState::Failed, StreamOutcome::Failed(message))
            }
        };

        self.turn.send_modify(|turn| {
            if terminal == StreamState::Cancelled {
                turn.clear_status();
            }
            turn.finalize();
        });
        let reply = self.turn.borrow().to_message(&session_id);
        lock(&self.transcript).push(reply);

        self.transition(terminal);
        *lock(&self.active) = None;
        self.transition(StreamState::Idle);

        outcome
    }

    /// Request cancellation of the live stream.
    ///
    /// Returns false when idle. The consumer loop observes the request at its
    /// next suspension point.
    pub fn cancel(&self) -> bool {
        let active = lock(&self.active);
        let Some(stream) = active.as_ref() else {
            return false;
        };
        tracing::debug!(
            target: "agentchat.controller",
            "Cancelling stream for session {}",
            stream.session_id
        );
        stream.cancel.cancel();
        self.turn.send_modify(Turn::clear_status);
        true
    }

    /// Drop the error shown on the current turn
    pub fn clear_error(&self) {
        self.turn.send_modify(Turn::clear_error);
    }

    /// Delete the session's stored messages and reset the local transcript.
    pub async fn clear_history(&self, store: &SessionStore) -> Result<()> {
        let Some(session_id) = self.session_id() else {
            return Ok(());
        };
        if self.is_streaming() {
            return Err(ChatError::Session(
                "cannot clear history while a reply is streaming".to_string(),
            ));
        }

        match store.clear_messages(&session_id).await {
            Ok(()) => {
                lock(&self.transcript).clear();
                self.turn.send_modify(Turn::clear_summarized);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(target: "agentchat.controller", "Failed to clear history: {}", e);
                let error = ErrorInfo::new(CLEAR_HISTORY_ERROR_KIND, e.turn_message());
                self.turn.send_modify(|turn| turn.set_error(error));
                Err(e)
            }
        }
    }

    async fn run_stream(
        &self,
        request: &ChatRequest,
        cancel: &CancellationToken,
    ) -> Result<PipelineStats> {
        let mut body = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ChatError::Cancelled),
            opened = self.transport.open(request) => opened?,
        };
        self.transition(StreamState::Streaming);

        let mut pipeline = EventPipeline::new();
        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(ChatError::Cancelled),
                next = body.next() => next,
            };
            match next {
                Some(Ok(chunk)) => self.fold(pipeline.push(&chunk)),
                Some(Err(e)) => return Err(e),
                None => break,
            }
        }
        self.fold(pipeline.finish());

        Ok(pipeline.stats().clone())
    }

    fn fold(&self, events: Vec<StreamEvent>) {
        if events.is_empty() {
            return;
        }
        self.turn.send_modify(|turn| {
            for event in events {
                let update = turn.apply(event);
                tracing::trace!(target: "agentchat.controller", "Turn update: {:?}", update);
            }
        });
    }

    fn transition(&self, next: StreamState) {
        let previous = self.state.send_replace(next);
        tracing::debug!(
            target: "agentchat.controller",
            "Stream state {:?} -> {:?}",
            previous,
            next
        );
    }
}
