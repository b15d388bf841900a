// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Turn state and event folding
//!
//! A [`Turn`] accumulates the assistant reply for one user message. Events
//! are applied strictly in arrival order; nothing is reordered or dropped
//! until the turn is finalized.

use indexmap::IndexMap;

use crate::chat::message::ChatMessage;
use crate::stream::{AgentStep, ErrorInfo, StreamEvent, Trace};

/// Error kind recorded when the transport fails mid-stream
pub const STREAM_ERROR_KIND: &str = "StreamError";

/// Accumulating state of one assistant reply
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Turn {
    /// Reply text, append-only while the turn is live
    text: String,
    /// Steps keyed by step index, in first-seen order
    steps: IndexMap<i64, AgentStep>,
    /// Thinking indicator
    status: Option<String>,
    error: Option<ErrorInfo>,
    summarized: bool,
    trace: Option<Trace>,
    /// Persisted id from the done event
    message_id: Option<String>,
    done: bool,
    finalized: bool,
}

/// What a single fold changed
#[derive(Debug, Clone, PartialEq)]
pub enum TurnUpdate {
    StatusChanged,
    StepAdded(i64),
    StepReplaced(i64),
    /// Text appended (contains the appended text)
    TextAppended(String),
    TraceAttached,
    ErrorSet,
    Summarized,
    Completed,
    /// Turn was already finalized; event dropped
    Ignored,
}

impl Turn {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Steps in the order their index was first seen
    pub fn steps(&self) -> impl Iterator<Item = &AgentStep> {
        self.steps.values()
    }

    pub fn step(&self, step_index: i64) -> Option<&AgentStep> {
        self.steps.get(&step_index)
    }

    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn error(&self) -> Option<&ErrorInfo> {
        self.error.as_ref()
    }

    pub fn was_summarized(&self) -> bool {
        self.summarized
    }

    pub fn trace(&self) -> Option<&Trace> {
        self.trace.as_ref()
    }

    pub fn message_id(&self) -> Option<&str> {
        self.message_id.as_deref()
    }

    /// Whether the done event was received
    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// Fold one event into the turn
    pub fn apply(&mut self, event: StreamEvent) -> TurnUpdate {
        if self.finalized {
            tracing::debug!(
                target: "agentchat.stream",
                "Dropping {} event for finalized turn",
                event.kind()
            );
            return TurnUpdate::Ignored;
        }

        match event {
            StreamEvent::Thinking { status } => {
                self.status = Some(status);
                TurnUpdate::StatusChanged
            }
            StreamEvent::StepUpdate { step } => {
                let index = step.step_index;
                match self.steps.get_mut(&index) {
                    Some(existing) => {
                        *existing = step;
                        TurnUpdate::StepReplaced(index)
                    }
                    None => {
                        self.steps.insert(index, step);
                        TurnUpdate::StepAdded(index)
                    }
                }
            }
            StreamEvent::ContentChunk { text } => {
                self.text.push_str(&text);
                self.status = None;
                TurnUpdate::TextAppended(text)
            }
            StreamEvent::TraceReady(trace) => {
                self.trace = Some(trace);
                TurnUpdate::TraceAttached
            }
            StreamEvent::ErrorEvent(error) => {
                self.error = Some(error);
                TurnUpdate::ErrorSet
            }
            StreamEvent::SummarizedNotice => {
                self.summarized = true;
                TurnUpdate::Summarized
            }
            StreamEvent::Done { message_id } => {
                self.status = None;
                self.done = true;
                if message_id.is_some() {
                    self.message_id = message_id;
                }
                TurnUpdate::Completed
            }
        }
    }

    /// Record a transport failure on the turn
    pub fn set_stream_error(&mut self, message: impl Into<String>) {
        self.error = Some(ErrorInfo::new(STREAM_ERROR_KIND, message));
    }

    pub fn set_error(&mut self, error: ErrorInfo) {
        self.error = Some(error);
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn clear_status(&mut self) {
        self.status = None;
    }

    pub fn clear_summarized(&mut self) {
        self.summarized = false;
    }

    /// Stop accepting events
    pub fn finalize(&mut self) {
        self.finalized = true;
    }

    /// Build the assistant transcript message for this turn
    pub fn to_message(&self, session_id: &str) -> ChatMessage {
        let mut message = ChatMessage::assistant(session_id, self.text.clone());
        if let Some(id) = &self.message_id {
            message.id = id.clone();
        }
        message.trace = self.trace.clone();
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::StepStatus;

    fn chunk(text: &str) -> StreamEvent {
        StreamEvent::ContentChunk {
            text: text.to_string(),
        }
    }

    fn step(index: i64, status: StepStatus) -> StreamEvent {
        StreamEvent::StepUpdate {
            step: AgentStep::new(index, "planner", "plan").with_status(status),
        }
    }

    #[test]
    fn test_content_appends_in_order() {
        let mut turn = Turn::new();
        for part in ["Hel", "lo", ", ", "world"] {
            turn.apply(chunk(part));
        }
        assert_eq!(turn.text(), "Hello, world");
    }

    #[test]
    fn test_content_clears_status() {
        let mut turn = Turn::new();
        turn.apply(StreamEvent::Thinking {
            status: "thinking".to_string(),
        });
        assert_eq!(turn.status(), Some("thinking"));

        let update = turn.apply(chunk("x"));
        assert_eq!(update, TurnUpdate::TextAppended("x".to_string()));
        assert_eq!(turn.status(), None);
    }

    #[test]
    fn test_step_upsert_keeps_position() {
        let mut turn = Turn::new();
        assert_eq!(turn.apply(step(0, StepStatus::Running)), TurnUpdate::StepAdded(0));
        turn.apply(step(2, StepStatus::Running));
        turn.apply(step(1, StepStatus::Running));

        let replacement = StreamEvent::StepUpdate {
            step: AgentStep::new(2, "retriever", "search")
                .with_status(StepStatus::Success)
                .with_output("found"),
        };
        assert_eq!(turn.apply(replacement), TurnUpdate::StepReplaced(2));

        let indices: Vec<i64> = turn.steps().map(|s| s.step_index).collect();
        assert_eq!(indices, vec![0, 2, 1]);
        assert_eq!(turn.step_count(), 3);

        let updated = turn.step(2).unwrap();
        assert_eq!(updated.agent_name, "retriever");
        assert_eq!(updated.status, StepStatus::Success);
        assert_eq!(updated.output.as_deref(), Some("found"));
    }

    #[test]
    fn test_error_event_does_not_block_content() {
        let mut turn = Turn::new();
        turn.apply(StreamEvent::ErrorEvent(ErrorInfo::new("RateLimited", "slow down")));
        turn.apply(chunk("partial"));

        assert_eq!(turn.error(), Some(&ErrorInfo::new("RateLimited", "slow down")));
        assert_eq!(turn.text(), "partial");
    }

    #[test]
    fn test_trace_does_not_change_text() {
        let mut turn = Turn::new();
        turn.apply(chunk("answer"));
        turn.apply(StreamEvent::TraceReady(Trace {
            trace_id: "t1".to_string(),
            agent_steps: Vec::new(),
            error: None,
        }));
        assert_eq!(turn.text(), "answer");
        assert_eq!(turn.trace().unwrap().trace_id, "t1");
    }

    #[test]
    fn test_summarized_notice_sets_flag() {
        let mut turn = Turn::new();
        turn.apply(StreamEvent::SummarizedNotice);
        assert!(turn.was_summarized());
        turn.clear_summarized();
        assert!(!turn.was_summarized());
    }

    #[test]
    fn test_done_clears_status_and_records_id() {
        let mut turn = Turn::new();
        turn.apply(StreamEvent::Thinking {
            status: "working".to_string(),
        });
        turn.apply(StreamEvent::Done {
            message_id: Some("m1".to_string()),
        });
        assert!(turn.is_done());
        assert_eq!(turn.status(), None);
        assert_eq!(turn.message_id(), Some("m1"));
    }

    #[test]
    fn test_done_without_id() {
        let mut turn = Turn::new();
        turn.apply(StreamEvent::Done { message_id: None });
        assert!(turn.is_done());
        assert_eq!(turn.message_id(), None);
    }

    #[test]
    fn test_finalized_turn_ignores_events() {
        let mut turn = Turn::new();
        turn.apply(chunk("a"));
        turn.finalize();
        assert_eq!(turn.apply(chunk("b")), TurnUpdate::Ignored);
        assert_eq!(turn.text(), "a");
    }

    #[test]
    fn test_stream_error_kind() {
        let mut turn = Turn::new();
        turn.set_stream_error("connection reset");
        let error = turn.error().unwrap();
        assert_eq!(error.kind, STREAM_ERROR_KIND);
        assert_eq!(error.message, "connection reset");
        turn.clear_error();
        assert!(turn.error().is_none());
    }

    #[test]
    fn test_to_message_uses_backend_id() {
        let mut turn = Turn::new();
        turn.apply(chunk("hi"));
        let temp = turn.to_message("s1");
        assert!(temp.is_temporary());

        turn.apply(StreamEvent::Done {
            message_id: Some("65f0".to_string()),
        });
        let message = turn.to_message("s1");
        assert_eq!(message.id, "65f0");
        assert_eq!(message.content, "hi");
        assert_eq!(message.session_id, "s1");
    }
}
