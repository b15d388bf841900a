// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Wire types for the agent event stream

use serde::{Deserialize, Deserializer, Serialize};

/// Read `null` as the type's default, so a nulled field does not drop the event
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Execution status of a sub-agent step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    #[default]
    Running,
    Success,
    Error,
    /// Any status string this client does not know about yet
    #[serde(other)]
    Unknown,
}

impl StepStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StepStatus::Running => "running",
            StepStatus::Success => "success",
            StepStatus::Error => "error",
            StepStatus::Unknown => "unknown",
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, StepStatus::Success | StepStatus::Error)
    }
}

/// One sub-agent execution record.
///
/// `step_index` is the identity key: a later update with the same index
/// replaces the earlier record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentStep {
    pub step_index: i64,

    #[serde(default, deserialize_with = "null_as_default")]
    pub agent_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,

    /// Step category (orchestration, action, knowledge_base, ...)
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub step_type: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub action: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub status: StepStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observation: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    /// Duration in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
}

impl AgentStep {
    pub fn new(step_index: i64, agent_name: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            step_index,
            agent_name: agent_name.into(),
            agent_id: None,
            step_type: None,
            action: action.into(),
            status: StepStatus::Running,
            rationale: None,
            observation: None,
            input: None,
            output: None,
            duration: None,
            start_time: None,
            end_time: None,
        }
    }

    pub fn with_status(mut self, status: StepStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        self.output = Some(output.into());
        self
    }
}

/// Error details, used both for in-band error events and turn errors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorInfo {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<String>,
}

impl ErrorInfo {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            source: None,
            stack_trace: None,
        }
    }
}

/// Finalized trace attached to an assistant message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Trace {
    pub trace_id: String,

    #[serde(default)]
    pub agent_steps: Vec<AgentStep>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorInfo>,
}

/// Unclassified event: optional `event:` label plus one data payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEventRecord {
    pub event: Option<String>,
    pub data: String,
}

/// Classified stream event
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// Agent is working; status text for a thinking indicator
    Thinking { status: String },
    /// New or updated sub-agent step
    StepUpdate { step: AgentStep },
    /// Incremental reply text
    ContentChunk { text: String },
    /// Final trace for the reply is available
    TraceReady(Trace),
    /// In-band error reported by the agent; the stream continues
    ErrorEvent(ErrorInfo),
    /// Backend summarized older history to shorten the context
    SummarizedNotice,
    /// Reply is logically complete; carries the persisted message id if sent
    Done { message_id: Option<String> },
}

impl StreamEvent {
    /// Short name used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            StreamEvent::Thinking { .. } => "thinking",
            StreamEvent::StepUpdate { .. } => "agent_step",
            StreamEvent::ContentChunk { .. } => "content",
            StreamEvent::TraceReady(_) => "trace",
            StreamEvent::ErrorEvent(_) => "error",
            StreamEvent::SummarizedNotice => "summarized",
            StreamEvent::Done { .. } => "done",
        }
    }
}
