// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Payload shape classification
//!
//! The stream multiplexes several event kinds without a reliable
//! discriminant, so each payload is matched against an ordered list of shape
//! rules and the first match wins. The shapes overlap: a step update carries
//! a `status` string, and error and summarized payloads both carry `message`.
//! Reordering [`RULES`] changes behaviour.

use serde_json::{Map, Value};
use thiserror::Error;

use super::types::{AgentStep, ErrorInfo, RawEventRecord, StreamEvent, Trace};

type Payload = Map<String, Value>;

/// Errors that drop a single payload without affecting the stream
#[derive(Error, Debug)]
pub enum ClassifyError {
    /// Payload is not valid JSON
    #[error("malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Payload matched a rule but its fields have the wrong types
    #[error("invalid {rule} payload: {reason}")]
    InvalidShape { rule: &'static str, reason: String },
}

/// One shape rule: a presence predicate and the constructor it selects
struct Rule {
    name: &'static str,
    matches: fn(&Payload) -> bool,
    build: fn(Payload) -> Result<StreamEvent, String>,
}

const STREAM_ERROR_KIND: &str = "StreamError";

const RULES: &[Rule] = &[
    Rule {
        name: "thinking",
        matches: |p| p.get("status").is_some_and(Value::is_string) && !p.contains_key("stepIndex"),
        build: build_thinking,
    },
    Rule {
        name: "agent_step",
        matches: |p| p.contains_key("stepIndex"),
        build: build_step,
    },
    Rule {
        name: "content",
        matches: |p| p.contains_key("chunk"),
        build: build_chunk,
    },
    Rule {
        name: "trace",
        matches: |p| p.contains_key("traceId"),
        build: build_trace,
    },
    Rule {
        name: "error",
        matches: |p| {
            p.contains_key("type")
                && p.contains_key("message")
                && p.get("type").and_then(Value::as_str) != Some(STREAM_ERROR_KIND)
        },
        build: build_error,
    },
    Rule {
        name: "summarized",
        matches: |p| p.contains_key("message") && !p.contains_key("type"),
        build: |_| Ok(StreamEvent::SummarizedNotice),
    },
    Rule {
        name: "done",
        matches: |p| p.contains_key("messageId"),
        build: build_done,
    },
];

/// Classify one raw record.
///
/// `Ok(None)` means the payload parsed but matched no known shape; it is
/// skipped for forward compatibility.
pub fn classify(record: &RawEventRecord) -> Result<Option<StreamEvent>, ClassifyError> {
    let value: Value = serde_json::from_str(&record.data)?;
    classify_value(value)
}

/// Classify an already parsed payload.
pub fn classify_value(value: Value) -> Result<Option<StreamEvent>, ClassifyError> {
    let Value::Object(payload) = value else {
        return Ok(None);
    };

    let Some(rule) = RULES.iter().find(|rule| (rule.matches)(&payload)) else {
        return Ok(None);
    };

    (rule.build)(payload)
        .map(Some)
        .map_err(|reason| ClassifyError::InvalidShape {
            rule: rule.name,
            reason,
        })
}

fn build_thinking(mut payload: Payload) -> Result<StreamEvent, String> {
    match payload.remove("status") {
        Some(Value::String(status)) => Ok(StreamEvent::Thinking { status }),
        _ => Err("status is not a string".to_string()),
    }
}

fn build_step(payload: Payload) -> Result<StreamEvent, String> {
    serde_json::from_value::<AgentStep>(Value::Object(payload))
        .map(|step| StreamEvent::StepUpdate { step })
        .map_err(|e| e.to_string())
}

fn build_chunk(mut payload: Payload) -> Result<StreamEvent, String> {
    match payload.remove("chunk") {
        Some(Value::String(text)) => Ok(StreamEvent::ContentChunk { text }),
        _ => Err("chunk is not a string".to_string()),
    }
}

fn build_trace(payload: Payload) -> Result<StreamEvent, String> {
    serde_json::from_value::<Trace>(Value::Object(payload))
        .map(StreamEvent::TraceReady)
        .map_err(|e| e.to_string())
}

fn build_error(payload: Payload) -> Result<StreamEvent, String> {
    serde_json::from_value::<ErrorInfo>(Value::Object(payload))
        .map(StreamEvent::ErrorEvent)
        .map_err(|e| e.to_string())
}

// A missing or non-string id still completes the turn
fn build_done(mut payload: Payload) -> Result<StreamEvent, String> {
    let message_id = match payload.remove("messageId") {
        Some(Value::String(id)) if !id.is_empty() => Some(id),
        _ => None,
    };
    Ok(StreamEvent::Done { message_id })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::types::StepStatus;
    use serde_json::json;

    fn classify_json(value: Value) -> Option<StreamEvent> {
        classify_value(value).expect("payload should classify")
    }

    fn classify_str(data: &str) -> Result<Option<StreamEvent>, ClassifyError> {
        classify(&RawEventRecord {
            event: None,
            data: data.to_string(),
        })
    }

    #[test]
    fn test_thinking() {
        assert_eq!(
            classify_json(json!({"status": "thinking"})),
            Some(StreamEvent::Thinking {
                status: "thinking".to_string()
            })
        );
    }

    #[test]
    fn test_non_string_status_is_not_thinking() {
        assert_eq!(classify_json(json!({"status": 3})), None);
    }

    #[test]
    fn test_step_index_zero_is_step_update() {
        let event = classify_json(json!({
            "stepIndex": 0,
            "agentName": "planner",
            "action": "plan",
            "status": "running"
        }));
        match event {
            Some(StreamEvent::StepUpdate { step }) => {
                assert_eq!(step.step_index, 0);
                assert_eq!(step.agent_name, "planner");
                assert_eq!(step.status, StepStatus::Running);
            }
            other => panic!("Expected StepUpdate, got {:?}", other),
        }
    }

    #[test]
    fn test_step_wins_over_chunk() {
        let event = classify_json(json!({"stepIndex": 1, "chunk": "text"}));
        assert!(matches!(event, Some(StreamEvent::StepUpdate { .. })));
    }

    #[test]
    fn test_content_chunk() {
        assert_eq!(
            classify_json(json!({"chunk": "Hello"})),
            Some(StreamEvent::ContentChunk {
                text: "Hello".to_string()
            })
        );
    }

    #[test]
    fn test_trace_ready() {
        let event = classify_json(json!({
            "traceId": "t-9",
            "agentSteps": [{"stepIndex": 0, "agentName": "a", "action": "x", "status": "success"}],
            "error": {"type": "Timeout", "message": "late"}
        }));
        match event {
            Some(StreamEvent::TraceReady(trace)) => {
                assert_eq!(trace.trace_id, "t-9");
                assert_eq!(trace.agent_steps.len(), 1);
                assert_eq!(trace.error.unwrap().kind, "Timeout");
            }
            other => panic!("Expected TraceReady, got {:?}", other),
        }
    }

    #[test]
    fn test_error_event() {
        assert_eq!(
            classify_json(json!({"type": "RateLimited", "message": "slow down"})),
            Some(StreamEvent::ErrorEvent(ErrorInfo::new(
                "RateLimited",
                "slow down"
            )))
        );
    }

    #[test]
    fn test_stream_error_payload_is_not_an_error_event() {
        assert_eq!(
            classify_json(json!({"type": "StreamError", "message": "boom"})),
            None
        );
    }

    #[test]
    fn test_summarized_notice() {
        let event = classify_json(json!({
            "message": "Conversation history was automatically summarized",
            "newSessionId": "s-2",
            "sessionRotated": true
        }));
        assert_eq!(event, Some(StreamEvent::SummarizedNotice));
    }

    #[test]
    fn test_done() {
        assert_eq!(
            classify_json(json!({"messageId": "m1"})),
            Some(StreamEvent::Done {
                message_id: Some("m1".to_string())
            })
        );
    }

    #[test]
    fn test_done_with_non_string_id() {
        for id in [json!(null), json!(5), json!("")] {
            assert_eq!(
                classify_json(json!({ "messageId": id })),
                Some(StreamEvent::Done { message_id: None })
            );
        }
    }

    #[test]
    fn test_step_with_null_agent_name() {
        let event = classify_json(json!({
            "stepIndex": 1,
            "agentName": null,
            "action": "search",
            "status": "running"
        }));
        match event {
            Some(StreamEvent::StepUpdate { step }) => {
                assert_eq!(step.step_index, 1);
                assert_eq!(step.agent_name, "");
                assert_eq!(step.action, "search");
            }
            other => panic!("Expected StepUpdate, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_shape_is_ignored() {
        assert_eq!(classify_json(json!({"heartbeat": 1})), None);
        assert_eq!(classify_json(json!([1, 2, 3])), None);
        assert_eq!(classify_json(json!("text")), None);
    }

    #[test]
    fn test_malformed_json() {
        let err = classify_str("{not json").unwrap_err();
        assert!(matches!(err, ClassifyError::Malformed(_)));
    }

    #[test]
    fn test_invalid_shape_names_rule() {
        let err = classify_str(r#"{"chunk": 42}"#).unwrap_err();
        match err {
            ClassifyError::InvalidShape { rule, .. } => assert_eq!(rule, "content"),
            other => panic!("Expected InvalidShape, got {:?}", other),
        }
    }

    #[test]
    fn test_string_step_index_is_invalid_step() {
        let err = classify_str(r#"{"stepIndex": "one"}"#).unwrap_err();
        assert!(matches!(
            err,
            ClassifyError::InvalidShape {
                rule: "agent_step",
                ..
            }
        ));
    }
}
