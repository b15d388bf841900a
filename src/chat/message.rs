// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Chat transcript message types
//!
//! Mirrors the message records stored by the session backend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::stream::Trace;

/// A message in a chat session transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    /// Backend message id, or a `temp-` id for messages not yet persisted
    pub id: String,

    pub session_id: String,

    /// Role of the message sender
    pub role: Role,

    pub content: String,

    /// Ids of documents attached to the message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documents: Option<Vec<String>>,

    /// Agent trace for assistant replies
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trace: Option<Trace>,

    /// When the message was created
    pub created_at: DateTime<Utc>,
}

/// Role of the message sender
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User message
    User,
    /// Assistant response
    Assistant,
}

impl ChatMessage {
    /// Create a local user message with a temporary id
    pub fn user(session_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: temp_id("temp"),
            session_id: session_id.into(),
            role: Role::User,
            content: content.into(),
            documents: None,
            trace: None,
            created_at: Utc::now(),
        }
    }

    /// Create a local assistant message with a temporary id
    pub fn assistant(session_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: temp_id("temp-assistant"),
            session_id: session_id.into(),
            role: Role::Assistant,
            content: content.into(),
            documents: None,
            trace: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_documents(mut self, documents: Vec<String>) -> Self {
        if !documents.is_empty() {
            self.documents = Some(documents);
        }
        self
    }

    /// Whether this message only exists locally
    pub fn is_temporary(&self) -> bool {
        self.id.starts_with("temp-")
    }
}

fn temp_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4())
}
