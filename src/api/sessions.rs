// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Session store client
//!
//! CRUD over the backend's chat sessions and their stored messages.

use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::api::client::{check_status, network_error, ApiClient};
use crate::chat::message::ChatMessage;
use crate::error::{ApiError, ChatError, Result};

/// Title given to sessions created without one
pub const DEFAULT_SESSION_TITLE: &str = "New Chat";

/// A stored chat session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    pub title: String,
    /// Id the agent backend knows this session by
    #[serde(default)]
    pub agent_session_id: String,
    /// Carried-over context after a session rotation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_context: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A session with its transcript
#[derive(Debug, Clone, PartialEq)]
pub struct SessionDetail {
    pub session: Session,
    pub messages: Vec<ChatMessage>,
}

#[derive(Deserialize)]
struct SessionDetailBody {
    session: Session,
    #[serde(default)]
    messages: Option<Vec<ChatMessage>>,
}

#[derive(Serialize)]
struct TitleBody<'a> {
    title: &'a str,
}

#[derive(Deserialize)]
struct StatsBody {
    message_count: u64,
}

/// Client for the session endpoints
#[derive(Debug, Clone)]
pub struct SessionStore {
    api: ApiClient,
}

impl SessionStore {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// All sessions, in backend order
    pub async fn list(&self) -> Result<Vec<Session>> {
        let response = self.send(Method::GET, "/sessions", None).await?;
        // The backend encodes an empty list as null
        let sessions: Option<Vec<Session>> = decode(response).await?;
        Ok(sessions.unwrap_or_default())
    }

    /// Create a session. A blank title falls back to the default.
    pub async fn create(&self, title: Option<&str>) -> Result<Session> {
        let title = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(DEFAULT_SESSION_TITLE);
        let response = self
            .send(Method::POST, "/sessions", Some(TitleBody { title }))
            .await?;
        decode(response).await
    }

    /// A session with its stored messages
    pub async fn get(&self, id: &str) -> Result<SessionDetail> {
        let response = self
            .send(Method::GET, &format!("/sessions/{}", id), None)
            .await?;
        let body: SessionDetailBody = decode(response).await?;
        Ok(SessionDetail {
            session: body.session,
            messages: body.messages.unwrap_or_default(),
        })
    }

    pub async fn rename(&self, id: &str, title: &str) -> Result<()> {
        self.send(
            Method::PUT,
            &format!("/sessions/{}", id),
            Some(TitleBody { title }),
        )
        .await?;
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.send(Method::DELETE, &format!("/sessions/{}", id), None)
            .await?;
        Ok(())
    }

    /// Delete every stored message of a session
    pub async fn clear_messages(&self, id: &str) -> Result<()> {
        self.send(Method::DELETE, &format!("/sessions/{}/messages", id), None)
            .await?;
        Ok(())
    }

    /// Number of stored messages in a session
    pub async fn message_count(&self, id: &str) -> Result<u64> {
        let response = self
            .send(Method::GET, &format!("/sessions/{}/stats", id), None)
            .await?;
        let stats: StatsBody = decode(response).await?;
        Ok(stats.message_count)
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<TitleBody<'_>>,
    ) -> Result<reqwest::Response> {
        tracing::debug!(target: "agentchat.api", "{} {}", method, path);
        let mut request = self.api.request(method, path);
        if let Some(body) = body {
            request = request.json(&body);
        }
        let response = request.send().await.map_err(network_error)?;
        check_status(response).await
    }
}

async fn decode<T: serde::de::DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let body = response.text().await.map_err(network_error)?;
    serde_json::from_str(&body)
        .map_err(|e| ChatError::Api(ApiError::InvalidResponse(e.to_string())))
}
