// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Error types for agentchat
//!
//! This module defines all error types used throughout the client.

use thiserror::Error;

/// Main error type for agentchat operations
#[derive(Error, Debug)]
pub enum ChatError {
    /// API-related errors
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Document upload errors
    #[error("Upload error: {0}")]
    Upload(#[from] UploadError),

    /// The active stream was cancelled by the user
    #[error("Stream cancelled")]
    Cancelled,

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Session errors
    #[error("Session error: {0}")]
    Session(String),
}

impl ChatError {
    /// Whether this error is a user-initiated cancellation rather than a fault.
    pub fn is_cancelled(&self) -> bool {
        matches!(
            self,
            ChatError::Cancelled | ChatError::Upload(UploadError::Cancelled)
        )
    }

    /// Message recorded on a turn when the stream fails with this error.
    pub fn turn_message(&self) -> String {
        match self {
            ChatError::Api(err) => err.to_string(),
            other => other.to_string(),
        }
    }
}

/// Transport-level error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Network connectivity error
    #[error("Network error: {0}")]
    Network(String),

    /// The streaming endpoint answered with a non-success status
    #[error("Failed to send message (HTTP {status})")]
    RequestFailed { status: u16 },

    /// Invalid response from API
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// API returned an error
    #[error("API error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// Streaming error
    #[error("Streaming error: {0}")]
    StreamError(String),
}

/// Typed failures for document uploads
#[derive(Error, Debug)]
pub enum UploadError {
    /// No chat session was selected
    #[error("No session selected")]
    NoSession,

    /// File is larger than the configured limit
    #[error("File size {size} bytes exceeds maximum allowed size of {limit} bytes")]
    SizeExceeded { size: u64, limit: u64 },

    /// File type is not accepted by the backend
    #[error("Unsupported file type: {0}. Allowed types: PDF, DOCX, DOC, TXT, MD, XLSX, XLS")]
    UnsupportedType(String),

    /// Network failure during upload
    #[error("Network error during upload: {0}")]
    Network(String),

    /// Upload was cancelled
    #[error("Upload cancelled")]
    Cancelled,

    /// Backend refused the upload
    #[error("Upload failed ({status}): {message}")]
    Rejected { status: u16, message: String },
}

/// Result type alias for agentchat operations
pub type Result<T> = std::result::Result<T, ChatError>;
