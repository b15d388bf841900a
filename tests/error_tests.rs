// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use std::io;
use agentchat::error::{ApiError, ChatError, UploadError};

#[test]
fn test_io_error_conversion() {
    let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
    let chat_error: ChatError = io_error.into();

    match chat_error {
        ChatError::Io(_) => {} // Expected
        _ => panic!("Expected Io error, got different error type"),
    }
}

#[test]
fn test_json_error_conversion() {
    let json_error = serde_json::from_str::<serde_json::Value>("{ nope").unwrap_err();
    let chat_error: ChatError = json_error.into();
    assert!(matches!(chat_error, ChatError::Json(_)));
}

#[test]
fn test_config_error_display() {
    let error = ChatError::Config("Missing base URL".to_string());
    assert_eq!(error.to_string(), "Configuration error: Missing base URL");
}

#[test]
fn test_cancelled_error_display() {
    assert_eq!(ChatError::Cancelled.to_string(), "Stream cancelled");
}

#[test]
fn test_request_failed_display() {
    let error = ApiError::RequestFailed { status: 503 };
    assert_eq!(error.to_string(), "Failed to send message (HTTP 503)");
}

#[test]
fn test_server_error_display() {
    let error = ApiError::ServerError {
        status: 404,
        message: "Session not found".to_string(),
    };
    assert_eq!(error.to_string(), "API error (404): Session not found");
}

#[test]
fn test_api_error_wraps_into_chat_error() {
    let error: ChatError = ApiError::StreamError("connection reset".to_string()).into();
    assert_eq!(
        error.to_string(),
        "API error: Streaming error: connection reset"
    );
    assert_eq!(error.turn_message(), "Streaming error: connection reset");
    assert!(!error.is_cancelled());
}

#[test]
fn test_upload_error_display() {
    let error = UploadError::UnsupportedType("png".to_string());
    assert_eq!(
        error.to_string(),
        "Unsupported file type: png. Allowed types: PDF, DOCX, DOC, TXT, MD, XLSX, XLS"
    );

    let error = UploadError::Rejected {
        status: 413,
        message: "too large".to_string(),
    };
    assert_eq!(error.to_string(), "Upload failed (413): too large");
}

#[test]
fn test_upload_cancel_is_cancellation() {
    let error: ChatError = UploadError::Cancelled.into();
    assert!(error.is_cancelled());

    let error: ChatError = UploadError::Network("reset".to_string()).into();
    assert!(!error.is_cancelled());
}
