// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Settings management for agentchat
//!
//! Handles loading and saving settings from ~/.agentchat/settings.json

use serde::{Deserialize, Serialize};

use crate::error::{ChatError, Result};

mod io;

/// Main settings structure, stored in ~/.agentchat/settings.json
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Settings {
    /// Backend connection settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Document upload limits
    #[serde(default)]
    pub upload: UploadConfig,
}

/// Backend connection settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiConfig {
    /// Base URL of the chat backend (without the `/api` prefix)
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Environment variable that overrides `base_url`
    #[serde(default = "default_base_url_env")]
    pub base_url_env: String,

    /// Timeout for request/response calls, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Document upload limits
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UploadConfig {
    /// Maximum size for direct uploads, in bytes
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,

    /// Maximum size for presigned spreadsheet uploads, in bytes
    #[serde(default = "default_max_spreadsheet_size")]
    pub max_spreadsheet_size: u64,
}

impl Settings {
    /// Get the backend base URL, checking the env var first.
    pub fn api_base_url(&self) -> String {
        // Priority: env var > config file.
        std::env::var(&self.api.base_url_env)
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| self.api.base_url.clone())
    }

    /// Reject values the clients cannot work with.
    pub fn validate(&self) -> Result<()> {
        let url = self.api.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ChatError::Config(format!(
                "api.base_url must start with http:// or https://, got '{}'",
                self.api.base_url
            )));
        }
        if self.api.request_timeout_secs == 0 {
            return Err(ChatError::Config(
                "api.request_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.upload.max_file_size == 0 || self.upload.max_spreadsheet_size == 0 {
            return Err(ChatError::Config(
                "upload size limits must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            base_url_env: default_base_url_env(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size: default_max_file_size(),
            max_spreadsheet_size: default_max_spreadsheet_size(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_base_url_env() -> String {
    "AGENTCHAT_API_BASE".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_max_file_size() -> u64 {
    10 * 1024 * 1024
}

fn default_max_spreadsheet_size() -> u64 {
    100 * 1024 * 1024
}
