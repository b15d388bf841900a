// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use agentchat::api::ApiClient;
use agentchat::config::Settings;
use tempfile::TempDir;

#[test]
fn test_settings_default_values() {
    let settings = Settings::default();

    assert_eq!(settings.api.base_url, "http://localhost:8080");
    assert_eq!(settings.api.base_url_env, "AGENTCHAT_API_BASE");
    assert_eq!(settings.api.request_timeout_secs, 30);
    assert_eq!(settings.upload.max_file_size, 10 * 1024 * 1024);
    assert_eq!(settings.upload.max_spreadsheet_size, 100 * 1024 * 1024);
}

#[test]
fn test_settings_serialization_roundtrip() {
    let mut settings = Settings::default();
    settings.api.base_url = "https://chat.example.com".to_string();

    let json = serde_json::to_string(&settings).unwrap();
    let parsed: Settings = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, settings);
}

#[test]
fn test_empty_file_uses_defaults() {
    let settings: Settings = serde_json::from_str("{}").unwrap();
    assert_eq!(settings, Settings::default());
}

#[test]
fn test_settings_file_is_pretty_json() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("settings.json");

    Settings::default().save_to(&path).unwrap();
    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.contains("\n  \"api\""));
}

#[test]
fn test_api_client_from_settings() {
    let mut settings = Settings::default();
    settings.api.base_url = "http://backend:9000/".to_string();
    settings.api.base_url_env = "AGENTCHAT_TEST_UNSET_BASE_4242".to_string();
    std::env::remove_var("AGENTCHAT_TEST_UNSET_BASE_4242");

    let client = ApiClient::from_settings(&settings);
    assert_eq!(client.base_url(), "http://backend:9000");
    assert_eq!(client.url("/sessions"), "http://backend:9000/api/sessions");
}
