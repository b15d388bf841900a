// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Backend REST collaborators

pub mod client;
pub mod sessions;
pub mod upload;

pub use client::ApiClient;
pub use sessions::{Session, SessionDetail, SessionStore, DEFAULT_SESSION_TITLE};
pub use upload::{DocumentKind, DocumentUploader, UploadProgress, UploadedDocument};
