// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! agentchat - streaming client for multi-agent chat sessions.
//!
//! This crate exposes the runtime used by the `agentchat` CLI (`src/main.rs`).
//!
//! Architecture highlights:
//! - `stream`: byte chunks to lines to raw records to typed events
//! - `chat`: turn folding, the chat transport seam, and the stream controller
//! - `api`: session store and document upload clients
//! - `config`, `cli`, `error`: settings, argument parsing, error taxonomy

pub mod api;
pub mod chat;
pub mod cli;
pub mod config;
pub mod error;
pub mod stream;

mod utils;

pub use error::{ChatError, Result};
