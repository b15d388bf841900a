// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Chat session state
//!
//! Transcript messages, the per-reply [`Turn`], and the controller that
//! drives one reply stream at a time.

pub mod controller;
pub mod message;
pub mod mock_transport;
pub mod transport;
pub mod turn;

pub use controller::{RejectReason, StreamController, StreamOutcome, StreamState};
pub use message::{ChatMessage, Role};
pub use mock_transport::MockTransport;
pub use transport::{ByteStream, ChatRequest, ChatTransport, HttpTransport};
pub use turn::{Turn, TurnUpdate, STREAM_ERROR_KIND};
