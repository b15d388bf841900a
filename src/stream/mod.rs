// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Event stream decoding
//!
//! Turns the raw response body of a chat stream into classified events:
//! bytes → lines ([`decoder`]) → raw records ([`reassembler`]) → typed
//! events ([`classifier`]). [`EventPipeline`] chains the three stages.

pub mod classifier;
pub mod decoder;
pub mod reassembler;
pub mod types;

pub use classifier::{classify, ClassifyError};
pub use decoder::FrameDecoder;
pub use reassembler::EventReassembler;
pub use types::*;

/// Counters collected while decoding one stream
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineStats {
    /// Complete lines decoded
    pub lines: usize,
    /// Raw payload records produced
    pub records: usize,
    /// Events classified and emitted
    pub events: usize,
    /// Payloads dropped because they failed to parse
    pub malformed: usize,
    /// Payloads with an unrecognized shape
    pub ignored: usize,
}

/// Incremental decoder from response body chunks to stream events
#[derive(Debug, Default)]
pub struct EventPipeline {
    decoder: FrameDecoder,
    reassembler: EventReassembler,
    stats: PipelineStats,
}

impl EventPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one body chunk and return the events it completes, in order.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        for line in self.decoder.push(chunk) {
            self.handle_line(&line, &mut events);
        }
        events
    }

    /// Flush the trailing partial line at end of stream.
    pub fn finish(&mut self) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        if let Some(line) = self.decoder.finish() {
            self.handle_line(&line, &mut events);
        }
        events
    }

    pub fn stats(&self) -> &PipelineStats {
        &self.stats
    }

    fn handle_line(&mut self, line: &str, events: &mut Vec<StreamEvent>) {
        self.stats.lines += 1;

        let Some(record) = self.reassembler.push_line(line) else {
            return;
        };
        self.stats.records += 1;

        match classify(&record) {
            Ok(Some(event)) => {
                self.stats.events += 1;
                events.push(event);
            }
            Ok(None) => {
                self.stats.ignored += 1;
                tracing::debug!(
                    target: "agentchat.stream",
                    "Ignoring payload with unrecognized shape (event: {:?})",
                    record.event
                );
            }
            Err(e) => {
                self.stats.malformed += 1;
                tracing::warn!(target: "agentchat.stream", "Failed to parse SSE data: {}", e);
            }
        }
    }
}
