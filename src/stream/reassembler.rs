// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Line to event record grouping
//!
//! The backend writes `event:`/`data:` pairs but blank-line terminators are not
//! guaranteed to arrive, so every `data:` line is emitted as its own record.
//! Multiple `data:` lines are never merged.

use super::types::RawEventRecord;

/// Groups decoded lines into raw event records
#[derive(Debug, Default)]
pub struct EventReassembler {
    /// Label from the most recent `event:` line not yet attached to a record
    pending_event: Option<String>,
}

impl EventReassembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume one line, returning a record when the line carries a payload.
    pub fn push_line(&mut self, line: &str) -> Option<RawEventRecord> {
        if line.trim().is_empty() {
            self.pending_event = None;
            return None;
        }

        if let Some(rest) = line.strip_prefix("event:") {
            self.pending_event = Some(rest.trim().to_string());
            return None;
        }

        if let Some(rest) = line.strip_prefix("data:") {
            let data = rest.trim();
            if data.is_empty() {
                return None;
            }
            return Some(RawEventRecord {
                event: self.pending_event.take(),
                data: data.to_string(),
            });
        }

        // Comments (`:`), `id:`, `retry:` and unknown fields carry nothing we use.
        None
    }

    /// Label waiting for its `data:` line, if any
    pub fn pending_event(&self) -> Option<&str> {
        self.pending_event.as_deref()
    }
}
