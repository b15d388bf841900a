// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Byte chunk to line decoding
//!
//! Network chunks can end anywhere, including inside a multi-byte UTF-8
//! sequence or halfway through a line. The decoder keeps raw bytes until a
//! `\n` arrives, so a line is only decoded once it is complete. A newline byte
//! never occurs inside a multi-byte sequence, which makes the split safe.

/// Incremental decoder from raw byte chunks to text lines
#[derive(Debug, Default)]
pub struct FrameDecoder {
    /// Bytes of the current, not yet terminated line
    pending: Vec<u8>,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk and return every line it completes, in arrival order.
    ///
    /// Lines exclude the `\n` terminator. A trailing partial line is kept for
    /// the next call.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.pending.extend_from_slice(chunk);

        let mut lines = Vec::new();
        let mut start = 0;
        while let Some(offset) = self.pending[start..].iter().position(|b| *b == b'\n') {
            let end = start + offset;
            lines.push(decode_line(&self.pending[start..end]));
            start = end + 1;
        }
        self.pending.drain(..start);

        lines
    }

    /// Flush the remainder at end of stream.
    ///
    /// Returns the unterminated final line, if any bytes are left.
    pub fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let rest = std::mem::take(&mut self.pending);
        Some(decode_line(&rest))
    }

    /// Whether a partial line is buffered
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}

fn decode_line(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(line) => line.to_owned(),
        Err(err) => {
            tracing::warn!(
                target: "agentchat.stream",
                "Invalid UTF-8 in stream line at byte {}, substituting replacement characters",
                err.valid_up_to()
            );
            String::from_utf8_lossy(bytes).into_owned()
        }
    }
}
