//! Incremental framing for server-sent event streams
//!
//! Payload boundaries carry no meaning: a frame may arrive split across
//! several payloads, or several frames may arrive in one. The parser buffers
//! partial lines and only yields frames terminated by a blank line.

use std::mem;

/// One decoded SSE frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Value of the `event:` field, when present
    pub event: Option<String>,
    /// Concatenated `data:` lines, newline-joined
    pub data: String,
}

impl Frame {
    /// The end-of-stream sentinel used by the chat-completions protocol
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.data == "[DONE]"
    }
}

/// Splits an arbitrary byte sequence into SSE frames
#[derive(Debug, Default)]
pub struct FrameParser {
    buffer: String,
    event: Option<String>,
    data: String,
}

impl FrameParser {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one raw payload; returns the frames it completed
    pub fn feed(&mut self, payload: &[u8]) -> Vec<Frame> {
        self.buffer.push_str(&String::from_utf8_lossy(payload));

        let mut frames = Vec::new();
        while let Some(end) = self.buffer.find('\n') {
            let line: String = self.buffer.drain(..=end).collect();
            if let Some(frame) = self.consume_line(line.trim_end_matches(['\n', '\r'])) {
                frames.push(frame);
            }
        }
        frames
    }

    /// Close out a frame left open when the stream ends without a trailing
    /// blank line
    pub fn finish(&mut self) -> Option<Frame> {
        if !self.buffer.is_empty() {
            let line = mem::take(&mut self.buffer);
            if let Some(frame) = self.consume_line(line.trim_end_matches('\r')) {
                return Some(frame);
            }
        }
        self.take_frame()
    }

    fn consume_line(&mut self, line: &str) -> Option<Frame> {
        if line.is_empty() {
            return self.take_frame();
        }
        // comment line
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => {
                if !self.data.is_empty() {
                    self.data.push('\n');
                }
                self.data.push_str(value);
            }
            // id, retry and unknown fields are not used here
            _ => {}
        }
        None
    }

    fn take_frame(&mut self) -> Option<Frame> {
        if self.data.is_empty() {
            self.event = None;
            return None;
        }
        Some(Frame {
            event: self.event.take(),
            data: mem::take(&mut self.data),
        })
    }
}
