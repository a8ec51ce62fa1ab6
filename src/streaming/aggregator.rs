//! Streaming response aggregation
//!
//! [`StreamAggregator`] folds the incremental delta chunks of one streaming
//! call into discrete transcript entries: a snapshot `Response` entry every
//! time the text grows, and a single `ToolCallBatch` once the model finishes
//! with tool calls. An aggregator is single-use; create one per call.

use bytes::Bytes;
use futures::{Stream, StreamExt};
use serde_json::Value;

use crate::error::{BridgeError, Result};
use crate::transcript::{Entry, Segment, ToolCall};
use crate::wire::{StreamChunk, ToolCallDelta};

use super::sse::FrameParser;

const FINISH_TOOL_CALLS: &str = "tool_calls";

/// Tool call under assembly from argument fragments
#[derive(Debug, Clone)]
struct PendingCall {
    id: String,
    name: String,
    arguments: String,
}

/// Folds raw streaming payloads into transcript entries
#[derive(Debug, Default)]
pub struct StreamAggregator {
    parser: FrameParser,
    text: String,
    // first-appearance order, matched by call id
    calls: Vec<PendingCall>,
    finished: bool,
}

impl StreamAggregator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the end-of-stream sentinel has been observed
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Feed one raw payload; returns the entries it produced, in order.
    ///
    /// # Errors
    ///
    /// A payload whose frame data fails to decode aborts the aggregation.
    /// Entries already returned stay valid; they are never retracted.
    pub fn push_payload(&mut self, payload: &[u8]) -> Result<Vec<Entry>> {
        let mut produced = Vec::new();
        if self.finished {
            return Ok(produced);
        }
        for frame in self.parser.feed(payload) {
            if frame.is_done() {
                self.finished = true;
                break;
            }
            let chunk = decode_chunk(&frame.data)?;
            self.apply_chunk(&chunk, &mut produced);
        }
        Ok(produced)
    }

    /// Signal that the event source closed; flushes a frame left unterminated.
    ///
    /// # Errors
    ///
    /// Same decode contract as [`Self::push_payload`].
    pub fn finish(&mut self) -> Result<Vec<Entry>> {
        let mut produced = Vec::new();
        if self.finished {
            return Ok(produced);
        }
        if let Some(frame) = self.parser.finish() {
            if !frame.is_done() {
                let chunk = decode_chunk(&frame.data)?;
                self.apply_chunk(&chunk, &mut produced);
            }
        }
        self.finished = true;
        Ok(produced)
    }

    fn apply_chunk(&mut self, chunk: &StreamChunk, produced: &mut Vec<Entry>) {
        let Some(choice) = chunk.choices.first() else {
            return;
        };

        if let Some(deltas) = &choice.delta.tool_calls {
            for delta in deltas {
                self.apply_tool_delta(delta);
            }
        } else if let Some(text) = &choice.delta.content {
            if !text.is_empty() {
                self.text.push_str(text);
                // whole snapshot, not just the new fragment: consumers render
                // the latest entry directly without diffing
                produced.push(Entry::Response {
                    segments: vec![Segment::text(self.text.clone())],
                });
            }
        }

        if choice.finish_reason.as_deref() == Some(FINISH_TOOL_CALLS) && !self.calls.is_empty() {
            produced.push(self.take_batch());
        }
    }

    fn apply_tool_delta(&mut self, delta: &ToolCallDelta) {
        let function = delta.function.as_ref();
        let fragment = function
            .and_then(|f| f.arguments.as_deref())
            .unwrap_or_default();

        match &delta.id {
            Some(id) => {
                if let Some(call) = self.calls.iter_mut().find(|c| &c.id == id) {
                    // name was fixed by the first fragment for this id
                    call.arguments.push_str(fragment);
                } else {
                    self.calls.push(PendingCall {
                        id: id.clone(),
                        name: function
                            .and_then(|f| f.name.clone())
                            .unwrap_or_default(),
                        arguments: fragment.to_string(),
                    });
                }
            }
            // fragments without an id continue the most recently started call
            None => {
                if let Some(call) = self.calls.last_mut() {
                    call.arguments.push_str(fragment);
                }
            }
        }
    }

    fn take_batch(&mut self) -> Entry {
        let calls = std::mem::take(&mut self.calls)
            .into_iter()
            .map(|call| {
                // one call's broken arguments degrade to {}, not a failure
                let arguments = serde_json::from_str(&call.arguments)
                    .unwrap_or_else(|_| Value::Object(serde_json::Map::new()));
                ToolCall {
                    id: call.id,
                    name: call.name,
                    arguments,
                }
            })
            .collect();
        Entry::ToolCallBatch { calls }
    }
}

fn decode_chunk(data: &str) -> Result<StreamChunk> {
    serde_json::from_str(data)
        .map_err(|e| BridgeError::StreamDecode(format!("invalid delta chunk: {e}")))
}

/// Wrap a raw payload stream into a lazy transcript-entry stream.
///
/// Entries are produced as payloads arrive; the consumer may stop at any
/// point, dropping the underlying payload stream with it. A decode failure
/// ends the stream with an error after whatever was already emitted.
pub fn aggregate<S>(payloads: S) -> impl Stream<Item = Result<Entry>> + Send
where
    S: Stream<Item = Result<Bytes>> + Send,
{
    async_stream::try_stream! {
        let mut aggregator = StreamAggregator::new();
        futures::pin_mut!(payloads);

        while let Some(payload) = payloads.next().await {
            for entry in aggregator.push_payload(&payload?)? {
                yield entry;
            }
            if aggregator.is_finished() {
                break;
            }
        }
        if !aggregator.is_finished() {
            for entry in aggregator.finish()? {
                yield entry;
            }
        }
        tracing::debug!("streaming aggregation complete");
    }
}
