//! Provider facade
//!
//! [`ChatProvider`] wires the pipeline together for one target model:
//! transcript conversion, constraint-aware request construction, rate-limited
//! transport calls, and streaming aggregation.

use std::pin::Pin;
use std::sync::Arc;

use futures::Stream;
use serde_json::Value;

use crate::convert::{build_messages, extract_options, extract_response_format, extract_tools};
use crate::error::{BridgeError, Result};
use crate::limiter::RateLimiter;
use crate::model::ModelDescriptor;
use crate::request::{build_request, GenerationOptions};
use crate::streaming::aggregate;
use crate::transcript::{Entry, Segment, ToolCall, Transcript};
use crate::transport::Transport;
use crate::wire::{Usage, WireRequest, WireResponse};

/// Lazy, cancellable sequence of transcript entries from a streaming call
pub type EntryStream = Pin<Box<dyn Stream<Item = Result<Entry>> + Send>>;

/// Result of one non-streaming call
#[derive(Debug, Clone, PartialEq)]
pub struct Completion {
    /// Terminal transcript entry: a text response or a tool-call batch
    pub entry: Entry,
    /// Token accounting, when the provider reported it
    pub usage: Option<Usage>,
}

/// Facade over the request/response pipeline for a single model
pub struct ChatProvider {
    transport: Arc<dyn Transport>,
    model: ModelDescriptor,
    limiter: Arc<RateLimiter>,
}

impl ChatProvider {
    pub fn new(transport: Arc<dyn Transport>, model: ModelDescriptor) -> Self {
        Self {
            transport,
            model,
            limiter: Arc::new(RateLimiter::default()),
        }
    }

    /// Replace the default rate limiter, e.g. to share one gate across
    /// several providers
    #[must_use]
    pub fn with_rate_limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.limiter = limiter;
        self
    }

    #[must_use]
    pub fn model(&self) -> &ModelDescriptor {
        &self.model
    }

    fn prepare(
        &self,
        transcript: &Transcript,
        options: Option<&GenerationOptions>,
        stream: bool,
    ) -> Result<WireRequest> {
        let messages = build_messages(transcript);
        let tools = extract_tools(transcript);
        let format = extract_response_format(transcript);
        // options embedded in the transcript apply only when the caller
        // supplies none
        let fallback;
        let options = match options {
            Some(options) => options,
            None => {
                fallback = extract_options(transcript).unwrap_or_default();
                &fallback
            }
        };
        build_request(
            &self.model,
            messages,
            options,
            tools.as_deref(),
            format.as_ref(),
            stream,
        )
    }

    /// One non-streaming call: convert, send, extract the terminal entry.
    ///
    /// # Errors
    ///
    /// Transport and decoding errors surface unchanged; the pipeline does not
    /// retry. Use [`BridgeError::is_retryable`] to classify.
    pub async fn complete(
        &self,
        transcript: &Transcript,
        options: Option<&GenerationOptions>,
    ) -> Result<Completion> {
        let request = self.prepare(transcript, options, false)?;
        tracing::debug!(
            model = %self.model.name,
            messages = request.messages.len(),
            "sending completion request"
        );

        let transport = Arc::clone(&self.transport);
        let response = self
            .limiter
            .execute(|| async move { transport.send(&request).await })
            .await?;
        completion_from_response(response)
    }

    /// One streaming call: convert, open the payload stream, aggregate lazily.
    ///
    /// Dropping the returned stream releases the underlying transport stream.
    ///
    /// # Errors
    ///
    /// Fails if the request cannot be built or the stream cannot be opened;
    /// later decode failures surface as items of the returned stream.
    pub async fn stream(
        &self,
        transcript: &Transcript,
        options: Option<&GenerationOptions>,
    ) -> Result<EntryStream> {
        let request = self.prepare(transcript, options, true)?;
        tracing::debug!(
            model = %self.model.name,
            messages = request.messages.len(),
            "opening streaming request"
        );

        let transport = Arc::clone(&self.transport);
        let payloads = self
            .limiter
            .execute(|| async move { transport.open_stream(&request).await })
            .await?;
        Ok(Box::pin(aggregate(payloads)))
    }
}

fn completion_from_response(response: WireResponse) -> Result<Completion> {
    let usage = response.usage;
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| BridgeError::MalformedResponse("response carried no choices".into()))?;

    let message = choice.message;
    let entry = match message.tool_calls.filter(|calls| !calls.is_empty()) {
        Some(calls) => Entry::ToolCallBatch {
            calls: calls
                .into_iter()
                .map(|call| ToolCall {
                    id: call.id,
                    name: call.function.name,
                    arguments: serde_json::from_str(&call.function.arguments)
                        .unwrap_or_else(|_| Value::Object(serde_json::Map::new())),
                })
                .collect(),
        },
        None => Entry::Response {
            segments: vec![Segment::text(message.content.unwrap_or_default())],
        },
    };

    Ok(Completion { entry, usage })
}
