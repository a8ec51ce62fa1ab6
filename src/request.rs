//! Wire request construction
//!
//! [`build_request`] assembles the outbound body for one call, applying the
//! model's parameter constraints. Unsupported sampling parameters are dropped
//! silently; this is how reasoning models end up ignoring temperature and
//! friends. Values are passed through as supplied, with no range clamping —
//! the constraint table governs presence, not validity.

use serde::{Deserialize, Serialize};

use crate::constraints::{constraints_for, OutputLimitField};
use crate::error::{BridgeError, Result};
use crate::model::ModelDescriptor;
use crate::transcript::{ResponseFormat, ToolDefinition};
use crate::wire::{WireMessage, WireRequest, WireTool};

/// Caller-supplied generation options for one call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_sequences: Option<Vec<String>>,
}

/// Build the wire request for one call.
///
/// # Errors
///
/// Fails only when the supplied response format cannot be represented on the
/// wire; constraint mismatches degrade to omission instead.
pub fn build_request(
    model: &ModelDescriptor,
    messages: Vec<WireMessage>,
    options: &GenerationOptions,
    tools: Option<&[ToolDefinition]>,
    response_format: Option<&ResponseFormat>,
    stream: bool,
) -> Result<WireRequest> {
    let constraints = constraints_for(model);

    let (max_tokens, max_completion_tokens) = match constraints.output_limit_field {
        OutputLimitField::MaxTokens => (options.max_output_tokens, None),
        OutputLimitField::MaxCompletionTokens => (None, options.max_output_tokens),
    };

    let response_format = response_format.map(render_response_format).transpose()?;

    Ok(WireRequest {
        model: model.name.clone(),
        messages,
        temperature: options.temperature.filter(|_| constraints.temperature),
        top_p: options.top_p.filter(|_| constraints.top_p),
        frequency_penalty: options
            .frequency_penalty
            .filter(|_| constraints.frequency_penalty),
        presence_penalty: options
            .presence_penalty
            .filter(|_| constraints.presence_penalty),
        stop: options
            .stop_sequences
            .clone()
            .filter(|_| constraints.stop_sequences),
        max_tokens,
        max_completion_tokens,
        tools: tools
            .filter(|t| !t.is_empty())
            .map(|t| t.iter().map(WireTool::from).collect()),
        response_format,
        stream,
    })
}

fn render_response_format(format: &ResponseFormat) -> Result<serde_json::Value> {
    if format.name.is_empty() {
        return Err(BridgeError::Build(
            "response format requires a non-empty schema name".into(),
        ));
    }
    Ok(serde_json::json!({
        "type": "json_schema",
        "json_schema": {
            "name": format.name,
            "schema": format.schema,
        },
    }))
}
