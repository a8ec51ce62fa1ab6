//! Transcript-to-wire conversion
//!
//! Pure functions over a transcript value. `build_messages` maps every entry
//! to exactly one wire message, in order; the `extract_*` functions scan for
//! the first `Instructions` entry and read what it carries. Absence of an
//! optional element yields `None`, never an error.

use crate::request::GenerationOptions;
use crate::transcript::{Entry, ResponseFormat, Segment, ToolDefinition, Transcript};
use crate::wire::{WireMessage, WireRole};

/// Assistant content standing in for a tool-call batch; the actual payload
/// travels out-of-band through the request/response path
pub const TOOL_CALL_PLACEHOLDER: &str = "[tool call]";

/// Substituted when structured content cannot be JSON-encoded
pub const UNRENDERABLE_PLACEHOLDER: &str = "[unrenderable content]";

fn render_segment(segment: &Segment) -> String {
    match segment {
        Segment::Text { text } => text.clone(),
        Segment::Structured { value } => serde_json::to_string(value)
            .unwrap_or_else(|_| UNRENDERABLE_PLACEHOLDER.to_string()),
    }
}

fn render_segments(segments: &[Segment]) -> String {
    segments
        .iter()
        .map(render_segment)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Map a transcript to wire messages, one message per entry, in order.
///
/// `Instructions` and `ToolOutput` become system messages, `Prompt` user,
/// `Response` assistant. A `ToolCallBatch` becomes an assistant message with a
/// fixed placeholder body.
#[must_use]
pub fn build_messages(transcript: &Transcript) -> Vec<WireMessage> {
    transcript
        .entries()
        .iter()
        .map(|entry| match entry {
            Entry::Instructions { segments, .. } => {
                WireMessage::new(WireRole::System, render_segments(segments))
            }
            Entry::Prompt { segments } => {
                WireMessage::new(WireRole::User, render_segments(segments))
            }
            Entry::Response { segments } => {
                WireMessage::new(WireRole::Assistant, render_segments(segments))
            }
            Entry::ToolCallBatch { .. } => {
                WireMessage::new(WireRole::Assistant, TOOL_CALL_PLACEHOLDER)
            }
            Entry::ToolOutput { tool, segments } => WireMessage::new(
                WireRole::System,
                format!("tool {tool}: {}", render_segments(segments)),
            ),
        })
        .collect()
}

fn first_instructions(
    transcript: &Transcript,
) -> Option<(&[Segment], &[ToolDefinition], Option<&ResponseFormat>, Option<&GenerationOptions>)> {
    transcript.entries().iter().find_map(|entry| match entry {
        Entry::Instructions {
            segments,
            tools,
            response_format,
            options,
        } => Some((
            segments.as_slice(),
            tools.as_slice(),
            response_format.as_ref(),
            options.as_ref(),
        )),
        _ => None,
    })
}

/// Tool definitions attached to the first `Instructions` entry.
///
/// Tools on later `Instructions` entries are never merged in. `None` when no
/// `Instructions` entry exists or the first one carries no tools.
#[must_use]
pub fn extract_tools(transcript: &Transcript) -> Option<Vec<ToolDefinition>> {
    let (_, tools, _, _) = first_instructions(transcript)?;
    if tools.is_empty() {
        None
    } else {
        Some(tools.to_vec())
    }
}

/// Response-format hint attached to the first `Instructions` entry
#[must_use]
pub fn extract_response_format(transcript: &Transcript) -> Option<ResponseFormat> {
    let (_, _, format, _) = first_instructions(transcript)?;
    format.cloned()
}

/// Generation options embedded in the first `Instructions` entry; used only
/// when the caller supplies none
#[must_use]
pub fn extract_options(transcript: &Transcript) -> Option<GenerationOptions> {
    let (_, _, _, options) = first_instructions(transcript)?;
    options.cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::ToolCall;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn tool(name: &str) -> ToolDefinition {
        ToolDefinition {
            name: name.into(),
            description: format!("the {name} tool"),
            parameters: json!({"type": "object"}),
        }
    }

    #[test]
    fn one_message_per_entry_with_role_mapping() {
        let transcript: Transcript = [
            Entry::instructions("be terse"),
            Entry::prompt("2+2?"),
            Entry::response("4"),
            Entry::ToolCallBatch {
                calls: vec![ToolCall {
                    id: "call_1".into(),
                    name: "calc".into(),
                    arguments: json!({"expr": "2+2"}),
                }],
            },
            Entry::tool_output("calc", "4"),
        ]
        .into_iter()
        .collect();

        let messages = build_messages(&transcript);
        assert_eq!(messages.len(), transcript.len());
        assert_eq!(messages[0].role, WireRole::System);
        assert_eq!(messages[0].content, "be terse");
        assert_eq!(messages[1].role, WireRole::User);
        assert_eq!(messages[2].role, WireRole::Assistant);
        assert_eq!(messages[3].role, WireRole::Assistant);
        assert_eq!(messages[3].content, TOOL_CALL_PLACEHOLDER);
        assert_eq!(messages[4].role, WireRole::System);
        assert_eq!(messages[4].content, "tool calc: 4");
    }

    #[test]
    fn segments_joined_with_single_space() {
        let transcript: Transcript = [Entry::Prompt {
            segments: vec![Segment::text("compute"), Segment::text("this")],
        }]
        .into_iter()
        .collect();

        assert_eq!(build_messages(&transcript)[0].content, "compute this");
    }

    #[test]
    fn structured_segments_are_json_encoded() {
        let transcript: Transcript = [Entry::Prompt {
            segments: vec![
                Segment::text("data:"),
                Segment::structured(json!({"b": 1, "a": [null, true]})),
            ],
        }]
        .into_iter()
        .collect();

        // insertion order of object keys is preserved
        assert_eq!(
            build_messages(&transcript)[0].content,
            r#"data: {"b":1,"a":[null,true]}"#
        );
    }

    #[test]
    fn tools_come_from_first_instructions_only() {
        let mut first = Entry::instructions("a");
        if let Entry::Instructions { tools, .. } = &mut first {
            tools.push(tool("alpha"));
        }
        let mut second = Entry::instructions("b");
        if let Entry::Instructions { tools, .. } = &mut second {
            tools.push(tool("beta"));
        }

        let transcript: Transcript = [first, second].into_iter().collect();
        let tools = extract_tools(&transcript).unwrap();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "alpha");
    }

    #[test]
    fn toolless_first_instructions_yields_none() {
        let mut second = Entry::instructions("b");
        if let Entry::Instructions { tools, .. } = &mut second {
            tools.push(tool("beta"));
        }
        let transcript: Transcript = [Entry::instructions("a"), second].into_iter().collect();
        assert_eq!(extract_tools(&transcript), None);
    }

    #[test]
    fn extraction_without_instructions_yields_none() {
        let transcript: Transcript = [Entry::prompt("hi")].into_iter().collect();
        assert_eq!(extract_tools(&transcript), None);
        assert_eq!(extract_response_format(&transcript), None);
        assert_eq!(extract_options(&transcript), None);
    }

    #[test]
    fn embedded_options_and_format_are_extracted() {
        let transcript: Transcript = [Entry::Instructions {
            segments: vec![Segment::text("be terse")],
            tools: Vec::new(),
            response_format: Some(ResponseFormat {
                name: "answer".into(),
                schema: json!({"type": "object"}),
            }),
            options: Some(GenerationOptions {
                temperature: Some(0.2),
                ..GenerationOptions::default()
            }),
        }]
        .into_iter()
        .collect();

        assert_eq!(
            extract_response_format(&transcript).unwrap().name,
            "answer"
        );
        assert_eq!(extract_options(&transcript).unwrap().temperature, Some(0.2));
    }
}
