//! Conversation transcript types
//!
//! A [`Transcript`] is the ordered history of one conversation, made of typed
//! [`Entry`] values. Entries hold [`Segment`]s of either plain text or
//! structured JSON content. The transcript itself carries no provider-specific
//! detail; the `convert` module turns it into wire messages.

use serde::{Deserialize, Serialize};

use crate::request::GenerationOptions;

/// A unit of content within a transcript entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Segment {
    /// Plain text
    Text { text: String },
    /// Structured JSON content. Object key order is insertion order and is
    /// preserved through encoding.
    Structured { value: serde_json::Value },
}

impl Segment {
    /// Create a text segment
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Create a structured segment
    #[must_use]
    pub fn structured(value: serde_json::Value) -> Self {
        Self::Structured { value }
    }
}

/// Tool definition advertised to the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON schema of the tool's parameters
    pub parameters: serde_json::Value,
}

/// One tool invocation issued by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

/// Structured-output schema requested from the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseFormat {
    /// Schema name; required by the wire protocol
    pub name: String,
    /// JSON schema the response must conform to
    pub schema: serde_json::Value,
}

/// One element of the conversation transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Entry {
    /// System-level guidance, plus the tools, response format, and fallback
    /// generation options for the conversation
    Instructions {
        segments: Vec<Segment>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tools: Vec<ToolDefinition>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        response_format: Option<ResponseFormat>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        options: Option<GenerationOptions>,
    },

    /// User turn
    Prompt { segments: Vec<Segment> },

    /// Assistant turn
    Response { segments: Vec<Segment> },

    /// Tool invocations issued by the assistant, in emission order
    ToolCallBatch { calls: Vec<ToolCall> },

    /// Result of running one tool
    ToolOutput { tool: String, segments: Vec<Segment> },
}

impl Entry {
    /// Create an `Instructions` entry from plain text, with no tools
    pub fn instructions(text: impl Into<String>) -> Self {
        Self::Instructions {
            segments: vec![Segment::text(text)],
            tools: Vec::new(),
            response_format: None,
            options: None,
        }
    }

    /// Create a `Prompt` entry from plain text
    pub fn prompt(text: impl Into<String>) -> Self {
        Self::Prompt {
            segments: vec![Segment::text(text)],
        }
    }

    /// Create a `Response` entry from plain text
    pub fn response(text: impl Into<String>) -> Self {
        Self::Response {
            segments: vec![Segment::text(text)],
        }
    }

    /// Create a `ToolOutput` entry from plain text
    pub fn tool_output(tool: impl Into<String>, text: impl Into<String>) -> Self {
        Self::ToolOutput {
            tool: tool.into(),
            segments: vec![Segment::text(text)],
        }
    }

    /// Concatenated text of all plain-text segments, if the entry has any
    #[must_use]
    pub fn text_content(&self) -> Option<String> {
        let segments = match self {
            Self::Instructions { segments, .. }
            | Self::Prompt { segments }
            | Self::Response { segments }
            | Self::ToolOutput { segments, .. } => segments,
            Self::ToolCallBatch { .. } => return None,
        };
        let texts: Vec<&str> = segments
            .iter()
            .filter_map(|s| match s {
                Segment::Text { text } => Some(text.as_str()),
                Segment::Structured { .. } => None,
            })
            .collect();
        if texts.is_empty() {
            None
        } else {
            Some(texts.join(" "))
        }
    }
}

/// Ordered, append-only conversation history
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    entries: Vec<Entry>,
}

impl Transcript {
    /// Create an empty transcript
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry
    pub fn push(&mut self, entry: Entry) {
        self.entries.push(entry);
    }

    /// Entries in conversation order
    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<Entry> for Transcript {
    fn from_iter<I: IntoIterator<Item = Entry>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn prompt_constructor_wraps_text() {
        let entry = Entry::prompt("Hello");
        assert_eq!(entry.text_content().as_deref(), Some("Hello"));
    }

    #[test]
    fn text_content_skips_structured_segments() {
        let entry = Entry::Response {
            segments: vec![
                Segment::text("result:"),
                Segment::structured(serde_json::json!({"a": 1})),
                Segment::text("done"),
            ],
        };
        assert_eq!(entry.text_content().as_deref(), Some("result: done"));
    }

    #[test]
    fn tool_call_batch_has_no_text() {
        let entry = Entry::ToolCallBatch {
            calls: vec![ToolCall {
                id: "call_1".into(),
                name: "search".into(),
                arguments: serde_json::json!({}),
            }],
        };
        assert_eq!(entry.text_content(), None);
    }

    #[test]
    fn transcript_preserves_order() {
        let transcript: Transcript = [
            Entry::instructions("be terse"),
            Entry::prompt("2+2?"),
            Entry::response("4"),
        ]
        .into_iter()
        .collect();

        assert_eq!(transcript.len(), 3);
        assert!(matches!(
            transcript.entries()[0],
            Entry::Instructions { .. }
        ));
        assert!(matches!(transcript.entries()[2], Entry::Response { .. }));
    }

    #[test]
    fn structured_value_round_trips_through_json() {
        let value = serde_json::json!({
            "z": null,
            "flag": true,
            "n": 3.25,
            "items": ["a", "b"],
        });
        let encoded = serde_json::to_string(&value).unwrap();
        let decoded: serde_json::Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, value);
        // preserve_order keeps insertion order through the round trip
        let keys: Vec<&String> = decoded.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["z", "flag", "n", "items"]);
    }
}
