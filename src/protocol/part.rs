//! Decoded stream parts.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

/// Token usage reported by a finish marker, keyed by counter name
/// (e.g. `prompt_tokens`, `completion_tokens`).
pub type Usage = BTreeMap<String, i64>;

/// One decoded unit of the data-stream protocol.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamPart {
    /// Text of the current text block. Continuation lines re-emit the whole
    /// block accumulated so far, not just the new fragment.
    Text { content: String },
    /// Arbitrary structured payload.
    Data { content: Vec<Value> },
    /// Server-reported error, or a structurally invalid unit.
    Error { message: String },
    MessageAnnotation { annotation: Map<String, Value> },
    ToolCallStreamStart {
        tool_call_id: String,
        tool_name: String,
    },
    ToolCallDelta {
        tool_call_id: String,
        args_text_delta: String,
    },
    ToolCall {
        tool_call_id: String,
        tool_name: String,
        args: Map<String, Value>,
    },
    ToolResult { tool_call_id: String, result: Value },
    /// End of one generation step; more steps follow when `is_continued`.
    FinishStep {
        finish_reason: String,
        usage: Usage,
        is_continued: bool,
    },
    /// End of the whole message.
    FinishMessage { finish_reason: String, usage: Usage },
}

impl StreamPart {
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text {
            content: content.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// Whether this part ends a step or the whole message.
    pub fn is_finish(&self) -> bool {
        matches!(self, Self::FinishStep { .. } | Self::FinishMessage { .. })
    }
}
