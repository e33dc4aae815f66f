//! Shared test helpers.

#![allow(dead_code)]

use goose_stream::handler::StreamHandler;
use goose_stream::protocol::{StreamParser, StreamPart, Usage};
use serde_json::{Map, Value};

/// One recorded handler callback.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Text(String),
    Data(Vec<Value>),
    Error(String),
    Annotation(Map<String, Value>),
    ToolCallStart { id: String, name: String },
    ToolCallDelta { id: String, delta: String },
    ToolCall { id: String, name: String, args: Map<String, Value> },
    ToolResult { id: String, result: Value },
    FinishStep { reason: String, usage: Usage, is_continued: bool },
    Finish { reason: String, usage: Usage },
}

/// Records every callback, overriding the tool defaults so tool events are
/// captured as themselves rather than as text.
#[derive(Debug, Default)]
pub struct RecordingHandler {
    pub events: Vec<Event>,
}

impl RecordingHandler {
    /// Concatenation of all text callbacks.
    pub fn text(&self) -> String {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl StreamHandler for RecordingHandler {
    fn on_text(&mut self, text: &str) {
        self.events.push(Event::Text(text.to_string()));
    }

    fn on_data(&mut self, data: &[Value]) {
        self.events.push(Event::Data(data.to_vec()));
    }

    fn on_error(&mut self, error: &str) {
        self.events.push(Event::Error(error.to_string()));
    }

    fn on_message_annotation(&mut self, annotation: &Map<String, Value>) {
        self.events.push(Event::Annotation(annotation.clone()));
    }

    fn on_finish(&mut self, finish_reason: &str, usage: &Usage) {
        self.events.push(Event::Finish {
            reason: finish_reason.to_string(),
            usage: usage.clone(),
        });
    }

    fn on_finish_step(&mut self, finish_reason: &str, usage: &Usage, is_continued: bool) {
        self.events.push(Event::FinishStep {
            reason: finish_reason.to_string(),
            usage: usage.clone(),
            is_continued,
        });
    }

    fn on_tool_call_start(&mut self, tool_call_id: &str, tool_name: &str) {
        self.events.push(Event::ToolCallStart {
            id: tool_call_id.to_string(),
            name: tool_name.to_string(),
        });
    }

    fn on_tool_call_delta(&mut self, tool_call_id: &str, args_text_delta: &str) {
        self.events.push(Event::ToolCallDelta {
            id: tool_call_id.to_string(),
            delta: args_text_delta.to_string(),
        });
    }

    fn on_tool_call(&mut self, tool_call_id: &str, tool_name: &str, args: &Map<String, Value>) {
        self.events.push(Event::ToolCall {
            id: tool_call_id.to_string(),
            name: tool_name.to_string(),
            args: args.clone(),
        });
    }

    fn on_tool_result(&mut self, tool_call_id: &str, result: &Value) {
        self.events.push(Event::ToolResult {
            id: tool_call_id.to_string(),
            result: result.clone(),
        });
    }
}

/// Feed `lines` to `parser` and collect every emitted part.
pub fn parse_all(parser: &mut StreamParser, lines: &[&str]) -> Vec<StreamPart> {
    lines.iter().filter_map(|line| parser.parse_line(line)).collect()
}

pub fn usage(pairs: &[(&str, i64)]) -> Usage {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

pub fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

/// A realistic reply: text, a tool round trip, a step boundary, more text
/// and the finish marker.
pub const TOOL_ROUND_TRIP: &str = r#"0:"Let me look at that file."
b:{"toolCallId":"call_1","toolName":"read_file"}
c:{"toolCallId":"call_1","argsTextDelta":"{\"path\":"}
c:{"toolCallId":"call_1","argsTextDelta":"\"src/lib.rs\"}"}
9:{"toolCallId":"call_1","toolName":"read_file","args":{"path":"src/lib.rs"}}
a:{"toolCallId":"call_1","result":"pub mod parser;"}
e:{"finishReason":"tool-calls","usage":{"promptTokens":12,"completionTokens":8},"isContinued":false}
0:"It declares one module."
d:{"finishReason":"stop","usage":{"promptTokens":30,"completionTokens":14}}
"#;
