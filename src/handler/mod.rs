//! Consumer-side callbacks for decoded stream parts.

mod delta;
mod dispatcher;

pub use delta::TextDeltaTracker;
pub use dispatcher::StreamDispatcher;

use serde_json::{Map, Value};

use crate::protocol::{StreamPart, Usage};

/// Receives decoded stream parts, one callback per kind.
///
/// Tool callbacks default to rendering a readable line through
/// [`on_text`](Self::on_text), so a text-only consumer still shows tool
/// activity.
pub trait StreamHandler {
    fn on_text(&mut self, text: &str);
    fn on_data(&mut self, data: &[Value]);
    fn on_error(&mut self, error: &str);
    fn on_message_annotation(&mut self, annotation: &Map<String, Value>);
    fn on_finish(&mut self, finish_reason: &str, usage: &Usage);

    fn on_finish_step(&mut self, _finish_reason: &str, _usage: &Usage, _is_continued: bool) {}

    fn on_tool_call_start(&mut self, tool_call_id: &str, tool_name: &str) {
        self.on_text(&format!(
            "\nStarting tool call: {tool_name} (ID: {tool_call_id})"
        ));
    }

    fn on_tool_call_delta(&mut self, _tool_call_id: &str, args_text_delta: &str) {
        self.on_text(args_text_delta);
    }

    fn on_tool_call(&mut self, tool_call_id: &str, tool_name: &str, args: &Map<String, Value>) {
        let args = serde_json::to_string(args).unwrap_or_default();
        self.on_text(&format!(
            "\nCalling tool: {tool_name} (ID: {tool_call_id}) with args: {args}"
        ));
    }

    fn on_tool_result(&mut self, tool_call_id: &str, result: &Value) {
        self.on_text(&format!("\nTool result (ID: {tool_call_id}): {result}"));
    }
}

/// Route one part to the matching callback.
///
/// Text is passed through as emitted by the parser, i.e. cumulative within a
/// block. Use [`StreamDispatcher`] to receive deltas instead.
pub fn dispatch<H: StreamHandler + ?Sized>(part: &StreamPart, handler: &mut H) {
    match part {
        StreamPart::Text { content } => handler.on_text(content),
        StreamPart::Data { content } => handler.on_data(content),
        StreamPart::Error { message } => handler.on_error(message),
        StreamPart::MessageAnnotation { annotation } => handler.on_message_annotation(annotation),
        StreamPart::ToolCallStreamStart {
            tool_call_id,
            tool_name,
        } => handler.on_tool_call_start(tool_call_id, tool_name),
        StreamPart::ToolCallDelta {
            tool_call_id,
            args_text_delta,
        } => handler.on_tool_call_delta(tool_call_id, args_text_delta),
        StreamPart::ToolCall {
            tool_call_id,
            tool_name,
            args,
        } => handler.on_tool_call(tool_call_id, tool_name, args),
        StreamPart::ToolResult {
            tool_call_id,
            result,
        } => handler.on_tool_result(tool_call_id, result),
        StreamPart::FinishStep {
            finish_reason,
            usage,
            is_continued,
        } => handler.on_finish_step(finish_reason, usage, *is_continued),
        StreamPart::FinishMessage {
            finish_reason,
            usage,
        } => handler.on_finish(finish_reason, usage),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Default)]
    struct TextOnly {
        texts: Vec<String>,
    }

    impl StreamHandler for TextOnly {
        fn on_text(&mut self, text: &str) {
            self.texts.push(text.to_string());
        }
        fn on_data(&mut self, _data: &[Value]) {}
        fn on_error(&mut self, _error: &str) {}
        fn on_message_annotation(&mut self, _annotation: &Map<String, Value>) {}
        fn on_finish(&mut self, _finish_reason: &str, _usage: &Usage) {}
    }

    #[test]
    fn default_tool_callbacks_render_text() {
        let mut handler = TextOnly::default();
        dispatch(
            &StreamPart::ToolCallStreamStart {
                tool_call_id: "call_1".into(),
                tool_name: "shell".into(),
            },
            &mut handler,
        );
        dispatch(
            &StreamPart::ToolCallDelta {
                tool_call_id: "call_1".into(),
                args_text_delta: "{\"cmd\":".into(),
            },
            &mut handler,
        );
        let args = json!({"cmd": "ls"}).as_object().cloned().unwrap();
        dispatch(
            &StreamPart::ToolCall {
                tool_call_id: "call_1".into(),
                tool_name: "shell".into(),
                args,
            },
            &mut handler,
        );
        dispatch(
            &StreamPart::ToolResult {
                tool_call_id: "call_1".into(),
                result: json!("src\nCargo.toml"),
            },
            &mut handler,
        );

        assert_eq!(
            handler.texts,
            vec![
                "\nStarting tool call: shell (ID: call_1)".to_string(),
                "{\"cmd\":".to_string(),
                "\nCalling tool: shell (ID: call_1) with args: {\"cmd\":\"ls\"}".to_string(),
                "\nTool result (ID: call_1): \"src\\nCargo.toml\"".to_string(),
            ]
        );
    }

    #[test]
    fn finish_step_is_silent_by_default() {
        let mut handler = TextOnly::default();
        dispatch(
            &StreamPart::FinishStep {
                finish_reason: "tool-calls".into(),
                usage: Usage::new(),
                is_continued: true,
            },
            &mut handler,
        );
        assert!(handler.texts.is_empty());
    }
}
