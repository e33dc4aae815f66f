//! Line-level driver that feeds a parser and a handler and assembles the
//! final response.

use tracing::debug;

use super::{dispatch, StreamHandler, TextDeltaTracker};
use crate::protocol::{split_tagged_line, StreamParser, StreamPart, StreamTag, Usage};
use crate::types::{ChatMessage, ChatResponse};

/// Drives one streamed reply from raw lines to handler callbacks.
///
/// Unlike plain [`dispatch`], text reaches [`StreamHandler::on_text`] as
/// deltas, so handlers can append without duplicating earlier output. The
/// parser is reset after every finish message, which lets one dispatcher
/// consume several messages in a row.
#[derive(Debug, Default)]
pub struct StreamDispatcher {
    parser: StreamParser,
    deltas: TextDeltaTracker,
    text: String,
    error: Option<String>,
    finish_reason: Option<String>,
    usage: Option<Usage>,
}

impl StreamDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode one line and notify `handler`. Returns the decoded part, with
    /// text still in its cumulative form.
    pub fn feed_line<H: StreamHandler + ?Sized>(
        &mut self,
        line: &str,
        handler: &mut H,
    ) -> Option<StreamPart> {
        let starts_block = matches!(
            split_tagged_line(line),
            Some((tag, _)) if tag == StreamTag::Text.as_char()
        );
        let part = self.parser.parse_line(line)?;

        match &part {
            StreamPart::Text { content } => {
                let delta = self.deltas.observe(content, starts_block);
                if !delta.is_empty() {
                    self.text.push_str(delta);
                    handler.on_text(delta);
                }
            }
            StreamPart::Error { message } => {
                self.error = Some(message.clone());
                dispatch(&part, handler);
            }
            StreamPart::FinishMessage {
                finish_reason,
                usage,
            } => {
                self.finish_reason = Some(finish_reason.clone());
                self.usage = Some(usage.clone());
                dispatch(&part, handler);
                debug!(finish_reason = %finish_reason, "message finished, resetting parser");
                self.parser.reset();
                self.deltas.reset();
            }
            _ => dispatch(&part, handler),
        }

        Some(part)
    }

    /// Assistant text received so far.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Last error reported by the stream, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Build the response from everything seen so far.
    pub fn finish(self) -> ChatResponse {
        ChatResponse {
            message: ChatMessage::assistant(self.text),
            error: self.error,
            finish_reason: self.finish_reason,
            usage: self.usage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Map, Value};

    #[derive(Default)]
    struct Collect {
        text: String,
        finishes: usize,
    }

    impl StreamHandler for Collect {
        fn on_text(&mut self, text: &str) {
            self.text.push_str(text);
        }
        fn on_data(&mut self, _data: &[Value]) {}
        fn on_error(&mut self, _error: &str) {}
        fn on_message_annotation(&mut self, _annotation: &Map<String, Value>) {}
        fn on_finish(&mut self, _finish_reason: &str, _usage: &Usage) {
            self.finishes += 1;
        }
    }

    #[test]
    fn appending_deltas_reproduces_the_block() {
        let mut dispatcher = StreamDispatcher::new();
        let mut handler = Collect::default();
        for line in ["0:First line", "Second line", "", "Third"] {
            dispatcher.feed_line(line, &mut handler);
        }
        assert_eq!(handler.text, "First line\nSecond line\n\nThird");
        assert_eq!(dispatcher.text(), handler.text);
    }

    #[test]
    fn consecutive_text_units_concatenate() {
        let mut dispatcher = StreamDispatcher::new();
        let mut handler = Collect::default();
        for line in ["0:\"Hello\"", "0:\" world\""] {
            dispatcher.feed_line(line, &mut handler);
        }
        assert_eq!(handler.text, "Hello world");
    }

    #[test]
    fn resets_parser_after_finish_message() {
        let mut dispatcher = StreamDispatcher::new();
        let mut handler = Collect::default();
        dispatcher.feed_line(
            "d:{\"finishReason\":\"stop\",\"usage\":{\"prompt_tokens\":1}}",
            &mut handler,
        );
        assert_eq!(dispatcher.parser.current_tag(), None);
        assert_eq!(handler.finishes, 1);

        let response = dispatcher.finish();
        assert_eq!(response.finish_reason.as_deref(), Some("stop"));
        assert_eq!(response.usage.unwrap()["prompt_tokens"], 1);
    }

    #[test]
    fn records_last_error() {
        let mut dispatcher = StreamDispatcher::new();
        let mut handler = Collect::default();
        dispatcher.feed_line("3:\"first\"", &mut handler);
        dispatcher.feed_line("3:\"second\"", &mut handler);
        assert_eq!(dispatcher.error(), Some("second"));
        assert_eq!(dispatcher.finish().error.as_deref(), Some("second"));
    }
}
