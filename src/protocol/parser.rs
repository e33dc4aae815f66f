//! Incremental line decoder for the data-stream protocol.

use serde_json::Value;
use tracing::{debug, trace, warn};

use super::part::StreamPart;
use super::payloads::part_from_json;
use super::tag::{split_tagged_line, PayloadKind, StreamTag};
use super::text::decode_text_payload;

/// What the parser expects from the next line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParserState {
    /// Between units; continuation lines are dropped.
    #[default]
    ExpectType,
    /// Inside a text block; continuation lines extend it.
    InTextContent,
    /// Inside an incomplete JSON unit; continuation lines are appended.
    InJsonContent,
}

/// Stateful decoder turning protocol lines into [`StreamPart`]s.
///
/// Feed lines in order with [`parse_line`](Self::parse_line); each call yields
/// at most one part. The parser does not reset itself after a finish marker:
/// call [`reset`](Self::reset) before reusing an instance for another message.
///
/// ```
/// use goose_stream::protocol::{StreamParser, StreamPart};
///
/// let mut parser = StreamParser::new();
/// assert_eq!(parser.parse_line("0:First line"), Some(StreamPart::text("First line")));
/// assert_eq!(
///     parser.parse_line("Second line"),
///     Some(StreamPart::text("First line\nSecond line")),
/// );
/// ```
#[derive(Debug, Default)]
pub struct StreamParser {
    state: ParserState,
    current_tag: Option<char>,
    text_buffer: String,
    json_buffer: String,
}

impl StreamParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    /// Tag character of the unit seen last, recognized or not.
    pub fn current_tag(&self) -> Option<char> {
        self.current_tag
    }

    /// Decode one line (without its trailing newline).
    ///
    /// Returns `None` when the line completes nothing: incomplete JSON, an
    /// orphan continuation line, an unassigned tag, or an empty line outside
    /// a text block.
    pub fn parse_line(&mut self, line: &str) -> Option<StreamPart> {
        trace!(line, state = ?self.state, "parsing line");

        if line.is_empty() {
            return self.on_empty_line();
        }

        if let Some((tag, payload)) = split_tagged_line(line) {
            return self.on_tag_line(tag, payload);
        }

        match self.state {
            ParserState::InTextContent => Some(self.handle_text(line, false)),
            ParserState::InJsonContent => {
                self.json_buffer.push_str(line);
                self.try_parse_json()
            }
            ParserState::ExpectType => {
                trace!(line, "dropping orphan continuation line");
                None
            }
        }
    }

    /// Return to the freshly constructed state.
    pub fn reset(&mut self) {
        debug!("resetting stream parser");
        self.state = ParserState::ExpectType;
        self.current_tag = None;
        self.text_buffer.clear();
        self.json_buffer.clear();
    }

    fn on_empty_line(&mut self) -> Option<StreamPart> {
        match self.state {
            ParserState::InTextContent => {
                self.text_buffer.push('\n');
                Some(StreamPart::text(self.text_buffer.clone()))
            }
            ParserState::InJsonContent => {
                self.json_buffer.push('\n');
                None
            }
            ParserState::ExpectType => None,
        }
    }

    fn on_tag_line(&mut self, tag: char, payload: &str) -> Option<StreamPart> {
        if self.current_tag != Some(tag) {
            if !self.text_buffer.is_empty() || !self.json_buffer.is_empty() {
                debug!(
                    from = ?self.current_tag,
                    to = %tag,
                    text_len = self.text_buffer.len(),
                    json_len = self.json_buffer.len(),
                    "tag change, discarding buffered content"
                );
            }
            self.text_buffer.clear();
            self.json_buffer.clear();
        }
        self.current_tag = Some(tag);

        let Some(known) = StreamTag::from_char(tag) else {
            debug!(tag = %tag, "ignoring unit with unknown tag");
            self.state = ParserState::ExpectType;
            return None;
        };

        match known.payload_kind() {
            PayloadKind::Text => {
                self.state = ParserState::InTextContent;
                Some(self.handle_text(payload, true))
            }
            PayloadKind::QuotedString => {
                self.state = ParserState::ExpectType;
                Some(StreamPart::error(strip_wrapping_quotes(payload)))
            }
            PayloadKind::Json => {
                self.state = ParserState::InJsonContent;
                self.json_buffer.push_str(payload);
                self.try_parse_json()
            }
        }
    }

    fn handle_text(&mut self, raw: &str, starts_block: bool) -> StreamPart {
        let decoded = decode_text_payload(raw);
        if starts_block {
            self.text_buffer.clear();
            self.text_buffer.push_str(&decoded);
            StreamPart::text(decoded)
        } else {
            self.text_buffer.push('\n');
            self.text_buffer.push_str(&decoded);
            StreamPart::text(self.text_buffer.clone())
        }
    }

    fn try_parse_json(&mut self) -> Option<StreamPart> {
        let tag = self.current_tag.and_then(StreamTag::from_char)?;

        let value: Value = match serde_json::from_str(&self.json_buffer) {
            Ok(value) => value,
            Err(e) => {
                debug!(
                    tag = %tag,
                    buffered = self.json_buffer.len(),
                    error = %e,
                    "JSON unit incomplete, buffering"
                );
                return None;
            }
        };

        self.state = ParserState::ExpectType;
        self.json_buffer.clear();

        match part_from_json(tag, value) {
            Ok(part) => Some(part),
            Err(e) => {
                warn!(tag = %tag, error = %e, "structurally invalid unit");
                Some(StreamPart::error(format!(
                    "Failed to parse {}: {e}",
                    tag.unit_name()
                )))
            }
        }
    }
}

fn strip_wrapping_quotes(payload: &str) -> &str {
    payload
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(payload)
}
