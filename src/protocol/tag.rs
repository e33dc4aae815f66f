//! Type tags of the data-stream protocol.
//!
//! Every logical unit starts on a line of the form `<tag>:<payload>` where
//! `<tag>` is a single lowercase hex digit. Only part of that alphabet is
//! assigned; the rest is matched as a tag but decodes to nothing.

use std::sync::OnceLock;

use regex::Regex;
use strum::{Display, EnumString};

static TAG_PATTERN: OnceLock<Regex> = OnceLock::new();

fn tag_pattern() -> &'static Regex {
    TAG_PATTERN.get_or_init(|| Regex::new(r"^([0-9a-f]):").expect("tag pattern is valid"))
}

/// Split a tag line into its tag character and same-line payload.
///
/// Returns `None` for continuation lines. Unassigned tags (`1`, `4`..`7`,
/// `f`) are still returned here; use [`StreamTag::from_char`] to tell them
/// apart.
pub fn split_tagged_line(line: &str) -> Option<(char, &str)> {
    let caps = tag_pattern().captures(line)?;
    let tag = caps.get(1)?.as_str().chars().next()?;
    let prefix = caps.get(0)?;
    Some((tag, &line[prefix.end()..]))
}

/// A recognized type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum StreamTag {
    #[strum(serialize = "0")]
    Text,
    #[strum(serialize = "2")]
    Data,
    #[strum(serialize = "3")]
    Error,
    #[strum(serialize = "8")]
    MessageAnnotation,
    #[strum(serialize = "9")]
    ToolCall,
    #[strum(serialize = "a")]
    ToolResult,
    #[strum(serialize = "b")]
    ToolCallStreamStart,
    #[strum(serialize = "c")]
    ToolCallDelta,
    #[strum(serialize = "d")]
    FinishMessage,
    #[strum(serialize = "e")]
    FinishStep,
}

/// How the payload following a tag is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    /// Raw, possibly escaped and quoted text that may span lines.
    Text,
    /// A single-line quoted string.
    QuotedString,
    /// A JSON document that may span lines.
    Json,
}

impl StreamTag {
    /// Look up a tag character; `None` for unassigned tags.
    pub fn from_char(c: char) -> Option<Self> {
        let mut buf = [0u8; 4];
        c.encode_utf8(&mut buf).parse().ok()
    }

    /// The wire character for this tag.
    pub fn as_char(self) -> char {
        match self {
            Self::Text => '0',
            Self::Data => '2',
            Self::Error => '3',
            Self::MessageAnnotation => '8',
            Self::ToolCall => '9',
            Self::ToolResult => 'a',
            Self::ToolCallStreamStart => 'b',
            Self::ToolCallDelta => 'c',
            Self::FinishMessage => 'd',
            Self::FinishStep => 'e',
        }
    }

    pub fn payload_kind(self) -> PayloadKind {
        match self {
            Self::Text => PayloadKind::Text,
            Self::Error => PayloadKind::QuotedString,
            _ => PayloadKind::Json,
        }
    }

    /// Human-readable unit name, used in structural error messages.
    pub fn unit_name(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Data => "data",
            Self::Error => "error",
            Self::MessageAnnotation => "message annotation",
            Self::ToolCall => "tool call",
            Self::ToolResult => "tool result",
            Self::ToolCallStreamStart => "tool call stream start",
            Self::ToolCallDelta => "tool call delta",
            Self::FinishMessage => "finish message",
            Self::FinishStep => "finish step",
        }
    }
}
