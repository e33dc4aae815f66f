//! Wire shapes of the JSON-bearing units and their conversion into
//! [`StreamPart`]s.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Number, Value};

use super::part::{StreamPart, Usage};
use super::tag::StreamTag;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ToolCallPayload {
    tool_call_id: String,
    tool_name: String,
    args: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ToolResultPayload {
    tool_call_id: String,
    result: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ToolCallStreamStartPayload {
    tool_call_id: String,
    tool_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ToolCallDeltaPayload {
    tool_call_id: String,
    args_text_delta: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FinishMessagePayload {
    finish_reason: String,
    usage: BTreeMap<String, Number>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FinishStepPayload {
    finish_reason: String,
    usage: BTreeMap<String, Number>,
    is_continued: bool,
}

/// Coerce usage counters to integers, truncating fractional values.
fn coerce_usage(raw: BTreeMap<String, Number>) -> Usage {
    raw.into_iter()
        .map(|(key, n)| {
            let count = n
                .as_i64()
                .or_else(|| n.as_u64().map(|v| i64::try_from(v).unwrap_or(i64::MAX)))
                .or_else(|| n.as_f64().map(|v| v.trunc() as i64))
                .unwrap_or_default();
            (key, count)
        })
        .collect()
}

/// Build the part for a JSON-bearing tag from an already parsed document.
///
/// A shape mismatch is reported as `Err` with serde's description of the
/// offending field.
pub(crate) fn part_from_json(tag: StreamTag, value: Value) -> Result<StreamPart, serde_json::Error> {
    let part = match tag {
        StreamTag::Data => StreamPart::Data {
            content: serde_json::from_value(value)?,
        },
        StreamTag::MessageAnnotation => StreamPart::MessageAnnotation {
            annotation: serde_json::from_value(value)?,
        },
        StreamTag::ToolCall => {
            let p: ToolCallPayload = serde_json::from_value(value)?;
            StreamPart::ToolCall {
                tool_call_id: p.tool_call_id,
                tool_name: p.tool_name,
                args: p.args,
            }
        }
        StreamTag::ToolResult => {
            let p: ToolResultPayload = serde_json::from_value(value)?;
            StreamPart::ToolResult {
                tool_call_id: p.tool_call_id,
                result: p.result,
            }
        }
        StreamTag::ToolCallStreamStart => {
            let p: ToolCallStreamStartPayload = serde_json::from_value(value)?;
            StreamPart::ToolCallStreamStart {
                tool_call_id: p.tool_call_id,
                tool_name: p.tool_name,
            }
        }
        StreamTag::ToolCallDelta => {
            let p: ToolCallDeltaPayload = serde_json::from_value(value)?;
            StreamPart::ToolCallDelta {
                tool_call_id: p.tool_call_id,
                args_text_delta: p.args_text_delta,
            }
        }
        StreamTag::FinishMessage => {
            let p: FinishMessagePayload = serde_json::from_value(value)?;
            StreamPart::FinishMessage {
                finish_reason: p.finish_reason,
                usage: coerce_usage(p.usage),
            }
        }
        StreamTag::FinishStep => {
            let p: FinishStepPayload = serde_json::from_value(value)?;
            StreamPart::FinishStep {
                finish_reason: p.finish_reason,
                usage: coerce_usage(p.usage),
                is_continued: p.is_continued,
            }
        }
        StreamTag::Text | StreamTag::Error => {
            return Err(serde::de::Error::custom(format!(
                "{} units do not carry JSON payloads",
                tag.unit_name()
            )));
        }
    };
    Ok(part)
}
