//! Marker create/update/parse.
//!
//! Embedded textual form of one tool call:
//!
//! ```text
//! <!--vm-tool:{id}|{tool}|{display}|{icon}|{confirm}|{executing}|{encoded-result}-->{visible}<!--/vm-tool-->
//! ```
//!
//! Structural fields are delimiter-separated plain text and must not
//! contain `|` (callers sanitize; the codec strips defensively). The
//! result payload always goes through the result encoder, even when empty,
//! so the comment terminator can never appear inside it.

use crate::encoding::{decode_result, encode_result};
use serde::{Deserialize, Serialize};
use tracing::warn;

const OPEN_PREFIX: &str = "<!--vm-tool:";
const OPEN_SUFFIX: &str = "-->";
const CLOSE: &str = "<!--/vm-tool-->";

/// Number of `|`-separated fields in the open delimiter.
const FIELD_COUNT: usize = 7;

/// Results longer than this, in chars, are replaced with a placeholder at
/// parse time only; the stored text is untouched.
const RESULT_CEILING: usize = 5_000;

/// The live/rendered representation of one tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub id: String,
    pub tool_name: String,
    pub display_name: String,
    pub icon: String,
    pub confirmation_message: String,
    pub is_executing: bool,
    /// Text rendered between the delimiters while the call runs
    pub visible_content: String,
    /// Decoded result payload; empty until the call settles
    pub result: String,
}

/// One piece of a parsed buffer: either plain text or a decoded marker.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Text(String),
    Marker(Marker),
}

/// Strip characters that would corrupt the delimiter structure.
fn sanitize_field(field: &str) -> String {
    field
        .chars()
        .filter(|c| !matches!(c, '|' | '<' | '>'))
        .collect()
}

/// Produce the embedded textual span for a marker.
pub fn create_marker(marker: &Marker) -> String {
    format!(
        "{}{}|{}|{}|{}|{}|{}|{}{}{}{}",
        OPEN_PREFIX,
        sanitize_field(&marker.id),
        sanitize_field(&marker.tool_name),
        sanitize_field(&marker.display_name),
        sanitize_field(&marker.icon),
        sanitize_field(&marker.confirmation_message),
        marker.is_executing,
        encode_result(&marker.result),
        OPEN_SUFFIX,
        marker.visible_content,
        CLOSE,
    )
}

/// Flip the executing marker with the given id to settled and replace its
/// encoded result.
///
/// Matches by id anchor, not by position, so it is safe on a large buffer
/// with many markers. Returns the input unchanged when no executing marker
/// with that id exists.
pub fn update_marker(text: &str, id: &str, result: &str) -> String {
    let anchor = format!("{}{}|", OPEN_PREFIX, sanitize_field(id));
    let Some(start) = text.find(&anchor) else {
        return text.to_string();
    };
    let fields_start = start + OPEN_PREFIX.len();
    let Some(rel_end) = text[fields_start..].find(OPEN_SUFFIX) else {
        return text.to_string();
    };
    let fields_end = fields_start + rel_end;

    let fields: Vec<&str> = text[fields_start..fields_end].split('|').collect();
    if fields.len() != FIELD_COUNT {
        warn!(id, "Malformed marker fields, leaving buffer untouched");
        return text.to_string();
    }
    if fields[5] != "true" {
        // Already settled (or never executing): no-op
        return text.to_string();
    }

    let rebuilt = format!(
        "{}|{}|{}|{}|{}|false|{}",
        fields[0],
        fields[1],
        fields[2],
        fields[3],
        fields[4],
        encode_result(result),
    );

    let mut out = String::with_capacity(text.len() + result.len());
    out.push_str(&text[..fields_start]);
    out.push_str(&rebuilt);
    out.push_str(&text[fields_end..]);
    out
}

/// Split a buffer into alternating plain-text segments and decoded
/// markers, preserving order.
///
/// Malformed spans (missing terminator, wrong field count) degrade to
/// plain text rather than erroring.
pub fn parse_markers(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut cursor = 0;

    while let Some(rel_start) = text[cursor..].find(OPEN_PREFIX) {
        let start = cursor + rel_start;

        let fields_start = start + OPEN_PREFIX.len();
        let Some(rel_fields_end) = text[fields_start..].find(OPEN_SUFFIX) else {
            break;
        };
        let fields_end = fields_start + rel_fields_end;
        let visible_start = fields_end + OPEN_SUFFIX.len();

        let Some(rel_close) = text[visible_start..].find(CLOSE) else {
            break;
        };
        let close_start = visible_start + rel_close;

        let fields: Vec<&str> = text[fields_start..fields_end].split('|').collect();
        if fields.len() != FIELD_COUNT {
            // Not a well-formed marker: emit through the open prefix as
            // plain text and keep scanning after it
            segments.push(Segment::Text(
                text[cursor..start + OPEN_PREFIX.len()].to_string(),
            ));
            cursor = start + OPEN_PREFIX.len();
            continue;
        }

        if start > cursor {
            segments.push(Segment::Text(text[cursor..start].to_string()));
        }

        let tool_name = fields[1].to_string();
        let decoded = decode_result(fields[6]);
        let result = if decoded.chars().count() > RESULT_CEILING {
            format!("[result omitted: {tool_name}]")
        } else {
            decoded
        };

        segments.push(Segment::Marker(Marker {
            id: fields[0].to_string(),
            tool_name,
            display_name: fields[2].to_string(),
            icon: fields[3].to_string(),
            confirmation_message: fields[4].to_string(),
            is_executing: fields[5] == "true",
            visible_content: text[visible_start..close_start].to_string(),
            result,
        }));

        cursor = close_start + CLOSE.len();
    }

    if cursor < text.len() {
        segments.push(Segment::Text(text[cursor..].to_string()));
    }
    segments
}
