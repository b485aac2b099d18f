//! # VaultMind Marker Protocol
//!
//! Tool-call lifecycle state rendered *inside* the streamed message text.
//!
//! The assistant's response is one growing text buffer that passes through
//! a markdown renderer on its way to the UI. Tool calls are rendered live
//! in that same buffer as self-delimited marker spans: created in an
//! "executing" state when a foreground call is dispatched, flipped exactly
//! once to a settled state carrying the call's result. The codec here is a
//! thin adapter at that text boundary — scheduling decisions are always
//! made on structured data, never by parsing markers back.
//!
//! Encode/decode never raise. Worst case they degrade to passing raw text
//! through, which downstream consumers treat as opaque plain text.

mod buffer;
mod encoding;
mod marker;

pub use buffer::TurnBuffer;
pub use encoding::{decode_result, encode_result};
pub use marker::{Marker, Segment, create_marker, parse_markers, update_marker};
