//! Reversible result-payload encoding.
//!
//! A marker's result payload is arbitrary tool output — it may contain the
//! marker delimiter's own terminator sequence (`-->`), the field separator
//! (`|`), or nested markup. The payload is therefore percent-encoded with
//! a short prefix tag before being embedded: every byte that could
//! participate in a structural sequence is escaped, so `-->` can never
//! appear literally inside an encoded payload.

/// Prefix identifying an encoded payload. Payloads without it are passed
/// through unchanged by `decode_result`.
const PREFIX: &str = "enc1:";

/// Characters that must never appear literally in an encoded payload.
/// `%` first so decoding is unambiguous; `-` and `>` cover the comment
/// terminator, `<` the opener, `|` the field separator.
const ESCAPED: &[char] = &['%', '|', '<', '>', '-'];

/// Encode a result payload for embedding inside a marker span.
pub fn encode_result(raw: &str) -> String {
    let mut out = String::with_capacity(PREFIX.len() + raw.len());
    out.push_str(PREFIX);
    for ch in raw.chars() {
        if ESCAPED.contains(&ch) {
            out.push('%');
            out.push_str(&format!("{:02X}", ch as u32));
        } else {
            out.push(ch);
        }
    }
    out
}

/// Decode an encoded payload back to the original string.
///
/// Defensive: input without the `enc1:` prefix, or with malformed escape
/// sequences, is returned unchanged rather than erroring.
pub fn decode_result(encoded: &str) -> String {
    let Some(body) = encoded.strip_prefix(PREFIX) else {
        return encoded.to_string();
    };

    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(ch) = chars.next() {
        if ch != '%' {
            out.push(ch);
            continue;
        }
        let hi = chars.next();
        let lo = chars.next();
        let decoded = match (hi, lo) {
            (Some(h), Some(l)) => u32::from_str_radix(&format!("{h}{l}"), 16)
                .ok()
                .and_then(char::from_u32),
            _ => None,
        };
        match decoded {
            Some(c) => out.push(c),
            // Malformed escape: bail out and hand back the input as-is
            None => return encoded.to_string(),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_plain_text() {
        let raw = "found 3 notes";
        assert_eq!(decode_result(&encode_result(raw)), raw);
    }

    #[test]
    fn roundtrip_with_terminator_sequence() {
        let raw = r#"{"k":"v --> </script>"}"#;
        let encoded = encode_result(raw);
        assert!(!encoded.contains("-->"));
        assert_eq!(decode_result(&encoded), raw);
    }

    #[test]
    fn roundtrip_field_separator_and_percent() {
        let raw = "a|b % 100 <tag>";
        let encoded = encode_result(raw);
        assert!(!encoded.contains('|'));
        assert!(!encoded.contains('<'));
        assert_eq!(decode_result(&encoded), raw);
    }

    #[test]
    fn roundtrip_empty() {
        assert_eq!(decode_result(&encode_result("")), "");
    }

    #[test]
    fn decode_without_prefix_passes_through() {
        assert_eq!(decode_result("plain text"), "plain text");
    }

    #[test]
    fn decode_malformed_escape_returns_input() {
        // Truncated escape sequence
        assert_eq!(decode_result("enc1:abc%2"), "enc1:abc%2");
        // Non-hex escape
        assert_eq!(decode_result("enc1:abc%ZZ"), "enc1:abc%ZZ");
    }

    #[test]
    fn roundtrip_unicode() {
        let raw = "résumé — 完了 -->";
        assert_eq!(decode_result(&encode_result(raw)), raw);
    }
}
