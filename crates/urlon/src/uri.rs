//! Percent-coding with the exact character classes of ECMAScript's
//! `encodeURI` and `decodeURI`.
//!
//! The service percent-decodes the query with `decodeURI`, which leaves escapes
//! of reserved characters untouched. Encoding with a broader set (as
//! `encodeURIComponent` would) therefore does not round-trip.

use crate::UrlonError;

/// Characters `encodeURI` never escapes, besides ASCII alphanumerics.
const URI_UNESCAPED: &[u8] = b";,/?:@&=+$-_.!~*'()#";

/// Characters whose escapes `decodeURI` leaves in place.
const URI_RESERVED: &[u8] = b";/?:@&=+$,#";

const HEX: &[u8; 16] = b"0123456789ABCDEF";

/// Percent-encodes `input` the way `encodeURI` does.
pub fn encode_uri(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for &byte in input.as_bytes() {
        if byte.is_ascii_alphanumeric() || URI_UNESCAPED.contains(&byte) {
            out.push(byte as char);
        } else {
            out.push('%');
            out.push(HEX[(byte >> 4) as usize] as char);
            out.push(HEX[(byte & 0x0F) as usize] as char);
        }
    }
    out
}

/// Percent-decodes `input` the way `decodeURI` does.
///
/// Escapes that decode to a reserved character are kept verbatim.
pub fn decode_uri(input: &str) -> Result<String, UrlonError> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'%' {
            out.push(bytes[i]);
            i += 1;
            continue;
        }
        let escape = bytes.get(i + 1..i + 3).ok_or_else(|| UrlonError::InvalidEscape {
            detail: format!("truncated escape at byte {i}"),
        })?;
        let byte = match (hex_value(escape[0]), hex_value(escape[1])) {
            (Some(hi), Some(lo)) => (hi << 4) | lo,
            _ => {
                return Err(UrlonError::InvalidEscape {
                    detail: format!("non-hex escape at byte {i}"),
                })
            }
        };
        if URI_RESERVED.contains(&byte) {
            out.extend_from_slice(&bytes[i..i + 3]);
        } else {
            out.push(byte);
        }
        i += 3;
    }
    String::from_utf8(out).map_err(|e| UrlonError::InvalidEscape {
        detail: format!("escapes decode to invalid UTF-8: {e}"),
    })
}

fn hex_value(digit: u8) -> Option<u8> {
    match digit {
        b'0'..=b'9' => Some(digit - b'0'),
        b'a'..=b'f' => Some(digit - b'a' + 10),
        b'A'..=b'F' => Some(digit - b'A' + 10),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_keeps_uri_punctuation() {
        assert_eq!(encode_uri("a-b_c.d!e~f*g'h(i)"), "a-b_c.d!e~f*g'h(i)");
        assert_eq!(encode_uri("$k=v&x;y/z?"), "$k=v&x;y/z?");
    }

    #[test]
    fn encode_escapes_space_percent_and_non_ascii() {
        assert_eq!(encode_uri("new york"), "new%20york");
        assert_eq!(encode_uri("100%"), "100%25");
        assert_eq!(encode_uri("Åland"), "%C3%85land");
    }

    #[test]
    fn decode_reverses_encode() {
        let text = "Côte d'Ivoire 100% [x]";
        assert_eq!(decode_uri(&encode_uri(text)).unwrap(), text);
    }

    #[test]
    fn decode_keeps_reserved_escapes() {
        assert_eq!(decode_uri("a%26b%3Bc%20d").unwrap(), "a%26b%3Bc d");
    }

    #[test]
    fn decode_rejects_malformed_escapes() {
        assert!(matches!(decode_uri("abc%2"), Err(UrlonError::InvalidEscape { .. })));
        assert!(matches!(decode_uri("abc%zz"), Err(UrlonError::InvalidEscape { .. })));
        assert!(matches!(decode_uri("%C3"), Err(UrlonError::InvalidEscape { .. })));
    }
}
