//! Octal escape codec for `%output` payloads
//!
//! tmux control mode vis-encodes pane output: a byte outside printable ASCII
//! (and backslash itself) is written as a backslash followed by exactly three
//! octal digits. [`decode`] reverses that; it is a total function over any
//! input and recovers from malformed escapes by passing them through
//! literally.

/// Decode an octal-escaped payload into raw bytes.
///
/// Rules, applied left to right in a single pass with no backtracking:
/// - `\` followed by exactly three octal digits decodes to that one byte
/// - `\\` decodes to one literal backslash
/// - any other backslash (including a trailing fragment shorter than three
///   digits) passes through unchanged, as does every non-backslash byte
pub fn decode(input: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(input.len());
    let mut i = 0;

    while i < input.len() {
        let b = input[i];
        if b != b'\\' {
            out.push(b);
            i += 1;
            continue;
        }

        // Backslash escape
        if input.get(i + 1) == Some(&b'\\') {
            out.push(b'\\');
            i += 2;
        } else if let Some(value) = octal_triplet(&input[i + 1..]) {
            out.push(value);
            i += 4;
        } else {
            // Malformed or truncated escape: literal passthrough
            out.push(b'\\');
            i += 1;
        }
    }

    out
}

/// Encode raw bytes into the escaped wire representation.
///
/// Bytes outside printable ASCII (controls, DEL, anything >= 0x80) and the
/// backslash are written as three-octal-digit escapes; everything else passes
/// through. `decode(encode(x)) == x` for every byte string.
pub fn encode(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len());
    for &b in data {
        if b < 0x20 || b >= 0x7f || b == b'\\' {
            out.push_str(&format!("\\{:03o}", b));
        } else {
            out.push(b as char);
        }
    }
    out
}

/// Parse three octal digits into a byte, if present.
fn octal_triplet(input: &[u8]) -> Option<u8> {
    if input.len() < 3 {
        return None;
    }
    let mut value: u32 = 0;
    for &d in &input[..3] {
        if !(b'0'..=b'7').contains(&d) {
            return None;
        }
        value = value * 8 + u32::from(d - b'0');
    }
    // Three octal digits can name up to 0o777; anything past a byte is not an
    // escape tmux would produce, treat it as malformed.
    u8::try_from(value).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_plain_text_unchanged() {
        assert_eq!(decode(b"abc"), b"abc");
    }

    #[test]
    fn decode_octal_space() {
        assert_eq!(decode(b"\\040"), b" ");
    }

    #[test]
    fn decode_double_backslash() {
        assert_eq!(decode(b"\\\\"), b"\\");
    }

    #[test]
    fn decode_trailing_fragment_passes_through() {
        assert_eq!(decode(b"a\\04"), b"a\\04");
    }

    #[test]
    fn decode_lone_trailing_backslash() {
        assert_eq!(decode(b"abc\\"), b"abc\\");
    }

    #[test]
    fn decode_non_octal_digit_passes_through() {
        assert_eq!(decode(b"\\049"), b"\\049");
    }

    #[test]
    fn decode_crlf() {
        assert_eq!(decode(b"hello\\015\\012"), b"hello\r\n");
    }

    #[test]
    fn decode_escape_sequence_payload() {
        assert_eq!(decode(b"\\033[1mtest"), b"\x1b[1mtest");
    }

    #[test]
    fn decode_backslash_then_valid_escape() {
        // The double backslash consumes both; the octal escape follows.
        assert_eq!(decode(b"\\\\\\040"), b"\\ ");
    }

    #[test]
    fn decode_out_of_range_octal_passes_through() {
        // 0o777 does not fit a byte; not something tmux emits.
        assert_eq!(decode(b"\\777"), b"\\777");
    }

    #[test]
    fn encode_plain_ascii_unchanged() {
        assert_eq!(encode(b"normal text 123!@#"), "normal text 123!@#");
    }

    #[test]
    fn encode_controls_and_backslash() {
        assert_eq!(encode(b"\t\0"), "\\011\\000");
        assert_eq!(encode(b"back\\slash"), "back\\134slash");
        assert_eq!(encode(b"hello\r\n"), "hello\\015\\012");
    }

    #[test]
    fn encode_high_bytes() {
        assert_eq!(encode(&[0x7f, 0x80, 0xff]), "\\177\\200\\377");
    }

    #[test]
    fn roundtrip_every_byte_value() {
        let all: Vec<u8> = (0u8..=255).collect();
        assert_eq!(decode(encode(&all).as_bytes()), all);
    }

    #[test]
    fn roundtrip_mixed_payload() {
        let payload = b"ls -la\r\n\x1b[0;32mok\x1b[0m \\ done";
        assert_eq!(decode(encode(payload).as_bytes()), payload);
    }

    #[test]
    fn decode_empty() {
        assert_eq!(decode(b""), b"");
        assert_eq!(encode(b""), "");
    }
}
