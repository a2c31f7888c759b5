//! UTF-8 decoding and JSON-style string quoting used by the tokenizer and
//! by `to_source` of string values.

/// Decodes bytes into a string. On malformed input the successfully decoded
/// prefix is retained and the flag is false; overlong encodings and
/// surrogate halves are rejected.
pub fn decode_utf8(bytes: &[u8]) -> (String, bool)
{
    match std::str::from_utf8(bytes)
    {
        Ok(s) => (s.to_string(), true),
        Err(e) =>
        {
            let valid = &bytes[..e.valid_up_to()];
            let prefix = String::from_utf8_lossy(valid).into_owned();

            (prefix, false)
        }
    }
}

pub fn encode_utf8(s: &str) -> Vec<u8>
{
    s.as_bytes().to_vec()
}

/// Wraps the string in double quotes, escaping `"`, `\`, control codes and
/// every non-printable or non-ASCII code point with `\uXXXX`. Code points
/// above U+FFFF become surrogate pairs, as in JSON.
pub fn json_stringify(s: &str) -> String
{
    let mut result = String::with_capacity(s.len() + 2);

    result.push('"');
    for c in s.chars()
    {
        match c
        {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\u{8}' => result.push_str("\\b"),
            '\t' => result.push_str("\\t"),
            '\n' => result.push_str("\\n"),
            '\u{c}' => result.push_str("\\f"),
            '\r' => result.push_str("\\r"),
            c =>
            {
                let cp = c as u32;

                if (0x20..=0x7e).contains(&cp)
                {
                    result.push(c);
                }
                else if cp > 0xffff
                {
                    let reduced = cp - 0x10000;
                    let high = 0xd800 + (reduced >> 10);
                    let low = 0xdc00 + (reduced & 0x3ff);

                    result.push_str(&format!("\\u{:04x}\\u{:04x}", high, low));
                }
                else
                {
                    result.push_str(&format!("\\u{:04x}", cp));
                }
            }
        }
    }
    result.push('"');

    result
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn decode_valid_input()
    {
        let (text, ok) = decode_utf8("p\u{e4}iv\u{e4}\u{e4}".as_bytes());
        assert!(ok);
        assert_eq!(text, "p\u{e4}iv\u{e4}\u{e4}");
    }

    #[test]
    fn decode_keeps_prefix_on_failure()
    {
        let (text, ok) = decode_utf8(b"ab\xff");
        assert!(!ok);
        assert_eq!(text, "ab");
    }

    #[test]
    fn decode_rejects_surrogate_half()
    {
        // U+D800 encoded directly is not valid UTF-8.
        let (_, ok) = decode_utf8(b"\xed\xa0\x80");
        assert!(!ok);
    }

    #[test]
    fn encode_decode_round_trip()
    {
        let bytes = encode_utf8("p\u{e4}iv\u{e4}\u{e4} \u{1f600}");
        let (text, ok) = decode_utf8(&bytes);

        assert!(ok);
        assert_eq!(text, "p\u{e4}iv\u{e4}\u{e4} \u{1f600}");
    }

    #[test]
    fn stringify_escapes_specials()
    {
        assert_eq!(json_stringify("a\"b\\c"), "\"a\\\"b\\\\c\"");
        assert_eq!(json_stringify("\t\n\r"), "\"\\t\\n\\r\"");
        assert_eq!(json_stringify("a\u{e4}b"), "\"a\\u00e4b\"");
    }

    #[test]
    fn stringify_uses_surrogate_pairs()
    {
        assert_eq!(json_stringify("\u{1f600}"), "\"\\ud83d\\ude00\"");
    }
}
