use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;

/// Parse `input` as JSON, returning `fallback` when it is not valid
pub fn json_parse(input: &str, fallback: Value) -> Value {
    serde_json::from_str(input).unwrap_or(fallback)
}

/// Serialize `value`, pretty-printed with `indent` spaces when given
pub fn json_stringify(value: &Value, indent: Option<usize>) -> String {
    let result = match indent {
        Some(width) if width > 0 => {
            let indent = " ".repeat(width.min(10));
            let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
            let mut buf = Vec::new();
            let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
            serde::Serialize::serialize(value, &mut ser)
                .ok()
                .and_then(|()| String::from_utf8(buf).ok())
        }
        _ => serde_json::to_string(value).ok(),
    };
    result.unwrap_or_default()
}

pub fn base64_encode(input: &str) -> String {
    STANDARD.encode(input.as_bytes())
}

/// Decode standard base64 into UTF-8; invalid input decodes to `""`
pub fn base64_decode(input: &str) -> String {
    STANDARD
        .decode(input.trim())
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .unwrap_or_default()
}

/// 32-bit rolling string hash (`h * 31 + c` over UTF-16 units) rendered in base 36.
///
/// Stable across runs, suitable for cache keys, not for anything security related.
pub fn hash(input: &str) -> String {
    let h = input.encode_utf16().fold(0i32, |h, unit| {
        h.wrapping_shl(5).wrapping_sub(h).wrapping_add(i32::from(unit))
    });
    to_base36(h.unsigned_abs())
}

fn to_base36(mut n: u32) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_parse_fallback() {
        assert_eq!(json_parse(r#"{"a":1}"#, Value::Null), json!({ "a": 1 }));
        assert_eq!(json_parse("{oops", Value::Null), Value::Null);
        assert_eq!(json_parse("{oops", json!([])), json!([]));
    }

    #[test]
    fn test_json_stringify() {
        assert_eq!(json_stringify(&json!({ "a": [1, 2] }), None), r#"{"a":[1,2]}"#);
        assert_eq!(json_stringify(&json!({ "a": 1 }), Some(2)), "{\n  \"a\": 1\n}");
    }

    #[test]
    fn test_base64() {
        assert_eq!(base64_encode("hello world"), "aGVsbG8gd29ybGQ=");
        assert_eq!(base64_decode("aGVsbG8gd29ybGQ="), "hello world");
        assert_eq!(base64_decode("%%%"), "");
    }

    #[test]
    fn test_hash() {
        assert_eq!(hash(""), "0");
        // 'a' == 97 == "2p"
        assert_eq!(hash("a"), "2p");
        // 97 * 31 + 98 == 3105
        assert_eq!(hash("ab"), "2e9");
        assert_eq!(hash("users:42"), hash("users:42"));
        assert_ne!(hash("users:42"), hash("users:43"));
    }
}
