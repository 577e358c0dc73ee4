use std::fmt::Write;
use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};
use url::form_urlencoded;

static PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":([A-Za-z_][A-Za-z0-9_]*)").expect("valid path param regex"));

/// Percent-encode like JavaScript's `encodeURIComponent`
pub fn encode_component(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(byte as char),
            other => {
                let _ = write!(out, "%{other:02X}");
            }
        }
    }
    out
}

/// Text form of a scalar used in URLs; `None` for null/containers
pub fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Replace `:name` tokens in `template` with encoded values from `params`.
///
/// Tokens without a matching param are left as-is. A non-empty `query` is appended.
pub fn build_url(template: &str, params: &Value, query: &Value) -> String {
    let mut url = PARAM
        .replace_all(template, |caps: &regex::Captures<'_>| {
            params
                .get(&caps[1])
                .and_then(scalar_string)
                .map_or_else(|| caps[0].to_string(), |v| encode_component(&v))
        })
        .into_owned();

    let qs = build_query(query);
    if !qs.is_empty() {
        url.push(if url.contains('?') { '&' } else { '?' });
        url.push_str(&qs);
    }
    url
}

/// Parse a query string (leading `?` optional). Repeated keys collect into an array.
pub fn parse_query(input: &str) -> Value {
    let mut out = Map::new();
    let input = input.trim().trim_start_matches('?');
    for (key, value) in form_urlencoded::parse(input.as_bytes()) {
        let value = Value::String(value.into_owned());
        match out.get_mut(&*key) {
            Some(Value::Array(existing)) => existing.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                out.insert(key.into_owned(), value);
            }
        }
    }
    Value::Object(out)
}

/// Serialize an object to a query string; null values are skipped and arrays repeat the key
pub fn build_query(params: &Value) -> String {
    let Some(map) = params.as_object() else {
        return String::new();
    };
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in map {
        match value {
            Value::Array(items) => {
                for item in items.iter().filter_map(scalar_string) {
                    serializer.append_pair(key, &item);
                }
            }
            other => {
                if let Some(v) = scalar_string(other) {
                    serializer.append_pair(key, &v);
                }
            }
        }
    }
    serializer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_build_url() {
        let url = build_url(
            "/users/:id/posts/:postId",
            &json!({ "id": 42, "postId": "a b" }),
            &Value::Null,
        );
        assert_eq!(url, "/users/42/posts/a%20b");

        let url = build_url("/users/:id", &json!({}), &json!({ "page": 2 }));
        assert_eq!(url, "/users/:id?page=2");

        let url = build_url("/search?x=1", &Value::Null, &json!({ "q": "rust" }));
        assert_eq!(url, "/search?x=1&q=rust");
    }

    #[test]
    fn test_query_round_trip() {
        let parsed = parse_query("?a=1&b=hello+world&a=2");
        assert_eq!(parsed, json!({ "a": ["1", "2"], "b": "hello world" }));

        let built = build_query(&json!({ "tags": ["x", "y"], "skip": null, "n": 3 }));
        assert_eq!(built, "tags=x&tags=y&n=3");
        assert_eq!(build_query(&Value::Null), "");
        assert_eq!(parse_query(""), json!({}));
    }

    #[test]
    fn test_encode_component() {
        assert_eq!(encode_component("a/b?c=d&e"), "a%2Fb%3Fc%3Dd%26e");
        assert_eq!(encode_component("é"), "%C3%A9");
        assert_eq!(encode_component("it's (fine)*"), "it's%20(fine)*");
    }
}
