use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

pub fn is_email(input: &str) -> bool {
    EMAIL.is_match(input)
}

/// Absolute `http`/`https` URL with a host
pub fn is_url(input: &str) -> bool {
    url::Url::parse(input)
        .is_ok_and(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
}

/// `null`, `""`, `[]` and `{}` are empty; everything else is not
pub fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Finite numbers and strings that parse as one
pub fn is_numeric(value: &Value) -> bool {
    match value {
        Value::Number(n) => n.as_f64().is_some_and(f64::is_finite),
        Value::String(s) => s.trim().parse::<f64>().is_ok_and(f64::is_finite),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_email_and_url() {
        assert!(is_email("ada@example.com"));
        assert!(!is_email("ada@example"));
        assert!(!is_email("a da@example.com"));
        assert!(is_url("https://example.com/path?q=1"));
        assert!(!is_url("ftp://example.com"));
        assert!(!is_url("/relative/path"));
    }

    #[test]
    fn test_is_empty() {
        assert!(is_empty(&Value::Null));
        assert!(is_empty(&json!("")));
        assert!(is_empty(&json!([])));
        assert!(is_empty(&json!({})));
        assert!(!is_empty(&json!(0)));
        assert!(!is_empty(&json!(" ")));
    }

    #[test]
    fn test_is_numeric() {
        assert!(is_numeric(&json!(4.2)));
        assert!(is_numeric(&json!(" 42 ")));
        assert!(!is_numeric(&json!("42abc")));
        assert!(!is_numeric(&json!("")));
        assert!(!is_numeric(&json!("NaN")));
        assert!(!is_numeric(&Value::Null));
    }
}
