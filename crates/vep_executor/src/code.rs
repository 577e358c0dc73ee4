//! Turning user code into the body of `async function (context)`

use std::sync::LazyLock;

use regex::Regex;

static ASYNC_FUNCTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^async\s+function\b").expect("valid async function regex"));
static FUNCTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^function\b").expect("valid function regex"));

/// The accepted forms of virtual endpoint code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeShape {
    /// `async function name(context) { ... }`
    AsyncFunction,
    /// `function name(context) { ... }`, run as an async function
    Function,
    /// Plain statements used directly as the function body
    Statements,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodeError {
    #[error("Virtual endpoint has no code")]
    Empty,
}

/// Classify trimmed `code`; `None` when there is nothing to run
pub fn classify(code: &str) -> Option<CodeShape> {
    let code = code.trim();
    if code.is_empty() {
        None
    } else if ASYNC_FUNCTION.is_match(code) {
        Some(CodeShape::AsyncFunction)
    } else if FUNCTION.is_match(code) {
        Some(CodeShape::Function)
    } else {
        Some(CodeShape::Statements)
    }
}

/// Body for `new AsyncFunction("context", body)` that runs `code` with `context`
pub fn wrap(code: &str) -> Result<String, CodeError> {
    let shape = classify(code).ok_or(CodeError::Empty)?;
    let code = code.trim();
    // A function expression inside parentheses cannot end with `;`
    let expression = code.trim_end_matches(';').trim_end();
    Ok(match shape {
        CodeShape::AsyncFunction => format!("return (\n{expression}\n)(context);"),
        CodeShape::Function => format!("return (\nasync {expression}\n)(context);"),
        CodeShape::Statements => code.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(classify("  \n "), None);
        assert_eq!(
            classify("async function virtualEndpoint(context) {}"),
            Some(CodeShape::AsyncFunction)
        );
        assert_eq!(classify("async   function(context) {}"), Some(CodeShape::AsyncFunction));
        assert_eq!(classify("function handler(context) {}"), Some(CodeShape::Function));
        assert_eq!(classify("functions.push(1); return 1;"), Some(CodeShape::Statements));
        assert_eq!(classify("return { ok: true };"), Some(CodeShape::Statements));
    }

    #[test]
    fn test_wrap() {
        assert_eq!(wrap("").unwrap_err(), CodeError::Empty);
        assert_eq!(
            wrap("async function f(context) { return 1; };").unwrap(),
            "return (\nasync function f(context) { return 1; }\n)(context);"
        );
        assert_eq!(
            wrap("function f(context) { return 1; }").unwrap(),
            "return (\nasync function f(context) { return 1; }\n)(context);"
        );
        assert_eq!(wrap("  return 1;  ").unwrap(), "return 1;");
    }
}
