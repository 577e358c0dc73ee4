//! Static checks run before a definition is saved or executed

use std::sync::LazyLock;

use deno_core::{JsRuntime, RuntimeOptions};
use regex::Regex;
use serde::Serialize;

use crate::code::{self, CodeError};

static EVAL_CALL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\beval\s*\(").expect("valid eval call regex"));
static FUNCTION_FROM_STRING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"Function\s*\(\s*['"`]"#).expect("valid function constructor regex")
});

/// Outcome of [`validate_virtual_endpoint_code`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Check `code` the way the executor will see it.
///
/// Errors block saving: empty code, or a wrapped body that does not compile. Warnings flag
/// dynamic code evaluation. The body is compiled in a throwaway isolate but never invoked.
pub fn validate_virtual_endpoint_code(code: &str) -> ValidationResult {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    match code::wrap(code) {
        Ok(body) => {
            if let Err(message) = compile(body) {
                errors.push(message);
            }
        }
        Err(CodeError::Empty) => errors.push("Code cannot be empty".to_string()),
    }

    if EVAL_CALL.is_match(code) {
        warnings.push("Use of eval() is discouraged".to_string());
    }
    if FUNCTION_FROM_STRING.is_match(code) {
        warnings.push("Constructing functions from strings is discouraged".to_string());
    }

    ValidationResult {
        valid: errors.is_empty(),
        errors,
        warnings,
    }
}

/// Compile `body` as an async function body on a dedicated thread
fn compile(body: String) -> Result<(), String> {
    let handle = std::thread::Builder::new()
        .name("vep-validate".to_string())
        .spawn(move || compile_in_isolate(&body))
        .map_err(|e| format!("Failed to start validation thread: {e}"))?;
    handle
        .join()
        .map_err(|_| "Validation aborted unexpectedly".to_string())?
}

fn compile_in_isolate(body: &str) -> Result<(), String> {
    let literal = serde_json::to_string(body).map_err(|e| e.to_string())?;
    let script = format!(
        "new (Object.getPrototypeOf(async function () {{}}).constructor)('context', {literal}); undefined;"
    );
    let mut runtime = JsRuntime::new(RuntimeOptions::default());
    runtime
        .execute_script("<validate>", script)
        .map(|_| ())
        .map_err(|e| syntax_message(&e.to_string()))
}

/// First line of a V8 error, as `Syntax error: <detail>`
fn syntax_message(raw: &str) -> String {
    let first = raw.lines().next().unwrap_or_default().trim();
    let detail = first.strip_prefix("Uncaught ").unwrap_or(first);
    let detail = detail.strip_prefix("SyntaxError: ").unwrap_or(detail);
    format!("Syntax error: {detail}")
}
