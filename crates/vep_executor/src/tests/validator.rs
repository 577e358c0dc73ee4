use std::sync::Arc;

use serde_json::json;
use serial_test::serial;
use vep_config::templates::{template, template_list};
use vep_runtime::{ContextInput, StubTransport};

use super::{definition, real_endpoints};
use crate::executor::VirtualEndpointExecutor;
use crate::validator::validate_virtual_endpoint_code;

#[test]
#[serial]
fn test_empty_code_is_invalid() {
    let result = validate_virtual_endpoint_code("  \n\t ");
    assert!(!result.valid);
    assert_eq!(result.errors, vec!["Code cannot be empty".to_string()]);
    assert!(result.warnings.is_empty());
}

#[test]
#[serial]
fn test_syntax_errors_block() {
    let result = validate_virtual_endpoint_code("async function virtualEndpoint(context) { return {; }");
    assert!(!result.valid);
    assert_eq!(result.errors.len(), 1);
    assert!(result.errors[0].starts_with("Syntax error: "), "{result:?}");
}

#[test]
#[serial]
fn test_each_code_shape_is_accepted() {
    for code in [
        "async function virtualEndpoint(context) { return await context.get('u', {}); }",
        "function virtualEndpoint(context) { return 1; };",
        "const { input } = context;\nreturn await Promise.resolve(input);",
    ] {
        let result = validate_virtual_endpoint_code(code);
        assert!(result.valid, "{code}: {result:?}");
        assert!(result.errors.is_empty());
    }
}

#[tokio::test]
#[serial]
async fn test_plain_function_may_await() {
    let code = r"function virtualEndpoint(context) {
        const user = await context.get('u', { params: { id: context.input.params.id } });
        return { name: user.name };
    }";
    let result = validate_virtual_endpoint_code(code);
    assert!(result.valid, "{result:?}");

    let stub = StubTransport::new().with_json("GET", "/users/7", 200, json!({ "id": "7", "name": "Ada" }));
    let executor = VirtualEndpointExecutor::new(
        definition("virtual-plain", "/virtual/plain/:id", code),
        real_endpoints(),
        Arc::new(stub),
    );
    let input = ContextInput {
        params: [("id".to_string(), "7".to_string())].into_iter().collect(),
        ..Default::default()
    };
    let result = executor.execute(input).await;
    assert_eq!(result.data(), Some(&json!({ "name": "Ada" })), "{result:?}");
}

#[test]
#[serial]
fn test_dynamic_code_warnings_do_not_block() {
    let result = validate_virtual_endpoint_code(
        "const a = eval('1 + 1');\nconst b = new Function('return 2');\nreturn a + b();",
    );
    assert!(result.valid, "{result:?}");
    assert_eq!(result.warnings.len(), 2);

    let clean = validate_virtual_endpoint_code("const evaluate = (x) => x; return evaluate(Function);");
    assert!(clean.warnings.is_empty(), "{clean:?}");

    let lookalike = validate_virtual_endpoint_code(
        "const retrieval = (x) => x; const medieval = (y) => y; return retrieval(medieval(1));",
    );
    assert!(lookalike.valid, "{lookalike:?}");
    assert!(lookalike.warnings.is_empty(), "{lookalike:?}");
}

#[test]
#[serial]
fn test_every_template_is_valid() {
    for summary in template_list() {
        let result = validate_virtual_endpoint_code(template(summary.key).code);
        assert!(result.valid, "template {}: {result:?}", summary.key);
    }
}

#[tokio::test]
#[serial]
async fn test_valid_code_never_fails_to_parse_at_execution() {
    let samples = [
        "async function virtualEndpoint(context) { return context.get('missing', {}); }",
        "function handler(context) { return { n: context.utils.round(1.234, 1) }; }",
        "return context.utils.camelCase('hello world');",
    ];
    for code in samples {
        assert!(validate_virtual_endpoint_code(code).valid, "{code}");

        let executor = VirtualEndpointExecutor::new(
            definition("virtual-roundtrip", "/virtual/roundtrip", code),
            real_endpoints(),
            Arc::new(StubTransport::new()),
        );
        let result = executor.execute(ContextInput::default()).await;
        if let Some(error) = result.error() {
            assert!(!error.starts_with("Syntax error"), "{code}: {error}");
        }
    }
    for summary in template_list() {
        let executor = VirtualEndpointExecutor::new(
            definition("virtual-template", "/virtual/template", template(summary.key).code),
            real_endpoints(),
            Arc::new(StubTransport::new()),
        );
        let result = executor.execute(ContextInput::default()).await;
        if let Some(error) = result.error() {
            assert!(!error.starts_with("Syntax error"), "{}: {error}", summary.key);
        }
    }
}
