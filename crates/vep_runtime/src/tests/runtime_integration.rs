//! Integration tests that spin up a JavaScript runtime with the extension installed

use std::pin::pin;
use std::sync::Arc;
use std::time::Duration;

use deno_core::{JsRuntime, PollEventLoopOptions, RuntimeOptions, v8};
use serde_json::{Value, json};
use serial_test::serial;
use vep_config::{
    CreateVirtualEndpoint, EndpointConfig, HttpMethod, RealEndpointDescriptor,
    VirtualEndpointDefinition,
};

use crate::context::{self, ContextInput};
use crate::transport::StubTransport;

fn definition(timeout: u64) -> VirtualEndpointDefinition {
    VirtualEndpointDefinition::create(CreateVirtualEndpoint {
        id: Some("virtual-test".into()),
        name: "Test endpoint".into(),
        path: "/virtual/test/:id".into(),
        config: EndpointConfig {
            timeout,
            cache: false,
        },
        ..Default::default()
    })
}

fn endpoints() -> Vec<RealEndpointDescriptor> {
    vec![
        RealEndpointDescriptor::new("u", "Get user", HttpMethod::Get, "/users/:id"),
        RealEndpointDescriptor::new("slow", "Slow", HttpMethod::Get, "/slow"),
    ]
}

/// Run `body` through `runVirtualEndpoint` and return the parsed envelope
async fn run_body(body: &str, input: ContextInput, stub: StubTransport, timeout: u64) -> Value {
    let state = context::build(
        &definition(timeout),
        input,
        Arc::from(endpoints()),
        Arc::new(stub),
    );
    let mut runtime = JsRuntime::new(RuntimeOptions {
        extensions: vec![crate::vep_runtime::init(state)],
        ..Default::default()
    });

    let script = format!(
        "{}({})",
        crate::ENTRY_POINT,
        serde_json::to_string(body).unwrap()
    );
    let promise = runtime
        .execute_script("<test>", script)
        .expect("script should start");
    let resolve_future = runtime.resolve(promise);
    let resolved = runtime
        .with_event_loop_promise(resolve_future, PollEventLoopOptions::default())
        .await
        .expect("envelope promise should resolve");

    let envelope = {
        let main_context = runtime.main_context();
        let handle_scope_storage = pin!(v8::HandleScope::new(runtime.v8_isolate()));
        let handle_scope = &mut handle_scope_storage.init();
        let context = v8::Local::new(handle_scope, main_context);
        let context_scope = &mut v8::ContextScope::new(handle_scope, context);
        let local = v8::Local::new(context_scope, resolved);
        deno_core::serde_v8::from_v8::<String>(context_scope, local)
            .expect("envelope should be a string")
    };
    serde_json::from_str(&envelope).expect("envelope should be JSON")
}

async fn run(body: &str) -> Value {
    run_body(body, ContextInput::default(), StubTransport::new(), 10_000).await
}

#[tokio::test]
#[serial]
async fn test_context_input_and_meta() {
    let input = ContextInput {
        params: [("id".to_string(), "42".to_string())].into_iter().collect(),
        body: json!({ "name": "Ada" }),
        ..Default::default()
    };
    let envelope = run_body(
        r"return {
            id: context.input.params.id,
            name: context.input.body.name,
            query: context.input.query,
            endpointId: context.meta.endpointId,
            endpoints: context.meta.endpoints.map((e) => e.id),
            hasTimestamp: typeof context.meta.timestamp === 'number',
        };",
        input,
        StubTransport::new(),
        10_000,
    )
    .await;

    assert_eq!(
        envelope,
        json!({
            "ok": true,
            "data": {
                "id": "42",
                "name": "Ada",
                "query": {},
                "endpointId": "virtual-test",
                "endpoints": ["u", "slow"],
                "hasTimestamp": true
            }
        })
    );
}

#[tokio::test]
#[serial]
async fn test_undefined_result_becomes_null() {
    let envelope = run("const x = 1;").await;
    assert_eq!(envelope, json!({ "ok": true, "data": null }));
}

#[tokio::test]
#[serial]
async fn test_utils_from_script() {
    let envelope = run(r"
        const { utils } = context;
        const people = [{ name: 'Ada', age: 36 }, { name: 'Linus', age: 28 }, { name: 'Grace', age: 85 }];
        const target = { a: {} };
        const same = utils.set(target, 'a.b.c', 1) === target;
        return {
            byDecade: utils.groupBy(people, (p) => Math.floor(p.age / 10) * 10),
            oldest: utils.sortBy(people, 'age', 'desc')[0].name,
            snake: utils.mapKeys({ firstName: 'Ada' }, (key) => utils.snakeCase(key)),
            kept: utils.filterObject({ a: 1, b: 0 }, (value) => value > 0),
            total: utils.sum(people, (p) => p.age),
            same,
            target,
            nextDay: utils.addDays('2024-01-31', 1) instanceof Date,
            empty: utils.pick(null, ['a']),
        };
    ")
    .await;

    assert_eq!(envelope["ok"], json!(true), "{envelope}");
    let data = &envelope["data"];
    assert_eq!(data["byDecade"]["30"][0]["name"], "Ada");
    assert_eq!(data["byDecade"]["80"][0]["name"], "Grace");
    assert_eq!(data["oldest"], "Grace");
    assert_eq!(data["snake"], json!({ "first_name": "Ada" }));
    assert_eq!(data["kept"], json!({ "a": 1 }));
    assert_eq!(data["total"], json!(149));
    assert_eq!(data["same"], json!(true));
    assert_eq!(data["target"], json!({ "a": { "b": { "c": 1 } } }));
    assert_eq!(data["nextDay"], json!(true));
    assert_eq!(data["empty"], json!({}));
}

#[tokio::test]
#[serial]
async fn test_unknown_helper_throws() {
    let envelope = run("return context.utils.explode();").await;
    assert_eq!(envelope["ok"], json!(false));
}

#[tokio::test]
#[serial]
async fn test_get_through_transport() {
    let stub = StubTransport::new().with_json("GET", "/users/7", 200, json!({ "id": "7", "name": "Ada" }));
    let envelope = run_body(
        "return context.get('u', { params: { id: '7' } });",
        ContextInput::default(),
        stub,
        10_000,
    )
    .await;
    assert_eq!(envelope, json!({ "ok": true, "data": { "id": "7", "name": "Ada" } }));
}

#[tokio::test]
#[serial]
async fn test_missing_endpoint_fails_with_its_id() {
    let envelope = run("return context.get('missing-id', {});").await;
    assert_eq!(envelope["ok"], json!(false));
    assert!(
        envelope["message"].as_str().unwrap().contains("missing-id"),
        "{envelope}"
    );
}

#[tokio::test]
#[serial]
async fn test_op_errors_surface_as_plain_errors() {
    let envelope = run(r"
        try {
            await context.get('missing-id', {});
        } catch (err) {
            return { plain: err.constructor === Error, name: err.name, message: err.message };
        }
    ")
    .await;
    assert_eq!(
        envelope["data"],
        json!({ "plain": true, "name": "Error", "message": "Endpoint not found: missing-id" })
    );
}

#[tokio::test]
#[serial]
async fn test_parallel_order_and_validation() {
    let stub = StubTransport::new()
        .with_delayed_json("GET", "/users/a", 200, json!("A"), Duration::from_millis(100))
        .with_json("GET", "/users/b", 200, json!("B"));
    let envelope = run_body(
        r"return context.parallel(
            { endpointId: 'u', options: { params: { id: 'a' } } },
            { endpointId: 'u', options: { params: { id: 'b' } } },
        );",
        ContextInput::default(),
        stub,
        10_000,
    )
    .await;
    assert_eq!(envelope, json!({ "ok": true, "data": ["A", "B"] }));

    let envelope = run("return context.parallel({ endpointId: 'u' }, { options: {} });").await;
    assert_eq!(
        envelope["message"],
        json!("Invalid call: parallel call at index 1 is missing endpointId")
    );
}

#[tokio::test]
#[serial]
async fn test_caught_errors_stay_inside_script() {
    let envelope = run(r"
        try {
            await context.fetch('https://api.example.com/nope');
        } catch (err) {
            return { caught: err.message };
        }
    ")
    .await;
    assert_eq!(
        envelope["data"]["caught"],
        json!("Fetch failed: GET https://api.example.com/nope responded 404 Not Found")
    );
}

#[tokio::test]
#[serial]
async fn test_never_settling_promise_times_out() {
    let started = std::time::Instant::now();
    let envelope = run_body(
        "await new Promise(() => {}); return 1;",
        ContextInput::default(),
        StubTransport::new(),
        100,
    )
    .await;
    assert_eq!(envelope["ok"], json!(false));
    assert_eq!(envelope["message"], json!("Execution timeout after 100ms"));
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
#[serial]
async fn test_syntax_error_is_reported() {
    let envelope = run("return {;").await;
    assert_eq!(envelope["ok"], json!(false));
    assert!(
        envelope["message"].as_str().unwrap().starts_with("Syntax error: "),
        "{envelope}"
    );
}

#[tokio::test]
#[serial]
async fn test_console_is_forwarded_without_failing() {
    let envelope = run("console.log('hello', { a: 1 }); console.error('oops'); return true;").await;
    assert_eq!(envelope, json!({ "ok": true, "data": true }));
}
