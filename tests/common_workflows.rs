//! Integration tests for common Courier workflows.
//!
//! These tests drive the full client stack (builder, logging, redirect
//! decorator, transport) over a stub transport, once per effect type.

use courier::prelude::*;
use courier_testing::*;
use serde::Deserialize;
use std::time::Duration;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn client<E: Effect>(stub: &StubBackend) -> HttpClient<E> {
    let config = HttpClientConfig::builder()
        .base_url("http://stub.local")
        .build();
    HttpClient::new(stub.clone(), config)
}

fn chain_stub() -> StubBackend {
    StubBackend::new()
        .with_redirect("/r1", 307, "/r2")
        .with_redirect("/r2", 308, "/r3")
        .with_redirect("/r3", 302, "/r4")
        .with_route("/r4", StubResponse::ok("819"))
}

// =============================================================================
// Redirect Chains
// =============================================================================

fn mixed_chain<E: RunBlocking>() {
    let stub = chain_stub();
    let response = E::run_blocking(client::<E>(&stub).get("/r1").send()).unwrap();

    assert_status(&response, 200);
    assert_body_contains(&response, "819");
    assert_history(&response, &[307, 308, 302]);
    assert_final_path(&response, "/r4");
    assert_eq!(stub.call_count(), 4);
}

#[test]
fn test_mixed_chain_in_every_effect() {
    init_tracing();
    mixed_chain::<Blocking>();
    mixed_chain::<Async>();
    mixed_chain::<Lazy>();
}

fn redirect_loop<E: RunBlocking>() {
    let stub = StubBackend::new().with_redirect("/loop", 302, "/loop");
    let response =
        E::run_blocking(client::<E>(&stub).get("/loop").max_redirects(10).send()).unwrap();

    assert_status(&response, 302);
    assert_eq!(response.history().len(), 10);
    assert_eq!(stub.calls_to("/loop"), 11);
}

#[test]
fn test_redirect_loop_terminates_in_every_effect() {
    redirect_loop::<Blocking>();
    redirect_loop::<Async>();
    redirect_loop::<Lazy>();
}

fn long_redirect_loop<E: RunBlocking>() {
    let stub = StubBackend::new().with_redirect("/loop", 302, "/loop");
    let response =
        E::run_blocking(client::<E>(&stub).get("/loop").max_redirects(10_000).send()).unwrap();

    assert_status(&response, 302);
    assert_eq!(response.history().len(), 10_000);
    assert_eq!(stub.calls_to("/loop"), 10_001);
}

#[test]
fn test_long_redirect_loop_in_every_effect() {
    long_redirect_loop::<Blocking>();
    long_redirect_loop::<Async>();
    long_redirect_loop::<Lazy>();
}

#[test]
fn test_default_limit_is_thirty_two() {
    let stub = StubBackend::new().with_redirect("/loop", 301, "/loop");
    let response = client::<Blocking>(&stub).get("/loop").send().unwrap();

    assert_status(&response, 301);
    assert_eq!(response.history().len(), DEFAULT_MAX_REDIRECTS as usize);
}

#[test]
fn test_history_is_flat() {
    let response = client::<Blocking>(&chain_stub()).get("/r1").send().unwrap();
    assert!(response.history().iter().all(|hop| hop.history().is_empty()));
}

// =============================================================================
// Method and Body Rewriting
// =============================================================================

#[test]
fn test_post_redirect_get() {
    let stub = StubBackend::new()
        .with_method_route(Method::POST, "/orders", StubResponse::redirect(303, "/orders/1"))
        .with_method_route(Method::GET, "/orders/1", StubResponse::ok("created"));

    let response = client::<Blocking>(&stub)
        .post("/orders")
        .json(&serde_json::json!({"item": "widget"}))
        .send()
        .unwrap();

    assert_body_contains(&response, "created");
    let followed = stub.last_request().unwrap();
    assert_eq!(followed.method(), Method::GET);
    assert!(followed.body().is_empty());
    assert_eq!(followed.header("content-type"), None);
}

#[test]
fn test_permanent_redirect_keeps_put_and_body() {
    let stub = StubBackend::new()
        .with_redirect("/v1/doc", 308, "/v2/doc")
        .with_method_route(Method::PUT, "/v2/doc", StubResponse::new(204));

    let response = client::<Blocking>(&stub)
        .put("/v1/doc")
        .text("contents")
        .send()
        .unwrap();

    assert_status(&response, 204);
    let followed = stub.last_request().unwrap();
    assert_eq!(followed.method(), Method::PUT);
    assert_eq!(followed.body(), &Body::from("contents"));
}

#[test]
fn test_found_keeps_post_unless_downgrade_requested() {
    let stub = StubBackend::new()
        .with_redirect("/form", 302, "/done")
        .with_route("/done", StubResponse::ok(""));
    let client = client::<Blocking>(&stub);

    client.post("/form").text("a=1").send().unwrap();
    assert_eq!(stub.last_request().unwrap().method(), Method::POST);

    client
        .post("/form")
        .text("a=1")
        .redirect_to_get(true)
        .send()
        .unwrap();
    let followed = stub.last_request().unwrap();
    assert_eq!(followed.method(), Method::GET);
    assert!(followed.body().is_empty());
}

#[test]
fn test_headers_carry_over_and_host_is_dropped() {
    let stub = StubBackend::new()
        .with_redirect("/a", 301, "http://other.local/b")
        .with_route("/b", StubResponse::ok(""));

    client::<Blocking>(&stub)
        .get("/a")
        .header("Host", "stub.local")
        .bearer_auth("token")
        .send()
        .unwrap();

    let followed = stub.last_request().unwrap();
    assert_eq!(followed.uri().host_str(), Some("other.local"));
    assert_eq!(followed.header("host"), None);
    assert_eq!(followed.header("authorization"), Some("Bearer token"));
}

// =============================================================================
// Failures
// =============================================================================

fn malformed_target<E: RunBlocking>() {
    let stub = StubBackend::new().with_route("/broken", StubResponse::new(302));
    let err = E::run_blocking(client::<E>(&stub).get("/broken").send()).unwrap_err();

    assert!(err.is_malformed_redirect());
    assert!(!err.is_transport());
    assert_eq!(err.status_code(), Some(302));
}

#[test]
fn test_missing_location_in_every_effect() {
    malformed_target::<Blocking>();
    malformed_target::<Async>();
    malformed_target::<Lazy>();
}

fn failure_mid_chain<E: RunBlocking>() {
    let stub = StubBackend::new()
        .with_redirect("/a", 301, "/b")
        .with_failure("/b", StubFailure::Timeout(Duration::from_secs(3)));
    let err = E::run_blocking(client::<E>(&stub).get("/a").send()).unwrap_err();

    assert!(err.is_timeout());
    assert_eq!(stub.call_count(), 2);
}

#[test]
fn test_transport_failure_mid_chain_in_every_effect() {
    failure_mid_chain::<Blocking>();
    failure_mid_chain::<Async>();
    failure_mid_chain::<Lazy>();
}

// =============================================================================
// Client Configuration
// =============================================================================

#[test]
fn test_cookies_carried_when_enabled() {
    let stub = StubBackend::new()
        .with_route(
            "/login",
            StubResponse::redirect(302, "/home").with_header("Set-Cookie", "session=abc; Path=/"),
        )
        .with_route("/home", StubResponse::ok("welcome"));
    let config = HttpClientConfig::builder()
        .base_url("http://stub.local")
        .carry_cookies(true)
        .build();
    let client = HttpClient::<Blocking>::new(stub.clone(), config);

    client.get("/login").send().unwrap();
    assert_eq!(
        stub.last_request().unwrap().header("cookie"),
        Some("session=abc")
    );
}

#[test]
fn test_cookies_not_carried_by_default() {
    let stub = StubBackend::new()
        .with_route(
            "/login",
            StubResponse::redirect(302, "/home").with_header("Set-Cookie", "session=abc"),
        )
        .with_route("/home", StubResponse::ok(""));

    client::<Blocking>(&stub).get("/login").send().unwrap();
    assert_eq!(stub.last_request().unwrap().header("cookie"), None);
}

#[test]
fn test_lazy_client_is_lazy() {
    let stub = chain_stub();
    let client = client::<Lazy>(&stub);

    let task = client.get("/r1").send();
    assert_eq!(stub.call_count(), 0);

    let response = task.run().unwrap();
    assert_history(&response, &[307, 308, 302]);
    assert_eq!(stub.call_count(), 4);
}

#[tokio::test]
async fn test_async_client_on_tokio() {
    let stub = chain_stub();
    let response = client::<Async>(&stub).get("/r1").send().await.unwrap();
    assert_body_contains(&response, "819");

    let task = client::<Lazy>(&stub).get("/r1").send();
    let response = task.run_on_blocking_pool().await.unwrap();
    assert_history(&response, &[307, 308, 302]);
}

#[test]
fn test_json_response_through_redirect() {
    #[derive(Debug, PartialEq, Deserialize)]
    struct User {
        id: u32,
        name: String,
    }

    let stub = StubBackend::new()
        .with_redirect("/me", 302, "/users/7")
        .with_route(
            "/users/7",
            StubResponse::ok(r#"{"id":7,"name":"Ada"}"#).with_header("Content-Type", "application/json"),
        );

    let response = client::<Blocking>(&stub).get("/me").send().unwrap();
    assert_header(&response, "content-type", "application/json");
    let user: User = response.json().unwrap();
    assert_eq!(
        user,
        User {
            id: 7,
            name: "Ada".to_string()
        }
    );
}
