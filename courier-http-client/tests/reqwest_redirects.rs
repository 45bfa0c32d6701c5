//! Redirect following over the reqwest transports against a live mock server.

use courier_http_client::{
    Async, Backend, Blocking, HttpClient, HttpClientConfig, HttpClientError, Lazy, Request,
    ReqwestBackend, Url,
};
use std::time::Duration;
use wiremock::matchers::{body_string, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(server: &MockServer) -> HttpClientConfig {
    HttpClientConfig::builder()
        .base_url(server.uri())
        .log_requests(false)
        .build()
}

fn redirect(status: u16, location: &str) -> ResponseTemplate {
    ResponseTemplate::new(status).insert_header("Location", location)
}

async fn mount_chain(server: &MockServer) {
    Mock::given(path("/r1"))
        .respond_with(redirect(307, "/r2"))
        .mount(server)
        .await;
    Mock::given(path("/r2"))
        .respond_with(redirect(308, "/r3"))
        .mount(server)
        .await;
    Mock::given(path("/r3"))
        .respond_with(redirect(302, "/r4"))
        .mount(server)
        .await;
    Mock::given(path("/r4"))
        .respond_with(ResponseTemplate::new(200).set_body_string("819"))
        .mount(server)
        .await;
}

async fn mount_loop(server: &MockServer) {
    Mock::given(path("/loop"))
        .respond_with(redirect(302, "/loop"))
        .mount(server)
        .await;
}

fn history_codes(response: &courier_http_client::Response) -> Vec<u16> {
    response.history().iter().map(|r| r.code()).collect()
}

#[tokio::test]
async fn test_async_follows_mixed_chain() {
    let server = MockServer::start().await;
    mount_chain(&server).await;

    let client = HttpClient::<Async>::reqwest(config(&server)).unwrap();
    let response = client.get("/r1").send().await.unwrap();

    assert_eq!(response.code(), 200);
    assert_eq!(response.text().unwrap(), "819");
    assert_eq!(history_codes(&response), vec![307, 308, 302]);
    assert_eq!(response.url().path(), "/r4");
}

#[tokio::test]
async fn test_async_loop_stops_at_limit() {
    let server = MockServer::start().await;
    mount_loop(&server).await;

    let client = HttpClient::<Async>::reqwest(config(&server)).unwrap();
    let response = client.get("/loop").max_redirects(10).send().await.unwrap();

    assert_eq!(response.code(), 302);
    assert_eq!(response.history().len(), 10);
    assert_eq!(server.received_requests().await.unwrap().len(), 11);
}

#[tokio::test]
async fn test_async_loop_default_limit() {
    let server = MockServer::start().await;
    mount_loop(&server).await;

    let client = HttpClient::<Async>::reqwest(config(&server)).unwrap();
    let response = client.get("/loop").send().await.unwrap();

    assert_eq!(response.code(), 302);
    assert_eq!(response.history().len(), 32);
}

#[tokio::test]
async fn test_see_other_switches_post_to_get() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/submit"))
        .respond_with(redirect(303, "/result"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/result"))
        .respond_with(ResponseTemplate::new(200).set_body_string("done"))
        .mount(&server)
        .await;

    let client = HttpClient::<Async>::reqwest(config(&server)).unwrap();
    let response = client
        .post("/submit")
        .text("payload")
        .send()
        .await
        .unwrap();

    assert_eq!(response.text().unwrap(), "done");
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests[1].method.as_str(), "GET");
    assert!(requests[1].body.is_empty());
}

#[tokio::test]
async fn test_temporary_redirect_replays_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/upload"))
        .respond_with(redirect(307, "/store"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/store"))
        .and(body_string("payload"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&server)
        .await;

    let client = HttpClient::<Async>::reqwest(config(&server)).unwrap();
    let response = client
        .post("/upload")
        .text("payload")
        .send()
        .await
        .unwrap();

    assert_eq!(response.code(), 201);
    assert_eq!(history_codes(&response), vec![307]);
}

#[tokio::test]
async fn test_transport_alone_never_follows() {
    let server = MockServer::start().await;
    mount_chain(&server).await;

    let transport = ReqwestBackend::new(&HttpClientConfig::default()).unwrap();
    let url = Url::parse(&server.uri()).unwrap().join("/r1").unwrap();
    let response = Backend::<Async>::send(&transport, Request::get(url))
        .await
        .unwrap();

    assert_eq!(response.code(), 307);
    assert_eq!(response.location(), Some("/r2"));
    assert!(response.history().is_empty());
}

#[tokio::test]
async fn test_timeout_is_reported_as_timeout() {
    let server = MockServer::start().await;
    Mock::given(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let client = HttpClient::<Async>::reqwest(config(&server)).unwrap();
    let err = client
        .get("/slow")
        .timeout(Duration::from_millis(50))
        .send()
        .await
        .unwrap_err();

    assert!(err.is_timeout());
    assert!(matches!(err, HttpClientError::Timeout(d) if d == Duration::from_millis(50)));
}

#[tokio::test]
async fn test_refused_connection_is_a_transport_failure() {
    let client = HttpClient::<Async>::reqwest(HttpClientConfig::default()).unwrap();
    let err = client.get("http://127.0.0.1:1/").send().await.unwrap_err();

    assert!(err.is_transport());
    assert!(!err.is_malformed_redirect());
}

// The blocking reqwest client must not run on a runtime thread, so these
// tests drive the mock server from a separate runtime.

#[test]
fn test_blocking_follows_mixed_chain() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let server = rt.block_on(async {
        let server = MockServer::start().await;
        mount_chain(&server).await;
        server
    });

    let client = HttpClient::<Blocking>::reqwest_blocking(config(&server)).unwrap();
    let response = client.get("/r1").send().unwrap();

    assert_eq!(response.text().unwrap(), "819");
    assert_eq!(history_codes(&response), vec![307, 308, 302]);
}

#[test]
fn test_lazy_sends_nothing_until_run() {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let server = rt.block_on(async {
        let server = MockServer::start().await;
        mount_chain(&server).await;
        server
    });

    let client = HttpClient::<Lazy>::reqwest_lazy(config(&server)).unwrap();
    let task = client.get("/r1").send();
    let received = rt.block_on(server.received_requests()).unwrap();
    assert!(received.is_empty());

    let response = task.run().unwrap();
    assert_eq!(response.text().unwrap(), "819");
    assert_eq!(history_codes(&response), vec![307, 308, 302]);

    let received = rt.block_on(server.received_requests()).unwrap();
    assert_eq!(received.len(), 4);
}
