// Stub transport backend for testing

use bytes::Bytes;
use courier_http_client::{
    Backend, Effect, HttpClientError, Method, Request, Response, StatusCode, header,
};
use http::{HeaderMap, HeaderName, HeaderValue};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Canned response returned by a [`StubBackend`] route.
#[derive(Debug, Clone)]
pub struct StubResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
}

impl StubResponse {
    /// Create a response with the given status. Invalid codes become 500.
    pub fn new(status: u16) -> Self {
        Self {
            status: StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Create a 200 response with a body.
    pub fn ok(body: impl Into<Bytes>) -> Self {
        Self::new(200).with_body(body)
    }

    /// Create a redirect response pointing at `location`.
    pub fn redirect(status: u16, location: &str) -> Self {
        Self::new(status).with_header(header::LOCATION.as_str(), location)
    }

    /// Add a header. Invalid names or values are ignored.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (HeaderName::try_from(name), HeaderValue::try_from(value)) {
            self.headers.append(name, value);
        }
        self
    }

    /// Set the body.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    fn to_response(&self, request: &Request) -> Response {
        Response::new(
            self.status,
            self.headers.clone(),
            self.body.clone(),
            request.uri().clone(),
        )
    }
}

/// Scripted transport failure.
#[derive(Debug, Clone)]
pub enum StubFailure {
    /// Connection refused or reset.
    Connection,
    /// Timed out after the given duration.
    Timeout(Duration),
    /// Any other transport failure.
    Transport(String),
}

impl StubFailure {
    fn to_error(&self, request: &Request) -> HttpClientError {
        match self {
            StubFailure::Connection => {
                HttpClientError::Connection(format!("connection refused: {}", request.uri()))
            }
            StubFailure::Timeout(after) => HttpClientError::Timeout(*after),
            StubFailure::Transport(message) => HttpClientError::Transport(message.clone()),
        }
    }
}

#[derive(Debug, Clone)]
enum Outcome {
    Respond(StubResponse),
    Fail(StubFailure),
}

#[derive(Debug)]
struct Route {
    method: Option<Method>,
    path: String,
    outcome: Outcome,
    remaining: Option<usize>,
}

impl Route {
    fn matches(&self, request: &Request) -> bool {
        self.remaining != Some(0)
            && self.path == request.uri().path()
            && self.method.as_ref().is_none_or(|m| m == request.method())
    }
}

#[derive(Debug, Default)]
struct StubState {
    routes: Mutex<Vec<Route>>,
    requests: Mutex<Vec<Request>>,
}

/// Transport backend answering from canned routes.
///
/// Routes match on the request path, and optionally the method, in the
/// order they were added. Unmatched requests get a 404. Every request is
/// recorded. Works with every effect type; lazy effects record nothing
/// until run.
#[derive(Debug, Clone, Default)]
pub struct StubBackend {
    state: Arc<StubState>,
}

impl StubBackend {
    /// Create a stub with no routes.
    pub fn new() -> Self {
        Self::default()
    }

    fn push(
        self,
        method: Option<Method>,
        path: &str,
        outcome: Outcome,
        remaining: Option<usize>,
    ) -> Self {
        self.state.routes.lock().push(Route {
            method,
            path: path.to_string(),
            outcome,
            remaining,
        });
        self
    }

    /// Answer every request for `path` with `response`.
    pub fn with_route(self, path: &str, response: StubResponse) -> Self {
        self.push(None, path, Outcome::Respond(response), None)
    }

    /// Answer requests for `path` with the given method.
    pub fn with_method_route(self, method: Method, path: &str, response: StubResponse) -> Self {
        self.push(Some(method), path, Outcome::Respond(response), None)
    }

    /// Redirect requests for `path` to `location`.
    pub fn with_redirect(self, path: &str, status: u16, location: &str) -> Self {
        self.with_route(path, StubResponse::redirect(status, location))
    }

    /// Fail every request for `path`.
    pub fn with_failure(self, path: &str, failure: StubFailure) -> Self {
        self.push(None, path, Outcome::Fail(failure), None)
    }

    /// Fail the next `times` requests for `path`, then fall through to later routes.
    pub fn with_failure_times(self, path: &str, times: usize, failure: StubFailure) -> Self {
        self.push(None, path, Outcome::Fail(failure), Some(times))
    }

    /// All recorded requests, oldest first.
    pub fn requests(&self) -> Vec<Request> {
        self.state.requests.lock().clone()
    }

    /// The most recent request.
    pub fn last_request(&self) -> Option<Request> {
        self.state.requests.lock().last().cloned()
    }

    /// Number of requests received.
    pub fn call_count(&self) -> usize {
        self.state.requests.lock().len()
    }

    /// Number of requests received for `path`.
    pub fn calls_to(&self, path: &str) -> usize {
        self.state
            .requests
            .lock()
            .iter()
            .filter(|r| r.uri().path() == path)
            .count()
    }

    /// Forget recorded requests. Routes are kept.
    pub fn clear(&self) {
        self.state.requests.lock().clear();
    }

    fn answer(&self, request: Request) -> Result<Response, HttpClientError> {
        let outcome = {
            let mut routes = self.state.routes.lock();
            routes.iter_mut().find(|r| r.matches(&request)).map(|route| {
                if let Some(remaining) = route.remaining.as_mut() {
                    *remaining -= 1;
                }
                route.outcome.clone()
            })
        };

        let result = match outcome {
            Some(Outcome::Respond(response)) => Ok(response.to_response(&request)),
            Some(Outcome::Fail(failure)) => Err(failure.to_error(&request)),
            None => Ok(StubResponse::new(404).to_response(&request)),
        };

        self.state.requests.lock().push(request);
        result
    }
}

impl<E: Effect> Backend<E> for StubBackend {
    fn send(&self, request: Request) -> E::F<Response> {
        let stub = self.clone();
        E::suspend(move || E::from_result(stub.answer(request)))
    }
}
