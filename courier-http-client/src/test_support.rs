//! Scripted backends shared by the unit tests.

use crate::backend::{FnBackend, backend_fn};
use crate::effect::{Async, Blocking, Effect, Lazy};
use crate::{HttpClientError, Request, Response, Result};
use http::header::{LOCATION, SET_COOKIE};
use http::{HeaderMap, HeaderValue, StatusCode};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use url::Url;

/// Evaluate an effect on the current thread.
pub(crate) trait RunSync: Effect {
    fn run_sync<T: Send + 'static>(fa: Self::F<T>) -> Result<T>;
}

impl RunSync for Blocking {
    fn run_sync<T: Send + 'static>(fa: Self::F<T>) -> Result<T> {
        fa
    }
}

impl RunSync for Async {
    fn run_sync<T: Send + 'static>(fa: Self::F<T>) -> Result<T> {
        futures::executor::block_on(fa)
    }
}

impl RunSync for Lazy {
    fn run_sync<T: Send + 'static>(fa: Self::F<T>) -> Result<T> {
        fa.run()
    }
}

#[derive(Clone)]
pub(crate) enum Route {
    Reply {
        status: u16,
        location: Option<&'static str>,
        set_cookie: Option<&'static str>,
        body: &'static str,
    },
    Fail,
}

pub(crate) fn ok(body: &'static str) -> Route {
    reply(200, body)
}

pub(crate) fn reply(status: u16, body: &'static str) -> Route {
    Route::Reply {
        status,
        location: None,
        set_cookie: None,
        body,
    }
}

pub(crate) fn redirect(status: u16, location: &'static str) -> Route {
    Route::Reply {
        status,
        location: Some(location),
        set_cookie: None,
        body: "",
    }
}

pub(crate) fn redirect_setting_cookie(
    status: u16,
    location: &'static str,
    cookie: &'static str,
) -> Route {
    Route::Reply {
        status,
        location: Some(location),
        set_cookie: Some(cookie),
        body: "",
    }
}

pub(crate) type SentLog = Arc<Mutex<Vec<Request>>>;

/// A backend answering by request path, recording every request it sees.
pub(crate) fn scripted(
    routes: &[(&'static str, Route)],
) -> (
    FnBackend<impl Fn(Request) -> Result<Response> + Send + Sync + 'static>,
    SentLog,
) {
    let routes: HashMap<&'static str, Route> = routes.iter().cloned().collect();
    let sent: SentLog = Arc::new(Mutex::new(Vec::new()));
    let log = sent.clone();

    let backend = backend_fn(move |request: Request| {
        log.lock().unwrap().push(request.clone());
        let route = routes
            .get(request.uri().path())
            .cloned()
            .unwrap_or_else(|| reply(404, "not found"));

        match route {
            Route::Fail => Err(HttpClientError::Connection(format!(
                "connection reset by {}",
                request.uri()
            ))),
            Route::Reply {
                status,
                location,
                set_cookie,
                body,
            } => {
                let mut headers = HeaderMap::new();
                if let Some(location) = location {
                    headers.insert(LOCATION, HeaderValue::from_static(location));
                }
                if let Some(cookie) = set_cookie {
                    headers.insert(SET_COOKIE, HeaderValue::from_static(cookie));
                }
                Ok(Response::new(
                    StatusCode::from_u16(status).unwrap(),
                    headers,
                    body,
                    request.uri().clone(),
                ))
            }
        }
    });

    (backend, sent)
}

pub(crate) fn url(path: &str) -> Url {
    Url::parse("http://test.local").unwrap().join(path).unwrap()
}
