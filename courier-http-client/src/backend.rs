//! Transport backend abstraction.

use crate::effect::{Blocking, Effect, Lazy, Task};
use crate::{Request, Response, Result};
use std::sync::Arc;

/// Sends a single request and yields a single response in the effect `E`.
///
/// Transports implement this without any redirect awareness. Decorators
/// such as [`FollowRedirects`](crate::FollowRedirects) and
/// [`LoggingBackend`](crate::LoggingBackend) implement it too, so they can be
/// stacked and substituted for a plain transport.
pub trait Backend<E: Effect>: Send + Sync {
    /// Send the request.
    fn send(&self, request: Request) -> E::F<Response>;
}

impl<E: Effect, B: Backend<E> + ?Sized> Backend<E> for Arc<B> {
    fn send(&self, request: Request) -> E::F<Response> {
        <B as Backend<E>>::send(self, request)
    }
}

impl<E: Effect, B: Backend<E> + ?Sized> Backend<E> for Box<B> {
    fn send(&self, request: Request) -> E::F<Response> {
        <B as Backend<E>>::send(self, request)
    }
}

/// Backend built from a synchronous function.
///
/// Works with every effect. The function is invoked inside
/// [`Effect::suspend`], so lazy effects stay lazy.
pub struct FnBackend<F> {
    f: Arc<F>,
}

/// Create a backend from a function.
pub fn backend_fn<F>(f: F) -> FnBackend<F>
where
    F: Fn(Request) -> Result<Response> + Send + Sync + 'static,
{
    FnBackend { f: Arc::new(f) }
}

impl<F> Clone for FnBackend<F> {
    fn clone(&self) -> Self {
        Self { f: self.f.clone() }
    }
}

impl<E, F> Backend<E> for FnBackend<F>
where
    E: Effect,
    F: Fn(Request) -> Result<Response> + Send + Sync + 'static,
{
    fn send(&self, request: Request) -> E::F<Response> {
        let f = self.f.clone();
        E::suspend(move || E::from_result(f(request)))
    }
}

/// Lifts a blocking backend into the [`Lazy`] effect.
///
/// The blocking call happens when the returned [`Task`] is run.
pub struct Deferred<B> {
    inner: Arc<B>,
}

impl<B> Deferred<B> {
    /// Wrap a blocking backend.
    pub fn new(inner: B) -> Self {
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Get the wrapped backend.
    pub fn inner(&self) -> &B {
        &self.inner
    }
}

impl<B> Backend<Lazy> for Deferred<B>
where
    B: Backend<Blocking> + 'static,
{
    fn send(&self, request: Request) -> Task<Response> {
        let inner = self.inner.clone();
        Task::new(move || <B as Backend<Blocking>>::send(&inner, request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::Async;
    use http::{HeaderMap, StatusCode};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use url::Url;

    fn echo_path() -> FnBackend<impl Fn(Request) -> Result<Response> + Send + Sync + 'static> {
        backend_fn(|request: Request| {
            let path = request.uri().path().to_string();
            Ok(Response::new(
                StatusCode::OK,
                HeaderMap::new(),
                path,
                request.uri().clone(),
            ))
        })
    }

    fn request(path: &str) -> Request {
        Request::get(Url::parse("http://example.com").unwrap().join(path).unwrap())
    }

    #[test]
    fn test_fn_backend_in_every_effect() {
        let backend = echo_path();

        let blocking = Backend::<Blocking>::send(&backend, request("/blocking")).unwrap();
        assert_eq!(blocking.text().unwrap(), "/blocking");

        let future = Backend::<Async>::send(&backend, request("/async"));
        let async_response = tokio_test::block_on(future).unwrap();
        assert_eq!(async_response.text().unwrap(), "/async");

        let task = Backend::<Lazy>::send(&backend, request("/lazy"));
        assert_eq!(task.run().unwrap().text().unwrap(), "/lazy");
    }

    #[test]
    fn test_trait_objects() {
        let backend: Arc<dyn Backend<Blocking>> = Arc::new(echo_path());
        let boxed: Box<dyn Backend<Blocking>> = Box::new(echo_path());

        let from_arc = Backend::<Blocking>::send(&backend, request("/arc")).unwrap();
        let from_box = Backend::<Blocking>::send(&boxed, request("/box")).unwrap();
        assert_eq!(from_arc.text().unwrap(), "/arc");
        assert_eq!(from_box.text().unwrap(), "/box");
    }

    #[test]
    fn test_deferred_runs_only_when_task_runs() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let blocking = backend_fn(move |request: Request| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Response::new(
                StatusCode::NO_CONTENT,
                HeaderMap::new(),
                "",
                request.uri().clone(),
            ))
        });

        let deferred = Deferred::new(blocking);
        let task = deferred.send(request("/later"));
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let response = task.run().unwrap();
        assert_eq!(response.code(), 204);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
