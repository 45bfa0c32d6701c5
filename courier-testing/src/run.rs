// Run effects to completion in tests

use courier_http_client::{Async, Blocking, Effect, Lazy, Result};

/// Evaluate an effect on the current thread.
///
/// Lets one test body run against every effect binding:
///
/// ```
/// use courier_testing::{RunBlocking, StubBackend, StubResponse};
/// use courier_http_client::{Async, Backend, Blocking, Lazy, Request, Url};
///
/// fn fetch<E: RunBlocking>(stub: &StubBackend) -> u16 {
///     let request = Request::get(Url::parse("http://stub.local/").unwrap());
///     E::run_blocking(Backend::<E>::send(stub, request)).unwrap().code()
/// }
///
/// let stub = StubBackend::new().with_route("/", StubResponse::ok("hi"));
/// assert_eq!(fetch::<Blocking>(&stub), 200);
/// assert_eq!(fetch::<Async>(&stub), 200);
/// assert_eq!(fetch::<Lazy>(&stub), 200);
/// ```
pub trait RunBlocking: Effect {
    /// Drive `fa` to completion.
    fn run_blocking<T: Send + 'static>(fa: Self::F<T>) -> Result<T>;
}

impl RunBlocking for Blocking {
    fn run_blocking<T: Send + 'static>(fa: Self::F<T>) -> Result<T> {
        fa
    }
}

/// Uses a local executor; futures that need a tokio reactor must be awaited
/// inside a runtime instead.
impl RunBlocking for Async {
    fn run_blocking<T: Send + 'static>(fa: Self::F<T>) -> Result<T> {
        futures::executor::block_on(fa)
    }
}

impl RunBlocking for Lazy {
    fn run_blocking<T: Send + 'static>(fa: Self::F<T>) -> Result<T> {
        fa.run()
    }
}
