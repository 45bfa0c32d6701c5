//! Effect abstraction.
//!
//! Backends return their result wrapped in an effect type chosen by the
//! caller. The redirect loop and the other decorators are written once
//! against [`Effect`] and reused for every binding:
//!
//! - [`Blocking`]: a plain `Result`, computed on the calling thread.
//! - [`Async`]: a boxed `Send` future; dropping it cancels whichever hop is
//!   currently outstanding.
//! - [`Lazy`]: a [`Task`] that performs no work until it is run.

use crate::{HttpClientError, Result};
use futures::future::{self, BoxFuture, FutureExt, TryFutureExt};
use std::fmt;
use std::ops::ControlFlow;

/// Minimal capability contract an effect type must satisfy.
///
/// All error-carrying operations use [`HttpClientError`] as the error channel.
pub trait Effect: Send + Sync + 'static {
    /// The effect-wrapped computation producing a `T`.
    type F<T: Send + 'static>: Send + 'static;

    /// Lift a value into the effect.
    fn unit<T: Send + 'static>(value: T) -> Self::F<T>;

    /// Inject an error into the effect.
    fn error<T: Send + 'static>(error: HttpClientError) -> Self::F<T>;

    /// Lift a `Result` into the effect.
    fn from_result<T: Send + 'static>(result: Result<T>) -> Self::F<T> {
        match result {
            Ok(value) => Self::unit(value),
            Err(error) => Self::error(error),
        }
    }

    /// Transform the successful value.
    fn map<T, U, M>(fa: Self::F<T>, f: M) -> Self::F<U>
    where
        T: Send + 'static,
        U: Send + 'static,
        M: FnOnce(T) -> U + Send + 'static;

    /// Sequence a dependent computation after `fa` succeeds.
    fn flat_map<T, U, M>(fa: Self::F<T>, f: M) -> Self::F<U>
    where
        T: Send + 'static,
        U: Send + 'static,
        M: FnOnce(T) -> Self::F<U> + Send + 'static;

    /// Recover from an error raised by `fa`.
    fn handle_error<T, H>(fa: Self::F<T>, handler: H) -> Self::F<T>
    where
        T: Send + 'static,
        H: FnOnce(HttpClientError) -> Self::F<T> + Send + 'static;

    /// Defer building a computation until the effect is evaluated.
    ///
    /// Eager effects simply evaluate the thunk.
    fn suspend<T, S>(thunk: S) -> Self::F<T>
    where
        T: Send + 'static,
        S: FnOnce() -> Self::F<T> + Send + 'static;

    /// Run `step` repeatedly, starting from `initial`, until it breaks.
    ///
    /// Each step's effect is evaluated before the next step is built, so
    /// stack usage stays constant however many steps run.
    fn iterate<S, T, M>(initial: S, step: M) -> Self::F<T>
    where
        S: Send + 'static,
        T: Send + 'static,
        M: FnMut(S) -> Self::F<ControlFlow<T, S>> + Send + 'static;
}

// ============================================================================
// Blocking
// ============================================================================

/// Thread-blocking effect: `F<T>` is `Result<T>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Blocking;

impl Effect for Blocking {
    type F<T: Send + 'static> = Result<T>;

    fn unit<T: Send + 'static>(value: T) -> Self::F<T> {
        Ok(value)
    }

    fn error<T: Send + 'static>(error: HttpClientError) -> Self::F<T> {
        Err(error)
    }

    fn map<T, U, M>(fa: Self::F<T>, f: M) -> Self::F<U>
    where
        T: Send + 'static,
        U: Send + 'static,
        M: FnOnce(T) -> U + Send + 'static,
    {
        fa.map(f)
    }

    fn flat_map<T, U, M>(fa: Self::F<T>, f: M) -> Self::F<U>
    where
        T: Send + 'static,
        U: Send + 'static,
        M: FnOnce(T) -> Self::F<U> + Send + 'static,
    {
        fa.and_then(f)
    }

    fn handle_error<T, H>(fa: Self::F<T>, handler: H) -> Self::F<T>
    where
        T: Send + 'static,
        H: FnOnce(HttpClientError) -> Self::F<T> + Send + 'static,
    {
        fa.or_else(handler)
    }

    fn suspend<T, S>(thunk: S) -> Self::F<T>
    where
        T: Send + 'static,
        S: FnOnce() -> Self::F<T> + Send + 'static,
    {
        thunk()
    }

    fn iterate<S, T, M>(initial: S, mut step: M) -> Self::F<T>
    where
        S: Send + 'static,
        T: Send + 'static,
        M: FnMut(S) -> Self::F<ControlFlow<T, S>> + Send + 'static,
    {
        let mut state = initial;
        loop {
            match step(state)? {
                ControlFlow::Continue(next) => state = next,
                ControlFlow::Break(value) => return Ok(value),
            }
        }
    }
}

// ============================================================================
// Async
// ============================================================================

/// Future-based effect: `F<T>` is a boxed `Send` future of `Result<T>`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Async;

impl Effect for Async {
    type F<T: Send + 'static> = BoxFuture<'static, Result<T>>;

    fn unit<T: Send + 'static>(value: T) -> Self::F<T> {
        future::ready(Ok(value)).boxed()
    }

    fn error<T: Send + 'static>(error: HttpClientError) -> Self::F<T> {
        future::ready(Err(error)).boxed()
    }

    fn map<T, U, M>(fa: Self::F<T>, f: M) -> Self::F<U>
    where
        T: Send + 'static,
        U: Send + 'static,
        M: FnOnce(T) -> U + Send + 'static,
    {
        fa.map_ok(f).boxed()
    }

    fn flat_map<T, U, M>(fa: Self::F<T>, f: M) -> Self::F<U>
    where
        T: Send + 'static,
        U: Send + 'static,
        M: FnOnce(T) -> Self::F<U> + Send + 'static,
    {
        async move {
            let value = fa.await?;
            f(value).await
        }
        .boxed()
    }

    fn handle_error<T, H>(fa: Self::F<T>, handler: H) -> Self::F<T>
    where
        T: Send + 'static,
        H: FnOnce(HttpClientError) -> Self::F<T> + Send + 'static,
    {
        async move {
            match fa.await {
                Ok(value) => Ok(value),
                Err(error) => handler(error).await,
            }
        }
        .boxed()
    }

    fn suspend<T, S>(thunk: S) -> Self::F<T>
    where
        T: Send + 'static,
        S: FnOnce() -> Self::F<T> + Send + 'static,
    {
        async move { thunk().await }.boxed()
    }

    fn iterate<S, T, M>(initial: S, mut step: M) -> Self::F<T>
    where
        S: Send + 'static,
        T: Send + 'static,
        M: FnMut(S) -> Self::F<ControlFlow<T, S>> + Send + 'static,
    {
        async move {
            let mut state = initial;
            loop {
                match step(state).await? {
                    ControlFlow::Continue(next) => state = next,
                    ControlFlow::Break(value) => return Ok(value),
                }
            }
        }
        .boxed()
    }
}

// ============================================================================
// Lazy
// ============================================================================

/// A deferred computation. Nothing happens until [`Task::run`] is called.
pub struct Task<T> {
    thunk: Box<dyn FnOnce() -> Result<T> + Send + 'static>,
}

impl<T: Send + 'static> Task<T> {
    /// Create a task from a thunk.
    pub fn new<F>(thunk: F) -> Self
    where
        F: FnOnce() -> Result<T> + Send + 'static,
    {
        Self {
            thunk: Box::new(thunk),
        }
    }

    /// Create a task that completes with `value`.
    pub fn now(value: T) -> Self {
        Self::new(move || Ok(value))
    }

    /// Run the task on the current thread.
    pub fn run(self) -> Result<T> {
        (self.thunk)()
    }

    /// Run the task on tokio's blocking pool.
    pub async fn run_on_blocking_pool(self) -> Result<T> {
        tokio::task::spawn_blocking(move || self.run())
            .await
            .map_err(|e| HttpClientError::Io(std::io::Error::other(e)))?
    }
}

impl<T> fmt::Debug for Task<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad("Task<..>")
    }
}

/// Lazily evaluated effect: `F<T>` is a [`Task<T>`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Lazy;

impl Effect for Lazy {
    type F<T: Send + 'static> = Task<T>;

    fn unit<T: Send + 'static>(value: T) -> Self::F<T> {
        Task::now(value)
    }

    fn error<T: Send + 'static>(error: HttpClientError) -> Self::F<T> {
        Task::new(move || Err(error))
    }

    fn map<T, U, M>(fa: Self::F<T>, f: M) -> Self::F<U>
    where
        T: Send + 'static,
        U: Send + 'static,
        M: FnOnce(T) -> U + Send + 'static,
    {
        Task::new(move || fa.run().map(f))
    }

    fn flat_map<T, U, M>(fa: Self::F<T>, f: M) -> Self::F<U>
    where
        T: Send + 'static,
        U: Send + 'static,
        M: FnOnce(T) -> Self::F<U> + Send + 'static,
    {
        Task::new(move || f(fa.run()?).run())
    }

    fn handle_error<T, H>(fa: Self::F<T>, handler: H) -> Self::F<T>
    where
        T: Send + 'static,
        H: FnOnce(HttpClientError) -> Self::F<T> + Send + 'static,
    {
        Task::new(move || match fa.run() {
            Ok(value) => Ok(value),
            Err(error) => handler(error).run(),
        })
    }

    fn suspend<T, S>(thunk: S) -> Self::F<T>
    where
        T: Send + 'static,
        S: FnOnce() -> Self::F<T> + Send + 'static,
    {
        Task::new(move || thunk().run())
    }

    fn iterate<S, T, M>(initial: S, mut step: M) -> Self::F<T>
    where
        S: Send + 'static,
        T: Send + 'static,
        M: FnMut(S) -> Self::F<ControlFlow<T, S>> + Send + 'static,
    {
        Task::new(move || {
            let mut state = initial;
            loop {
                match step(state).run()? {
                    ControlFlow::Continue(next) => state = next,
                    ControlFlow::Break(value) => return Ok(value),
                }
            }
        })
    }
}
