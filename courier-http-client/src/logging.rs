//! Request/response logging decorator.

use crate::backend::Backend;
use crate::effect::Effect;
use crate::{Request, Response};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, trace, warn};

/// Backend decorator that logs every exchange through `tracing`.
///
/// Logging happens when the effect is evaluated, not when it is built, so a
/// lazy send logs when its task runs.
pub struct LoggingBackend<B> {
    inner: Arc<B>,
    log_headers: bool,
}

impl<B> LoggingBackend<B> {
    /// Wrap a backend.
    pub fn new(inner: B) -> Self {
        Self {
            inner: Arc::new(inner),
            log_headers: false,
        }
    }

    /// Also log request and response headers at `trace` level.
    pub fn with_headers(mut self) -> Self {
        self.log_headers = true;
        self
    }

    /// Get the wrapped backend.
    pub fn inner(&self) -> &B {
        &self.inner
    }
}

impl<E, B> Backend<E> for LoggingBackend<B>
where
    E: Effect,
    B: Backend<E> + 'static,
{
    fn send(&self, request: Request) -> E::F<Response> {
        let inner = self.inner.clone();
        let log_headers = self.log_headers;

        E::suspend(move || {
            let method = request.method().clone();
            let url = request.uri().clone();
            debug!(method = %method, url = %url, "Sending HTTP request");

            if log_headers {
                for (name, value) in request.headers() {
                    trace!(header = %name, value = ?value, "Request header");
                }
            }

            let start = Instant::now();
            let sent = <B as Backend<E>>::send(&inner, request);

            let logged = E::map(sent, move |response: Response| {
                debug!(
                    status = %response.status(),
                    hops = response.history().len(),
                    elapsed_ms = start.elapsed().as_millis() as u64,
                    "Received HTTP response"
                );
                if log_headers {
                    for (name, value) in response.headers() {
                        trace!(header = %name, value = ?value, "Response header");
                    }
                }
                response
            });

            E::handle_error(logged, move |error| {
                warn!(method = %method, url = %url, error = %error, "HTTP request failed");
                E::error(error)
            })
        })
    }
}
