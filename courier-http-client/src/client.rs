//! HTTP client facade.

use http::Method;
use std::sync::Arc;
use tracing::debug;

use crate::backend::Backend;
use crate::effect::Effect;
use crate::{
    FollowRedirects, HttpClientConfig, LoggingBackend, Request, RequestBuilder, Response,
};

/// HTTP client bound to one effect type.
///
/// The client owns a backend stack built from its configuration: the
/// transport, optionally wrapped in [`LoggingBackend`], optionally wrapped in
/// [`FollowRedirects`]. Logging sits inside the redirect decorator, so every
/// hop is logged.
pub struct HttpClient<E: Effect> {
    backend: Arc<dyn Backend<E>>,
    config: Arc<HttpClientConfig>,
}

impl<E: Effect> Clone for HttpClient<E> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
            config: self.config.clone(),
        }
    }
}

impl<E: Effect> HttpClient<E> {
    /// Create a client over a transport backend.
    pub fn new<B>(transport: B, config: HttpClientConfig) -> Self
    where
        B: Backend<E> + 'static,
    {
        let mut backend: Arc<dyn Backend<E>> = Arc::new(transport);

        if config.log_requests {
            backend = Arc::new(LoggingBackend::new(backend));
        }
        if config.follow_redirects {
            backend = Arc::new(FollowRedirects::with_config(
                backend,
                config.redirect_config(),
            ));
        }

        debug!(
            follow_redirects = config.follow_redirects,
            max_redirects = config.max_redirects,
            log_requests = config.log_requests,
            "HTTP client created"
        );

        Self {
            backend,
            config: Arc::new(config),
        }
    }

    /// Create a client over a backend stack assembled by the caller.
    ///
    /// No decorators are added.
    pub fn from_backend(backend: Arc<dyn Backend<E>>, config: HttpClientConfig) -> Self {
        Self {
            backend,
            config: Arc::new(config),
        }
    }

    /// Get the client configuration.
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Get the backend stack.
    pub fn backend(&self) -> &Arc<dyn Backend<E>> {
        &self.backend
    }

    /// Send a prepared request.
    pub fn send(&self, request: Request) -> E::F<Response> {
        Backend::<E>::send(&*self.backend, request)
    }

    /// Create a GET request builder.
    pub fn get(&self, url: impl Into<String>) -> RequestBuilder<'_, E> {
        RequestBuilder::new(self, Method::GET, url.into())
    }

    /// Create a POST request builder.
    pub fn post(&self, url: impl Into<String>) -> RequestBuilder<'_, E> {
        RequestBuilder::new(self, Method::POST, url.into())
    }

    /// Create a PUT request builder.
    pub fn put(&self, url: impl Into<String>) -> RequestBuilder<'_, E> {
        RequestBuilder::new(self, Method::PUT, url.into())
    }

    /// Create a PATCH request builder.
    pub fn patch(&self, url: impl Into<String>) -> RequestBuilder<'_, E> {
        RequestBuilder::new(self, Method::PATCH, url.into())
    }

    /// Create a DELETE request builder.
    pub fn delete(&self, url: impl Into<String>) -> RequestBuilder<'_, E> {
        RequestBuilder::new(self, Method::DELETE, url.into())
    }

    /// Create a HEAD request builder.
    pub fn head(&self, url: impl Into<String>) -> RequestBuilder<'_, E> {
        RequestBuilder::new(self, Method::HEAD, url.into())
    }

    /// Create an OPTIONS request builder.
    pub fn options(&self, url: impl Into<String>) -> RequestBuilder<'_, E> {
        RequestBuilder::new(self, Method::OPTIONS, url.into())
    }

    /// Create a request builder with a custom method.
    pub fn request(&self, method: Method, url: impl Into<String>) -> RequestBuilder<'_, E> {
        RequestBuilder::new(self, method, url.into())
    }
}

#[cfg(feature = "reqwest")]
mod reqwest_clients {
    use super::HttpClient;
    use crate::backend::Deferred;
    use crate::effect::{Async, Blocking, Lazy};
    use crate::transport::{BlockingReqwestBackend, ReqwestBackend};
    use crate::{HttpClientConfig, Result};

    impl HttpClient<Async> {
        /// Create an async client backed by `reqwest`.
        pub fn reqwest(config: HttpClientConfig) -> Result<Self> {
            let transport = ReqwestBackend::new(&config)?;
            Ok(Self::new(transport, config))
        }
    }

    impl HttpClient<Blocking> {
        /// Create a blocking client backed by `reqwest::blocking`.
        ///
        /// Must not be created or used from inside an async runtime thread.
        pub fn reqwest_blocking(config: HttpClientConfig) -> Result<Self> {
            let transport = BlockingReqwestBackend::new(&config)?;
            Ok(Self::new(transport, config))
        }
    }

    impl HttpClient<Lazy> {
        /// Create a lazy client backed by `reqwest::blocking`.
        ///
        /// Requests are sent when the returned task is run.
        pub fn reqwest_lazy(config: HttpClientConfig) -> Result<Self> {
            let transport = Deferred::new(BlockingReqwestBackend::new(&config)?);
            Ok(Self::new(transport, config))
        }
    }
}
