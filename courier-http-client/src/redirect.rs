//! Redirect-following decorator.
//!
//! [`FollowRedirects`] wraps any [`Backend`] and re-issues the request for
//! 301, 302, 303, 307 and 308 responses. The loop is written once against
//! [`Effect`]: each hop is one [`Effect::iterate`] step, and the loop state
//! travels as an explicit accumulator rather than captured mutable
//! variables. Chains of any length run in constant stack.
//!
//! Method and body rewriting per status:
//!
//! | Status   | Method                 | Body     |
//! |----------|------------------------|----------|
//! | 301, 302 | kept                   | kept     |
//! | 303      | GET                    | dropped  |
//! | 307, 308 | kept                   | kept     |
//!
//! 301 and 302 keep non-GET methods unless the request opts into
//! [`RequestOptions::redirect_to_get`](crate::RequestOptions::redirect_to_get).
//!
//! Reaching the redirect limit is not an error: the last redirect response
//! is returned with the history collected so far.
//!
//! Decorators nest. Any history already attached by an inner decorator is
//! spliced into the outer one, so the final history stays flat.

use crate::backend::Backend;
use crate::effect::Effect;
use crate::{HttpClientError, Request, Response, Result, cookies};
use http::Method;
use http::header::{CONTENT_ENCODING, CONTENT_LENGTH, CONTENT_TYPE, HOST, LOCATION, TRANSFER_ENCODING};
use std::ops::ControlFlow;
use std::sync::Arc;
use tracing::debug;
use url::Url;

/// Redirect limit used when neither the decorator nor the request sets one.
pub const DEFAULT_MAX_REDIRECTS: u32 = 32;

/// Redirect decorator configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RedirectConfig {
    /// Maximum number of hops followed per send.
    pub max_redirects: u32,
    /// Forward `Set-Cookie` values from each hop to the next request.
    pub carry_cookies: bool,
}

impl Default for RedirectConfig {
    fn default() -> Self {
        Self {
            max_redirects: DEFAULT_MAX_REDIRECTS,
            carry_cookies: false,
        }
    }
}

impl RedirectConfig {
    /// Create a config with the given redirect limit.
    pub fn new(max_redirects: u32) -> Self {
        Self {
            max_redirects,
            ..Default::default()
        }
    }

    /// Enable cookie carry-over between hops.
    pub fn with_cookies(mut self) -> Self {
        self.carry_cookies = true;
        self
    }
}

/// Backend decorator that follows redirects.
pub struct FollowRedirects<B> {
    inner: Arc<B>,
    config: RedirectConfig,
}

impl<B> FollowRedirects<B> {
    /// Wrap a backend using the default configuration.
    pub fn new(inner: B) -> Self {
        Self::with_config(inner, RedirectConfig::default())
    }

    /// Wrap a backend with a custom configuration.
    pub fn with_config(inner: B, config: RedirectConfig) -> Self {
        Self {
            inner: Arc::new(inner),
            config,
        }
    }

    /// Get the wrapped backend.
    pub fn inner(&self) -> &B {
        &self.inner
    }

    /// Get the configuration.
    pub fn config(&self) -> &RedirectConfig {
        &self.config
    }
}

impl<E, B> Backend<E> for FollowRedirects<B>
where
    E: Effect,
    B: Backend<E> + 'static,
{
    fn send(&self, request: Request) -> E::F<Response> {
        let options = *request.options();
        if !options.follow_redirects {
            return <B as Backend<E>>::send(&self.inner, request);
        }

        let redirects_left = options.max_redirects.unwrap_or(self.config.max_redirects);
        let state = RedirectState {
            request,
            redirects_left,
            history: Vec::new(),
        };
        follow::<E, B>(self.inner.clone(), self.config, state)
    }
}

/// Loop accumulator, owned by a single chain of sends.
#[derive(Debug)]
struct RedirectState {
    request: Request,
    redirects_left: u32,
    history: Vec<Response>,
}

impl RedirectState {
    fn advance(
        self,
        mut response: Response,
        config: &RedirectConfig,
    ) -> Result<ControlFlow<Response, Self>> {
        let mut history = self.history;
        history.append(&mut response.take_history());

        if !response.is_redirect() {
            return Ok(ControlFlow::Break(response.with_history(history)));
        }

        if self.redirects_left == 0 {
            debug!(
                status = response.code(),
                hops = history.len(),
                url = %self.request.uri(),
                "Redirect limit reached, returning redirect response"
            );
            return Ok(ControlFlow::Break(response.with_history(history)));
        }

        let target = resolve_location(self.request.uri(), &response)?;
        debug!(
            status = response.code(),
            from = %self.request.uri(),
            to = %target,
            redirects_left = self.redirects_left - 1,
            "Following redirect"
        );

        let request = redirect_request(self.request, &response, target, config);
        history.push(response);

        Ok(ControlFlow::Continue(RedirectState {
            request,
            redirects_left: self.redirects_left - 1,
            history,
        }))
    }
}

fn follow<E, B>(backend: Arc<B>, config: RedirectConfig, state: RedirectState) -> E::F<Response>
where
    E: Effect,
    B: Backend<E> + 'static,
{
    E::iterate(state, move |state: RedirectState| {
        let sent = <B as Backend<E>>::send(&backend, state.request.clone());
        E::flat_map(sent, move |response| E::from_result(state.advance(response, &config)))
    })
}

/// Resolve a redirect response's `Location` against the current request URI.
pub fn resolve_location(base: &Url, response: &Response) -> Result<Url> {
    let status = response.code();
    let raw = response.headers().get(LOCATION).ok_or_else(|| {
        HttpClientError::malformed_redirect(status, None, "missing Location header")
    })?;

    let location = raw.to_str().map_err(|_| {
        HttpClientError::malformed_redirect(
            status,
            Some(String::from_utf8_lossy(raw.as_bytes()).into_owned()),
            "Location header is not valid UTF-8",
        )
    })?;

    let trimmed = location.trim();
    if trimmed.is_empty() {
        return Err(HttpClientError::malformed_redirect(
            status,
            Some(location.to_string()),
            "empty Location header",
        ));
    }

    base.join(trimmed).map_err(|e| {
        HttpClientError::malformed_redirect(status, Some(location.to_string()), e.to_string())
    })
}

/// Derive the request for the next hop.
///
/// The target URI is always replaced. `Host` and `Content-Length` are
/// dropped so the transport recomputes them. Everything else carries over
/// unless the status rules force a GET, in which case the body and the
/// headers describing it go too.
pub fn redirect_request(
    request: Request,
    response: &Response,
    target: Url,
    config: &RedirectConfig,
) -> Request {
    let switch_to_get = match response.code() {
        303 => true,
        301 | 302 => {
            request.options().redirect_to_get
                && !matches!(*request.method(), Method::GET | Method::HEAD)
        }
        _ => false,
    };

    let mut next = request
        .with_uri(target)
        .without_header(HOST)
        .without_header(CONTENT_LENGTH);

    if switch_to_get {
        next = next
            .with_method(Method::GET)
            .without_body()
            .without_header(CONTENT_TYPE)
            .without_header(CONTENT_ENCODING)
            .without_header(TRANSFER_ENCODING);
    }

    if config.carry_cookies {
        next = cookies::carry(next, response);
    }

    next
}
