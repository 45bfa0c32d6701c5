//! Request builder.

use crate::effect::Effect;
use crate::request::{Body, Part, StreamSource};
use crate::{HttpClient, HttpClientError, Request, Response, Result};
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use serde::Serialize;
use std::time::Duration;

/// HTTP request builder returned by the [`HttpClient`] verb helpers.
///
/// Building never panics: header, URL and serialization problems are kept
/// and reported by [`build`](Self::build) or through the effect returned by
/// [`send`](Self::send).
pub struct RequestBuilder<'a, E: Effect> {
    client: &'a HttpClient<E>,
    method: Method,
    url: String,
    headers: HeaderMap,
    query: Vec<(String, String)>,
    body: Body,
    max_redirects: Option<u32>,
    follow_redirects: Option<bool>,
    redirect_to_get: bool,
    timeout: Option<Duration>,
    error: Option<HttpClientError>,
}

impl<'a, E: Effect> RequestBuilder<'a, E> {
    /// Create a new request builder.
    pub(crate) fn new(client: &'a HttpClient<E>, method: Method, url: String) -> Self {
        Self {
            client,
            method,
            url,
            headers: HeaderMap::new(),
            query: Vec::new(),
            body: Body::Empty,
            max_redirects: None,
            follow_redirects: None,
            redirect_to_get: false,
            timeout: None,
            error: None,
        }
    }

    fn fail(mut self, error: HttpClientError) -> Self {
        if self.error.is_none() {
            self.error = Some(error);
        }
        self
    }

    /// Add a header to the request, keeping earlier values of the same name.
    pub fn header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        let name = name.as_ref();
        match (
            HeaderName::try_from(name),
            HeaderValue::try_from(value.as_ref()),
        ) {
            (Ok(name), Ok(value)) => {
                self.headers.append(name, value);
                self
            }
            _ => self.fail(HttpClientError::RequestBuild(format!(
                "invalid header: {name}"
            ))),
        }
    }

    /// Add multiple headers to the request.
    pub fn headers(mut self, headers: HeaderMap) -> Self {
        for (name, value) in headers.iter() {
            self.headers.append(name.clone(), value.clone());
        }
        self
    }

    /// Add a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Add multiple query parameters.
    pub fn queries<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in params {
            self.query.push((k.into(), v.into()));
        }
        self
    }

    /// Set the request body.
    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.body = body.into();
        self
    }

    /// Set the request body as text.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.headers.insert(
            http::header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        self.body = Body::from(text.into());
        self
    }

    /// Set the request body as JSON.
    pub fn json<T: Serialize>(mut self, json: &T) -> Self {
        match serde_json::to_vec(json) {
            Ok(bytes) => {
                self.headers.insert(
                    http::header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json"),
                );
                self.body = Body::from(bytes);
                self
            }
            Err(e) => self.fail(HttpClientError::Json(e.to_string())),
        }
    }

    /// Set the request body as form data.
    pub fn form<T: Serialize>(mut self, form: &T) -> Self {
        match serde_urlencoded::to_string(form) {
            Ok(encoded) => {
                self.headers.insert(
                    http::header::CONTENT_TYPE,
                    HeaderValue::from_static("application/x-www-form-urlencoded"),
                );
                self.body = Body::from(encoded);
                self
            }
            Err(e) => self.fail(HttpClientError::RequestBuild(format!(
                "failed to encode form data: {e}"
            ))),
        }
    }

    /// Set a multipart body.
    pub fn multipart(mut self, parts: Vec<Part>) -> Self {
        self.body = Body::Multipart(parts);
        self
    }

    /// Set a streaming body.
    pub fn stream(mut self, source: StreamSource) -> Self {
        self.body = Body::Stream(source);
        self
    }

    /// Set a per-hop timeout for this request.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the redirect limit for this request.
    pub fn max_redirects(mut self, max: u32) -> Self {
        self.max_redirects = Some(max);
        self
    }

    /// Enable or disable redirect following for this request.
    pub fn follow_redirects(mut self, follow: bool) -> Self {
        self.follow_redirects = Some(follow);
        self
    }

    /// Downgrade to GET on 301/302 hops.
    pub fn redirect_to_get(mut self, enable: bool) -> Self {
        self.redirect_to_get = enable;
        self
    }

    /// Set bearer authentication.
    pub fn bearer_auth(self, token: impl Into<String>) -> Self {
        self.header("Authorization", format!("Bearer {}", token.into()))
    }

    /// Set basic authentication.
    pub fn basic_auth(
        self,
        username: impl Into<String>,
        password: Option<impl Into<String>>,
    ) -> Self {
        use base64::Engine;
        let credentials = match password {
            Some(p) => format!("{}:{}", username.into(), p.into()),
            None => format!("{}:", username.into()),
        };
        let encoded = base64::engine::general_purpose::STANDARD.encode(credentials);
        self.header("Authorization", format!("Basic {}", encoded))
    }

    /// Build the URL with query parameters.
    fn build_url(&self) -> Result<url::Url> {
        let mut url = if let Some(base) = &self.client.config().base_url {
            let base =
                url::Url::parse(base).map_err(|e| HttpClientError::InvalidUrl(e.to_string()))?;
            base.join(&self.url)
                .map_err(|e| HttpClientError::InvalidUrl(e.to_string()))?
        } else {
            url::Url::parse(&self.url).map_err(|e| HttpClientError::InvalidUrl(e.to_string()))?
        };

        if !self.query.is_empty() {
            let mut query_pairs = url.query_pairs_mut();
            for (key, value) in &self.query {
                query_pairs.append_pair(key, value);
            }
        }

        Ok(url)
    }

    /// Default headers from the client config, overridden by request headers.
    fn build_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        for (name, value) in &self.client.config().default_headers {
            let name = HeaderName::try_from(name.as_str())
                .map_err(|_| HttpClientError::RequestBuild(format!("invalid header: {name}")))?;
            let value = HeaderValue::try_from(value.as_str())
                .map_err(|_| HttpClientError::RequestBuild(format!("invalid header: {name}")))?;
            headers.append(name, value);
        }

        for name in self.headers.keys() {
            headers.remove(name);
        }
        for (name, value) in self.headers.iter() {
            headers.append(name.clone(), value.clone());
        }

        Ok(headers)
    }

    /// Build the request without sending it.
    pub fn build(self) -> Result<Request> {
        if let Some(error) = self.error {
            return Err(error);
        }

        let url = self.build_url()?;
        let headers = self.build_headers()?;

        let mut request = Request::new(self.method, url)
            .with_headers(headers)
            .with_body(self.body)
            .redirect_to_get(self.redirect_to_get);

        if let Some(follow) = self.follow_redirects {
            request = request.follow_redirects(follow);
        }
        if let Some(max) = self.max_redirects {
            request = request.max_redirects(max);
        }
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        Ok(request)
    }

    /// Send the request.
    pub fn send(self) -> E::F<Response> {
        let client = self.client;
        match self.build() {
            Ok(request) => client.send(request),
            Err(error) => E::error(error),
        }
    }
}
