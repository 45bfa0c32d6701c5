//! HTTP request model.

use bytes::Bytes;
use futures::stream::BoxStream;
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// A single HTTP request.
///
/// Requests are values: every `with_*` method consumes the request and
/// returns a derived one, which is how the redirect decorator builds the
/// request for the next hop.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    uri: Url,
    headers: HeaderMap,
    body: Body,
    options: RequestOptions,
}

impl Request {
    /// Create a request with no headers and no body.
    pub fn new(method: Method, uri: Url) -> Self {
        Self {
            method,
            uri,
            headers: HeaderMap::new(),
            body: Body::Empty,
            options: RequestOptions::default(),
        }
    }

    /// Create a GET request.
    pub fn get(uri: Url) -> Self {
        Self::new(Method::GET, uri)
    }

    /// Create a POST request.
    pub fn post(uri: Url) -> Self {
        Self::new(Method::POST, uri)
    }

    /// Get the request method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Get the target URI.
    pub fn uri(&self) -> &Url {
        &self.uri
    }

    /// Get the request headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Get a header value as a string.
    pub fn header(&self, name: impl AsRef<str>) -> Option<&str> {
        self.headers
            .get(name.as_ref())
            .and_then(|v| v.to_str().ok())
    }

    /// Get the request body.
    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Get the request options.
    pub fn options(&self) -> &RequestOptions {
        &self.options
    }

    /// Replace the target URI.
    pub fn with_uri(mut self, uri: Url) -> Self {
        self.uri = uri;
        self
    }

    /// Replace the method.
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Replace the body.
    pub fn with_body(mut self, body: impl Into<Body>) -> Self {
        self.body = body.into();
        self
    }

    /// Drop the body.
    pub fn without_body(mut self) -> Self {
        self.body = Body::Empty;
        self
    }

    /// Set a header, replacing any existing values.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Append a header value, keeping existing values.
    pub fn append_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Remove every value of a header.
    pub fn without_header(mut self, name: impl http::header::AsHeaderName) -> Self {
        self.headers.remove(name);
        self
    }

    /// Replace all headers.
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Replace the request options.
    pub fn with_options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }

    /// Override the redirect limit for this request.
    pub fn max_redirects(mut self, max: u32) -> Self {
        self.options.max_redirects = Some(max);
        self
    }

    /// Enable or disable redirect following for this request.
    pub fn follow_redirects(mut self, follow: bool) -> Self {
        self.options.follow_redirects = follow;
        self
    }

    /// Rewrite non-GET requests to GET on 301/302 hops.
    pub fn redirect_to_get(mut self, enable: bool) -> Self {
        self.options.redirect_to_get = enable;
        self
    }

    /// Set a per-hop timeout, enforced by the transport.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = Some(timeout);
        self
    }
}

/// Per-request options consulted by the decorators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestOptions {
    /// Whether redirects are followed at all.
    pub follow_redirects: bool,
    /// Redirect limit override; `None` uses the decorator's configured maximum.
    pub max_redirects: Option<u32>,
    /// Downgrade 301/302 hops to GET (body dropped) for methods other than GET and HEAD.
    pub redirect_to_get: bool,
    /// Per-hop timeout; `None` uses the transport's default.
    pub timeout: Option<Duration>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            follow_redirects: true,
            max_redirects: None,
            redirect_to_get: false,
            timeout: None,
        }
    }
}

// ============================================================================
// Body
// ============================================================================

/// Request body.
#[derive(Clone, Default)]
pub enum Body {
    /// No body.
    #[default]
    Empty,
    /// In-memory bytes.
    Bytes(Bytes),
    /// Streaming source.
    Stream(StreamSource),
    /// Multipart form parts.
    Multipart(Vec<Part>),
}

impl Body {
    /// Check if there is no body.
    pub fn is_empty(&self) -> bool {
        matches!(self, Body::Empty)
    }

    /// Get the in-memory bytes, if this is a byte body.
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Body::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    /// Known length of the body, if it can be computed without reading it.
    pub fn content_length(&self) -> Option<u64> {
        match self {
            Body::Empty => Some(0),
            Body::Bytes(bytes) => Some(bytes.len() as u64),
            Body::Stream(_) | Body::Multipart(_) => None,
        }
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Empty => f.write_str("Empty"),
            Body::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            Body::Stream(_) => f.write_str("Stream(..)"),
            Body::Multipart(parts) => f.debug_tuple("Multipart").field(parts).finish(),
        }
    }
}

impl PartialEq for Body {
    /// Streams compare equal only when they share the same source.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Body::Empty, Body::Empty) => true,
            (Body::Bytes(a), Body::Bytes(b)) => a == b,
            (Body::Stream(a), Body::Stream(b)) => Arc::ptr_eq(&a.factory, &b.factory),
            (Body::Multipart(a), Body::Multipart(b)) => a == b,
            _ => false,
        }
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Body::Bytes(bytes)
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Body::Bytes(Bytes::from(bytes))
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Body::Bytes(Bytes::from(text))
    }
}

impl From<&'static str> for Body {
    fn from(text: &'static str) -> Self {
        Body::Bytes(Bytes::from_static(text.as_bytes()))
    }
}

impl From<StreamSource> for Body {
    fn from(source: StreamSource) -> Self {
        Body::Stream(source)
    }
}

impl From<Vec<Part>> for Body {
    fn from(parts: Vec<Part>) -> Self {
        Body::Multipart(parts)
    }
}

type StreamFactory = dyn Fn() -> BoxStream<'static, std::io::Result<Bytes>> + Send + Sync;

/// A replayable streaming body.
///
/// Holds a factory rather than a stream so the same body can be sent again
/// when a 307/308 redirect preserves it.
#[derive(Clone)]
pub struct StreamSource {
    factory: Arc<StreamFactory>,
}

impl StreamSource {
    /// Create a source from a stream factory.
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> BoxStream<'static, std::io::Result<Bytes>> + Send + Sync + 'static,
    {
        Self {
            factory: Arc::new(factory),
        }
    }

    /// Open a fresh stream.
    pub fn open(&self) -> BoxStream<'static, std::io::Result<Bytes>> {
        (self.factory)()
    }
}

impl fmt::Debug for StreamSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad("StreamSource")
    }
}

/// One part of a multipart body.
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    /// Form field name.
    pub name: String,
    /// Part contents.
    pub data: Bytes,
    /// Optional file name.
    pub file_name: Option<String>,
    /// Optional content type.
    pub content_type: Option<String>,
}

impl Part {
    /// Create a text part.
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: Bytes::from(value.into()),
            file_name: None,
            content_type: None,
        }
    }

    /// Create a binary part.
    pub fn bytes(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
            file_name: None,
            content_type: None,
        }
    }

    /// Set the file name.
    pub fn file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// Set the content type.
    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}
