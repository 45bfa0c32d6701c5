//! # Courier HTTP Client
//!
//! An HTTP client facade whose transport and effect style are both
//! pluggable, with redirect following written once for every effect.
//!
//! ## Features
//!
//! - **Effects**: the same backend stack runs as a blocking call
//!   ([`Blocking`]), a future ([`Async`]) or a deferred task ([`Lazy`])
//! - **Redirects**: 301/302/303/307/308 handling with per-status method and
//!   body rules, a hop limit and an ordered response history
//! - **Decorators**: [`FollowRedirects`] and [`LoggingBackend`] wrap any
//!   [`Backend`] and are backends themselves
//! - **Transports**: `reqwest`-based async and blocking backends that never
//!   follow redirects on their own
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use courier_http_client::{Async, HttpClient, HttpClientConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = HttpClient::<Async>::reqwest(HttpClientConfig::default())?;
//!
//!     let response = client
//!         .get("https://api.example.com/users")
//!         .send()
//!         .await?;
//!
//!     println!("Status: {} after {} redirects", response.status(), response.history().len());
//!     Ok(())
//! }
//! ```
//!
//! ## Custom Backends
//!
//! ```rust
//! use courier_http_client::{
//!     Backend, Blocking, FollowRedirects, HeaderMap, Request, Response, StatusCode, Url,
//!     backend_fn,
//! };
//!
//! let transport = backend_fn(|request: Request| {
//!     let mut headers = HeaderMap::new();
//!     let status = if request.uri().path() == "/old" {
//!         headers.insert("location", "/new".parse().unwrap());
//!         StatusCode::MOVED_PERMANENTLY
//!     } else {
//!         StatusCode::OK
//!     };
//!     Ok(Response::new(status, headers, "", request.uri().clone()))
//! });
//!
//! let backend = FollowRedirects::new(transport);
//! let request = Request::get(Url::parse("http://example.com/old").unwrap());
//! let response = Backend::<Blocking>::send(&backend, request).unwrap();
//!
//! assert_eq!(response.code(), 200);
//! assert_eq!(response.history().len(), 1);
//! ```

mod backend;
mod builder;
mod client;
mod config;
mod cookies;
mod effect;
mod error;
mod logging;
mod redirect;
mod request;
mod response;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use backend::{Backend, Deferred, FnBackend, backend_fn};
pub use builder::RequestBuilder;
pub use client::HttpClient;
pub use config::{ConfigError, ENV_PREFIX, HttpClientConfig, HttpClientConfigBuilder};
pub use cookies::{parse_cookie_header, set_cookie_pairs};
pub use effect::{Async, Blocking, Effect, Lazy, Task};
pub use error::{HttpClientError, Result};
pub use logging::LoggingBackend;
pub use redirect::{
    DEFAULT_MAX_REDIRECTS, FollowRedirects, RedirectConfig, redirect_request, resolve_location,
};
pub use request::{Body, Part, Request, RequestOptions, StreamSource};
pub use response::{REDIRECT_STATUSES, Response, is_redirect_status};

#[cfg(feature = "reqwest")]
pub use transport::{BlockingReqwestBackend, ReqwestBackend};

// Re-export common types
pub use bytes::Bytes;
pub use http::{HeaderMap, HeaderValue, Method, StatusCode, header};
pub use url::Url;

/// Prelude for common imports.
///
/// ```
/// use courier_http_client::prelude::*;
/// ```
pub mod prelude {
    pub use crate::backend::{Backend, Deferred, backend_fn};
    pub use crate::client::HttpClient;
    pub use crate::config::{HttpClientConfig, HttpClientConfigBuilder};
    pub use crate::effect::{Async, Blocking, Effect, Lazy, Task};
    pub use crate::error::{HttpClientError, Result};
    pub use crate::logging::LoggingBackend;
    pub use crate::redirect::{FollowRedirects, RedirectConfig};
    pub use crate::request::{Body, Request};
    pub use crate::response::Response;
    pub use http::{HeaderMap, HeaderValue, Method, StatusCode, header};
}
