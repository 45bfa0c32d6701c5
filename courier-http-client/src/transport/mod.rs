//! Concrete transport backends.
//!
//! Transports send exactly one request and never follow redirects; wrap them
//! in [`FollowRedirects`](crate::FollowRedirects) for that.

#[cfg(feature = "reqwest")]
mod reqwest_backend;

#[cfg(feature = "reqwest")]
pub use reqwest_backend::{BlockingReqwestBackend, ReqwestBackend};
