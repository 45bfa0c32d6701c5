//! Testing utilities for Courier HTTP clients.
//!
//! ## Features
//!
//! - **StubBackend** - Canned-route transport usable with every effect type
//! - **Request recording** - Inspect what each hop actually sent
//! - **Scripted failures** - Connection, timeout and transport errors
//! - **Assertions** - Status, header, body and redirect history checks
//!
//! ## Quick Start
//!
//! ```
//! use courier_testing::*;
//! use courier_http_client::{Blocking, HttpClient, HttpClientConfig};
//!
//! let stub = StubBackend::new()
//!     .with_redirect("/old", 301, "/new")
//!     .with_route("/new", StubResponse::ok("moved"));
//!
//! let config = HttpClientConfig::builder()
//!     .base_url("http://stub.local")
//!     .build();
//! let client = HttpClient::<Blocking>::new(stub.clone(), config);
//!
//! let response = client.get("/old").send().unwrap();
//! assert_status(&response, 200);
//! assert_history(&response, &[301]);
//! assert_eq!(stub.call_count(), 2);
//! ```

mod assertions;
mod run;
mod stub;

pub use assertions::{
    assert_body_contains, assert_final_path, assert_header, assert_history, assert_json,
    assert_status,
};
pub use run::RunBlocking;
pub use stub::{StubBackend, StubFailure, StubResponse};
