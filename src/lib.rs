// Courier - An HTTP client facade with pluggable transports and effects
//
// This library lets application code send requests through one API while the
// transport backend and the effect style (blocking, async, lazy) are chosen
// by the caller. Redirect following is a backend decorator written once for
// every effect.

// Re-export the client
pub use courier_http_client::*;

// Re-export optional crates
#[cfg(feature = "testing")]
pub use courier_testing;

// Prelude for common imports
pub mod prelude {
    pub use courier_http_client::prelude::*;
    pub use courier_http_client::{DEFAULT_MAX_REDIRECTS, RequestBuilder, RequestOptions};

    #[cfg(feature = "testing")]
    pub use courier_testing::{StubBackend, StubFailure, StubResponse};
}
