//! Request-to-response mapping for the mock HTTP server.
//!
//! Everything here is pure: a [`RequestSpec`] goes in, a [`ResponsePlan`] is
//! derived from it, and the plan synthesizes a [`MockResponse`]. Sleeping for
//! the requested delay and writing bytes to a socket are left to the caller.

mod plan;
mod request;
mod response;

pub use plan::{BodyPlan, ResponsePlan};
pub use request::{Method, QueryParams, RequestSpec};
pub use response::MockResponse;

/// Content type used when the client does not ask for one, and always for POST.
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Marker header attached to every response the mock server produces.
pub const MOCK_SERVER_HEADER: (&str, &str) = ("X-Mock-Server", "true");
