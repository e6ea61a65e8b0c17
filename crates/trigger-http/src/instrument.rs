use anyhow::Result;
use http::Response;

use crate::Body;

/// Create a span for an HTTP request.
macro_rules! http_span {
    ($request:tt, $addr:tt) => {
        tracing::info_span!(
            "mock_trigger_http.handle_http_request",
            "http.request.method" = %$request.method(),
            "network.peer.address" = %$addr.ip(),
            "network.peer.port" = %$addr.port(),
            "url.path" = $request.uri().path(),
            "url.query" = $request.uri().query().unwrap_or(""),
            // Recorded later
            "error.type" = ::tracing::field::Empty,
            "http.response.status_code" = ::tracing::field::Empty,
        )
    };
}

pub(crate) use http_span;

/// Finish setting attributes on the HTTP span.
pub(crate) fn finalize_http_span(response: Result<Response<Body>>) -> Result<Response<Body>> {
    let span = tracing::Span::current();
    match response {
        Ok(response) => {
            tracing::debug!(
                "Request finished, sending response with status code {}",
                response.status()
            );
            span.record("http.response.status_code", response.status().as_u16());
            Ok(response)
        }
        Err(err) => {
            instrument_error(&err);
            Err(err)
        }
    }
}

/// Marks the current span as errored.
pub(crate) fn instrument_error(err: &anyhow::Error) {
    let span = tracing::Span::current();
    tracing::warn!(error = %err, "Error handling request");
    span.record("error.type", format!("{err:?}"));
}
