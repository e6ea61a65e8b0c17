use http::{header::HeaderValue, Response, StatusCode};
use hyper::body::Bytes;
use mock_http::{MockResponse, MOCK_SERVER_HEADER};

use crate::{body, Body};

/// A synthesized response that can't be put on the wire as requested.
#[derive(Debug, thiserror::Error)]
pub enum ResponseError {
    #[error("status code {0} cannot be sent over HTTP")]
    UnsupportedStatus(i64),
    #[error("'{value}' is not a valid value for the {name} header")]
    InvalidHeaderValue { name: &'static str, value: String },
    #[error(transparent)]
    Http(#[from] http::Error),
}

/// Encode a [`MockResponse`] as a hyper response.
///
/// Informational statuses can't be a final response and are rejected. 204 and
/// 304 never carry a body, so theirs is dropped; 204 also goes without
/// `Content-Length`.
pub(crate) fn encode(mut mock: MockResponse) -> Result<Response<Body>, ResponseError> {
    let status = u16::try_from(mock.status)
        .ok()
        .and_then(|code| StatusCode::from_u16(code).ok())
        .filter(|status| !status.is_informational())
        .ok_or(ResponseError::UnsupportedStatus(mock.status))?;

    if status == StatusCode::NO_CONTENT || status == StatusCode::NOT_MODIFIED {
        mock.body.clear();
    }

    let mut builder = Response::builder().status(status);
    for (name, value) in mock.headers() {
        if status == StatusCode::NO_CONTENT && name == http::header::CONTENT_LENGTH {
            continue;
        }
        let value = HeaderValue::from_str(&value)
            .map_err(|_| ResponseError::InvalidHeaderValue { name, value })?;
        builder = builder.header(name, value);
    }
    Ok(builder.body(body::full(Bytes::from(mock.body)))?)
}

/// A bare response carrying only the marker header.
pub(crate) fn marked(status: StatusCode, content: Option<String>) -> anyhow::Result<Response<Body>> {
    let mut builder = Response::builder()
        .status(status)
        .header(MOCK_SERVER_HEADER.0, MOCK_SERVER_HEADER.1);
    let body = match content {
        Some(content) => {
            builder = builder
                .header(http::header::CONTENT_TYPE, "text/plain")
                .header(http::header::CONTENT_LENGTH, content.len());
            body::full(Bytes::from(content))
        }
        None => body::empty(),
    };
    Ok(builder.body(body)?)
}
