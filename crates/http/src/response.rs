use std::iter;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::{
    plan::{BodyPlan, ResponsePlan},
    DEFAULT_CONTENT_TYPE, MOCK_SERVER_HEADER,
};

/// Size above which the GET record gets a `data` filler.
const FILLER_THRESHOLD: usize = 100;
const FILLER_BYTE: u8 = b'x';
const PADDING_BYTE: u8 = b' ';

/// A fully synthesized response, ready to be written out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MockResponse {
    /// Requested status, unchecked. The transport decides what it can encode.
    pub status: i64,
    pub content_type: String,
    pub body: Vec<u8>,
}

impl MockResponse {
    /// The headers that go with this response, in emission order.
    pub fn headers(&self) -> [(&'static str, String); 3] {
        [
            ("Content-Type", self.content_type.clone()),
            ("Content-Length", self.body.len().to_string()),
            (MOCK_SERVER_HEADER.0, MOCK_SERVER_HEADER.1.to_owned()),
        ]
    }
}

#[derive(Serialize)]
struct SizedRecord<'a> {
    status: i64,
    path: &'a str,
    delay: f64,
    size: usize,
    message: &'static str,
    /// Always serialized empty; the filler is spliced in afterwards.
    data: &'static str,
}

#[derive(Serialize)]
struct ReceivedRecord {
    status: i64,
    received: usize,
    message: &'static str,
}

impl ResponsePlan {
    /// Build the response this plan describes.
    ///
    /// For GET the body is exactly `size` bytes long. A JSON body is padded
    /// with spaces or cut short to get there, so small sizes yield truncated,
    /// unparseable JSON and large ones carry trailing spaces.
    pub fn synthesize(&self) -> Result<MockResponse> {
        let body = match &self.body {
            BodyPlan::Sized {
                path,
                size,
                content_type,
            } if content_type == DEFAULT_CONTENT_TYPE => {
                let mut record = serde_json::to_vec(&SizedRecord {
                    status: self.status,
                    path,
                    delay: self.delay_seconds,
                    size: *size,
                    message: "Mock response",
                    data: "",
                })?;
                // Split `..."data":""}` inside the empty string, leaving `"}`
                // as the tail so the filler lands between the quotes.
                let tail = record.split_off(record.len() - 2);
                let filler_len = size.saturating_sub(FILLER_THRESHOLD);

                let mut body = body_buffer(*size)?;
                body.extend(
                    record
                        .into_iter()
                        .chain(iter::repeat(FILLER_BYTE).take(filler_len))
                        .chain(tail)
                        .take(*size),
                );
                body.resize(*size, PADDING_BYTE);
                body
            }
            BodyPlan::Sized { size, .. } => {
                let mut body = body_buffer(*size)?;
                body.resize(*size, FILLER_BYTE);
                body
            }
            BodyPlan::Received { received } => serde_json::to_vec(&ReceivedRecord {
                status: self.status,
                received: *received,
                message: "POST received",
            })?,
        };
        Ok(MockResponse {
            status: self.status,
            content_type: self.content_type().to_owned(),
            body,
        })
    }
}

/// An empty buffer able to hold `size` bytes, or an error if that much
/// memory can't be had.
fn body_buffer(size: usize) -> Result<Vec<u8>> {
    let mut body = Vec::new();
    body.try_reserve_exact(size)
        .with_context(|| format!("cannot allocate a {size} byte response body"))?;
    Ok(body)
}
