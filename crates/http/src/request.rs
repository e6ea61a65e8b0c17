use std::collections::HashMap;

use bytes::Bytes;

/// The request methods the mock server knows how to answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// Decoded query string parameters.
///
/// Empty values are dropped on parse, so `?type=` behaves as if `type` was
/// never sent. A repeated name keeps its last value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryParams(HashMap<String, String>);

impl QueryParams {
    /// Parse a raw (still percent-encoded) query string.
    pub fn parse(query: &str) -> Self {
        let params = url::form_urlencoded::parse(query.as_bytes())
            .into_owned()
            .filter(|(_, value)| !value.is_empty())
            .collect();
        Self(params)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }
}

/// The parts of an inbound request that drive the mock response.
#[derive(Clone, Debug)]
pub struct RequestSpec {
    pub method: Method,
    /// Raw request path, without the query string.
    pub path: String,
    pub query: QueryParams,
    pub body: Bytes,
}

impl RequestSpec {
    /// Build from an already split request target.
    pub fn new(method: Method, path: impl Into<String>, query: Option<&str>, body: Bytes) -> Self {
        Self {
            method,
            path: path.into(),
            query: query.map(QueryParams::parse).unwrap_or_default(),
            body,
        }
    }
}
