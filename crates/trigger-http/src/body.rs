use http_body_util::{BodyExt, Empty, Full};
use hyper::body::Bytes;

use crate::Body;

pub fn full(bytes: Bytes) -> Body {
    Full::new(bytes).map_err(|never| match never {}).boxed()
}

pub fn empty() -> Body {
    Empty::new().map_err(|never| match never {}).boxed()
}
