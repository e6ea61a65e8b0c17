use std::time::Duration;

use crate::{
    request::{Method, QueryParams, RequestSpec},
    DEFAULT_CONTENT_TYPE,
};

const STATUS_PREFIX: &str = "/status/";

const DEFAULT_GET_STATUS: i64 = 200;
const DEFAULT_POST_STATUS: i64 = 201;
const DEFAULT_DELAY_SECONDS: f64 = 0.0;
const DEFAULT_SIZE: i64 = 100;

/// The resolved parameters of a mock response.
///
/// Derived from a [`RequestSpec`] alone. Malformed input never fails; each
/// parameter falls back to its default instead.
#[derive(Clone, Debug, PartialEq)]
pub struct ResponsePlan {
    /// Status to reply with. Not range checked.
    pub status: i64,
    /// Seconds to wait before replying. Zero or negative means no wait.
    pub delay_seconds: f64,
    pub body: BodyPlan,
}

/// How the response body gets built.
#[derive(Clone, Debug, PartialEq)]
pub enum BodyPlan {
    /// GET: a body of exactly `size` bytes.
    Sized {
        path: String,
        /// Negative requested sizes are clamped to 0.
        size: usize,
        content_type: String,
    },
    /// POST: a JSON summary of what was received.
    Received { received: usize },
}

impl ResponsePlan {
    pub fn from_request(req: &RequestSpec) -> Self {
        match req.method {
            Method::Get => Self::for_get(&req.path, &req.query),
            Method::Post => Self::for_post(&req.query, req.body.len()),
        }
    }

    fn for_get(path: &str, query: &QueryParams) -> Self {
        let status = status_from_path(path).unwrap_or(DEFAULT_GET_STATUS);
        let size = query
            .get("size")
            .and_then(parse_int)
            .unwrap_or(DEFAULT_SIZE);
        let content_type = query.get("type").unwrap_or(DEFAULT_CONTENT_TYPE);
        Self {
            status,
            delay_seconds: delay_from_query(query),
            body: BodyPlan::Sized {
                path: path.to_owned(),
                // Negative sizes mean an empty body.
                size: usize::try_from(size.max(0)).unwrap_or(usize::MAX),
                content_type: content_type.to_owned(),
            },
        }
    }

    fn for_post(query: &QueryParams, received: usize) -> Self {
        let status = query
            .get("status")
            .and_then(parse_int)
            .unwrap_or(DEFAULT_POST_STATUS);
        Self {
            status,
            delay_seconds: delay_from_query(query),
            body: BodyPlan::Received { received },
        }
    }

    /// The time to wait before responding, if any.
    pub fn delay(&self) -> Option<Duration> {
        if self.delay_seconds > 0.0 {
            Some(Duration::try_from_secs_f64(self.delay_seconds).unwrap_or(Duration::MAX))
        } else {
            None
        }
    }

    pub fn content_type(&self) -> &str {
        match &self.body {
            BodyPlan::Sized { content_type, .. } => content_type,
            BodyPlan::Received { .. } => DEFAULT_CONTENT_TYPE,
        }
    }
}

/// The segment after `/status/`, up to the next `/`, as a status code.
fn status_from_path(path: &str) -> Option<i64> {
    let rest = path.strip_prefix(STATUS_PREFIX)?;
    let segment = rest.split('/').next().unwrap_or_default();
    parse_int(segment)
}

fn delay_from_query(query: &QueryParams) -> f64 {
    query
        .get("delay")
        .and_then(|raw| raw.trim().parse::<f64>().ok())
        .filter(|delay| delay.is_finite())
        .unwrap_or(DEFAULT_DELAY_SECONDS)
}

fn parse_int(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    fn get(target: &str) -> ResponsePlan {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (target, None),
        };
        ResponsePlan::from_request(&RequestSpec::new(Method::Get, path, query, Bytes::new()))
    }

    fn post(query: Option<&str>, body: &'static [u8]) -> ResponsePlan {
        ResponsePlan::from_request(&RequestSpec::new(
            Method::Post,
            "/submit",
            query,
            Bytes::from_static(body),
        ))
    }

    #[test]
    fn get_defaults() {
        let plan = get("/anything");
        assert_eq!(plan.status, 200);
        assert_eq!(plan.delay_seconds, 0.0);
        assert_eq!(plan.delay(), None);
        assert_eq!(
            plan.body,
            BodyPlan::Sized {
                path: "/anything".into(),
                size: 100,
                content_type: "application/json".into(),
            }
        );
    }

    #[test]
    fn status_is_read_from_path() {
        assert_eq!(get("/status/404").status, 404);
        assert_eq!(get("/status/503/extra/segments").status, 503);
        assert_eq!(get("/status/999").status, 999);
        assert_eq!(get("/status/1234").status, 1234);
    }

    #[test]
    fn bad_status_segment_falls_back() {
        assert_eq!(get("/status/notanumber").status, 200);
        assert_eq!(get("/status/").status, 200);
        assert_eq!(get("/status//404").status, 200);
        assert_eq!(get("/statuses/404").status, 200);
        assert_eq!(get("/api/status/404").status, 200);
    }

    #[test]
    fn query_parameters_are_applied() {
        let plan = get("/status/201?delay=1.5&size=42&type=text/plain");
        assert_eq!(plan.status, 201);
        assert_eq!(plan.delay(), Some(Duration::from_millis(1500)));
        assert_eq!(plan.content_type(), "text/plain");
        assert!(matches!(plan.body, BodyPlan::Sized { size: 42, .. }));
    }

    #[test]
    fn malformed_numbers_fall_back() {
        let plan = get("/status/notanumber?size=abc&delay=xyz");
        assert_eq!(plan.status, 200);
        assert_eq!(plan.delay(), None);
        assert!(matches!(plan.body, BodyPlan::Sized { size: 100, .. }));
        assert_eq!(plan.content_type(), "application/json");
    }

    #[test]
    fn non_finite_delay_falls_back() {
        assert_eq!(get("/?delay=inf").delay_seconds, 0.0);
        assert_eq!(get("/?delay=NaN").delay_seconds, 0.0);
    }

    #[test]
    fn non_positive_delay_means_no_wait() {
        assert_eq!(get("/?delay=0").delay(), None);
        let plan = get("/?delay=-3");
        assert_eq!(plan.delay_seconds, -3.0);
        assert_eq!(plan.delay(), None);
    }

    #[test]
    fn huge_delay_saturates() {
        assert_eq!(get("/?delay=1e300").delay(), Some(Duration::MAX));
    }

    #[test]
    fn negative_size_is_empty() {
        assert!(matches!(get("/?size=-5").body, BodyPlan::Sized { size: 0, .. }));
    }

    #[test]
    fn content_type_is_verbatim() {
        let plan = get("/?type=application/x-made-up%3B%20v%3D1");
        assert_eq!(plan.content_type(), "application/x-made-up; v=1");
    }

    #[test]
    fn post_defaults() {
        let plan = post(None, b"hello");
        assert_eq!(plan.status, 201);
        assert_eq!(plan.delay(), None);
        assert_eq!(plan.body, BodyPlan::Received { received: 5 });
        assert_eq!(plan.content_type(), "application/json");
    }

    #[test]
    fn post_status_and_delay_from_query() {
        let plan = post(Some("status=400&delay=0.25"), b"");
        assert_eq!(plan.status, 400);
        assert_eq!(plan.delay(), Some(Duration::from_millis(250)));
        assert_eq!(plan.body, BodyPlan::Received { received: 0 });
    }

    #[test]
    fn post_ignores_get_only_parameters() {
        let plan = post(Some("status=oops&type=text/plain&size=3"), b"{}");
        assert_eq!(plan.status, 201);
        assert_eq!(plan.content_type(), "application/json");
        assert_eq!(plan.body, BodyPlan::Received { received: 2 });
    }
}
