use std::net::SocketAddr;

use anyhow::Context;
use http::{Request, Response, StatusCode};
use http_body_util::BodyExt;
use hyper::{
    body::{Bytes, Incoming},
    server::conn::http1,
    service::service_fn,
};
use hyper_util::rt::TokioIo;
use mock_http::{Method, RequestSpec, ResponsePlan};
use tokio::{
    io::{AsyncRead, AsyncWrite},
    net::TcpListener,
    task,
};
use tracing::Instrument;

use crate::{
    instrument::{finalize_http_span, http_span, instrument_error},
    response::{encode, marked},
    Body,
};

/// An HTTP server which answers every request with a mock response.
pub struct HttpServer {
    listener: TcpListener,
}

impl HttpServer {
    /// Bind the listening socket.
    pub async fn bind(listen_addr: SocketAddr) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(listen_addr)
            .await
            .with_context(|| format!("Unable to listen on {listen_addr}"))?;
        Ok(Self { listener })
    }

    /// The address the server is actually listening on.
    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve incoming connections until the returned future is dropped.
    ///
    /// Each connection gets its own task, so a delayed response never holds
    /// up the accept loop.
    pub async fn serve(self) -> anyhow::Result<()> {
        tracing::info!("Serving http://{}", self.local_addr()?);
        loop {
            match self.listener.accept().await {
                Ok((stream, client_addr)) => Self::serve_connection(stream, client_addr),
                Err(err) => tracing::warn!("Failed to accept connection: {err:?}"),
            }
        }
    }

    /// Produces the mock response for a request.
    ///
    /// GET and POST requests are mapped through [`ResponsePlan`], waiting out
    /// any requested delay first. Other methods get a 501.
    pub async fn handle(req: Request<Body>) -> anyhow::Result<Response<Body>> {
        let method = if *req.method() == http::Method::GET {
            Method::Get
        } else if *req.method() == http::Method::POST {
            Method::Post
        } else {
            return Self::not_implemented(req.method());
        };

        let (parts, body) = req.into_parts();
        let body = match method {
            Method::Post => body
                .collect()
                .await
                .context("Failed to read request body")?
                .to_bytes(),
            Method::Get => Bytes::new(),
        };

        let spec = RequestSpec::new(method, parts.uri.path(), parts.uri.query(), body);
        let plan = ResponsePlan::from_request(&spec);
        tracing::debug!(
            status = plan.status,
            delay = plan.delay_seconds,
            content_type = plan.content_type(),
            "Resolved response plan"
        );

        if let Some(delay) = plan.delay() {
            tokio::time::sleep(delay).await;
        }

        let res = plan
            .synthesize()
            .and_then(|mock| encode(mock).map_err(anyhow::Error::from));
        match res {
            Ok(res) => Ok(res),
            Err(err) => {
                instrument_error(&err);
                Self::internal_error()
            }
        }
    }

    /// Creates an HTTP 500 response.
    fn internal_error() -> anyhow::Result<Response<Body>> {
        marked(StatusCode::INTERNAL_SERVER_ERROR, None)
    }

    /// Creates an HTTP 501 response.
    fn not_implemented(method: &http::Method) -> anyhow::Result<Response<Body>> {
        marked(
            StatusCode::NOT_IMPLEMENTED,
            Some(format!("Unsupported method ('{method}')")),
        )
    }

    fn serve_connection<S: AsyncRead + AsyncWrite + Unpin + Send + 'static>(
        stream: S,
        client_addr: SocketAddr,
    ) {
        task::spawn(async move {
            if let Err(err) = http1::Builder::new()
                .keep_alive(true)
                .serve_connection(
                    TokioIo::new(stream),
                    service_fn(move |request| Self::instrumented_service_fn(client_addr, request)),
                )
                .await
            {
                tracing::warn!("Error serving HTTP connection: {err:?}");
            }
        });
    }

    async fn instrumented_service_fn(
        client_addr: SocketAddr,
        request: Request<Incoming>,
    ) -> anyhow::Result<Response<Body>> {
        let span = http_span!(request, client_addr);
        async {
            let result = Self::handle(request.map(|body: Incoming| body.boxed())).await;
            finalize_http_span(result)
        }
        .instrument(span)
        .await
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::body;

    async fn send(method: &str, uri: &str, content: &'static [u8]) -> (Response<Body>, Vec<u8>) {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .body(body::full(Bytes::from_static(content)))
            .unwrap();
        let (parts, body) = HttpServer::handle(req).await.unwrap().into_parts();
        let bytes = body.collect().await.unwrap().to_bytes().to_vec();
        (Response::from_parts(parts, body::empty()), bytes)
    }

    #[tokio::test]
    async fn get_status_from_path() {
        let (res, body) = send("GET", "/status/404", b"").await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(body.len(), 100);
        assert!(body.starts_with(br#"{"status":404,"#));
        assert_eq!(res.headers()["content-length"], "100");
        assert_eq!(res.headers()["x-mock-server"], "true");
    }

    #[tokio::test]
    async fn get_with_custom_type() {
        let (res, body) = send("GET", "/data?size=12&type=text/html", b"").await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()["content-type"], "text/html");
        assert_eq!(body, b"xxxxxxxxxxxx");
    }

    #[tokio::test]
    async fn post_counts_received_bytes() {
        let (res, body) = send("POST", "/upload?status=202", b"abcdef").await;
        assert_eq!(res.status(), StatusCode::ACCEPTED);
        assert_eq!(res.headers()["content-type"], "application/json");
        assert_eq!(body, br#"{"status":202,"received":6,"message":"POST received"}"#);
    }

    #[tokio::test]
    async fn other_methods_are_not_implemented() {
        for method in ["PUT", "DELETE", "HEAD", "PATCH"] {
            let (res, _) = send(method, "/status/200", b"").await;
            assert_eq!(res.status(), StatusCode::NOT_IMPLEMENTED, "{method}");
            assert_eq!(res.headers()["x-mock-server"], "true");
        }
    }

    #[tokio::test]
    async fn unencodable_status_is_an_internal_error() {
        for uri in ["/status/1000", "/status/100", "/status/101"] {
            let (res, body) = send("GET", uri, b"").await;
            assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR, "{uri}");
            assert_eq!(res.headers()["x-mock-server"], "true");
            assert!(body.is_empty());
        }
    }

    #[tokio::test]
    async fn unallocatable_size_is_an_internal_error() {
        let (res, body) = send("GET", "/?size=9000000000000000000&type=text/plain", b"").await;
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(res.headers()["x-mock-server"], "true");
        assert!(body.is_empty());

        let (res, body) = send("GET", "/status/200", b"").await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body.len(), 100);
    }

    #[tokio::test]
    async fn delay_is_applied_before_responding() {
        let start = Instant::now();
        let (res, _) = send("GET", "/?delay=0.2", b"").await;
        assert_eq!(res.status(), StatusCode::OK);
        assert!(start.elapsed() >= Duration::from_millis(200));
    }
}
