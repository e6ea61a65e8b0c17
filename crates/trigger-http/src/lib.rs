//! HTTP transport for the mock server.

mod body;
mod instrument;
mod response;
mod server;

use std::net::{SocketAddr, ToSocketAddrs};

use anyhow::{Context, Result};
use clap::Args;
use http_body_util::combinators::BoxBody;
use hyper::body::Bytes;

pub use response::ResponseError;
pub use server::HttpServer;

/// Request and response body type used by the server.
pub type Body = BoxBody<Bytes, hyper::Error>;

/// Port used when none is given on the command line.
pub const DEFAULT_PORT: u16 = 8888;

#[derive(Args, Debug)]
pub struct CliArgs {
    /// Port to listen on
    #[clap(value_name = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Host name or IP address to listen on
    #[clap(long, default_value = "0.0.0.0")]
    pub host: String,
}

impl CliArgs {
    /// Resolve the host and port into the address to bind.
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        resolve_listen_addr(&self.host, self.port)
    }
}

fn resolve_listen_addr(host: &str, port: u16) -> Result<SocketAddr> {
    let addrs: Vec<SocketAddr> = (host, port)
        .to_socket_addrs()
        .with_context(|| format!("couldn't resolve address '{host}'"))?
        .collect();
    // Prefer IPv4, e.g. 127.0.0.1 over [::1] for "localhost"
    if let Some(addr) = addrs.iter().find(|addr| addr.is_ipv4()) {
        return Ok(*addr);
    }
    addrs.into_iter().next().context("couldn't resolve address")
}
