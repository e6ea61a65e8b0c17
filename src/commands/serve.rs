use anyhow::Result;
use clap::Parser;
use mock_trigger_http::{CliArgs, HttpServer};

/// Serve mock HTTP responses shaped by the request path and query string.
///
/// GET `/status/<N>?delay=<secs>&size=<bytes>&type=<mime>` and
/// POST `?status=<N>&delay=<secs>` control the status code, delay, body size
/// and content type of the reply.
#[derive(Parser, Debug)]
#[clap(name = "mock-http-server", version)]
pub struct ServeCommand {
    #[clap(flatten)]
    pub args: CliArgs,
}

impl ServeCommand {
    pub async fn run(self) -> Result<()> {
        let listen_addr = self.args.listen_addr()?;
        let server = HttpServer::bind(listen_addr).await?;

        let port = server.local_addr()?.port();
        eprintln!("Mock HTTP server running on port {port}");
        eprintln!("Ready to accept requests");

        let (abortable, abort_handle) = futures::future::abortable(server.serve());
        ctrlc::set_handler(move || abort_handle.abort())?;
        match abortable.await {
            Ok(Ok(())) => {
                tracing::info!("Server shut down: exiting");
                Ok(())
            }
            Ok(Err(err)) => {
                tracing::error!("Server failed");
                Err(err)
            }
            Err(_aborted) => {
                eprintln!("\nShutting down server");
                tracing::info!("User requested shutdown: exiting");
                Ok(())
            }
        }
    }
}
