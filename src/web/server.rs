//! HTTP server task with bounded graceful shutdown.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::state::AppState;
use crate::utils::fmt_duration;
use crate::web::create_router;

/// A running HTTP server.
pub struct WebServer {
    local_addr: SocketAddr,
    shutdown: CancellationToken,
    handle: JoinHandle<std::io::Result<()>>,
}

impl WebServer {
    /// Bind `addr` and start serving in a background task.
    pub async fn start(addr: SocketAddr, state: AppState) -> std::io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();

        let router = create_router(state);
        let token = shutdown.clone();
        let handle = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async move { token.cancelled().await })
                .await
        });

        info!(address = %local_addr, "web server listening");
        Ok(Self {
            local_addr,
            shutdown,
            handle,
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Wait for the server task to end on its own (it only does so on error).
    pub async fn wait(&mut self) -> Result<(), anyhow::Error> {
        match (&mut self.handle).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(anyhow::Error::new(e).context("web server failed")),
            Err(e) => Err(anyhow::Error::new(e).context("web server task panicked")),
        }
    }

    /// Stop accepting connections and let in-flight requests drain for at
    /// most `timeout`. Returns `false` if the server had to be aborted.
    pub async fn shutdown(self, timeout: Duration) -> bool {
        self.shutdown.cancel();

        let abort = self.handle.abort_handle();
        match tokio::time::timeout(timeout, self.handle).await {
            Ok(Ok(Ok(()))) => {
                info!("web server drained");
                true
            }
            Ok(Ok(Err(e))) => {
                error!(error = %e, "web server exited with an error during shutdown");
                true
            }
            Ok(Err(e)) => {
                error!(error = %e, "web server task failed during shutdown");
                true
            }
            Err(_) => {
                warn!(
                    timeout = fmt_duration(timeout),
                    "in-flight requests did not drain in time, aborting"
                );
                abort.abort();
                false
            }
        }
    }
}
