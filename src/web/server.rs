//! Web server for fileshare.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::Config;
use crate::file::FileService;
use crate::{FileshareError, Result};

use super::handlers::AppState;
use super::router::create_router;

/// Web server for the API.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Application state.
    app_state: Arc<AppState>,
    /// Request body limit for uploads.
    max_upload_bytes: Option<usize>,
}

impl WebServer {
    /// Create a new web server.
    pub fn new(config: &Config, files: Arc<FileService>) -> Result<Self> {
        let addr = format!("{}:{}", config.server.host, config.server.port)
            .parse::<SocketAddr>()
            .map_err(|e| {
                FileshareError::Config(format!(
                    "invalid server address {}:{}: {e}",
                    config.server.host, config.server.port
                ))
            })?;

        Ok(Self {
            addr,
            app_state: Arc::new(AppState::new(files, &config.server.timezone)),
            max_upload_bytes: config.storage.max_upload_bytes(),
        })
    }

    /// Get the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Run the web server until `shutdown` completes.
    ///
    /// In-flight requests are allowed to finish.
    pub async fn run<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let router = create_router(self.app_state, self.max_upload_bytes);

        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;

        tracing::info!("Web server listening on http://{}", local_addr);

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
    }

    /// Run the server in the background and return the actual bound address.
    ///
    /// This is useful for testing when binding to port 0.
    pub async fn run_with_addr(self) -> std::io::Result<SocketAddr> {
        let router = create_router(self.app_state, self.max_upload_bytes);

        let listener = TcpListener::bind(self.addr).await?;
        let local_addr = listener.local_addr()?;

        tracing::info!("Web server listening on http://{}", local_addr);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}
