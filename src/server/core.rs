use axum::Router;
use log::{error, info};
use std::path::PathBuf;
use tokio::net::TcpListener;

use crate::api::{self, AppState};
use crate::error::ServerError;
use crate::server::config::ServerConfig;
use crate::utils::network::log_reachable_addresses;

pub struct Server {
    listener: TcpListener,
    router: Router,
    root: PathBuf,
}

impl Server {
    /// Resolves the root and binds the listener. Nothing is served until
    /// [`Server::start`].
    pub async fn new(config: ServerConfig) -> Result<Self, ServerError> {
        let root = config.resolve_root()?;
        let address = config.socket_address();

        let listener = TcpListener::bind(&address)
            .await
            .map_err(|source| ServerError::Bind {
                address: address.clone(),
                source,
            })?;
        info!("Server bound to {}", address);

        let router = api::router(AppState::new(root.clone()), config.upload_limit_bytes());

        Ok(Self {
            listener,
            router,
            root,
        })
    }

    /// Serves requests until Ctrl-C.
    pub async fn start(self) -> Result<(), ServerError> {
        let port = self.listener.local_addr()?.port();
        info!("Serving directory {} on port {}", self.root.display(), port);
        log_reachable_addresses(port);

        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown requested"),
        Err(e) => {
            error!("Failed to listen for shutdown signal: {}", e);
            std::future::pending::<()>().await;
        }
    }
}
