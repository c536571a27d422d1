use axum::Router;
use log::{error, info, warn};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::protocol::router;
use crate::service::FileService;
use crate::storage::{ByteStore, DiskStore};

pub struct Server {
    listener: TcpListener,
    router: Router,
}

impl Server {
    /// Creates both storage roots and binds the listener described by `config`.
    pub async fn new(config: ServerConfig) -> io::Result<Self> {
        let uploads = DiskStore::new(config.upload_root_path());
        let metadata = DiskStore::new(config.metadata_root_path());

        for store in [&uploads, &metadata] {
            if let Err(e) = store.ensure_root().await {
                error!(
                    "Failed to create storage root {}: {}",
                    store.root().display(),
                    e
                );
                return Err(io::Error::other(e));
            }
        }
        info!(
            "Upload root: {}, metadata root: {}",
            uploads.root().display(),
            metadata.root().display()
        );

        let service = Arc::new(FileService::new(uploads, metadata));
        Self::bind(&config.listen_address(), service).await
    }

    /// Binds `addr` and serves `service`, whatever backend it stores into.
    pub async fn bind<B: ByteStore>(addr: &str, service: Arc<FileService<B>>) -> io::Result<Self> {
        let listener = match TcpListener::bind(addr).await {
            Ok(listener) => {
                info!("Server bound to {}", addr);
                listener
            }
            Err(e) => {
                error!("Failed to bind to {}: {}", addr, e);
                return Err(e);
            }
        };

        Ok(Self {
            listener,
            router: router(service),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serves requests until Ctrl-C. Each connection is handled on its own
    /// task; a failing request never stops the server.
    pub async fn start(self) -> io::Result<()> {
        let addr = self.local_addr()?;
        info!("Starting file server on {}", addr);

        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("File server on {} stopped", addr);
        Ok(())
    }
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => {
            warn!("Failed to listen for shutdown signal: {}", e);
            // keep serving; never resolve
            std::future::pending::<()>().await;
        }
    }
}
