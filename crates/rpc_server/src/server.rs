//! RpcServer - TCP accept loop

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info, instrument, warn};

use vehicle_api::ApiProvider;

use crate::config::ServerConfig;
use crate::connection::handle_connection;
use crate::error::Result;
use crate::metrics::{ServerMetrics, ServerMetricsSnapshot};
use crate::router::RequestRouter;

/// Bound TCP server, not yet accepting
pub struct RpcServer {
    listener: TcpListener,
    router: RequestRouter,
    config: ServerConfig,
    metrics: Arc<ServerMetrics>,
}

impl RpcServer {
    /// Bind the listener. Nothing is accepted until `run` / `spawn`.
    #[instrument(
        name = "rpc_server_bind",
        skip(config, provider),
        fields(addr = %config.bind_address)
    )]
    pub async fn bind(config: ServerConfig, provider: Arc<ApiProvider>) -> Result<Self> {
        let listener = TcpListener::bind(&config.bind_address).await?;
        info!(addr = %listener.local_addr()?, vehicles = provider.len(), "RPC server bound");

        Ok(Self {
            listener,
            router: RequestRouter::new(provider),
            config,
            metrics: Arc::new(ServerMetrics::new()),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn metrics(&self) -> &Arc<ServerMetrics> {
        &self.metrics
    }

    /// Accept until `shutdown` flips (or its sender is dropped), then wait
    /// for the open connections to close.
    #[instrument(name = "rpc_server_run", skip_all)]
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let mut connections = JoinSet::new();

        loop {
            tokio::select! {
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        if let Err(e) = stream.set_nodelay(true) {
                            debug!(peer = %peer, error = %e, "set_nodelay failed");
                        }
                        let active = self.metrics.connection_opened();
                        observability::record_active_connections(active);

                        let router = self.router.clone();
                        let metrics = Arc::clone(&self.metrics);
                        let limit = self.config.max_request_bytes;
                        let conn_shutdown = shutdown.clone();
                        connections.spawn(async move {
                            handle_connection(
                                stream,
                                peer,
                                router,
                                limit,
                                Arc::clone(&metrics),
                                conn_shutdown,
                            )
                            .await;
                            observability::record_active_connections(metrics.connection_closed());
                        });
                    }
                    Err(e) => {
                        // Transient (e.g. fd exhaustion); keep accepting
                        warn!(error = %e, "accept failed");
                    }
                },
                _ = shutdown.changed() => break,
            }

            while let Some(finished) = connections.try_join_next() {
                if let Err(e) = finished {
                    error!(error = ?e, "connection task panicked");
                }
            }
        }

        info!(open = connections.len(), "RPC server stopping");
        while let Some(finished) = connections.join_next().await {
            if let Err(e) = finished {
                error!(error = ?e, "connection task panicked");
            }
        }

        let snapshot = self.metrics.snapshot();
        info!(
            connections = snapshot.total_connections,
            ok = snapshot.ok_count,
            errors = snapshot.error_count,
            "RPC server stopped"
        );
    }

    /// Spawn the accept loop as a background task
    pub fn spawn(self) -> Result<ServerHandle> {
        let local_addr = self.local_addr()?;
        let metrics = Arc::clone(&self.metrics);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let join = tokio::spawn(self.run(shutdown_rx));

        Ok(ServerHandle {
            local_addr,
            metrics,
            shutdown_tx,
            join,
        })
    }
}

/// Handle to a running server
pub struct ServerHandle {
    local_addr: SocketAddr,
    metrics: Arc<ServerMetrics>,
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl ServerHandle {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn metrics(&self) -> ServerMetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Stop accepting, close every connection and wait for the loop to end.
    #[instrument(name = "rpc_server_shutdown", skip(self), fields(addr = %self.local_addr))]
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.join.await {
            error!(error = ?e, "server task panicked");
        }
        debug!("server handle shutdown complete");
    }
}
