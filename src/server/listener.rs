//! Server listener
//!
//! Handles the TCP accept loop and serves each connection over HTTP/1.1 with
//! upgrades enabled.

use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;

use crate::error::Result;
use crate::record::{FakeGenerator, RecordGenerator};
use crate::server::config::ServerConfig;
use crate::server::routes::{self, ServerState};
use crate::sync::{Hub, HubHandle};

/// Employee sync server
pub struct EmployeeServer<G> {
    config: Arc<ServerConfig>,
    hub: Hub<G>,
    handle: HubHandle,
    connection_semaphore: Option<Arc<Semaphore>>,
}

impl EmployeeServer<FakeGenerator> {
    /// Create a server that generates random employees
    pub fn new(config: ServerConfig) -> Self {
        Self::with_generator(config, FakeGenerator::new())
    }
}

impl<G: RecordGenerator + 'static> EmployeeServer<G> {
    /// Create a server with a custom record generator
    pub fn with_generator(config: ServerConfig, generator: G) -> Self {
        let (hub, handle) = Hub::new(&config.sync, generator);

        let connection_semaphore = if config.max_connections > 0 {
            Some(Arc::new(Semaphore::new(config.max_connections)))
        } else {
            None
        };

        Self {
            config: Arc::new(config),
            hub,
            handle,
            connection_semaphore,
        }
    }

    /// Handle for talking to the hub directly
    pub fn hub(&self) -> &HubHandle {
        &self.handle
    }

    /// Get the configured bind address
    pub fn bind_addr(&self) -> SocketAddr {
        self.config.bind_addr
    }

    /// Run the server
    ///
    /// This method blocks until the accept loop fails.
    pub async fn run(self) -> Result<()> {
        self.run_until(std::future::pending()).await
    }

    /// Run the server with graceful shutdown
    pub async fn run_until<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let listener = TcpListener::bind(self.config.bind_addr).await?;
        self.serve(listener, shutdown).await
    }

    /// Serve on an already bound listener
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let EmployeeServer {
            config,
            hub,
            handle,
            connection_semaphore,
        } = self;

        let hub_task = hub.spawn();
        let acceptor = Acceptor {
            state: Arc::new(ServerState {
                config: Arc::clone(&config),
                hub: handle,
                session_limit: connection_semaphore,
            }),
        };

        tracing::info!(
            addr = %listener.local_addr()?,
            ws_path = %config.ws_path,
            environment = %config.environment,
            "Server listening"
        );

        let result = tokio::select! {
            _ = shutdown => {
                tracing::info!("Shutdown signal received");
                Ok(())
            }
            result = acceptor.accept_loop(&listener) => result,
        };

        // Stop the hub; open connections see it closed and wind down
        hub_task.abort();

        result
    }
}

struct Acceptor {
    state: Arc<ServerState>,
}

impl Acceptor {
    async fn accept_loop(&self, listener: &TcpListener) -> Result<()> {
        loop {
            match listener.accept().await {
                Ok((socket, peer_addr)) => {
                    self.handle_connection(socket, peer_addr);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to accept connection");
                }
            }
        }
    }

    fn handle_connection(&self, socket: TcpStream, peer_addr: SocketAddr) {
        if self.state.config.tcp_nodelay {
            if let Err(e) = socket.set_nodelay(true) {
                tracing::error!(error = %e, "Failed to configure socket");
                return;
            }
        }

        tracing::debug!(peer = %peer_addr, "New connection");

        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            let service = service_fn(move |req| {
                let state = Arc::clone(&state);
                async move { Ok::<_, Infallible>(routes::route(req, peer_addr, state).await) }
            });

            if let Err(e) = http1::Builder::new()
                .serve_connection(TokioIo::new(socket), service)
                .with_upgrades()
                .await
            {
                tracing::debug!(peer = %peer_addr, error = %e, "HTTP connection error");
            }

            tracing::debug!(peer = %peer_addr, "Connection closed");
        });
    }
}
