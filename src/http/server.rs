//! HTTP server runtime.
//!
//! # Responsibilities
//! - Serve the assembled router on the bound listener
//! - Expose a [`ServerHandle`] services use to observe the listener
//! - Drain in-flight requests on shutdown, bounded by a timeout
//!
//! # Design Decisions
//! - Shutdown stops accepting immediately
//! - In-flight requests get the drain window, then the server returns anyway

use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::lifecycle::shutdown::{Shutdown, ShutdownSignal};

/// Default time in-flight requests get to finish after shutdown.
pub const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Handle to the shared listener, handed to every service.
#[derive(Debug, Clone, Default)]
pub struct ServerHandle {
    shutdown: Shutdown,
    local_addr: Arc<OnceLock<SocketAddr>>,
}

impl ServerHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Address the listener is bound to, once bound.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr.get().copied()
    }

    /// Request a graceful shutdown of the server.
    pub fn shutdown(&self) {
        self.shutdown.trigger();
    }

    /// Whether shutdown has been requested.
    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.is_triggered()
    }

    /// Subscribe to the shutdown signal, e.g. to stop background tasks.
    pub fn on_shutdown(&self) -> ShutdownSignal {
        self.shutdown.subscribe()
    }

    pub(crate) fn set_local_addr(&self, addr: SocketAddr) {
        let _ = self.local_addr.set(addr);
    }
}

/// HTTP server for the assembled application.
pub struct HttpServer {
    router: Router,
    handle: ServerHandle,
    drain_timeout: Duration,
}

impl HttpServer {
    pub fn new(router: Router, handle: ServerHandle) -> Self {
        Self {
            router,
            handle,
            drain_timeout: DEFAULT_DRAIN_TIMEOUT,
        }
    }

    pub fn with_drain_timeout(mut self, drain_timeout: Duration) -> Self {
        self.drain_timeout = drain_timeout;
        self
    }

    /// Run the server on a background task.
    pub fn spawn(self, listener: TcpListener) -> JoinHandle<Result<(), std::io::Error>> {
        tokio::spawn(self.run(listener))
    }

    /// Run the server, accepting connections on the given listener until
    /// shutdown is requested through the handle.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        self.handle.set_local_addr(addr);
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        let mut stop = self.handle.on_shutdown();
        let serve = axum::serve(listener, app).with_graceful_shutdown(async move {
            stop.recv().await;
            tracing::info!("Shutdown requested, draining connections");
        })
        .into_future();

        let mut drain = self.handle.on_shutdown();
        let drain_timeout = self.drain_timeout;
        let drain_deadline = async move {
            drain.recv().await;
            tokio::time::sleep(drain_timeout).await;
        };

        tokio::select! {
            result = serve => result?,
            _ = drain_deadline => {
                tracing::warn!(
                    drain_timeout = ?drain_timeout,
                    "Drain window elapsed, dropping remaining connections"
                );
            }
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// A server that finished bootstrap and is accepting connections.
#[derive(Debug)]
pub struct RunningServer {
    handle: ServerHandle,
    local_addr: SocketAddr,
    task: JoinHandle<Result<(), std::io::Error>>,
}

impl RunningServer {
    pub(crate) fn new(
        handle: ServerHandle,
        local_addr: SocketAddr,
        task: JoinHandle<Result<(), std::io::Error>>,
    ) -> Self {
        Self {
            handle,
            local_addr,
            task,
        }
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn handle(&self) -> &ServerHandle {
        &self.handle
    }

    /// Wait until the server stops.
    pub async fn wait(self) -> Result<(), std::io::Error> {
        match self.task.await {
            Ok(result) => result,
            Err(e) => Err(std::io::Error::other(e)),
        }
    }

    /// Request shutdown and wait for the server to stop.
    pub async fn shutdown(self) -> Result<(), std::io::Error> {
        self.handle.shutdown();
        self.wait().await
    }
}
