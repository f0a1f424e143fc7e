//! Startup orchestration.
//!
//! # Responsibilities
//! - Resolve service references and run their `load` hooks
//! - Derive the runtime configuration from the first service
//! - Install the base middleware and run every `init` hook
//! - Bind the listener and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal and returned unchanged
//! - The route table is checked after each `init`, so a conflict names the
//!   service that introduced it
//! - Steps run in order, never concurrently
//! - Listener binds last (traffic only when every service is mounted)

use std::time::Duration;

use axum::Router;

use crate::config::{derive_config, ConfigDefaults};
use crate::error::BootstrapError;
use crate::http::middleware;
use crate::http::server::{HttpServer, RunningServer, ServerHandle, DEFAULT_DRAIN_TIMEOUT};
use crate::http::App;
use crate::lifecycle::readiness;
use crate::net;
use crate::service::{run_load_hooks, RuntimeContext, ServiceLoader, ServiceRef};

/// Boots a set of services into one shared HTTP listener.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    loader: ServiceLoader,
    defaults: ConfigDefaults,
    drain_timeout: Duration,
}

impl Orchestrator {
    pub fn new(loader: ServiceLoader) -> Self {
        Self {
            loader,
            defaults: ConfigDefaults::default(),
            drain_timeout: DEFAULT_DRAIN_TIMEOUT,
        }
    }

    pub fn with_defaults(mut self, defaults: ConfigDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn with_drain_timeout(mut self, drain_timeout: Duration) -> Self {
        self.drain_timeout = drain_timeout;
        self
    }

    /// Run the bootstrap sequence.
    ///
    /// Returns once the listener is accepting connections.
    pub async fn run(&self, refs: Vec<ServiceRef>) -> Result<RunningServer, BootstrapError> {
        if refs.is_empty() {
            return Err(BootstrapError::Usage);
        }
        tracing::info!(services = refs.len(), "Booting server");

        let services = self.loader.resolve(refs)?;
        run_load_hooks(&services).await?;

        let first = &services[0];
        let config = derive_config(first.name(), first.declared(), &self.defaults)?;
        tracing::info!(
            service = %first.name(),
            port = config.port,
            hostname = %config.hostname,
            "Configuration derived"
        );

        let app = App::new();
        middleware::install_base(&app, &config)?;

        let handle = ServerHandle::new();
        let ctx = RuntimeContext {
            server: handle.clone(),
            port: config.port,
            hostname: config.hostname.clone(),
        };

        let mut router = Router::new();
        for service in &services {
            tracing::info!(service = %service.name(), "Initializing service");
            service.init(app.clone(), ctx.clone()).await?;
            router = app
                .build()
                .map_err(|reason| BootstrapError::configuration(service.name(), reason))?;
        }

        let listener = net::bind(&config).await?;
        let local_addr = listener
            .local_addr()
            .map_err(|source| BootstrapError::Network {
                address: config.bind_address(),
                source,
            })?;
        handle.set_local_addr(local_addr);

        let task = HttpServer::new(router, handle.clone())
            .with_drain_timeout(self.drain_timeout)
            .spawn(listener);

        tracing::info!(address = %local_addr, "Server up and running");

        match readiness::notify_ready() {
            Ok(true) => tracing::debug!("Readiness notification sent"),
            Ok(false) => {}
            Err(e) => tracing::warn!(error = %e, "Failed to send readiness notification"),
        }

        Ok(RunningServer::new(handle, local_addr, task))
    }
}
