//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use service_host::config::DeclaredConfig;
use service_host::{App, BoxError, RuntimeContext, Service};

/// Ordered log of hook calls shared between test services.
#[derive(Clone, Default)]
pub struct EventLog(Arc<Mutex<Vec<String>>>);

impl EventLog {
    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().unwrap().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

/// A service that records its hooks and optionally fails `init`.
pub struct Recording {
    pub name: &'static str,
    pub log: EventLog,
    pub declared: DeclaredConfig,
    pub fail_init: bool,
}

impl Recording {
    pub fn new(name: &'static str, log: &EventLog) -> Self {
        Self {
            name,
            log: log.clone(),
            declared: DeclaredConfig::default(),
            fail_init: false,
        }
    }

    /// Declare a loopback listener on an ephemeral port.
    pub fn ephemeral(mut self) -> Self {
        self.declared.port = Some(0u16.into());
        self.declared.hostname = Some("127.0.0.1".into());
        self
    }

    pub fn port(mut self, port: &str) -> Self {
        self.declared.port = Some(port.into());
        self.declared.hostname = Some("127.0.0.1".into());
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail_init = true;
        self
    }
}

#[async_trait]
impl Service for Recording {
    async fn load(&self) -> Result<(), BoxError> {
        // Yield so a concurrent hook would interleave.
        tokio::task::yield_now().await;
        self.log.push(format!("load:{}", self.name));
        Ok(())
    }

    async fn init(&self, _app: App, ctx: RuntimeContext) -> Result<(), BoxError> {
        tokio::task::yield_now().await;
        self.log.push(format!("init:{}:{}", self.name, ctx.port));
        if self.fail_init {
            return Err(format!("{} cannot start", self.name).into());
        }
        Ok(())
    }

    fn declared(&self) -> DeclaredConfig {
        self.declared.clone()
    }

    fn name(&self) -> &str {
        self.name
    }
}

/// HTTP client without connection pooling or system proxies.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}
