//! TCP listener binding.
//!
//! # Responsibilities
//! - Bind the shared listener to the derived `(hostname, port)`
//! - Report bind failures as network errors carrying the address
//!
//! # Design Decisions
//! - Binding happens after every service initialised; the listener is the
//!   last resource acquired
//! - Hostnames are resolved by the OS, so `localhost` works as well as IPs

use tokio::net::TcpListener;

use crate::config::RuntimeConfig;
use crate::error::BootstrapError;

/// Bind the shared listener for `config`.
pub async fn bind(config: &RuntimeConfig) -> Result<TcpListener, BootstrapError> {
    let address = config.bind_address();
    let network_error = |source| BootstrapError::Network {
        address: address.clone(),
        source,
    };

    let listener = TcpListener::bind((config.bind_host(), config.port))
        .await
        .map_err(network_error)?;

    let local_addr = listener.local_addr().map_err(network_error)?;

    tracing::info!(
        address = %local_addr,
        "Listener bound"
    );

    Ok(listener)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CorsOptions, HardeningOptions};

    fn config(port: u16) -> RuntimeConfig {
        RuntimeConfig {
            port,
            hostname: "127.0.0.1".into(),
            hardening: HardeningOptions::default(),
            cors: CorsOptions::default(),
        }
    }

    #[tokio::test]
    async fn test_bind_ephemeral() {
        let listener = bind(&config(0)).await.unwrap();
        assert_ne!(listener.local_addr().unwrap().port(), 0);
    }

    #[tokio::test]
    async fn test_address_in_use() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = taken.local_addr().unwrap().port();

        match bind(&config(port)).await.unwrap_err() {
            BootstrapError::Network { address, source } => {
                assert_eq!(address, format!("127.0.0.1:{}", port));
                assert_eq!(source.kind(), std::io::ErrorKind::AddrInUse);
            }
            other => panic!("expected network error, got {other:?}"),
        }
    }
}
