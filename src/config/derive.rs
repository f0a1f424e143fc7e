//! Runtime configuration derivation.
//!
//! # Responsibilities
//! - Merge the first service's declared fields over the defaults table
//! - Coerce and range-check the port
//! - Check that the CORS options build a usable layer
//!
//! # Design Decisions
//! - Shallow merge: a declared table replaces the default table wholesale
//! - Runs before any socket exists, so a bad port costs nothing
//! - Pure function: DeclaredConfig → Result<RuntimeConfig, BootstrapError>

use crate::config::schema::{ConfigDefaults, DeclaredConfig, PortValue, RuntimeConfig};
use crate::error::BootstrapError;
use crate::http::middleware::cors;

/// Derive the runtime configuration from a service's declared fields.
///
/// `reference` names the service in error messages.
pub fn derive_config(
    reference: &str,
    declared: &DeclaredConfig,
    defaults: &ConfigDefaults,
) -> Result<RuntimeConfig, BootstrapError> {
    let port = match &declared.port {
        Some(value) => parse_port(value)
            .map_err(|reason| BootstrapError::configuration(reference, reason))?,
        None => defaults.port,
    };

    let hostname = declared
        .hostname
        .clone()
        .unwrap_or_else(|| defaults.hostname.clone());

    let hardening = declared
        .hardening
        .clone()
        .unwrap_or_else(|| defaults.hardening.clone());

    let cors = declared.cors.clone().unwrap_or_else(|| defaults.cors.clone());
    cors::build_cors_layer(&cors)
        .map_err(|reason| BootstrapError::configuration(reference, format!("invalid CORS: {}", reason)))?;

    Ok(RuntimeConfig {
        port,
        hostname,
        hardening,
        cors,
    })
}

/// Parse a declared port as a base-10 integer in TCP port range.
pub fn parse_port(value: &PortValue) -> Result<u16, String> {
    let number = match value {
        PortValue::Number(n) => *n,
        PortValue::Text(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| format!("port {:?} is not a number", s))?,
    };

    if number < 0 {
        return Err(format!("port {} is negative", number));
    }
    u16::try_from(number).map_err(|_| format!("port {} is out of range", number))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{CorsOptions, HardeningOptions};

    fn derive(declared: DeclaredConfig) -> Result<RuntimeConfig, BootstrapError> {
        derive_config("test-service", &declared, &ConfigDefaults::default())
    }

    #[test]
    fn test_defaults_when_nothing_declared() {
        let config = derive(DeclaredConfig::default()).unwrap();
        assert_eq!(config.port, 8100);
        assert_eq!(config.hostname, "127.0.0.1");
        assert!(!config.hardening.hsts);
        assert!(config.hardening.no_cache);
    }

    #[test]
    fn test_string_port_is_coerced() {
        let config = derive(DeclaredConfig {
            port: Some("9999".into()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(config.port, 9999);
    }

    #[test]
    fn test_non_numeric_port_is_rejected() {
        let err = derive(DeclaredConfig {
            port: Some("abc".into()),
            ..Default::default()
        })
        .unwrap_err();

        match err {
            BootstrapError::Configuration { reference, reason } => {
                assert_eq!(reference, "test-service");
                assert!(reason.contains("abc"));
            }
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[test]
    fn test_port_range() {
        assert!(parse_port(&PortValue::Number(-1)).is_err());
        assert!(parse_port(&PortValue::Number(70_000)).is_err());
        assert_eq!(parse_port(&PortValue::Number(0)), Ok(0));
        assert_eq!(parse_port(&" 8080 ".into()), Ok(8080));
    }

    #[test]
    fn test_empty_hostname_kept() {
        let config = derive(DeclaredConfig {
            hostname: Some(String::new()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(config.hostname, "");
        assert_eq!(config.bind_host(), "0.0.0.0");
    }

    #[test]
    fn test_declared_hardening_replaces_defaults() {
        let config = derive(DeclaredConfig {
            hardening: Some(HardeningOptions::default()),
            ..Default::default()
        })
        .unwrap();
        // Library defaults, not the defaults table.
        assert!(config.hardening.hsts);
        assert!(!config.hardening.no_cache);
    }

    #[test]
    fn test_credentials_with_any_origin_rejected() {
        let err = derive(DeclaredConfig {
            cors: Some(CorsOptions {
                credentials: true,
                ..Default::default()
            }),
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, BootstrapError::Configuration { .. }));
    }
}
