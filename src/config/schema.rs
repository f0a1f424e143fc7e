//! Configuration schema definitions.
//!
//! `DeclaredConfig` is what a service (or its manifest) declares;
//! `RuntimeConfig` is the validated result the orchestrator runs with.
//! All types derive Serde traits so they can be read from manifests.

use serde::{Deserialize, Serialize};

/// Port used when the first service declares none.
pub const DEFAULT_PORT: u16 = 8100;

/// Hostname used when the first service declares none.
pub const DEFAULT_HOSTNAME: &str = "127.0.0.1";

/// Address bound when the hostname is empty.
pub const ALL_INTERFACES: &str = "0.0.0.0";

/// A port as declared by a service: either a number or a string.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum PortValue {
    Number(i64),
    Text(String),
}

impl From<u16> for PortValue {
    fn from(port: u16) -> Self {
        PortValue::Number(i64::from(port))
    }
}

impl From<&str> for PortValue {
    fn from(port: &str) -> Self {
        PortValue::Text(port.to_string())
    }
}

/// Configuration fields a service may declare.
///
/// Every field is optional; absent fields fall back to the defaults table.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct DeclaredConfig {
    #[serde(rename = "PORT", default, skip_serializing_if = "Option::is_none")]
    pub port: Option<PortValue>,

    /// `Some("")` binds all interfaces.
    #[serde(rename = "HOSTNAME", default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,

    #[serde(rename = "HARDENING", default, skip_serializing_if = "Option::is_none")]
    pub hardening: Option<HardeningOptions>,

    #[serde(rename = "CORS", default, skip_serializing_if = "Option::is_none")]
    pub cors: Option<CorsOptions>,
}

impl DeclaredConfig {
    /// Overlay `other` on top of `self`, field by field.
    pub fn overlay(self, other: DeclaredConfig) -> DeclaredConfig {
        DeclaredConfig {
            port: other.port.or(self.port),
            hostname: other.hostname.or(self.hostname),
            hardening: other.hardening.or(self.hardening),
            cors: other.cors.or(self.cors),
        }
    }
}

/// Value of the `X-Frame-Options` response header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameOptions {
    Deny,
    Sameorigin,
}

/// Response hardening settings.
///
/// `Default` gives the library defaults: every protection on except
/// `no_cache`. The defaults table used for bootstrap differs, see
/// [`ConfigDefaults`].
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HardeningOptions {
    /// Send `Strict-Transport-Security`.
    pub hsts: bool,

    /// `max-age` of the HSTS header in seconds.
    pub hsts_max_age_secs: u64,

    /// Send headers that disable client and proxy caching.
    pub no_cache: bool,

    /// Send `X-Content-Type-Options: nosniff`.
    pub no_sniff: bool,

    /// `X-Frame-Options` value, `None` to omit.
    pub frame_options: Option<FrameOptions>,

    /// Send `X-XSS-Protection: 1; mode=block`.
    pub xss_filter: bool,

    /// Send `X-DNS-Prefetch-Control: off`.
    pub dns_prefetch_control: bool,

    /// Send `X-Download-Options: noopen`.
    pub ie_no_open: bool,

    /// Strip `X-Powered-By` from responses.
    pub hide_powered_by: bool,
}

impl Default for HardeningOptions {
    fn default() -> Self {
        Self {
            hsts: true,
            hsts_max_age_secs: 15_552_000, // 180 days
            no_cache: false,
            no_sniff: true,
            frame_options: Some(FrameOptions::Sameorigin),
            xss_filter: true,
            dns_prefetch_control: true,
            ie_no_open: true,
            hide_powered_by: true,
        }
    }
}

/// Cross-origin resource sharing settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsOptions {
    /// Allowed origins, `None` for any origin.
    pub origin: Option<Vec<String>>,

    /// Allowed methods.
    pub methods: Vec<String>,

    /// Allowed request headers, `None` to mirror the preflight request.
    pub allowed_headers: Option<Vec<String>>,

    /// Headers exposed to the browser.
    pub exposed_headers: Vec<String>,

    /// Send `Access-Control-Allow-Credentials: true`.
    pub credentials: bool,

    /// Preflight cache lifetime in seconds.
    pub max_age_secs: Option<u64>,
}

impl Default for CorsOptions {
    fn default() -> Self {
        Self {
            origin: None,
            methods: ["GET", "HEAD", "PUT", "PATCH", "POST", "DELETE"]
                .into_iter()
                .map(String::from)
                .collect(),
            allowed_headers: None,
            exposed_headers: Vec::new(),
            credentials: false,
            max_age_secs: None,
        }
    }
}

/// Static defaults table applied under the first service's declarations.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigDefaults {
    pub port: u16,
    pub hostname: String,
    pub hardening: HardeningOptions,
    pub cors: CorsOptions,
}

impl Default for ConfigDefaults {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            hostname: DEFAULT_HOSTNAME.to_string(),
            hardening: HardeningOptions {
                hsts: false,
                no_cache: true,
                ..HardeningOptions::default()
            },
            cors: CorsOptions::default(),
        }
    }
}

/// Validated configuration the orchestrator runs with.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuntimeConfig {
    pub port: u16,

    /// Empty for all interfaces.
    pub hostname: String,

    pub hardening: HardeningOptions,

    pub cors: CorsOptions,
}

impl RuntimeConfig {
    /// Host part of the bind address.
    pub fn bind_host(&self) -> &str {
        if self.hostname.is_empty() {
            ALL_INTERFACES
        } else {
            &self.hostname
        }
    }

    /// Human-readable bind address, e.g. `127.0.0.1:8100`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_host(), self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declared_config_from_toml() {
        let declared: DeclaredConfig = toml::from_str(
            r#"
            PORT = "9999"
            HOSTNAME = ""
            [HARDENING]
            no_cache = true
            "#,
        )
        .unwrap();

        assert_eq!(declared.port, Some(PortValue::Text("9999".into())));
        assert_eq!(declared.hostname.as_deref(), Some(""));
        let hardening = declared.hardening.unwrap();
        assert!(hardening.no_cache);
        // Missing keys come from the library defaults.
        assert!(hardening.hsts);
        assert!(declared.cors.is_none());
    }

    #[test]
    fn test_numeric_port_in_toml() {
        let declared: DeclaredConfig = toml::from_str("PORT = 9000").unwrap();
        assert_eq!(declared.port, Some(PortValue::Number(9000)));
    }

    #[test]
    fn test_overlay_prefers_other() {
        let base = DeclaredConfig {
            port: Some(1000u16.into()),
            hostname: Some("localhost".into()),
            ..Default::default()
        };
        let top = DeclaredConfig {
            port: Some("2000".into()),
            ..Default::default()
        };

        let merged = base.overlay(top);
        assert_eq!(merged.port, Some(PortValue::Text("2000".into())));
        assert_eq!(merged.hostname.as_deref(), Some("localhost"));
    }

    #[test]
    fn test_defaults_table() {
        let defaults = ConfigDefaults::default();
        assert_eq!(defaults.port, 8100);
        assert_eq!(defaults.hostname, "127.0.0.1");
        assert!(!defaults.hardening.hsts);
        assert!(defaults.hardening.no_cache);
        assert_eq!(defaults.cors, CorsOptions::default());
    }

    #[test]
    fn test_bind_address_all_interfaces() {
        let config = RuntimeConfig {
            port: 8100,
            hostname: String::new(),
            hardening: HardeningOptions::default(),
            cors: CorsOptions::default(),
        };
        assert_eq!(config.bind_address(), "0.0.0.0:8100");
    }
}
