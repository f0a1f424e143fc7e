//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! service manifest (TOML)          Service::declared()
//!     → loader.rs (parse)                 │
//!     → DeclaredConfig ◀──────────────────┘  (manifest overrides module)
//!     → derive.rs (merge over defaults, validate)
//!     → RuntimeConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Only the first service's declarations are authoritative
//! - All fields have defaults to allow empty manifests
//! - Config is derived once per bootstrap; changes require a restart

pub mod derive;
pub mod loader;
pub mod schema;

pub use derive::derive_config;
pub use schema::{ConfigDefaults, CorsOptions, DeclaredConfig, HardeningOptions, PortValue, RuntimeConfig};
