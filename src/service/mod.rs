//! Service loading subsystem.
//!
//! # Data Flow
//! ```text
//! ServiceRef (manifest path | module value)
//!     → loader.rs (read manifest, look up module in registry.rs)
//!     → LoadedService (module.rs: name, module, declared config)
//!     → load hooks, in order
//!     → init hooks, in order (driven by lifecycle::startup)
//! ```
//!
//! # Design Decisions
//! - Two service shapes (init function, service object) normalised at load
//! - Hooks never run concurrently; later services may rely on earlier ones

pub mod builtin;
pub mod loader;
pub mod module;
pub mod registry;

pub use loader::{run_load_hooks, ServiceLoader, ServiceRef};
pub use module::{InitFn, LoadedService, RuntimeContext, Service, ServiceModule};
pub use registry::ServiceRegistry;
