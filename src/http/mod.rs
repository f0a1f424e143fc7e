//! HTTP subsystem.
//!
//! # Data Flow
//! ```text
//! orchestrator
//!     → app.rs (shared App, services mount routes and layers in order)
//!     → middleware/ (base stack: request id, trace, proxy, hardening, CORS)
//!     → server.rs (serve on the bound listener, graceful drain)
//! ```

pub mod app;
pub mod middleware;
pub mod server;

pub use app::App;
pub use middleware::ClientAddr;
pub use server::{HttpServer, RunningServer, ServerHandle};
