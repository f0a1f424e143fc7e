//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields
//!     → logging.rs (filter + fmt subscriber on stderr)
//! HTTP requests:
//!     → x-request-id assigned and propagated
//!     → TraceLayer spans per request
//! ```

pub mod logging;
