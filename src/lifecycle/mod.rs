//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Resolve services → load hooks → derive config → base middleware
//!     → init hooks → bind listener → readiness.rs
//!
//! Shutdown (shutdown.rs):
//!     Signal received → stop accepting → drain (bounded) → exit
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → graceful shutdown
//!     SIGTSTP/SIGHUP → reload (supervisor)
//! ```

pub mod readiness;
pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::Orchestrator;
