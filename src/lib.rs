//! Service host: boots HTTP service modules into one shared listener, and
//! supervises that server process with operator-driven reloads.
//!
//! # Architecture Overview
//!
//! ```text
//!   operator (stdin: r / reload / hup, SIGTSTP, SIGHUP)
//!        │
//!        ▼
//!   ┌────────────┐  spawn / SIGTERM   ┌──────────────────────────────────────┐
//!   │ supervisor │ ─────────────────▶ │ orchestrator (lifecycle::startup)    │
//!   │ (one child)│ ◀───── exit ────── │                                      │
//!   └────────────┘                    │  service loader → load hooks         │
//!                                     │  → config derive (first service)     │
//!                                     │  → base middleware → init hooks      │
//!                                     │  → listener bind → READY=1           │
//!                                     └──────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod service;
pub mod supervisor;

pub use config::RuntimeConfig;
pub use error::{BootstrapError, BoxError, SupervisorError};
pub use http::{App, RunningServer, ServerHandle};
pub use lifecycle::Orchestrator;
pub use service::{RuntimeContext, Service, ServiceLoader, ServiceModule, ServiceRef};
pub use supervisor::Supervisor;
