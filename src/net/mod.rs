//! Network layer.
//!
//! # Data Flow
//! ```text
//! RuntimeConfig (hostname, port)
//!     → listener.rs (bind, NetworkError on failure)
//!     → http::server (accept + serve)
//! ```

pub mod listener;

pub use listener::bind;
