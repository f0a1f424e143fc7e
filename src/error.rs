//! Error taxonomy for bootstrap and supervision.
//!
//! Bootstrap errors are ordered by how late they can occur:
//! usage → configuration → service hooks → network. Every variant aborts the
//! whole bootstrap; nothing is retried.

use std::fmt;
use std::path::PathBuf;

/// Error type returned by service hooks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Which service hook failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookPhase {
    Load,
    Init,
}

impl fmt::Display for HookPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HookPhase::Load => write!(f, "load"),
            HookPhase::Init => write!(f, "init"),
        }
    }
}

/// Error type for the bootstrap sequence.
#[derive(Debug, thiserror::Error)]
pub enum BootstrapError {
    /// No service references were given.
    #[error("no service given")]
    Usage,

    /// A reference could not be turned into a service, or its declared
    /// configuration is invalid.
    #[error("{reference}: {reason}")]
    Configuration { reference: String, reason: String },

    /// A service's `load` or `init` hook failed.
    #[error("service {service} failed during {phase}: {source}")]
    ServiceInit {
        service: String,
        phase: HookPhase,
        #[source]
        source: BoxError,
    },

    /// The shared listener could not be bound.
    #[error("failed to listen on {address}: {source}")]
    Network {
        address: String,
        #[source]
        source: std::io::Error,
    },
}

impl BootstrapError {
    pub(crate) fn configuration(reference: impl Into<String>, reason: impl Into<String>) -> Self {
        BootstrapError::Configuration {
            reference: reference.into(),
            reason: reason.into(),
        }
    }
}

/// Error type for the process supervisor.
#[derive(Debug, thiserror::Error)]
pub enum SupervisorError {
    /// The child process could not be spawned at all.
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Waiting on the child or installing a signal handler failed.
    #[error("supervisor I/O error: {0}")]
    Io(#[from] std::io::Error),
}
