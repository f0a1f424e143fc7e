//! OS signal handling.
//!
//! # Signals
//! - SIGTERM/SIGINT → graceful shutdown (server and supervisor)
//! - SIGTSTP/SIGHUP → reload (supervisor only)
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - Reload signals are forwarded as events, never acted on in the handler

#[cfg(unix)]
use tokio::signal::unix::{signal, SignalKind};

/// Wait until the process receives a termination signal.
#[cfg(unix)]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::select! {
        _ = sigint.recv() => tracing::info!("SIGINT received"),
        _ = sigterm.recv() => tracing::info!("SIGTERM received"),
    }
    Ok(())
}

#[cfg(not(unix))]
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await?;
    tracing::info!("Ctrl-C received");
    Ok(())
}

/// Stream of reload requests from the terminal-stop and hangup signals.
#[cfg(unix)]
pub struct ReloadSignals {
    tstp: tokio::signal::unix::Signal,
    hup: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl ReloadSignals {
    /// Install the handlers. Installing replaces the default stop action of
    /// SIGTSTP, so the supervisor is no longer suspended by Ctrl-Z.
    pub fn install() -> std::io::Result<Self> {
        Ok(Self {
            tstp: signal(SignalKind::from_raw(nix::libc::SIGTSTP))?,
            hup: signal(SignalKind::hangup())?,
        })
    }

    /// Wait for the next reload signal and return its name.
    pub async fn recv(&mut self) -> Option<&'static str> {
        tokio::select! {
            s = self.tstp.recv() => s.map(|_| "SIGTSTP"),
            s = self.hup.recv() => s.map(|_| "SIGHUP"),
        }
    }
}
