//! Process supervisor.
//!
//! # State Machine
//! ```text
//! Idle ──spawn──▶ Running ──reload──▶ RestartPending
//!  ▲                 │                     │
//!  │   exited        │                     │ exited
//!  └─────────────────┘                     ▼
//!  (no respawn)               Idle ──delay──▶ spawn ──▶ Running
//! ```
//!
//! # Design Decisions
//! - All inputs (stdin commands, signals, child exit, respawn timer) are
//!   events consumed one at a time; no concurrent mutation of state
//! - Restart marking is idempotent: repeated reloads while a restart is
//!   pending or scheduled are dropped
//! - A child exiting on its own is reported, never respawned
//! - Respawn waits a short delay so the OS releases the listening port

pub mod control;
pub mod spawn;

use std::process::ExitStatus;
use std::time::Duration;

use tokio::process::Child;
use tokio::sync::mpsc;

use crate::error::SupervisorError;

pub use control::{ReloadSource, SupervisorEvent};
pub use spawn::{CommandSpawner, Spawn};

/// Delay between a requested child exit and the respawn.
pub const DEFAULT_RESPAWN_DELAY: Duration = Duration::from_millis(200);

/// Observable supervisor state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorStatus {
    /// No child is running.
    Idle,
    /// A child is running, no restart pending.
    Running,
    /// A restart was requested; the current child is being torn down.
    RestartPending,
}

/// Whether the supervisor loop should keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

#[derive(Debug, Default)]
struct SupervisorState {
    child: Option<Child>,
    restart_requested: bool,
    respawn_scheduled: bool,
    shutting_down: bool,
}

/// Cloneable handle for sending events to a supervisor.
#[derive(Debug, Clone)]
pub struct SupervisorHandle {
    events: mpsc::UnboundedSender<SupervisorEvent>,
}

impl SupervisorHandle {
    /// Request a restart of the child.
    pub fn reload(&self) {
        let _ = self.events.send(SupervisorEvent::Reload(ReloadSource::Api));
    }

    /// Stop the child and end the supervisor.
    pub fn shutdown(&self) {
        let _ = self.events.send(SupervisorEvent::Shutdown);
    }

    /// Raw event sender, for control inputs.
    pub fn sender(&self) -> mpsc::UnboundedSender<SupervisorEvent> {
        self.events.clone()
    }
}

enum Step {
    Exited(ExitStatus),
    Event(Option<SupervisorEvent>),
}

/// Supervises exactly one child process.
pub struct Supervisor<S: Spawn = CommandSpawner> {
    spawner: S,
    state: SupervisorState,
    events_tx: mpsc::UnboundedSender<SupervisorEvent>,
    events_rx: mpsc::UnboundedReceiver<SupervisorEvent>,
    respawn_delay: Duration,
    spawn_count: u64,
    last_exit: Option<ExitStatus>,
}

impl<S: Spawn> Supervisor<S> {
    pub fn new(spawner: S) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            spawner,
            state: SupervisorState::default(),
            events_tx,
            events_rx,
            respawn_delay: DEFAULT_RESPAWN_DELAY,
            spawn_count: 0,
            last_exit: None,
        }
    }

    pub fn with_respawn_delay(mut self, delay: Duration) -> Self {
        self.respawn_delay = delay;
        self
    }

    pub fn handle(&self) -> SupervisorHandle {
        SupervisorHandle {
            events: self.events_tx.clone(),
        }
    }

    pub fn status(&self) -> SupervisorStatus {
        match (&self.state.child, self.state.restart_requested) {
            (None, _) => SupervisorStatus::Idle,
            (Some(_), false) => SupervisorStatus::Running,
            (Some(_), true) => SupervisorStatus::RestartPending,
        }
    }

    /// Number of children spawned so far.
    pub fn spawn_count(&self) -> u64 {
        self.spawn_count
    }

    /// Exit status of the most recent child that exited.
    pub fn last_exit(&self) -> Option<ExitStatus> {
        self.last_exit
    }

    /// Process id of the running child.
    pub fn child_id(&self) -> Option<u32> {
        self.state.child.as_ref().and_then(Child::id)
    }

    /// Spawn the first child.
    pub fn start(&mut self) -> Result<(), SupervisorError> {
        tracing::info!("Starting child");
        self.spawn_child()
    }

    /// Start the child and process events until shutdown.
    pub async fn run(mut self) -> Result<(), SupervisorError> {
        self.start()?;
        while self.step().await? == Flow::Continue {}
        Ok(())
    }

    /// Wait for and handle a single event.
    pub async fn step(&mut self) -> Result<Flow, SupervisorError> {
        let step = match self.state.child.as_mut() {
            Some(child) => tokio::select! {
                status = child.wait() => Step::Exited(status?),
                event = self.events_rx.recv() => Step::Event(event),
            },
            None => Step::Event(self.events_rx.recv().await),
        };

        match step {
            Step::Exited(status) => Ok(self.on_child_exit(status)),
            Step::Event(Some(event)) => self.on_event(event),
            // Unreachable while `events_tx` is held; treat as shutdown.
            Step::Event(None) => self.on_event(SupervisorEvent::Shutdown),
        }
    }

    fn on_event(&mut self, event: SupervisorEvent) -> Result<Flow, SupervisorError> {
        match event {
            SupervisorEvent::Reload(source) => {
                if self.state.shutting_down {
                    return Ok(Flow::Continue);
                }
                self.on_reload(source)?;
                Ok(Flow::Continue)
            }
            SupervisorEvent::RespawnDue => {
                self.state.respawn_scheduled = false;
                if !self.state.shutting_down && self.state.child.is_none() {
                    self.spawn_child()?;
                }
                Ok(Flow::Continue)
            }
            SupervisorEvent::Shutdown => {
                self.state.shutting_down = true;
                match self.state.child.as_mut() {
                    Some(child) => {
                        tracing::info!("Stopping child");
                        if let Err(e) = spawn::request_termination(child) {
                            tracing::warn!(error = %e, "Failed to signal child");
                        }
                        Ok(Flow::Continue)
                    }
                    None => Ok(Flow::Exit),
                }
            }
        }
    }

    fn on_reload(&mut self, source: ReloadSource) -> Result<(), SupervisorError> {
        match self.state.child.as_mut() {
            Some(_) if self.state.restart_requested => {
                tracing::debug!(?source, "Restart already pending");
            }
            Some(child) => {
                tracing::info!(?source, "Reload requested, stopping child");
                self.state.restart_requested = true;
                if let Err(e) = spawn::request_termination(child) {
                    tracing::warn!(error = %e, "Failed to signal child");
                }
            }
            None if self.state.respawn_scheduled => {
                tracing::debug!(?source, "Respawn already scheduled");
            }
            None => {
                tracing::info!(?source, "Starting child");
                self.spawn_child()?;
            }
        }
        Ok(())
    }

    fn on_child_exit(&mut self, status: ExitStatus) -> Flow {
        self.state.child = None;
        self.last_exit = Some(status);
        log_exit(&status);

        if self.state.shutting_down {
            self.state.restart_requested = false;
            return Flow::Exit;
        }

        if std::mem::take(&mut self.state.restart_requested) {
            tracing::info!(
                delay = ?self.respawn_delay,
                "Restarting child"
            );
            self.state.respawn_scheduled = true;
            let events = self.events_tx.clone();
            let delay = self.respawn_delay;
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                let _ = events.send(SupervisorEvent::RespawnDue);
            });
        } else {
            tracing::warn!("Child exited without a reload request, not restarting");
        }

        Flow::Continue
    }

    fn spawn_child(&mut self) -> Result<(), SupervisorError> {
        let child = self
            .spawner
            .spawn()
            .map_err(|source| SupervisorError::Spawn {
                program: self.spawner.program().to_path_buf(),
                source,
            })?;

        self.spawn_count += 1;
        tracing::info!(
            pid = child.id(),
            program = %self.spawner.program().display(),
            "Child started"
        );
        self.state.child = Some(child);
        Ok(())
    }
}

fn log_exit(status: &ExitStatus) {
    #[cfg(unix)]
    let signal = std::os::unix::process::ExitStatusExt::signal(status);
    #[cfg(not(unix))]
    let signal: Option<i32> = None;

    tracing::info!(code = status.code(), signal, "Child exited");
}
