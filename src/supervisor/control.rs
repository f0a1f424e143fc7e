//! Operator control channel.
//!
//! Lines typed on the supervisor's stdin and reload signals both become
//! [`SupervisorEvent`]s on the supervisor's channel.

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;

/// Events consumed by the supervisor state machine, one at a time.
#[derive(Debug)]
pub enum SupervisorEvent {
    /// Restart the child. Carries where the request came from.
    Reload(ReloadSource),
    /// The delay after a requested restart elapsed.
    RespawnDue,
    /// Stop the child and end the supervisor.
    Shutdown,
}

/// Origin of a reload request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadSource {
    Command(String),
    Signal(&'static str),
    Api,
}

/// Commands recognised on stdin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Reload,
}

/// Parse one line of operator input. Unknown input yields `None`.
pub fn parse_command(line: &str) -> Option<Command> {
    match line.trim().to_lowercase().as_str() {
        "r" | "reload" | "hup" => Some(Command::Reload),
        _ => None,
    }
}

/// Forward commands read from `input` until it ends or the supervisor stops.
pub async fn forward_commands<R>(input: R, events: mpsc::UnboundedSender<SupervisorEvent>)
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if let Some(Command::Reload) = parse_command(&line) {
                    let source = ReloadSource::Command(line.trim().to_string());
                    if events.send(SupervisorEvent::Reload(source)).is_err() {
                        return;
                    }
                }
            }
            Ok(None) => {
                tracing::debug!("Control input closed");
                return;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read control input");
                return;
            }
        }
    }
}

/// Forward SIGTSTP/SIGHUP as reload requests.
#[cfg(unix)]
pub async fn forward_reload_signals(
    mut signals: crate::lifecycle::signals::ReloadSignals,
    events: mpsc::UnboundedSender<SupervisorEvent>,
) {
    while let Some(name) = signals.recv().await {
        if events
            .send(SupervisorEvent::Reload(ReloadSource::Signal(name)))
            .is_err()
        {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command() {
        assert_eq!(parse_command("r"), Some(Command::Reload));
        assert_eq!(parse_command("  Reload \n"), Some(Command::Reload));
        assert_eq!(parse_command("HUP"), Some(Command::Reload));
        assert_eq!(parse_command("restart"), None);
        assert_eq!(parse_command(""), None);
    }

    #[tokio::test]
    async fn test_forward_commands() {
        let input: &[u8] = b"hello\nr\nRELOAD\nquit\n";
        let (tx, mut rx) = mpsc::unbounded_channel();

        forward_commands(input, tx).await;

        let mut sources = Vec::new();
        while let Ok(event) = rx.try_recv() {
            match event {
                SupervisorEvent::Reload(source) => sources.push(source),
                other => panic!("unexpected event {other:?}"),
            }
        }
        assert_eq!(
            sources,
            [
                ReloadSource::Command("r".into()),
                ReloadSource::Command("RELOAD".into())
            ]
        );
    }
}
