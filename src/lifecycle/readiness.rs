//! Readiness notification for process managers.
//!
//! Sends `READY=1` to the datagram socket named by `NOTIFY_SOCKET`. Without
//! that variable the process runs standalone and nothing is sent.

use std::io;

/// Environment variable naming the notification socket.
pub const NOTIFY_SOCKET: &str = "NOTIFY_SOCKET";

const READY: &[u8] = b"READY=1\n";

/// Notify the supervising process manager, if any, that startup finished.
///
/// Returns whether a notification was sent.
pub fn notify_ready() -> io::Result<bool> {
    match std::env::var(NOTIFY_SOCKET) {
        Ok(path) if !path.is_empty() => {
            notify_ready_to(&path)?;
            Ok(true)
        }
        _ => Ok(false),
    }
}

/// Send the ready message to a specific socket path.
///
/// A leading `@` names a Linux abstract socket.
#[cfg(unix)]
pub fn notify_ready_to(path: &str) -> io::Result<()> {
    use std::os::unix::net::UnixDatagram;

    let socket = UnixDatagram::unbound()?;

    #[cfg(target_os = "linux")]
    {
        if let Some(name) = path.strip_prefix('@') {
            use std::os::linux::net::SocketAddrExt;
            use std::os::unix::net::SocketAddr;

            let addr = SocketAddr::from_abstract_name(name.as_bytes())?;
            socket.send_to_addr(READY, &addr)?;
            return Ok(());
        }
    }

    socket.send_to(READY, path)?;
    Ok(())
}

#[cfg(not(unix))]
pub fn notify_ready_to(_path: &str) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "readiness notification requires unix sockets",
    ))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use std::os::unix::net::UnixDatagram;

    #[test]
    fn test_sends_ready() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notify.sock");
        let receiver = UnixDatagram::bind(&path).unwrap();

        notify_ready_to(path.to_str().unwrap()).unwrap();

        let mut buf = [0u8; 64];
        let n = receiver.recv(&mut buf).unwrap();
        assert_eq!(&buf[..n], READY);
    }

    // The only test touching the variable; kept in one body so the unset
    // and set cases cannot race.
    #[test]
    fn test_notify_ready_follows_env() {
        std::env::remove_var(NOTIFY_SOCKET);
        assert!(!notify_ready().unwrap());

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("env.sock");
        let receiver = UnixDatagram::bind(&path).unwrap();
        std::env::set_var(NOTIFY_SOCKET, &path);

        let sent = notify_ready();
        std::env::remove_var(NOTIFY_SOCKET);
        assert!(sent.unwrap());

        let mut buf = [0u8; 64];
        let n = receiver.recv(&mut buf).unwrap();
        assert_eq!(&buf[..n], READY);
    }

    #[test]
    fn test_missing_socket_is_an_error() {
        assert!(notify_ready_to("/nonexistent/notify.sock").is_err());
    }
}
