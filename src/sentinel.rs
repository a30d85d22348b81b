//! Liveness sentinel
//!
//! The mirroring loop would otherwise run forever. A supervisor that pipes
//! this process's stdout and then goes away closes the pipe's read end, which
//! poll() reports as POLLERR/POLLHUP on stdout. That hang-up is treated as a
//! request to stop, not as a fault.

use std::io;

use tracing::warn;

/// Resolves once stdout reports an error or hang-up condition.
///
/// Never resolves while the consumer stays alive; a terminal in particular
/// never hangs up. The wait runs on a plain detached thread so runtime
/// shutdown is not held up by the blocked poll.
pub async fn stdout_hangup() {
    let (tx, rx) = tokio::sync::oneshot::channel::<()>();

    let spawned = std::thread::Builder::new()
        .name("stdout-sentinel".into())
        .spawn(move || {
            poll_stdout();
            let _ = tx.send(());
        });

    match spawned {
        // A dropped sender (sentinel thread died) also resolves, which errs
        // on the side of shutting down.
        Ok(_) => {
            let _ = rx.await;
        }
        Err(err) => {
            warn!("Could not start stdout sentinel: {err}");
            std::future::pending::<()>().await;
        }
    }
}

/// Block in poll() on stdout with no timeout until error or hang-up.
fn poll_stdout() {
    let mut fds = libc::pollfd {
        fd: libc::STDOUT_FILENO,
        // events = 0: POLLERR, POLLHUP and POLLNVAL are always reported
        events: 0,
        revents: 0,
    };

    loop {
        let rc = unsafe { libc::poll(&mut fds, 1, -1) };
        if rc < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                continue;
            }
            warn!("poll on stdout failed: {err}");
            return;
        }
        if fds.revents & (libc::POLLERR | libc::POLLHUP | libc::POLLNVAL) != 0 {
            return;
        }
    }
}
