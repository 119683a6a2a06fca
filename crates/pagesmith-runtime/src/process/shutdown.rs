//! Terminate-then-wait teardown for the generator child.

use std::io;
use std::process::ExitStatus;
use std::time::Duration;

use tokio::process::Child;

/// How long a child gets to exit after the polite signal before the
/// hard kill.
pub(crate) const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

#[cfg(unix)]
fn send_sigterm(raw_pid: u32) -> Result<(), nix::errno::Errno> {
    use nix::sys::signal::{self, Signal};
    use nix::unistd::Pid;

    #[allow(clippy::cast_possible_wrap)]
    let pid = Pid::from_raw(raw_pid as i32);
    signal::kill(pid, Signal::SIGTERM)
}

/// Ask the child to stop without waiting for it.
///
/// Unix sends SIGTERM so llama-cli can exit on its own terms; elsewhere
/// the only option is a hard kill. Delivery failures are logged and
/// swallowed; the eventual reap settles the outcome either way.
#[cfg(unix)]
pub(crate) fn request_terminate(child: &Child) {
    if let Some(raw_pid) = child.id() {
        if let Err(error) = send_sigterm(raw_pid) {
            tracing::debug!(%error, pid = raw_pid, "terminate request not delivered");
        }
    }
}

#[cfg(not(unix))]
pub(crate) fn request_terminate(child: &mut Child) {
    if let Err(error) = child.start_kill() {
        tracing::debug!(%error, "terminate request not delivered");
    }
}

/// Stop `child` and reap it: SIGTERM first, SIGKILL after
/// [`SHUTDOWN_GRACE`]. The final wait always runs, so no zombie is
/// left behind.
pub(crate) async fn shutdown_child(child: Child) -> io::Result<ExitStatus> {
    shutdown_child_with_grace(child, SHUTDOWN_GRACE).await
}

#[cfg(unix)]
pub(crate) async fn shutdown_child_with_grace(
    mut child: Child,
    grace: Duration,
) -> io::Result<ExitStatus> {
    use nix::errno::Errno;

    // id() is None once the child has been reaped elsewhere; wait()
    // then returns the stored status.
    let Some(raw_pid) = child.id() else {
        return child.wait().await;
    };

    match send_sigterm(raw_pid) {
        // Exited between id() and kill(); wait() still reaps it.
        Err(Errno::ESRCH) => return child.wait().await,
        Err(error) => {
            tracing::warn!(%error, pid = raw_pid, "SIGTERM failed, escalating to SIGKILL");
            child.kill().await?;
            return child.wait().await;
        }
        Ok(()) => {}
    }

    match tokio::time::timeout(grace, child.wait()).await {
        Ok(status) => status,
        Err(_) => {
            tracing::warn!(pid = raw_pid, "child ignored SIGTERM, sending SIGKILL");
            child.kill().await?;
            child.wait().await
        }
    }
}

#[cfg(not(unix))]
pub(crate) async fn shutdown_child_with_grace(
    mut child: Child,
    _grace: Duration,
) -> io::Result<ExitStatus> {
    child.kill().await?;
    child.wait().await
}
