//! Child process supervision: spawn, capture, time-box, reclaim.

use super::ExecutionResult;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tracing::{debug, warn};

/// How long to wait for pipe readers after the process is gone.
const READER_JOIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Run `cmd` to completion or until `limit` expires.
///
/// The child is placed in its own process group. Whatever is still alive in
/// that group when this returns, including grandchildren, is killed.
pub(crate) async fn run_bounded(
    mut cmd: Command,
    limit: Duration,
    max_output_bytes: usize,
) -> std::io::Result<ExecutionResult> {
    cmd.stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    #[cfg(unix)]
    cmd.process_group(0);

    let mut child = cmd.spawn()?;
    // The id is gone once the child is reaped; the group outlives it.
    let pgid = child.id();

    let stdout_handle = tokio::spawn(read_bounded(child.stdout.take(), max_output_bytes));
    let stderr_handle = tokio::spawn(read_bounded(child.stderr.take(), max_output_bytes));

    let (exit_code, timed_out) = match timeout(limit, child.wait()).await {
        Ok(Ok(status)) => {
            // Reap stragglers that share the group (backgrounded jobs).
            kill_group(pgid);
            (exit_code_of(status), false)
        }
        Ok(Err(e)) => {
            warn!(error = %e, "Process wait error");
            terminate(&mut child, pgid).await;
            (-1, false)
        }
        Err(_) => {
            debug!(limit_secs = limit.as_secs_f64(), "execution limit reached, terminating");
            terminate(&mut child, pgid).await;
            (-1, true)
        }
    };

    let stdout = join_reader(stdout_handle).await;
    let stderr = join_reader(stderr_handle).await;

    Ok(ExecutionResult {
        stdout: String::from_utf8_lossy(&stdout).into_owned(),
        stderr: String::from_utf8_lossy(&stderr).into_owned(),
        exit_code,
        timed_out,
    })
}

/// Drain a pipe, keeping at most `max` bytes.
///
/// Reading continues past the cap so a chatty child never blocks on a full pipe.
async fn read_bounded<R>(pipe: Option<R>, max: usize) -> Vec<u8>
where
    R: AsyncRead + Unpin,
{
    let Some(mut pipe) = pipe else {
        return Vec::new();
    };

    let mut kept = Vec::new();
    let mut buf = [0u8; 8192];
    loop {
        match pipe.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                let room = max.saturating_sub(kept.len());
                kept.extend_from_slice(&buf[..n.min(room)]);
            }
            Err(e) => {
                debug!(error = %e, "pipe read failed");
                break;
            }
        }
    }
    kept
}

async fn join_reader(mut handle: JoinHandle<Vec<u8>>) -> Vec<u8> {
    match timeout(READER_JOIN_TIMEOUT, &mut handle).await {
        Ok(Ok(bytes)) => bytes,
        Ok(Err(e)) => {
            warn!(error = %e, "output reader task failed");
            Vec::new()
        }
        Err(_) => {
            handle.abort();
            Vec::new()
        }
    }
}

fn exit_code_of(status: std::process::ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(sig) = status.signal() {
            return -sig;
        }
    }

    -1
}

/// True if some process still belongs to group `pgid`.
#[cfg(unix)]
fn group_alive(pgid: u32) -> bool {
    // SAFETY: signal 0 only checks for existence and permission.
    unsafe { libc::killpg(pgid as libc::pid_t, 0) == 0 }
}

/// Send SIGKILL to the child's process group.
///
/// An empty group is skipped: once the leader is reaped and no member is
/// left, the id is free for reuse by an unrelated group.
#[cfg(unix)]
fn kill_group(pgid: Option<u32>) {
    let Some(pid) = pgid else {
        return;
    };
    if !group_alive(pid) {
        debug!(pgid = pid, "process group already empty");
        return;
    }

    // SAFETY: killpg only takes plain integers; a group that emptied since
    // the check yields ESRCH, which is ignored.
    let rc = unsafe { libc::killpg(pid as libc::pid_t, libc::SIGKILL) };
    if rc == 0 {
        debug!(pgid = pid, "killed process group");
    }
}

#[cfg(not(unix))]
fn kill_group(_pgid: Option<u32>) {}

/// Kill the whole group, then the child itself, and reap it.
async fn terminate(child: &mut Child, pgid: Option<u32>) {
    kill_group(pgid);
    if let Err(e) = child.kill().await {
        debug!(error = %e, "child already exited");
    }
    let _ = child.wait().await;
}
