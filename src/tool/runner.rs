//! Process runner: spawn `sh -c`, pump stdin, capture stdout/stderr concurrently, honor cancellation.

use std::process::Stdio;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, Command};
use tokio_util::sync::CancellationToken;

use crate::tool::context::InvocationCtx;

/// Identity of one invocation. Sequential per engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InvocationId(pub u64);

impl std::fmt::Display for InvocationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invocation-{}", self.0)
    }
}

/// Completion state of an invocation. `Succeeded` means the process was
/// launched and its streams drained; a non-zero exit code is still
/// `Succeeded`; the router decides how to present it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationStatus {
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl std::fmt::Display for InvocationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Running => f.write_str("running"),
            Self::Succeeded => f.write_str("succeeded"),
            Self::Failed => f.write_str("failed"),
            Self::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// Runtime record of one process execution. Owned exclusively by the
/// runner while `Running`; the buffers only grow in that state. The value
/// returned by [`run`] is terminal and never mutated again.
#[derive(Debug, Clone)]
pub struct RunningInvocation {
    pub id: InvocationId,
    /// The resolved command, for user-facing messages.
    pub command: String,
    pub status: InvocationStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    pub exit_code: Option<i32>,
    /// Why the process could not be launched or communicated with.
    pub launch_error: Option<String>,
}

impl RunningInvocation {
    fn new(id: InvocationId, command: String) -> Self {
        Self {
            id,
            command,
            status: InvocationStatus::Running,
            stdout: Vec::new(),
            stderr: Vec::new(),
            exit_code: None,
            launch_error: None,
        }
    }

    /// Captured stdout as text (lossy UTF-8, nothing trimmed).
    pub fn stdout_text(&self) -> String {
        String::from_utf8_lossy(&self.stdout).into_owned()
    }

    /// Captured stderr as text (lossy UTF-8, nothing trimmed).
    pub fn stderr_text(&self) -> String {
        String::from_utf8_lossy(&self.stderr).into_owned()
    }
}

/// Run `command` through the system shell and wait for a terminal state.
///
/// Awaited inside a spawned task so the engine's caller never blocks.
/// `stdin_payload` is written fully and the stream closed; `None` closes
/// stdin immediately. Output streams are read concurrently and fully
/// buffered; nothing streams to the UI mid-run. Cancelling `cancel`
/// kills the child; the partial buffers survive, tagged `Cancelled`.
pub async fn run(
    id: InvocationId,
    command: String,
    stdin_payload: Option<Vec<u8>>,
    ctx: &InvocationCtx,
    cancel: CancellationToken,
) -> RunningInvocation {
    let mut invocation = RunningInvocation::new(id, command);

    let mut cmd = Command::new("sh");
    cmd.arg("-c").arg(&invocation.command);
    cmd.current_dir(&ctx.cwd);
    // Context exported to the child environment as well, so templates can
    // use plain shell expansion for the pass-through tokens.
    cmd.env("EDIT_CURRENT_DIRECTORY", &ctx.cwd);
    cmd.env("EDIT_WORKSPACE_ROOT", &ctx.workspace_root);
    if let Some(file) = &ctx.file {
        cmd.env("EDIT_CURRENT_FILENAME", file);
    }
    if let Some(line) = ctx.line {
        cmd.env("EDIT_CURRENT_LINE_NUMBER", line.to_string());
    }
    cmd.stdin(if stdin_payload.is_some() {
        Stdio::piped()
    } else {
        Stdio::null()
    });
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());
    cmd.kill_on_drop(true);
    // Own process group, so cancellation can signal pipeline members the
    // shell forked, not just the shell itself.
    #[cfg(unix)]
    cmd.process_group(0);

    let mut child = match cmd.spawn() {
        Ok(c) => c,
        Err(e) => {
            invocation.status = InvocationStatus::Failed;
            invocation.launch_error = Some(e.to_string());
            return invocation;
        }
    };

    // Drain both output streams on their own tasks so a chatty child
    // can't deadlock against a full pipe while we pump stdin.
    let stdout_task = child.stdout.take().map(|mut stream| {
        tokio::spawn(async move {
            let mut buf = Vec::new();
            let _ = stream.read_to_end(&mut buf).await;
            buf
        })
    });
    let stderr_task = child.stderr.take().map(|mut stream| {
        tokio::spawn(async move {
            let mut buf = Vec::new();
            let _ = stream.read_to_end(&mut buf).await;
            buf
        })
    });

    // The stdin pump runs inside the select: a child that never reads a
    // payload larger than the pipe buffer blocks write_all for its whole
    // lifetime, and a cancel must still land in that window.
    let waited = tokio::select! {
        status = async {
            if let Some(payload) = stdin_payload {
                if let Some(mut stdin) = child.stdin.take() {
                    // The child may exit without reading; a broken pipe
                    // here is the child's business, not a runner failure.
                    if let Err(e) = stdin.write_all(&payload).await {
                        eprintln!("tool runner: stdin write for {}: {}", id, e);
                    }
                    let _ = stdin.shutdown().await;
                }
            }
            child.wait().await
        } => Some(status),
        _ = cancel.cancelled() => None,
    };

    if waited.is_none() {
        // Output pipes close once the group is dead and the readers finish.
        kill_group(&mut child, id).await;
    }

    if let Some(task) = stdout_task {
        invocation.stdout = task.await.unwrap_or_default();
    }
    if let Some(task) = stderr_task {
        invocation.stderr = task.await.unwrap_or_default();
    }

    match waited {
        None => invocation.status = InvocationStatus::Cancelled,
        Some(Ok(status)) => {
            invocation.status = InvocationStatus::Succeeded;
            invocation.exit_code = status.code();
        }
        Some(Err(e)) => {
            invocation.status = InvocationStatus::Failed;
            invocation.launch_error = Some(format!("wait: {}", e));
        }
    }
    invocation
}

/// Kill the child's whole process group, then reap the shell.
async fn kill_group(child: &mut Child, id: InvocationId) {
    #[cfg(unix)]
    if let Some(pid) = child.id() {
        // SAFETY: the pid comes from the live Child handle; the negative
        // value addresses its process group.
        unsafe {
            libc::kill(-(pid as libc::pid_t), libc::SIGKILL);
        }
    }
    if let Err(e) = child.kill().await {
        eprintln!("tool runner: kill for {}: {}", id, e);
    }
}
