//! Bounded-lifetime process execution
//!
//! Runs one build command in a working directory, merges stdout and stderr
//! into a single buffer, and kills the whole process group when the
//! wall-clock limit expires.
//!
//! The buffer is owned by a single read loop. Reader tasks forward chunks
//! over a channel and a watchdog task cancels a [`CancellationToken`] at the
//! deadline, so the loop alone decides when the output is final.

use crate::runner::command::CommandSpec;
use crate::runner::error::{RunnerError, RunnerResult};
use std::io;
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Size of a single read from a child pipe
const READ_CHUNK_BYTES: usize = 8 * 1024;

/// Chunks buffered between the reader tasks and the read loop
const CHANNEL_CAPACITY: usize = 64;

/// How long to keep reading after the build exits. Grandchildren that
/// inherited the pipes can otherwise hold them open indefinitely.
const OUTPUT_DRAIN_GRACE: Duration = Duration::from_secs(2);

/// How long to keep forwarding output once the process group is killed
const KILL_DRAIN_GRACE: Duration = Duration::from_millis(500);

type Chunk = io::Result<Vec<u8>>;

/// Outcome of one build process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    /// Exit code; `None` when the process was killed
    pub exit_code: Option<i32>,
    /// Combined stdout and stderr, lossily decoded as UTF-8
    pub output: String,
    /// True when the watchdog killed the process
    pub timed_out: bool,
    /// Wall-clock time from spawn to completion
    pub duration: Duration,
}

impl ExecutionResult {
    /// Exited on its own with status zero
    pub fn exited_cleanly(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }
}

/// How the read loop ended
enum Collected {
    Exited(ExitStatus),
    TimedOut,
}

/// Spawns build processes under a deadline.
///
/// Holds no per-run state; a single runner can drive many concurrent builds.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner;

impl ProcessRunner {
    pub fn new() -> Self {
        Self
    }

    /// Run `command` in `working_dir`, killing it after `timeout`.
    ///
    /// Directory and executable problems are reported as errors before any
    /// output exists. A timeout is not an error: the result carries
    /// `timed_out = true` and the output captured up to the kill.
    pub async fn run(
        &self,
        command: &CommandSpec,
        working_dir: &Path,
        timeout: Duration,
    ) -> RunnerResult<ExecutionResult> {
        if timeout.is_zero() {
            return Err(RunnerError::InvalidTimeout);
        }
        check_working_dir(working_dir).await?;

        tracing::debug!(
            command = %command,
            working_dir = %working_dir.display(),
            timeout_secs = timeout.as_secs(),
            "Spawning build process"
        );

        let start = Instant::now();
        let mut child = spawn(command, working_dir)?;
        // Still needed for the group kill after the child itself is reaped
        let pid = child.id();

        let (tx, mut rx) = mpsc::channel::<Chunk>(CHANNEL_CAPACITY);
        let mut readers: Vec<JoinHandle<()>> = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            readers.push(tokio::spawn(forward(stdout, tx.clone())));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(tokio::spawn(forward(stderr, tx.clone())));
        }
        drop(tx);

        let cancel = CancellationToken::new();
        let watchdog = spawn_watchdog(cancel.clone(), timeout);

        let mut buffer = Vec::new();
        let collected = collect(&mut child, &mut rx, &cancel, &mut buffer).await;
        watchdog.abort();

        let result = match collected {
            Ok(Collected::Exited(status)) => Ok(ExecutionResult {
                exit_code: status.code(),
                output: String::from_utf8_lossy(&buffer).into_owned(),
                timed_out: false,
                duration: start.elapsed(),
            }),
            Ok(Collected::TimedOut) => {
                tracing::warn!(
                    command = %command,
                    timeout_secs = timeout.as_secs(),
                    "Build timed out; killing process group"
                );
                terminate(&mut child, pid).await;
                drain_after_kill(&mut rx, &mut buffer, KILL_DRAIN_GRACE).await;
                Ok(ExecutionResult {
                    exit_code: None,
                    output: String::from_utf8_lossy(&buffer).into_owned(),
                    timed_out: true,
                    duration: start.elapsed(),
                })
            }
            Err(e) => {
                tracing::error!(command = %command, error = %e, "Failed while reading build output");
                terminate(&mut child, pid).await;
                Err(e)
            }
        };

        for reader in &readers {
            reader.abort();
        }

        if let Ok(ref execution) = result {
            tracing::info!(
                exit_code = ?execution.exit_code,
                timed_out = execution.timed_out,
                clean = execution.exited_cleanly(),
                duration_ms = execution.duration.as_millis() as u64,
                output_bytes = execution.output.len(),
                "Build process finished"
            );
        }
        result
    }
}

async fn check_working_dir(dir: &Path) -> RunnerResult<()> {
    match tokio::fs::metadata(dir).await {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(RunnerError::NotADirectory {
            path: dir.to_path_buf(),
        }),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Err(RunnerError::DirectoryNotFound {
            path: dir.to_path_buf(),
        }),
        Err(e) => Err(RunnerError::Io(e)),
    }
}

fn spawn(command: &CommandSpec, working_dir: &Path) -> RunnerResult<Child> {
    let mut cmd = Command::new(&command.program);
    cmd.args(&command.args)
        .current_dir(working_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    // Own process group: the kill on timeout reaches everything the build
    // tool spawned (compilers, MSBuild nodes).
    #[cfg(unix)]
    cmd.process_group(0);

    cmd.spawn().map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => RunnerError::ToolNotFound {
            program: command.program.clone(),
        },
        _ => RunnerError::Spawn {
            program: command.program.clone(),
            source: e,
        },
    })
}

/// Pump one pipe into the channel until EOF or the receiver goes away.
async fn forward<R>(mut reader: R, tx: mpsc::Sender<Chunk>)
where
    R: AsyncRead + Unpin,
{
    let mut chunk = vec![0u8; READ_CHUNK_BYTES];
    loop {
        match reader.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => {
                if tx.send(Ok(chunk[..n].to_vec())).await.is_err() {
                    break;
                }
            }
            Err(e) => {
                let _ = tx.send(Err(e)).await;
                break;
            }
        }
    }
}

fn spawn_watchdog(cancel: CancellationToken, timeout: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(timeout).await;
        cancel.cancel();
    })
}

/// Read until the process has exited and both pipes are closed, or until
/// the watchdog fires.
async fn collect(
    child: &mut Child,
    rx: &mut mpsc::Receiver<Chunk>,
    cancel: &CancellationToken,
    buffer: &mut Vec<u8>,
) -> RunnerResult<Collected> {
    let mut exit_status: Option<ExitStatus> = None;
    let mut streams_open = true;
    let mut drain_deadline = Instant::now();

    loop {
        if let (Some(status), false) = (exit_status, streams_open) {
            return Ok(Collected::Exited(status));
        }

        tokio::select! {
            biased;

            // A process that already exited keeps its status even when the
            // deadline lands inside the output grace period.
            _ = cancel.cancelled() => {
                return Ok(match exit_status {
                    Some(status) => Collected::Exited(status),
                    None => Collected::TimedOut,
                });
            }

            chunk = rx.recv(), if streams_open => match chunk {
                Some(Ok(bytes)) => buffer.extend_from_slice(&bytes),
                Some(Err(e)) => return Err(RunnerError::Io(e)),
                None => streams_open = false,
            },

            status = child.wait(), if exit_status.is_none() => {
                exit_status = Some(status?);
                drain_deadline = Instant::now() + OUTPUT_DRAIN_GRACE;
            }

            _ = tokio::time::sleep_until(drain_deadline), if exit_status.is_some() && streams_open => {
                tracing::warn!("Build exited but its output pipes stayed open; finishing without them");
                if let Some(status) = exit_status {
                    return Ok(Collected::Exited(status));
                }
            }
        }
    }
}

/// Forward what the readers still deliver after a kill. The pipes close once
/// every process in the group is gone; `grace` bounds the wait when they don't.
async fn drain_after_kill(rx: &mut mpsc::Receiver<Chunk>, buffer: &mut Vec<u8>, grace: Duration) {
    let drained = tokio::time::timeout(grace, async {
        while let Some(chunk) = rx.recv().await {
            if let Ok(bytes) = chunk {
                buffer.extend_from_slice(&bytes);
            }
        }
    })
    .await;
    if drained.is_err() {
        tracing::debug!("Output pipes still open after kill; keeping what was read");
    }
}

/// Single forced termination step, then reap.
async fn terminate(child: &mut Child, pid: Option<u32>) {
    kill_process_tree(child, pid);
    if let Err(e) = child.wait().await {
        tracing::warn!(error = %e, "Failed to reap killed build process");
    }
}

#[cfg(unix)]
fn kill_process_tree(child: &mut Child, pid: Option<u32>) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    if let Some(pid) = pid {
        match killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
            Ok(()) => return,
            Err(e) => tracing::warn!(pid, error = %e, "killpg failed; killing build process only"),
        }
    }
    if let Err(e) = child.start_kill() {
        tracing::warn!(error = %e, "Failed to kill build process");
    }
}

#[cfg(not(unix))]
fn kill_process_tree(child: &mut Child, _pid: Option<u32>) {
    if let Err(e) = child.start_kill() {
        tracing::warn!(error = %e, "Failed to kill build process");
    }
}
