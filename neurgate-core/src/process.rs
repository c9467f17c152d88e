//! Process Runner
//!
//! Runs one external executable to completion or until its wall-clock budget
//! expires. A non-zero exit is an ordinary result; only a failure to spawn or
//! reap the child is an error.
//!
//! On Unix the child leads its own process group. When the budget expires the
//! whole group gets SIGTERM, a short grace period, then SIGKILL, so nothing the
//! child forked survives the timeout. The group is also killed once the leader
//! has been reaped, so a background descendant holding the output pipes cannot
//! keep the run alive past its exit.

use crate::model::ExecutionResult;
use std::ffi::OsStr;
use std::io::Read;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, warn};

/// Interval between `try_wait` polls
const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Time between SIGTERM and SIGKILL on timeout
const DEFAULT_KILL_GRACE: Duration = Duration::from_millis(200);

/// Errors that prevent a process result from being produced
#[derive(Debug, Error)]
pub enum ProcessError {
    /// No program was given
    #[error("empty command line")]
    EmptyCommand,

    /// The program could not be started
    #[error("failed to spawn `{program}`: {source}")]
    Spawn {
        /// Program that failed to start
        program: String,
        /// Underlying OS error
        #[source]
        source: std::io::Error,
    },

    /// The child could not be waited on
    #[error("failed to wait for `{program}`: {source}")]
    Wait {
        /// Program being waited on
        program: String,
        /// Underlying OS error
        #[source]
        source: std::io::Error,
    },
}

/// Runs external commands with a timeout and captured output
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    kill_grace: Duration,
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self {
            kill_grace: DEFAULT_KILL_GRACE,
        }
    }
}

impl ProcessRunner {
    /// Create a runner with the default termination grace period
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the delay between the polite and the forced termination signal
    pub fn with_kill_grace(mut self, grace: Duration) -> Self {
        self.kill_grace = grace;
        self
    }

    /// Run `command` (program followed by arguments) in `working_dir`.
    ///
    /// Returns once the child exits or `timeout` elapses. In the latter case the
    /// result has `timed_out = true` and whatever output was captured before
    /// termination.
    pub fn run<S: AsRef<OsStr>>(
        &self,
        command: &[S],
        working_dir: Option<&Path>,
        timeout: Duration,
    ) -> Result<ExecutionResult, ProcessError> {
        let (program, args) = command.split_first().ok_or(ProcessError::EmptyCommand)?;
        let program_name = program.as_ref().to_string_lossy().into_owned();

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = working_dir {
            cmd.current_dir(dir);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        debug!(
            command = %display_command(command),
            timeout_ms = timeout.as_millis() as u64,
            "spawning process"
        );

        let start = Instant::now();
        let mut child = cmd.spawn().map_err(|source| ProcessError::Spawn {
            program: program_name.clone(),
            source,
        })?;

        let child_id = child.id();
        let stdout_reader = spawn_reader(child.stdout.take());
        let stderr_reader = spawn_reader(child.stderr.take());

        let (status, timed_out) = self
            .wait_with_timeout(&mut child, timeout)
            .map_err(|source| ProcessError::Wait {
                program: program_name.clone(),
                source,
            })?;

        // Stragglers would otherwise hold the pipes open and block the readers
        kill_group(child_id);

        let stdout = join_reader(stdout_reader);
        let stderr = join_reader(stderr_reader);
        let elapsed = start.elapsed();
        let (exit_code, signal) = exit_code_of(status);

        if timed_out {
            warn!(
                program = %program_name,
                timeout_ms = timeout.as_millis() as u64,
                "process timed out and was terminated"
            );
        } else {
            debug!(
                program = %program_name,
                exit_code,
                elapsed_ms = elapsed.as_millis() as u64,
                "process finished"
            );
        }

        Ok(ExecutionResult {
            exit_code,
            signal,
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
            timed_out,
            elapsed,
        })
    }

    /// Poll the child until it exits or the deadline passes; terminate it on timeout.
    fn wait_with_timeout(
        &self,
        child: &mut Child,
        timeout: Duration,
    ) -> std::io::Result<(ExitStatus, bool)> {
        let deadline = Instant::now().checked_add(timeout);

        loop {
            if let Some(status) = child.try_wait()? {
                return Ok((status, false));
            }
            if deadline.is_some_and(|d| Instant::now() >= d) {
                terminate(child, self.kill_grace);
                let status = child.wait()?;
                return Ok((status, true));
            }
            std::thread::sleep(POLL_INTERVAL);
        }
    }
}

/// Render a command line for logs and messages
pub fn display_command<S: AsRef<OsStr>>(command: &[S]) -> String {
    command
        .iter()
        .map(|part| part.as_ref().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

fn spawn_reader<R>(pipe: Option<R>) -> Option<JoinHandle<Vec<u8>>>
where
    R: Read + Send + 'static,
{
    pipe.map(|mut pipe| {
        std::thread::spawn(move || {
            let mut buf = Vec::new();
            // Bytes read before an error stay in `buf`
            let _ = pipe.read_to_end(&mut buf);
            buf
        })
    })
}

fn join_reader(handle: Option<JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default()
}

fn exit_code_of(status: ExitStatus) -> (i32, Option<i32>) {
    #[cfg(unix)]
    let signal = {
        use std::os::unix::process::ExitStatusExt;
        status.signal()
    };
    #[cfg(not(unix))]
    let signal: Option<i32> = None;

    let code = match status.code() {
        Some(code) => code,
        None => signal.map(|s| 128 + s).unwrap_or(1),
    };
    (code, signal)
}

/// SIGTERM the child's process group, wait out the grace period, then SIGKILL it.
#[cfg(unix)]
fn terminate(child: &mut Child, grace: Duration) {
    let pgid = child.id() as libc::pid_t;

    if let Err(e) = signal_group(pgid, libc::SIGTERM) {
        debug!(pgid, error = %e, "SIGTERM to process group failed");
    }

    let deadline = Instant::now() + grace;
    while Instant::now() < deadline {
        if matches!(child.try_wait(), Ok(Some(_))) {
            break;
        }
        std::thread::sleep(POLL_INTERVAL);
    }

    kill_group(child.id());
}

#[cfg(not(unix))]
fn terminate(child: &mut Child, _grace: Duration) {
    if let Err(e) = child.kill() {
        debug!(error = %e, "kill after timeout failed");
    }
}

/// SIGKILL whatever is left of the group led by `leader`; an empty group is fine.
#[cfg(unix)]
fn kill_group(leader: u32) {
    let pgid = leader as libc::pid_t;
    if let Err(e) = signal_group(pgid, libc::SIGKILL) {
        if e.raw_os_error() != Some(libc::ESRCH) {
            warn!(pgid, error = %e, "SIGKILL to process group failed");
        }
    }
}

#[cfg(not(unix))]
fn kill_group(_leader: u32) {}

/// Send `signal` to every process in group `pgid`.
#[cfg(unix)]
fn signal_group(pgid: libc::pid_t, signal: libc::c_int) -> Result<(), std::io::Error> {
    let ret = unsafe { libc::kill(-pgid, signal) };
    if ret == -1 {
        Err(std::io::Error::last_os_error())
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_command_is_an_error() {
        let runner = ProcessRunner::new();
        let command: [&str; 0] = [];
        let err = runner
            .run(&command, None, Duration::from_secs(1))
            .unwrap_err();
        assert!(matches!(err, ProcessError::EmptyCommand));
    }

    #[test]
    fn test_missing_program_is_a_spawn_error() {
        let runner = ProcessRunner::new();
        let err = runner
            .run(
                &["/definitely/not/a/real/neurc"],
                None,
                Duration::from_secs(1),
            )
            .unwrap_err();
        match err {
            ProcessError::Spawn { program, .. } => {
                assert_eq!(program, "/definitely/not/a/real/neurc")
            }
            other => panic!("expected spawn error, got {other:?}"),
        }
    }

    #[test]
    fn test_display_command() {
        assert_eq!(
            display_command(&["neurc", "build", "a.nr"]),
            "neurc build a.nr"
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_captures_output_and_nonzero_exit() {
        let runner = ProcessRunner::new();
        let result = runner
            .run(
                &["sh", "-c", "echo out; echo err >&2; exit 3"],
                None,
                Duration::from_secs(10),
            )
            .unwrap();

        assert_eq!(result.exit_code, 3);
        assert_eq!(result.stdout, "out\n");
        assert_eq!(result.stderr, "err\n");
        assert!(!result.timed_out);
        assert!(!result.success());
    }

    #[cfg(unix)]
    #[test]
    fn test_runs_in_working_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("marker.txt"), "here").unwrap();

        let result = ProcessRunner::new()
            .run(
                &["sh", "-c", "cat marker.txt"],
                Some(dir.path()),
                Duration::from_secs(10),
            )
            .unwrap();

        assert!(result.success());
        assert_eq!(result.stdout, "here");
    }

    #[cfg(unix)]
    #[test]
    fn test_timeout_terminates_child() {
        let runner = ProcessRunner::new().with_kill_grace(Duration::from_millis(50));
        let start = Instant::now();
        let result = runner
            .run(
                &["sh", "-c", "echo started; sleep 30"],
                None,
                Duration::from_millis(300),
            )
            .unwrap();

        assert!(result.timed_out);
        assert!(!result.success());
        assert_eq!(result.stdout, "started\n");
        assert!(start.elapsed() < Duration::from_secs(10));
    }

    #[cfg(unix)]
    #[test]
    fn test_timeout_kills_whole_process_group() {
        // The background sleep inherits the pipes; if it survived, the reader
        // threads would block for 30 seconds.
        let runner = ProcessRunner::new().with_kill_grace(Duration::from_millis(50));
        let start = Instant::now();
        let result = runner
            .run(
                &["sh", "-c", "sleep 30 & sleep 30"],
                None,
                Duration::from_millis(300),
            )
            .unwrap();

        assert!(result.timed_out);
        assert!(start.elapsed() < Duration::from_secs(10));
    }

    #[cfg(unix)]
    #[test]
    fn test_background_descendant_does_not_outlive_leader() {
        // The leader exits at once but its background child keeps the pipes open
        let start = Instant::now();
        let result = ProcessRunner::new()
            .run(
                &["sh", "-c", "echo done; sleep 30 & exit 0"],
                None,
                Duration::from_millis(500),
            )
            .unwrap();

        assert!(!result.timed_out);
        assert_eq!(result.exit_code, 0);
        assert_eq!(result.stdout, "done\n");
        assert!(start.elapsed() < Duration::from_secs(10));
    }

    #[cfg(unix)]
    #[test]
    fn test_signal_exit_code_convention() {
        let result = ProcessRunner::new()
            .run(&["sh", "-c", "kill -9 $$"], None, Duration::from_secs(10))
            .unwrap();

        assert_eq!(result.signal, Some(9));
        assert_eq!(result.exit_code, 137);
        assert!(!result.timed_out);
    }
}
