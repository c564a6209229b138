//! Runs compiled renderer commands and classifies their outcome.
use std::io::Read;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::core::command::CompiledCommand;
use crate::error::{Error, Result};
use crate::io::logging::LogSink;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Outcome of one finished renderer process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl ExecutionResult {
    /// Exit code 0 is the renderer's only success value.
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }

    pub fn into_exit_code(self) -> Result<i32> {
        if self.is_success() {
            Ok(self.exit_code)
        } else {
            Err(Error::RenderFailed {
                code: self.exit_code,
                message: format!("Error {}", self.exit_code),
            })
        }
    }
}

/// Blocking runner for compiled commands.
#[derive(Debug, Clone, Default)]
pub struct ProcessRunner {
    timeout: Option<Duration>,
}

impl ProcessRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Kill the renderer if it runs longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Spawns `command`, waits for it and captures its output.
    ///
    /// A nonzero exit is not an error here; see [`ProcessRunner::run`].
    pub fn execute(
        &self,
        command: &CompiledCommand,
        sink: Option<&dyn LogSink>,
    ) -> Result<ExecutionResult> {
        let line = command.to_string();
        if let Some(sink) = sink {
            sink.info(&format!("Command started: {}", line));
        }

        let mut child = Command::new(command.program())
            .args(command.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| Error::Spawn {
                program: command.program().to_path_buf(),
                source,
            })?;

        // Both pipes are drained concurrently so a chatty renderer cannot block on a full pipe.
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = match self.timeout {
            Some(limit) => wait_with_deadline(&mut child, limit)?,
            None => Some(child.wait()?),
        };

        let Some(status) = status else {
            // Grandchildren may still hold the pipes; the reader threads are left to finish
            // on their own.
            if let Some(sink) = sink {
                sink.info(&format!("Command timed out: {}", line));
            }
            return Err(Error::TimedOut {
                after: self.timeout.unwrap_or_default(),
            });
        };

        let stdout = collect(stdout);
        let stderr = collect(stderr);

        let result = ExecutionResult {
            exit_code: exit_code(status),
            stdout: stdout.text,
            stderr: stderr.text,
        };

        if let Some(sink) = sink {
            sink.info(&format!("Command ended: {}", line));
            if !result.stdout.is_empty() {
                sink.debug(&format!("STDOUT: {}", result.stdout));
            }
            if let Some(err) = &stdout.error {
                sink.debug(&format!("STDOUT read error: {}", err));
            }
            if !result.stderr.is_empty() {
                sink.debug(&format!("STDERR: {}", result.stderr));
            }
            if let Some(err) = &stderr.error {
                sink.debug(&format!("STDERR read error: {}", err));
            }
            sink.debug(&format!("Return code: {}", result.exit_code));
        }

        Ok(result)
    }

    /// Executes `command` and turns a nonzero exit into [`Error::RenderFailed`].
    pub fn run(&self, command: &CompiledCommand, sink: Option<&dyn LogSink>) -> Result<i32> {
        self.execute(command, sink)?.into_exit_code()
    }
}

/// Output read from one pipe; `error` is set when reading stopped early.
#[derive(Debug, Default)]
struct Captured {
    text: String,
    error: Option<String>,
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<Captured> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        let error = match pipe {
            Some(mut pipe) => pipe.read_to_end(&mut buf).err().map(|e| e.to_string()),
            None => None,
        };
        Captured {
            text: String::from_utf8_lossy(&buf).into_owned(),
            error,
        }
    })
}

fn collect(handle: JoinHandle<Captured>) -> Captured {
    handle.join().unwrap_or_else(|_| Captured {
        text: String::new(),
        error: Some("reader thread panicked".to_string()),
    })
}

/// `None` when the deadline passed and the child was killed.
fn wait_with_deadline(child: &mut Child, limit: Duration) -> Result<Option<ExitStatus>> {
    let started = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        let elapsed = started.elapsed();
        if elapsed >= limit {
            // The child may exit between try_wait and kill.
            let _ = child.kill();
            child.wait()?;
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL.min(limit - elapsed));
    }
}

/// Signal terminations map to the negated signal number.
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }
    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }
    -1
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::core::job::RenderJob;
    use crate::io::logging::MemorySink;
    use crate::types::OptionSet;
    use std::path::{Path, PathBuf};
    use std::{fs, os::unix::fs::PermissionsExt};
    use tempfile::TempDir;

    fn script(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, format!("#!/bin/sh\n{}", body)).expect("write script");
        let mut perms = fs::metadata(&path).expect("metadata").permissions();
        perms.set_mode(0o755);
        fs::set_permissions(&path, perms).expect("set perms");
        path
    }

    fn command_for(program: &Path) -> CompiledCommand {
        let mut job = RenderJob::new();
        job.add_page("report.html", OptionSet::new().with("--zoom", "1.5"));
        job.set_output("out file.pdf");
        job.compile(program)
    }

    #[test]
    fn passes_arguments_as_a_vector() {
        let dir = TempDir::new().expect("temp dir");
        let args_path = dir.path().join("args.log");
        let program = script(
            dir.path(),
            "fake-renderer",
            &format!(
                "for a in \"$@\"; do echo \"$a\" >> \"{}\"; done\n",
                args_path.display()
            ),
        );

        let result = ProcessRunner::new()
            .execute(&command_for(&program), None)
            .expect("runs");
        assert!(result.is_success());

        let args = fs::read_to_string(&args_path).expect("read args");
        assert_eq!(
            args.lines().collect::<Vec<_>>(),
            vec!["--quiet", "page", "report.html", "--zoom", "1.5", "out file.pdf"]
        );
    }

    #[test]
    fn nonzero_exit_becomes_render_failed() {
        let dir = TempDir::new().expect("temp dir");
        let program = script(dir.path(), "failing", "echo boom >&2\nexit 1\n");

        let err = ProcessRunner::new()
            .run(&command_for(&program), None)
            .expect_err("expected failure");
        match err {
            Error::RenderFailed { code, message } => {
                assert_eq!(code, 1);
                assert_eq!(message, "Error 1");
            }
            other => panic!("unexpected error variant: {other:?}"),
        }
    }

    #[test]
    fn zero_exit_returns_zero() {
        let dir = TempDir::new().expect("temp dir");
        let program = script(dir.path(), "ok", "exit 0\n");
        let code = ProcessRunner::new()
            .run(&command_for(&program), None)
            .expect("success");
        assert_eq!(code, 0);
    }

    #[test]
    fn logs_after_termination_in_order() {
        let dir = TempDir::new().expect("temp dir");
        let program = script(dir.path(), "chatty", "echo out\necho err >&2\nexit 3\n");
        let sink = MemorySink::new();
        let command = command_for(&program);

        let result = ProcessRunner::new()
            .execute(&command, Some(&sink))
            .expect("runs");
        assert_eq!(result.exit_code, 3);

        let line = command.to_string();
        assert_eq!(
            sink.messages(),
            vec![
                format!("Command started: {}", line),
                format!("Command ended: {}", line),
                "STDOUT: out\n".to_string(),
                "STDERR: err\n".to_string(),
                "Return code: 3".to_string(),
            ]
        );
    }

    #[test]
    fn empty_output_is_not_logged() {
        let dir = TempDir::new().expect("temp dir");
        let program = script(dir.path(), "silent", "exit 0\n");
        let sink = MemorySink::new();
        ProcessRunner::new()
            .execute(&command_for(&program), Some(&sink))
            .expect("runs");

        let messages = sink.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[2], "Return code: 0");
    }

    #[test]
    fn signal_termination_is_negative() {
        let dir = TempDir::new().expect("temp dir");
        let program = script(dir.path(), "killed", "kill -9 $$\n");
        let result = ProcessRunner::new()
            .execute(&command_for(&program), None)
            .expect("runs");
        assert_eq!(result.exit_code, -9);
        assert!(result.into_exit_code().is_err());
    }

    #[test]
    fn timeout_kills_the_renderer() {
        let dir = TempDir::new().expect("temp dir");
        let program = script(dir.path(), "slow", "exec sleep 10\n");
        let started = Instant::now();
        let err = ProcessRunner::new()
            .with_timeout(Duration::from_millis(200))
            .run(&command_for(&program), None)
            .expect_err("expected timeout");
        assert!(matches!(err, Error::TimedOut { .. }));
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn timeout_does_not_wait_for_grandchildren() {
        let dir = TempDir::new().expect("temp dir");
        let program = script(dir.path(), "forking", "sleep 6\n");
        let sink = MemorySink::new();
        let started = Instant::now();
        let err = ProcessRunner::new()
            .with_timeout(Duration::from_millis(200))
            .run(&command_for(&program), Some(&sink))
            .expect_err("expected timeout");
        assert!(matches!(err, Error::TimedOut { .. }));
        assert!(
            started.elapsed() < Duration::from_secs(3),
            "returned after {:?}",
            started.elapsed()
        );
        assert!(sink.messages()[1].starts_with("Command timed out: "));
    }

    #[test]
    fn captured_pipe_keeps_read_errors() {
        struct Failing;
        impl Read for Failing {
            fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("pipe gone"))
            }
        }

        let captured = collect(drain(Some(Failing)));
        assert!(captured.text.is_empty());
        assert_eq!(captured.error.as_deref(), Some("pipe gone"));

        let captured = collect(drain(Some(&b"partial"[..])));
        assert_eq!(captured.text, "partial");
        assert!(captured.error.is_none());
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let dir = TempDir::new().expect("temp dir");
        let err = ProcessRunner::new()
            .run(&command_for(&dir.path().join("absent")), None)
            .expect_err("expected spawn failure");
        assert!(matches!(err, Error::Spawn { .. }));
    }
}
