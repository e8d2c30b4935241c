//! Blocking execution of external commands under a time budget.
//!
//! Output goes to anonymous temporary files rather than pipes so a chatty
//! child (an image build) can never block on a full pipe while we poll.

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use vvm_common::error::{Result, VvmError};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Captured result of a finished command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Standard output, lossily decoded.
    pub stdout: String,
    /// Standard error, lossily decoded.
    pub stderr: String,
    /// Exit code, or `None` if the process was ended by a signal.
    pub exit_code: Option<i32>,
}

impl CommandOutput {
    /// Whether the process exited with status zero.
    #[must_use]
    pub const fn success(&self) -> bool {
        matches!(self.exit_code, Some(0))
    }

    /// The last `n` lines of standard output, newline-joined.
    #[must_use]
    pub fn stdout_tail(&self, n: usize) -> String {
        tail_lines(&self.stdout, n)
    }
}

/// Returns the last `n` lines of `text`.
#[must_use]
pub fn tail_lines(text: &str, n: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines.len().saturating_sub(n);
    lines[start..].join("\n")
}

fn process_err(program: &str) -> impl FnOnce(std::io::Error) -> VvmError + '_ {
    move |source| VvmError::Process {
        program: program.to_string(),
        source,
    }
}

fn read_capture(file: &mut File, program: &str) -> Result<String> {
    let mut buf = Vec::new();
    let _ = file.seek(SeekFrom::Start(0)).map_err(process_err(program))?;
    let _ = file.read_to_end(&mut buf).map_err(process_err(program))?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Runs `program` with `args`, waiting at most `timeout`.
///
/// # Errors
///
/// Returns [`VvmError::NotFound`] if the program does not exist,
/// [`VvmError::Timeout`] if it outlives `timeout` (the child is killed and
/// reaped first), and [`VvmError::Process`] for any other spawn or wait
/// failure. A non-zero exit is not an error.
pub fn run_with_timeout(program: &str, args: &[&str], timeout: Duration) -> Result<CommandOutput> {
    tracing::debug!(program, ?args, timeout_secs = timeout.as_secs(), "running command");

    let mut stdout_file = tempfile::tempfile().map_err(process_err(program))?;
    let mut stderr_file = tempfile::tempfile().map_err(process_err(program))?;

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::from(
            stdout_file.try_clone().map_err(process_err(program))?,
        ))
        .stderr(Stdio::from(
            stderr_file.try_clone().map_err(process_err(program))?,
        ))
        .spawn()
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                VvmError::NotFound {
                    kind: "program",
                    id: program.to_string(),
                }
            } else {
                process_err(program)(e)
            }
        })?;

    let started = Instant::now();
    let status = loop {
        match child.try_wait().map_err(process_err(program))? {
            Some(status) => break status,
            None if started.elapsed() >= timeout => {
                let _ = child.kill();
                let _ = child.wait();
                tracing::warn!(program, timeout_secs = timeout.as_secs(), "command timed out");
                return Err(VvmError::Timeout {
                    program: program.to_string(),
                    timeout,
                });
            }
            None => thread::sleep(POLL_INTERVAL),
        }
    };

    Ok(CommandOutput {
        stdout: read_capture(&mut stdout_file, program)?,
        stderr: read_capture(&mut stderr_file, program)?,
        exit_code: status.code(),
    })
}
