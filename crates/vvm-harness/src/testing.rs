//! In-memory engine for exercising the harness without a daemon.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use vvm_common::error::{Result, VvmError};

use crate::engine::ContainerEngine;
use crate::process::CommandOutput;

/// What `info` does.
#[derive(Debug, Clone, Default)]
pub enum InfoBehavior {
    #[default]
    Ok,
    ExitNonZero,
    NotFound,
    Timeout,
    SpawnFailure,
}

/// What `build` does.
#[derive(Debug, Clone, Default)]
pub enum BuildBehavior {
    #[default]
    Ok,
    Fail { stdout: String, stderr: String },
    Timeout,
}

/// What `run` does for one command.
#[derive(Debug, Clone)]
pub enum RunBehavior {
    Exit { code: i32, stdout: String, stderr: String },
    Timeout,
}

impl RunBehavior {
    pub fn ok(stdout: &str) -> Self {
        Self::Exit {
            code: 0,
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn fail(code: i32, stderr: &str) -> Self {
        Self::Exit {
            code,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }
}

fn timeout(timeout: Duration) -> VvmError {
    VvmError::Timeout {
        program: "fake".into(),
        timeout,
    }
}

/// Records every call; commands without a scripted response succeed with
/// empty output.
#[derive(Debug, Default)]
pub struct FakeEngine {
    pub info: InfoBehavior,
    pub build: BuildBehavior,
    pub runs: HashMap<String, RunBehavior>,
    pub calls: RefCell<Vec<String>>,
    /// Raised after the first `run`, as a Ctrl-C would.
    pub interrupt_on_run: Option<Arc<AtomicBool>>,
}

impl FakeEngine {
    pub fn with_run(mut self, command: &str, behavior: RunBehavior) -> Self {
        let _ = self.runs.insert(command.to_string(), behavior);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }
}

impl ContainerEngine for FakeEngine {
    fn name(&self) -> &str {
        "fake"
    }

    fn info(&self, t: Duration) -> Result<CommandOutput> {
        self.record("info".into());
        match self.info {
            InfoBehavior::Ok => Ok(CommandOutput {
                exit_code: Some(0),
                ..CommandOutput::default()
            }),
            InfoBehavior::ExitNonZero => Ok(CommandOutput {
                exit_code: Some(1),
                stderr: "Cannot connect to the Docker daemon".into(),
                ..CommandOutput::default()
            }),
            InfoBehavior::NotFound => Err(VvmError::NotFound {
                kind: "container engine",
                id: "fake".into(),
            }),
            InfoBehavior::Timeout => Err(timeout(t)),
            InfoBehavior::SpawnFailure => Err(VvmError::Process {
                program: "fake".into(),
                source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
            }),
        }
    }

    fn build(&self, context: &Path, tag: &str, t: Duration) -> Result<CommandOutput> {
        self.record(format!("build {tag} {}", context.display()));
        match &self.build {
            BuildBehavior::Ok => Ok(CommandOutput {
                exit_code: Some(0),
                ..CommandOutput::default()
            }),
            BuildBehavior::Fail { stdout, stderr } => Ok(CommandOutput {
                stdout: stdout.clone(),
                stderr: stderr.clone(),
                exit_code: Some(1),
            }),
            BuildBehavior::Timeout => Err(timeout(t)),
        }
    }

    fn run(&self, _tag: &str, container: &str, command: &str, t: Duration) -> Result<CommandOutput> {
        self.record(format!("run {container} {command}"));
        if let Some(flag) = &self.interrupt_on_run {
            flag.store(true, Ordering::SeqCst);
        }
        match self.runs.get(command) {
            None => Ok(CommandOutput {
                exit_code: Some(0),
                ..CommandOutput::default()
            }),
            Some(RunBehavior::Exit {
                code,
                stdout,
                stderr,
            }) => Ok(CommandOutput {
                stdout: stdout.clone(),
                stderr: stderr.clone(),
                exit_code: Some(*code),
            }),
            Some(RunBehavior::Timeout) => Err(timeout(t)),
        }
    }

    fn remove_image(&self, tag: &str) -> Result<()> {
        self.record(format!("rmi {tag}"));
        Ok(())
    }

    fn force_remove_container(&self, container: &str) -> Result<()> {
        self.record(format!("rm {container}"));
        Ok(())
    }
}
