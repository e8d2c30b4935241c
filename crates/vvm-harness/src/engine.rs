//! Container engine abstraction.
//!
//! The suite talks to the engine only through [`ContainerEngine`], so the
//! orchestration logic can be exercised without a running daemon.

use std::path::{Path, PathBuf};
use std::time::Duration;

use vvm_common::constants;
use vvm_common::error::{Result, VvmError};

use crate::process::{self, CommandOutput};

/// Operations the acceptance harness needs from a container engine.
pub trait ContainerEngine {
    /// Engine name used in logs and reports.
    fn name(&self) -> &str;

    /// Lightweight liveness query (`docker info`).
    ///
    /// # Errors
    ///
    /// Returns [`VvmError::NotFound`] if the engine binary is missing and
    /// [`VvmError::Timeout`] if it does not answer in time.
    fn info(&self, timeout: Duration) -> Result<CommandOutput>;

    /// Builds `context` into an image tagged `tag`.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot be invoked or times out. A
    /// failed build is reported through the exit code, not as an error.
    fn build(&self, context: &Path, tag: &str, timeout: Duration) -> Result<CommandOutput>;

    /// Runs `command` through `bash -c` in a fresh, auto-removed container
    /// named `container` with the image's entrypoint cleared.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot be invoked or times out.
    fn run(
        &self,
        tag: &str,
        container: &str,
        command: &str,
        timeout: Duration,
    ) -> Result<CommandOutput>;

    /// Removes the image tag.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot be invoked or refuses.
    fn remove_image(&self, tag: &str) -> Result<()>;

    /// Forcibly removes a container, running or not.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot be invoked or refuses.
    fn force_remove_container(&self, container: &str) -> Result<()>;
}

/// A Docker-compatible engine driven through its command-line client.
#[derive(Debug, Clone)]
pub struct EngineCli {
    program: String,
    housekeeping_timeout: Duration,
}

impl EngineCli {
    /// Creates an engine that invokes `program` (`docker`, `podman`, or a
    /// path).
    #[must_use]
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            housekeeping_timeout: constants::CHECK_TIMEOUT,
        }
    }

    /// Resolves the engine binary on `PATH`.
    #[must_use]
    pub fn locate(&self) -> Option<PathBuf> {
        which::which(&self.program).ok()
    }

    fn invoke(&self, args: &[&str], timeout: Duration) -> Result<CommandOutput> {
        process::run_with_timeout(&self.program, args, timeout)
    }

    fn invoke_checked(&self, args: &[&str]) -> Result<()> {
        let output = self.invoke(args, self.housekeeping_timeout)?;
        if output.success() {
            Ok(())
        } else {
            Err(VvmError::CommandFailed {
                program: self.program.clone(),
                args: args.join(" "),
                exit_code: output.exit_code,
                stderr: output.stderr.trim().to_string(),
            })
        }
    }
}

impl Default for EngineCli {
    fn default() -> Self {
        Self::new(constants::DEFAULT_ENGINE)
    }
}

impl ContainerEngine for EngineCli {
    fn name(&self) -> &str {
        &self.program
    }

    fn info(&self, timeout: Duration) -> Result<CommandOutput> {
        if self.locate().is_none() {
            return Err(VvmError::NotFound {
                kind: "container engine",
                id: self.program.clone(),
            });
        }
        self.invoke(&["info"], timeout)
    }

    fn build(&self, context: &Path, tag: &str, timeout: Duration) -> Result<CommandOutput> {
        let context = context.to_string_lossy();
        tracing::info!(engine = %self.program, %tag, %context, "building image");
        self.invoke(&["build", "-t", tag, &context], timeout)
    }

    fn run(
        &self,
        tag: &str,
        container: &str,
        command: &str,
        timeout: Duration,
    ) -> Result<CommandOutput> {
        tracing::debug!(engine = %self.program, %tag, container, command, "running check");
        self.invoke(
            &[
                "run",
                "--rm",
                "--name",
                container,
                "--entrypoint",
                "",
                tag,
                "bash",
                "-c",
                command,
            ],
            timeout,
        )
    }

    fn remove_image(&self, tag: &str) -> Result<()> {
        tracing::info!(engine = %self.program, %tag, "removing image");
        self.invoke_checked(&["rmi", "--force", tag])
    }

    fn force_remove_container(&self, container: &str) -> Result<()> {
        tracing::info!(engine = %self.program, container, "force-removing container");
        self.invoke_checked(&["rm", "--force", container])
    }
}
