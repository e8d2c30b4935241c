//! Unified error types for the VVM workspace.
//!
//! Higher-level crates define their own domain-specific error enums that
//! wrap these common variants when appropriate.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum VvmError {
    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// A required resource was not found.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Type of the missing resource.
        kind: &'static str,
        /// Identifier of the missing resource.
        id: String,
    },

    /// An external command exceeded its time budget and was killed.
    #[error("command `{program}` timed out after {}s", .timeout.as_secs())]
    Timeout {
        /// Program that was running.
        program: String,
        /// Budget that was exceeded.
        timeout: Duration,
    },

    /// An external command could not be spawned or awaited.
    #[error("failed to run `{program}`: {source}")]
    Process {
        /// Program that failed.
        program: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// An external command ran to completion but reported failure.
    #[error("`{program} {args}` failed ({}): {stderr}", exit_status(.exit_code.as_ref()))]
    CommandFailed {
        /// Program that was run.
        program: String,
        /// Arguments, space-joined.
        args: String,
        /// Exit code, or `None` if the process was ended by a signal.
        exit_code: Option<i32>,
        /// Trimmed standard error.
        stderr: String,
    },

    /// A YAML configuration file could not be decoded.
    #[error("YAML error in {path}: {source}")]
    Yaml {
        /// File being decoded.
        path: PathBuf,
        /// Underlying YAML error.
        source: serde_yaml::Error,
    },
}

fn exit_status(code: Option<&i32>) -> String {
    code.map_or_else(|| "killed by signal".to_string(), |c| format!("exit code {c}"))
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, VvmError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_failed_names_command_status_and_stderr() {
        let err = VvmError::CommandFailed {
            program: "docker".into(),
            args: "rmi --force vvm:test".into(),
            exit_code: Some(1),
            stderr: "No such image: vvm:test".into(),
        };
        assert_eq!(
            err.to_string(),
            "`docker rmi --force vvm:test` failed (exit code 1): No such image: vvm:test"
        );
    }

    #[test]
    fn command_failed_by_signal() {
        let err = VvmError::CommandFailed {
            program: "docker".into(),
            args: "rm --force c".into(),
            exit_code: None,
            stderr: String::new(),
        };
        assert!(err.to_string().contains("killed by signal"));
    }
}
