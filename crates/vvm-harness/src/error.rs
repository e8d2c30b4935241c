//! Harness-specific failures.

use thiserror::Error;
use vvm_common::error::VvmError;

/// Errors raised while preparing the image under test.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// The engine ran the build and it exited non-zero.
    #[error("image build failed:\n{stderr}\nBuild output (last {tail_lines} lines):\n{tail}")]
    BuildFailed {
        /// Tag that was being built.
        tag: String,
        /// Everything the build wrote to standard error.
        stderr: String,
        /// Final lines of the build's standard output.
        tail: String,
        /// How many lines `tail` was cut to.
        tail_lines: usize,
    },

    /// The engine could not be invoked or did not finish in time.
    #[error(transparent)]
    Engine(#[from] VvmError),
}

/// Convenience alias for harness results.
pub type Result<T> = std::result::Result<T, HarnessError>;
