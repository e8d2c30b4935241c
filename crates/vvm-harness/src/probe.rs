//! Engine reachability probe.
//!
//! Missing binary and timeout mean "unavailable"; every other outcome,
//! including a non-zero exit from `info`, counts as available.

use std::fmt;
use std::time::Duration;

use serde::Serialize;
use vvm_common::error::VvmError;

use crate::engine::ContainerEngine;

/// Whether the container engine can be used for this run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Availability {
    /// The engine answered (or failed in a way the build will surface).
    Available,
    /// The engine binary is not installed.
    NotFound {
        /// Engine that was looked up.
        engine: String,
    },
    /// The engine did not answer within the probe timeout.
    TimedOut {
        /// Engine that was queried.
        engine: String,
        /// Seconds waited.
        timeout_secs: u64,
    },
}

impl Availability {
    /// Whether checks that need the engine should run.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        matches!(self, Self::Available)
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Available => f.write_str("available"),
            Self::NotFound { engine } => write!(f, "{engine} not found"),
            Self::TimedOut {
                engine,
                timeout_secs,
            } => write!(f, "{engine} did not respond within {timeout_secs}s"),
        }
    }
}

/// Asks the engine whether it is alive.
pub fn probe(engine: &dyn ContainerEngine, timeout: Duration) -> Availability {
    match engine.info(timeout) {
        Err(VvmError::NotFound { .. }) => {
            tracing::info!(engine = engine.name(), "container engine not found");
            Availability::NotFound {
                engine: engine.name().to_string(),
            }
        }
        Err(VvmError::Timeout { .. }) => {
            tracing::info!(engine = engine.name(), "container engine probe timed out");
            Availability::TimedOut {
                engine: engine.name().to_string(),
                timeout_secs: timeout.as_secs(),
            }
        }
        Err(e) => {
            tracing::warn!(engine = engine.name(), error = %e, "probe failed; treating engine as available");
            Availability::Available
        }
        Ok(output) => {
            if !output.success() {
                tracing::warn!(
                    engine = engine.name(),
                    exit_code = ?output.exit_code,
                    "engine info exited non-zero; treating engine as available"
                );
            }
            Availability::Available
        }
    }
}
