//! Configuration model for the image acceptance harness.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants;
use crate::error::{Result, VvmError};

/// Settings for one acceptance run.
///
/// Every field has a default, so a YAML file only needs to name the values
/// it overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HarnessConfig {
    /// Container engine binary (`docker`, `podman`, or a full path).
    pub engine: String,
    /// Build context handed to the engine; the repository root.
    pub context: PathBuf,
    /// Tag applied to the built image.
    pub image_tag: String,
    /// Seconds allowed for the reachability probe.
    pub probe_timeout_secs: u64,
    /// Seconds allowed for the image build.
    pub build_timeout_secs: u64,
    /// Seconds allowed for each checklist command.
    pub check_timeout_secs: u64,
    /// Leave the built image in place after the run.
    pub keep_image: bool,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            engine: constants::DEFAULT_ENGINE.to_string(),
            context: PathBuf::from("."),
            image_tag: constants::DEFAULT_IMAGE_TAG.to_string(),
            probe_timeout_secs: constants::PROBE_TIMEOUT.as_secs(),
            build_timeout_secs: constants::BUILD_TIMEOUT.as_secs(),
            check_timeout_secs: constants::CHECK_TIMEOUT.as_secs(),
            keep_image: false,
        }
    }
}

impl HarnessConfig {
    /// Loads a configuration from a YAML file, filling unspecified fields
    /// with defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid YAML, or
    /// holds invalid values.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| VvmError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = serde_yaml::from_str(&content).map_err(|e| VvmError::Yaml {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.validate()?;
        tracing::debug!(path = %path.display(), "loaded harness configuration");
        Ok(config)
    }

    /// Checks that the configured values are usable.
    ///
    /// # Errors
    ///
    /// Returns an error if a name is empty or a timeout is zero.
    pub fn validate(&self) -> Result<()> {
        if self.engine.trim().is_empty() {
            return Err(VvmError::Config {
                message: "engine must not be empty".into(),
            });
        }
        if self.image_tag.trim().is_empty() {
            return Err(VvmError::Config {
                message: "image_tag must not be empty".into(),
            });
        }
        for (name, secs) in [
            ("probe_timeout_secs", self.probe_timeout_secs),
            ("build_timeout_secs", self.build_timeout_secs),
            ("check_timeout_secs", self.check_timeout_secs),
        ] {
            if secs == 0 {
                return Err(VvmError::Config {
                    message: format!("{name} must be greater than zero"),
                });
            }
        }
        Ok(())
    }

    /// Path of the manifest inside the build context.
    #[must_use]
    pub fn manifest_path(&self) -> PathBuf {
        self.context.join(constants::MANIFEST_FILE)
    }

    /// Timeout for the reachability probe.
    #[must_use]
    pub const fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    /// Timeout for the image build.
    #[must_use]
    pub const fn build_timeout(&self) -> Duration {
        Duration::from_secs(self.build_timeout_secs)
    }

    /// Timeout for each checklist command.
    #[must_use]
    pub const fn check_timeout(&self) -> Duration {
        Duration::from_secs(self.check_timeout_secs)
    }
}
