//! The image under test, built once and shared by every checklist item.
//!
//! Dropping a [`BuiltImage`] removes its tag, whatever happened to the
//! checks in between.

use std::path::Path;
use std::time::Duration;

use vvm_common::constants::BUILD_TAIL_LINES;

use crate::engine::ContainerEngine;
use crate::error::{HarnessError, Result};

/// A successfully built image, removed on drop.
pub struct BuiltImage<'e> {
    engine: &'e dyn ContainerEngine,
    tag: String,
    keep: bool,
}

impl<'e> BuiltImage<'e> {
    /// Builds `context` and tags the result `tag`.
    ///
    /// With `keep` set, the image is left in place on drop.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::BuildFailed`] with the build's stderr and the
    /// last lines of its stdout if the build exits non-zero, or
    /// [`HarnessError::Engine`] if the engine cannot run or times out.
    pub fn build(
        engine: &'e dyn ContainerEngine,
        context: &Path,
        tag: &str,
        timeout: Duration,
        keep: bool,
    ) -> Result<Self> {
        let output = engine.build(context, tag, timeout)?;
        if !output.success() {
            tracing::error!(%tag, exit_code = ?output.exit_code, "image build failed");
            return Err(HarnessError::BuildFailed {
                tag: tag.to_string(),
                stderr: output.stderr.clone(),
                tail: output.stdout_tail(BUILD_TAIL_LINES),
                tail_lines: BUILD_TAIL_LINES,
            });
        }
        tracing::info!(%tag, "image built");
        Ok(Self {
            engine,
            tag: tag.to_string(),
            keep,
        })
    }

    /// Tag of the built image.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }
}

impl Drop for BuiltImage<'_> {
    fn drop(&mut self) {
        if self.keep {
            tracing::info!(tag = %self.tag, "keeping image");
            return;
        }
        if let Err(e) = self.engine.remove_image(&self.tag) {
            tracing::warn!(tag = %self.tag, error = %e, "failed to remove image");
        }
    }
}
