//! The acceptance run: probe once, build once, check many times.
//!
//! Availability is decided in [`AcceptanceSuite::prepare`] and handed to
//! [`AcceptanceSuite::run`] as a value. When the engine is unavailable every
//! item is skipped; when the build fails every item fails with the build
//! diagnostic; otherwise each item runs in its own container and succeeds
//! or fails on its own.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use vvm_common::config::HarnessConfig;
use vvm_common::constants::CONTAINER_NAME_PREFIX;
use vvm_common::error::VvmError;

use crate::checklist::{self, CheckItem};
use crate::engine::ContainerEngine;
use crate::fixture::BuiltImage;
use crate::probe::{self, Availability};

/// Result of a single checklist item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// Exit code zero and every expected substring present.
    Passed,
    /// The check ran (or could not run) and did not meet expectations.
    Failed {
        /// Diagnostic text.
        reason: String,
    },
    /// The check was not attempted.
    Skipped {
        /// Why it was not attempted.
        reason: String,
    },
}

/// What happened to the image build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BuildStatus {
    /// The image was built and tagged.
    Built,
    /// The build failed or timed out.
    Failed {
        /// Build diagnostic.
        message: String,
    },
    /// No build was attempted.
    Skipped,
}

/// A checklist item together with its outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    /// Item identifier.
    pub name: String,
    /// Command that was run.
    pub command: String,
    /// What happened.
    #[serde(flatten)]
    pub outcome: Outcome,
    /// Wall time spent on the item.
    pub duration_ms: u64,
}

/// Full report of one acceptance run.
#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run finished.
    pub finished_at: DateTime<Utc>,
    /// Engine that was used.
    pub engine: String,
    /// Tag of the image under test.
    pub image_tag: String,
    /// Probe result.
    pub availability: Availability,
    /// Image build result.
    pub build: BuildStatus,
    /// One entry per checklist item, in checklist order.
    pub checks: Vec<CheckResult>,
}

impl SuiteReport {
    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.checks.iter().filter(|c| pred(&c.outcome)).count()
    }

    /// Items that passed.
    #[must_use]
    pub fn passed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Passed))
    }

    /// Items that failed.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Failed { .. }))
    }

    /// Items that were skipped.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Skipped { .. }))
    }

    /// True when nothing failed. A fully skipped run is a success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed() == 0 && !matches!(self.build, BuildStatus::Failed { .. })
    }
}

/// Decisions taken once, before any item runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuiteSetup {
    /// Whether the engine can be used.
    pub availability: Availability,
}

/// Builds the image under test and runs a checklist against it.
pub struct AcceptanceSuite<'e> {
    engine: &'e dyn ContainerEngine,
    config: HarnessConfig,
    checklist: Vec<CheckItem>,
    interrupt: Arc<AtomicBool>,
}

impl<'e> AcceptanceSuite<'e> {
    /// Creates a suite with the default checklist, plus a manifest digest
    /// check when the build context has a manifest.
    #[must_use]
    pub fn new(engine: &'e dyn ContainerEngine, config: HarnessConfig) -> Self {
        let mut items = checklist::default_checklist();
        let manifest = config.manifest_path();
        if manifest.is_file() {
            match checklist::manifest_digest_check(&manifest) {
                Ok(item) => items.push(item),
                Err(e) => tracing::warn!(error = %e, "skipping manifest digest check"),
            }
        }
        Self {
            engine,
            config,
            checklist: items,
            interrupt: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Replaces the checklist.
    #[must_use]
    pub fn with_checklist(mut self, items: Vec<CheckItem>) -> Self {
        self.checklist = items;
        self
    }

    /// Uses `flag` to stop the run between items once it becomes true.
    #[must_use]
    pub fn with_interrupt(mut self, flag: Arc<AtomicBool>) -> Self {
        self.interrupt = flag;
        self
    }

    /// The items this suite will run.
    #[must_use]
    pub fn checklist(&self) -> &[CheckItem] {
        &self.checklist
    }

    /// Probes the engine. Call once per run.
    #[must_use]
    pub fn prepare(&self) -> SuiteSetup {
        let availability = probe::probe(self.engine, self.config.probe_timeout());
        tracing::info!(engine = self.engine.name(), %availability, "engine probe");
        SuiteSetup { availability }
    }

    /// Runs the suite with the decisions made in `setup`.
    #[must_use]
    pub fn run(&self, setup: &SuiteSetup) -> SuiteReport {
        let started_at = Utc::now();
        let (build, checks) = if setup.availability.is_available() {
            self.run_against_image()
        } else {
            let reason = format!("container engine unavailable: {}", setup.availability);
            tracing::info!(%reason, "skipping acceptance checks");
            (BuildStatus::Skipped, self.all_with(|| Outcome::Skipped {
                reason: reason.clone(),
            }))
        };

        SuiteReport {
            started_at,
            finished_at: Utc::now(),
            engine: self.engine.name().to_string(),
            image_tag: self.config.image_tag.clone(),
            availability: setup.availability.clone(),
            build,
            checks,
        }
    }

    fn all_with(&self, outcome: impl Fn() -> Outcome) -> Vec<CheckResult> {
        self.checklist
            .iter()
            .map(|item| CheckResult {
                name: item.name.clone(),
                command: item.command.clone(),
                outcome: outcome(),
                duration_ms: 0,
            })
            .collect()
    }

    fn interrupted(&self) -> bool {
        self.interrupt.load(Ordering::SeqCst)
    }

    fn run_against_image(&self) -> (BuildStatus, Vec<CheckResult>) {
        if self.interrupted() {
            tracing::info!("run interrupted before build");
            return (
                BuildStatus::Skipped,
                self.all_with(|| Outcome::Skipped {
                    reason: "run interrupted".into(),
                }),
            );
        }

        let image = match BuiltImage::build(
            self.engine,
            &self.config.context,
            &self.config.image_tag,
            self.config.build_timeout(),
            self.config.keep_image,
        ) {
            Ok(image) => image,
            Err(e) => {
                let message = e.to_string();
                let checks = self.all_with(|| Outcome::Failed {
                    reason: format!("image build failed: {message}"),
                });
                return (BuildStatus::Failed { message }, checks);
            }
        };

        let checks = self
            .checklist
            .iter()
            .map(|item| self.run_item(&image, item))
            .collect();
        (BuildStatus::Built, checks)
    }

    fn run_item(&self, image: &BuiltImage<'_>, item: &CheckItem) -> CheckResult {
        let started = Instant::now();
        let outcome = if self.interrupted() {
            Outcome::Skipped {
                reason: "run interrupted".into(),
            }
        } else {
            self.execute(image, item)
        };

        match &outcome {
            Outcome::Passed => tracing::info!(check = %item.name, "passed"),
            Outcome::Failed { reason } => tracing::error!(check = %item.name, %reason, "failed"),
            Outcome::Skipped { reason } => tracing::info!(check = %item.name, %reason, "skipped"),
        }

        CheckResult {
            name: item.name.clone(),
            command: item.command.clone(),
            outcome,
            duration_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        }
    }

    fn execute(&self, image: &BuiltImage<'_>, item: &CheckItem) -> Outcome {
        let container = format!("{CONTAINER_NAME_PREFIX}-{}", uuid::Uuid::new_v4());
        match self.engine.run(
            image.tag(),
            &container,
            &item.command,
            self.config.check_timeout(),
        ) {
            Ok(output) => match item.evaluate(&output) {
                Ok(()) => Outcome::Passed,
                Err(reason) => Outcome::Failed { reason },
            },
            Err(e) => {
                if matches!(e, VvmError::Timeout { .. }) {
                    if let Err(cleanup) = self.engine.force_remove_container(&container) {
                        tracing::warn!(%container, error = %cleanup, "failed to remove timed-out container");
                    }
                }
                Outcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }
}
