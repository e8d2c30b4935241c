//! # vvm-harness
//!
//! Acceptance harness for the VVM container image.
//!
//! Handles:
//! - **Process**: blocking external commands with a hard timeout.
//! - **Engine**: the [`engine::ContainerEngine`] seam and its CLI implementation.
//! - **Probe**: deciding once whether the engine is reachable.
//! - **Fixture**: building the image once and removing it afterwards.
//! - **Checklist**: the commands run inside fresh containers.
//! - **Suite**: tying the above into a single pass/fail/skip report.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used, clippy::panic))]

pub mod checklist;
pub mod engine;
pub mod error;
pub mod fixture;
pub mod probe;
pub mod process;
pub mod suite;

#[cfg(test)]
mod testing;

pub use engine::{ContainerEngine, EngineCli};
pub use probe::{Availability, probe};
pub use suite::{AcceptanceSuite, Outcome, SuiteReport, SuiteSetup};
