//! # vvm-common
//!
//! Shared types, error definitions, configuration models, and constants
//! used across the VVM workspace.
//!
//! This crate is the leaf of the dependency graph. The manifest validator,
//! the acceptance harness and the CLI all build on it.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
