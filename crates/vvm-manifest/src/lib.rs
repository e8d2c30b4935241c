//! # vvm-manifest
//!
//! Parser and validator for `repos.conf`, the pipe-delimited manifest that
//! lists the external repositories installed into the VVM image.
//!
//! Parsing is liberal and never fails on content: each data line becomes a
//! [`parser::RawEntry`] holding however many fields the line split into.
//! Every structural rule lives in [`validator`] as its own check, so a
//! caller can run them one at a time or all together through
//! [`validator::validate`].

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod entry;
pub mod parser;
pub mod remote;
pub mod validator;

pub use entry::ManifestEntry;
pub use parser::{LineTally, Manifest, RawEntry, parse};
pub use remote::GitRemote;
pub use validator::{Rule, ValidationReport, Violation, validate};
