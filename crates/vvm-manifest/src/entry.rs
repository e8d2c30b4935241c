//! Typed manifest entries.

use serde::Serialize;
use vvm_common::types::InstallMethod;

use crate::remote::GitRemote;

/// One repository from a manifest that passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestEntry {
    /// Unique, whitespace-free repository name.
    pub name: String,
    /// SSH git remote the repository is cloned from.
    pub url: String,
    /// Branch or ref checked out after cloning.
    pub branch: String,
    /// How the repository's install script is invoked.
    pub install_method: InstallMethod,
    /// 1-based line number in the manifest.
    pub line: usize,
}

impl ManifestEntry {
    /// Parsed form of [`Self::url`].
    ///
    /// Returns `None` only for entries that were not produced by
    /// validation.
    #[must_use]
    pub fn remote(&self) -> Option<GitRemote> {
        GitRemote::parse(&self.url).ok()
    }
}
