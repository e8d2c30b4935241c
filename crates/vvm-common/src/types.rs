//! Domain primitive types used across the VVM workspace.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How a manifest repository's install script is invoked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstallMethod {
    /// Native C build followed by a pip install.
    CAndPip,
    /// Pip install without resolving dependencies.
    PipNoDeps,
    /// Editable (source) pip install.
    PipEditable,
    /// Only the repository's scripts are put on the path.
    ScriptsOnly,
    /// Cloned for reference; nothing is installed.
    Reference,
}

impl InstallMethod {
    /// Every recognized install method, in documentation order.
    pub const ALL: [Self; 5] = [
        Self::CAndPip,
        Self::PipNoDeps,
        Self::PipEditable,
        Self::ScriptsOnly,
        Self::Reference,
    ];

    /// Returns the manifest tag for this method.
    #[must_use]
    pub const fn as_tag(self) -> &'static str {
        match self {
            Self::CAndPip => "c_and_pip",
            Self::PipNoDeps => "pip_no_deps",
            Self::PipEditable => "pip_editable",
            Self::ScriptsOnly => "scripts_only",
            Self::Reference => "reference",
        }
    }

    /// Comma-separated list of the accepted tags, for diagnostics.
    #[must_use]
    pub fn valid_tags() -> String {
        Self::ALL
            .iter()
            .map(|m| m.as_tag())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for InstallMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_tag())
    }
}

/// Error returned when a tag is not a recognized install method.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid install method '{0}' (valid: {valid})", valid = InstallMethod::valid_tags())]
pub struct UnknownInstallMethod(pub String);

impl FromStr for InstallMethod {
    type Err = UnknownInstallMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_tag() == s)
            .ok_or_else(|| UnknownInstallMethod(s.to_string()))
    }
}
