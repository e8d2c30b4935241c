//! The commands run inside the image and what their output must show.
//!
//! Items are independent of each other; each runs in its own container.

use std::path::Path;

use serde::Serialize;
use sha2::{Digest, Sha256};
use vvm_common::constants::{IMAGE_ENTRYPOINT, IMAGE_MANIFEST_PATH, IMAGE_WORKDIR, PYTHON_VERSION};
use vvm_common::error::{Result, VvmError};

use crate::process::CommandOutput;

/// Python packages the image must be able to import.
pub const REQUIRED_PACKAGES: [&str; 8] = [
    "numpy",
    "scipy",
    "matplotlib",
    "astropy",
    "h5py",
    "pandas",
    "pytest",
    "emcee",
];

/// Tools that must be on the image's `PATH`.
pub const REQUIRED_TOOLS: [&str; 4] = ["gcc", "make", "git", "valgrind"];

/// One command to run in a fresh container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckItem {
    /// Short identifier.
    pub name: String,
    /// Shell command passed to `bash -c`.
    pub command: String,
    /// Substrings that must all appear in standard output.
    pub expect_stdout: Vec<String>,
}

impl CheckItem {
    /// A check that only requires a zero exit code.
    #[must_use]
    pub fn new(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            expect_stdout: Vec::new(),
        }
    }

    /// Additionally requires `needle` in standard output.
    #[must_use]
    pub fn expecting(mut self, needle: impl Into<String>) -> Self {
        self.expect_stdout.push(needle.into());
        self
    }

    /// Judges a finished command.
    ///
    /// # Errors
    ///
    /// Returns the failure reason if the exit code is non-zero or an
    /// expected substring is missing.
    pub fn evaluate(&self, output: &CommandOutput) -> std::result::Result<(), String> {
        if !output.success() {
            let code = output
                .exit_code
                .map_or_else(|| "a signal".to_string(), |c| format!("code {c}"));
            return Err(format!(
                "`{}` exited with {code}:\n{}",
                self.command,
                output.stderr.trim_end()
            ));
        }
        if let Some(missing) = self
            .expect_stdout
            .iter()
            .find(|needle| !output.stdout.contains(needle.as_str()))
        {
            return Err(format!(
                "`{}` output does not contain '{missing}':\n{}",
                self.command,
                output.stdout.trim_end()
            ));
        }
        Ok(())
    }
}

/// The fixed battery of image checks.
#[must_use]
pub fn default_checklist() -> Vec<CheckItem> {
    let imports = REQUIRED_PACKAGES
        .iter()
        .map(|p| format!("import {p}"))
        .collect::<Vec<_>>()
        .join("; ");

    let mut items = vec![
        CheckItem::new("container_runs", "echo ok").expecting("ok"),
        CheckItem::new("python_version", "python --version").expecting(PYTHON_VERSION),
    ];
    items.extend(
        REQUIRED_TOOLS
            .iter()
            .map(|tool| CheckItem::new(format!("{tool}_available"), format!("{tool} --version"))),
    );
    items.extend([
        CheckItem::new("pip_packages_installed", format!("python -c '{imports}'")),
        CheckItem::new(
            "workspace_directory_exists",
            format!("test -d {IMAGE_WORKDIR} && echo ok"),
        )
        .expecting("ok"),
        CheckItem::new(
            "entrypoint_is_executable",
            format!("test -x {IMAGE_ENTRYPOINT} && echo ok"),
        )
        .expecting("ok"),
        CheckItem::new(
            "manifest_is_present",
            format!("test -f {IMAGE_MANIFEST_PATH} && echo ok"),
        )
        .expecting("ok"),
    ]);
    items
}

/// SHA-256 of a file, lowercase hex.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn file_sha256(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|e| VvmError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(format!("{:x}", Sha256::digest(&bytes)))
}

/// A check that the image's manifest copy matches `host_manifest`.
///
/// # Errors
///
/// Returns an error if the host manifest cannot be read.
pub fn manifest_digest_check(host_manifest: &Path) -> Result<CheckItem> {
    let digest = file_sha256(host_manifest)?;
    Ok(
        CheckItem::new("manifest_matches_repository", format!("sha256sum {IMAGE_MANIFEST_PATH}"))
            .expecting(digest),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(code: i32, stdout: &str, stderr: &str) -> CommandOutput {
        CommandOutput {
            stdout: stdout.into(),
            stderr: stderr.into(),
            exit_code: Some(code),
        }
    }

    #[test]
    fn default_checklist_covers_image_contract() {
        let items = default_checklist();
        let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
        for expected in [
            "container_runs",
            "python_version",
            "gcc_available",
            "make_available",
            "git_available",
            "valgrind_available",
            "pip_packages_installed",
            "workspace_directory_exists",
            "entrypoint_is_executable",
            "manifest_is_present",
        ] {
            assert!(names.contains(&expected), "missing {expected}");
        }
    }

    #[test]
    fn python_check_expects_version() {
        let items = default_checklist();
        let python = items.iter().find(|i| i.name == "python_version").unwrap();
        assert_eq!(python.command, "python --version");
        assert_eq!(python.expect_stdout, vec!["3.11"]);
    }

    #[test]
    fn import_check_lists_every_package() {
        let items = default_checklist();
        let pip = items
            .iter()
            .find(|i| i.name == "pip_packages_installed")
            .unwrap();
        assert!(pip.command.starts_with("python -c 'import numpy; import scipy"));
        assert!(pip.command.ends_with("import emcee'"));
    }

    #[test]
    fn entrypoint_check_uses_fixed_path() {
        let items = default_checklist();
        let entry = items
            .iter()
            .find(|i| i.name == "entrypoint_is_executable")
            .unwrap();
        assert_eq!(entry.command, "test -x /usr/local/bin/entrypoint.sh && echo ok");
    }

    #[test]
    fn evaluate_passes_on_zero_exit_and_expected_output() {
        let item = CheckItem::new("py", "python --version").expecting("3.11");
        assert!(item.evaluate(&output(0, "Python 3.11.9\n", "")).is_ok());
    }

    #[test]
    fn evaluate_fails_on_nonzero_exit_with_stderr() {
        let item = CheckItem::new("imports", "python -c 'import emcee'");
        let reason = item
            .evaluate(&output(1, "", "ModuleNotFoundError: No module named 'emcee'"))
            .unwrap_err();
        assert!(reason.contains("code 1"));
        assert!(reason.contains("No module named 'emcee'"));
    }

    #[test]
    fn evaluate_fails_on_missing_substring() {
        let item = CheckItem::new("py", "python --version").expecting("3.11");
        let reason = item.evaluate(&output(0, "Python 3.12.1\n", "")).unwrap_err();
        assert!(reason.contains("does not contain '3.11'"));
        assert!(reason.contains("Python 3.12.1"));
    }

    #[test]
    fn evaluate_requires_zero_exit_even_with_expected_output() {
        let item = CheckItem::new("ws", "test -d /workspace && echo ok").expecting("ok");
        assert!(item.evaluate(&output(2, "ok\n", "")).is_err());
    }

    #[test]
    fn evaluate_reports_signal_death() {
        let item = CheckItem::new("x", "x");
        let reason = item
            .evaluate(&CommandOutput {
                exit_code: None,
                ..CommandOutput::default()
            })
            .unwrap_err();
        assert!(reason.contains("a signal"));
    }

    #[test]
    fn digest_check_expects_host_hash() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("repos.conf");
        std::fs::write(&path, "abc").unwrap();

        let item = manifest_digest_check(&path).unwrap();
        assert_eq!(item.command, "sha256sum /etc/vvm/repos.conf");
        assert_eq!(
            item.expect_stdout,
            vec!["ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"]
        );
    }

    #[test]
    fn digest_check_missing_manifest_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(manifest_digest_check(&dir.path().join("absent")).is_err());
    }
}
