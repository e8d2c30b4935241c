//! `vvm validate`: Parse a manifest and check it against every rule.

use std::path::PathBuf;

use clap::Args;
use vvm_common::constants::MANIFEST_FILE;
use vvm_manifest::{Manifest, Rule, ValidationReport, validate};

/// Arguments for the `validate` command.
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to the manifest.
    #[arg(default_value = MANIFEST_FILE)]
    pub file: PathBuf,

    /// Run a single rule instead of all of them.
    #[arg(long)]
    pub rule: Option<Rule>,

    /// Emit the result as JSON on stdout.
    #[arg(long)]
    pub json: bool,
}

/// Executes the `validate` command.
///
/// # Errors
///
/// Returns an error if the manifest cannot be read or breaks any rule.
pub fn execute(args: &ValidateArgs) -> anyhow::Result<()> {
    let manifest = Manifest::load(&args.file)?;

    let result = match args.rule {
        Some(rule) => {
            let violations = rule.check(&manifest);
            if violations.is_empty() {
                Ok(manifest.len())
            } else {
                Err(ValidationReport { violations })
            }
        }
        None => validate(&manifest).map(|entries| entries.len()),
    };

    match result {
        Ok(count) => {
            if args.json {
                println!(
                    "{}",
                    serde_json::json!({ "file": args.file, "valid": true, "entries": count })
                );
            } else {
                let scope = args
                    .rule
                    .map_or_else(|| "all rules".to_string(), |r| format!("rule {r}"));
                println!(
                    "{}: {count} entries, {scope} passed",
                    args.file.display()
                );
            }
            Ok(())
        }
        Err(report) => {
            if args.json {
                println!(
                    "{}",
                    serde_json::json!({
                        "file": args.file,
                        "valid": false,
                        "violations": report.violations,
                    })
                );
            } else {
                crate::output::print_violations(&report);
            }
            anyhow::bail!("{}: {report}", args.file.display())
        }
    }
}
