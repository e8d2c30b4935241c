//! `vvm list`: Show the repositories of a valid manifest in install order.

use std::path::PathBuf;

use clap::Args;
use vvm_common::constants::MANIFEST_FILE;
use vvm_manifest::{Manifest, validate};

/// Arguments for the `list` command.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Path to the manifest.
    #[arg(default_value = MANIFEST_FILE)]
    pub file: PathBuf,

    /// Emit the entries as a JSON array on stdout.
    #[arg(long)]
    pub json: bool,
}

/// Executes the `list` command.
///
/// # Errors
///
/// Returns an error if the manifest cannot be read or is invalid.
pub fn execute(args: &ListArgs) -> anyhow::Result<()> {
    let manifest = Manifest::load(&args.file)?;
    let entries = validate(&manifest).map_err(|report| {
        crate::output::print_violations(&report);
        anyhow::anyhow!("{}: {report}", args.file.display())
    })?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    let name_width = entries.iter().map(|e| e.name.len()).max().unwrap_or(4).max(4);
    println!("{:<name_width$}  {:<12}  {:<10}  URL", "NAME", "METHOD", "BRANCH");
    for e in &entries {
        println!(
            "{:<name_width$}  {:<12}  {:<10}  {}",
            e.name,
            e.install_method.as_tag(),
            e.branch,
            e.url
        );
    }
    Ok(())
}
