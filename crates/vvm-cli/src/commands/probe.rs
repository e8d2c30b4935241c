//! `vvm probe`: Report whether the container engine is reachable.

use clap::Args;
use vvm_common::constants;
use vvm_harness::{EngineCli, probe};

/// Arguments for the `probe` command.
#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// Container engine binary.
    #[arg(long, env = "VVM_ENGINE", default_value = constants::DEFAULT_ENGINE)]
    pub engine: String,

    /// Seconds to wait for the engine to answer.
    #[arg(long, default_value_t = constants::PROBE_TIMEOUT.as_secs())]
    pub timeout: u64,
}

/// Executes the `probe` command.
///
/// # Errors
///
/// Returns an error if the engine is unavailable.
pub fn execute(args: &ProbeArgs) -> anyhow::Result<()> {
    let engine = EngineCli::new(&args.engine);
    let availability = probe(&engine, std::time::Duration::from_secs(args.timeout.max(1)));

    if !availability.is_available() {
        anyhow::bail!("container engine unavailable: {availability}");
    }

    match engine.locate() {
        Some(path) => println!("{}: available ({})", args.engine, path.display()),
        None => println!("{}: available", args.engine),
    }
    Ok(())
}
