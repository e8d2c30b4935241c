//! `vvm check`: Build the image and run the acceptance checklist.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Args;
use vvm_common::config::HarnessConfig;
use vvm_harness::{AcceptanceSuite, EngineCli};

/// Arguments for the `check` command.
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// YAML file with harness settings; flags override it.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Build context (repository root).
    #[arg(long)]
    pub context: Option<PathBuf>,

    /// Tag for the image under test.
    #[arg(long, env = "VVM_IMAGE_TAG")]
    pub tag: Option<String>,

    /// Container engine binary.
    #[arg(long, env = "VVM_ENGINE")]
    pub engine: Option<String>,

    /// Leave the built image in place afterwards.
    #[arg(long)]
    pub keep_image: bool,

    /// Emit the report as JSON on stdout.
    #[arg(long)]
    pub json: bool,
}

impl CheckArgs {
    fn resolve_config(self) -> anyhow::Result<HarnessConfig> {
        let mut config = match &self.config {
            Some(path) => HarnessConfig::load(path)?,
            None => HarnessConfig::default(),
        };
        if let Some(context) = self.context {
            config.context = context;
        }
        if let Some(tag) = self.tag {
            config.image_tag = tag;
        }
        if let Some(engine) = self.engine {
            config.engine = engine;
        }
        config.keep_image |= self.keep_image;
        config.validate()?;
        Ok(config)
    }
}

/// Executes the `check` command.
///
/// Probes the engine once; if it is unreachable every item is skipped and
/// the command succeeds. Otherwise the image is built once, every item runs
/// in a fresh container, and the image is removed at the end.
///
/// # Errors
///
/// Returns an error if the configuration is invalid, the build fails, or
/// any item fails.
pub fn execute(args: CheckArgs) -> anyhow::Result<()> {
    let json = args.json;
    let config = args.resolve_config()?;
    tracing::info!(
        engine = %config.engine,
        context = %config.context.display(),
        tag = %config.image_tag,
        "starting acceptance run"
    );

    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&interrupted);
    if let Err(e) = ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst)) {
        tracing::warn!(error = %e, "could not install interrupt handler");
    }

    let engine = EngineCli::new(config.engine.clone());
    let suite = AcceptanceSuite::new(&engine, config).with_interrupt(interrupted);
    let setup = suite.prepare();
    let report = suite.run(&setup);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        crate::output::print_report(&report);
    }

    if !report.is_success() {
        anyhow::bail!(
            "{} of {} checks failed",
            report.failed(),
            report.checks.len()
        );
    }
    Ok(())
}
