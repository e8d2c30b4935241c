//! Formatted output helpers for CLI commands.
//!
//! Provides the status markers, duration formatting, and report layouts
//! shared by `validate`, `list`, and `check`.

use vvm_harness::suite::{BuildStatus, SuiteReport};
use vvm_harness::Outcome;
use vvm_manifest::ValidationReport;

/// Formats a millisecond count into a short human-readable string.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn format_duration_ms(ms: u64) -> String {
    const SEC: u64 = 1000;
    const MIN: u64 = SEC * 60;

    if ms >= MIN {
        format!("{}m {:02}s", ms / MIN, (ms % MIN) / SEC)
    } else if ms >= SEC {
        format!("{:.1} s", ms as f64 / SEC as f64)
    } else {
        format!("{ms} ms")
    }
}

/// Fixed-width marker for a check outcome.
#[must_use]
pub const fn outcome_marker(outcome: &Outcome) -> &'static str {
    match outcome {
        Outcome::Passed => "PASS",
        Outcome::Failed { .. } => "FAIL",
        Outcome::Skipped { .. } => "SKIP",
    }
}

/// Prints every violation of a manifest report, one per line.
pub fn print_violations(report: &ValidationReport) {
    for v in &report.violations {
        println!("  {v}");
    }
}

/// Prints an acceptance report as a summary table.
pub fn print_report(report: &SuiteReport) {
    println!("Engine: {} ({})", report.engine, report.availability);
    match &report.build {
        BuildStatus::Built => println!("Image:  {} built", report.image_tag),
        BuildStatus::Skipped => println!("Image:  {} not built", report.image_tag),
        BuildStatus::Failed { message } => {
            println!("Image:  {} FAILED", report.image_tag);
            println!("{message}");
        }
    }
    println!();

    for check in &report.checks {
        println!(
            "  {}  {:<30} {:>8}",
            outcome_marker(&check.outcome),
            check.name,
            format_duration_ms(check.duration_ms)
        );
        if let Outcome::Failed { reason } = &check.outcome {
            for line in reason.lines() {
                println!("        {line}");
            }
        }
    }

    println!();
    println!(
        "  {} passed, {} failed, {} skipped",
        report.passed(),
        report.failed(),
        report.skipped()
    );
}
