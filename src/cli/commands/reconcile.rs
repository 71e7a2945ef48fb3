//! Reconcile command implementation
//!
//! Runs one admissions/stays/exams reconciliation.

use super::{build_writer, prepare};
use crate::adapters::database::{connect_destination, connect_source};
use crate::core::state::RunStateManager;
use crate::core::sync::summary::fatal_exit_code;
use crate::core::sync::{ReconcileCoordinator, ReconcileOptions, RunSummary};
use clap::Args;

/// Arguments for the reconcile command
#[derive(Args, Debug)]
pub struct ReconcileArgs {
    /// Read and diff only; nothing is notified or written
    #[arg(long)]
    pub dry_run: bool,

    /// Ignore the watermark and read full tables
    #[arg(long)]
    pub full: bool,
}

impl ReconcileArgs {
    pub async fn execute(&self, config_path: &str, log_level: Option<&str>) -> anyhow::Result<i32> {
        let (config, _guard) = match prepare(config_path, log_level) {
            Ok(prepared) => prepared,
            Err(code) => return Ok(code),
        };

        let options = ReconcileOptions {
            dry_run: self.dry_run || config.application.dry_run,
            full: self.full,
        };

        if options.dry_run {
            tracing::info!("Dry run mode enabled - nothing will be notified or written");
            println!("🔍 DRY RUN MODE - nothing will be notified or written");
            println!();
        }

        let source = match connect_source(&config).await {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Failed to connect to source database");
                eprintln!("❌ Failed to connect to source database: {e}");
                return Ok(fatal_exit_code(&e));
            }
        };
        let (destination, runs) = match connect_destination(&config).await {
            Ok(d) => d,
            Err(e) => {
                tracing::error!(error = %e, "Failed to connect to destination database");
                eprintln!("❌ Failed to connect to destination database: {e}");
                return Ok(fatal_exit_code(&e));
            }
        };
        let writer = match build_writer(&config, destination.clone()) {
            Ok(w) => w,
            Err(e) => {
                eprintln!("❌ Failed to initialize notifier: {e}");
                return Ok(fatal_exit_code(&e));
            }
        };

        let state = RunStateManager::new(
            runs,
            config.reconcile.bootstrap_epoch,
            config.reconcile.max_error_message_len,
        );
        let coordinator = ReconcileCoordinator::new(source, destination, state, writer, options);

        println!("🚀 Starting reconciliation...");
        let summary = coordinator.execute().await;
        summary.log_summary();
        print_summary(&summary);

        Ok(summary.exit_code())
    }
}

fn print_summary(summary: &RunSummary) {
    println!();
    println!("📊 Reconciliation Summary:");
    if let Some(run_id) = summary.run_id {
        println!("  Run: {run_id}");
    }
    match summary.since {
        Some(since) => println!("  Since: {}", since.format("%Y-%m-%d %H:%M:%S UTC")),
        None => println!("  Since: full refresh"),
    }
    println!(
        "  Admissions: {} new, {} inserted",
        summary.detected.admissions, summary.written.admissions
    );
    println!(
        "  Stays: {} new, {} inserted",
        summary.detected.stays, summary.written.stays
    );
    println!(
        "  Exams: {} new, {} accepted, {} inserted",
        summary.detected.exams, summary.exams_accepted, summary.written.exams
    );
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
    println!();

    if !summary.failures.is_empty() {
        println!("⚠️  Records not persisted:");
        for failure in summary.failures.iter().take(10) {
            println!("  - {} {}: {}", failure.entity, failure.key, failure.reason);
        }
        if summary.failures.len() > 10 {
            println!("  ... and {} more", summary.failures.len() - 10);
        }
        println!();
    }

    match &summary.fatal {
        Some(error) => println!("❌ Reconciliation aborted: {error}"),
        None if summary.dry_run => println!("✅ Dry run completed"),
        None if summary.failures.is_empty() => println!("✅ Reconciliation completed successfully!"),
        None => println!("⚠️  Reconciliation completed with failures"),
    }
}
