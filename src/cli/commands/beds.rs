//! Beds command implementation

use super::{build_writer, prepare};
use crate::adapters::database::{connect_destination, connect_source};
use crate::core::sync::summary::fatal_exit_code;
use crate::core::sync::{BedCoordinator, BedSummary};
use clap::Args;

/// Arguments for the beds command
#[derive(Args, Debug)]
pub struct BedsArgs {
    /// Read and diff only; nothing is notified or written
    #[arg(long)]
    pub dry_run: bool,
}

impl BedsArgs {
    pub async fn execute(&self, config_path: &str, log_level: Option<&str>) -> anyhow::Result<i32> {
        let (config, _guard) = match prepare(config_path, log_level) {
            Ok(prepared) => prepared,
            Err(code) => return Ok(code),
        };
        let dry_run = self.dry_run || config.application.dry_run;

        if dry_run {
            println!("🔍 DRY RUN MODE - nothing will be notified or written");
            println!();
        }

        let source = match connect_source(&config).await {
            Ok(s) => s,
            Err(e) => {
                eprintln!("❌ Failed to connect to source database: {e}");
                return Ok(fatal_exit_code(&e));
            }
        };
        // Beds keep no run records, the run store is not needed
        let (destination, _) = match connect_destination(&config).await {
            Ok(d) => d,
            Err(e) => {
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

        println!("🛏️  Reconciling beds...");
        let coordinator = BedCoordinator::new(source, destination, writer, dry_run);
        let summary = coordinator.execute().await;
        summary.log_summary();
        print_summary(&summary);

        Ok(summary.exit_code())
    }
}

fn print_summary(summary: &BedSummary) {
    println!();
    println!("📊 Bed Summary:");
    println!(
        "  New beds: {} detected, {} inserted",
        summary.detected_new, summary.inserted
    );
    println!(
        "  Status changes: {} detected, {} applied",
        summary.detected_changed, summary.updated
    );
    println!("  Accepted notifications: {}", summary.notified);
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
    println!();

    for failure in summary.failures.iter().take(10) {
        println!("  - bed {}: {}", failure.key, failure.reason);
    }

    match &summary.fatal {
        Some(error) => println!("❌ Bed reconciliation aborted: {error}"),
        None if summary.is_successful() => println!("✅ Bed reconciliation completed"),
        None => println!("⚠️  Bed reconciliation completed with failures"),
    }
}
