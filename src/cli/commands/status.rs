//! Status command implementation
//!
//! Displays the current watermark and the most recent run records.

use crate::adapters::database::connect_destination;
use crate::config::load_config;
use crate::core::state::{RunRecord, RunStateManager, RunStatus};
use crate::core::sync::exit_code;
use crate::core::sync::summary::fatal_exit_code;
use chrono::{DateTime, Utc};
use clap::Args;
use serde::Serialize;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Number of runs to show
    #[arg(long, default_value_t = 10)]
    pub limit: usize,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
struct StatusReport {
    watermark: DateTime<Utc>,
    runs: Vec<RunRecord>,
}

impl StatusArgs {
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Checking run status");

        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("❌ Failed to load configuration file");
                eprintln!("   Error: {e}");
                return Ok(exit_code::CONFIGURATION);
            }
        };

        let (_, runs) = match connect_destination(&config).await {
            Ok(d) => d,
            Err(e) => {
                eprintln!("❌ Failed to connect to destination database");
                eprintln!("   Error: {e}");
                return Ok(fatal_exit_code(&e));
            }
        };

        let state = RunStateManager::new(
            runs,
            config.reconcile.bootstrap_epoch,
            config.reconcile.max_error_message_len,
        );

        let report = match load_report(&state, self.limit).await {
            Ok(r) => r,
            Err(e) => {
                eprintln!("❌ Failed to read run history");
                eprintln!("   Error: {e}");
                return Ok(fatal_exit_code(&e));
            }
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print_table(&report);
        }
        Ok(exit_code::SUCCESS)
    }
}

async fn load_report(state: &RunStateManager, limit: usize) -> crate::domain::Result<StatusReport> {
    Ok(StatusReport {
        watermark: state.watermark().await?,
        runs: state.recent_runs(limit).await?,
    })
}

fn print_table(report: &StatusReport) {
    println!("📊 Run Status");
    println!();
    println!(
        "Watermark: {}",
        report.watermark.format("%Y-%m-%d %H:%M:%S UTC")
    );
    println!();

    if report.runs.is_empty() {
        println!("No run history found.");
        println!("Run 'ward-sync reconcile' to start reconciling data.");
        return;
    }

    println!(
        "{:<8} {:<21} {:<12} {:>10} {:>6} {:>6} {:>7}  {}",
        "Run", "Started", "Status", "Duration", "Adm", "Stays", "Exams", "Message"
    );
    println!("{}", "-".repeat(100));

    for run in &report.runs {
        let status = match run.status {
            RunStatus::Success => "✅ success",
            RunStatus::Error => "❌ error",
            RunStatus::Running => "🔄 running",
        };
        let duration = run
            .duration()
            .map(|d| format!("{}s", d.num_seconds()))
            .unwrap_or_else(|| "-".to_string());

        println!(
            "{:<8} {:<21} {:<12} {:>10} {:>6} {:>6} {:>7}  {}",
            run.id,
            run.started_at.format("%Y-%m-%d %H:%M:%S"),
            status,
            duration,
            run.counts.admissions,
            run.counts.stays,
            run.counts.exams,
            run.error_message.as_deref().unwrap_or("")
        );
    }
    println!();
}
