//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for ward-sync using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Ward Sync - hospital admission, exam and bed reconciliation
#[derive(Parser, Debug)]
#[command(name = "ward-sync")]
#[command(version, about, long_about = None)]
#[command(author = "Ward Sync Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "ward-sync.toml", env = "WARD_SYNC_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "WARD_SYNC_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Reconcile admissions, stays and exams
    Reconcile(commands::reconcile::ReconcileArgs),

    /// Reconcile beds
    Beds(commands::beds::BedsArgs),

    /// Show the watermark and recent runs
    Status(commands::status::StatusArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}

impl Commands {
    /// Commands that set up logging from the configuration file themselves
    pub fn uses_configured_logging(&self) -> bool {
        matches!(self, Commands::Reconcile(_) | Commands::Beds(_))
    }
}
