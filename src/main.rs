// Ward Sync - Hospital admission, exam and bed reconciliation
// Copyright (c) 2025 Ward Sync Contributors
// Licensed under the MIT License

use clap::Parser;
use std::process;
use ward_sync::cli::{Cli, Commands};
use ward_sync::config::LoggingConfig;
use ward_sync::core::sync::exit_code;
use ward_sync::logging::{init_logging, LoggingGuard};

#[tokio::main]
async fn main() {
    // Optional; a missing .env file is ignored
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Reconcile commands log to the configured daily file instead
    let _guard: Option<LoggingGuard> = if cli.command.uses_configured_logging() {
        None
    } else {
        let log_level = cli.log_level.as_deref().unwrap_or("info");
        match init_logging(log_level, &LoggingConfig::console_only()) {
            Ok(guard) => Some(guard),
            Err(e) => {
                eprintln!("Failed to initialize logging: {e}");
                process::exit(exit_code::CONFIGURATION);
            }
        }
    };

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "ward-sync starting");

    let exit_code = match execute_command(&cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            exit_code::FATAL
        }
    };

    process::exit(exit_code);
}

async fn execute_command(cli: &Cli) -> anyhow::Result<i32> {
    let log_level = cli.log_level.as_deref();
    match &cli.command {
        Commands::Reconcile(args) => args.execute(&cli.config, log_level).await,
        Commands::Beds(args) => args.execute(&cli.config, log_level).await,
        Commands::Status(args) => args.execute(&cli.config).await,
        Commands::ValidateConfig(args) => args.execute(&cli.config).await,
        Commands::Init(args) => args.execute().await,
    }
}
