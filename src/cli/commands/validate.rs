//! Validate config command implementation

use crate::config::{load_config, SyncConfig};
use crate::core::sync::exit_code;
use clap::Args;
use secrecy::ExposeSecret;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        match load_config(config_path) {
            Ok(config) => {
                println!("✅ Configuration is valid");
                println!();
                print!("{}", describe(&config));
                Ok(exit_code::SUCCESS)
            }
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                Ok(exit_code::CONFIGURATION)
            }
        }
    }
}

/// Redacted configuration summary
fn describe(config: &SyncConfig) -> String {
    let mut out = String::from("Configuration Summary:\n");
    out.push_str(&format!("  Log Level: {}\n", config.application.log_level));
    out.push_str(&format!("  Dry Run: {}\n", config.application.dry_run));
    out.push_str(&format!(
        "  Source: {} (tz {})\n",
        config.source.connection_string.expose_secret().redacted_location(),
        config.source.timezone
    ));
    out.push_str(&format!(
        "  Destination: {} (tz {})\n",
        config
            .destination
            .connection_string
            .expose_secret()
            .redacted_location(),
        config.destination.timezone
    ));
    out.push_str(&format!("  Notifier: {}\n", config.notifier.endpoint));
    out.push_str(&format!(
        "  Notifier Token: {}\n",
        if config.notifier.token.is_some() {
            "set"
        } else {
            "not set"
        }
    ));
    out.push_str(&format!(
        "  HL7: {} -> {} (v{})\n",
        config.hl7.sending_application, config.hl7.receiving_application, config.hl7.version
    ));
    out.push_str(&format!(
        "  Exam Window: -{}h / +{}h ({})\n",
        config.reconcile.exam_window_back_hours,
        config.reconcile.exam_window_forward_hours,
        if config.reconcile.most_recent_stay_only {
            "most recent stay"
        } else {
            "any stay"
        }
    ));
    out.push_str(&format!(
        "  Log File: {}\n",
        if config.logging.local_enabled {
            format!("{}/{}.log.<date>", config.logging.local_path, config.logging.file_prefix)
        } else {
            "disabled".to_string()
        }
    ));
    out
}
