//! Init command implementation
//!
//! Writes a commented configuration template.

use crate::core::sync::exit_code;
use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "ward-sync.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(exit_code::CONFIGURATION);
        }

        match fs::write(&self.output, Self::template()) {
            Ok(()) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Set AGHU_DATABASE_URL, EPIMED_DATABASE_URL and HL7_API_TOKEN");
                println!("     (a .env file in the working directory is read at startup)");
                println!("  2. Adjust [notifier] endpoint and [hl7] header values");
                println!("  3. Validate: ward-sync validate-config");
                println!("  4. Preview: ward-sync reconcile --dry-run");
                Ok(exit_code::SUCCESS)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(exit_code::FATAL)
            }
        }
    }

    fn template() -> &'static str {
        r#"# Ward Sync configuration
#
# ${VAR} placeholders are read from the environment.
# Any key can also be overridden with WARD_SYNC_<SECTION>_<KEY>.

[application]
log_level = "info"
dry_run = false

# Source-of-record hospital database (read only)
[source]
connection_string = "${AGHU_DATABASE_URL}"
max_connections = 2
statement_timeout_seconds = 60
ssl_mode = "prefer"
# Zone used to read timestamp columns without time zone
timezone = "America/Sao_Paulo"

# Destination clinical-monitoring database
[destination]
connection_string = "${EPIMED_DATABASE_URL}"
max_connections = 2
ssl_mode = "prefer"
timezone = "America/Sao_Paulo"

# Outbound HL7 endpoint
[notifier]
endpoint = "https://hl7.example.org/inbound"
token = "${HL7_API_TOKEN}"
timeout_seconds = 10
content_type = "text/plain"

[notifier.retry]
max_retries = 2
initial_delay_ms = 500
max_delay_ms = 5000
backoff_multiplier = 2.0

[hl7]
sending_application = "HUAP"
receiving_application = "EPIMED"
processing_id = "P"
version = "2.5"
# cr, lf or crlf
segment_separator = "cr"
utc_offset_minutes = -180

[reconcile]
# Exams collected from 4h before to 3h after the unit admission
exam_window_back_hours = 4
exam_window_forward_hours = 3
most_recent_stay_only = true
bootstrap_epoch = "2000-01-01T00:00:00Z"
max_error_message_len = 2000

[logging]
local_enabled = true
local_path = "./logs"
file_prefix = "ward-sync"
"#
    }
}
