//! CLI command implementations

pub mod beds;
pub mod init;
pub mod reconcile;
pub mod status;
pub mod validate;

use crate::adapters::database::DestinationStore;
use crate::adapters::hl7::{HttpTransport, MessageRenderer};
use crate::config::{load_config, SyncConfig};
use crate::core::notify::Hl7Notifier;
use crate::core::sync::{exit_code, RecordWriter};
use crate::domain::Result;
use crate::logging::{init_logging, LoggingGuard};
use std::sync::Arc;

/// Loads the configuration and starts logging with its `[logging]` section
///
/// On failure the error is printed and the exit code returned.
pub(crate) fn prepare(
    config_path: &str,
    log_level: Option<&str>,
) -> std::result::Result<(SyncConfig, LoggingGuard), i32> {
    let config = match load_config(config_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {e}");
            return Err(exit_code::CONFIGURATION);
        }
    };

    let level = log_level.unwrap_or(&config.application.log_level);
    match init_logging(level, &config.logging) {
        Ok(guard) => {
            if guard.has_file_output() {
                tracing::debug!(path = %config.logging.local_path, "Writing daily log file");
            }
            Ok((config, guard))
        }
        Err(e) => {
            eprintln!("❌ Failed to initialize logging: {e}");
            Err(exit_code::CONFIGURATION)
        }
    }
}

/// Builds the HL7-backed record writer
pub(crate) fn build_writer(
    config: &SyncConfig,
    destination: Arc<dyn DestinationStore>,
) -> Result<RecordWriter> {
    let renderer = MessageRenderer::new(config.hl7.clone())?;
    let transport = Arc::new(HttpTransport::new(&config.notifier)?);
    let notifier = Arc::new(Hl7Notifier::new(renderer, transport));
    Ok(RecordWriter::new(destination, notifier))
}
