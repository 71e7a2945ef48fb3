//! Configuration management for ward-sync.
//!
//! Configuration comes from a TOML file with:
//! - `${VAR_NAME}` substitution from the environment
//! - `WARD_SYNC_<SECTION>_<KEY>` environment overrides
//! - defaults for every optional setting
//! - validation once at startup
//!
//! # Example Configuration
//!
//! ```toml
//! [source]
//! connection_string = "${AGHU_DATABASE_URL}"
//!
//! [destination]
//! connection_string = "${EPIMED_DATABASE_URL}"
//!
//! [notifier]
//! endpoint = "https://hl7.example.org/inbound"
//! token = "${HL7_API_TOKEN}"
//!
//! [reconcile]
//! exam_window_forward_hours = 3
//! ```
//!
//! ```rust,no_run
//! use ward_sync::config::load_config;
//!
//! match load_config("ward-sync.toml") {
//!     Ok(config) => println!("Notifier: {}", config.notifier.endpoint),
//!     Err(e) => eprintln!("Configuration error: {e}"),
//! }
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

pub use loader::load_config;
pub use schema::{
    ApplicationConfig, Hl7Config, LoggingConfig, NotifierConfig, PostgreSQLConfig,
    ReconcileConfig, RetryConfig, SegmentSeparator, SyncConfig,
};
pub use secret::{secret_string, SecretString, SecretValue};
