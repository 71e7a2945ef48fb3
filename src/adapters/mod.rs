//! External system integrations for ward-sync.
//!
//! - [`database`] - reader/store traits and the client factory
//! - [`postgresql`] - source and destination PostgreSQL implementations
//! - [`hl7`] - HL7 v2 rendering, acknowledgement parsing and HTTP transport
//!
//! # Design Pattern
//!
//! Adapters isolate external dependencies behind traits so the
//! reconciliation core can be exercised with in-memory implementations.
//!
//! ```rust,no_run
//! use ward_sync::adapters::database::{connect_destination, connect_source};
//! use ward_sync::config::load_config;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("ward-sync.toml")?;
//! let source = connect_source(&config).await?;
//! let (destination, runs) = connect_destination(&config).await?;
//! let beds = source.fetch_beds().await?;
//! let last_success = runs.last_successful_run_start().await?;
//! # let _ = (destination, beds, last_success);
//! # Ok(())
//! # }
//! ```

pub mod database;
pub mod hl7;
pub mod postgresql;
