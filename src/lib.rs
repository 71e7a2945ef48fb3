// Ward Sync - Hospital admission, exam and bed reconciliation
// Copyright (c) 2025 Ward Sync Contributors
// Licensed under the MIT License

//! # Ward Sync
//!
//! Ward Sync is a batch reconciler that copies hospital admissions, unit
//! stays, laboratory results and bed states from a source-of-record
//! database into a clinical-monitoring database. Exams and beds are only
//! persisted after an external system acknowledged an HL7 v2 message
//! announcing them.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (reconcile, notify, sync, state)
//! - [`adapters`] - External integrations (PostgreSQL, HL7 over HTTP)
//! - [`domain`] - Record types, identifiers and errors
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use ward_sync::adapters::database::{connect_destination, connect_source};
//! use ward_sync::adapters::hl7::{HttpTransport, MessageRenderer};
//! use ward_sync::config::load_config;
//! use ward_sync::core::notify::Hl7Notifier;
//! use ward_sync::core::state::RunStateManager;
//! use ward_sync::core::sync::{ReconcileCoordinator, ReconcileOptions, RecordWriter};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config("ward-sync.toml")?;
//!
//!     let source = connect_source(&config).await?;
//!     let (destination, runs) = connect_destination(&config).await?;
//!
//!     let notifier = Hl7Notifier::new(
//!         MessageRenderer::new(config.hl7.clone())?,
//!         Arc::new(HttpTransport::new(&config.notifier)?),
//!     );
//!     let writer = RecordWriter::new(destination.clone(), Arc::new(notifier));
//!     let state = RunStateManager::new(
//!         runs,
//!         config.reconcile.bootstrap_epoch,
//!         config.reconcile.max_error_message_len,
//!     );
//!
//!     let coordinator = ReconcileCoordinator::new(
//!         source,
//!         destination,
//!         state,
//!         writer,
//!         ReconcileOptions::default(),
//!     );
//!     let summary = coordinator.execute().await;
//!     println!("Inserted {} exams", summary.written.exams);
//!     Ok(())
//! }
//! ```
//!
//! ## Incremental Runs
//!
//! Each run reads only rows at or after the start of the last successful
//! run. A run with any unpersisted record is closed as an error, so the
//! next run reads the same window again and the missing records are
//! detected as new.
//!
//! ## Error Handling
//!
//! All fallible operations return [`domain::Result`]. Read failures abort a
//! run; write and notification failures only skip the affected record.

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
