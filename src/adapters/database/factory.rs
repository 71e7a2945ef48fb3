//! Database client factory
//!
//! Builds the pooled clients from configuration and hands them out behind
//! the reader/store traits. Both factories test their connection so an
//! unreachable server fails before any run bookkeeping starts.

use crate::adapters::database::traits::{DestinationStore, RunStore, SourceReader};
use crate::adapters::postgresql::{PostgreSQLClient, PostgreSQLDestination, PostgreSQLSource};
use crate::config::schema::SyncConfig;
use crate::domain::Result;
use std::sync::Arc;

/// Connects to the source database
///
/// # Errors
///
/// Returns a configuration error for a bad connection string and a
/// connection error if the server cannot be reached.
pub async fn connect_source(config: &SyncConfig) -> Result<Arc<dyn SourceReader>> {
    tracing::info!("Creating source PostgreSQL client");
    let client = PostgreSQLClient::new(config.source.clone(), "source").await?;
    client.test_connection().await?;

    let source = PostgreSQLSource::new(Arc::new(client), &config.reconcile);
    Ok(Arc::new(source) as Arc<dyn SourceReader>)
}

/// Connects to the destination database
///
/// The record store and the run store share one pool.
///
/// # Errors
///
/// Returns a configuration error for a bad connection string and a
/// connection error if the server cannot be reached.
pub async fn connect_destination(
    config: &SyncConfig,
) -> Result<(Arc<dyn DestinationStore>, Arc<dyn RunStore>)> {
    tracing::info!("Creating destination PostgreSQL client and run store");
    let client = PostgreSQLClient::new(config.destination.clone(), "destination").await?;
    client.test_connection().await?;

    let destination = Arc::new(PostgreSQLDestination::new(Arc::new(client)));
    Ok((
        destination.clone() as Arc<dyn DestinationStore>,
        destination as Arc<dyn RunStore>,
    ))
}
