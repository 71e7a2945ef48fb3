//! PostgreSQL integration for both database systems
//!
//! - [`client`]: pooled client with session timezone and statement timeout
//! - [`source`]: read-only queries against the source hospital database
//! - [`destination`]: reads, idempotent inserts and notification logs
//! - [`run_store`]: run records and audit rows
//! - [`models`]: row mapping and stored status codes

pub mod client;
pub mod destination;
pub mod models;
pub mod run_store;
pub mod source;

pub use client::PostgreSQLClient;
pub use destination::PostgreSQLDestination;
pub use source::PostgreSQLSource;
