//! Database abstraction layer
//!
//! Trait seams between the reconciliation core and the two database systems,
//! plus factory functions wiring the PostgreSQL implementations.

pub mod factory;
pub mod traits;

pub use factory::{connect_destination, connect_source};
pub use traits::{DestinationStore, RunStore, SourceReader};
