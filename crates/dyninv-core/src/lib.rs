//! dyninv-core: remote inventory source plugin
//!
//! Wires source resolution, fetching and graph building into a single
//! `InventorySource` implementation.

pub mod config;
pub mod error;
pub mod source;

pub use config::SourceConfig;
pub use error::SourceError;
pub use source::{InventorySnapshot, InventorySource, RemoteInventorySource};
