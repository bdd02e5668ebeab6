//! dyninv-inventory: inventory graph model and builder
//!
//! Decodes loosely structured inventory documents and normalizes them into a
//! graph of groups, hosts, variables and membership edges. Performs no I/O.

pub mod builder;
pub mod document;
pub mod error;
pub mod traits;
pub mod types;

pub use builder::{build, build_from_slice, build_from_str, build_from_value, populate};
pub use document::{ALL_KEY, GroupDecl, RawSourceDocument};
pub use error::InventoryError;
pub use traits::GraphSink;
pub use types::{Group, Host, InventoryGraph, MembershipEdge, Variables};
