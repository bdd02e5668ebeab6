//! Graph sink trait

use serde_json::Value;

/// Destination for the operations the builder performs
///
/// `InventoryGraph` is the production sink. All operations must be
/// idempotent: adding an existing group, host or edge is a no-op.
pub trait GraphSink {
    /// Add a group if it does not exist yet
    fn add_group(&mut self, name: &str);

    /// Add a host if it does not exist yet
    fn add_host(&mut self, name: &str);

    /// Set a group variable, replacing any previous value for `key`
    fn set_group_variable(&mut self, group: &str, key: &str, value: Value);

    /// Set a host variable, replacing any previous value for `key`
    fn set_host_variable(&mut self, host: &str, key: &str, value: Value);

    /// Record that `member` (host or group) belongs to `group`
    fn add_child(&mut self, group: &str, member: &str);
}
