//! Inventory builder
//!
//! Turns a validated [`RawSourceDocument`] into an [`InventoryGraph`] in three
//! passes: groups with their variables, hosts with their variables, then
//! membership edges. Within each variable pass the `all` entry is applied
//! before the entity's own entry, so specific values win.

use tracing::{debug, instrument};

use crate::document::RawSourceDocument;
use crate::error::InventoryError;
use crate::traits::GraphSink;
use crate::types::{InventoryGraph, Variables};

/// Build a fresh graph from a validated document
#[must_use]
pub fn build(document: &RawSourceDocument) -> InventoryGraph {
    let mut graph = InventoryGraph::new();
    populate(document, &mut graph);
    graph
}

/// Decode, validate and build in one step
///
/// # Errors
/// Returns an error if the bytes are not JSON or a present key is malformed.
/// Validation finishes before the graph is touched, so no partial graph is
/// ever produced.
pub fn build_from_slice(bytes: &[u8]) -> Result<InventoryGraph, InventoryError> {
    let document = RawSourceDocument::from_slice(bytes)?;
    Ok(build(&document))
}

/// Decode, validate and build from text
///
/// # Errors
/// Same as [`build_from_slice`].
pub fn build_from_str(text: &str) -> Result<InventoryGraph, InventoryError> {
    build_from_slice(text.as_bytes())
}

/// Validate and build from a parsed JSON value
///
/// # Errors
/// Returns an error if a present key is malformed.
pub fn build_from_value(value: serde_json::Value) -> Result<InventoryGraph, InventoryError> {
    let document = RawSourceDocument::from_value(value)?;
    Ok(build(&document))
}

/// Replay a document into any sink
#[instrument(skip_all, fields(groups = document.groups.len(), hosts = document.hosts.len()))]
pub fn populate<S: GraphSink + ?Sized>(document: &RawSourceDocument, sink: &mut S) {
    // Groups pass
    let all_group_vars = document.all_group_vars();
    for group in &document.groups {
        sink.add_group(&group.name);
        apply(all_group_vars, |key, value| {
            sink.set_group_variable(&group.name, key, value);
        });
        apply(document.group_vars.get(&group.name), |key, value| {
            sink.set_group_variable(&group.name, key, value);
        });
    }

    // Hosts pass
    let all_host_vars = document.all_host_vars();
    for host in &document.hosts {
        sink.add_host(host);
        apply(all_host_vars, |key, value| {
            sink.set_host_variable(host, key, value);
        });
        apply(document.host_vars.get(host), |key, value| {
            sink.set_host_variable(host, key, value);
        });
    }

    // Membership pass
    let mut edges = 0usize;
    for group in &document.groups {
        for member in &group.members {
            sink.add_child(&group.name, member);
            edges += 1;
        }
    }

    debug!(edges, "inventory document applied");
}

fn apply(vars: Option<&Variables>, mut set: impl FnMut(&str, serde_json::Value)) {
    for (key, value) in vars.into_iter().flatten() {
        set(key.as_str(), value.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    /// Records every sink call in order
    #[derive(Default)]
    struct RecordingSink {
        calls: Vec<String>,
    }

    impl GraphSink for RecordingSink {
        fn add_group(&mut self, name: &str) {
            self.calls.push(format!("group {name}"));
        }

        fn add_host(&mut self, name: &str) {
            self.calls.push(format!("host {name}"));
        }

        fn set_group_variable(&mut self, group: &str, key: &str, value: Value) {
            self.calls.push(format!("gvar {group} {key}={value}"));
        }

        fn set_host_variable(&mut self, host: &str, key: &str, value: Value) {
            self.calls.push(format!("hvar {host} {key}={value}"));
        }

        fn add_child(&mut self, group: &str, member: &str) {
            self.calls.push(format!("child {group} {member}"));
        }
    }

    fn record(value: Value) -> Vec<String> {
        let document = RawSourceDocument::from_value(value).unwrap();
        let mut sink = RecordingSink::default();
        populate(&document, &mut sink);
        sink.calls
    }

    #[test]
    fn test_passes_run_in_order() {
        let calls = record(json!({
            "groups": {"web": ["h1"], "db": ["h2"]},
            "hosts": ["h1", "h2"],
        }));

        assert_eq!(
            calls,
            vec![
                "group web",
                "group db",
                "host h1",
                "host h2",
                "child web h1",
                "child db h2",
            ]
        );
    }

    #[test]
    fn test_all_vars_applied_before_specific() {
        let calls = record(json!({
            "groups": {"g1": []},
            "group_vars": {"g1": {"x": 2}, "all": {"x": 1}},
        }));

        assert_eq!(calls, vec!["group g1", "gvar g1 x=1", "gvar g1 x=2"]);
    }

    #[test]
    fn test_host_vars_all_then_specific() {
        let calls = record(json!({
            "hosts": ["h1"],
            "host_vars": {"h1": {"port": 2222}, "all": {"port": 22, "user": "ops"}},
        }));

        assert_eq!(
            calls,
            vec![
                "host h1",
                "hvar h1 port=22",
                "hvar h1 user=\"ops\"",
                "hvar h1 port=2222",
            ]
        );
    }

    #[test]
    fn test_all_key_never_becomes_entity() {
        let graph = build_from_value(json!({
            "group_vars": {"all": {"a": 1}},
            "host_vars": {"all": {"b": 2}},
        }))
        .unwrap();

        assert!(graph.is_empty());
        assert!(graph.group("all").is_none());
        assert!(graph.host("all").is_none());
    }

    #[test]
    fn test_vars_for_undeclared_entities_are_ignored() {
        let graph = build_from_value(json!({
            "groups": {"web": []},
            "group_vars": {"db": {"a": 1}},
            "host_vars": {"h9": {"b": 2}},
        }))
        .unwrap();

        assert_eq!(graph.group_count(), 1);
        assert!(graph.group("db").is_none());
        assert_eq!(graph.host_count(), 0);
    }

    #[test]
    fn test_specific_overrides_all() {
        let graph = build_from_value(json!({
            "groups": {"g1": []},
            "group_vars": {"all": {"x": 1}, "g1": {"x": 2}},
        }))
        .unwrap();

        assert_eq!(graph.group("g1").unwrap().variable("x"), Some(&json!(2)));
    }

    #[test]
    fn test_nested_values_replaced_not_merged() {
        let graph = build_from_value(json!({
            "hosts": ["h1"],
            "host_vars": {
                "all": {"ssh": {"user": "ops", "port": 22}},
                "h1": {"ssh": {"port": 2222}}
            },
        }))
        .unwrap();

        assert_eq!(
            graph.host("h1").unwrap().variable("ssh"),
            Some(&json!({"port": 2222}))
        );
    }

    #[test]
    fn test_values_are_opaque() {
        let graph = build_from_value(json!({
            "hosts": ["h1"],
            "host_vars": {"h1": {"port": "22", "tags": [1, "a", null], "enabled": false}},
        }))
        .unwrap();

        let host = graph.host("h1").unwrap();
        assert_eq!(host.variable("port"), Some(&json!("22")));
        assert_eq!(host.variable("tags"), Some(&json!([1, "a", null])));
        assert_eq!(host.variable("enabled"), Some(&json!(false)));
    }

    #[test]
    fn test_duplicate_hosts_and_members() {
        let graph = build_from_value(json!({
            "groups": {"web": ["h1", "h1", "h2"]},
            "hosts": ["h1", "h1", "h2"],
        }))
        .unwrap();

        assert_eq!(graph.host_count(), 2);
        assert_eq!(graph.membership().count(), 2);
    }

    #[test]
    fn test_unknown_members_recorded() {
        let graph = build_from_value(json!({"groups": {"web": ["ghost"]}})).unwrap();

        assert!(graph.has_edge("web", "ghost"));
        assert!(graph.host("ghost").is_none());
        assert!(graph.unresolved_members().contains("ghost"));
    }

    #[test]
    fn test_malformed_input_builds_nothing() {
        let result = build_from_str(r#"{"groups": {"web": ["h1"]}, "hosts": "h1"}"#);
        assert!(matches!(result, Err(InventoryError::Malformed { .. })));
    }
}
