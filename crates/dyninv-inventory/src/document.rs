//! Source document decoding and shape validation

use std::collections::HashMap;
use std::str::FromStr;

use serde_json::{Map, Value};

use crate::error::InventoryError;
use crate::types::Variables;

/// Reserved `group_vars`/`host_vars` key applied to every group or host
pub const ALL_KEY: &str = "all";

/// Group declaration from the `groups` mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupDecl {
    /// Group name
    pub name: String,
    /// Member identifiers in document order
    pub members: Vec<String>,
}

/// Validated source document
///
/// Every top-level key is optional. A missing key and a key set to `null`
/// both decode to an empty collection; unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawSourceDocument {
    /// Groups in document order
    pub groups: Vec<GroupDecl>,
    /// Group variables keyed by group name or [`ALL_KEY`]
    pub group_vars: HashMap<String, Variables>,
    /// Host names in document order
    pub hosts: Vec<String>,
    /// Host variables keyed by host name or [`ALL_KEY`]
    pub host_vars: HashMap<String, Variables>,
}

impl RawSourceDocument {
    /// Decode a document from raw JSON bytes
    ///
    /// # Errors
    /// Returns `InventoryError::InvalidJson` if the bytes are not JSON, or
    /// `InventoryError::Malformed` if a present key has the wrong shape.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, InventoryError> {
        let value: Value =
            serde_json::from_slice(bytes).map_err(|e| InventoryError::InvalidJson(e.to_string()))?;
        Self::from_value(value)
    }

    /// Decode a document from an already parsed JSON value
    ///
    /// # Errors
    /// Returns `InventoryError::Malformed` if the value is not an object or a
    /// present key has the wrong shape.
    pub fn from_value(value: Value) -> Result<Self, InventoryError> {
        let mut root = match value {
            Value::Object(root) => root,
            other => return Err(InventoryError::malformed("$", "a JSON object", &other)),
        };

        let groups = match take(&mut root, "groups") {
            Some(value) => decode_groups(value)?,
            None => Vec::new(),
        };
        let group_vars = match take(&mut root, "group_vars") {
            Some(value) => decode_vars(value, "group_vars")?,
            None => HashMap::new(),
        };
        let hosts = match take(&mut root, "hosts") {
            Some(Value::Array(items)) => decode_names(items, "hosts")?,
            Some(other) => {
                return Err(InventoryError::malformed(
                    "hosts",
                    "an array of host names",
                    &other,
                ));
            }
            None => Vec::new(),
        };
        let host_vars = match take(&mut root, "host_vars") {
            Some(value) => decode_vars(value, "host_vars")?,
            None => HashMap::new(),
        };

        Ok(Self {
            groups,
            group_vars,
            hosts,
            host_vars,
        })
    }

    /// Variables that apply to every group
    #[must_use]
    pub fn all_group_vars(&self) -> Option<&Variables> {
        self.group_vars.get(ALL_KEY)
    }

    /// Variables that apply to every host
    #[must_use]
    pub fn all_host_vars(&self) -> Option<&Variables> {
        self.host_vars.get(ALL_KEY)
    }

    /// Check if the document declares nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
            && self.hosts.is_empty()
            && self.group_vars.is_empty()
            && self.host_vars.is_empty()
    }
}

impl FromStr for RawSourceDocument {
    type Err = InventoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_slice(s.as_bytes())
    }
}

/// Remove a top-level key, treating `null` as absent
fn take(root: &mut Map<String, Value>, key: &str) -> Option<Value> {
    match root.remove(key) {
        None | Some(Value::Null) => None,
        Some(value) => Some(value),
    }
}

fn decode_groups(value: Value) -> Result<Vec<GroupDecl>, InventoryError> {
    let entries = match value {
        Value::Object(entries) => entries,
        other => return Err(InventoryError::malformed("groups", "a mapping of groups", &other)),
    };

    entries
        .into_iter()
        .map(|(name, members)| {
            if name.is_empty() {
                return Err(InventoryError::malformed(
                    "groups",
                    "non-empty group names",
                    &Value::String(name),
                ));
            }
            let path = format!("groups.{name}");
            let members = match members {
                Value::Null => Vec::new(),
                Value::Array(items) => decode_names(items, &path)?,
                other => {
                    return Err(InventoryError::malformed(
                        path,
                        "an array of member names",
                        &other,
                    ));
                }
            };
            Ok(GroupDecl { name, members })
        })
        .collect()
}

fn decode_names(items: Vec<Value>, path: &str) -> Result<Vec<String>, InventoryError> {
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::String(name) if !name.is_empty() => Ok(name),
            other => Err(InventoryError::malformed(
                format!("{path}[{i}]"),
                "a non-empty name",
                &other,
            )),
        })
        .collect()
}

fn decode_vars(value: Value, key: &str) -> Result<HashMap<String, Variables>, InventoryError> {
    let entries = match value {
        Value::Object(entries) => entries,
        other => return Err(InventoryError::malformed(key, "a mapping of variable sets", &other)),
    };

    entries
        .into_iter()
        .filter_map(|(name, vars)| match vars {
            Value::Null => None,
            Value::Object(vars) => Some(Ok((name, vars))),
            other => Some(Err(InventoryError::malformed(
                format!("{key}.{name}"),
                "a mapping of variables",
                &other,
            ))),
        })
        .collect()
}
