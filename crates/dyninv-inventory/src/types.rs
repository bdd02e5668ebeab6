//! Inventory graph type definitions

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::traits::GraphSink;

/// Variables scoped to a group or host, in insertion order
pub type Variables = Map<String, Value>;

// ============================================================================
// Groups and Hosts
// ============================================================================

/// Named collection of hosts and child groups
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    /// Group name
    pub name: String,
    /// Group variables
    #[serde(default)]
    pub variables: Variables,
    /// Member hosts and child groups
    #[serde(default)]
    pub members: BTreeSet<String>,
}

impl Group {
    /// Create an empty group
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variables: Variables::new(),
            members: BTreeSet::new(),
        }
    }

    /// Look up a variable
    #[must_use]
    pub fn variable(&self, key: &str) -> Option<&Value> {
        self.variables.get(key)
    }
}

/// Single inventory target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Host {
    /// Host name (commonly a hostname or address)
    pub name: String,
    /// Host variables
    #[serde(default)]
    pub variables: Variables,
}

impl Host {
    /// Create a host without variables
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            variables: Variables::new(),
        }
    }

    /// Look up a variable
    #[must_use]
    pub fn variable(&self, key: &str) -> Option<&Value> {
        self.variables.get(key)
    }
}

/// Directed edge: `member` belongs to `group`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MembershipEdge {
    /// Parent group
    pub group: String,
    /// Host or child group
    pub member: String,
}

// ============================================================================
// Inventory Graph
// ============================================================================

/// Complete inventory: groups, hosts and membership edges
///
/// Entries are keyed and ordered by name so serialized output is stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventoryGraph {
    groups: BTreeMap<String, Group>,
    hosts: BTreeMap<String, Host>,
    membership: BTreeSet<MembershipEdge>,
}

impl InventoryGraph {
    /// Create an empty graph
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a group by name
    #[must_use]
    pub fn group(&self, name: &str) -> Option<&Group> {
        self.groups.get(name)
    }

    /// Look up a host by name
    #[must_use]
    pub fn host(&self, name: &str) -> Option<&Host> {
        self.hosts.get(name)
    }

    /// All groups, ordered by name
    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.values()
    }

    /// All hosts, ordered by name
    pub fn hosts(&self) -> impl Iterator<Item = &Host> {
        self.hosts.values()
    }

    /// All membership edges
    pub fn membership(&self) -> impl Iterator<Item = &MembershipEdge> {
        self.membership.iter()
    }

    /// Number of groups
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Number of hosts
    #[must_use]
    pub fn host_count(&self) -> usize {
        self.hosts.len()
    }

    /// Check if the graph holds no groups, hosts or edges
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.hosts.is_empty() && self.membership.is_empty()
    }

    /// Check for a membership edge
    #[must_use]
    pub fn has_edge(&self, group: &str, member: &str) -> bool {
        self.groups
            .get(group)
            .is_some_and(|g| g.members.contains(member))
    }

    /// Direct members of a group
    #[must_use]
    pub fn members_of(&self, group: &str) -> Option<&BTreeSet<String>> {
        self.groups.get(group).map(|g| &g.members)
    }

    /// Groups that list `member` directly
    #[must_use]
    pub fn parents_of(&self, member: &str) -> Vec<&str> {
        self.membership
            .iter()
            .filter(|e| e.member == member)
            .map(|e| e.group.as_str())
            .collect()
    }

    /// Edge targets that are neither a declared group nor a declared host
    #[must_use]
    pub fn unresolved_members(&self) -> BTreeSet<&str> {
        self.membership
            .iter()
            .map(|e| e.member.as_str())
            .filter(|m| !self.groups.contains_key(*m) && !self.hosts.contains_key(*m))
            .collect()
    }

    /// Hosts reachable from `group` through membership, including nested groups
    ///
    /// Safe on cyclic graphs: every group is expanded at most once.
    #[must_use]
    pub fn hosts_under(&self, group: &str) -> BTreeSet<&str> {
        let mut hosts = BTreeSet::new();
        let mut seen = BTreeSet::new();
        let mut queue = VecDeque::new();

        if let Some((name, _)) = self.groups.get_key_value(group) {
            queue.push_back(name.as_str());
        }

        while let Some(current) = queue.pop_front() {
            if !seen.insert(current) {
                continue;
            }
            let Some(g) = self.groups.get(current) else {
                continue;
            };
            for member in &g.members {
                if self.groups.contains_key(member) {
                    queue.push_back(member.as_str());
                } else if self.hosts.contains_key(member) {
                    hosts.insert(member.as_str());
                }
            }
        }

        hosts
    }

    /// Find a cycle among group-to-group edges
    ///
    /// Returns the group names along the cycle with the first name repeated at
    /// the end, e.g. `["a", "b", "a"]`.
    #[must_use]
    pub fn find_group_cycle(&self) -> Option<Vec<String>> {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Mark {
            Active,
            Done,
        }

        fn visit<'a>(
            groups: &'a BTreeMap<String, Group>,
            name: &'a str,
            marks: &mut HashMap<&'a str, Mark>,
            stack: &mut Vec<&'a str>,
        ) -> Option<Vec<String>> {
            marks.insert(name, Mark::Active);
            stack.push(name);

            if let Some(group) = groups.get(name) {
                for child in group.members.iter().filter(|m| groups.contains_key(*m)) {
                    match marks.get(child.as_str()) {
                        Some(Mark::Active) => {
                            let start = stack.iter().position(|n| *n == child.as_str()).unwrap_or(0);
                            let mut cycle: Vec<String> =
                                stack[start..].iter().map(|n| (*n).to_string()).collect();
                            cycle.push(child.clone());
                            return Some(cycle);
                        }
                        Some(Mark::Done) => {}
                        None => {
                            if let Some(cycle) = visit(groups, child, marks, stack) {
                                return Some(cycle);
                            }
                        }
                    }
                }
            }

            stack.pop();
            marks.insert(name, Mark::Done);
            None
        }

        let mut marks = HashMap::new();
        for name in self.groups.keys() {
            if marks.contains_key(name.as_str()) {
                continue;
            }
            let mut stack = Vec::new();
            if let Some(cycle) = visit(&self.groups, name, &mut marks, &mut stack) {
                return Some(cycle);
            }
        }
        None
    }
}

impl GraphSink for InventoryGraph {
    fn add_group(&mut self, name: &str) {
        self.groups
            .entry(name.to_string())
            .or_insert_with(|| Group::new(name));
    }

    fn add_host(&mut self, name: &str) {
        self.hosts
            .entry(name.to_string())
            .or_insert_with(|| Host::new(name));
    }

    fn set_group_variable(&mut self, group: &str, key: &str, value: Value) {
        self.groups
            .entry(group.to_string())
            .or_insert_with(|| Group::new(group))
            .variables
            .insert(key.to_string(), value);
    }

    fn set_host_variable(&mut self, host: &str, key: &str, value: Value) {
        self.hosts
            .entry(host.to_string())
            .or_insert_with(|| Host::new(host))
            .variables
            .insert(key.to_string(), value);
    }

    fn add_child(&mut self, group: &str, member: &str) {
        self.groups
            .entry(group.to_string())
            .or_insert_with(|| Group::new(group))
            .members
            .insert(member.to_string());
        self.membership.insert(MembershipEdge {
            group: group.to_string(),
            member: member.to_string(),
        });
    }
}
