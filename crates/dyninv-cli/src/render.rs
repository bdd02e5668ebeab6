//! Text rendering for CLI output

use std::collections::BTreeSet;
use std::fmt::Write;

use dyninv_inventory::InventoryGraph;

const INDENT: &str = "  ";

/// Render the graph as an indented tree
///
/// Top-level groups are those no other group lists. Groups caught in a cycle
/// are rendered once and marked on repeat visits. Hosts outside every group
/// are listed last.
#[must_use]
pub fn tree(graph: &InventoryGraph) -> String {
    let mut out = String::new();
    let mut rendered = BTreeSet::new();

    let roots: Vec<&str> = graph
        .groups()
        .map(|g| g.name.as_str())
        .filter(|name| graph.parents_of(name).is_empty())
        .collect();

    for root in roots {
        render_group(graph, root, 0, &mut Vec::new(), &mut rendered, &mut out);
    }

    // groups only reachable from inside a cycle
    let leftovers: Vec<&str> = graph
        .groups()
        .map(|g| g.name.as_str())
        .filter(|name| !rendered.contains(name))
        .collect();
    for name in leftovers {
        if !rendered.contains(name) {
            render_group(graph, name, 0, &mut Vec::new(), &mut rendered, &mut out);
        }
    }

    let ungrouped: Vec<&str> = graph
        .hosts()
        .map(|h| h.name.as_str())
        .filter(|name| graph.parents_of(name).is_empty())
        .collect();
    if !ungrouped.is_empty() {
        let _ = writeln!(out, "(ungrouped)");
        for host in ungrouped {
            let _ = writeln!(out, "{INDENT}{host}");
        }
    }

    out
}

fn render_group<'a>(
    graph: &'a InventoryGraph,
    name: &'a str,
    depth: usize,
    path: &mut Vec<&'a str>,
    rendered: &mut BTreeSet<&'a str>,
    out: &mut String,
) {
    let pad = INDENT.repeat(depth);

    if path.contains(&name) {
        let _ = writeln!(out, "{pad}{name}/ (cycle)");
        return;
    }

    let _ = writeln!(out, "{pad}{name}/");
    rendered.insert(name);
    path.push(name);

    if let Some(members) = graph.members_of(name) {
        for member in members {
            if graph.group(member).is_some() {
                render_group(graph, member, depth + 1, path, rendered, out);
            } else if graph.host(member).is_some() {
                let _ = writeln!(out, "{pad}{INDENT}{member}");
            } else {
                let _ = writeln!(out, "{pad}{INDENT}{member} (unresolved)");
            }
        }
    }

    path.pop();
}

#[cfg(test)]
mod tests {
    use dyninv_inventory::build_from_str;

    use super::*;

    #[test]
    fn test_nested_tree() {
        let graph = build_from_str(
            r#"{
                "groups": {"web": ["web01", "web02"], "prod": ["web", "db01"]},
                "hosts": ["web01", "web02", "db01", "bastion"]
            }"#,
        )
        .unwrap();

        let expected = "\
prod/
  db01
  web/
    web01
    web02
(ungrouped)
  bastion
";
        assert_eq!(tree(&graph), expected);
    }

    #[test]
    fn test_cycle_is_marked() {
        let graph =
            build_from_str(r#"{"groups": {"a": ["b"], "b": ["a", "ghost"]}}"#).unwrap();

        let expected = "\
a/
  b/
    a/ (cycle)
    ghost (unresolved)
";
        assert_eq!(tree(&graph), expected);
    }

    #[test]
    fn test_empty_graph() {
        assert_eq!(tree(&InventoryGraph::new()), "");
    }
}
