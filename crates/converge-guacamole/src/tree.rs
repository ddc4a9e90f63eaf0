//! Connection-group tree walk.
//!
//! The gateway returns the whole hierarchy in one `ROOT/tree` fetch; the
//! walk flattens it into a `path -> identifier` map where paths are
//! slash-joined names rooted at `ROOT`. The map is rebuilt from a fresh
//! fetch on every reconcile; nothing is cached across invocations.

use crate::error::{GuacError, GuacResult};
use crate::types::ConnectionTreeNode;
use std::collections::HashMap;

/// Fixed label of the gateway's root connection group.
pub const ROOT_GROUP: &str = "ROOT";

/// Flatten a tree into path → identifier, for groups and leaf connections.
pub fn connection_paths(root: &ConnectionTreeNode) -> HashMap<String, String> {
    let mut paths = HashMap::new();
    walk(root, ROOT_GROUP, &mut paths);
    paths
}

fn walk(node: &ConnectionTreeNode, parent: &str, paths: &mut HashMap<String, String>) {
    for group in &node.child_connection_groups {
        let group_path = format!("{}/{}", parent, group.name);
        paths.insert(group_path.clone(), group.identifier.clone());
        for connection in &group.child_connections {
            paths.insert(
                format!("{}/{}", group_path, connection.name),
                connection.identifier.clone(),
            );
        }
        walk(group, &group_path, paths);
    }
}

/// Identifier of the parent group a path would be created under.
///
/// Top-level paths (`ROOT/name`) live directly under the root group; deeper
/// paths require their parent to already exist in the map — intermediate
/// groups are never auto-created.
pub fn parent_identifier(
    paths: &HashMap<String, String>,
    path: &str,
) -> GuacResult<String> {
    let segments: Vec<&str> = path.split('/').collect();
    if segments.len() <= 2 {
        return Ok(ROOT_GROUP.to_string());
    }
    let parent = segments[..segments.len() - 1].join("/");
    paths
        .get(&parent)
        .cloned()
        .ok_or(GuacError::ParentGroupNotFound(parent))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TreeConnection;
    use std::collections::HashMap as Map;

    fn conn(identifier: &str, name: &str) -> TreeConnection {
        TreeConnection {
            identifier: identifier.into(),
            name: name.into(),
            extra: Map::new(),
        }
    }

    fn group(
        identifier: &str,
        name: &str,
        connections: Vec<TreeConnection>,
        groups: Vec<ConnectionTreeNode>,
    ) -> ConnectionTreeNode {
        ConnectionTreeNode {
            identifier: identifier.into(),
            name: name.into(),
            child_connections: connections,
            child_connection_groups: groups,
        }
    }

    fn sample_tree() -> ConnectionTreeNode {
        // ROOT -> [GroupA -> [ConnX, GroupB -> [ConnY]]]
        let group_b = group("7", "GroupB", vec![conn("91", "ConnY")], vec![]);
        let group_a = group("3", "GroupA", vec![conn("44", "ConnX")], vec![group_b]);
        group("ROOT", "ROOT", vec![], vec![group_a])
    }

    #[test]
    fn test_walk_maps_groups_and_connections() {
        let paths = connection_paths(&sample_tree());
        assert_eq!(paths.get("ROOT/GroupA"), Some(&"3".to_string()));
        assert_eq!(paths.get("ROOT/GroupA/ConnX"), Some(&"44".to_string()));
        assert_eq!(paths.get("ROOT/GroupA/GroupB"), Some(&"7".to_string()));
        assert_eq!(
            paths.get("ROOT/GroupA/GroupB/ConnY"),
            Some(&"91".to_string())
        );
        assert_eq!(paths.len(), 4);
    }

    #[test]
    fn test_walk_has_no_entry_for_absent_sibling() {
        let paths = connection_paths(&sample_tree());
        assert!(!paths.contains_key("ROOT/GroupC"));
        assert!(!paths.contains_key("ROOT/GroupA/ConnZ"));
    }

    #[test]
    fn test_empty_root_yields_empty_map() {
        let root = group("ROOT", "ROOT", vec![], vec![]);
        assert!(connection_paths(&root).is_empty());
    }

    #[test]
    fn test_parent_of_top_level_path_is_root() {
        let paths = connection_paths(&sample_tree());
        assert_eq!(
            parent_identifier(&paths, "ROOT/NewGroup").unwrap(),
            "ROOT"
        );
    }

    #[test]
    fn test_parent_of_nested_path_resolves() {
        let paths = connection_paths(&sample_tree());
        assert_eq!(
            parent_identifier(&paths, "ROOT/GroupA/NewChild").unwrap(),
            "3"
        );
    }

    #[test]
    fn test_missing_intermediate_parent_is_an_error() {
        let paths = connection_paths(&sample_tree());
        let err = parent_identifier(&paths, "ROOT/Nowhere/NewChild").unwrap_err();
        match err {
            GuacError::ParentGroupNotFound(path) => assert_eq!(path, "ROOT/Nowhere"),
            other => panic!("unexpected error: {}", other),
        }
    }
}
