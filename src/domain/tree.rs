//! Revision tree reconstruction
//!
//! Rebuilds the single-rooted ancestry tree implied by `revises` links using
//! place-and-backtrack: descend while a child of the current node is still
//! unplaced, otherwise retreat to the parent. Nodes live in an arena; parents
//! are stored as indices and only ever used to backtrack.

use crate::domain::metadata::MigrationMetadata;
use crate::error::TreeError;

/// Index of a node inside a [`MigrationTree`]
pub type NodeId = usize;

/// One placed migration
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub metadata: MigrationMetadata,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl TreeNode {
    fn new(metadata: MigrationMetadata, parent: Option<NodeId>) -> Self {
        Self {
            metadata,
            parent,
            children: Vec::new(),
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Children in the order they were attached
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Reconstructed revision tree. Node 0 is always the root.
#[derive(Debug, Clone)]
pub struct MigrationTree {
    nodes: Vec<TreeNode>,
}

impl MigrationTree {
    /// Reconstruct the tree from records of a single encoding.
    ///
    /// Revision ids are assumed unique. Sibling order follows the order of
    /// `records`; nothing is sorted.
    pub fn build(records: &[MigrationMetadata]) -> Result<Self, TreeError> {
        let root = find_root(records)?;

        let mut unplaced: Vec<usize> = (0..records.len()).filter(|&i| i != root).collect();
        let mut tree = Self {
            nodes: vec![TreeNode::new(records[root].clone(), None)],
        };
        let mut current: NodeId = 0;

        while !unplaced.is_empty() {
            let current_id = &tree.nodes[current].metadata.revision_id;
            let next = unplaced
                .iter()
                .position(|&i| records[i].revises_id(current_id));

            match next {
                Some(pos) => {
                    let record = unplaced.remove(pos);
                    current = tree.attach(current, records[record].clone());
                }
                None => match tree.node(current).parent() {
                    Some(parent) => current = parent,
                    None => {
                        // Back at the root with records left: they hang off a
                        // revision that is missing or part of a cycle.
                        let stray = &records[unplaced[0]];
                        return Err(TreeError::DanglingRecord {
                            revision: stray.revision_id.clone(),
                            revises: stray.revises.clone().unwrap_or_default(),
                        });
                    }
                },
            }
        }

        Ok(tree)
    }

    fn attach(&mut self, parent: NodeId, metadata: MigrationMetadata) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(TreeNode::new(metadata, Some(parent)));
        self.nodes[parent].children.push(id);
        id
    }

    pub fn root(&self) -> NodeId {
        0
    }

    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id]
    }

    /// Number of placed migrations
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Leaf revisions (Alembic "heads"), in depth-first order
    pub fn heads(&self) -> Vec<&MigrationMetadata> {
        let mut heads = Vec::new();
        let mut stack = vec![self.root()];
        while let Some(id) = stack.pop() {
            let node = &self.nodes[id];
            if node.children.is_empty() {
                heads.push(&node.metadata);
            }
            stack.extend(node.children.iter().rev());
        }
        heads
    }
}

fn find_root(records: &[MigrationMetadata]) -> Result<usize, TreeError> {
    let mut roots = records
        .iter()
        .enumerate()
        .filter(|(_, record)| record.is_root())
        .map(|(i, _)| i);

    let root = roots.next().ok_or(TreeError::NoRootFound)?;
    if let Some(second) = roots.next() {
        return Err(TreeError::MultipleRoots {
            first: records[root].revision_id.clone(),
            second: records[second].revision_id.clone(),
        });
    }
    Ok(root)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(revision: &str, revises: &str) -> MigrationMetadata {
        MigrationMetadata::new(
            format!("migration {}", revision),
            revision,
            Some(revises),
            "2024-01-01 00:00:00",
        )
    }

    fn child_ids(tree: &MigrationTree, id: NodeId) -> Vec<&str> {
        tree.node(id)
            .children()
            .iter()
            .map(|&c| tree.node(c).metadata.revision_id.as_str())
            .collect()
    }

    fn find(tree: &MigrationTree, revision: &str) -> NodeId {
        (0..tree.len())
            .find(|&id| tree.node(id).metadata.revision_id == revision)
            .unwrap()
    }

    #[test]
    fn test_linear_chain() {
        let records = vec![record("a1", ""), record("b2", "a1"), record("c3", "b2")];
        let tree = MigrationTree::build(&records).unwrap();

        assert_eq!(tree.len(), 3);
        assert_eq!(tree.node(tree.root()).metadata.revision_id, "a1");
        assert_eq!(child_ids(&tree, tree.root()), vec!["b2"]);
        assert_eq!(child_ids(&tree, find(&tree, "b2")), vec!["c3"]);
        assert!(child_ids(&tree, find(&tree, "c3")).is_empty());
    }

    #[test]
    fn test_unordered_input_places_every_record() {
        let records = vec![
            record("d4", "c3"),
            record("b2", "a1"),
            record("e5", "b2"),
            record("c3", "b2"),
            record("a1", ""),
            record("f6", "e5"),
        ];
        let tree = MigrationTree::build(&records).unwrap();

        assert_eq!(tree.len(), records.len());
        for id in 0..tree.len() {
            let node = tree.node(id);
            match node.parent() {
                Some(parent) => {
                    let parent_id = &tree.node(parent).metadata.revision_id;
                    assert!(node.metadata.revises_id(parent_id));
                }
                None => assert!(node.metadata.is_root()),
            }
        }
    }

    #[test]
    fn test_sibling_order_follows_input() {
        let forward = vec![
            record("a1", ""),
            record("b2", "a1"),
            record("c3", "a1"),
        ];
        let tree = MigrationTree::build(&forward).unwrap();
        assert_eq!(child_ids(&tree, tree.root()), vec!["b2", "c3"]);

        let reversed: Vec<_> = forward.into_iter().rev().collect();
        let tree = MigrationTree::build(&reversed).unwrap();
        assert_eq!(child_ids(&tree, tree.root()), vec!["c3", "b2"]);
    }

    #[test]
    fn test_backtracks_to_fill_cousins() {
        // b2 and c3 both branch from a1; d4 hangs off b2 but appears last.
        let records = vec![
            record("a1", ""),
            record("b2", "a1"),
            record("c3", "a1"),
            record("e5", "c3"),
            record("d4", "b2"),
        ];
        let tree = MigrationTree::build(&records).unwrap();

        assert_eq!(tree.len(), 5);
        assert_eq!(child_ids(&tree, find(&tree, "b2")), vec!["d4"]);
        assert_eq!(child_ids(&tree, find(&tree, "c3")), vec!["e5"]);
        let heads: Vec<_> = tree.heads().iter().map(|m| m.revision_id.as_str()).collect();
        assert_eq!(heads, vec!["d4", "e5"]);
    }

    #[test]
    fn test_single_record() {
        let tree = MigrationTree::build(&[record("a1", "")]).unwrap();
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.heads().len(), 1);
    }

    #[test]
    fn test_no_root() {
        let records = vec![record("b2", "a1"), record("c3", "b2")];
        assert_eq!(
            MigrationTree::build(&records).unwrap_err(),
            TreeError::NoRootFound
        );
        assert_eq!(MigrationTree::build(&[]).unwrap_err(), TreeError::NoRootFound);
    }

    #[test]
    fn test_multiple_roots() {
        let records = vec![record("a1", ""), record("b2", "a1"), record("x9", "")];
        assert_eq!(
            MigrationTree::build(&records).unwrap_err(),
            TreeError::MultipleRoots {
                first: "a1".to_string(),
                second: "x9".to_string(),
            }
        );
    }

    #[test]
    fn test_dangling_record() {
        let records = vec![record("a1", ""), record("b2", "a1"), record("z9", "missing")];
        assert_eq!(
            MigrationTree::build(&records).unwrap_err(),
            TreeError::DanglingRecord {
                revision: "z9".to_string(),
                revises: "missing".to_string(),
            }
        );
    }

    #[test]
    fn test_cycle_is_dangling() {
        let records = vec![
            record("a1", ""),
            record("b2", "a1"),
            record("x1", "x2"),
            record("x2", "x1"),
        ];
        assert!(matches!(
            MigrationTree::build(&records),
            Err(TreeError::DanglingRecord { revision, .. }) if revision == "x1"
        ));
    }
}
