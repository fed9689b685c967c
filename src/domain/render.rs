//! Canonical text rendering of revision trees
//!
//! Every child gets an explicit branch connector, so a linear chain renders
//! as a staircase and branches are visible as `├──` siblings:
//!
//! ```text
//! [a1] init
//! ├── [b2] add_users
//! │   └── [c3] add_index
//! └── [d4] add_orders
//! ```
//!
//! The same policy is applied to every tree, so two renders are comparable
//! with plain string equality.

use crate::domain::tree::{MigrationTree, NodeId};

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE: &str = "│   ";
const GAP: &str = "    ";

/// Label tree that can be printed as a diagram
#[derive(Debug, Default, Clone)]
pub struct TreeDiagram {
    labels: Vec<String>,
    children: Vec<Vec<NodeId>>,
    roots: Vec<NodeId>,
}

impl TreeDiagram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node under `parent` (or as a top-level node) and return its id.
    /// Siblings render in insertion order.
    pub fn add_node(&mut self, parent: Option<NodeId>, label: impl Into<String>) -> NodeId {
        let id = self.labels.len();
        self.labels.push(label.into());
        self.children.push(Vec::new());
        match parent {
            Some(parent) => self.children[parent].push(id),
            None => self.roots.push(id),
        }
        id
    }

    /// Render depth-first, one line per node, each terminated by `\n`
    pub fn render(&self) -> String {
        let mut out = String::new();
        for &root in &self.roots {
            out.push_str(&self.labels[root]);
            out.push('\n');
            self.render_children(root, "", &mut out);
        }
        out
    }

    fn render_children(&self, id: NodeId, prefix: &str, out: &mut String) {
        let children = &self.children[id];
        for (i, &child) in children.iter().enumerate() {
            let last = i + 1 == children.len();
            out.push_str(prefix);
            out.push_str(if last { LAST_BRANCH } else { BRANCH });
            out.push_str(&self.labels[child]);
            out.push('\n');

            let nested = format!("{}{}", prefix, if last { GAP } else { PIPE });
            self.render_children(child, &nested, out);
        }
    }
}

/// Render a reconstructed revision tree with `[<revision>] <name>` labels
pub fn render_tree(tree: &MigrationTree) -> String {
    let mut diagram = TreeDiagram::new();
    let mut pending = vec![(tree.root(), None)];

    while let Some((id, parent)) = pending.pop() {
        let node = tree.node(id);
        let handle = diagram.add_node(parent, node.metadata.label());
        // Reverse so children are popped, and therefore added, in stored order.
        pending.extend(node.children().iter().rev().map(|&c| (c, Some(handle))));
    }

    diagram.render()
}
